//! REST surface, one module per resource. Every module exposes a
//! `router()` merged here under the `/api` prefix by the caller.

pub mod alerts;
pub mod auth;
pub mod debug;
pub mod duties;
pub mod events;
pub mod location;
pub mod notifications;
pub mod officers;
pub mod roster;
pub mod stats;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::main_lib::AppState;

pub fn router(enable_debug_routes: bool) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(duties::router())
        .merge(roster::router())
        .merge(location::router())
        .merge(alerts::router())
        .merge(notifications::router())
        .merge(officers::router())
        .merge(stats::router())
        .merge(events::router());

    if enable_debug_routes {
        router.merge(debug::router())
    } else {
        router
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Trimmed value of a request field, or a 400 with `message` when the
/// field is missing or blank.
pub(crate) fn require_field<'a>(
    value: Option<&'a str>,
    message: &str,
) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}
