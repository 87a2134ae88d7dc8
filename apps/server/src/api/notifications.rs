//! Notification inbox endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use bandobast_core::notifications::Notification;

use crate::api::require_field;
use crate::error::ApiResult;
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OfficerQuery {
    officer_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct InboxResponse {
    message: &'static str,
    count: usize,
    notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadResponse {
    message: &'static str,
    modified_count: usize,
    officer_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn my_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OfficerQuery>,
) -> ApiResult<Json<InboxResponse>> {
    let officer_id = require_field(query.officer_id.as_deref(), "Officer ID is required")?;

    let notifications = state.notification_service.list_for_officer(officer_id)?;

    Ok(Json(InboxResponse {
        message: "Notifications retrieved successfully",
        count: notifications.len(),
        notifications,
    }))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OfficerQuery>,
) -> ApiResult<Json<MarkReadResponse>> {
    let officer_id = require_field(body.officer_id.as_deref(), "Officer ID is required")?;

    let modified = state.notification_service.mark_all_read(officer_id).await?;
    info!("[Notifications] {} marked {} notifications read", officer_id, modified);

    Ok(Json(MarkReadResponse {
        message: "Notifications marked as read successfully",
        modified_count: modified,
        officer_id: officer_id.to_string(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications/my-notifications", get(my_notifications))
        .route("/notifications/mark-read", patch(mark_read))
}
