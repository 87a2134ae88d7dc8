//! Registration and login endpoints.
//!
//! Both return the full officer record (the password hash never
//! serializes), so dashboards can render the profile straight from the
//! auth response.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use bandobast_core::auth::SignupRequest;
use bandobast_core::officers::Officer;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LoginRequest {
    officer_id: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    message: &'static str,
    officer: Officer,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    info!("[Auth] Signup requested for officer {}", body.officer_id);
    let officer = state.auth_service.signup(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Officer registered successfully",
            officer,
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let officer_id = body
        .officer_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let password = body.password.as_deref().filter(|value| !value.is_empty());
    let (Some(officer_id), Some(password)) = (officer_id, password) else {
        return Err(ApiError::bad_request("Officer ID and password are required"));
    };

    let officer = state.auth_service.login(officer_id, password).await?;
    info!("[Auth] Officer {} logged in", officer.officer_id);

    Ok(Json(AuthResponse {
        message: "Login successful",
        officer,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}
