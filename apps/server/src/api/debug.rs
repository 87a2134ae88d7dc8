//! Demo and development endpoints. Only mounted when
//! `BANDOBAST_ENABLE_DEBUG_ROUTES` is set; a production deployment
//! never exposes these.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use bandobast_core::maintenance::ResetSummary;
use bandobast_core::officers::{Officer, OfficerRole};

use crate::error::ApiResult;
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetResponse {
    message: &'static str,
    deleted_counts: ResetSummary,
}

#[derive(Debug, Serialize)]
struct SeedResponse {
    message: &'static str,
    count: usize,
    officers: Vec<SeededOfficer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeededOfficer {
    officer_id: String,
    name: String,
    role: OfficerRole,
}

impl From<&Officer> for SeededOfficer {
    fn from(officer: &Officer) -> Self {
        SeededOfficer {
            officer_id: officer.officer_id.clone(),
            name: officer.name.clone(),
            role: officer.role,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn reset_database(State(state): State<Arc<AppState>>) -> ApiResult<Json<ResetResponse>> {
    warn!("[Debug] Full database reset requested");
    let summary = state.maintenance_service.reset_database().await?;

    Ok(Json(ResetResponse {
        message: "Database reset completed successfully",
        deleted_counts: summary,
    }))
}

async fn seed_demo(State(state): State<Arc<AppState>>) -> ApiResult<Json<SeedResponse>> {
    let officers = state.maintenance_service.seed_demo_officers().await?;

    Ok(Json(SeedResponse {
        message: "Demo officers seeded successfully",
        count: officers.len(),
        officers: officers.iter().map(SeededOfficer::from).collect(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/debug/reset", post(reset_database))
        .route("/debug/seed-demo", post(seed_demo))
}
