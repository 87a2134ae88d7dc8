//! Supervisor dashboard aggregates.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use bandobast_core::stats::{SectorBreakdown, SupervisorOverview};

use crate::error::ApiResult;
use crate::main_lib::AppState;

#[derive(Debug, Serialize)]
struct SectorsResponse {
    sectors: Vec<SectorBreakdown>,
}

async fn supervisor_stats(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SupervisorOverview>> {
    Ok(Json(state.stats_service.supervisor_overview()?))
}

async fn sector_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<SectorsResponse>> {
    let sectors = state.stats_service.sector_breakdown()?;
    Ok(Json(SectorsResponse { sectors }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats/supervisor", get(supervisor_stats))
        .route("/stats/sectors", get(sector_stats))
}
