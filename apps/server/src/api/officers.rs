//! Officer-centric views: the supervisor's on-duty list and an
//! officer's rolling 24-hour workload.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bandobast_core::duties::{DutyHours, HoursToday};
use bandobast_core::officers::Officer;

use crate::api::require_field;
use crate::error::ApiResult;
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SupervisorQuery {
    supervisor_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OnDutyResponse {
    message: &'static str,
    supervisor_id: String,
    count: usize,
    officers: Vec<Officer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HoursTodayResponse {
    message: &'static str,
    officer_id: String,
    officer_name: String,
    time_range: TimeRange,
    summary: HoursSummary,
    duties: Vec<DutyHours>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    hours_ago: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HoursSummary {
    total_hours: f64,
    total_hours_raw: f64,
    duties_count: usize,
    total_duration_ms: i64,
}

impl From<HoursToday> for HoursTodayResponse {
    fn from(hours: HoursToday) -> Self {
        HoursTodayResponse {
            message: "Hours worked in last 24 hours calculated successfully",
            officer_id: hours.officer_id,
            officer_name: hours.officer_name,
            time_range: TimeRange {
                from: hours.time_from,
                to: hours.time_to,
                hours_ago: 24,
            },
            summary: HoursSummary {
                total_hours: hours.total_hours,
                total_hours_raw: hours.total_hours_raw,
                duties_count: hours.duties_count,
                total_duration_ms: hours.total_duration_ms,
            },
            duties: hours.duties,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn on_duty(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SupervisorQuery>,
) -> ApiResult<Json<OnDutyResponse>> {
    let supervisor_id = require_field(
        query.supervisor_id.as_deref(),
        "Supervisor ID is required as query parameter",
    )?;

    let officers = state.duty_service.on_duty_officers(supervisor_id)?;

    Ok(Json(OnDutyResponse {
        message: "On-duty officers retrieved successfully",
        supervisor_id: supervisor_id.to_string(),
        count: officers.len(),
        officers,
    }))
}

async fn hours_today(
    State(state): State<Arc<AppState>>,
    Path(officer_id): Path<String>,
) -> ApiResult<Json<HoursTodayResponse>> {
    let hours = state.duty_service.hours_today(&officer_id)?;
    Ok(Json(HoursTodayResponse::from(hours)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/officers/on-duty", get(on_duty))
        .route("/officers/{officerId}/hours-today", get(hours_today))
}
