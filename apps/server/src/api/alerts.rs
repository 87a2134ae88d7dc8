//! Panic alert endpoints. Triggering is idempotent per officer: an
//! officer with an `Active` alert gets that alert back instead of a
//! duplicate, and only a genuinely new alert reaches the event bus.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bandobast_core::alerts::{AlertDetails, PanicAlertStatus};
use bandobast_core::geo::Coordinates;
use bandobast_core::officers::{OfficerStatus, Rank};

use crate::api::require_field;
use crate::error::ApiResult;
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PanicRequest {
    officer_id: Option<String>,
    location: Option<PanicLocation>,
}

/// Loose location payload: handsets under duress send whatever they
/// have, so a half-filled pair degrades to "no fix" rather than a 422.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PanicLocation {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl PanicLocation {
    fn into_coordinates(self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct PanicResponse {
    message: &'static str,
    alert: PanicAlertView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PanicAlertView {
    alert_id: String,
    officer: PanicOfficerView,
    location: Coordinates,
    status: PanicAlertStatus,
    triggered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PanicOfficerView {
    officer_id: String,
    name: String,
    rank: Rank,
    home_police_station: String,
    current_status: OfficerStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AcknowledgeRequest {
    alert_id: Option<String>,
    supervisor_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AcknowledgeResponse {
    message: &'static str,
    alert_id: String,
    officer_id: String,
    officer_name: String,
    status: PanicAlertStatus,
    acknowledged_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ActiveAlertsResponse {
    message: &'static str,
    count: usize,
    alerts: Vec<AlertDetails>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn trigger_panic(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PanicRequest>,
) -> ApiResult<(StatusCode, Json<PanicResponse>)> {
    let officer_id = require_field(body.officer_id.as_deref(), "Officer ID is required")?;
    let location = body.location.and_then(PanicLocation::into_coordinates);

    let triggered = state.alert_service.trigger_panic(officer_id, location).await?;
    let details = triggered.details;

    let (status, message) = if triggered.deduplicated {
        info!("[Alerts] Officer {} re-triggered an active panic alert", officer_id);
        (StatusCode::OK, "Panic alert already active for this officer")
    } else {
        warn!("[Alerts] PANIC alert from officer {}", officer_id);
        (StatusCode::CREATED, "Panic alert created successfully")
    };

    let alert = PanicAlertView {
        alert_id: details.alert.id,
        officer: PanicOfficerView {
            officer_id: details.officer.officer_id,
            name: details.officer.name,
            rank: details.officer.rank,
            home_police_station: details.officer.home_police_station,
            current_status: details.officer.current_status,
        },
        location: details.alert.location,
        status: details.alert.status,
        triggered_at: details.alert.created_at,
    };

    Ok((status, Json(PanicResponse { message, alert })))
}

async fn acknowledge(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AcknowledgeRequest>,
) -> ApiResult<Json<AcknowledgeResponse>> {
    let alert_id = require_field(body.alert_id.as_deref(), "Alert ID is required")?;
    let supervisor_id = body
        .supervisor_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let acknowledged = state.alert_service.acknowledge(alert_id, supervisor_id).await?;
    info!(
        "[Alerts] Alert {} acknowledged by {}",
        alert_id,
        supervisor_id.unwrap_or("unattributed supervisor")
    );

    Ok(Json(AcknowledgeResponse {
        message: "Panic alert acknowledged successfully",
        alert_id: acknowledged.alert.id,
        officer_id: acknowledged.officer.officer_id,
        officer_name: acknowledged.officer.name,
        status: acknowledged.alert.status,
        acknowledged_at: acknowledged.alert.updated_at,
    }))
}

async fn active_alerts(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ActiveAlertsResponse>> {
    let alerts = state.alert_service.list_active()?;

    Ok(Json(ActiveAlertsResponse {
        message: "Active panic alerts retrieved successfully",
        count: alerts.len(),
        alerts,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/alerts/panic", post(trigger_panic))
        .route("/alerts/acknowledge", patch(acknowledge))
        .route("/alerts/active", get(active_alerts))
}
