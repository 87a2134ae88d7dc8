//! Location ping endpoint. Every ping from an on-duty officer runs the
//! geofence evaluation in the duty service; exit/enter/dwell events go
//! out over the event bus, so this handler only reports the outcome.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bandobast_core::duties::LocationUpdateOutcome;
use bandobast_core::officers::Officer;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LocationUpdateRequest {
    officer_id: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Serialize)]
struct LocationUpdateResponse {
    message: &'static str,
    officer: Officer,
    duty: DutyGeofenceView,
    timestamp: DateTime<Utc>,
}

/// The slice of the duty the tracking map needs after a ping.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DutyGeofenceView {
    duty_id: String,
    bandobast_name: String,
    sector: String,
    zone: String,
    post: String,
    is_outside_geofence: bool,
    time_outside_geofence_in_seconds: i64,
    distance: i64,
}

impl From<&LocationUpdateOutcome> for DutyGeofenceView {
    fn from(outcome: &LocationUpdateOutcome) -> Self {
        DutyGeofenceView {
            duty_id: outcome.duty.id.clone(),
            bandobast_name: outcome.duty.bandobast_name.clone(),
            sector: outcome.duty.sector.clone(),
            zone: outcome.duty.zone.clone(),
            post: outcome.duty.post.clone(),
            is_outside_geofence: outcome.duty.is_outside_geofence,
            time_outside_geofence_in_seconds: outcome.duty.time_outside_geofence_in_seconds,
            distance: outcome.distance_from_post_meters.round() as i64,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationUpdateRequest>,
) -> ApiResult<Json<LocationUpdateResponse>> {
    let officer_id = body
        .officer_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let (Some(officer_id), Some(lat), Some(lon)) = (officer_id, body.lat, body.lon) else {
        return Err(ApiError::bad_request(
            "Missing required fields: officerId, lat, lon",
        ));
    };

    let outcome = state.duty_service.update_location(officer_id, lat, lon).await?;
    debug!(
        "[Location] {} pinged from ({lat}, {lon}), {:.0}m from post",
        officer_id, outcome.distance_from_post_meters
    );

    let duty = DutyGeofenceView::from(&outcome);
    Ok(Json(LocationUpdateResponse {
        message: "Location updated successfully",
        officer: outcome.officer,
        duty,
        timestamp: outcome.timestamp,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/location/update", post(update_location))
}
