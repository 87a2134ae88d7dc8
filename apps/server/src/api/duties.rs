//! Duty lifecycle endpoints: clock-in/out, the checkout handshake,
//! cancellation, and the duty listings the dashboards poll.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use bandobast_core::duties::{CheckoutDecision, Duty, DutyStatus, DutyWithOfficer};

use crate::api::require_field;
use crate::error::ApiResult;
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OfficerActionRequest {
    officer_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClockInResponse {
    message: &'static str,
    duty: DutyWithOfficer,
}

#[derive(Debug, Serialize)]
struct ClockOutResponse {
    message: &'static str,
    duty: DutyWithOfficer,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequestedResponse {
    message: &'static str,
    duty_id: String,
    officer_id: String,
    officer_name: String,
    status: DutyStatus,
    requested_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RespondCheckoutRequest {
    duty_id: Option<String>,
    decision: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutDecisionResponse {
    message: &'static str,
    duty_id: String,
    officer_id: String,
    officer_name: String,
    status: DutyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_out_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    denied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CancelDutyRequest {
    duty_id: Option<String>,
    supervisor_id: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct CancelDutyResponse {
    message: &'static str,
    duty: DutyWithOfficer,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MyDutiesResponse {
    message: &'static str,
    officer_id: String,
    count: usize,
    duties: Vec<Duty>,
}

#[derive(Debug, Serialize)]
struct RecentDutiesResponse {
    message: &'static str,
    count: usize,
    duties: Vec<DutyWithOfficer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PendingRequestsResponse {
    message: &'static str,
    count: usize,
    pending_requests: Vec<DutyWithOfficer>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn clock_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OfficerActionRequest>,
) -> ApiResult<Json<ClockInResponse>> {
    let officer_id = require_field(body.officer_id.as_deref(), "Officer ID is required")?;

    let duty = state.duty_service.clock_in(officer_id).await?;
    info!("[Duties] Officer {} clocked in at {}", officer_id, duty.duty.post);

    Ok(Json(ClockInResponse {
        message: "Clock-in successful",
        duty,
    }))
}

async fn clock_out(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OfficerActionRequest>,
) -> ApiResult<Json<ClockOutResponse>> {
    let officer_id = require_field(body.officer_id.as_deref(), "Officer ID is required")?;

    let duty = state.duty_service.clock_out(officer_id).await?;
    info!("[Duties] Officer {} clocked out", officer_id);

    Ok(Json(ClockOutResponse {
        message: "Clock-out successful",
        duty,
        timestamp: Utc::now(),
    }))
}

async fn request_checkout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OfficerActionRequest>,
) -> ApiResult<Json<CheckoutRequestedResponse>> {
    let officer_id = require_field(body.officer_id.as_deref(), "Officer ID is required")?;

    let result = state.duty_service.request_checkout(officer_id).await?;
    info!("[Duties] Officer {} requested checkout", officer_id);

    Ok(Json(CheckoutRequestedResponse {
        message: "Checkout request submitted successfully",
        duty_id: result.duty.id.clone(),
        officer_id: result.officer.officer_id.clone(),
        officer_name: result.officer.name.clone(),
        status: result.duty.status,
        requested_at: result.duty.updated_at,
    }))
}

async fn respond_checkout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RespondCheckoutRequest>,
) -> ApiResult<Json<CheckoutDecisionResponse>> {
    let duty_id = require_field(body.duty_id.as_deref(), "Duty ID is required")?;
    let decision = require_field(
        body.decision.as_deref(),
        "Decision must be either \"approved\" or \"denied\"",
    )?;
    let decision = CheckoutDecision::parse(decision)?;
    let reason = body
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let result = state
        .duty_service
        .respond_to_checkout(duty_id, decision, reason.clone())
        .await?;
    info!("[Duties] Checkout for duty {} {:?}", duty_id, decision);

    let response = match decision {
        CheckoutDecision::Approved => CheckoutDecisionResponse {
            message: "Checkout request approved successfully",
            duty_id: result.duty.id.clone(),
            officer_id: result.officer.officer_id.clone(),
            officer_name: result.officer.name.clone(),
            status: result.duty.status,
            check_out_time: result.duty.check_out_time,
            approved_at: Some(result.duty.updated_at),
            reason: None,
            denied_at: None,
        },
        CheckoutDecision::Denied => CheckoutDecisionResponse {
            message: "Checkout request denied successfully",
            duty_id: result.duty.id.clone(),
            officer_id: result.officer.officer_id.clone(),
            officer_name: result.officer.name.clone(),
            status: result.duty.status,
            check_out_time: None,
            approved_at: None,
            reason: Some(reason.unwrap_or_else(|| "No reason provided".to_string())),
            denied_at: Some(result.duty.updated_at),
        },
    };

    Ok(Json(response))
}

async fn cancel_duty(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CancelDutyRequest>,
) -> ApiResult<Json<CancelDutyResponse>> {
    let duty_id = require_field(body.duty_id.as_deref(), "Duty ID is required")?;
    let supervisor_id = require_field(body.supervisor_id.as_deref(), "Supervisor ID is required")?;

    let duty = state
        .duty_service
        .cancel(duty_id, supervisor_id, body.reason.clone())
        .await?;
    info!("[Duties] Duty {} cancelled by {}", duty_id, supervisor_id);

    Ok(Json(CancelDutyResponse {
        message: "Duty cancelled successfully",
        duty,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn my_duties(
    State(state): State<Arc<AppState>>,
    Path(officer_id): Path<String>,
) -> ApiResult<Json<MyDutiesResponse>> {
    let duties = state.duty_service.my_duties(&officer_id)?;

    Ok(Json(MyDutiesResponse {
        message: "Officer duties retrieved successfully",
        officer_id,
        count: duties.len(),
        duties,
    }))
}

async fn recent_duties(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecentDutiesResponse>> {
    let duties = state.duty_service.recent_duties()?;

    Ok(Json(RecentDutiesResponse {
        message: "Recent duties retrieved successfully",
        count: duties.len(),
        duties,
    }))
}

async fn pending_requests(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PendingRequestsResponse>> {
    let pending = state.duty_service.pending_checkout_requests()?;

    Ok(Json(PendingRequestsResponse {
        message: "Pending checkout requests retrieved successfully",
        count: pending.len(),
        pending_requests: pending,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Officer lifecycle
        .route("/duties/clock-in", patch(clock_in))
        .route("/duties/clock-out", patch(clock_out))
        .route("/duties/request-checkout", patch(request_checkout))
        // Supervisor decisions
        .route("/duties/respond-checkout", patch(respond_checkout))
        .route("/duties/cancel", patch(cancel_duty))
        // Listings
        .route("/duties/my-duties/{officerId}", get(my_duties))
        .route("/duties/recent", get(recent_duties))
        .route("/duties/pending-requests", get(pending_requests))
}
