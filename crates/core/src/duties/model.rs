use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::geo::Coordinates;
use crate::officers::{Officer, OfficerSummary};

/// Lifecycle state of a duty assignment.
///
/// `Assigned -> Active -> CheckoutPending -> Completed` is the normal
/// path; a denied checkout moves `CheckoutPending` back to `Active`,
/// and a supervisor can move `Assigned` straight to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DutyStatus {
    Assigned,
    Active,
    #[serde(rename = "Checkout Pending")]
    CheckoutPending,
    Completed,
    Cancelled,
}

impl DutyStatus {
    pub const ALL: [DutyStatus; 5] = [
        DutyStatus::Assigned,
        DutyStatus::Active,
        DutyStatus::CheckoutPending,
        DutyStatus::Completed,
        DutyStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DutyStatus::Assigned => "Assigned",
            DutyStatus::Active => "Active",
            DutyStatus::CheckoutPending => "Checkout Pending",
            DutyStatus::Completed => "Completed",
            DutyStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<DutyStatus> {
        DutyStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
    }
}

impl std::fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single deployment of one officer to one post.
///
/// `assigned_location` is the post the supervisor pinned at roster
/// time and never moves; `current_location` trails the officer's
/// live position while the duty is active. Geofence checks always
/// measure against `assigned_location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duty {
    pub id: String,
    /// Internal UUID of the assigned officer.
    #[serde(rename = "officer")]
    pub officer_id: String,
    /// Internal UUID of the supervisor who created the assignment.
    pub assigned_by: Option<String>,
    pub bandobast_name: String,
    pub sector: String,
    pub zone: String,
    pub post: String,
    pub duty_date: String,
    pub shift: String,
    pub description: String,
    pub status: DutyStatus,
    pub assigned_location: Coordinates,
    pub current_location: Option<Coordinates>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub is_outside_geofence: bool,
    pub time_outside_geofence_in_seconds: i64,
    /// Debounce flag: set when the dwell alert fires, cleared when the
    /// officer re-enters the fence.
    pub geofence_alert_raised: bool,
    pub last_location_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a roster assignment. Status starts at
/// `Assigned`; the repository assigns the UUID and timestamps.
#[derive(Debug, Clone)]
pub struct NewDuty {
    pub officer_id: String,
    pub assigned_by: Option<String>,
    pub bandobast_name: String,
    pub sector: String,
    pub zone: String,
    pub post: String,
    pub duty_date: String,
    pub shift: String,
    pub description: String,
    pub assigned_location: Coordinates,
}

/// A duty joined with the identity of its officer, the shape most
/// listings and transition responses use.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyWithOfficer {
    #[serde(flatten)]
    pub duty: Duty,
    #[serde(rename = "officerDetails")]
    pub officer: OfficerSummary,
}

/// Supervisor's verdict on a checkout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutDecision {
    Approved,
    Denied,
}

impl CheckoutDecision {
    pub fn parse(value: &str) -> Result<CheckoutDecision> {
        match value {
            "approved" => Ok(CheckoutDecision::Approved),
            "denied" => Ok(CheckoutDecision::Denied),
            _ => Err(Error::validation(
                "Decision must be either \"approved\" or \"denied\"",
            )),
        }
    }
}

/// Result of an accepted location ping: the refreshed records plus
/// the measured distance from the assigned post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateOutcome {
    pub officer: Officer,
    pub duty: Duty,
    pub distance_from_post_meters: f64,
    pub timestamp: DateTime<Utc>,
}

/// One duty's contribution to an officer's rolling 24-hour total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyHours {
    pub duty_id: String,
    pub post: String,
    pub zone: String,
    pub status: DutyStatus,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub duration_ms: i64,
    pub duration_hours: f64,
}

/// Hours an officer worked across the trailing 24 hours. Duties that
/// are still running count up to the moment of the query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursToday {
    pub officer_id: String,
    pub officer_name: String,
    pub time_from: DateTime<Utc>,
    pub time_to: DateTime<Utc>,
    /// Rounded to the nearest half hour for roster-style display.
    pub total_hours: f64,
    pub total_hours_raw: f64,
    pub total_duration_ms: i64,
    pub duties_count: usize,
    pub duties: Vec<DutyHours>,
}
