use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duties::Duty;
use crate::geo::Coordinates;
use crate::officers::Officer;

/// Fallback position for a panic alert when the officer's device has
/// no fix. Roughly the centre of Goa.
pub const DEFAULT_PANIC_LOCATION: Coordinates = Coordinates {
    lat: 15.6000,
    lon: 73.8000,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanicAlertStatus {
    Active,
    Acknowledged,
}

impl PanicAlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanicAlertStatus::Active => "Active",
            PanicAlertStatus::Acknowledged => "Acknowledged",
        }
    }

    pub fn parse(value: &str) -> Option<PanicAlertStatus> {
        match value {
            "Active" => Some(PanicAlertStatus::Active),
            "Acknowledged" => Some(PanicAlertStatus::Acknowledged),
            _ => None,
        }
    }
}

impl std::fmt::Display for PanicAlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An SOS raised by an officer. At most one `Active` alert per
/// officer; repeated triggers return the existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanicAlert {
    pub id: String,
    /// Internal UUID of the officer who raised the alert.
    #[serde(rename = "officer")]
    pub officer_id: String,
    pub location: Coordinates,
    pub status: PanicAlertStatus,
    /// Internal UUID of the acknowledging supervisor, if any.
    pub acknowledged_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a fresh alert. Status starts at `Active`; the
/// repository assigns the UUID and timestamps.
#[derive(Debug, Clone)]
pub struct NewPanicAlert {
    pub officer_id: String,
    pub location: Coordinates,
}

/// An alert joined with the officer who raised it and whatever duty
/// they were running at the time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    pub alert: PanicAlert,
    pub officer: Officer,
    pub duty: Option<Duty>,
}

/// Result of a trigger. `deduplicated` marks that an `Active` alert
/// already existed and no new one was created or broadcast.
#[derive(Debug, Clone)]
pub struct TriggeredAlert {
    pub details: AlertDetails,
    pub deduplicated: bool,
}
