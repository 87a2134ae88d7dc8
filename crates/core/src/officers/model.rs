use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Goa Police rank codes, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "PI")]
    Pi,
    #[serde(rename = "PSI")]
    Psi,
    #[serde(rename = "ASI")]
    Asi,
    #[serde(rename = "HC")]
    Hc,
    #[serde(rename = "PC")]
    Pc,
    #[serde(rename = "LPC")]
    Lpc,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Pi,
        Rank::Psi,
        Rank::Asi,
        Rank::Hc,
        Rank::Pc,
        Rank::Lpc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Pi => "PI",
            Rank::Psi => "PSI",
            Rank::Asi => "ASI",
            Rank::Hc => "HC",
            Rank::Pc => "PC",
            Rank::Lpc => "LPC",
        }
    }

    pub fn parse(value: &str) -> Option<Rank> {
        Rank::ALL.iter().copied().find(|rank| rank.as_str() == value)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfficerRole {
    Officer,
    Supervisor,
}

impl OfficerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficerRole::Officer => "Officer",
            OfficerRole::Supervisor => "Supervisor",
        }
    }

    pub fn parse(value: &str) -> Option<OfficerRole> {
        match value {
            "Officer" => Some(OfficerRole::Officer),
            "Supervisor" => Some(OfficerRole::Supervisor),
            _ => None,
        }
    }
}

impl std::fmt::Display for OfficerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence state shown on the live dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfficerStatus {
    #[serde(rename = "On-Duty")]
    OnDuty,
    #[serde(rename = "Off-Duty")]
    OffDuty,
    #[serde(rename = "On-Break")]
    OnBreak,
}

impl OfficerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficerStatus::OnDuty => "On-Duty",
            OfficerStatus::OffDuty => "Off-Duty",
            OfficerStatus::OnBreak => "On-Break",
        }
    }

    pub fn parse(value: &str) -> Option<OfficerStatus> {
        match value {
            "On-Duty" => Some(OfficerStatus::OnDuty),
            "Off-Duty" => Some(OfficerStatus::OffDuty),
            "On-Break" => Some(OfficerStatus::OnBreak),
            _ => None,
        }
    }
}

impl std::fmt::Display for OfficerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An officer account. `id` is the internal UUID primary key;
/// `officer_id` is the force-issued code officers log in with
/// (e.g. "GPD-1042"), unique across the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub id: String,
    pub officer_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub rank: Rank,
    pub role: OfficerRole,
    pub home_police_station: String,
    pub current_status: OfficerStatus,
    pub is_active: bool,
    pub current_location: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Officer {
    pub fn summary(&self) -> OfficerSummary {
        OfficerSummary {
            officer_id: self.officer_id.clone(),
            name: self.name.clone(),
            rank: self.rank,
        }
    }
}

/// The identity fields embedded in duty listings and event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerSummary {
    pub officer_id: String,
    pub name: String,
    pub rank: Rank,
}

/// Insert payload for a new officer account. The repository assigns
/// the UUID and timestamps.
#[derive(Debug, Clone)]
pub struct NewOfficer {
    pub officer_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub rank: Rank,
    pub role: OfficerRole,
    pub home_police_station: String,
}
