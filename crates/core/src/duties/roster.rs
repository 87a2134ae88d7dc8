//! Roster ingestion types and deployment defaults.

use serde::Serialize;

use crate::geo::Coordinates;

pub const DEFAULT_BANDOBAST_NAME: &str = "Duty Assignment";
pub const DEFAULT_SECTOR: &str = "General";
pub const DEFAULT_ZONE: &str = "Zone A";
pub const DEFAULT_POST: &str = "Post 1";
pub const DEFAULT_SHIFT: &str = "General";

/// Panaji city centre. Used when a roster row carries no post
/// coordinates.
pub const DEFAULT_ASSIGNED_LOCATION: Coordinates = Coordinates {
    lat: 15.4989,
    lon: 73.8278,
};

/// One parsed roster line. Only the officer code is mandatory; every
/// other column falls back to a deployment default at ingestion.
/// `None` covers both a missing column and a blank cell.
#[derive(Debug, Clone, Default)]
pub struct RosterRow {
    pub officer_code: String,
    pub duty_name: Option<String>,
    pub sector: Option<String>,
    pub zone: Option<String>,
    pub post: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub duty_date: Option<String>,
    pub shift: Option<String>,
    pub description: Option<String>,
}

/// One assignment created from a roster row, echoed back to the
/// uploading supervisor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAssignment {
    pub duty_id: String,
    pub officer_id: String,
    pub officer_name: String,
    pub bandobast_name: String,
    pub sector: String,
    pub zone: String,
    pub post: String,
    pub duty_date: String,
    pub shift: String,
}

/// Ingestion report: rows seen, duties created, and the officer codes
/// that matched no account.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterOutcome {
    pub total_rows: usize,
    pub successful_assignments: usize,
    pub unfound_officer_ids: Vec<String>,
    pub created_duties: Vec<CreatedAssignment>,
}
