//! Roster upload: a supervisor posts a CSV and every resolvable row
//! becomes an `Assigned` duty.
//!
//! Rosters arrive from different district offices with inconsistent
//! headers, so each column is matched against a set of aliases
//! (case-insensitive, trimmed). A file with no recognizable officer
//! column falls back to reading codes from the first column.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use bandobast_core::duties::{RosterOutcome, RosterRow};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

const FILE_FIELD: &str = "dutyRoster";
const SUPERVISOR_FIELD: &str = "supervisorId";

// Column aliases, compared against lowercased trimmed headers.
const OFFICER_HEADERS: &[&str] = &["officer id", "officerid"];
const DUTY_NAME_HEADERS: &[&str] = &["duty name", "bandobast", "event"];
const SECTOR_HEADERS: &[&str] = &["sector", "area"];
const ZONE_HEADERS: &[&str] = &["zone", "district"];
const POST_HEADERS: &[&str] = &["post", "location", "station"];
const LATITUDE_HEADERS: &[&str] = &["latitude", "lat"];
const LONGITUDE_HEADERS: &[&str] = &["longitude", "lon"];
const DATE_HEADERS: &[&str] = &["duty date", "date"];
const SHIFT_HEADERS: &[&str] = &["shift", "time"];
const DESCRIPTION_HEADERS: &[&str] = &["description", "notes"];

// ─────────────────────────────────────────────────────────────────────────────
// Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RosterUploadResponse {
    message: &'static str,
    file_name: String,
    #[serde(flatten)]
    outcome: RosterOutcome,
    summary: RosterSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RosterSummary {
    total_processed: usize,
    successful: usize,
    failed: usize,
    success_rate: String,
}

impl RosterSummary {
    fn from_outcome(outcome: &RosterOutcome) -> Self {
        let total = outcome.total_rows;
        let successful = outcome.successful_assignments;
        let rate = if total == 0 {
            "0%".to_string()
        } else {
            format!("{}%", (successful as f64 / total as f64 * 100.0).round())
        };

        RosterSummary {
            total_processed: total,
            successful,
            failed: total - successful,
            success_rate: rate,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CSV Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse roster CSV bytes into rows. Fully blank lines are skipped;
/// blank cells become `None` so ingestion can apply deployment
/// defaults. Unparseable coordinates are treated as absent.
fn parse_roster_csv(data: &[u8]) -> Result<Vec<RosterRow>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(bad_csv)?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    let column =
        |aliases: &[&str]| headers.iter().position(|header| aliases.contains(&header.as_str()));

    // Rosters without a recognizable officer header still get a best
    // effort read from the first column.
    let officer_column = column(OFFICER_HEADERS).unwrap_or(0);
    let duty_name_column = column(DUTY_NAME_HEADERS);
    let sector_column = column(SECTOR_HEADERS);
    let zone_column = column(ZONE_HEADERS);
    let post_column = column(POST_HEADERS);
    let latitude_column = column(LATITUDE_HEADERS);
    let longitude_column = column(LONGITUDE_HEADERS);
    let date_column = column(DATE_HEADERS);
    let shift_column = column(SHIFT_HEADERS);
    let description_column = column(DESCRIPTION_HEADERS);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(bad_csv)?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cell = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        rows.push(RosterRow {
            officer_code: cell(Some(officer_column)).unwrap_or_default(),
            duty_name: cell(duty_name_column),
            sector: cell(sector_column),
            zone: cell(zone_column),
            post: cell(post_column),
            latitude: cell(latitude_column).and_then(|value| value.parse().ok()),
            longitude: cell(longitude_column).and_then(|value| value.parse().ok()),
            duty_date: cell(date_column),
            shift: cell(shift_column),
            description: cell(description_column),
        });
    }

    Ok(rows)
}

fn bad_csv(err: csv::Error) -> ApiError {
    ApiError::bad_request(format!("Failed to parse roster file: {err}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

async fn upload_roster(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<RosterUploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut supervisor_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Invalid multipart request: {err}")))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or("roster.csv").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::bad_request(format!("Failed to read upload: {err}")))?;
                file = Some((file_name, data.to_vec()));
            }
            Some(SUPERVISOR_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ApiError::bad_request(format!("Failed to read upload: {err}")))?;
                supervisor_id = Some(value);
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = file else {
        return Err(ApiError::bad_request(
            "No file uploaded. Please provide a file with field name \"dutyRoster\"",
        ));
    };
    let supervisor_id = supervisor_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(
                "Supervisor ID is required. Please provide supervisorId in form data.",
            )
        })?;
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(ApiError::bad_request("Only CSV files (.csv) are allowed"));
    }

    let rows = parse_roster_csv(&data)?;
    info!(
        "[Roster] {} uploaded {} ({} rows)",
        supervisor_id,
        file_name,
        rows.len()
    );

    let outcome = state.duty_service.ingest_roster(supervisor_id, rows).await?;
    let summary = RosterSummary::from_outcome(&outcome);

    Ok(Json(RosterUploadResponse {
        message: "Duty assignments processed successfully",
        file_name,
        outcome,
        summary,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/duties/upload", post(upload_roster))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_headers() {
        let csv = b"Officer ID,Duty Name,Sector,Zone,Post,Latitude,Longitude,Duty Date,Shift,Description\n\
                    OFF001,Ganesh Chaturthi,North,Zone 1,Temple Gate,15.5,73.83,2025-09-01,Morning,Crowd control\n";

        let rows = parse_roster_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.officer_code, "OFF001");
        assert_eq!(row.duty_name.as_deref(), Some("Ganesh Chaturthi"));
        assert_eq!(row.sector.as_deref(), Some("North"));
        assert_eq!(row.zone.as_deref(), Some("Zone 1"));
        assert_eq!(row.post.as_deref(), Some("Temple Gate"));
        assert_eq!(row.latitude, Some(15.5));
        assert_eq!(row.longitude, Some(73.83));
        assert_eq!(row.duty_date.as_deref(), Some("2025-09-01"));
        assert_eq!(row.shift.as_deref(), Some("Morning"));
        assert_eq!(row.description.as_deref(), Some("Crowd control"));
    }

    #[test]
    fn matches_header_aliases_case_insensitively() {
        let csv = b"officerid,BANDOBAST,Area,District,Station,Lat,Lon,Date,Time,Notes\n\
                    OFF002,Carnival,South,Margao,Market Square,15.27,73.95,2025-02-20,Evening,VIP route\n";

        let rows = parse_roster_csv(csv).unwrap();
        let row = &rows[0];
        assert_eq!(row.officer_code, "OFF002");
        assert_eq!(row.duty_name.as_deref(), Some("Carnival"));
        assert_eq!(row.sector.as_deref(), Some("South"));
        assert_eq!(row.zone.as_deref(), Some("Margao"));
        assert_eq!(row.post.as_deref(), Some("Market Square"));
        assert_eq!(row.shift.as_deref(), Some("Evening"));
        assert_eq!(row.description.as_deref(), Some("VIP route"));
    }

    #[test]
    fn unknown_officer_header_falls_back_to_first_column() {
        let csv = b"Badge,Duty Name\nOFF003,Night Patrol\n";

        let rows = parse_roster_csv(csv).unwrap();
        assert_eq!(rows[0].officer_code, "OFF003");
        assert_eq!(rows[0].duty_name.as_deref(), Some("Night Patrol"));
    }

    #[test]
    fn blank_cells_and_bad_coordinates_become_none() {
        let csv = b"Officer ID,Sector,Latitude,Longitude\nOFF004,,not-a-number,\n";

        let rows = parse_roster_csv(csv).unwrap();
        let row = &rows[0];
        assert_eq!(row.officer_code, "OFF004");
        assert_eq!(row.sector, None);
        assert_eq!(row.latitude, None);
        assert_eq!(row.longitude, None);
    }

    #[test]
    fn skips_fully_blank_lines() {
        let csv = b"Officer ID,Post\nOFF005,Ferry Wharf\n,,\n  , \nOFF006,Jetty\n";

        let rows = parse_roster_csv(csv).unwrap();
        let codes: Vec<&str> = rows.iter().map(|row| row.officer_code.as_str()).collect();
        assert_eq!(codes, vec!["OFF005", "OFF006"]);
    }

    #[test]
    fn success_rate_survives_an_empty_file() {
        let summary = RosterSummary::from_outcome(&RosterOutcome::default());
        assert_eq!(summary.success_rate, "0%");
        assert_eq!(summary.failed, 0);

        let outcome = RosterOutcome {
            total_rows: 3,
            successful_assignments: 2,
            unfound_officer_ids: vec!["DEMO999".to_string()],
            created_duties: Vec::new(),
        };
        let summary = RosterSummary::from_outcome(&outcome);
        assert_eq!(summary.success_rate, "67%");
        assert_eq!(summary.failed, 1);
    }
}
