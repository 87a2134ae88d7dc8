//! Helpers shared by the row-to-domain conversions.

use chrono::{DateTime, Utc};

use bandobast_core::geo::Coordinates;
use bandobast_core::Result;

use crate::errors::corrupt_row;

/// Timestamps are stored as RFC 3339 text with a UTC offset, which
/// keeps lexicographic and chronological order identical for SQL
/// `ORDER BY`.
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn parse_timestamp(table: &str, id: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| corrupt_row(format!("Bad timestamp {value:?} in {table} row {id}")))
}

pub(crate) fn parse_timestamp_opt(
    table: &str,
    id: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>> {
    value.map(|raw| parse_timestamp(table, id, raw)).transpose()
}

/// Paired nullable columns become a position only when both are set.
pub(crate) fn coordinates_from_columns(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinates> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
        _ => None,
    }
}
