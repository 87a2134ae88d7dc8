use diesel::prelude::*;

use bandobast_core::duties::{Duty, DutyStatus};
use bandobast_core::geo::Coordinates;
use bandobast_core::{Error, Result};

use crate::convert::{
    coordinates_from_columns, format_timestamp, parse_timestamp, parse_timestamp_opt,
};
use crate::errors::corrupt_row;

/// Row shape of the `duties` table. Used both as an insert row and,
/// with `treat_none_as_null`, as the full-row changeset behind
/// [`DutyRepositoryTrait::update`], so clearing `current_location`
/// actually writes NULL.
///
/// [`DutyRepositoryTrait::update`]: bandobast_core::duties::DutyRepositoryTrait::update
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::duties)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DutyDB {
    pub id: String,
    pub officer_id: String,
    pub assigned_by: Option<String>,
    pub bandobast_name: String,
    pub sector: String,
    pub zone: String,
    pub post: String,
    pub duty_date: String,
    pub shift: String,
    pub description: String,
    pub status: String,
    pub assigned_lat: f64,
    pub assigned_lon: f64,
    pub current_lat: Option<f64>,
    pub current_lon: Option<f64>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub is_outside_geofence: bool,
    pub time_outside_geofence_in_seconds: i64,
    pub geofence_alert_raised: bool,
    pub last_location_timestamp: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DutyDB {
    /// Full-row image of a domain duty.
    pub fn from_domain(duty: &Duty) -> DutyDB {
        DutyDB {
            id: duty.id.clone(),
            officer_id: duty.officer_id.clone(),
            assigned_by: duty.assigned_by.clone(),
            bandobast_name: duty.bandobast_name.clone(),
            sector: duty.sector.clone(),
            zone: duty.zone.clone(),
            post: duty.post.clone(),
            duty_date: duty.duty_date.clone(),
            shift: duty.shift.clone(),
            description: duty.description.clone(),
            status: duty.status.as_str().to_string(),
            assigned_lat: duty.assigned_location.lat,
            assigned_lon: duty.assigned_location.lon,
            current_lat: duty.current_location.map(|loc| loc.lat),
            current_lon: duty.current_location.map(|loc| loc.lon),
            check_in_time: duty.check_in_time.map(format_timestamp),
            check_out_time: duty.check_out_time.map(format_timestamp),
            is_outside_geofence: duty.is_outside_geofence,
            time_outside_geofence_in_seconds: duty.time_outside_geofence_in_seconds,
            geofence_alert_raised: duty.geofence_alert_raised,
            last_location_timestamp: duty.last_location_timestamp.map(format_timestamp),
            created_at: format_timestamp(duty.created_at),
            updated_at: format_timestamp(duty.updated_at),
        }
    }
}

impl TryFrom<DutyDB> for Duty {
    type Error = Error;

    fn try_from(row: DutyDB) -> Result<Duty> {
        let status = DutyStatus::parse(&row.status).ok_or_else(|| {
            corrupt_row(format!(
                "Unknown status {:?} in duties row {}",
                row.status, row.id
            ))
        })?;

        Ok(Duty {
            status,
            assigned_location: Coordinates {
                lat: row.assigned_lat,
                lon: row.assigned_lon,
            },
            current_location: coordinates_from_columns(row.current_lat, row.current_lon),
            check_in_time: parse_timestamp_opt("duties", &row.id, row.check_in_time.as_deref())?,
            check_out_time: parse_timestamp_opt("duties", &row.id, row.check_out_time.as_deref())?,
            last_location_timestamp: parse_timestamp_opt(
                "duties",
                &row.id,
                row.last_location_timestamp.as_deref(),
            )?,
            created_at: parse_timestamp("duties", &row.id, &row.created_at)?,
            updated_at: parse_timestamp("duties", &row.id, &row.updated_at)?,
            id: row.id,
            officer_id: row.officer_id,
            assigned_by: row.assigned_by,
            bandobast_name: row.bandobast_name,
            sector: row.sector,
            zone: row.zone,
            post: row.post,
            duty_date: row.duty_date,
            shift: row.shift,
            description: row.description,
            is_outside_geofence: row.is_outside_geofence,
            time_outside_geofence_in_seconds: row.time_outside_geofence_in_seconds,
            geofence_alert_raised: row.geofence_alert_raised,
        })
    }
}
