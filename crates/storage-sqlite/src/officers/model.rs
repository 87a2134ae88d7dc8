use diesel::prelude::*;

use bandobast_core::officers::{Officer, OfficerRole, OfficerStatus, Rank};
use bandobast_core::{Error, Result};

use crate::convert::{coordinates_from_columns, parse_timestamp};
use crate::errors::corrupt_row;

/// Row shape of the `officers` table. The force-issued login code
/// lives in `officer_code`; `officer_id` columns elsewhere always hold
/// the internal UUID.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::officers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OfficerDB {
    pub id: String,
    pub officer_code: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub rank: String,
    pub role: String,
    pub home_police_station: String,
    pub current_status: String,
    pub is_active: bool,
    pub current_lat: Option<f64>,
    pub current_lon: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<OfficerDB> for Officer {
    type Error = Error;

    fn try_from(row: OfficerDB) -> Result<Officer> {
        let rank = Rank::parse(&row.rank).ok_or_else(|| {
            corrupt_row(format!(
                "Unknown rank {:?} in officers row {}",
                row.rank, row.id
            ))
        })?;
        let role = OfficerRole::parse(&row.role).ok_or_else(|| {
            corrupt_row(format!(
                "Unknown role {:?} in officers row {}",
                row.role, row.id
            ))
        })?;
        let current_status = OfficerStatus::parse(&row.current_status).ok_or_else(|| {
            corrupt_row(format!(
                "Unknown status {:?} in officers row {}",
                row.current_status, row.id
            ))
        })?;

        Ok(Officer {
            created_at: parse_timestamp("officers", &row.id, &row.created_at)?,
            updated_at: parse_timestamp("officers", &row.id, &row.updated_at)?,
            current_location: coordinates_from_columns(row.current_lat, row.current_lon),
            id: row.id,
            officer_id: row.officer_code,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            rank,
            role,
            home_police_station: row.home_police_station,
            current_status,
            is_active: row.is_active,
        })
    }
}
