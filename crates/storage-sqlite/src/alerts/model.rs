use diesel::prelude::*;

use bandobast_core::alerts::{PanicAlert, PanicAlertStatus};
use bandobast_core::geo::Coordinates;
use bandobast_core::{Error, Result};

use crate::convert::parse_timestamp;
use crate::errors::corrupt_row;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::panic_alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PanicAlertDB {
    pub id: String,
    pub officer_id: String,
    pub lat: f64,
    pub lon: f64,
    pub status: String,
    pub acknowledged_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<PanicAlertDB> for PanicAlert {
    type Error = Error;

    fn try_from(row: PanicAlertDB) -> Result<PanicAlert> {
        let status = PanicAlertStatus::parse(&row.status).ok_or_else(|| {
            corrupt_row(format!(
                "Unknown status {:?} in panic_alerts row {}",
                row.status, row.id
            ))
        })?;

        Ok(PanicAlert {
            status,
            location: Coordinates {
                lat: row.lat,
                lon: row.lon,
            },
            created_at: parse_timestamp("panic_alerts", &row.id, &row.created_at)?,
            updated_at: parse_timestamp("panic_alerts", &row.id, &row.updated_at)?,
            id: row.id,
            officer_id: row.officer_id,
            acknowledged_by: row.acknowledged_by,
        })
    }
}
