use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use bandobast_core::duties::{Duty, DutyRepositoryTrait, DutyStatus, NewDuty};
use bandobast_core::{Error, Result};

use super::model::DutyDB;
use crate::convert::format_timestamp;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::duties;

pub struct DutyRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DutyRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        DutyRepository { pool, writer }
    }

    fn rows_to_domain(rows: Vec<DutyDB>) -> Result<Vec<Duty>> {
        rows.into_iter().map(Duty::try_from).collect()
    }
}

#[async_trait]
impl DutyRepositoryTrait for DutyRepository {
    fn find_by_id(&self, duty_id: &str) -> Result<Option<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        duties::table
            .find(duty_id)
            .first::<DutyDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Duty::try_from)
            .transpose()
    }

    fn find_active_for_officer(&self, officer_uuid: &str) -> Result<Option<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        duties::table
            .filter(duties::officer_id.eq(officer_uuid))
            .filter(duties::status.eq(DutyStatus::Active.as_str()))
            .order(duties::created_at.desc())
            .first::<DutyDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Duty::try_from)
            .transpose()
    }

    fn find_current_for_officer(&self, officer_uuid: &str) -> Result<Option<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        duties::table
            .filter(duties::officer_id.eq(officer_uuid))
            .filter(duties::status.eq_any([
                DutyStatus::Active.as_str(),
                DutyStatus::CheckoutPending.as_str(),
            ]))
            .order(duties::updated_at.desc())
            .first::<DutyDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Duty::try_from)
            .transpose()
    }

    fn latest_assigned_for_officer(&self, officer_uuid: &str) -> Result<Option<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        duties::table
            .filter(duties::officer_id.eq(officer_uuid))
            .filter(duties::status.eq(DutyStatus::Assigned.as_str()))
            .order(duties::created_at.desc())
            .first::<DutyDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Duty::try_from)
            .transpose()
    }

    fn list_for_officer(&self, officer_uuid: &str, limit: i64) -> Result<Vec<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = duties::table
            .filter(duties::officer_id.eq(officer_uuid))
            .order(duties::created_at.desc())
            .limit(limit)
            .load::<DutyDB>(&mut conn)
            .map_err(StorageError::from)?;
        DutyRepository::rows_to_domain(rows)
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = duties::table
            .order(duties::created_at.desc())
            .limit(limit)
            .load::<DutyDB>(&mut conn)
            .map_err(StorageError::from)?;
        DutyRepository::rows_to_domain(rows)
    }

    fn list_with_status(&self, status: DutyStatus) -> Result<Vec<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = duties::table
            .filter(duties::status.eq(status.as_str()))
            .order(duties::updated_at.desc())
            .load::<DutyDB>(&mut conn)
            .map_err(StorageError::from)?;
        DutyRepository::rows_to_domain(rows)
    }

    fn list_active_assigned_by(&self, supervisor_id: &str) -> Result<Vec<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = duties::table
            .filter(duties::assigned_by.eq(supervisor_id))
            .filter(duties::status.eq(DutyStatus::Active.as_str()))
            .load::<DutyDB>(&mut conn)
            .map_err(StorageError::from)?;
        DutyRepository::rows_to_domain(rows)
    }

    fn list_created_since(&self, officer_uuid: &str, since: DateTime<Utc>) -> Result<Vec<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = duties::table
            .filter(duties::officer_id.eq(officer_uuid))
            .filter(duties::created_at.ge(format_timestamp(since)))
            .order(duties::created_at.desc())
            .load::<DutyDB>(&mut conn)
            .map_err(StorageError::from)?;
        DutyRepository::rows_to_domain(rows)
    }

    fn list_all(&self) -> Result<Vec<Duty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = duties::table
            .load::<DutyDB>(&mut conn)
            .map_err(StorageError::from)?;
        DutyRepository::rows_to_domain(rows)
    }

    fn distinct_sectors(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        duties::table
            .select(duties::sector)
            .distinct()
            .order(duties::sector.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)
            .map_err(Error::from)
    }

    fn distinct_zones(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        duties::table
            .select(duties::zone)
            .distinct()
            .order(duties::zone.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)
            .map_err(Error::from)
    }

    async fn insert(&self, new_duty: NewDuty) -> Result<Duty> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Duty> {
                let now = format_timestamp(Utc::now());
                let row = DutyDB {
                    id: Uuid::new_v4().to_string(),
                    officer_id: new_duty.officer_id,
                    assigned_by: new_duty.assigned_by,
                    bandobast_name: new_duty.bandobast_name,
                    sector: new_duty.sector,
                    zone: new_duty.zone,
                    post: new_duty.post,
                    duty_date: new_duty.duty_date,
                    shift: new_duty.shift,
                    description: new_duty.description,
                    status: DutyStatus::Assigned.as_str().to_string(),
                    assigned_lat: new_duty.assigned_location.lat,
                    assigned_lon: new_duty.assigned_location.lon,
                    current_lat: None,
                    current_lon: None,
                    check_in_time: None,
                    check_out_time: None,
                    is_outside_geofence: false,
                    time_outside_geofence_in_seconds: 0,
                    geofence_alert_raised: false,
                    last_location_timestamp: None,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let inserted = diesel::insert_into(duties::table)
                    .values(&row)
                    .returning(DutyDB::as_returning())
                    .get_result::<DutyDB>(conn)
                    .map_err(StorageError::from)?;
                Duty::try_from(inserted)
            })
            .await
    }

    async fn update(&self, duty: Duty) -> Result<Duty> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Duty> {
                let mut row = DutyDB::from_domain(&duty);
                row.updated_at = format_timestamp(Utc::now());

                let affected = diesel::update(duties::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::not_found("Duty not found"));
                }

                let fresh = duties::table
                    .find(&row.id)
                    .first::<DutyDB>(conn)
                    .map_err(StorageError::from)?;
                Duty::try_from(fresh)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(duties::table)
                    .execute(conn)
                    .map_err(StorageError::from)
                    .map_err(Error::from)
            })
            .await
    }
}
