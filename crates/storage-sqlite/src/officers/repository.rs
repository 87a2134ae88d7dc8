use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use bandobast_core::geo::Coordinates;
use bandobast_core::officers::{NewOfficer, Officer, OfficerRepositoryTrait, OfficerStatus};
use bandobast_core::{Error, Result};

use super::model::OfficerDB;
use crate::convert::format_timestamp;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::officers;

pub struct OfficerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl OfficerRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        OfficerRepository { pool, writer }
    }

    fn reload(conn: &mut SqliteConnection, officer_id: &str) -> Result<Officer> {
        let row = officers::table
            .find(officer_id)
            .first::<OfficerDB>(conn)
            .map_err(StorageError::from)?;
        Officer::try_from(row)
    }
}

#[async_trait]
impl OfficerRepositoryTrait for OfficerRepository {
    fn find_by_id(&self, officer_id: &str) -> Result<Option<Officer>> {
        let mut conn = get_connection(&self.pool)?;
        officers::table
            .find(officer_id)
            .first::<OfficerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Officer::try_from)
            .transpose()
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Officer>> {
        let mut conn = get_connection(&self.pool)?;
        officers::table
            .filter(officers::officer_code.eq(code))
            .first::<OfficerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Officer::try_from)
            .transpose()
    }

    fn find_by_email(&self, address: &str) -> Result<Option<Officer>> {
        let mut conn = get_connection(&self.pool)?;
        officers::table
            .filter(officers::email.eq(address))
            .first::<OfficerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Officer::try_from)
            .transpose()
    }

    fn list_by_ids(&self, ids: &[String]) -> Result<Vec<Officer>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = officers::table
            .filter(officers::id.eq_any(ids))
            .load::<OfficerDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Officer::try_from).collect()
    }

    fn count_active(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        officers::table
            .filter(officers::is_active.eq(true))
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)
            .map_err(Error::from)
    }

    fn count_with_status(&self, status: OfficerStatus) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        officers::table
            .filter(officers::current_status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)
            .map_err(Error::from)
    }

    async fn insert(&self, new_officer: NewOfficer) -> Result<Officer> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Officer> {
                let now = format_timestamp(Utc::now());
                let row = OfficerDB {
                    id: Uuid::new_v4().to_string(),
                    officer_code: new_officer.officer_id,
                    name: new_officer.name,
                    email: new_officer.email,
                    password_hash: new_officer.password_hash,
                    rank: new_officer.rank.as_str().to_string(),
                    role: new_officer.role.as_str().to_string(),
                    home_police_station: new_officer.home_police_station,
                    current_status: OfficerStatus::OffDuty.as_str().to_string(),
                    is_active: true,
                    current_lat: None,
                    current_lon: None,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let inserted = diesel::insert_into(officers::table)
                    .values(&row)
                    .returning(OfficerDB::as_returning())
                    .get_result::<OfficerDB>(conn)
                    .map_err(StorageError::from)?;
                Officer::try_from(inserted)
            })
            .await
    }

    async fn set_status(&self, officer_id: &str, status: OfficerStatus) -> Result<Officer> {
        let officer_id = officer_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Officer> {
                let affected = diesel::update(officers::table.find(&officer_id))
                    .set((
                        officers::current_status.eq(status.as_str()),
                        officers::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::not_found("Officer not found"));
                }
                OfficerRepository::reload(conn, &officer_id)
            })
            .await
    }

    async fn set_status_and_location(
        &self,
        officer_id: &str,
        status: OfficerStatus,
        location: Option<Coordinates>,
    ) -> Result<Officer> {
        let officer_id = officer_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Officer> {
                let affected = diesel::update(officers::table.find(&officer_id))
                    .set((
                        officers::current_status.eq(status.as_str()),
                        officers::current_lat.eq(location.map(|loc| loc.lat)),
                        officers::current_lon.eq(location.map(|loc| loc.lon)),
                        officers::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::not_found("Officer not found"));
                }
                OfficerRepository::reload(conn, &officer_id)
            })
            .await
    }

    async fn set_location(&self, officer_id: &str, location: Coordinates) -> Result<Officer> {
        let officer_id = officer_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Officer> {
                let affected = diesel::update(officers::table.find(&officer_id))
                    .set((
                        officers::current_lat.eq(Some(location.lat)),
                        officers::current_lon.eq(Some(location.lon)),
                        officers::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::not_found("Officer not found"));
                }
                OfficerRepository::reload(conn, &officer_id)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(officers::table)
                    .execute(conn)
                    .map_err(StorageError::from)
                    .map_err(Error::from)
            })
            .await
    }
}
