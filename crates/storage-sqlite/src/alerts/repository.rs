use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use bandobast_core::alerts::{
    NewPanicAlert, PanicAlert, PanicAlertRepositoryTrait, PanicAlertStatus,
};
use bandobast_core::{Error, Result};

use super::model::PanicAlertDB;
use crate::convert::format_timestamp;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::panic_alerts;

pub struct PanicAlertRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PanicAlertRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PanicAlertRepository { pool, writer }
    }
}

#[async_trait]
impl PanicAlertRepositoryTrait for PanicAlertRepository {
    fn find_by_id(&self, alert_id: &str) -> Result<Option<PanicAlert>> {
        let mut conn = get_connection(&self.pool)?;
        panic_alerts::table
            .find(alert_id)
            .first::<PanicAlertDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(PanicAlert::try_from)
            .transpose()
    }

    fn find_active_for_officer(&self, officer_uuid: &str) -> Result<Option<PanicAlert>> {
        let mut conn = get_connection(&self.pool)?;
        panic_alerts::table
            .filter(panic_alerts::officer_id.eq(officer_uuid))
            .filter(panic_alerts::status.eq(PanicAlertStatus::Active.as_str()))
            .order(panic_alerts::created_at.desc())
            .first::<PanicAlertDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(PanicAlert::try_from)
            .transpose()
    }

    fn list_active(&self) -> Result<Vec<PanicAlert>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = panic_alerts::table
            .filter(panic_alerts::status.eq(PanicAlertStatus::Active.as_str()))
            .order(panic_alerts::created_at.desc())
            .load::<PanicAlertDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(PanicAlert::try_from).collect()
    }

    async fn insert(&self, new_alert: NewPanicAlert) -> Result<PanicAlert> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PanicAlert> {
                let now = format_timestamp(Utc::now());
                let row = PanicAlertDB {
                    id: Uuid::new_v4().to_string(),
                    officer_id: new_alert.officer_id,
                    lat: new_alert.location.lat,
                    lon: new_alert.location.lon,
                    status: PanicAlertStatus::Active.as_str().to_string(),
                    acknowledged_by: None,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let inserted = diesel::insert_into(panic_alerts::table)
                    .values(&row)
                    .returning(PanicAlertDB::as_returning())
                    .get_result::<PanicAlertDB>(conn)
                    .map_err(StorageError::from)?;
                PanicAlert::try_from(inserted)
            })
            .await
    }

    async fn acknowledge(
        &self,
        alert_id: &str,
        supervisor_id: Option<&str>,
    ) -> Result<PanicAlert> {
        let alert_id = alert_id.to_string();
        let supervisor_id = supervisor_id.map(|value| value.to_string());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PanicAlert> {
                let affected = diesel::update(panic_alerts::table.find(&alert_id))
                    .set((
                        panic_alerts::status.eq(PanicAlertStatus::Acknowledged.as_str()),
                        panic_alerts::acknowledged_by.eq(supervisor_id),
                        panic_alerts::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::not_found("Panic alert not found"));
                }

                let fresh = panic_alerts::table
                    .find(&alert_id)
                    .first::<PanicAlertDB>(conn)
                    .map_err(StorageError::from)?;
                PanicAlert::try_from(fresh)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(panic_alerts::table)
                    .execute(conn)
                    .map_err(StorageError::from)
                    .map_err(Error::from)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::officers::OfficerRepository;
    use crate::test_support::{new_officer, setup_db};
    use bandobast_core::geo::Coordinates;
    use bandobast_core::officers::OfficerRepositoryTrait;

    async fn seeded() -> (PanicAlertRepository, String, String) {
        let (pool, writer) = setup_db();
        let officers = OfficerRepository::new(pool.clone(), writer.clone());
        let officer = officers
            .insert(new_officer("OFF001"))
            .await
            .expect("officer");
        let supervisor = officers
            .insert(new_officer("SUPER001"))
            .await
            .expect("supervisor");
        (
            PanicAlertRepository::new(pool, writer),
            officer.id,
            supervisor.id,
        )
    }

    fn sos(officer_id: &str) -> NewPanicAlert {
        NewPanicAlert {
            officer_id: officer_id.to_string(),
            location: Coordinates {
                lat: 15.6,
                lon: 73.8,
            },
        }
    }

    #[tokio::test]
    async fn insert_creates_an_active_unacknowledged_alert() {
        let (repo, officer_id, _supervisor_id) = seeded().await;

        let alert = repo.insert(sos(&officer_id)).await.expect("insert");
        assert_eq!(alert.status, PanicAlertStatus::Active);
        assert!(alert.acknowledged_by.is_none());

        let found = repo
            .find_active_for_officer(&officer_id)
            .expect("query")
            .expect("row");
        assert_eq!(found.id, alert.id);
        assert_eq!(repo.list_active().expect("list").len(), 1);
    }

    #[tokio::test]
    async fn acknowledge_records_the_supervisor_and_leaves_the_active_set() {
        let (repo, officer_id, supervisor_id) = seeded().await;
        let alert = repo.insert(sos(&officer_id)).await.expect("insert");

        let acknowledged = repo
            .acknowledge(&alert.id, Some(&supervisor_id))
            .await
            .expect("acknowledge");
        assert_eq!(acknowledged.status, PanicAlertStatus::Acknowledged);
        assert_eq!(acknowledged.acknowledged_by.as_deref(), Some(supervisor_id.as_str()));
        assert!(acknowledged.updated_at >= acknowledged.created_at);

        assert!(repo
            .find_active_for_officer(&officer_id)
            .expect("query")
            .is_none());
        assert!(repo.list_active().expect("list").is_empty());
    }

    #[tokio::test]
    async fn acknowledge_without_attribution_stores_null() {
        let (repo, officer_id, _supervisor_id) = seeded().await;
        let alert = repo.insert(sos(&officer_id)).await.expect("insert");

        let acknowledged = repo.acknowledge(&alert.id, None).await.expect("acknowledge");
        assert!(acknowledged.acknowledged_by.is_none());
    }

    #[tokio::test]
    async fn acknowledging_a_missing_alert_is_not_found() {
        let (repo, _officer_id, supervisor_id) = seeded().await;

        let err = repo
            .acknowledge("no-such-alert", Some(&supervisor_id))
            .await
            .expect_err("missing");
        assert!(matches!(err, Error::NotFound(_)));
    }
}
