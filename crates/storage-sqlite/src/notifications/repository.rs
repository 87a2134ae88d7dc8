use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use bandobast_core::notifications::{
    NewNotification, Notification, NotificationRepositoryTrait,
};
use bandobast_core::{Error, Result};

use super::model::NotificationDB;
use crate::convert::format_timestamp;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::notifications;

pub struct NotificationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl NotificationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        NotificationRepository { pool, writer }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    fn list_for_recipient(&self, recipient: &str, limit: i64) -> Result<Vec<Notification>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = notifications::table
            .filter(notifications::recipient_id.eq(recipient))
            .order(notifications::created_at.desc())
            .limit(limit)
            .load::<NotificationDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn insert(&self, new_notification: NewNotification) -> Result<Notification> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Notification> {
                let now = format_timestamp(Utc::now());
                let row = NotificationDB {
                    id: Uuid::new_v4().to_string(),
                    recipient_id: new_notification.recipient_id,
                    kind: new_notification.kind,
                    message: new_notification.message,
                    is_read: false,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let inserted = diesel::insert_into(notifications::table)
                    .values(&row)
                    .returning(NotificationDB::as_returning())
                    .get_result::<NotificationDB>(conn)
                    .map_err(StorageError::from)?;
                Notification::try_from(inserted)
            })
            .await
    }

    async fn mark_all_read(&self, recipient: &str) -> Result<usize> {
        let recipient = recipient.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::update(
                    notifications::table
                        .filter(notifications::recipient_id.eq(recipient))
                        .filter(notifications::is_read.eq(false)),
                )
                .set((
                    notifications::is_read.eq(true),
                    notifications::updated_at.eq(format_timestamp(Utc::now())),
                ))
                .execute(conn)
                .map_err(StorageError::from)
                .map_err(Error::from)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(notifications::table)
                    .execute(conn)
                    .map_err(StorageError::from)
                    .map_err(Error::from)
            })
            .await
    }
}
