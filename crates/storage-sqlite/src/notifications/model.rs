use diesel::prelude::*;

use bandobast_core::notifications::Notification;
use bandobast_core::{Error, Result};

use crate::convert::parse_timestamp;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationDB {
    pub id: String,
    pub recipient_id: String,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<NotificationDB> for Notification {
    type Error = Error;

    fn try_from(row: NotificationDB) -> Result<Notification> {
        Ok(Notification {
            created_at: parse_timestamp("notifications", &row.id, &row.created_at)?,
            updated_at: parse_timestamp("notifications", &row.id, &row.updated_at)?,
            id: row.id,
            recipient_id: row.recipient_id,
            kind: row.kind,
            message: row.message,
            is_read: row.is_read,
        })
    }
}
