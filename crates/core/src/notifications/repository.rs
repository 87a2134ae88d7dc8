use async_trait::async_trait;

use crate::errors::Result;
use crate::notifications::{NewNotification, Notification};

/// Storage contract for the notification inbox.
#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    /// Recipient's inbox, newest first, at most `limit` entries.
    fn list_for_recipient(&self, recipient_id: &str, limit: i64) -> Result<Vec<Notification>>;

    async fn insert(&self, new_notification: NewNotification) -> Result<Notification>;
    /// Flip every unread entry to read; returns how many changed.
    async fn mark_all_read(&self, recipient_id: &str) -> Result<usize>;
    async fn delete_all(&self) -> Result<usize>;
}
