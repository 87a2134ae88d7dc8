use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde_json::json;

use crate::errors::{Error, Result};
use crate::events::{BroadcastEvent, Broadcaster, NoOpBroadcaster, NEW_NOTIFICATION};
use crate::notifications::{NewNotification, Notification, NotificationRepositoryTrait};
use crate::officers::{Officer, OfficerRepositoryTrait};

/// Inbox reads return at most this many entries.
const INBOX_LIMIT: i64 = 50;

/// Notification inbox operations.
#[async_trait]
pub trait NotificationServiceTrait: Send + Sync {
    /// Store a notification for the officer and push it to their
    /// private channel.
    async fn notify(&self, recipient: &Officer, kind: &str, message: &str) -> Result<Notification>;
    /// The officer's inbox, newest first.
    fn list_for_officer(&self, officer_code: &str) -> Result<Vec<Notification>>;
    /// Mark the whole inbox read; returns how many entries changed.
    async fn mark_all_read(&self, officer_code: &str) -> Result<usize>;
}

#[derive(Clone)]
pub struct NotificationService {
    notification_repository: Arc<dyn NotificationRepositoryTrait>,
    officer_repository: Arc<dyn OfficerRepositoryTrait>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl NotificationService {
    pub fn new(
        notification_repository: Arc<dyn NotificationRepositoryTrait>,
        officer_repository: Arc<dyn OfficerRepositoryTrait>,
    ) -> Self {
        Self {
            notification_repository,
            officer_repository,
            broadcaster: Arc::new(NoOpBroadcaster),
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    fn find_officer(&self, officer_code: &str) -> Result<Officer> {
        self.officer_repository
            .find_by_code(officer_code)?
            .ok_or_else(|| Error::not_found("Officer not found"))
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn notify(&self, recipient: &Officer, kind: &str, message: &str) -> Result<Notification> {
        let notification = self
            .notification_repository
            .insert(NewNotification {
                recipient_id: recipient.id.clone(),
                kind: kind.to_string(),
                message: message.to_string(),
            })
            .await?;

        self.broadcaster.publish(BroadcastEvent::to_officer(
            NEW_NOTIFICATION,
            &recipient.officer_id,
            json!({
                "notificationId": notification.id,
                "recipient": recipient.officer_id,
                "type": notification.kind,
                "message": notification.message,
                "isRead": notification.is_read,
                "createdAt": notification.created_at,
            }),
        ));

        info!(
            "Notification stored for officer {}: {}",
            recipient.officer_id, notification.kind
        );
        Ok(notification)
    }

    fn list_for_officer(&self, officer_code: &str) -> Result<Vec<Notification>> {
        let officer = self.find_officer(officer_code)?;
        self.notification_repository
            .list_for_recipient(&officer.id, INBOX_LIMIT)
    }

    async fn mark_all_read(&self, officer_code: &str) -> Result<usize> {
        let officer = self.find_officer(officer_code)?;
        let changed = self
            .notification_repository
            .mark_all_read(&officer.id)
            .await?;
        info!(
            "Marked {} notifications read for officer {}",
            changed, officer.officer_id
        );
        Ok(changed)
    }
}
