use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification kind for a freshly rostered assignment.
pub const KIND_NEW_DUTY: &str = "New Duty";
/// Notification kind for a withdrawn assignment.
pub const KIND_DUTY_CANCELLED: &str = "Duty Cancelled";

/// One inbox entry for one officer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Internal UUID of the receiving officer.
    #[serde(rename = "recipient")]
    pub recipient_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; starts unread.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: String,
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_with_wire_field_names() {
        let now = Utc::now();
        let notification = Notification {
            id: "5f2b7d86-1c33-44c0-b365-91f52dd2e7ce".to_string(),
            recipient_id: "some-officer-uuid".to_string(),
            kind: KIND_NEW_DUTY.to_string(),
            message: "New duty assigned: Post 3 in Zone A".to_string(),
            is_read: false,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["recipient"], "some-officer-uuid");
        assert_eq!(value["type"], "New Duty");
        assert_eq!(value["isRead"], false);
        assert!(value.get("kind").is_none());
    }
}
