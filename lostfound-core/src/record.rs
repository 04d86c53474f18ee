//! Persisted notification records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Metadata, NotificationEvent, NotificationKind};

/// A notification row as stored and returned by the notification function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Uuid,

    /// Recipient
    pub user_id: String,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub title: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Whether the recipient has seen it
    #[serde(default)]
    pub read: bool,

    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Materialize a fresh, unread record from an event
    pub fn from_event(event: NotificationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: event.target_user_id,
            kind: event.kind,
            title: event.title,
            message: event.message,
            link: event.link,
            metadata: event.metadata,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_event() {
        let event = NotificationEvent::builder(NotificationKind::Claim, "owner-1")
            .title("New claim")
            .message("Someone claimed your wallet")
            .link("/items/12")
            .build();

        let record = NotificationRecord::from_event(event);
        assert_eq!(record.user_id, "owner-1");
        assert_eq!(record.kind, NotificationKind::Claim);
        assert!(!record.read);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "claim");
        assert_eq!(json["read"], false);
    }
}
