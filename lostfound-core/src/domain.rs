//! Marketplace actions that trigger notifications
//!
//! Each variant carries exactly the fields its notification needs, so a
//! malformed event cannot be constructed by accident.

use serde::{Deserialize, Serialize};

use crate::{AuthContext, NotificationEvent, NotificationKind, MAX_EXCERPT_CHARS};

/// Lifecycle state of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

/// A domain event raised after its primary write has committed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Someone filed a claim on an item
    ClaimFiled {
        item_id: String,
        item_title: String,
        owner_id: String,
    },

    /// The item owner reviewed a claim
    ClaimStatusChanged {
        claim_id: String,
        item_id: String,
        item_title: String,
        claimant_id: String,
        status: ClaimStatus,
    },

    /// A comment was left on an item listing
    CommentPosted {
        item_id: String,
        item_title: String,
        recipient_id: String,
        excerpt: String,
    },

    /// A direct message arrived
    MessageReceived {
        conversation_id: String,
        recipient_id: String,
        excerpt: String,
    },

    /// Administrator announcement or moderation notice
    SystemMessage {
        recipient_id: String,
        title: String,
        message: String,
        link: Option<String>,
    },
}

impl DomainEvent {
    /// User who should receive the notification
    pub fn recipient(&self) -> &str {
        match self {
            DomainEvent::ClaimFiled { owner_id, .. } => owner_id,
            DomainEvent::ClaimStatusChanged { claimant_id, .. } => claimant_id,
            DomainEvent::CommentPosted { recipient_id, .. } => recipient_id,
            DomainEvent::MessageReceived { recipient_id, .. } => recipient_id,
            DomainEvent::SystemMessage { recipient_id, .. } => recipient_id,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            DomainEvent::ClaimFiled { .. } => NotificationKind::Claim,
            DomainEvent::ClaimStatusChanged { .. } => NotificationKind::StatusChange,
            DomainEvent::CommentPosted { .. } | DomainEvent::MessageReceived { .. } => {
                NotificationKind::Comment
            }
            DomainEvent::SystemMessage { .. } => NotificationKind::System,
        }
    }

    /// Build the notification for this event as performed by `actor`
    pub fn to_notification(&self, actor: &AuthContext) -> NotificationEvent {
        let builder = NotificationEvent::builder(self.kind(), self.recipient())
            .meta("actor_id", actor.user_id.as_str());

        match self {
            DomainEvent::ClaimFiled {
                item_id,
                item_title,
                ..
            } => builder
                .title("New claim on your item")
                .message(&format!(
                    "{} submitted a claim for \"{}\"",
                    actor.display(),
                    item_title
                ))
                .link(&format!("/items/{}", item_id))
                .meta("item_id", item_id.as_str())
                .build(),

            DomainEvent::ClaimStatusChanged {
                claim_id,
                item_id,
                item_title,
                status,
                ..
            } => builder
                .title(&format!("Claim {}", status.as_str()))
                .message(&format!(
                    "Your claim for \"{}\" is now {}",
                    item_title,
                    status.as_str()
                ))
                .link(&format!("/items/{}", item_id))
                .meta("claim_id", claim_id.as_str())
                .meta("status", status.as_str())
                .build(),

            DomainEvent::CommentPosted {
                item_id,
                item_title,
                excerpt,
                ..
            } => builder
                .title(&format!("New comment on \"{}\"", item_title))
                .message(&format!("{}: {}", actor.display(), truncate(excerpt)))
                .link(&format!("/items/{}", item_id))
                .meta("item_id", item_id.as_str())
                .build(),

            DomainEvent::MessageReceived {
                conversation_id,
                excerpt,
                ..
            } => builder
                .title(&format!("New message from {}", actor.display()))
                .message(&truncate(excerpt))
                .link(&format!("/messages/{}", conversation_id))
                .build(),

            DomainEvent::SystemMessage {
                title,
                message,
                link,
                ..
            } => {
                let builder = builder.title(title).message(message);
                match link {
                    Some(link) => builder.link(link).build(),
                    None => builder.build(),
                }
            }
        }
    }
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_filed_targets_owner() {
        let actor = AuthContext::user("finder-1").with_name("Sam");
        let event = DomainEvent::ClaimFiled {
            item_id: "item-5".to_string(),
            item_title: "Black umbrella".to_string(),
            owner_id: "owner-2".to_string(),
        };

        let notification = event.to_notification(&actor);
        assert_eq!(notification.target_user_id, "owner-2");
        assert_eq!(notification.kind, NotificationKind::Claim);
        assert_eq!(notification.link.as_deref(), Some("/items/item-5"));
        assert!(notification.message.contains("Sam"));
        assert!(notification.validate().is_ok());

        let metadata = notification.metadata.unwrap();
        assert_eq!(metadata["actor_id"], "finder-1");
        assert_eq!(metadata["item_id"], "item-5");
    }

    #[test]
    fn test_status_change_carries_status() {
        let event = DomainEvent::ClaimStatusChanged {
            claim_id: "claim-1".to_string(),
            item_id: "item-5".to_string(),
            item_title: "Keys".to_string(),
            claimant_id: "claimant-3".to_string(),
            status: ClaimStatus::Approved,
        };

        let notification = event.to_notification(&AuthContext::user("owner-2"));
        assert_eq!(notification.target_user_id, "claimant-3");
        assert_eq!(notification.kind, NotificationKind::StatusChange);
        assert_eq!(notification.title, "Claim approved");
        assert_eq!(notification.metadata.unwrap()["status"], "approved");
    }

    #[test]
    fn test_message_excerpt_is_truncated() {
        let event = DomainEvent::MessageReceived {
            conversation_id: "conv-1".to_string(),
            recipient_id: "user-2".to_string(),
            excerpt: "x".repeat(500),
        };

        let notification = event.to_notification(&AuthContext::user("user-1"));
        assert_eq!(notification.kind, NotificationKind::Comment);
        assert_eq!(notification.message.chars().count(), MAX_EXCERPT_CHARS + 3);
        assert!(notification.message.ends_with("..."));
        assert_eq!(notification.title, "New message from Someone");
    }

    #[test]
    fn test_domain_event_serde_tag() {
        let event: DomainEvent = serde_json::from_value(serde_json::json!({
            "event": "system_message",
            "recipient_id": "user-7",
            "title": "Listing removed",
            "message": "Your listing violated the guidelines",
            "link": null
        }))
        .unwrap();

        assert_eq!(event.recipient(), "user-7");
        assert_eq!(event.kind(), NotificationKind::System);
    }
}
