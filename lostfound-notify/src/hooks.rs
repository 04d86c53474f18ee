//! Marketplace hooks
//!
//! Called right after a primary write commits (claim filed, claim reviewed,
//! comment posted, message sent). The hook builds the notification and
//! detaches its delivery so the caller can answer the user immediately.

use std::collections::HashSet;

use lostfound_core::{AuthContext, DomainEvent, NotificationEvent, NotificationKind};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{DeliveryResult, Dispatcher};

/// Default fan-out width for broadcasts
const BROADCAST_CONCURRENCY: usize = 8;

/// Publishes domain events as notifications
#[derive(Clone)]
pub struct Notifier {
    dispatcher: Dispatcher,
}

impl Notifier {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Build the notification `ctx` would trigger with `event`, if any
    pub fn prepare(&self, ctx: &AuthContext, event: &DomainEvent) -> Option<NotificationEvent> {
        if event.recipient() == ctx.user_id {
            debug!("Skipping self-notification for {}", ctx.user_id);
            return None;
        }

        if event.kind() == NotificationKind::System && !ctx.is_admin {
            warn!("Non-admin {} attempted a system notification", ctx.user_id);
            return None;
        }

        Some(event.to_notification(ctx))
    }

    /// Publish a domain event without waiting for delivery
    ///
    /// Returns `None` when the event produces no notification or there is no
    /// runtime to deliver it on.
    pub fn publish(
        &self,
        ctx: &AuthContext,
        event: &DomainEvent,
    ) -> Option<JoinHandle<Option<DeliveryResult>>> {
        let notification = self.prepare(ctx, event)?;
        self.dispatcher.spawn(notification)
    }

    /// Send the same system message to many users
    ///
    /// Only administrators may broadcast; anyone else gets an empty result.
    /// Each recipient gets one copy and the sender none, so the results line
    /// up with the distinct recipients other than `ctx`.
    pub async fn broadcast(
        &self,
        ctx: &AuthContext,
        recipients: &[String],
        title: &str,
        message: &str,
    ) -> Vec<Option<DeliveryResult>> {
        if !ctx.is_admin {
            warn!("Non-admin {} attempted a broadcast", ctx.user_id);
            return Vec::new();
        }

        let mut unique = HashSet::new();
        let events = recipients
            .iter()
            .filter(|recipient| unique.insert(*recipient))
            .filter_map(|recipient| {
                let event = DomainEvent::SystemMessage {
                    recipient_id: recipient.clone(),
                    title: title.to_string(),
                    message: message.to_string(),
                    link: None,
                };
                self.prepare(ctx, &event)
            })
            .collect();

        self.dispatcher
            .dispatch_many(events, BROADCAST_CONCURRENCY)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::tests::{DownTransport, RecordingTransport};
    use lostfound_core::ClaimStatus;
    use std::sync::Arc;

    fn claim_filed(owner: &str) -> DomainEvent {
        DomainEvent::ClaimFiled {
            item_id: "item-1".to_string(),
            item_title: "Silver watch".to_string(),
            owner_id: owner.to_string(),
        }
    }

    /// A primary action that must succeed regardless of delivery
    fn file_claim(notifier: &Notifier, ctx: &AuthContext, owner: &str) -> Result<&'static str, String> {
        let claim_id = "claim-1";
        let _ = notifier.publish(ctx, &claim_filed(owner));
        Ok(claim_id)
    }

    #[tokio::test]
    async fn test_publish_notifies_owner() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(Dispatcher::new(transport.clone()));
        let ctx = AuthContext::user("finder-1").with_name("Ana");

        let handle = notifier.publish(&ctx, &claim_filed("owner-1")).unwrap();
        let result = handle.await.unwrap().unwrap();

        assert_eq!(result.record.user_id, "owner-1");
        assert_eq!(result.record.kind, NotificationKind::Claim);
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_self_notification_is_suppressed() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(Dispatcher::new(transport.clone()));
        let ctx = AuthContext::user("owner-1");

        assert!(notifier.publish(&ctx, &claim_filed("owner-1")).is_none());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_system_message_requires_admin() {
        let notifier = Notifier::new(Dispatcher::new(Arc::new(RecordingTransport::default())));
        let event = DomainEvent::SystemMessage {
            recipient_id: "user-2".to_string(),
            title: "Listing removed".to_string(),
            message: "Removed by moderation".to_string(),
            link: None,
        };

        assert!(notifier.prepare(&AuthContext::user("user-1"), &event).is_none());
        assert!(notifier.prepare(&AuthContext::admin("admin-1"), &event).is_some());
    }

    #[tokio::test]
    async fn test_primary_action_survives_outage() {
        let notifier = Notifier::new(Dispatcher::new(Arc::new(DownTransport)));
        let ctx = AuthContext::user("finder-1");

        assert_eq!(file_claim(&notifier, &ctx, "owner-1"), Ok("claim-1"));

        let handle = notifier
            .publish(
                &AuthContext::user("owner-1"),
                &DomainEvent::ClaimStatusChanged {
                    claim_id: "claim-1".to_string(),
                    item_id: "item-1".to_string(),
                    item_title: "Silver watch".to_string(),
                    claimant_id: "finder-1".to_string(),
                    status: ClaimStatus::Rejected,
                },
            )
            .unwrap();
        assert!(handle.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_broadcast() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(Dispatcher::new(transport.clone()));
        let recipients: Vec<String> = vec!["u1".into(), "u2".into(), "u3".into()];

        let denied = notifier
            .broadcast(&AuthContext::user("u9"), &recipients, "Maintenance", "Tonight")
            .await;
        assert!(denied.is_empty());

        let sent = notifier
            .broadcast(&AuthContext::admin("admin"), &recipients, "Maintenance", "Tonight")
            .await;
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|r| r.is_some()));

        let seen = transport.seen.lock().unwrap();
        assert!(seen.iter().all(|e| e.kind == NotificationKind::System));
    }

    #[tokio::test]
    async fn test_broadcast_skips_sender_and_duplicates() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(Dispatcher::new(transport.clone()));
        let recipients: Vec<String> = vec!["admin-1".into(), "u2".into(), "u2".into()];

        let sent = notifier
            .broadcast(&AuthContext::admin("admin-1"), &recipients, "Maintenance", "Tonight")
            .await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].as_ref().unwrap().record.user_id, "u2");

        let seen = transport.seen.lock().unwrap();
        let users: Vec<&str> = seen.iter().map(|e| e.target_user_id.as_str()).collect();
        assert_eq!(users, vec!["u2"]);
    }

    #[test]
    fn test_publish_outside_runtime_does_not_fail_caller() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(Dispatcher::new(transport.clone()));
        let ctx = AuthContext::user("finder-1");

        assert_eq!(file_claim(&notifier, &ctx, "owner-1"), Ok("claim-1"));
        assert!(notifier.publish(&ctx, &claim_filed("owner-1")).is_none());
        assert!(transport.seen.lock().unwrap().is_empty());
    }
}
