//! Notification storage
//!
//! The function only needs a handful of operations on the notifications
//! collection. `MemoryStore` keeps rows per recipient in a concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;
use lostfound_core::{NotificationEvent, NotificationRecord};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the notification store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Notification {0} not found")]
    NotFound(Uuid),
}

/// Persistence for notification rows
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a new unread row for the event's recipient
    async fn insert(&self, event: NotificationEvent) -> Result<NotificationRecord, StoreError>;

    /// A user's notifications, newest first
    async fn list(&self, user_id: &str, unread_only: bool) -> Result<Vec<NotificationRecord>, StoreError>;

    async fn unread_count(&self, user_id: &str) -> Result<usize, StoreError>;

    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<NotificationRecord, StoreError>;

    /// Returns how many rows changed
    async fn mark_all_read(&self, user_id: &str) -> Result<usize, StoreError>;
}

/// In-memory notification store
#[derive(Debug, Default)]
pub struct MemoryStore {
    by_user: DashMap<String, Vec<NotificationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all users
    pub fn len(&self) -> usize {
        self.by_user.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, event: NotificationEvent) -> Result<NotificationRecord, StoreError> {
        let record = NotificationRecord::from_event(event);
        self.by_user
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list(&self, user_id: &str, unread_only: bool) -> Result<Vec<NotificationRecord>, StoreError> {
        let mut records: Vec<NotificationRecord> = self
            .by_user
            .get(user_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| !unread_only || !r.read)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Insertion order breaks ties between identical timestamps
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn unread_count(&self, user_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .by_user
            .get(user_id)
            .map(|rows| rows.iter().filter(|r| !r.read).count())
            .unwrap_or(0))
    }

    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<NotificationRecord, StoreError> {
        let mut rows = self.by_user.get_mut(user_id).ok_or(StoreError::NotFound(id))?;
        let record = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.read = true;
        Ok(record.clone())
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<usize, StoreError> {
        let Some(mut rows) = self.by_user.get_mut(user_id) else {
            return Ok(0);
        };

        let mut updated = 0;
        for record in rows.iter_mut().filter(|r| !r.read) {
            record.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

/// Thread-safe reference to a store
pub type SharedStore = Arc<dyn NotificationStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use lostfound_core::NotificationKind;

    fn event(user: &str, title: &str) -> NotificationEvent {
        NotificationEvent::builder(NotificationKind::Comment, user)
            .title(title)
            .message("body")
            .build()
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let store = MemoryStore::new();
        store.insert(event("u1", "first")).await.unwrap();
        store.insert(event("u1", "second")).await.unwrap();
        store.insert(event("u2", "other")).await.unwrap();

        let rows = store.list("u1", false).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "second");
        assert!(rows.iter().all(|r| r.user_id == "u1"));
        assert_eq!(store.len(), 3);
        assert!(store.list("nobody", false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_state() {
        let store = MemoryStore::new();
        let first = store.insert(event("u1", "first")).await.unwrap();
        store.insert(event("u1", "second")).await.unwrap();
        assert_eq!(store.unread_count("u1").await.unwrap(), 2);

        let marked = store.mark_read("u1", first.id).await.unwrap();
        assert!(marked.read);
        assert_eq!(store.unread_count("u1").await.unwrap(), 1);
        assert_eq!(store.list("u1", true).await.unwrap().len(), 1);

        // Another user cannot touch u1's rows
        assert!(matches!(
            store.mark_read("u2", first.id).await,
            Err(StoreError::NotFound(_))
        ));

        assert_eq!(store.mark_all_read("u1").await.unwrap(), 1);
        assert_eq!(store.mark_all_read("u1").await.unwrap(), 0);
        assert_eq!(store.unread_count("u1").await.unwrap(), 0);
    }
}
