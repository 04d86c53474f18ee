//! Notification dispatcher
//!
//! At-most-once, non-blocking delivery:
//! - `dispatch` returns a `Result` the caller is free to ignore
//! - `notify` logs any failure and yields `None`
//! - `spawn` detaches the delivery onto the runtime
//!
//! Nothing here retries. A notification lost to an outage stays lost.

use futures::stream::{self, StreamExt};
use lostfound_core::{NotificationEvent, NotificationRecord};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{create_transport, DispatchError, FunctionConfig, SharedTransport};

/// Outcome of a successful delivery
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    /// Record persisted by the notification function
    pub record: NotificationRecord,
    /// Round-trip time of the call
    pub latency_ms: u64,
}

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Sends notification events through a transport
#[derive(Clone)]
pub struct Dispatcher {
    transport: SharedTransport,
    counters: Arc<Counters>,
}

impl Dispatcher {
    pub fn new(transport: SharedTransport) -> Self {
        Self {
            transport,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Dispatcher backed by the HTTP transport
    pub fn from_config(config: FunctionConfig) -> Result<Self, DispatchError> {
        Ok(Self::new(create_transport(config)?))
    }

    /// Validate and deliver one notification
    pub async fn dispatch(&self, event: &NotificationEvent) -> Result<DeliveryResult, DispatchError> {
        let result = self.deliver(event).await;
        let counter = match &result {
            Ok(_) => &self.counters.delivered,
            Err(_) => &self.counters.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }

    async fn deliver(&self, event: &NotificationEvent) -> Result<DeliveryResult, DispatchError> {
        event.validate()?;

        debug!(
            "Dispatching {} notification to {} via {}",
            event.kind,
            event.target_user_id,
            self.transport.endpoint()
        );

        let start = Instant::now();
        let record = self.transport.deliver(event).await?;

        Ok(DeliveryResult {
            record,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Deliver and swallow any failure, logging it
    pub async fn notify(&self, event: NotificationEvent) -> Option<DeliveryResult> {
        match self.dispatch(&event).await {
            Ok(result) => {
                info!(
                    "Delivered {} notification {} to {} in {}ms",
                    event.kind, result.record.id, event.target_user_id, result.latency_ms
                );
                Some(result)
            }
            Err(e) => {
                warn!(
                    transient = e.is_transient(),
                    "Dropped {} notification for {}: {}",
                    event.kind,
                    event.target_user_id,
                    e
                );
                None
            }
        }
    }

    /// Fire-and-forget delivery on the current tokio runtime
    ///
    /// The handle may be dropped; the delivery still runs to completion.
    /// Called outside a runtime, the notification is dropped and `None` returned.
    pub fn spawn(&self, event: NotificationEvent) -> Option<JoinHandle<Option<DeliveryResult>>> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(
                    "Dropped {} notification for {}: {}",
                    event.kind, event.target_user_id, e
                );
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        let dispatcher = self.clone();
        Some(runtime.spawn(async move { dispatcher.notify(event).await }))
    }

    /// Deliver many independent notifications, at most `max_concurrent` in flight
    ///
    /// Results line up with the input order.
    pub async fn dispatch_many(
        &self,
        events: Vec<NotificationEvent>,
        max_concurrent: usize,
    ) -> Vec<Option<DeliveryResult>> {
        stream::iter(events)
            .map(|event| {
                let dispatcher = self.clone();
                async move { dispatcher.notify(event).await }
            })
            .buffered(max_concurrent.max(1))
            .collect()
            .await
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}
