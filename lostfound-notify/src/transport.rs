//! Transport abstraction for the notification function
//!
//! The production transport is a single authenticated HTTP POST. Tests and
//! embedders can plug in any other implementation.

use async_trait::async_trait;
use lostfound_core::{NotificationEvent, NotificationRecord};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::debug;

use crate::{create_function_client, DispatchError, FunctionConfig};

/// Something that can hand a notification to the notification function
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver one notification and return the persisted record
    async fn deliver(&self, event: &NotificationEvent) -> Result<NotificationRecord, DispatchError>;

    /// Where notifications go, for logging
    fn endpoint(&self) -> &str;
}

/// HTTP transport to the remote notification function
pub struct HttpTransport {
    client: Client,
    config: FunctionConfig,
}

impl HttpTransport {
    pub fn new(config: FunctionConfig) -> Result<Self, DispatchError> {
        let client = create_function_client(&config)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl NotificationTransport for HttpTransport {
    async fn deliver(&self, event: &NotificationEvent) -> Result<NotificationRecord, DispatchError> {
        let body = serde_json::to_vec(event)?;

        let mut request = self
            .client
            .post(&self.config.function_url)
            .header("content-type", "application/json")
            .body(body);

        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key).header("apikey", key);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Notification function answered {} for {}", status, event.target_user_id);

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);

        if status == StatusCode::BAD_REQUEST {
            Err(DispatchError::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(DispatchError::Remote {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn endpoint(&self) -> &str {
        &self.config.function_url
    }
}

/// Pull the `error` field out of a JSON error body, or fall back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Thread-safe reference to a transport
pub type SharedTransport = Arc<dyn NotificationTransport>;

/// Create a shared HTTP transport
pub fn create_transport(config: FunctionConfig) -> Result<SharedTransport, DispatchError> {
    Ok(Arc::new(HttpTransport::new(config)?))
}
