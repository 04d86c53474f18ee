//! Notification events and their wire form
//!
//! A `NotificationEvent` is built by a caller, validated at the boundary and
//! shipped to the notification function. It is never stored by the sender;
//! the function persists a [`NotificationRecord`](crate::NotificationRecord).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ValidationError;

/// Opaque key-value metadata carried alongside a notification
pub type Metadata = Map<String, Value>;

/// Kinds of notifications the function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Comment,
    Claim,
    StatusChange,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Comment => "comment",
            NotificationKind::Claim => "claim",
            NotificationKind::StatusChange => "status_change",
            NotificationKind::System => "system",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(NotificationKind::Comment),
            "claim" => Ok(NotificationKind::Claim),
            "status_change" => Ok(NotificationKind::StatusChange),
            "system" => Ok(NotificationKind::System),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// A notification addressed to one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Recipient of the notification
    #[serde(rename = "user_id")]
    pub target_user_id: String,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub title: String,

    pub message: String,

    /// In-app path the notification points at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl NotificationEvent {
    /// Create a new event builder
    pub fn builder(kind: NotificationKind, target_user_id: &str) -> NotificationEventBuilder {
        NotificationEventBuilder::new(kind, target_user_id)
    }

    /// Check the fields the notification function requires
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.target_user_id.is_empty() || self.title.is_empty() || self.message.is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        Ok(())
    }
}

/// Builder for notification events
pub struct NotificationEventBuilder {
    kind: NotificationKind,
    target_user_id: String,
    title: String,
    message: String,
    link: Option<String>,
    metadata: Option<Metadata>,
}

impl NotificationEventBuilder {
    pub fn new(kind: NotificationKind, target_user_id: &str) -> Self {
        Self {
            kind,
            target_user_id: target_user_id.to_string(),
            title: String::new(),
            message: String::new(),
            link: None,
            metadata: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub fn link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }

    /// Add a single metadata entry
    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> NotificationEvent {
        NotificationEvent {
            target_user_id: self.target_user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            link: self.link,
            metadata: self.metadata,
        }
    }
}

/// Loosely-typed request body as received by the notification function
///
/// Every field is optional so that a missing field becomes a validation
/// error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl NotificationRequest {
    /// Validate shape and convert into a typed event
    pub fn into_event(self) -> Result<NotificationEvent, ValidationError> {
        let user_id = self.user_id.unwrap_or_default();
        let title = self.title.unwrap_or_default();
        let message = self.message.unwrap_or_default();
        if user_id.is_empty() || title.is_empty() || message.is_empty() {
            return Err(ValidationError::MissingRequired);
        }

        let kind = match self.kind.as_deref() {
            None | Some("") => return Err(ValidationError::MissingKind),
            Some(raw) => raw.parse::<NotificationKind>()?,
        };

        let metadata = match self.metadata {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => return Err(ValidationError::MetadataNotObject),
        };

        Ok(NotificationEvent {
            target_user_id: user_id,
            kind,
            title,
            message,
            link: self.link.filter(|l| !l.is_empty()),
            metadata,
        })
    }
}
