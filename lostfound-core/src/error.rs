//! Validation errors for notification payloads

use thiserror::Error;

/// Why a notification payload was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: user_id, title, message")]
    MissingRequired,

    #[error("Missing notification type")]
    MissingKind,

    #[error("Unknown notification type: {0}")]
    UnknownKind(String),

    #[error("Metadata must be a JSON object")]
    MetadataNotObject,
}
