//! Dispatch errors

use lostfound_core::ValidationError;
use thiserror::Error;

/// Errors from delivering a notification
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid notification: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Failed to load config: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Function rejected notification ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Function error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DispatchError {
    /// Outage-style failures, as opposed to a bad payload from the caller
    pub fn is_transient(&self) -> bool {
        match self {
            DispatchError::Transport(_) => true,
            DispatchError::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(!DispatchError::Validation(ValidationError::MissingRequired).is_transient());
        assert!(!DispatchError::Rejected {
            status: 400,
            message: "missing".to_string()
        }
        .is_transient());
        assert!(DispatchError::Remote {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!DispatchError::Remote {
            status: 401,
            message: "unauthorized".to_string()
        }
        .is_transient());
    }
}
