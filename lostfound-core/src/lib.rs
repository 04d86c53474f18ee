//! Lost & Found Core - Domain model for notifications and trust badges
//!
//! This crate provides the foundational primitives:
//! - Trust tiers derived from a user's reputation score
//! - Notification events and the records persisted for them
//! - Marketplace domain events that produce notifications
//! - The explicit auth context handed to every hook

pub mod trust;
pub mod event;
pub mod domain;
pub mod record;
pub mod auth;
pub mod error;

pub use trust::*;
pub use event::*;
pub use domain::*;
pub use record::*;
pub use auth::*;
pub use error::*;

/// Minimum score for the Community Hero tier
pub const HERO_THRESHOLD: i64 = 100;

/// Minimum score for the Trusted Finder tier
pub const TRUSTED_THRESHOLD: i64 = 50;

/// Minimum score for the Verified Member tier
pub const VERIFIED_THRESHOLD: i64 = 10;

/// Route of the notification function
pub const FUNCTION_PATH: &str = "/functions/v1/send-notification";

/// Longest excerpt of a comment or message copied into a notification
pub const MAX_EXCERPT_CHARS: usize = 120;
