//! Lost & Found Notify
//!
//! Best-effort notification delivery:
//! - **Config**: where the notification function lives and how to authenticate
//! - **Transport**: the HTTP call to the function
//! - **Dispatcher**: validation, fire-and-forget spawning, bounded fan-out
//! - **Hooks**: turn marketplace actions into notifications
//!
//! Delivery never fails the action that triggered it. Every entry point
//! either returns a `Result` the caller may drop or swallows and logs.

pub mod config;
pub mod error;
pub mod transport;
pub mod dispatcher;
pub mod hooks;

pub use config::*;
pub use error::*;
pub use transport::*;
pub use dispatcher::*;
pub use hooks::*;
