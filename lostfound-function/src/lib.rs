//! Lost & Found notification function
//!
//! The endpoint the dispatcher calls. It validates the payload, persists a
//! notification row for the recipient and returns it. Also serves the
//! recipient-facing listing and read-state endpoints.

pub mod store;
pub mod server;

pub use store::*;
pub use server::*;
