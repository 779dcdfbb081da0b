//! Client management system
//!
//! Handles client sessions, the shared connection registry, and the per-client
//! state kept in it.

pub mod handler;
pub mod registry;
pub mod state;

pub use handler::{depart, handle_client};
pub use registry::{ClientTable, ConnectionRegistry, NicknameOutcome};
pub use state::{Client, ConnectionId, Outbox};
