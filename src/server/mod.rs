//! Server core functionality
//!
//! Owns the listener and the shared registry, and runs the accept loop.

pub mod core;

pub use self::core::Server;
