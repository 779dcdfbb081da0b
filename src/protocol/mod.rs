//! Chat protocol implementation
//!
//! Handles command parsing, dispatch, broadcast fan-out and response text.

pub mod broadcast;
pub mod commands;
pub mod handlers;
pub mod responses;

pub use broadcast::{SystemEvent, deliver_chat, notify};
pub use commands::{Command, CommandResult, CommandStatus, Recipients, parse_command};
pub use handlers::{handle_command, route};
