//! Nickname admission
//!
//! Validates the display names clients register with.

pub mod validator;

pub use validator::validate_nickname;
