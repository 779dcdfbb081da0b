//! Error types
//!
//! Defines the error types used by nickname validation and server startup.

use std::fmt;
use std::io;

/// Reasons a requested nickname is rejected.
///
/// Variants are listed in the order the checks run; the first failing check wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NicknameError {
    InvalidLength,
    MustStartWithLetter,
    InvalidCharacters,
}

impl NicknameError {
    /// Returns the bare reason text, without the leading "Nickname".
    pub fn reason(&self) -> &'static str {
        match self {
            NicknameError::InvalidLength => "must be between 1 and 10 characters",
            NicknameError::MustStartWithLetter => "must start with a letter",
            NicknameError::InvalidCharacters => {
                "can contain only letters, numbers, and underscores"
            }
        }
    }
}

impl fmt::Display for NicknameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nickname {}", self.reason())
    }
}

impl std::error::Error for NicknameError {}

/// Errors that stop the server from starting or running.
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Bind(String, io::Error),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Config(e) => Some(e),
            ServerError::Bind(_, e) => Some(e),
            ServerError::IoError(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}
