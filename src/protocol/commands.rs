//! Module `commands`
//!
//! Defines the chat command grammar and the parser turning one raw input line
//! into a typed `Command`.

/// Recipients of a `/MSG` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// `*`: every other registered user.
    All,
    /// Comma-separated nicknames, empty entries dropped.
    Named(Vec<String>),
}

impl Recipients {
    pub fn parse(spec: &str) -> Self {
        if spec == "*" {
            return Recipients::All;
        }

        Recipients::Named(
            spec.split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Whether a user with `nickname` is addressed.
    pub fn includes(&self, nickname: &str) -> bool {
        match self {
            Recipients::All => true,
            Recipients::Named(names) => names.iter().any(|name| name == nickname),
        }
    }
}

/// A command parsed from one client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    SetNickname(String),
    Message { recipients: Recipients, body: String },
    /// Unknown command or a known one with too few arguments.
    Invalid,
}

/// Outcome of handling a command, for the requesting connection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure(String),
}

/// Status plus the optional reply line for the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    /// Success with nothing to send back.
    pub fn silent() -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
        }
    }

    /// A failure whose reply text doubles as the reason.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: CommandStatus::Failure(message.clone()),
            message: Some(message),
        }
    }
}

/// Parses a raw line received from a client into a `Command`.
///
/// The line is trimmed and split on the first two spaces; the command word must match
/// exactly and bring enough arguments, otherwise the result is `Command::Invalid`.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.splitn(3, ' ').collect();

    match parts.as_slice() {
        ["/LIST", ..] => Command::List,
        ["/NICK", nickname, ..] => Command::SetNickname(nickname.to_string()),
        ["/MSG", recipients, body] => Command::Message {
            recipients: Recipients::parse(recipients),
            body: body.to_string(),
        },
        _ => Command::Invalid,
    }
}
