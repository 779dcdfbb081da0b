//! Chat responses
//!
//! Exact text of every line the server sends. Lines carry no terminator; the
//! connection writer appends it.

use crate::client::NicknameOutcome;

pub const INVALID_COMMAND: &str = "Invalid command";
pub const MUST_REGISTER: &str = "You must register a nickname before you can send a message";
pub const COMMAND_TOO_LONG: &str = "Command too long";
pub const SERVER_FULL: &str = "Server is full, try again later";

/// Format the reply to `/LIST`. Every name is followed by a space.
pub fn user_list(nicknames: &[String]) -> String {
    let mut line = String::from("Current users: ");
    for nickname in nicknames {
        line.push_str(nickname);
        line.push(' ');
    }
    line
}

/// Format the reply to `/NICK` for the requesting connection.
pub fn nickname_reply(outcome: &NicknameOutcome) -> String {
    match outcome {
        NicknameOutcome::Registered { nickname } => format!("Nickname registered as {}", nickname),
        NicknameOutcome::Changed { old, new } => {
            format!("You changed your nickname from {} to {}", old, new)
        }
        NicknameOutcome::AlreadyThis { nickname } => {
            format!("You're already registered as {}", nickname)
        }
        NicknameOutcome::Taken { nickname } => format!("{} already registered", nickname),
        NicknameOutcome::Invalid(e) => e.to_string(),
        NicknameOutcome::Disconnected => INVALID_COMMAND.to_string(),
    }
}

/// Format a chat line as delivered to recipients.
pub fn chat_line(sender: &str, body: &str) -> String {
    format!("{} said: {}", sender, body)
}
