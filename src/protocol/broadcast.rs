//! Broadcast fan-out
//!
//! Formats system notices and chat lines and queues them on the outboxes of
//! registered connections. Callers pass the locked client table, so a fan-out is
//! computed from the same registry state as the mutation that triggered it.

use log::debug;
use std::fmt;

use crate::client::{ClientTable, ConnectionId};
use crate::protocol::commands::Recipients;
use crate::protocol::responses::chat_line;

/// System notices sent to everyone except the connection that caused them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    Joined { nickname: String },
    ChangedNickname { old: String, new: String },
    Left { nickname: String },
}

impl fmt::Display for SystemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemEvent::Joined { nickname } => write!(f, "{} joined the chat", nickname),
            SystemEvent::ChangedNickname { old, new } => {
                write!(f, "{} changed nickname to {}", old, new)
            }
            SystemEvent::Left { nickname } => write!(f, "{} left the chat", nickname),
        }
    }
}

/// Queues `event` for every registered connection except `excluded`.
///
/// Returns the number of connections the line was queued for.
pub fn notify(clients: &ClientTable, excluded: ConnectionId, event: &SystemEvent) -> usize {
    let line = event.to_string();
    let mut delivered = 0;

    for (id, _, client) in clients.registered() {
        if id != excluded && client.send(line.as_str()) {
            delivered += 1;
        }
    }

    debug!("Broadcast \"{}\" to {} connection(s)", line, delivered);
    delivered
}

/// Queues a chat line for every registered connection addressed by `recipients`.
///
/// The sender never receives its own message, even when named explicitly. Names
/// that match no registered connection are skipped without notice, and a
/// connection named twice receives the message once.
pub fn deliver_chat(
    clients: &ClientTable,
    sender: ConnectionId,
    sender_nickname: &str,
    recipients: &Recipients,
    body: &str,
) -> usize {
    let line = chat_line(sender_nickname, body);
    let mut delivered = 0;

    for (id, nickname, client) in clients.registered() {
        if id != sender && recipients.includes(nickname) && client.send(line.as_str()) {
            delivered += 1;
        }
    }

    delivered
}
