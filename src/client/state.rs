//! Module `state`
//!
//! Defines the `Client` struct held in the connection registry for every live
//! session, and the opaque `ConnectionId` used to key it.

use log::warn;
use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Sending half of a connection's bounded outbound line queue.
///
/// Each queued item is one complete line without its terminator.
pub type Outbox = mpsc::Sender<String>;

/// Opaque identity of one live client session.
///
/// Ids are only handed out by the registry when a session is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents the state of a connected chat client.
///
/// A client without a nickname is unregistered: it cannot send chat messages,
/// is not listed and receives no broadcasts.
pub struct Client {
    nickname: Option<String>,
    outbox: Outbox,
}

impl Client {
    pub fn new(outbox: Outbox) -> Self {
        Self {
            nickname: None,
            outbox,
        }
    }

    /// Returns the registered nickname, if any.
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// Replaces the nickname, returning the previous one.
    pub fn set_nickname(&mut self, nickname: String) -> Option<String> {
        self.nickname.replace(nickname)
    }

    pub(crate) fn take_nickname(self) -> Option<String> {
        self.nickname
    }

    /// Queues one line for this client without waiting.
    ///
    /// Returns `false` if the writer has gone away or the queue is full. A full
    /// queue means the peer stopped reading; the line is dropped.
    pub fn send(&self, line: impl Into<String>) -> bool {
        match self.outbox.try_send(line.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(line)) => {
                warn!("Outbox full, dropping line: {}", line);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}
