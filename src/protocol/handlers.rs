//! Command handlers module for the chat server.
//!
//! Routes parsed commands to their handlers. A command is handled under one
//! registry lock: its checks, its registry mutation, the fan-out derived from
//! them and the reply to the requester are all queued from one consistent view.

use log::{debug, info};

use crate::client::{ClientTable, ConnectionId, ConnectionRegistry, NicknameOutcome};
use crate::protocol::broadcast::{SystemEvent, deliver_chat, notify};
use crate::protocol::commands::{Command, CommandResult, Recipients, parse_command};
use crate::protocol::responses;

/// Parses one raw line from `conn` and handles it.
pub async fn route(registry: &ConnectionRegistry, conn: ConnectionId, raw: &str) -> CommandResult {
    let command = parse_command(raw);
    debug!("Received from {}: {:?}", conn, command);
    handle_command(registry, conn, &command).await
}

/// Dispatches a parsed command to its handler.
///
/// The reply in the returned result has already been queued on `conn`'s outbox,
/// behind every line queued for it earlier and ahead of any queued later.
pub async fn handle_command(
    registry: &ConnectionRegistry,
    conn: ConnectionId,
    command: &Command,
) -> CommandResult {
    let mut clients = registry.lock().await;

    let result = match command {
        Command::List => handle_cmd_list(&*clients),
        Command::SetNickname(nickname) => handle_cmd_nick(&mut *clients, conn, nickname),
        Command::Message { recipients, body } => {
            handle_cmd_msg(&*clients, conn, recipients, body)
        }
        Command::Invalid => CommandResult::failure(responses::INVALID_COMMAND),
    };

    if let Some(msg) = &result.message {
        clients.send_to(conn, msg);
    }
    result
}

/// Handles `/LIST`: replies with a snapshot of registered nicknames.
fn handle_cmd_list(clients: &ClientTable) -> CommandResult {
    CommandResult::success(responses::user_list(&clients.list()))
}

/// Handles `/NICK`: registers or changes the nickname and announces the change.
fn handle_cmd_nick(clients: &mut ClientTable, conn: ConnectionId, desired: &str) -> CommandResult {
    let outcome = clients.try_set_nickname(conn, desired);

    let event = match &outcome {
        NicknameOutcome::Registered { nickname } => SystemEvent::Joined {
            nickname: nickname.clone(),
        },
        NicknameOutcome::Changed { old, new } => SystemEvent::ChangedNickname {
            old: old.clone(),
            new: new.clone(),
        },
        _ => return CommandResult::failure(responses::nickname_reply(&outcome)),
    };

    notify(clients, conn, &event);
    info!("Connection {}: {}", conn, event);
    CommandResult::success(responses::nickname_reply(&outcome))
}

/// Handles `/MSG`: delivers the body to the addressed users, never the sender.
fn handle_cmd_msg(
    clients: &ClientTable,
    conn: ConnectionId,
    recipients: &Recipients,
    body: &str,
) -> CommandResult {
    let Some(sender) = clients.lookup(conn) else {
        return CommandResult::failure(responses::MUST_REGISTER);
    };

    let delivered = deliver_chat(clients, conn, sender, recipients, body);
    debug!("Message from {} delivered to {} connection(s)", sender, delivered);
    CommandResult::silent()
}
