use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::mpsc::{self, Receiver};

use crate::client::{ConnectionId, ConnectionRegistry};
use crate::config::ServerConfig;
use crate::protocol::{CommandStatus, SystemEvent, notify, responses, route};

/// One line read from the client.
enum Inbound {
    Line(String),
    TooLong,
    Closed,
}

/// Handles one chat session using the Tokio async runtime.
///
/// - Attaches the connection to the registry, refusing it when the server is full.
/// - Reads lines and routes each one in arrival order.
/// - Drains the connection's outbox to the socket on a separate writer task.
/// - On EOF or read error, deregisters the connection and announces the departure.
pub async fn handle_client<S>(
    stream: S,
    client_addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    config: Arc<ServerConfig>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let (outbox, outbound) = mpsc::channel(config.outbox_capacity);
    let writer = tokio::spawn(write_outbound(write_half, outbound, client_addr));

    let Some(conn) = registry.try_attach(outbox.clone(), config.max_clients).await else {
        warn!("Refusing {}: {} clients connected", client_addr, config.max_clients);
        let _ = outbox.try_send(responses::SERVER_FULL.to_string());
        drop(outbox);
        let _ = writer.await;
        return;
    };
    info!("Client {} connected as {}", client_addr, conn);

    let mut reader = BufReader::new(read_half);

    loop {
        match read_command(&mut reader, config.max_line_length).await {
            Ok(Inbound::Closed) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(Inbound::TooLong) => {
                registry
                    .lock()
                    .await
                    .send_to(conn, responses::COMMAND_TOO_LONG);
            }
            Ok(Inbound::Line(line)) => {
                let result = route(&registry, conn, &line).await;

                // The reply is already queued by the handler.
                match (&result.status, &result.message) {
                    (CommandStatus::Failure(reason), _) => {
                        debug!("Command from {} refused: {}", client_addr, reason);
                    }
                    (CommandStatus::Success, Some(msg)) => {
                        debug!("Sending response to client {}: {}", client_addr, msg);
                    }
                    (CommandStatus::Success, None) => {}
                }
            }
            Err(e) => {
                warn!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    depart(&registry, conn).await;
    drop(outbox);
    let _ = writer.await;
    info!("Client {} disconnected", client_addr);
}

/// Removes `conn` and, if it held a nickname, announces that it left.
///
/// Both steps happen under the registry lock, and command replies are queued
/// under the same lock. A `/LIST` reply queued before the notice may still name
/// the departing user; any reply queued after it does not. A later `joined` for
/// the freed nickname is queued behind the notice for every recipient.
pub async fn depart(registry: &ConnectionRegistry, conn: ConnectionId) -> Option<String> {
    let mut clients = registry.lock().await;
    let nickname = clients.remove(conn)?;

    let event = SystemEvent::Left {
        nickname: nickname.clone(),
    };
    notify(&clients, conn, &event);
    drop(clients);

    info!("Connection {}: {}", conn, event);
    Some(nickname)
}

/// Reads one newline-terminated line of at most `limit` bytes.
///
/// Longer lines are consumed up to their terminator and reported as `TooLong`.
/// Invalid UTF-8 is replaced rather than treated as a transport error.
async fn read_command<R>(reader: &mut R, limit: usize) -> std::io::Result<Inbound>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(limit as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(Inbound::Closed);
    }

    if buf.len() > limit {
        while !buf.ends_with(b"\n") {
            buf.clear();
            if (&mut *reader).take(limit as u64).read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
        }
        return Ok(Inbound::TooLong);
    }

    let line = String::from_utf8_lossy(&buf);
    Ok(Inbound::Line(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Writes queued lines to the socket until every sender is dropped.
async fn write_outbound<W>(mut writer: W, mut outbound: Receiver<String>, addr: SocketAddr)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outbound.recv().await {
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        if let Err(e) = writer.write_all(&bytes).await {
            debug!("Failed to write to {}: {}", addr, e);
            return;
        }
    }
    let _ = writer.shutdown().await;
}
