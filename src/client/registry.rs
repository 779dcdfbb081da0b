//! Client registry
//!
//! The single source of truth mapping live connections to nicknames. Every read and
//! write goes through one mutex, so nickname checks and the commit that follows them
//! are never split by another connection.

use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, MutexGuard};

use crate::client::{Client, ConnectionId, Outbox};
use crate::error::NicknameError;
use crate::nickname::validate_nickname;

/// Result of a nickname registration or change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NicknameOutcome {
    /// First nickname for this connection.
    Registered { nickname: String },
    /// Connection held `old` and now holds `new`.
    Changed { old: String, new: String },
    /// Connection already holds this nickname; nothing changed.
    AlreadyThis { nickname: String },
    /// Another connection holds this nickname; nothing changed.
    Taken { nickname: String },
    Invalid(NicknameError),
    /// The connection has already been removed from the registry.
    Disconnected,
}

/// The mapping itself. Only reachable through [`ConnectionRegistry::lock`] or the
/// registry's single-operation helpers, so every access holds the lock.
#[derive(Default)]
pub struct ClientTable {
    clients: HashMap<ConnectionId, Client>,
}

impl ClientTable {
    pub fn get(&self, conn: ConnectionId) -> Option<&Client> {
        self.clients.get(&conn)
    }

    pub fn lookup(&self, conn: ConnectionId) -> Option<&str> {
        self.clients.get(&conn).and_then(Client::nickname)
    }

    /// Snapshot of the registered nicknames, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.registered()
            .map(|(_, nickname, _)| nickname.to_string())
            .collect()
    }

    /// Iterates over registered clients as `(id, nickname, client)`.
    pub fn registered(&self) -> impl Iterator<Item = (ConnectionId, &str, &Client)> {
        self.clients
            .iter()
            .filter_map(|(id, client)| client.nickname().map(|nickname| (*id, nickname, client)))
    }

    pub fn try_set_nickname(&mut self, conn: ConnectionId, desired: &str) -> NicknameOutcome {
        let desired = match validate_nickname(desired) {
            Ok(nickname) => nickname,
            Err(e) => return NicknameOutcome::Invalid(e),
        };

        if let Some((holder, _, _)) = self.registered().find(|(_, name, _)| *name == desired) {
            return if holder == conn {
                NicknameOutcome::AlreadyThis {
                    nickname: desired.to_string(),
                }
            } else {
                NicknameOutcome::Taken {
                    nickname: desired.to_string(),
                }
            };
        }

        let Some(client) = self.clients.get_mut(&conn) else {
            return NicknameOutcome::Disconnected;
        };

        match client.set_nickname(desired.to_string()) {
            Some(old) => NicknameOutcome::Changed {
                old,
                new: desired.to_string(),
            },
            None => NicknameOutcome::Registered {
                nickname: desired.to_string(),
            },
        }
    }

    /// Removes the connection, returning the nickname it held.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<String> {
        self.clients.remove(&conn).and_then(Client::take_nickname)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Queues a line for `conn` whether or not it has a nickname.
    pub fn send_to(&self, conn: ConnectionId, line: &str) -> bool {
        self.get(conn).is_some_and(|client| client.send(line))
    }
}

/// Shared registry of live connections, passed to every session as an `Arc`.
pub struct ConnectionRegistry {
    table: Mutex<ClientTable>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(ClientTable::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Acquires exclusive access to the table for a multi-step operation.
    pub async fn lock(&self) -> MutexGuard<'_, ClientTable> {
        self.table.lock().await
    }

    /// Adds a new, unregistered connection.
    pub async fn attach(&self, outbox: Outbox) -> ConnectionId {
        let id = self.allocate_id();
        self.table.lock().await.clients.insert(id, Client::new(outbox));
        debug!("Attached connection {}", id);
        id
    }

    /// Adds a new connection unless `limit` connections are already attached.
    pub async fn try_attach(&self, outbox: Outbox, limit: usize) -> Option<ConnectionId> {
        let mut table = self.table.lock().await;
        if table.len() >= limit {
            return None;
        }

        let id = self.allocate_id();
        table.clients.insert(id, Client::new(outbox));
        debug!("Attached connection {} ({}/{})", id, table.len(), limit);
        Some(id)
    }

    pub async fn lookup(&self, conn: ConnectionId) -> Option<String> {
        self.table.lock().await.lookup(conn).map(str::to_string)
    }

    pub async fn list(&self) -> Vec<String> {
        self.table.lock().await.list()
    }

    pub async fn try_set_nickname(&self, conn: ConnectionId, desired: &str) -> NicknameOutcome {
        self.table.lock().await.try_set_nickname(conn, desired)
    }

    pub async fn remove(&self, conn: ConnectionId) -> Option<String> {
        self.table.lock().await.remove(conn)
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    fn allocate_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn attach(registry: &ConnectionRegistry) -> ConnectionId {
        let (tx, _rx) = mpsc::channel(16);
        registry.attach(tx).await
    }

    #[tokio::test]
    async fn test_register_then_change() {
        let registry = ConnectionRegistry::new();
        let conn = attach(&registry).await;

        assert_eq!(registry.lookup(conn).await, None);
        assert_eq!(
            registry.try_set_nickname(conn, "alice").await,
            NicknameOutcome::Registered {
                nickname: "alice".into()
            }
        );
        assert_eq!(
            registry.try_set_nickname(conn, "alicia").await,
            NicknameOutcome::Changed {
                old: "alice".into(),
                new: "alicia".into()
            }
        );
        assert_eq!(registry.lookup(conn).await.as_deref(), Some("alicia"));
        assert_eq!(registry.list().await, vec!["alicia".to_string()]);
    }

    #[tokio::test]
    async fn test_same_nickname_again_is_noop() {
        let registry = ConnectionRegistry::new();
        let conn = attach(&registry).await;
        registry.try_set_nickname(conn, "alice").await;

        assert_eq!(
            registry.try_set_nickname(conn, " alice ").await,
            NicknameOutcome::AlreadyThis {
                nickname: "alice".into()
            }
        );
        assert_eq!(registry.lookup(conn).await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_taken_nickname_leaves_requester_unchanged() {
        let registry = ConnectionRegistry::new();
        let alice = attach(&registry).await;
        let other = attach(&registry).await;
        registry.try_set_nickname(alice, "alice").await;

        assert_eq!(
            registry.try_set_nickname(other, "alice").await,
            NicknameOutcome::Taken {
                nickname: "alice".into()
            }
        );
        assert_eq!(registry.lookup(other).await, None);

        registry.try_set_nickname(other, "bob").await;
        assert!(matches!(
            registry.try_set_nickname(other, "alice").await,
            NicknameOutcome::Taken { .. }
        ));
        assert_eq!(registry.lookup(other).await.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_invalid_nickname_is_rejected_before_lookup() {
        let registry = ConnectionRegistry::new();
        let conn = attach(&registry).await;

        assert_eq!(
            registry.try_set_nickname(conn, "9lives").await,
            NicknameOutcome::Invalid(NicknameError::MustStartWithLetter)
        );
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_connections_are_not_listed() {
        let registry = ConnectionRegistry::new();
        let alice = attach(&registry).await;
        let _anonymous = attach(&registry).await;
        registry.try_set_nickname(alice, "alice").await;

        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.list().await, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_frees_nickname() {
        let registry = ConnectionRegistry::new();
        let alice = attach(&registry).await;
        let other = attach(&registry).await;
        registry.try_set_nickname(alice, "alice").await;

        assert_eq!(registry.remove(alice).await.as_deref(), Some("alice"));
        assert_eq!(registry.lookup(alice).await, None);
        assert_eq!(registry.remove(alice).await, None);
        assert_eq!(
            registry.try_set_nickname(alice, "alice").await,
            NicknameOutcome::Disconnected
        );
        assert!(matches!(
            registry.try_set_nickname(other, "alice").await,
            NicknameOutcome::Registered { .. }
        ));
    }

    #[tokio::test]
    async fn test_try_attach_respects_limit() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(16);

        assert!(registry.try_attach(tx.clone(), 1).await.is_some());
        assert!(registry.try_attach(tx, 1).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_send_to_reaches_unregistered_connection() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(16);
        let conn = registry.attach(tx).await;

        assert!(registry.lock().await.send_to(conn, "hello"));
        assert_eq!(rx.try_recv().unwrap(), "hello");

        registry.remove(conn).await;
        assert!(!registry.lock().await.send_to(conn, "gone"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut tasks = Vec::new();

        for _ in 0..16 {
            let conn = attach(&registry).await;
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.try_set_nickname(conn, "shared").await
            }));
        }

        let mut winners = 0;
        let mut taken = 0;
        for task in tasks {
            match task.await.unwrap() {
                NicknameOutcome::Registered { .. } => winners += 1,
                NicknameOutcome::Taken { .. } => taken += 1,
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(taken, 15);
        assert_eq!(registry.list().await, vec!["shared".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_renames_keep_nicknames_unique() {
        let registry = Arc::new(ConnectionRegistry::new());
        let names = ["ann", "ben", "cat", "dan"];
        let mut tasks = Vec::new();

        for _ in 0..8 {
            let conn = attach(&registry).await;
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                for round in 0..50 {
                    let name = names[round % names.len()];
                    registry.try_set_nickname(conn, name).await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut listed = registry.list().await;
        let total = listed.len();
        listed.sort();
        listed.dedup();
        assert_eq!(listed.len(), total);
    }
}
