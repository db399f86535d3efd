//! Connection registry: users → live connections, plus fan-out and teardown.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  ConnectionRegistry                          │
//! │  Mutex<RegistryState>                                        │
//! │    users:  alice → { wsA, wsB }     bob → { wsC }            │
//! │    owners: wsA → alice, wsB → alice, wsC → bob               │
//! └──────────────────────────────────────────────────────────────┘
//!        │ try_send (never blocks)
//!        ▼
//!   bounded queue ──► SenderLoop ──► Transport ──► client
//!                     SessionGuard ──► SessionStore (every interval)
//! ```
//!
//! # Locking
//!
//! One exclusive lock guards the map. It is held for structural changes and
//! for enumerating recipients during a broadcast, never across a transport
//! write: enqueueing is `try_send`, and closing a transport is done by the
//! connection's own sender loop after the lock has been released.
//!
//! # Teardown
//!
//! Every path (explicit disconnect, logout, read loop, sender failure,
//! session guard, shutdown) goes through the same sequence: remove the entry
//! under the lock, record the close reason and cancel the connection's
//! token, release the lock, then await the connection's tasks. Whoever
//! removes the entry owns the teardown; every other caller sees an absent
//! entry and returns immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::domain::foundation::{ConnectionId, UserId};
use crate::domain::realtime::{CloseReason, PushMessage, RegistryError};
use crate::ports::Transport;

use super::connection::{ConnectionControl, ConnectionHandle, SessionBinding};
use super::sender::SenderLoop;
use super::session_guard::SessionGuard;

/// Tuning for the registry and the per-connection pipeline.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Bound of each connection's outbound queue.
    pub queue_capacity: usize,

    /// Whether connections opened with a session binding get a session guard.
    pub revalidate_sessions: bool,

    /// How often the session guard re-reads the session store.
    pub revalidate_interval: Duration,

    /// Upper bound on writing the close frame to a peer that stopped reading.
    pub close_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            revalidate_sessions: true,
            revalidate_interval: Duration::from_secs(30),
            close_timeout: Duration::from_secs(1),
        }
    }
}

/// Result of one broadcast. Informational only; drops are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastOutcome {
    /// Connections the message was queued for.
    pub enqueued: usize,
    /// Connections that missed the message because their queue was full.
    pub dropped: usize,
}

/// Which task started a teardown. That task is not awaited by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Initiator {
    External,
    SenderLoop,
    SessionGuard,
}

struct ConnectionEntry {
    user_id: UserId,
    queue: mpsc::Sender<Arc<PushMessage>>,
    control: Arc<ConnectionControl>,
    sender_task: JoinHandle<()>,
    guard_task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct RegistryState {
    users: HashMap<UserId, HashMap<ConnectionId, ConnectionEntry>>,
    owners: HashMap<ConnectionId, UserId>,
}

impl RegistryState {
    /// Removes one connection, dropping the user once its set is empty.
    fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionEntry> {
        let user_id = self.owners.remove(connection_id)?;
        let connections = self.users.get_mut(&user_id)?;
        let entry = connections.remove(connection_id);
        if connections.is_empty() {
            self.users.remove(&user_id);
        }
        entry
    }

    /// Removes every connection of one user.
    fn remove_user(&mut self, user_id: &UserId) -> Vec<(ConnectionId, ConnectionEntry)> {
        let Some(connections) = self.users.remove(user_id) else {
            return Vec::new();
        };
        for connection_id in connections.keys() {
            self.owners.remove(connection_id);
        }
        connections.into_iter().collect()
    }

    fn remove_all(&mut self) -> Vec<(ConnectionId, ConnectionEntry)> {
        self.owners.clear();
        self.users
            .drain()
            .flat_map(|(_, connections)| connections.into_iter())
            .collect()
    }
}

/// Concurrent registry of live connections, keyed by user.
///
/// Created once per process (or per test) and shared as
/// `Arc<ConnectionRegistry>`. All operations are safe to call concurrently.
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
    config: RegistryConfig,
}

impl ConnectionRegistry {
    /// Create a registry with the given configuration.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            config,
        }
    }

    /// Create a shared registry with default configuration.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new(RegistryConfig::default()))
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a connection for `user_id` and start its sender loop.
    ///
    /// When `session` is given and revalidation is enabled, a session guard
    /// is started as well. The connection can receive broadcasts as soon as
    /// this returns.
    ///
    /// # Errors
    ///
    /// `RegistryError::AlreadyRegistered` if `connection_id` is already
    /// present; the existing connection is left untouched.
    pub async fn connect(
        self: &Arc<Self>,
        connection_id: ConnectionId,
        user_id: UserId,
        transport: Arc<dyn Transport>,
        session: Option<SessionBinding>,
    ) -> Result<ConnectionHandle, RegistryError> {
        let mut state = self.state.lock().await;

        if state.owners.contains_key(&connection_id) {
            tracing::warn!(
                connection_id = %connection_id,
                user_id = %user_id,
                "Rejected duplicate connection registration"
            );
            return Err(RegistryError::AlreadyRegistered(connection_id));
        }

        let (queue, receiver) = mpsc::channel(self.config.queue_capacity.max(1));
        let control = Arc::new(ConnectionControl::new());

        // Tasks are spawned under the lock so a sender that fails at once
        // cannot start a teardown before its own entry exists.
        let sender_task = tokio::spawn(
            SenderLoop {
                connection_id,
                user_id: user_id.clone(),
                queue: receiver,
                transport,
                control: control.clone(),
                close_timeout: self.config.close_timeout,
                registry: Arc::downgrade(self),
            }
            .run(),
        );

        let guard_task = session
            .filter(|_| self.config.revalidate_sessions)
            .map(|binding| {
                tokio::spawn(
                    SessionGuard {
                        connection_id,
                        user_id: user_id.clone(),
                        binding,
                        interval: self.config.revalidate_interval,
                        control: control.clone(),
                        registry: Arc::downgrade(self),
                    }
                    .run(),
                )
            });
        let guarded = guard_task.is_some();

        state.owners.insert(connection_id, user_id.clone());
        let connections = state.users.entry(user_id.clone()).or_default();
        connections.insert(
            connection_id,
            ConnectionEntry {
                user_id: user_id.clone(),
                queue,
                control: control.clone(),
                sender_task,
                guard_task,
            },
        );
        let user_connections = connections.len();
        drop(state);

        tracing::info!(
            connection_id = %connection_id,
            user_id = %user_id,
            user_connections,
            guarded,
            "Connection registered"
        );

        Ok(ConnectionHandle::new(connection_id, user_id, control))
    }

    /// Remove a connection and wait for its tasks to finish.
    ///
    /// Idempotent: returns `false` without side effects when the connection
    /// is not registered (already gone, or never was).
    pub async fn disconnect(&self, connection_id: ConnectionId) -> bool {
        self.close(connection_id, CloseReason::Normal).await
    }

    /// Like [`disconnect`](Self::disconnect) with an explicit close reason.
    pub async fn close(&self, connection_id: ConnectionId, reason: CloseReason) -> bool {
        self.teardown(connection_id, reason, Initiator::External).await
    }

    pub(crate) async fn teardown(
        &self,
        connection_id: ConnectionId,
        reason: CloseReason,
        initiator: Initiator,
    ) -> bool {
        let entry = {
            let mut state = self.state.lock().await;
            let Some(entry) = state.remove(&connection_id) else {
                return false;
            };
            entry.control.shut(reason);
            entry
        };

        tracing::info!(
            connection_id = %connection_id,
            user_id = %entry.user_id,
            reason = %reason,
            initiator = ?initiator,
            "Connection disconnected"
        );

        Self::await_tasks(connection_id, entry, initiator).await;
        true
    }

    /// Close every connection of `user_id` with a policy-violation status.
    ///
    /// The user's whole entry is removed in one critical section, so a
    /// broadcast racing the logout either lands before it or finds the user
    /// gone. Returns the number of connections closed; when it returns, all
    /// of them have finished their tasks.
    pub async fn disconnect_user(&self, user_id: &UserId) -> usize {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = state.remove_user(user_id);
            for (_, entry) in &removed {
                entry.control.shut(CloseReason::LoggedOut);
            }
            removed
        };

        if removed.is_empty() {
            tracing::debug!(user_id = %user_id, "No connections to close for user");
            return 0;
        }

        let closed = removed.len();
        tracing::info!(user_id = %user_id, connections = closed, "Disconnecting user");
        Self::await_all(removed).await;
        closed
    }

    /// Close every connection with a going-away status.
    ///
    /// Called once at process shutdown.
    pub async fn shutdown(&self) -> usize {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = state.remove_all();
            for (_, entry) in &removed {
                entry.control.shut(CloseReason::Shutdown);
            }
            removed
        };

        let closed = removed.len();
        if closed > 0 {
            tracing::info!(connections = closed, "Closing all connections");
        }
        Self::await_all(removed).await;
        closed
    }

    /// Queue `message` for every connection of `user_id`.
    ///
    /// A user with no connections is a silent no-op: producers do not know
    /// who is online.
    pub async fn broadcast_to_user(&self, user_id: &UserId, message: PushMessage) -> BroadcastOutcome {
        let message = Arc::new(message);
        let state = self.state.lock().await;

        let Some(connections) = state.users.get(user_id) else {
            tracing::trace!(user_id = %user_id, "Broadcast to offline user skipped");
            return BroadcastOutcome::default();
        };
        let outcome = Self::fan_out(connections.iter(), &message);
        drop(state);

        tracing::debug!(
            user_id = %user_id,
            message_type = %message.kind(),
            enqueued = outcome.enqueued,
            dropped = outcome.dropped,
            "Broadcast to user"
        );
        outcome
    }

    /// Queue `message` for every connection of every user.
    pub async fn broadcast_to_all(&self, message: PushMessage) -> BroadcastOutcome {
        let message = Arc::new(message);
        let state = self.state.lock().await;
        let outcome = Self::fan_out(
            state.users.values().flat_map(|connections| connections.iter()),
            &message,
        );
        drop(state);

        tracing::debug!(
            message_type = %message.kind(),
            enqueued = outcome.enqueued,
            dropped = outcome.dropped,
            "Broadcast to all users"
        );
        outcome
    }

    /// Snapshot of users with at least one connection, sorted by id.
    pub async fn online_users(&self) -> Vec<UserId> {
        let state = self.state.lock().await;
        let mut users: Vec<UserId> = state.users.keys().cloned().collect();
        users.sort();
        users
    }

    /// Total number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.owners.len()
    }

    /// Number of connections registered for one user (0 if offline).
    pub async fn user_connection_count(&self, user_id: &UserId) -> usize {
        self.state
            .lock()
            .await
            .users
            .get(user_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    pub async fn is_registered(&self, connection_id: ConnectionId) -> bool {
        self.state.lock().await.owners.contains_key(&connection_id)
    }

    /// Messages dropped so far for a registered connection.
    pub async fn dropped_count(&self, connection_id: ConnectionId) -> Option<u64> {
        let state = self.state.lock().await;
        let user_id = state.owners.get(&connection_id)?;
        state
            .users
            .get(user_id)
            .and_then(|connections| connections.get(&connection_id))
            .map(|entry| entry.control.dropped())
    }

    fn fan_out<'a>(
        entries: impl Iterator<Item = (&'a ConnectionId, &'a ConnectionEntry)>,
        message: &Arc<PushMessage>,
    ) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        for (connection_id, entry) in entries {
            match entry.queue.try_send(Arc::clone(message)) {
                Ok(()) => outcome.enqueued += 1,
                Err(TrySendError::Full(_)) => {
                    outcome.dropped += 1;
                    let total_drops = entry.control.record_drop();
                    tracing::debug!(
                        connection_id = %connection_id,
                        user_id = %entry.user_id,
                        total_drops,
                        "Queue full, message dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    // Sender loop already exited; its teardown is in flight.
                    outcome.dropped += 1;
                }
            }
        }
        outcome
    }

    async fn await_all(removed: Vec<(ConnectionId, ConnectionEntry)>) {
        join_all(
            removed
                .into_iter()
                .map(|(connection_id, entry)| {
                    Self::await_tasks(connection_id, entry, Initiator::External)
                }),
        )
        .await;
    }

    async fn await_tasks(connection_id: ConnectionId, entry: ConnectionEntry, initiator: Initiator) {
        let ConnectionEntry {
            queue,
            sender_task,
            guard_task,
            ..
        } = entry;
        drop(queue);

        if initiator != Initiator::SenderLoop {
            Self::join(connection_id, "sender", sender_task).await;
        }
        if let Some(guard_task) = guard_task {
            if initiator != Initiator::SessionGuard {
                Self::join(connection_id, "session guard", guard_task).await;
            }
        }
    }

    async fn join(connection_id: ConnectionId, task: &'static str, handle: JoinHandle<()>) {
        if let Err(error) = handle.await {
            if error.is_panic() {
                tracing::error!(
                    connection_id = %connection_id,
                    task,
                    "Connection task panicked"
                );
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
