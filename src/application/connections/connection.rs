//! Per-connection handle and shared control block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::domain::foundation::{ConnectionId, SessionToken, UserId};
use crate::domain::realtime::CloseReason;
use crate::ports::SessionStore;

/// State shared between the registry entry, the connection's tasks and
/// every [`ConnectionHandle`] clone.
#[derive(Debug, Default)]
pub(crate) struct ConnectionControl {
    cancel: CancellationToken,
    reason: OnceLock<CloseReason>,
    dropped: AtomicU64,
}

impl ConnectionControl {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the close reason and cancels the connection's tasks.
    ///
    /// The first reason recorded wins.
    pub(crate) fn shut(&self, reason: CloseReason) {
        let _ = self.reason.set(reason);
        self.cancel.cancel();
    }

    pub(crate) fn reason(&self) -> Option<CloseReason> {
        self.reason.get().copied()
    }

    pub(crate) fn is_shut(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Counts one dropped message and returns the running total.
    pub(crate) fn record_drop(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Caller-side view of a registered connection.
///
/// Returned by [`ConnectionRegistry::connect`](super::ConnectionRegistry::connect).
/// Cheap to clone; lets the transport layer notice when the registry tore
/// the connection down through some other path (logout, session guard,
/// shutdown).
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: UserId,
    control: Arc<ConnectionControl>,
}

impl ConnectionHandle {
    pub(crate) fn new(id: ConnectionId, user_id: UserId, control: Arc<ConnectionControl>) -> Self {
        Self {
            id,
            user_id,
            control,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Resolves once the connection has been torn down by any path.
    pub async fn closed(&self) {
        self.control.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.control.is_shut()
    }

    /// Why the connection was closed, if it has been.
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.control.reason()
    }

    /// Messages dropped because this connection's queue was full.
    pub fn dropped_messages(&self) -> u64 {
        self.control.dropped()
    }
}

/// Ties a connection to the session it was opened under, so the session
/// guard can re-check it.
#[derive(Clone)]
pub struct SessionBinding {
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) token: SessionToken,
}

impl SessionBinding {
    pub fn new(store: Arc<dyn SessionStore>, token: SessionToken) -> Self {
        Self { store, token }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}

impl std::fmt::Debug for SessionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBinding")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
