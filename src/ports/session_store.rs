//! Session store port - authoritative answer to "who owns this session now?".
//!
//! The transport stays open regardless of session validity, so the session
//! guard polls this port to notice logout, credential rotation or a session
//! swap that the socket itself cannot observe.

use async_trait::async_trait;

use crate::domain::foundation::{SessionToken, UserId};

/// Read-only lookup of the identity currently bound to a session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the user the session currently belongs to, or `None` when the
    /// session was revoked or never existed.
    async fn current_identity(&self, token: &SessionToken) -> Option<UserId>;
}
