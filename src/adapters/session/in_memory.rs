//! In-memory session store.
//!
//! Sessions live only as long as the process. That matches the single
//! in-process registry: a restart drops every connection anyway.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{SessionToken, UserId};
use crate::ports::SessionStore;

/// Session token → user map backing the login cookie.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, UserId>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session for `user_id` and returns its token.
    pub async fn create(&self, user_id: UserId) -> SessionToken {
        let token = SessionToken::new();
        self.bind(token.clone(), user_id).await;
        token
    }

    /// Points `token` at `user_id`, replacing any previous owner.
    pub async fn bind(&self, token: SessionToken, user_id: UserId) {
        tracing::debug!(user_id = %user_id, "Session bound");
        self.sessions.write().await.insert(token, user_id);
    }

    /// Ends a session. Returns the user it belonged to, if any.
    pub async fn revoke(&self, token: &SessionToken) -> Option<UserId> {
        let removed = self.sessions.write().await.remove(token);
        if let Some(user_id) = &removed {
            tracing::debug!(user_id = %user_id, "Session revoked");
        }
        removed
    }

    /// Number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn current_identity(&self, token: &SessionToken) -> Option<UserId> {
        self.sessions.read().await.get(token).cloned()
    }
}
