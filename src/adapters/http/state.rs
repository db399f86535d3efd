//! Shared state for the HTTP surface.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::adapters::session::InMemorySessionStore;
use crate::adapters::websocket::WebSocketState;
use crate::application::ConnectionRegistry;
use crate::ports::CredentialVerifier;

use super::middleware::SessionLayerState;

/// Everything the routes need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub sessions: Arc<InMemorySessionStore>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        sessions: Arc<InMemorySessionStore>,
        credentials: Arc<dyn CredentialVerifier>,
        cookie_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            registry,
            sessions,
            credentials,
            cookie_name: cookie_name.into(),
        }
    }
}

impl FromRef<AppState> for WebSocketState {
    fn from_ref(state: &AppState) -> Self {
        WebSocketState::new(state.registry.clone(), state.sessions.clone())
    }
}

impl FromRef<AppState> for SessionLayerState {
    fn from_ref(state: &AppState) -> Self {
        SessionLayerState {
            sessions: state.sessions.clone(),
            cookie_name: state.cookie_name.clone(),
        }
    }
}
