//! WebSocket upgrade handler for push connections.
//!
//! Handles the HTTP → WebSocket upgrade and the connection lifecycle:
//! 1. Resolve the session cookie (done by the session middleware)
//! 2. Upgrade; anonymous sockets are closed right away with 1008
//! 3. Register the write half with the connection registry
//! 4. Read (and discard) inbound frames until the peer leaves or the
//!    registry tears the connection down
//! 5. Report peer departure back to the registry

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitStream;
use futures::StreamExt;

use crate::adapters::http::middleware::{CurrentSession, OptionalSession};
use crate::application::{ConnectionHandle, ConnectionRegistry, SessionBinding};
use crate::domain::foundation::ConnectionId;
use crate::domain::realtime::CloseReason;
use crate::ports::SessionStore;

use super::transport::WebSocketTransport;

/// State required for WebSocket handling.
///
/// Extracted from the application state.
#[derive(Clone)]
pub struct WebSocketState {
    pub registry: Arc<ConnectionRegistry>,
    pub sessions: Arc<dyn SessionStore>,
}

impl WebSocketState {
    pub fn new(registry: Arc<ConnectionRegistry>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { registry, sessions }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    OptionalSession(session): OptionalSession,
    State(state): State<WebSocketState>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        match session {
            Some(session) => serve_connection(socket, session, state).await,
            None => reject_unauthenticated(socket).await,
        }
    })
}

/// Closes a socket opened without a valid session.
async fn reject_unauthenticated(mut socket: WebSocket) {
    let reason = CloseReason::Unauthenticated;
    tracing::debug!("Rejecting WebSocket without a valid session");

    let frame = reason.close_code().map(|code| CloseFrame {
        code,
        reason: Cow::Borrowed(reason.description()),
    });
    if let Err(e) = socket.send(Message::Close(frame)).await {
        tracing::debug!("Failed to send close frame: {}", e);
    }
}

/// Runs one authenticated connection until it ends.
async fn serve_connection(socket: WebSocket, session: CurrentSession, state: WebSocketState) {
    let (sink, mut stream) = socket.split();
    let CurrentSession { token, user_id } = session;

    let handle = match state
        .registry
        .connect(
            ConnectionId::new(),
            user_id,
            Arc::new(WebSocketTransport::new(sink)),
            Some(SessionBinding::new(state.sessions.clone(), token)),
        )
        .await
    {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("WebSocket registration failed: {}", e);
            return;
        }
    };

    if let Some(reason) = read_until_closed(&mut stream, &handle).await {
        state.registry.close(handle.id(), reason).await;
    }
}

/// Reads inbound frames until the peer leaves.
///
/// Returns the reason to report to the registry, or `None` when the
/// registry already tore the connection down by another path.
async fn read_until_closed(
    stream: &mut SplitStream<WebSocket>,
    handle: &ConnectionHandle,
) -> Option<CloseReason> {
    loop {
        let frame = tokio::select! {
            _ = handle.closed() => return None,
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                tracing::trace!(
                    connection_id = %handle.id(),
                    len = text.len(),
                    "Ignoring inbound text frame"
                );
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!(connection_id = %handle.id(), "Client closed connection");
                return Some(CloseReason::PeerClosed);
            }
            Some(Ok(_)) => {
                // Ping/pong are answered by the protocol layer; binary is ignored.
            }
            Some(Err(e)) => {
                tracing::debug!(connection_id = %handle.id(), "Receive error: {}", e);
                return Some(CloseReason::PeerClosed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::InMemorySessionStore;

    #[test]
    fn websocket_state_shares_registry() {
        let registry = ConnectionRegistry::shared();
        let state = WebSocketState::new(registry.clone(), Arc::new(InMemorySessionStore::new()));

        assert!(Arc::ptr_eq(&state.registry, &registry));
    }
}
