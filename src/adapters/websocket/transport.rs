//! WebSocket implementation of the `Transport` port.

use std::borrow::Cow;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::Mutex;

use crate::domain::realtime::{CloseReason, PushMessage, TransportError};
use crate::ports::Transport;

/// Write half of an upgraded WebSocket.
///
/// Messages go out as JSON text frames. The read half stays with the
/// upgrade handler's read loop.
pub struct WebSocketTransport {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WebSocketTransport {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&self, message: &PushMessage) -> Result<(), TransportError> {
        let json = message.to_json()?;
        self.sink
            .lock()
            .await
            .send(Message::Text(json))
            .await
            .map_err(TransportError::write)
    }

    async fn close(&self, reason: CloseReason) -> Result<(), TransportError> {
        let frame = reason.close_code().map(|code| CloseFrame {
            code,
            reason: Cow::Borrowed(reason.description()),
        });

        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(frame))
            .await
            .map_err(TransportError::write)?;
        sink.close().await.map_err(TransportError::write)
    }
}
