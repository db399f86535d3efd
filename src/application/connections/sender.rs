//! Sender loop: the single writer for one connection's transport.
//!
//! Drains the connection's queue in FIFO order and writes each message.
//! Cancellation always wins over the next message, and an in-flight write is
//! abandoned when cancellation arrives, so nothing reaches the client after
//! the registry reports the connection gone.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::domain::foundation::{ConnectionId, UserId};
use crate::domain::realtime::{CloseReason, PushMessage, TransportError};
use crate::ports::Transport;

use super::connection::ConnectionControl;
use super::registry::{ConnectionRegistry, Initiator};

/// How the delivery loop ended.
enum SenderExit {
    Cancelled,
    Failed(TransportError),
}

pub(crate) struct SenderLoop {
    pub(crate) connection_id: ConnectionId,
    pub(crate) user_id: UserId,
    pub(crate) queue: mpsc::Receiver<Arc<PushMessage>>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) control: Arc<ConnectionControl>,
    pub(crate) close_timeout: Duration,
    pub(crate) registry: Weak<ConnectionRegistry>,
}

impl SenderLoop {
    pub(crate) async fn run(mut self) {
        match self.deliver().await {
            SenderExit::Cancelled => self.write_close().await,
            SenderExit::Failed(error) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    user_id = %self.user_id,
                    error = %error,
                    "Send failed, disconnecting"
                );
                self.queue.close();
                if let Some(registry) = self.registry.upgrade() {
                    registry
                        .teardown(
                            self.connection_id,
                            CloseReason::TransportFailure,
                            Initiator::SenderLoop,
                        )
                        .await;
                }
            }
        }
        tracing::trace!(connection_id = %self.connection_id, "Sender loop exited");
    }

    async fn deliver(&mut self) -> SenderExit {
        loop {
            let message = tokio::select! {
                biased;
                _ = self.control.cancelled() => return SenderExit::Cancelled,
                next = self.queue.recv() => match next {
                    Some(message) => message,
                    // Every queue sender is gone: the entry was removed.
                    None => return SenderExit::Cancelled,
                },
            };

            tokio::select! {
                biased;
                _ = self.control.cancelled() => return SenderExit::Cancelled,
                result = self.transport.send(&message) => {
                    if let Err(error) = result {
                        return SenderExit::Failed(error);
                    }
                }
            }
        }
    }

    async fn write_close(&self) {
        let Some(reason) = self.control.reason() else {
            return;
        };
        if reason.close_code().is_none() {
            return;
        }
        // Teardown awaits this task; a peer that stopped reading must not hold it.
        match tokio::time::timeout(self.close_timeout, self.transport.close(reason)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::debug!(
                connection_id = %self.connection_id,
                reason = %reason,
                error = %error,
                "Close frame not delivered"
            ),
            Err(_) => tracing::debug!(
                connection_id = %self.connection_id,
                reason = %reason,
                timeout_ms = self.close_timeout.as_millis() as u64,
                "Close frame write timed out"
            ),
        }
    }
}
