//! Transport port - the write side of one live client channel.
//!
//! The registry never touches sockets directly. Each connection is given a
//! `Transport` at connect time; its sender loop is the only caller of
//! [`Transport::send`], so writes to one transport never interleave.
//!
//! Implementations exist for WebSocket sinks (production) and recording
//! doubles (tests).

use async_trait::async_trait;

use crate::domain::realtime::{CloseReason, PushMessage, TransportError};

/// Outbound half of a client connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one message to the client.
    ///
    /// # Errors
    ///
    /// Any error ends the connection's sender loop and tears the
    /// connection down.
    async fn send(&self, message: &PushMessage) -> Result<(), TransportError>;

    /// Send a close status (when the reason carries one) and shut the
    /// channel.
    async fn close(&self, reason: CloseReason) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Transport>();
    }
}
