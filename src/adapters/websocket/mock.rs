//! Recording transport for tests.
//!
//! Captures every message and close reason instead of writing to a socket,
//! and can be told to fail or to stall its writes, or to never finish a
//! close (a peer that stopped reading).
//!
//! # Example
//!
//! ```ignore
//! let transport = Arc::new(MockTransport::new());
//! registry.connect(ConnectionId::new(), alice, transport.clone(), None).await?;
//!
//! registry.broadcast_to_user(&alice, message.clone()).await;
//! assert!(transport.wait_for_messages(1, Duration::from_secs(1)).await);
//! assert_eq!(transport.sent(), vec![message]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::realtime::{CloseReason, PushMessage, TransportError};
use crate::ports::Transport;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// In-memory [`Transport`] that records what the sender loop wrote.
#[derive(Debug)]
pub struct MockTransport {
    sent: Mutex<Vec<PushMessage>>,
    closes: Mutex<Vec<CloseReason>>,
    fail_sends: AtomicBool,
    hang_closes: AtomicBool,
    /// `true` while writes may proceed.
    gate: watch::Sender<bool>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            sent: Mutex::new(Vec::new()),
            closes: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            hang_closes: AtomicBool::new(false),
            gate,
        }
    }

    // === Test Helpers ===

    /// Makes every following `send` fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Makes every following `close` pend forever without recording.
    pub fn hang_closes(&self) {
        self.hang_closes.store(true, Ordering::SeqCst);
    }

    /// Blocks every following `send` until [`resume`](Self::resume).
    pub fn stall(&self) {
        self.gate.send_replace(false);
    }

    pub fn resume(&self) {
        self.gate.send_replace(true);
    }

    /// Messages written so far, in write order.
    pub fn sent(&self) -> Vec<PushMessage> {
        lock(&self.sent).clone()
    }

    /// Close reasons received so far.
    pub fn close_reasons(&self) -> Vec<CloseReason> {
        lock(&self.closes).clone()
    }

    /// Waits until at least `count` messages were written.
    pub async fn wait_for_messages(&self, count: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, || lock(&self.sent).len() >= count)
            .await
    }

    /// Waits until a close was received.
    pub async fn wait_for_close(&self, timeout: Duration) -> bool {
        self.wait_until(timeout, || !lock(&self.closes).is_empty())
            .await
    }

    async fn wait_until(&self, timeout: Duration, done: impl Fn() -> bool) -> bool {
        tokio::time::timeout(timeout, async {
            while !done() {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .is_ok()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, message: &PushMessage) -> Result<(), TransportError> {
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| TransportError::Closed)?;

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::write("simulated write failure"));
        }
        if !lock(&self.closes).is_empty() {
            return Err(TransportError::Closed);
        }
        lock(&self.sent).push(message.clone());
        Ok(())
    }

    async fn close(&self, reason: CloseReason) -> Result<(), TransportError> {
        if self.hang_closes.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        lock(&self.closes).push(reason);
        Ok(())
    }
}
