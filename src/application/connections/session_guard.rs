//! Session guard: periodic re-check of a connection's identity.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::domain::foundation::{ConnectionId, UserId};
use crate::domain::realtime::CloseReason;
use crate::ports::SessionStore;

use super::connection::{ConnectionControl, SessionBinding};
use super::registry::{ConnectionRegistry, Initiator};

pub(crate) struct SessionGuard {
    pub(crate) connection_id: ConnectionId,
    pub(crate) user_id: UserId,
    pub(crate) binding: SessionBinding,
    pub(crate) interval: Duration,
    pub(crate) control: Arc<ConnectionControl>,
    pub(crate) registry: Weak<ConnectionRegistry>,
}

impl SessionGuard {
    pub(crate) async fn run(self) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let current = tokio::select! {
                biased;
                _ = self.control.cancelled() => return,
                current = async {
                    ticker.tick().await;
                    self.binding.store.current_identity(&self.binding.token).await
                } => current,
            };

            if current.as_ref() == Some(&self.user_id) {
                tracing::trace!(connection_id = %self.connection_id, "Session still valid");
                continue;
            }

            tracing::info!(
                connection_id = %self.connection_id,
                user_id = %self.user_id,
                current_user = ?current.as_ref().map(UserId::as_str),
                "Session no longer valid, closing connection"
            );
            if let Some(registry) = self.registry.upgrade() {
                registry
                    .teardown(
                        self.connection_id,
                        CloseReason::SessionInvalid,
                        Initiator::SessionGuard,
                    )
                    .await;
            }
            return;
        }
    }
}
