//! Chart generator - periodic sample producer.
//!
//! Every interval it draws a sample `a` in `[0, 4)` and sends it to one
//! online user:
//!
//! | Sample            | Message type     | Recipient                    |
//! |-------------------|------------------|------------------------------|
//! | `frac(a) < 0.5`   | `chart_2_update` | `online_users()[floor(a)]`   |
//! | `frac(a) >= 0.5`  | `chart_1_update` | `online_users()[floor(a)]`   |
//!
//! Ticks where no user sits at that index are skipped; the tick counter
//! still advances.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::application::ConnectionRegistry;
use crate::domain::foundation::UserId;
use crate::domain::realtime::{ChartSeries, PushMessage};

use super::error::ProducerError;

/// Upper bound (exclusive) of generated samples.
pub const SAMPLE_RANGE: f64 = 4.0;

/// Configuration for the chart generator.
#[derive(Debug, Clone)]
pub struct ChartGeneratorConfig {
    /// Time between samples.
    pub interval: Duration,
}

impl Default for ChartGeneratorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Background producer of random chart samples.
pub struct ChartGenerator {
    registry: Arc<ConnectionRegistry>,
    config: ChartGeneratorConfig,
}

impl ChartGenerator {
    pub fn new(registry: Arc<ConnectionRegistry>, config: ChartGeneratorConfig) -> Self {
        Self { registry, config }
    }

    /// Run until the shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ProducerError> {
        let mut rng = StdRng::from_entropy();
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!(ticks = tick, "Chart generator stopping");
                        return Ok(());
                    }
                }
                _ = interval.tick() => {
                    let sample = rng.gen_range(0.0..SAMPLE_RANGE);
                    self.emit(tick, sample).await;
                    tick += 1;
                }
            }
        }
    }

    /// Send one sample. Returns the recipient, if there was one.
    pub async fn emit(&self, tick: u64, sample: f64) -> Option<UserId> {
        let online = self.registry.online_users().await;
        let Some(user_id) = online.into_iter().nth(target_index(sample)) else {
            tracing::trace!(tick, sample, "No user at sample index, skipping");
            return None;
        };

        let message = PushMessage::chart_update(series_for(sample), tick, sample);
        self.registry.broadcast_to_user(&user_id, message).await;
        Some(user_id)
    }
}

/// Which chart a sample belongs to.
pub fn series_for(sample: f64) -> ChartSeries {
    if sample.fract() < 0.5 {
        ChartSeries::Second
    } else {
        ChartSeries::First
    }
}

/// Index of the online user that receives a sample.
pub fn target_index(sample: f64) -> usize {
    sample.max(0.0).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::MockTransport;
    use crate::domain::foundation::ConnectionId;
    use crate::domain::realtime::MessageKind;
    use proptest::prelude::*;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    async fn online(registry: &Arc<ConnectionRegistry>, name: &str) -> Arc<MockTransport> {
        let transport = Arc::new(MockTransport::new());
        registry
            .connect(ConnectionId::new(), user(name), transport.clone(), None)
            .await
            .unwrap();
        transport
    }

    #[test]
    fn lower_half_of_unit_goes_to_second_chart() {
        assert_eq!(series_for(0.0), ChartSeries::Second);
        assert_eq!(series_for(2.49), ChartSeries::Second);
        assert_eq!(series_for(2.5), ChartSeries::First);
        assert_eq!(series_for(3.99), ChartSeries::First);
    }

    #[test]
    fn target_index_is_floor_of_sample() {
        assert_eq!(target_index(0.0), 0);
        assert_eq!(target_index(0.99), 0);
        assert_eq!(target_index(1.0), 1);
        assert_eq!(target_index(3.7), 3);
    }

    #[tokio::test]
    async fn emit_targets_user_at_sample_index() {
        let registry = ConnectionRegistry::shared();
        let alice = online(&registry, "alice").await;
        let bob = online(&registry, "bob").await;
        let generator = ChartGenerator::new(registry, ChartGeneratorConfig::default());

        assert_eq!(generator.emit(7, 1.75).await, Some(user("bob")));

        assert!(bob.wait_for_messages(1, Duration::from_secs(1)).await);
        let sent = bob.sent();
        assert_eq!(sent[0].kind(), &MessageKind::Chart1Update);
        assert_eq!(sent[0].field("time"), Some(&serde_json::json!(7)));
        assert_eq!(sent[0].field("value"), Some(&serde_json::json!(1.75)));
        assert!(alice.sent().is_empty());
    }

    #[tokio::test]
    async fn emit_skips_when_index_exceeds_online_users() {
        let registry = ConnectionRegistry::shared();
        let alice = online(&registry, "alice").await;
        let generator = ChartGenerator::new(registry, ChartGeneratorConfig::default());

        assert_eq!(generator.emit(0, 2.2).await, None);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(alice.sent().is_empty());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let registry = ConnectionRegistry::shared();
        let generator = ChartGenerator::new(
            registry,
            ChartGeneratorConfig {
                interval: Duration::from_millis(5),
            },
        );
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move { generator.run(rx).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    proptest! {
        #[test]
        fn every_sample_maps_to_one_of_four_users(sample in 0.0f64..SAMPLE_RANGE) {
            prop_assert!(target_index(sample) < 4);
        }
    }
}
