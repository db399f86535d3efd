//! Producer supervisor - owns the background producer tasks.
//!
//! Every producer gets the same shutdown signal. A producer that fails is
//! logged and left stopped; the registry and the other producers keep
//! running.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::ConnectionRegistry;
use crate::config::ProducersConfig;

use super::chart_generator::{ChartGenerator, ChartGeneratorConfig};
use super::error::ProducerError;
use super::file_watcher::FileWatcher;

/// Running set of producers sharing one shutdown signal.
pub struct ProducerSupervisor {
    shutdown: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl ProducerSupervisor {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            tasks: Vec::new(),
        }
    }

    /// Starts the producers enabled in `config`.
    pub fn start(registry: Arc<ConnectionRegistry>, config: &ProducersConfig) -> Self {
        let mut supervisor = Self::new();

        if config.chart_enabled {
            let generator = ChartGenerator::new(
                registry.clone(),
                ChartGeneratorConfig {
                    interval: config.chart_interval(),
                },
            );
            supervisor.spawn("chart_generator", move |shutdown| async move {
                generator.run(shutdown).await
            });
        }

        if config.watch_enabled {
            let watcher = FileWatcher::new(registry, config.watch_path.clone());
            supervisor.spawn("file_watcher", move |shutdown| async move {
                watcher.run(shutdown).await
            });
        }

        supervisor
    }

    /// Spawns one producer.
    pub fn spawn<F, Fut>(&mut self, name: &'static str, producer: F)
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: Future<Output = Result<(), ProducerError>> + Send + 'static,
    {
        let run = producer(self.shutdown.subscribe());
        let handle = tokio::spawn(async move {
            match run.await {
                Ok(()) => tracing::info!(producer = name, "Producer stopped"),
                Err(e) => tracing::error!(producer = name, error = %e, "Producer failed"),
            }
        });
        tracing::info!(producer = name, "Producer started");
        self.tasks.push((name, handle));
    }

    /// Number of producers spawned.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signals shutdown and waits for every producer to finish.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        let results = join_all(self.tasks.into_iter().map(|(name, handle)| async move {
            (name, handle.await)
        }))
        .await;

        for (name, result) in results {
            if let Err(e) = result {
                if e.is_panic() {
                    tracing::error!(producer = name, "Producer panicked");
                }
            }
        }
    }
}

impl Default for ProducerSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_stops_every_producer() {
        let mut supervisor = ProducerSupervisor::new();
        let stopped = Arc::new(AtomicBool::new(false));

        let flag = stopped.clone();
        supervisor.spawn("waiter", move |mut shutdown| async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        tokio::time::timeout(Duration::from_secs(1), supervisor.shutdown())
            .await
            .unwrap();
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failing_producer_does_not_affect_others() {
        let mut supervisor = ProducerSupervisor::new();
        let still_running = Arc::new(AtomicBool::new(false));

        supervisor.spawn("broken", |_| async { Err(ProducerError::WatchClosed) });
        let flag = still_running.clone();
        supervisor.spawn("healthy", move |mut shutdown| async move {
            flag.store(true, Ordering::SeqCst);
            let _ = shutdown.changed().await;
            Ok(())
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(still_running.load(Ordering::SeqCst));
        assert_eq!(supervisor.len(), 2);
        supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn start_respects_enabled_flags() {
        let config = ProducersConfig {
            chart_enabled: true,
            watch_enabled: false,
            ..ProducersConfig::default()
        };

        let supervisor = ProducerSupervisor::start(ConnectionRegistry::shared(), &config);
        assert_eq!(supervisor.len(), 1);
        supervisor.shutdown().await;
    }
}
