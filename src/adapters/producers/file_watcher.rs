//! File watcher - broadcasts a `file_update` to everyone when a file changes.
//!
//! Change notifications arrive on notify's own thread and are bridged into
//! the runtime through a small channel. Events that arrive together are
//! coalesced into one broadcast.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};

use crate::application::ConnectionRegistry;
use crate::domain::realtime::PushMessage;

use super::error::ProducerError;

/// Event name carried in every file update.
pub const FILE_UPDATED_EVENT: &str = "file_updated";

const EVENT_BUFFER: usize = 64;

/// Watches one path and notifies all connected users of changes.
pub struct FileWatcher {
    registry: Arc<ConnectionRegistry>,
    path: PathBuf,
}

impl FileWatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run until the shutdown signal is received.
    ///
    /// # Errors
    ///
    /// `ProducerError::Watch` if the path cannot be watched (for example it
    /// does not exist).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ProducerError> {
        let (changes_tx, mut changes) = mpsc::channel::<()>(EVENT_BUFFER);
        let mut watcher: RecommendedWatcher =
            notify::recommended_watcher(move |event: notify::Result<Event>| {
                queue_change(&changes_tx, event);
            })?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %self.path.display(), "Watching file for changes");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!(path = %self.path.display(), "File watcher stopping");
                        return Ok(());
                    }
                }
                change = changes.recv() => {
                    if change.is_none() {
                        return Err(ProducerError::WatchClosed);
                    }
                    while changes.try_recv().is_ok() {}
                    self.notify_all().await;
                }
            }
        }
    }

    async fn notify_all(&self) {
        let outcome = self
            .registry
            .broadcast_to_all(PushMessage::file_update(FILE_UPDATED_EVENT))
            .await;
        tracing::info!(
            path = %self.path.display(),
            recipients = outcome.enqueued,
            "File changed"
        );
    }
}

/// Queues a change marker for `event` if it is a change.
///
/// Only changes are queued, so a full buffer already holds a pending one.
fn queue_change(changes: &mpsc::Sender<()>, event: notify::Result<Event>) {
    if is_change(event) {
        let _ = changes.try_send(());
    }
}

/// True for events that mean the file content or presence changed.
fn is_change(event: notify::Result<Event>) -> bool {
    match event {
        Ok(event) => matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
        ),
        Err(e) => {
            tracing::warn!(error = %e, "File watch error");
            false
        }
    }
}
