//! Producer errors.

use thiserror::Error;

/// Failures that end a producer task.
///
/// The supervisor logs these; they never reach the registry or other
/// producers.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("File watch failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("File watcher stopped delivering events")]
    WatchClosed,
}
