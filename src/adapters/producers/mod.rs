//! Event producers - background tasks that feed the registry.
//!
//! - `chart_generator` - random chart samples, one user per tick
//! - `file_watcher` - `file_update` to everyone when a file changes
//! - `supervisor` - shared shutdown and failure logging

mod chart_generator;
mod error;
mod file_watcher;
mod supervisor;

pub use chart_generator::{
    series_for, target_index, ChartGenerator, ChartGeneratorConfig, SAMPLE_RANGE,
};
pub use error::ProducerError;
pub use file_watcher::{FileWatcher, FILE_UPDATED_EVENT};
pub use supervisor::ProducerSupervisor;
