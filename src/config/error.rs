//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Queue capacity must be at least 1")]
    InvalidQueueCapacity,

    #[error("Session revalidation interval must be at least 1 second")]
    InvalidRevalidateInterval,

    #[error("Close frame timeout must be at least 1ms")]
    InvalidCloseTimeout,

    #[error("Chart interval must be at least 10ms")]
    InvalidChartInterval,

    #[error("Invalid user entry (expected name:password)")]
    InvalidUserEntry,

    #[error("Cookie name must be non-empty and contain no separators")]
    InvalidCookieName,
}
