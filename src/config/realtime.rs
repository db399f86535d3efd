//! Connection registry configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::RegistryConfig;

use super::error::ValidationError;

/// Per-connection queue and session revalidation settings
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Bound of each connection's outbound queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Start a session guard for every connection
    #[serde(default = "default_revalidate_sessions")]
    pub revalidate_sessions: bool,

    /// Seconds between session re-checks
    #[serde(default = "default_revalidate_interval")]
    pub revalidate_interval_secs: u64,

    /// Milliseconds allowed for writing a close frame
    #[serde(default = "default_close_timeout")]
    pub close_timeout_ms: u64,
}

impl RealtimeConfig {
    /// Get revalidation interval as Duration
    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_secs(self.revalidate_interval_secs)
    }

    /// Get close frame timeout as Duration
    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    /// Registry settings derived from this section
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            queue_capacity: self.queue_capacity,
            revalidate_sessions: self.revalidate_sessions,
            revalidate_interval: self.revalidate_interval(),
            close_timeout: self.close_timeout(),
        }
    }

    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.revalidate_sessions && self.revalidate_interval_secs == 0 {
            return Err(ValidationError::InvalidRevalidateInterval);
        }
        if self.close_timeout_ms == 0 {
            return Err(ValidationError::InvalidCloseTimeout);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            revalidate_sessions: default_revalidate_sessions(),
            revalidate_interval_secs: default_revalidate_interval(),
            close_timeout_ms: default_close_timeout(),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

fn default_revalidate_sessions() -> bool {
    true
}

fn default_revalidate_interval() -> u64 {
    30
}

fn default_close_timeout() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_config_defaults() {
        let config = RealtimeConfig::default();
        assert_eq!(config.queue_capacity, 64);
        assert!(config.revalidate_sessions);
        assert_eq!(config.revalidate_interval(), Duration::from_secs(30));
        assert_eq!(config.close_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_registry_config_mirrors_section() {
        let config = RealtimeConfig {
            queue_capacity: 8,
            revalidate_sessions: false,
            revalidate_interval_secs: 5,
            close_timeout_ms: 250,
        };
        let registry = config.registry_config();
        assert_eq!(registry.queue_capacity, 8);
        assert!(!registry.revalidate_sessions);
        assert_eq!(registry.revalidate_interval, Duration::from_secs(5));
        assert_eq!(registry.close_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_validation_zero_capacity() {
        let config = RealtimeConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidQueueCapacity));
    }

    #[test]
    fn test_zero_interval_allowed_only_without_revalidation() {
        let config = RealtimeConfig {
            revalidate_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RealtimeConfig {
            revalidate_sessions: false,
            revalidate_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_close_timeout() {
        let config = RealtimeConfig {
            close_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCloseTimeout));
    }
}
