//! Event producer configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Chart generator and file watcher settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProducersConfig {
    /// Milliseconds between chart samples
    #[serde(default = "default_chart_interval")]
    pub chart_interval_ms: u64,

    /// Run the chart generator
    #[serde(default = "default_enabled")]
    pub chart_enabled: bool,

    /// File whose changes are broadcast
    #[serde(default = "default_watch_path")]
    pub watch_path: PathBuf,

    /// Run the file watcher
    #[serde(default = "default_enabled")]
    pub watch_enabled: bool,
}

impl ProducersConfig {
    /// Get chart interval as Duration
    pub fn chart_interval(&self) -> Duration {
        Duration::from_millis(self.chart_interval_ms)
    }

    /// Validate producer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chart_enabled && self.chart_interval_ms < 10 {
            return Err(ValidationError::InvalidChartInterval);
        }
        if self.watch_enabled && self.watch_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("PUSH_HUB__PRODUCERS__WATCH_PATH"));
        }
        Ok(())
    }
}

impl Default for ProducersConfig {
    fn default() -> Self {
        Self {
            chart_interval_ms: default_chart_interval(),
            chart_enabled: default_enabled(),
            watch_path: default_watch_path(),
            watch_enabled: default_enabled(),
        }
    }
}

fn default_chart_interval() -> u64 {
    1000
}

fn default_enabled() -> bool {
    true
}

fn default_watch_path() -> PathBuf {
    PathBuf::from("data.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producers_config_defaults() {
        let config = ProducersConfig::default();
        assert_eq!(config.chart_interval(), Duration::from_secs(1));
        assert!(config.chart_enabled);
        assert_eq!(config.watch_path, PathBuf::from("data.txt"));
        assert!(config.watch_enabled);
    }

    #[test]
    fn test_validation_chart_interval_too_short() {
        let config = ProducersConfig {
            chart_interval_ms: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidChartInterval));
    }

    #[test]
    fn test_validation_skips_disabled_producers() {
        let config = ProducersConfig {
            chart_interval_ms: 0,
            chart_enabled: false,
            watch_path: PathBuf::new(),
            watch_enabled: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_watch_path() {
        let config = ProducersConfig {
            watch_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
