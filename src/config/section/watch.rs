//! `[watch]` section configuration.
//!
//! Tunes external-change detection and persistence.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! poll_interval_ms = 300      # Stat polling period (always active)
//! debounce_ms = 120           # Quiescence window before reconciling
//! persist_timeout_ms = 2000   # Upper bound for a single read/write
//! native = true               # Native file + directory notifications
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Smallest accepted polling period.
const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Stat polling period in milliseconds.
    pub poll_interval_ms: u64,

    /// Debounce window in milliseconds.
    pub debounce_ms: u64,

    /// Timeout for one disk read or write, in milliseconds.
    pub persist_timeout_ms: u64,

    /// Enable native change notifications on the file and its directory.
    pub native: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 300,
            debounce_ms: 120,
            persist_timeout_ms: 2000,
            native: true,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            diag.error(
                "watch.poll_interval_ms",
                format!("must be at least {MIN_POLL_INTERVAL_MS}"),
            );
        }
        if self.debounce_ms == 0 {
            diag.error("watch.debounce_ms", "must be greater than 0");
        }
        if self.persist_timeout_ms == 0 {
            diag.error("watch.persist_timeout_ms", "must be greater than 0");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_watch_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.watch.poll_interval(), Duration::from_millis(300));
        assert_eq!(config.watch.debounce(), Duration::from_millis(120));
        assert_eq!(config.watch.persist_timeout(), Duration::from_secs(2));
        assert!(config.watch.native);
    }

    #[test]
    fn test_watch_config_override() {
        let config = test_parse_config("[watch]\ndebounce_ms = 50\nnative = false");

        assert_eq!(config.watch.debounce(), Duration::from_millis(50));
        assert!(!config.watch.native);
        assert_eq!(config.watch.poll_interval_ms, 300);
    }

    #[test]
    fn test_watch_config_validation() {
        let config =
            test_parse_config("[watch]\npoll_interval_ms = 1\ndebounce_ms = 0\npersist_timeout_ms = 0");
        let mut diag = ConfigDiagnostics::new();
        config.watch.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }
}
