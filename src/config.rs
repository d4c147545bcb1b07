//! Engine configuration from environment variables
//!
//! Per-display settings (sources, method, interval) arrive through
//! `DisplayConfig`; this struct only carries engine-wide defaults and limits.

use std::env;
use std::time::Duration;

/// Engine-wide configuration
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// History capacity used when a display config does not set one
    pub history_capacity: usize,

    /// Number of points fed to trend regression and prediction
    pub trend_window: usize,

    /// Event bus buffer per subscriber (oldest events dropped beyond this)
    pub event_buffer: usize,

    /// Refresh interval used when a display config does not set one
    pub default_interval_ms: u64,

    /// Smallest accepted refresh interval
    pub min_interval_ms: u64,

    /// Age at which `recency` weighting reaches zero
    pub recency_horizon_secs: u64,

    /// Upper bound on a single source fetch
    pub fetch_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            trend_window: 24,
            event_buffer: 1024,
            default_interval_ms: 60_000,
            min_interval_ms: 10,
            recency_horizon_secs: 24 * 60 * 60,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SENTIFLOW_HISTORY_CAPACITY` (default: 1000)
    /// - `SENTIFLOW_TREND_WINDOW` (default: 24)
    /// - `SENTIFLOW_EVENT_BUFFER` (default: 1024)
    /// - `SENTIFLOW_DEFAULT_INTERVAL_MS` (default: 60000)
    /// - `SENTIFLOW_MIN_INTERVAL_MS` (default: 10)
    /// - `SENTIFLOW_RECENCY_HORIZON_SECS` (default: 86400)
    /// - `SENTIFLOW_FETCH_TIMEOUT_MS` (default: 10000)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            history_capacity: parse("SENTIFLOW_HISTORY_CAPACITY")
                .filter(|v| *v > 0)
                .map(|v| v as usize)
                .unwrap_or(defaults.history_capacity),

            trend_window: parse("SENTIFLOW_TREND_WINDOW")
                .filter(|v| *v >= 2)
                .map(|v| v as usize)
                .unwrap_or(defaults.trend_window),

            event_buffer: parse("SENTIFLOW_EVENT_BUFFER")
                .filter(|v| *v > 0)
                .map(|v| v as usize)
                .unwrap_or(defaults.event_buffer),

            default_interval_ms: parse("SENTIFLOW_DEFAULT_INTERVAL_MS")
                .unwrap_or(defaults.default_interval_ms),

            min_interval_ms: parse("SENTIFLOW_MIN_INTERVAL_MS")
                .unwrap_or(defaults.min_interval_ms),

            recency_horizon_secs: parse("SENTIFLOW_RECENCY_HORIZON_SECS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.recency_horizon_secs),

            fetch_timeout_ms: parse("SENTIFLOW_FETCH_TIMEOUT_MS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.fetch_timeout_ms),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn recency_horizon(&self) -> Duration {
        Duration::from_secs(self.recency_horizon_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        // Test: No variables set yields the documented defaults
        let config = EngineConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.trend_window, 24);
        assert_eq!(config.event_buffer, 1024);
        assert_eq!(config.default_interval_ms, 60_000);
        assert_eq!(config.min_interval_ms, 10);
        assert_eq!(config.recency_horizon(), Duration::from_secs(86_400));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_custom_config() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("SENTIFLOW_HISTORY_CAPACITY", "50"),
            ("SENTIFLOW_TREND_WINDOW", "12"),
            ("SENTIFLOW_DEFAULT_INTERVAL_MS", "2000"),
            ("SENTIFLOW_FETCH_TIMEOUT_MS", " 750 "),
        ]));

        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.trend_window, 12);
        assert_eq!(config.default_interval_ms, 2_000);
        assert_eq!(config.fetch_timeout_ms, 750);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        // Edge case: garbage and out-of-range values keep defaults
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("SENTIFLOW_HISTORY_CAPACITY", "0"),
            ("SENTIFLOW_TREND_WINDOW", "1"),
            ("SENTIFLOW_EVENT_BUFFER", "lots"),
            ("SENTIFLOW_FETCH_TIMEOUT_MS", "0"),
        ]));

        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.trend_window, 24);
        assert_eq!(config.event_buffer, 1024);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }
}
