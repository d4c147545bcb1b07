//! Per-display refresh metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Completed cycles, successful or not
    pub refresh_count: u64,
    pub failed_refreshes: u64,
    pub consecutive_failures: u64,
    pub last_refresh_duration_ms: u64,
    /// Running mean over all completed cycles
    pub avg_refresh_duration_ms: f64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub alerts_triggered: u64,
    /// Fetch attempts (skipped sources excluded)
    pub source_fetches: u64,
    pub source_failures: u64,
}

impl PerformanceMetrics {
    /// Record a cycle that produced a snapshot
    pub fn record_success(
        &mut self,
        elapsed: Duration,
        fetched: usize,
        failed: usize,
        alerts: usize,
        at: DateTime<Utc>,
    ) {
        self.record_cycle(elapsed, fetched, failed);
        self.consecutive_failures = 0;
        self.alerts_triggered += alerts as u64;
        self.last_success = Some(at);
    }

    /// Record a cycle that left the state untouched
    pub fn record_failure(&mut self, elapsed: Duration, fetched: usize, failed: usize, at: DateTime<Utc>) {
        self.record_cycle(elapsed, fetched, failed);
        self.failed_refreshes += 1;
        self.consecutive_failures += 1;
        self.last_failure = Some(at);
    }

    fn record_cycle(&mut self, elapsed: Duration, fetched: usize, failed: usize) {
        let ms = elapsed.as_millis() as u64;
        self.refresh_count += 1;
        self.last_refresh_duration_ms = ms;
        self.avg_refresh_duration_ms +=
            (ms as f64 - self.avg_refresh_duration_ms) / self.refresh_count as f64;
        self.source_fetches += fetched as u64;
        self.source_failures += failed as u64;
    }

    /// Fraction of cycles that succeeded (1.0 before the first cycle)
    pub fn success_rate(&self) -> f64 {
        if self.refresh_count == 0 {
            return 1.0;
        }
        (self.refresh_count - self.failed_refreshes) as f64 / self.refresh_count as f64
    }

    pub fn source_error_rate(&self) -> f64 {
        if self.source_fetches == 0 {
            return 0.0;
        }
        self.source_failures as f64 / self.source_fetches as f64
    }
}
