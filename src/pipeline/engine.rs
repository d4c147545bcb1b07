//! Scoring engine - the synchronous half of a refresh cycle
//!
//! ```text
//! Vec<SourceReading> (fetched by the registry)
//!     ↓
//! Aggregator::aggregate()      → CompositeScore | NoValidSources
//!     ↓
//! TrendAnalyzer::analyze()     → TrendAnalysis (history tail + new point)
//!     ↓
//! AlertEvaluator::evaluate()   → Vec<AlertEvent>
//!     ↓
//! HistoryStore::push()         → current_state replaced
//! ```
//!
//! Runs under the display's write lock with no suspension points. On error
//! nothing in `DisplayState` except source status is touched.

use super::history::HistoryStore;
use super::metrics::PerformanceMetrics;
use super::types::{DisplayConfig, DisplayId, ScoreSnapshot, SentimentLabel};
use crate::aggregator_core::{Aggregator, QualityMetrics};
use crate::alerts::{AlertConfig, AlertEvaluator, AlertEvent};
use crate::analysis::TrendAnalyzer;
use crate::error::Result;
use crate::sources::{SourceReading, SourceStatus};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Mutable state of one display, guarded by its `RwLock`
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub config: DisplayConfig,
    pub current: ScoreSnapshot,
    pub history: HistoryStore,
    pub alerts: AlertConfig,
    pub metrics: PerformanceMetrics,
    pub is_active: bool,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl DisplayState {
    pub fn new(config: DisplayConfig, alerts: AlertConfig, now: DateTime<Utc>) -> Self {
        let history = HistoryStore::new(config.capacity());
        Self {
            config,
            current: ScoreSnapshot::neutral(now),
            history,
            alerts,
            metrics: PerformanceMetrics::default(),
            is_active: true,
            is_visible: true,
            created_at: now,
            modified_at: now,
        }
    }

    /// Mark a mutation; `modified_at` never goes backwards
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified_at = self.modified_at.max(now);
    }

    /// Write fetch outcomes back onto the configured sources
    ///
    /// Sources removed while the fetch was in flight are ignored.
    pub fn record_source_results(&mut self, readings: &[SourceReading]) {
        for reading in readings {
            let Some(source) = self
                .config
                .sources
                .iter_mut()
                .find(|s| s.id == reading.source_id)
            else {
                continue;
            };

            source.last_fetch = Some(reading.timestamp);
            if reading.is_healthy() {
                source.status = SourceStatus::Connected;
                source.last_error = None;
            } else {
                source.status = SourceStatus::Error;
                source.last_error = Some(reading.errors.join("; "));
            }
        }
    }
}

/// Result of a successful cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub snapshot: ScoreSnapshot,
    pub alerts: Vec<AlertEvent>,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    trend: TrendAnalyzer,
    trend_window: usize,
    recency_horizon: Duration,
}

impl ScoringEngine {
    pub fn new(trend_window: usize, recency_horizon: Duration) -> Self {
        let trend_window = trend_window.max(2);
        Self {
            trend: TrendAnalyzer::new(trend_window),
            trend_window,
            recency_horizon,
        }
    }

    /// Fold one cycle's readings into the display state
    ///
    /// # Arguments
    /// * `id` - Display being refreshed (carried on alert events)
    /// * `state` - The display's state, write-locked by the caller
    /// * `readings` - Every reading of this cycle, healthy or not
    /// * `now` - Cycle timestamp
    ///
    /// # Returns
    /// * `Ok(CycleOutcome)` - new snapshot (already stored) and fired alerts
    /// * `Err(NoValidSources)` - state left as it was
    pub fn apply(
        &self,
        id: DisplayId,
        state: &mut DisplayState,
        readings: &[SourceReading],
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome> {
        let aggregator = Aggregator::new(
            state.config.aggregation_method,
            state.config.weighting_strategy,
            self.recency_horizon,
        );
        let composite = aggregator.aggregate(readings)?;
        let quality = QualityMetrics::assess(readings, self.recency_horizon);

        let timestamp = state
            .history
            .next_timestamp(now.max(state.current.timestamp));

        let mut series = state.history.series(self.trend_window - 1);
        series.push((timestamp, composite.score));
        let trend = self.trend.analyze(&series, &state.current.trend);

        let snapshot = ScoreSnapshot {
            score: composite.score,
            label: SentimentLabel::from_score(composite.score),
            confidence: composite.confidence,
            sources: composite.contributions,
            categories: composite.categories,
            trend,
            quality,
            timestamp,
        };

        let previous = state.history.latest().map(|s| s.score);
        let alerts = AlertEvaluator::evaluate(&mut state.alerts, id, &snapshot, previous);

        state.history.push(snapshot.clone());
        state.current = snapshot.clone();

        Ok(CycleOutcome { snapshot, alerts })
    }
}
