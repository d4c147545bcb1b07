//! Display registry - owns every display and wires the components together
//!
//! The registry is an explicit instance (cheap to clone) rather than a global.
//! Each display lives in a generational table behind its own lock:
//!
//! - `state` (`RwLock`) - config, current snapshot, history, thresholds
//! - `gate` (`Mutex<()>`) - held for a whole refresh cycle, so cycles of one
//!   display never overlap
//! - `lifetime` (`CancellationToken`) - cancelled on delete; scheduler tasks
//!   and in-flight fetches hang off child tokens
//!
//! The table lock is only held for lookups, inserts and removals. Displays
//! never lock each other.

use super::engine::{CycleOutcome, DisplayState, ScoringEngine};
use super::events::{DisplayEvent, EventBus};
use super::metrics::PerformanceMetrics;
use super::scheduler::{RefreshScheduler, RefreshTarget};
use super::table::DisplayTable;
use super::types::{DisplayConfig, DisplayConfigPatch, DisplayId, DisplayView, ScoreSnapshot};
use crate::alerts::{AlertConfig, AlertThreshold, ThresholdPatch};
use crate::analysis::{LinearPredictor, PatternAnalyzer, PatternReport, Prediction, ScorePredictor};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::sources::{DataSource, SourceConnector, SourceFetcher, SourcePatch, SourceReading};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

struct DisplayEntry {
    lifetime: CancellationToken,
    gate: Mutex<()>,
    state: RwLock<DisplayState>,
}

struct RegistryInner {
    config: EngineConfig,
    connector: SourceConnector,
    engine: ScoringEngine,
    predictor: Arc<dyn ScorePredictor>,
    patterns: PatternAnalyzer,
    table: RwLock<DisplayTable<Arc<DisplayEntry>>>,
    scheduler: RefreshScheduler,
    events: EventBus,
}

/// Public entry point of the engine
#[derive(Clone)]
pub struct DisplayRegistry {
    inner: Arc<RegistryInner>,
}

impl DisplayRegistry {
    /// Registry with the linear baseline predictor
    pub fn new(fetcher: Arc<dyn SourceFetcher>, config: EngineConfig) -> Self {
        let predictor = Arc::new(LinearPredictor::new(config.trend_window));
        Self::with_predictor(fetcher, config, predictor)
    }

    /// Registry with a custom prediction model
    pub fn with_predictor(
        fetcher: Arc<dyn SourceFetcher>,
        config: EngineConfig,
        predictor: Arc<dyn ScorePredictor>,
    ) -> Self {
        let inner = RegistryInner {
            connector: SourceConnector::new(fetcher, config.fetch_timeout()),
            engine: ScoringEngine::new(config.trend_window, config.recency_horizon()),
            predictor,
            patterns: PatternAnalyzer::new(),
            table: RwLock::new(DisplayTable::new()),
            scheduler: RefreshScheduler::new(),
            events: EventBus::new(config.event_buffer),
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Event bus for `on` / `off` / `subscribe`
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Create a display and start its refresh schedule
    ///
    /// The first refresh runs right away on the scheduler task; its outcome
    /// arrives as `ScoreUpdated` or `RefreshFailed`.
    pub async fn create(&self, config: DisplayConfig, alert_config: AlertConfig) -> Result<DisplayView> {
        let config = config.resolved(&self.inner.config);
        config
            .validate(self.inner.config.min_interval_ms)
            .map_err(EngineError::Validation)?;
        alert_config.validate().map_err(EngineError::Validation)?;

        let period = Duration::from_millis(config.interval_ms());
        let name = config.name.clone();
        let now = Utc::now();

        let (id, entry) = {
            let mut table = self.inner.table.write().await;
            let id = table.insert_with(|_| {
                Arc::new(DisplayEntry {
                    lifetime: CancellationToken::new(),
                    gate: Mutex::new(()),
                    state: RwLock::new(DisplayState::new(config, alert_config, now)),
                })
            });
            let entry = table.get(id).cloned().ok_or(EngineError::NotFound(id))?;
            (id, entry)
        };

        log::info!("✅ Created {} ({}), refresh every {}ms", id, name, period.as_millis());
        self.inner.events.publish(DisplayEvent::DisplayCreated { id, name });
        self.inner
            .scheduler
            .schedule(id, period, &entry.lifetime, Arc::downgrade(&self.inner));

        let state = entry.state.read().await;
        Ok(view_of(id, &state))
    }

    pub async fn get(&self, id: DisplayId) -> Result<DisplayView> {
        let entry = self.inner.entry(id).await?;
        let state = entry.state.read().await;
        Ok(view_of(id, &state))
    }

    /// Live display ids
    pub async fn list(&self) -> Vec<DisplayId> {
        self.inner.table.read().await.ids()
    }

    /// Apply a partial config update
    ///
    /// A changed interval replaces the scheduled task before this returns.
    pub async fn update(&self, id: DisplayId, patch: DisplayConfigPatch) -> Result<DisplayView> {
        let entry = self.inner.entry(id).await?;
        let mut state = entry.state.write().await;

        let mut config = state.config.clone();
        patch.apply(&mut config);
        config
            .validate(self.inner.config.min_interval_ms)
            .map_err(EngineError::Validation)?;

        let interval_changed = config.update_interval_ms != state.config.update_interval_ms;
        if config.history_capacity != state.config.history_capacity {
            state.history.set_capacity(config.capacity());
        }
        state.config = config;
        state.touch(Utc::now());

        if interval_changed && state.is_active {
            let period = Duration::from_millis(state.config.interval_ms());
            self.inner
                .scheduler
                .schedule(id, period, &entry.lifetime, Arc::downgrade(&self.inner));
        }

        let view = view_of(id, &state);
        drop(state);
        self.inner.events.publish(DisplayEvent::DisplayUpdated { id });
        Ok(view)
    }

    /// Remove a display, its thresholds and its schedule
    ///
    /// # Returns
    /// `false` if `id` is unknown (or already deleted)
    pub async fn delete(&self, id: DisplayId) -> bool {
        let removed = self.inner.table.write().await.remove(id);
        let Some(entry) = removed else {
            return false;
        };

        entry.lifetime.cancel();
        self.inner.scheduler.cancel(id);

        log::info!("🗑️  Deleted {}", id);
        self.inner.events.publish(DisplayEvent::DisplayDeleted { id });
        true
    }

    pub async fn add_source(&self, id: DisplayId, source: DataSource) -> Result<DataSource> {
        source.validate().map_err(EngineError::Validation)?;
        self.inner
            .mutate(id, |state| {
                if state.config.source(&source.id).is_some() {
                    return Err(EngineError::Validation(format!(
                        "duplicate source id: {}",
                        source.id
                    )));
                }
                state.config.sources.push(source.clone());
                Ok(source)
            })
            .await
    }

    pub async fn remove_source(&self, id: DisplayId, source_id: &str) -> Result<DataSource> {
        self.inner
            .mutate(id, |state| {
                let pos = state
                    .config
                    .sources
                    .iter()
                    .position(|s| s.id == source_id)
                    .ok_or_else(|| EngineError::SourceNotFound {
                        display: id,
                        source_id: source_id.to_string(),
                    })?;
                Ok(state.config.sources.remove(pos))
            })
            .await
    }

    pub async fn update_source(&self, id: DisplayId, source_id: &str, patch: SourcePatch) -> Result<DataSource> {
        self.inner
            .mutate(id, |state| {
                let source = state
                    .config
                    .sources
                    .iter_mut()
                    .find(|s| s.id == source_id)
                    .ok_or_else(|| EngineError::SourceNotFound {
                        display: id,
                        source_id: source_id.to_string(),
                    })?;

                let mut updated = source.clone();
                patch.apply(&mut updated);
                updated.validate().map_err(EngineError::Validation)?;
                *source = updated.clone();
                Ok(updated)
            })
            .await
    }

    pub async fn add_threshold(&self, id: DisplayId, threshold: AlertThreshold) -> Result<AlertThreshold> {
        threshold.validate().map_err(EngineError::Validation)?;
        self.inner
            .mutate(id, |state| {
                if state.alerts.threshold(&threshold.id).is_some() {
                    return Err(EngineError::Validation(format!(
                        "duplicate threshold id: {}",
                        threshold.id
                    )));
                }
                state.alerts.thresholds.push(threshold.clone());
                Ok(threshold)
            })
            .await
    }

    pub async fn remove_threshold(&self, id: DisplayId, threshold_id: &str) -> Result<AlertThreshold> {
        self.inner
            .mutate(id, |state| {
                let pos = state
                    .alerts
                    .thresholds
                    .iter()
                    .position(|t| t.id == threshold_id)
                    .ok_or_else(|| EngineError::ThresholdNotFound {
                        display: id,
                        threshold_id: threshold_id.to_string(),
                    })?;
                Ok(state.alerts.thresholds.remove(pos))
            })
            .await
    }

    pub async fn update_threshold(
        &self,
        id: DisplayId,
        threshold_id: &str,
        patch: ThresholdPatch,
    ) -> Result<AlertThreshold> {
        self.inner
            .mutate(id, |state| {
                let threshold = state
                    .alerts
                    .threshold_mut(threshold_id)
                    .ok_or_else(|| EngineError::ThresholdNotFound {
                        display: id,
                        threshold_id: threshold_id.to_string(),
                    })?;

                let mut updated = threshold.clone();
                patch.apply(&mut updated);
                updated.validate().map_err(EngineError::Validation)?;
                *threshold = updated.clone();
                Ok(updated)
            })
            .await
    }

    pub async fn thresholds(&self, id: DisplayId) -> Result<Vec<AlertThreshold>> {
        let entry = self.inner.entry(id).await?;
        let state = entry.state.read().await;
        Ok(state.alerts.thresholds.clone())
    }

    /// Replace the whole threshold list
    pub async fn set_thresholds(&self, id: DisplayId, thresholds: Vec<AlertThreshold>) -> Result<()> {
        self.inner
            .mutate(id, |state| {
                let mut alerts = state.alerts.clone();
                alerts.thresholds = thresholds;
                alerts.validate().map_err(EngineError::Validation)?;
                state.alerts = alerts;
                Ok(())
            })
            .await
    }

    /// Replace delivery channels, escalation policy and thresholds at once
    pub async fn set_alert_config(&self, id: DisplayId, alert_config: AlertConfig) -> Result<()> {
        alert_config.validate().map_err(EngineError::Validation)?;
        self.inner
            .mutate(id, |state| {
                state.alerts = alert_config;
                Ok(())
            })
            .await
    }

    /// Pause or resume the refresh schedule; the display is kept either way
    pub async fn set_active(&self, id: DisplayId, active: bool) -> Result<()> {
        let entry = self.inner.entry(id).await?;
        let mut state = entry.state.write().await;
        if state.is_active == active {
            return Ok(());
        }

        state.is_active = active;
        state.touch(Utc::now());
        if active {
            let period = Duration::from_millis(state.config.interval_ms());
            self.inner
                .scheduler
                .schedule(id, period, &entry.lifetime, Arc::downgrade(&self.inner));
        } else {
            self.inner.scheduler.cancel(id);
        }
        drop(state);

        log::info!("{} {}", if active { "▶️  Resumed" } else { "⏸️  Paused" }, id);
        self.inner.events.publish(DisplayEvent::DisplayUpdated { id });
        Ok(())
    }

    pub async fn set_visible(&self, id: DisplayId, visible: bool) -> Result<()> {
        self.inner
            .mutate(id, |state| {
                state.is_visible = visible;
                Ok(())
            })
            .await
    }

    pub async fn current_state(&self, id: DisplayId) -> Result<ScoreSnapshot> {
        let entry = self.inner.entry(id).await?;
        let state = entry.state.read().await;
        Ok(state.current.clone())
    }

    /// Stored snapshots, oldest first, optionally only the last `limit`
    pub async fn history(&self, id: DisplayId, limit: Option<usize>) -> Result<Vec<ScoreSnapshot>> {
        let entry = self.inner.entry(id).await?;
        let state = entry.state.read().await;
        Ok(state.history.recent(limit))
    }

    pub async fn metrics(&self, id: DisplayId) -> Result<PerformanceMetrics> {
        let entry = self.inner.entry(id).await?;
        let state = entry.state.read().await;
        Ok(state.metrics.clone())
    }

    /// One prediction per requested horizon
    pub async fn predict(&self, id: DisplayId, horizons: &[Duration]) -> Result<Vec<Prediction>> {
        let history = self.history(id, None).await?;
        Ok(self.inner.predictor.predict(&history, horizons))
    }

    pub async fn analyze_patterns(&self, id: DisplayId) -> Result<PatternReport> {
        let history = self.history(id, None).await?;
        Ok(self.inner.patterns.analyze(&history))
    }

    /// Run one refresh cycle now, on the caller's task
    ///
    /// Same path as a scheduled tick, including published events. Waits for
    /// an in-flight scheduled cycle of the same display to finish first.
    pub async fn refresh_now(&self, id: DisplayId) -> Result<ScoreSnapshot> {
        let entry = self.inner.entry(id).await?;
        let cancel = entry.lifetime.child_token();
        self.inner
            .run_cycle(id, &entry, &cancel)
            .await
            .map(|outcome| outcome.snapshot)
    }

    pub fn scheduled_count(&self) -> usize {
        self.inner.scheduler.len()
    }

    pub fn is_scheduled(&self, id: DisplayId) -> bool {
        self.inner.scheduler.is_scheduled(id)
    }

    /// Cancel every scheduled refresh; displays and their state are kept
    pub fn shutdown(&self) {
        self.inner.scheduler.shutdown();
    }
}

impl RegistryInner {
    async fn entry(&self, id: DisplayId) -> Result<Arc<DisplayEntry>> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))
    }

    /// Apply one mutation under the display's write lock
    ///
    /// On success bumps `modified_at` and publishes `DisplayUpdated`; on error
    /// the closure must leave the state untouched.
    async fn mutate<T, F>(&self, id: DisplayId, f: F) -> Result<T>
    where
        F: FnOnce(&mut DisplayState) -> Result<T>,
    {
        let entry = self.entry(id).await?;
        let mut state = entry.state.write().await;
        let value = f(&mut state)?;
        state.touch(Utc::now());
        drop(state);

        self.events.publish(DisplayEvent::DisplayUpdated { id });
        Ok(value)
    }

    /// fetch → aggregate → trend → alert → history → publish
    async fn run_cycle(
        &self,
        id: DisplayId,
        entry: &DisplayEntry,
        cancel: &CancellationToken,
    ) -> Result<CycleOutcome> {
        let _gate = entry.gate.lock().await;
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let started = Instant::now();
        let sources = entry.state.read().await.config.sources.clone();
        let readings = self.fetch_all(&sources, cancel).await;

        if cancel.is_cancelled() {
            log::debug!("Discarding refresh of {} (cancelled during fetch)", id);
            return Err(EngineError::Cancelled);
        }

        let failed = readings.iter().filter(|r| !r.is_healthy()).count();
        let now = Utc::now();
        let mut state = entry.state.write().await;
        state.record_source_results(&readings);

        match self.engine.apply(id, &mut state, &readings, now) {
            Ok(outcome) => {
                state.metrics.record_success(
                    started.elapsed(),
                    readings.len(),
                    failed,
                    outcome.alerts.len(),
                    now,
                );
                drop(state);

                log::debug!(
                    "📊 {} score={:.3} ({}) confidence={:.2} sources={}/{}",
                    id,
                    outcome.snapshot.score,
                    outcome.snapshot.label.as_str(),
                    outcome.snapshot.confidence,
                    readings.len() - failed,
                    readings.len()
                );

                self.events.publish(DisplayEvent::ScoreUpdated {
                    id,
                    snapshot: outcome.snapshot.clone(),
                });
                for alert in &outcome.alerts {
                    self.events
                        .publish(DisplayEvent::AlertTriggered(Box::new(alert.clone())));
                }
                Ok(outcome)
            }
            Err(e) => {
                state
                    .metrics
                    .record_failure(started.elapsed(), readings.len(), failed, now);
                drop(state);

                log::warn!("⚠️  Refresh of {} failed: {}", id, e);
                self.events.publish(DisplayEvent::RefreshFailed {
                    id,
                    error: e.clone(),
                });
                Err(e)
            }
        }
    }

    /// Fetch every source concurrently, results in configured order
    async fn fetch_all(&self, sources: &[DataSource], cancel: &CancellationToken) -> Vec<SourceReading> {
        let mut set = JoinSet::new();
        for (index, source) in sources.iter().enumerate() {
            if !source.is_fetchable() {
                continue;
            }
            let connector = self.connector.clone();
            let source = source.clone();
            let cancel = cancel.clone();
            set.spawn(async move { (index, connector.fetch(&source, &cancel).await) });
        }

        let mut by_index: HashMap<usize, Option<SourceReading>> = HashMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, reading)) => {
                    by_index.insert(index, reading);
                }
                Err(e) => log::error!("❌ Source fetch task failed: {}", e),
            }
        }

        let now = Utc::now();
        sources
            .iter()
            .enumerate()
            .filter(|(_, source)| source.is_fetchable())
            .filter_map(|(index, source)| match by_index.remove(&index) {
                Some(reading) => reading,
                None => Some(SourceReading::failed(source, "fetch task panicked".to_string(), now)),
            })
            .collect()
    }
}

#[async_trait]
impl RefreshTarget for RegistryInner {
    async fn refresh(&self, id: DisplayId, cancel: &CancellationToken) -> Result<()> {
        let entry = self.entry(id).await?;
        self.run_cycle(id, &entry, cancel).await.map(|_| ())
    }
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}

fn view_of(id: DisplayId, state: &DisplayState) -> DisplayView {
    DisplayView {
        id,
        config: state.config.clone(),
        current_state: state.current.clone(),
        alert_config: state.alerts.clone(),
        is_active: state.is_active,
        is_visible: state.is_visible,
        history_len: state.history.len(),
        created_at: state.created_at,
        modified_at: state.modified_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertCondition, Severity};
    use crate::error::SourceFetchError;
    use crate::sources::{RawReading, SourceType};

    /// Returns the `value` parameter of each source, or fails if it has none
    struct ParamFetcher;

    #[async_trait]
    impl SourceFetcher for ParamFetcher {
        async fn fetch(
            &self,
            source: &DataSource,
            _cancel: &CancellationToken,
        ) -> std::result::Result<RawReading, SourceFetchError> {
            source
                .parameters
                .get("value")
                .and_then(|v| v.as_f64())
                .map(|v| RawReading::new(v, 0.9))
                .ok_or_else(|| SourceFetchError::Unavailable(format!("{} has no value", source.id)))
        }
    }

    fn make_registry() -> DisplayRegistry {
        DisplayRegistry::new(Arc::new(ParamFetcher), EngineConfig::default())
    }

    fn source(id: &str, value: f64) -> DataSource {
        let mut s = DataSource::new(id, id, SourceType::MarketData);
        s.parameters = serde_json::json!({ "value": value });
        s
    }

    /// Long interval so only the immediate first tick runs during a test
    fn make_config() -> DisplayConfig {
        DisplayConfig::new("test")
            .with_interval_ms(3_600_000)
            .with_source(source("a", 0.8))
            .with_source(source("b", 0.4))
    }

    #[tokio::test]
    async fn test_create_get_and_refresh_now() {
        let registry = make_registry();
        let view = registry.create(make_config(), AlertConfig::default()).await.unwrap();
        assert_eq!(view.current_state.score, 0.0);
        assert!(view.is_active && view.is_visible);

        let snapshot = registry.refresh_now(view.id).await.unwrap();
        assert!((snapshot.score - 0.6).abs() < 1e-9);

        let current = registry.current_state(view.id).await.unwrap();
        assert_eq!(current.score, snapshot.score);
        assert!(registry.history(view.id, None).await.unwrap().len() >= 1);
        assert!(registry.metrics(view.id).await.unwrap().refresh_count >= 1);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let registry = make_registry();
        let err = registry
            .create(DisplayConfig::new("bad").with_interval_ms(1), AlertConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_source_and_threshold_crud() {
        let registry = make_registry();
        let id = registry.create(make_config(), AlertConfig::default()).await.unwrap().id;

        registry.add_source(id, source("c", -0.2)).await.unwrap();
        assert!(matches!(
            registry.add_source(id, source("c", 0.0)).await,
            Err(EngineError::Validation(_))
        ));

        let patched = registry
            .update_source(
                id,
                "c",
                SourcePatch {
                    weight: Some(3.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.weight, 3.0);

        let bad_patch = SourcePatch {
            reliability: Some(2.0),
            ..Default::default()
        };
        assert!(registry.update_source(id, "c", bad_patch).await.is_err());
        assert_eq!(registry.get(id).await.unwrap().config.sources[2].reliability, 0.8);

        registry.remove_source(id, "c").await.unwrap();
        assert!(matches!(
            registry.remove_source(id, "c").await,
            Err(EngineError::SourceNotFound { .. })
        ));

        let t = AlertThreshold::new("hot", "Hot", AlertCondition::Above, 0.7, Severity::Critical);
        registry.add_threshold(id, t).await.unwrap();
        registry
            .update_threshold(
                id,
                "hot",
                ThresholdPatch {
                    value: Some(0.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(registry.thresholds(id).await.unwrap()[0].value, 0.5);

        registry.remove_threshold(id, "hot").await.unwrap();
        assert!(matches!(
            registry.remove_threshold(id, "hot").await,
            Err(EngineError::ThresholdNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_id_fails_with_not_found() {
        let registry = make_registry();
        let ghost = DisplayId::new(42, 0);

        assert_eq!(registry.get(ghost).await.unwrap_err(), EngineError::NotFound(ghost));
        assert!(matches!(
            registry.update(ghost, DisplayConfigPatch::default()).await,
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(registry.refresh_now(ghost).await, Err(EngineError::NotFound(_))));
        assert!(!registry.delete(ghost).await);
    }

    #[tokio::test]
    async fn test_mutations_bump_modified_at() {
        let registry = make_registry();
        let view = registry.create(make_config(), AlertConfig::default()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.set_visible(view.id, false).await.unwrap();

        let after = registry.get(view.id).await.unwrap();
        assert!(!after.is_visible);
        assert!(after.modified_at > view.modified_at);
        assert_eq!(after.created_at, view.created_at);
    }

    #[tokio::test]
    async fn test_set_active_toggles_schedule() {
        let registry = make_registry();
        let id = registry.create(make_config(), AlertConfig::default()).await.unwrap().id;
        assert!(registry.is_scheduled(id));

        registry.set_active(id, false).await.unwrap();
        assert!(!registry.is_scheduled(id));
        assert!(!registry.get(id).await.unwrap().is_active);

        registry.set_active(id, true).await.unwrap();
        assert!(registry.is_scheduled(id));
    }

    #[tokio::test]
    async fn test_predict_and_patterns() {
        let registry = make_registry();
        let id = registry.create(make_config(), AlertConfig::default()).await.unwrap().id;
        registry.refresh_now(id).await.unwrap();

        let predictions = registry
            .predict(id, &[Duration::from_secs(3600), Duration::from_secs(86_400)])
            .await
            .unwrap();
        assert_eq!(predictions.len(), 2);
        assert!(predictions.iter().all(|p| (-1.0..=1.0).contains(&p.predicted_score)));

        let report = registry.analyze_patterns(id).await.unwrap();
        assert!(report.patterns.is_empty());
    }
}
