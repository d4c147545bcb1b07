//! Core data structures for monitored displays
//!
//! - `DisplayId` - generational handle into the registry table
//! - `DisplayConfig` / `DisplayConfigPatch` - per-display settings
//! - `ScoreSnapshot` - one computed composite score with its breakdown
//! - `DisplayView` - read-only copy of a display handed to callers

use crate::aggregator_core::{
    AggregationMethod, CategoryBreakdown, QualityMetrics, SourceContribution, WeightingStrategy,
};
use crate::alerts::AlertConfig;
use crate::analysis::TrendAnalysis;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::sources::DataSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque handle for a display
///
/// A slot freed by `delete` is reused with a bumped generation, so an id
/// held across a delete never resolves to the display that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId {
    index: u32,
    generation: u32,
}

impl DisplayId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display-{}.{}", self.index, self.generation)
    }
}

/// Human-readable bucket of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryBearish,
    Bearish,
    #[default]
    Neutral,
    Bullish,
    VeryBullish,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            SentimentLabel::VeryBullish
        } else if score >= 0.2 {
            SentimentLabel::Bullish
        } else if score > -0.2 {
            SentimentLabel::Neutral
        } else if score > -0.6 {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::VeryBearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryBearish => "very_bearish",
            SentimentLabel::Bearish => "bearish",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Bullish => "bullish",
            SentimentLabel::VeryBullish => "very_bullish",
        }
    }
}

/// One computed composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Composite in [-1, 1]
    pub score: f64,
    pub label: SentimentLabel,
    /// Mean confidence of the contributing readings
    pub confidence: f64,
    /// Per-source breakdown (healthy sources only)
    pub sources: Vec<SourceContribution>,
    /// Per-category breakdown
    pub categories: Vec<CategoryBreakdown>,
    pub trend: TrendAnalysis,
    pub quality: QualityMetrics,
    pub timestamp: DateTime<Utc>,
}

impl ScoreSnapshot {
    /// Zero score, zero confidence, sideways trend
    pub fn neutral(timestamp: DateTime<Utc>) -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            sources: Vec::new(),
            categories: Vec::new(),
            trend: TrendAnalysis::default(),
            quality: QualityMetrics::default(),
            timestamp,
        }
    }
}

fn default_name() -> String {
    "Untitled display".to_string()
}

/// Settings for one display
///
/// Deserializes from the configuration object accepted by `create`:
///
/// ```json
/// {
///   "name": "BTC sentiment",
///   "dataSources": [{"id": "news", "name": "News", "type": "news_feed"}],
///   "aggregationMethod": "weighted_average",
///   "weightingStrategy": "confidence",
///   "updateInterval": 30000
/// }
/// ```
///
/// `updateInterval` and `historyCapacity` fall back to `EngineConfig` when
/// omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(rename = "dataSources", default)]
    pub sources: Vec<DataSource>,
    #[serde(default)]
    pub aggregation_method: AggregationMethod,
    #[serde(default)]
    pub weighting_strategy: WeightingStrategy,
    /// Milliseconds between refreshes
    #[serde(rename = "updateInterval", default)]
    pub update_interval_ms: Option<u64>,
    #[serde(default)]
    pub history_capacity: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            sources: Vec::new(),
            aggregation_method: AggregationMethod::default(),
            weighting_strategy: WeightingStrategy::default(),
            update_interval_ms: None,
            history_capacity: None,
        }
    }
}

impl DisplayConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Validation(e.to_string()))
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_method(mut self, method: AggregationMethod) -> Self {
        self.aggregation_method = method;
        self
    }

    pub fn with_strategy(mut self, strategy: WeightingStrategy) -> Self {
        self.weighting_strategy = strategy;
        self
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.update_interval_ms = Some(interval_ms);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Fill unset interval / capacity from engine defaults
    pub fn resolved(mut self, engine: &EngineConfig) -> Self {
        self.update_interval_ms.get_or_insert(engine.default_interval_ms);
        self.history_capacity.get_or_insert(engine.history_capacity);
        self
    }

    pub fn interval_ms(&self) -> u64 {
        self.update_interval_ms
            .unwrap_or(EngineConfig::default().default_interval_ms)
    }

    pub fn capacity(&self) -> usize {
        self.history_capacity
            .unwrap_or(EngineConfig::default().history_capacity)
    }

    pub fn source(&self, id: &str) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Check every field; an empty source list is allowed
    pub fn validate(&self, min_interval_ms: u64) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("display name cannot be empty".to_string());
        }
        if let Some(interval) = self.update_interval_ms {
            if interval < min_interval_ms {
                return Err(format!(
                    "updateInterval must be >= {}ms, got {}ms",
                    min_interval_ms, interval
                ));
            }
        }
        if self.history_capacity == Some(0) {
            return Err("historyCapacity must be > 0".to_string());
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            source.validate()?;
            if !seen.insert(source.id.as_str()) {
                return Err(format!("duplicate source id: {}", source.id));
            }
        }
        Ok(())
    }
}

/// Partial display update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfigPatch {
    pub name: Option<String>,
    #[serde(rename = "dataSources")]
    pub sources: Option<Vec<DataSource>>,
    pub aggregation_method: Option<AggregationMethod>,
    pub weighting_strategy: Option<WeightingStrategy>,
    #[serde(rename = "updateInterval")]
    pub update_interval_ms: Option<u64>,
    pub history_capacity: Option<usize>,
}

impl DisplayConfigPatch {
    pub fn interval(interval_ms: u64) -> Self {
        Self {
            update_interval_ms: Some(interval_ms),
            ..Default::default()
        }
    }

    pub fn apply(&self, config: &mut DisplayConfig) {
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(sources) = &self.sources {
            config.sources = sources.clone();
        }
        if let Some(method) = self.aggregation_method {
            config.aggregation_method = method;
        }
        if let Some(strategy) = self.weighting_strategy {
            config.weighting_strategy = strategy;
        }
        if let Some(interval) = self.update_interval_ms {
            config.update_interval_ms = Some(interval);
        }
        if let Some(capacity) = self.history_capacity {
            config.history_capacity = Some(capacity);
        }
    }
}

/// Copy of a display's state at the time of the call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayView {
    pub id: DisplayId,
    pub config: DisplayConfig,
    pub current_state: ScoreSnapshot,
    pub alert_config: AlertConfig,
    pub is_active: bool,
    pub is_visible: bool,
    pub history_len: usize,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceType;

    #[test]
    fn test_display_id_format() {
        assert_eq!(DisplayId::new(3, 1).to_string(), "display-3.1");
    }

    #[test]
    fn test_label_buckets() {
        assert_eq!(SentimentLabel::from_score(-0.8), SentimentLabel::VeryBearish);
        assert_eq!(SentimentLabel::from_score(-0.3), SentimentLabel::Bearish);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.39), SentimentLabel::Bullish);
        assert_eq!(SentimentLabel::from_score(0.6), SentimentLabel::VeryBullish);
    }

    #[test]
    fn test_parse_configuration_object() {
        let json = r#"{
            "dataSources": [
                {"id": "news", "name": "Newswire", "type": "news_feed", "weight": 2.0},
                {"id": "rsi", "name": "RSI", "type": "technical_indicator", "parameters": {"period": 14}}
            ],
            "aggregationMethod": "median",
            "weightingStrategy": "recency",
            "updateInterval": 30000
        }"#;

        let config = DisplayConfig::from_json(json).unwrap();
        assert_eq!(config.name, "Untitled display");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].source_type, SourceType::TechnicalIndicator);
        assert_eq!(config.aggregation_method, AggregationMethod::Median);
        assert_eq!(config.weighting_strategy, WeightingStrategy::Recency);
        assert_eq!(config.update_interval_ms, Some(30_000));
        assert_eq!(config.history_capacity, None);

        let resolved = config.resolved(&EngineConfig::default());
        assert_eq!(resolved.capacity(), 1000);
        assert_eq!(resolved.interval_ms(), 30_000);
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        let err = DisplayConfig::from_json(r#"{"aggregationMethod": "geometric"}"#).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_validation() {
        let ok = DisplayConfig::new("d").with_interval_ms(1000);
        assert!(ok.validate(10).is_ok());

        assert!(DisplayConfig::new("d").with_interval_ms(5).validate(10).is_err());
        assert!(DisplayConfig::new("d").with_history_capacity(0).validate(10).is_err());

        let dup = DisplayConfig::new("d")
            .with_source(DataSource::new("a", "A", SourceType::NewsFeed))
            .with_source(DataSource::new("a", "A2", SourceType::MarketData));
        assert!(dup.validate(10).unwrap_err().contains("duplicate"));

        let negative = DisplayConfig::new("d")
            .with_source(DataSource::new("a", "A", SourceType::NewsFeed).with_weight(-1.0));
        assert!(negative.validate(10).is_err());
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut config = DisplayConfig::new("before").with_interval_ms(1000);
        DisplayConfigPatch {
            name: Some("after".into()),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.name, "after");
        assert_eq!(config.update_interval_ms, Some(1000));

        DisplayConfigPatch::interval(250).apply(&mut config);
        assert_eq!(config.update_interval_ms, Some(250));
    }
}
