//! Data source descriptors and normalized readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of upstream provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    NewsFeed,
    SocialMedia,
    TechnicalIndicator,
    FundamentalData,
    MacroEconomic,
    MarketData,
    Custom,
}

/// Fixed taxonomy used for the per-category breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    News,
    Social,
    Technical,
    Fundamental,
    Macro,
    Market,
}

impl SourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::News => "news",
            SourceCategory::Social => "social",
            SourceCategory::Technical => "technical",
            SourceCategory::Fundamental => "fundamental",
            SourceCategory::Macro => "macro",
            SourceCategory::Market => "market",
        }
    }

    pub fn all() -> [SourceCategory; 6] {
        [
            SourceCategory::News,
            SourceCategory::Social,
            SourceCategory::Technical,
            SourceCategory::Fundamental,
            SourceCategory::Macro,
            SourceCategory::Market,
        ]
    }
}

impl SourceType {
    /// Category bucket for drill-down. Custom sources count as market data.
    pub fn category(&self) -> SourceCategory {
        match self {
            SourceType::NewsFeed => SourceCategory::News,
            SourceType::SocialMedia => SourceCategory::Social,
            SourceType::TechnicalIndicator => SourceCategory::Technical,
            SourceType::FundamentalData => SourceCategory::Fundamental,
            SourceType::MacroEconomic => SourceCategory::Macro,
            SourceType::MarketData | SourceType::Custom => SourceCategory::Market,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    #[default]
    Connected,
    Disconnected,
    Error,
}

/// One configured data source on a display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Author-specified weight, used by `custom` weighting
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Historical reliability in [0, 1], used by `reliability` weighting
    #[serde(default = "default_reliability")]
    pub reliability: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub status: SourceStatus,
    /// Opaque provider parameters, passed through to the fetcher untouched
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default)]
    pub last_fetch: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_reliability() -> f64 {
    0.8
}

fn default_enabled() -> bool {
    true
}

impl DataSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_type,
            weight: default_weight(),
            reliability: default_reliability(),
            enabled: true,
            status: SourceStatus::Connected,
            parameters: serde_json::Value::Null,
            last_fetch: None,
            last_error: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability;
        self
    }

    /// Whether the connector should attempt a fetch at all
    pub fn is_fetchable(&self) -> bool {
        self.enabled && self.status != SourceStatus::Disconnected
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("source id cannot be empty".to_string());
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(format!("source {} weight must be >= 0, got {}", self.id, self.weight));
        }
        if !(0.0..=1.0).contains(&self.reliability) {
            return Err(format!(
                "source {} reliability must be in [0, 1], got {}",
                self.id, self.reliability
            ));
        }
        Ok(())
    }
}

/// Partial update for a data source; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePatch {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub reliability: Option<f64>,
    pub enabled: Option<bool>,
    pub status: Option<SourceStatus>,
    pub parameters: Option<serde_json::Value>,
}

impl SourcePatch {
    pub fn apply(&self, source: &mut DataSource) {
        if let Some(name) = &self.name {
            source.name = name.clone();
        }
        if let Some(weight) = self.weight {
            source.weight = weight;
        }
        if let Some(reliability) = self.reliability {
            source.reliability = reliability;
        }
        if let Some(enabled) = self.enabled {
            source.enabled = enabled;
        }
        if let Some(status) = self.status {
            source.status = status;
        }
        if let Some(parameters) = &self.parameters {
            source.parameters = parameters.clone();
        }
    }
}

/// What a fetcher returns before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub value: f64,
    pub confidence: f64,
    /// When the provider observed the value; `None` means "now"
    pub observed_at: Option<DateTime<Utc>>,
}

impl RawReading {
    pub fn new(value: f64, confidence: f64) -> Self {
        Self {
            value,
            confidence,
            observed_at: None,
        }
    }

    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = Some(at);
        self
    }
}

/// One normalized pull result from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReading {
    pub source_id: String,
    pub source_type: SourceType,
    /// Clamped to [-1, 1]
    pub value: f64,
    /// Clamped to [0, 1]
    pub confidence: f64,
    pub weight: f64,
    pub reliability: f64,
    /// Age of the observation at fetch time
    pub freshness: Duration,
    pub errors: Vec<String>,
    pub is_active: bool,
    pub timestamp: DateTime<Utc>,
}

impl SourceReading {
    /// Error reading: zeroed and inactive, never aggregated
    pub fn failed(source: &DataSource, error: String, now: DateTime<Utc>) -> Self {
        Self {
            source_id: source.id.clone(),
            source_type: source.source_type,
            value: 0.0,
            confidence: 0.0,
            weight: 0.0,
            reliability: source.reliability,
            freshness: Duration::ZERO,
            errors: vec![error],
            is_active: false,
            timestamp: now,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.is_active && self.errors.is_empty()
    }
}
