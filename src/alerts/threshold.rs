//! Alert threshold rules and delivery / escalation policy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance for `equals`
pub const EQUALS_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    Above,
    Below,
    Equals,
    /// previous ≤ value < current
    CrossesAbove,
    /// previous ≥ value > current
    CrossesBelow,
    /// |current − previous| > value
    ChangeExceeds,
}

impl AlertCondition {
    /// Evaluate against the new score and the previous snapshot's score
    ///
    /// Conditions that need a previous value never hold without one.
    pub fn is_met(&self, threshold: f64, current: f64, previous: Option<f64>) -> bool {
        match self {
            AlertCondition::Above => current > threshold,
            AlertCondition::Below => current < threshold,
            AlertCondition::Equals => (current - threshold).abs() <= EQUALS_EPSILON,
            AlertCondition::CrossesAbove => {
                previous.map_or(false, |prev| prev <= threshold && current > threshold)
            }
            AlertCondition::CrossesBelow => {
                previous.map_or(false, |prev| prev >= threshold && current < threshold)
            }
            AlertCondition::ChangeExceeds => {
                previous.map_or(false, |prev| (current - prev).abs() > threshold)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Critical,
    Emergency,
}

impl Severity {
    /// One level up, saturating at `Emergency`
    pub fn escalated(&self) -> Severity {
        match self {
            Severity::Info => Severity::Warning,
            Severity::Warning => Severity::Critical,
            Severity::Critical | Severity::Emergency => Severity::Emergency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertThreshold {
    pub id: String,
    pub name: String,
    pub condition: AlertCondition,
    pub value: f64,
    /// Condition must hold this long before firing (0 = immediately)
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub trigger_count: u64,
    #[serde(default)]
    pub last_triggered: Option<DateTime<Utc>>,
    /// First refresh of the current uninterrupted breach
    #[serde(skip)]
    pub(crate) breach_started: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl AlertThreshold {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: AlertCondition,
        value: f64,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition,
            value,
            duration_ms: 0,
            severity,
            enabled: true,
            trigger_count: 0,
            last_triggered: None,
            breach_started: None,
        }
    }

    pub fn sustained_for(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("threshold id cannot be empty".to_string());
        }
        if !self.value.is_finite() {
            return Err(format!("threshold {} value must be finite", self.id));
        }
        if self.condition == AlertCondition::ChangeExceeds && self.value < 0.0 {
            return Err(format!("threshold {} change_exceeds value must be >= 0", self.id));
        }
        Ok(())
    }
}

/// Partial update for a threshold; counters are not patchable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPatch {
    pub name: Option<String>,
    pub condition: Option<AlertCondition>,
    pub value: Option<f64>,
    pub duration_ms: Option<u64>,
    pub severity: Option<Severity>,
    pub enabled: Option<bool>,
}

impl ThresholdPatch {
    pub fn apply(&self, threshold: &mut AlertThreshold) {
        if let Some(name) = &self.name {
            threshold.name = name.clone();
        }
        if let Some(condition) = self.condition {
            threshold.condition = condition;
            threshold.breach_started = None;
        }
        if let Some(value) = self.value {
            threshold.value = value;
            threshold.breach_started = None;
        }
        if let Some(duration_ms) = self.duration_ms {
            threshold.duration_ms = duration_ms;
        }
        if let Some(severity) = self.severity {
            threshold.severity = severity;
        }
        if let Some(enabled) = self.enabled {
            threshold.enabled = enabled;
            if !enabled {
                threshold.breach_started = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryChannel {
    InApp,
    Email { to: String },
    Webhook { url: String },
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationPolicy {
    /// Minimum gap between two firings of the same threshold (0 = none)
    #[serde(default)]
    pub cooldown_ms: u64,
    /// Raise severity one level once a threshold has fired this many times
    #[serde(default)]
    pub escalate_after: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub thresholds: Vec<AlertThreshold>,
    #[serde(default = "default_delivery")]
    pub delivery: Vec<DeliveryChannel>,
    #[serde(default)]
    pub escalation: EscalationPolicy,
}

fn default_delivery() -> Vec<DeliveryChannel> {
    vec![DeliveryChannel::InApp]
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: Vec::new(),
            delivery: default_delivery(),
            escalation: EscalationPolicy::default(),
        }
    }
}

impl AlertConfig {
    pub fn with_threshold(mut self, threshold: AlertThreshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for t in &self.thresholds {
            t.validate()?;
            if !seen.insert(t.id.as_str()) {
                return Err(format!("duplicate threshold id: {}", t.id));
            }
        }
        for channel in &self.delivery {
            if let DeliveryChannel::Webhook { url } = channel {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err("webhook url must start with http:// or https://".to_string());
                }
            }
        }
        Ok(())
    }

    pub fn threshold(&self, id: &str) -> Option<&AlertThreshold> {
        self.thresholds.iter().find(|t| t.id == id)
    }

    pub fn threshold_mut(&mut self, id: &str) -> Option<&mut AlertThreshold> {
        self.thresholds.iter_mut().find(|t| t.id == id)
    }
}
