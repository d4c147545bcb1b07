//! Weighting strategies applied to readings before aggregation

use crate::sources::SourceReading;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingStrategy {
    /// Weight 1 for every reading
    #[default]
    Equal,
    /// Reading confidence
    Confidence,
    /// Source reliability
    Reliability,
    /// Linear decay to zero over the freshness horizon
    Recency,
    /// Author-specified per-source weight
    Custom,
}

impl WeightingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightingStrategy::Equal => "equal",
            WeightingStrategy::Confidence => "confidence",
            WeightingStrategy::Reliability => "reliability",
            WeightingStrategy::Recency => "recency",
            WeightingStrategy::Custom => "custom",
        }
    }

    /// Weight for one reading, never negative
    pub fn weight_of(&self, reading: &SourceReading, horizon: Duration) -> f64 {
        let w = match self {
            WeightingStrategy::Equal => 1.0,
            WeightingStrategy::Confidence => reading.confidence,
            WeightingStrategy::Reliability => reading.reliability,
            WeightingStrategy::Recency => recency_weight(reading.freshness, horizon),
            WeightingStrategy::Custom => reading.weight,
        };
        if w.is_finite() {
            w.max(0.0)
        } else {
            0.0
        }
    }
}

/// `1 - age/horizon`, floored at zero. A zero horizon counts everything as stale.
pub fn recency_weight(age: Duration, horizon: Duration) -> f64 {
    if horizon.is_zero() {
        return 0.0;
    }
    (1.0 - age.as_secs_f64() / horizon.as_secs_f64()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceType;
    use chrono::Utc;

    fn reading(confidence: f64, reliability: f64, weight: f64, age_secs: u64) -> SourceReading {
        SourceReading {
            source_id: "s".to_string(),
            source_type: SourceType::NewsFeed,
            value: 0.5,
            confidence,
            weight,
            reliability,
            freshness: Duration::from_secs(age_secs),
            errors: Vec::new(),
            is_active: true,
            timestamp: Utc::now(),
        }
    }

    const DAY: Duration = Duration::from_secs(86_400);

    #[test]
    fn test_each_strategy_picks_its_field() {
        let r = reading(0.9, 0.7, 3.0, 0);

        assert_eq!(WeightingStrategy::Equal.weight_of(&r, DAY), 1.0);
        assert_eq!(WeightingStrategy::Confidence.weight_of(&r, DAY), 0.9);
        assert_eq!(WeightingStrategy::Reliability.weight_of(&r, DAY), 0.7);
        assert_eq!(WeightingStrategy::Custom.weight_of(&r, DAY), 3.0);
        assert_eq!(WeightingStrategy::Recency.weight_of(&r, DAY), 1.0);
    }

    #[test]
    fn test_recency_linear_decay() {
        assert_eq!(recency_weight(Duration::from_secs(43_200), DAY), 0.5);
        assert_eq!(recency_weight(DAY, DAY), 0.0);
        assert_eq!(recency_weight(DAY * 2, DAY), 0.0);
        assert_eq!(recency_weight(Duration::ZERO, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_negative_custom_weight_floored() {
        let r = reading(0.5, 0.5, -2.0, 0);
        assert_eq!(WeightingStrategy::Custom.weight_of(&r, DAY), 0.0);
    }

    #[test]
    fn test_strategy_serde_names() {
        let s: WeightingStrategy = serde_json::from_str("\"recency\"").unwrap();
        assert_eq!(s, WeightingStrategy::Recency);
        assert_eq!(serde_json::to_string(&WeightingStrategy::Custom).unwrap(), "\"custom\"");
    }
}
