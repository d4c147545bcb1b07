//! Composite score computation
//!
//! Combines the healthy readings of one refresh into a single score in
//! [-1, 1], plus a per-source and per-category breakdown for drill-down.

use super::weighting::WeightingStrategy;
use crate::error::{EngineError, Result};
use crate::sources::{SourceCategory, SourceReading, SourceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Σ(value·weight) / Σ(weight)
    #[default]
    WeightedAverage,
    /// Arithmetic mean, weights ignored
    SimpleAverage,
    Median,
    /// Most frequent one-decimal bucket, ties go to the first seen
    Mode,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::WeightedAverage => "weighted_average",
            AggregationMethod::SimpleAverage => "simple_average",
            AggregationMethod::Median => "median",
            AggregationMethod::Mode => "mode",
        }
    }
}

/// How one source fed into the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContribution {
    pub source_id: String,
    pub source_type: SourceType,
    pub value: f64,
    pub confidence: f64,
    /// Weight after applying the strategy
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: SourceCategory,
    pub score: f64,
    pub confidence: f64,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub confidence: f64,
    pub contributions: Vec<SourceContribution>,
    pub categories: Vec<CategoryBreakdown>,
}

/// Aggregator configured for one display
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    method: AggregationMethod,
    strategy: WeightingStrategy,
    recency_horizon: Duration,
}

impl Aggregator {
    pub fn new(
        method: AggregationMethod,
        strategy: WeightingStrategy,
        recency_horizon: Duration,
    ) -> Self {
        Self {
            method,
            strategy,
            recency_horizon,
        }
    }

    /// Aggregate one refresh worth of readings
    ///
    /// Unhealthy readings are ignored.
    ///
    /// # Returns
    /// * `Ok(CompositeScore)` - score clamped to [-1, 1]
    /// * `Err(EngineError::NoValidSources)` - nothing healthy to combine
    pub fn aggregate(&self, readings: &[SourceReading]) -> Result<CompositeScore> {
        let healthy: Vec<&SourceReading> = readings.iter().filter(|r| r.is_healthy()).collect();
        if healthy.is_empty() {
            return Err(EngineError::NoValidSources);
        }

        let contributions: Vec<SourceContribution> = healthy
            .iter()
            .map(|r| SourceContribution {
                source_id: r.source_id.clone(),
                source_type: r.source_type,
                value: r.value,
                confidence: r.confidence,
                weight: self.strategy.weight_of(r, self.recency_horizon),
            })
            .collect();

        let values: Vec<f64> = contributions.iter().map(|c| c.value).collect();
        let raw = match self.method {
            AggregationMethod::WeightedAverage => weighted_average(&contributions),
            AggregationMethod::SimpleAverage => mean(&values),
            AggregationMethod::Median => median(&values),
            AggregationMethod::Mode => mode(&values),
        };

        let confidence = mean(&contributions.iter().map(|c| c.confidence).collect::<Vec<_>>());

        Ok(CompositeScore {
            score: clamp_score(raw),
            confidence: confidence.clamp(0.0, 1.0),
            categories: category_breakdown(&contributions),
            contributions,
        })
    }
}

pub(crate) fn clamp_score(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Falls back to the plain mean when every weight is zero
fn weighted_average(contributions: &[SourceContribution]) -> f64 {
    let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        let values: Vec<f64> = contributions.iter().map(|c| c.value).collect();
        return mean(&values);
    }
    contributions.iter().map(|c| c.value * c.weight).sum::<f64>() / total_weight
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mode(values: &[f64]) -> f64 {
    // (bucket, count) in first-seen order
    let mut buckets: Vec<(i64, usize)> = Vec::new();
    for v in values {
        let bucket = (v * 10.0).round() as i64;
        match buckets.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, count)) => *count += 1,
            None => buckets.push((bucket, 1)),
        }
    }

    let mut best: Option<(i64, usize)> = None;
    for &(bucket, count) in &buckets {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((bucket, count));
        }
    }
    best.map(|(bucket, _)| bucket as f64 / 10.0).unwrap_or(0.0)
}

fn category_breakdown(contributions: &[SourceContribution]) -> Vec<CategoryBreakdown> {
    let mut groups: BTreeMap<SourceCategory, (f64, f64, usize)> = BTreeMap::new();
    for c in contributions {
        let entry = groups.entry(c.source_type.category()).or_insert((0.0, 0.0, 0));
        entry.0 += c.value;
        entry.1 += c.confidence;
        entry.2 += 1;
    }

    groups
        .into_iter()
        .map(|(category, (sum_v, sum_c, n))| CategoryBreakdown {
            category,
            score: clamp_score(sum_v / n as f64),
            confidence: sum_c / n as f64,
            data_points: n,
        })
        .collect()
}
