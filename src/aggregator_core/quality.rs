//! Data quality scoring for one refresh

use super::composite::mean;
use super::weighting::recency_weight;
use crate::sources::SourceReading;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quality of the inputs behind a composite score, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Healthy readings / attempted readings
    pub completeness: f64,
    /// 1 - population std-dev of healthy values
    pub agreement: f64,
    /// Mean recency weight of healthy readings
    pub freshness: f64,
    /// Mean of the three components
    pub overall: f64,
}

impl QualityMetrics {
    /// Score the readings of one refresh (healthy and errored alike)
    pub fn assess(readings: &[SourceReading], horizon: Duration) -> Self {
        if readings.is_empty() {
            return Self::default();
        }

        let healthy: Vec<&SourceReading> = readings.iter().filter(|r| r.is_healthy()).collect();
        if healthy.is_empty() {
            return Self::default();
        }

        let completeness = healthy.len() as f64 / readings.len() as f64;

        let values: Vec<f64> = healthy.iter().map(|r| r.value).collect();
        let agreement = (1.0 - std_dev(&values)).clamp(0.0, 1.0);

        let freshness: Vec<f64> = healthy
            .iter()
            .map(|r| recency_weight(r.freshness, horizon))
            .collect();
        let freshness = mean(&freshness);

        Self {
            completeness,
            agreement,
            freshness,
            overall: (completeness + agreement + freshness) / 3.0,
        }
    }
}

/// Population standard deviation, exactly 0 for constant input
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 || values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
