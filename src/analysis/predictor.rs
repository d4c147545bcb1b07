//! Predictor - projects the composite score forward
//!
//! `ScorePredictor` is the seam: the registry only sees the trait, so a
//! richer model can replace `LinearPredictor` without touching callers.

use super::regression::{time_series_points, LinearFit};
use crate::pipeline::types::{ScoreSnapshot, SentimentLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed confidence of the linear baseline
pub const BASELINE_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub horizon: Duration,
    pub predicted_score: f64,
    pub predicted_label: SentimentLabel,
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
    pub target_time: DateTime<Utc>,
    pub model: String,
}

pub trait ScorePredictor: Send + Sync {
    /// One independent prediction per horizon
    fn predict(&self, history: &[ScoreSnapshot], horizons: &[Duration]) -> Vec<Prediction>;
}

/// Linear extrapolation of the recent regression slope
pub struct LinearPredictor {
    window: usize,
}

impl LinearPredictor {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }
}

impl ScorePredictor for LinearPredictor {
    fn predict(&self, history: &[ScoreSnapshot], horizons: &[Duration]) -> Vec<Prediction> {
        let start = history.len().saturating_sub(self.window);
        let series: Vec<(DateTime<Utc>, f64)> = history[start..]
            .iter()
            .map(|s| (s.timestamp, s.score))
            .collect();

        let slope = LinearFit::fit(&time_series_points(&series)).slope;
        let last_score = series.last().map(|&(_, v)| v).unwrap_or(0.0);
        let now = Utc::now();

        horizons
            .iter()
            .map(|&horizon| {
                let hours = horizon.as_secs_f64() / 3600.0;
                let predicted_score = (last_score + slope * hours).clamp(-1.0, 1.0);
                let target_time = chrono::Duration::from_std(horizon)
                    .ok()
                    .and_then(|d| now.checked_add_signed(d))
                    .unwrap_or(now);

                Prediction {
                    horizon,
                    predicted_score,
                    predicted_label: SentimentLabel::from_score(predicted_score),
                    confidence: BASELINE_CONFIDENCE,
                    generated_at: now,
                    target_time,
                    model: "linear".to_string(),
                }
            })
            .collect()
    }
}
