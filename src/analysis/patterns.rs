//! Pattern analysis over a display's score history
//!
//! Pattern kinds:
//! - **BREAKOUT**: latest score above every preceding point
//! - **BREAKDOWN**: latest score below every preceding point
//! - **TREND_REVERSAL**: first and second half slopes point opposite ways
//! - **CONSOLIDATION**: at least 5 points with volatility under 0.05
//! - **SPIKE**: latest score more than 2σ from the preceding mean

use super::regression::{time_series_points, LinearFit};
use super::trend::DIRECTION_THRESHOLD;
use crate::aggregator_core::composite::mean;
use crate::aggregator_core::quality::std_dev;
use crate::pipeline::types::ScoreSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MIN_POINTS: usize = 3;
const CONSOLIDATION_MIN_POINTS: usize = 5;
const CONSOLIDATION_VOLATILITY: f64 = 0.05;
const SPIKE_SIGMAS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    Breakout,
    Breakdown,
    TrendReversal,
    Consolidation,
    Spike,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub kind: PatternKind,
    /// Relative strength in [0, 1]
    pub strength: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternReport {
    pub points: usize,
    /// Lowest score in the analyzed history
    pub support: f64,
    /// Highest score in the analyzed history
    pub resistance: f64,
    pub mean: f64,
    pub volatility: f64,
    pub patterns: Vec<DetectedPattern>,
}

pub struct PatternAnalyzer;

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, history: &[ScoreSnapshot]) -> PatternReport {
        if history.len() < MIN_POINTS {
            return PatternReport {
                points: history.len(),
                ..Default::default()
            };
        }

        let values: Vec<f64> = history.iter().map(|s| s.score).collect();
        let n = values.len();
        let first_ts = history[0].timestamp;
        let last = history[n - 1].clone();
        let prior = &values[..n - 1];

        let support = values.iter().copied().fold(f64::INFINITY, f64::min);
        let resistance = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let volatility = std_dev(&values);

        let mut patterns = Vec::new();

        let prior_max = prior.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let prior_min = prior.iter().copied().fold(f64::INFINITY, f64::min);
        let range = (prior_max - prior_min).max(f64::EPSILON);

        if last.score > prior_max {
            patterns.push(DetectedPattern {
                kind: PatternKind::Breakout,
                strength: ((last.score - prior_max) / range).min(1.0),
                start: first_ts,
                end: last.timestamp,
                description: format!("score {:.3} broke above {:.3}", last.score, prior_max),
            });
        } else if last.score < prior_min {
            patterns.push(DetectedPattern {
                kind: PatternKind::Breakdown,
                strength: ((prior_min - last.score) / range).min(1.0),
                start: first_ts,
                end: last.timestamp,
                description: format!("score {:.3} broke below {:.3}", last.score, prior_min),
            });
        }

        if let Some(p) = detect_reversal(history) {
            patterns.push(p);
        }

        if n >= CONSOLIDATION_MIN_POINTS && volatility < CONSOLIDATION_VOLATILITY {
            patterns.push(DetectedPattern {
                kind: PatternKind::Consolidation,
                strength: 1.0 - volatility / CONSOLIDATION_VOLATILITY,
                start: first_ts,
                end: last.timestamp,
                description: format!("range-bound between {:.3} and {:.3}", support, resistance),
            });
        }

        let prior_mean = mean(prior);
        let prior_sd = std_dev(prior);
        if prior_sd > 0.0 {
            let sigmas = (last.score - prior_mean).abs() / prior_sd;
            if sigmas > SPIKE_SIGMAS {
                patterns.push(DetectedPattern {
                    kind: PatternKind::Spike,
                    strength: (sigmas / (SPIKE_SIGMAS * 2.0)).min(1.0),
                    start: last.timestamp,
                    end: last.timestamp,
                    description: format!("{:.1}σ move from mean {:.3}", sigmas, prior_mean),
                });
            }
        }

        PatternReport {
            points: n,
            support,
            resistance,
            mean: mean(&values),
            volatility,
            patterns,
        }
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_reversal(history: &[ScoreSnapshot]) -> Option<DetectedPattern> {
    let n = history.len();
    if n < 4 {
        return None;
    }
    let mid = n / 2;
    let slope_of = |part: &[ScoreSnapshot]| {
        let series: Vec<(DateTime<Utc>, f64)> = part.iter().map(|s| (s.timestamp, s.score)).collect();
        LinearFit::fit(&time_series_points(&series)).slope
    };

    // Halves share the midpoint so the turn itself is counted in both
    let first = slope_of(&history[..=mid]);
    let second = slope_of(&history[mid..]);

    let opposite = (first > DIRECTION_THRESHOLD && second < -DIRECTION_THRESHOLD)
        || (first < -DIRECTION_THRESHOLD && second > DIRECTION_THRESHOLD);
    if !opposite {
        return None;
    }

    let turn = if first > 0.0 { "peak" } else { "trough" };
    Some(DetectedPattern {
        kind: PatternKind::TrendReversal,
        strength: (first.abs().min(second.abs()) / first.abs().max(second.abs())).min(1.0),
        start: history[0].timestamp,
        end: history[n - 1].timestamp,
        description: format!("{} at {}", turn, history[mid].timestamp.to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn history(values: &[f64]) -> Vec<ScoreSnapshot> {
        let t0 = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut s = ScoreSnapshot::neutral(t0 + Duration::hours(i as i64));
                s.score = v;
                s
            })
            .collect()
    }

    fn kinds(report: &PatternReport) -> Vec<PatternKind> {
        report.patterns.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_too_short_is_empty() {
        let report = PatternAnalyzer::new().analyze(&history(&[0.1, 0.2]));
        assert_eq!(report.points, 2);
        assert!(report.patterns.is_empty());
    }

    #[test]
    fn test_breakout_and_levels() {
        let report = PatternAnalyzer::new().analyze(&history(&[0.1, 0.3, 0.2, 0.25, 0.6]));
        assert!(kinds(&report).contains(&PatternKind::Breakout));
        assert_eq!(report.support, 0.1);
        assert_eq!(report.resistance, 0.6);
    }

    #[test]
    fn test_breakdown() {
        let report = PatternAnalyzer::new().analyze(&history(&[0.1, 0.0, 0.05, -0.5]));
        assert!(kinds(&report).contains(&PatternKind::Breakdown));
    }

    #[test]
    fn test_reversal_peak() {
        let report = PatternAnalyzer::new().analyze(&history(&[0.0, 0.2, 0.4, 0.6, 0.4, 0.2, 0.0]));
        let reversal = report
            .patterns
            .iter()
            .find(|p| p.kind == PatternKind::TrendReversal)
            .unwrap();
        assert!(reversal.description.starts_with("peak"));
    }

    #[test]
    fn test_consolidation() {
        let report = PatternAnalyzer::new().analyze(&history(&[0.30, 0.31, 0.30, 0.29, 0.30]));
        assert!(kinds(&report).contains(&PatternKind::Consolidation));
    }

    #[test]
    fn test_spike() {
        let report = PatternAnalyzer::new().analyze(&history(&[0.10, 0.12, 0.09, 0.11, 0.10, 0.9]));
        assert!(kinds(&report).contains(&PatternKind::Spike));
        assert!(kinds(&report).contains(&PatternKind::Breakout));
    }
}
