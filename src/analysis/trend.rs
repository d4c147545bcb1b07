//! Trend Analyzer - direction, momentum and volatility from recent history

use super::regression::{time_series_points, LinearFit};
use crate::aggregator_core::quality::std_dev;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Slope (score units per hour) beyond which a trend counts as directional
pub const DIRECTION_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Sideways,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > DIRECTION_THRESHOLD {
            TrendDirection::Up
        } else if slope < -DIRECTION_THRESHOLD {
            TrendDirection::Down
        } else {
            TrendDirection::Sideways
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// |r| of the regression
    pub strength: f64,
    pub confidence: f64,
    /// Score units per hour
    pub slope: f64,
    /// Percentage change vs. 1 / 6 / 24 points back
    pub change_short: f64,
    pub change_medium: f64,
    pub change_long: f64,
    pub momentum: f64,
    pub acceleration: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    window: usize,
}

impl TrendAnalyzer {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }

    /// Analyze the newest `window` points of a time-ordered series
    ///
    /// With fewer than 2 points the prior trend is returned unchanged.
    pub fn analyze(&self, series: &[(DateTime<Utc>, f64)], prior: &TrendAnalysis) -> TrendAnalysis {
        let start = series.len().saturating_sub(self.window);
        let window = &series[start..];
        if window.len() < 2 {
            return *prior;
        }

        let fit = LinearFit::fit(&time_series_points(window));
        let values: Vec<f64> = window.iter().map(|&(_, v)| v).collect();
        let strength = fit.correlation.abs();

        TrendAnalysis {
            direction: TrendDirection::from_slope(fit.slope),
            strength,
            confidence: strength,
            slope: fit.slope,
            change_short: pct_change(&values, 1),
            change_medium: pct_change(&values, 6),
            change_long: pct_change(&values, 24),
            momentum: momentum(&values),
            acceleration: acceleration(&values),
            volatility: std_dev(&values),
        }
    }
}

fn pct_change(values: &[f64], lookback: usize) -> f64 {
    let Some(&last) = values.last() else {
        return 0.0;
    };
    let base_idx = values.len().saturating_sub(1 + lookback);
    let base = values[base_idx];
    if base == 0.0 {
        return 0.0;
    }
    (last - base) / base.abs() * 100.0
}

/// Difference between the endpoints of the last three values
fn momentum(values: &[f64]) -> f64 {
    let n = values.len();
    match n {
        0 | 1 => 0.0,
        2 => values[1] - values[0],
        _ => values[n - 1] - values[n - 3],
    }
}

/// Second difference of the last three values
fn acceleration(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    (values[n - 1] - values[n - 2]) - (values[n - 2] - values[n - 3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(values: &[f64], step_minutes: i64) -> Vec<(DateTime<Utc>, f64)> {
        let t0 = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (t0 + Duration::minutes(step_minutes * i as i64), v))
            .collect()
    }

    #[test]
    fn test_rising_history_is_up() {
        let analyzer = TrendAnalyzer::new(24);
        let trend = analyzer.analyze(&series(&[0.1, 0.2, 0.3, 0.4], 60), &TrendAnalysis::default());

        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(trend.slope > 0.0);
        assert!((trend.strength - 1.0).abs() < 1e-9);
        assert!((trend.momentum - 0.2).abs() < 1e-12);
        assert!(trend.acceleration.abs() < 1e-12);
    }

    #[test]
    fn test_falling_history_is_down() {
        let analyzer = TrendAnalyzer::new(24);
        let trend = analyzer.analyze(&series(&[0.5, 0.3, 0.0, -0.4], 60), &TrendAnalysis::default());
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!(trend.acceleration < 0.0);
    }

    #[test]
    fn test_flat_history_is_sideways_with_zero_strength() {
        let analyzer = TrendAnalyzer::new(24);
        let trend = analyzer.analyze(&series(&[0.2, 0.2, 0.2], 60), &TrendAnalysis::default());
        assert_eq!(trend.direction, TrendDirection::Sideways);
        assert_eq!(trend.strength, 0.0);
        assert_eq!(trend.volatility, 0.0);
    }

    #[test]
    fn test_single_point_keeps_prior() {
        let prior = TrendAnalysis {
            direction: TrendDirection::Down,
            strength: 0.8,
            ..Default::default()
        };
        let analyzer = TrendAnalyzer::new(24);
        assert_eq!(analyzer.analyze(&series(&[0.9], 60), &prior), prior);
        assert_eq!(analyzer.analyze(&[], &prior), prior);
    }

    #[test]
    fn test_window_limits_points() {
        // Old decline is outside a 3-point window; only the rise is seen
        let analyzer = TrendAnalyzer::new(3);
        let trend = analyzer.analyze(
            &series(&[0.9, 0.5, 0.1, 0.2, 0.3], 60),
            &TrendAnalysis::default(),
        );
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_percentage_changes() {
        let values = [0.1, 0.2, 0.2, 0.2, 0.2, 0.2, 0.4];
        assert!((pct_change(&values, 1) - 100.0).abs() < 1e-9);
        assert!((pct_change(&values, 6) - 300.0).abs() < 1e-9);
        // Lookback past the start clamps to the first point
        assert!((pct_change(&values, 24) - 300.0).abs() < 1e-9);
        assert_eq!(pct_change(&[0.0, 0.5], 1), 0.0);
    }
}
