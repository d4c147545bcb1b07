//! Ordinary least-squares line fit

use chrono::{DateTime, Duration, Utc};

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Fitted line `y = slope·x + intercept` and Pearson correlation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson r; 0 when undefined (constant x or y)
    pub correlation: f64,
}

impl LinearFit {
    pub const FLAT: LinearFit = LinearFit {
        slope: 0.0,
        intercept: 0.0,
        correlation: 0.0,
    };

    /// Fit a line through `(x, y)` points
    ///
    /// Fewer than 2 points, or all x equal, yields a flat fit through the mean.
    pub fn fit(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        if n < 2 {
            let intercept = points.first().map(|p| p.1).unwrap_or(0.0);
            return LinearFit {
                intercept,
                ..Self::FLAT
            };
        }

        let nf = n as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;

        let mut sxx = 0.0;
        let mut syy = 0.0;
        let mut sxy = 0.0;
        for &(x, y) in points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        if sxx == 0.0 {
            return LinearFit {
                intercept: mean_y,
                ..Self::FLAT
            };
        }

        let slope = sxy / sxx;
        let correlation = sxy / (sxx * syy).sqrt();

        LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
            correlation: if correlation.is_finite() { correlation } else { 0.0 },
        }
    }
}

/// Points for regressing score against time, x in hours since the first point
pub fn time_series_points(series: &[(DateTime<Utc>, f64)]) -> Vec<(f64, f64)> {
    let Some(&(origin, _)) = series.first() else {
        return Vec::new();
    };
    series
        .iter()
        .map(|&(ts, score)| {
            (elapsed_hours(ts - origin), score)
        })
        .collect()
}

/// Sub-millisecond gaps must survive, refreshes can land microseconds apart
fn elapsed_hours(elapsed: Duration) -> f64 {
    match elapsed.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_HOUR,
        None => elapsed.num_milliseconds() as f64 / MILLIS_PER_HOUR,
    }
}
