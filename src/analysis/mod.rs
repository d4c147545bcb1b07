//! History analysis: trend, prediction, patterns
//!
//! All three share the same least-squares fit (`regression`), with time on the
//! x-axis measured in hours.

pub mod patterns;
pub mod predictor;
pub mod regression;
pub mod trend;

pub use patterns::{DetectedPattern, PatternAnalyzer, PatternKind, PatternReport};
pub use predictor::{LinearPredictor, Prediction, ScorePredictor};
pub use regression::LinearFit;
pub use trend::{TrendAnalysis, TrendAnalyzer, TrendDirection};
