//! Aggregator Core - combines source readings into a composite score
//!
//! # Architecture
//!
//! ```text
//! Vec<SourceReading> (one refresh)
//!     ↓
//! WeightingStrategy (equal / confidence / reliability / recency / custom)
//!     ↓
//! Aggregator (weighted_average / simple_average / median / mode)
//!     ↓
//! CompositeScore (score, confidence, per-source + per-category breakdown)
//!     +
//! QualityMetrics (completeness, agreement, freshness)
//! ```

pub mod composite;
pub mod quality;
pub mod weighting;

pub use composite::{AggregationMethod, Aggregator, CategoryBreakdown, CompositeScore, SourceContribution};
pub use quality::QualityMetrics;
pub use weighting::WeightingStrategy;
