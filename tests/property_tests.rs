//! Property tests for scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Bounded composite - every method/strategy stays in [-1, 1]
//! 2. Equal weighting - weighted average equals simple average
//! 3. Median order - median ignores input order
//! 4. History cap - length never exceeds capacity, timestamps strictly increase

use chrono::{Duration as ChronoDuration, Utc};
use proptest::prelude::*;
use sentiflow::aggregator_core::{AggregationMethod, Aggregator, WeightingStrategy};
use sentiflow::pipeline::{HistoryStore, ScoreSnapshot};
use sentiflow::sources::{SourceReading, SourceType};
use std::time::Duration;

const HORIZON: Duration = Duration::from_secs(86_400);

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_reading() -> impl Strategy<Value = SourceReading> {
    (
        -1.0..=1.0_f64,
        0.0..=1.0_f64,
        0.0..10.0_f64,
        0.0..=1.0_f64,
        0u64..200_000,
    )
        .prop_map(|(value, confidence, weight, reliability, age_secs)| SourceReading {
            source_id: format!("s{}", age_secs),
            source_type: SourceType::MarketData,
            value,
            confidence,
            weight,
            reliability,
            freshness: Duration::from_secs(age_secs),
            errors: Vec::new(),
            is_active: true,
            timestamp: Utc::now(),
        })
}

fn arb_method() -> impl Strategy<Value = AggregationMethod> {
    prop_oneof![
        Just(AggregationMethod::WeightedAverage),
        Just(AggregationMethod::SimpleAverage),
        Just(AggregationMethod::Median),
        Just(AggregationMethod::Mode),
    ]
}

fn arb_strategy() -> impl Strategy<Value = WeightingStrategy> {
    prop_oneof![
        Just(WeightingStrategy::Equal),
        Just(WeightingStrategy::Confidence),
        Just(WeightingStrategy::Reliability),
        Just(WeightingStrategy::Recency),
        Just(WeightingStrategy::Custom),
    ]
}

// ── 1. Bounded composite ─────────────────────────────────────────────

proptest! {
    /// Composite score and confidence stay in range for any valid input.
    #[test]
    fn composite_is_bounded(
        readings in prop::collection::vec(arb_reading(), 1..20),
        method in arb_method(),
        strategy in arb_strategy(),
    ) {
        let composite = Aggregator::new(method, strategy, HORIZON)
            .aggregate(&readings)
            .unwrap();
        prop_assert!((-1.0..=1.0).contains(&composite.score));
        prop_assert!((0.0..=1.0).contains(&composite.confidence));
        prop_assert_eq!(composite.contributions.len(), readings.len());
    }
}

// ── 2. Equal weighting ───────────────────────────────────────────────

proptest! {
    /// weighted_average with equal weights is the arithmetic mean.
    #[test]
    fn equal_weighted_average_is_simple_average(
        readings in prop::collection::vec(arb_reading(), 1..20),
    ) {
        let weighted = Aggregator::new(AggregationMethod::WeightedAverage, WeightingStrategy::Equal, HORIZON)
            .aggregate(&readings)
            .unwrap();
        let simple = Aggregator::new(AggregationMethod::SimpleAverage, WeightingStrategy::Equal, HORIZON)
            .aggregate(&readings)
            .unwrap();
        prop_assert!((weighted.score - simple.score).abs() < 1e-9);
    }
}

// ── 3. Median order ──────────────────────────────────────────────────

proptest! {
    /// Reversing or rotating the input never changes the median.
    #[test]
    fn median_is_order_invariant(
        readings in prop::collection::vec(arb_reading(), 1..20),
        rotate_by in 0usize..20,
    ) {
        let aggregator = Aggregator::new(AggregationMethod::Median, WeightingStrategy::Equal, HORIZON);
        let base = aggregator.aggregate(&readings).unwrap().score;

        let mut reversed = readings.clone();
        reversed.reverse();
        prop_assert_eq!(aggregator.aggregate(&reversed).unwrap().score, base);

        let mut rotated = readings.clone();
        let len = rotated.len();
        rotated.rotate_left(rotate_by % len);
        prop_assert_eq!(aggregator.aggregate(&rotated).unwrap().score, base);
    }
}

// ── 4. History cap ───────────────────────────────────────────────────

proptest! {
    /// Any sequence of pushes (including clock skew) respects the cap and ordering.
    #[test]
    fn history_never_exceeds_capacity(
        capacity in 1usize..50,
        offsets in prop::collection::vec(-5_000i64..5_000, 0..200),
    ) {
        let mut store = HistoryStore::new(capacity);
        let t0 = Utc::now();
        for (i, offset) in offsets.iter().enumerate() {
            let mut snapshot = ScoreSnapshot::neutral(t0 + ChronoDuration::milliseconds(*offset));
            snapshot.score = (i % 7) as f64 / 10.0;
            store.push(snapshot);
            prop_assert!(store.len() <= capacity);
        }

        let entries = store.recent(None);
        prop_assert_eq!(entries.len(), offsets.len().min(capacity));
        prop_assert!(entries.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
