//! Synthetic source fetcher (seeded random walk)
//!
//! Used by the demo runtime and by tests that need moving scores without a
//! real provider. Each source id walks independently.
//!
//! Recognized `parameters` keys on the data source:
//! - `volatility` - max step size per fetch (default 0.05)
//! - `failureRate` - probability in [0, 1] that a fetch fails (default 0.0)
//! - `start` - initial value (default 0.0)

use super::{DataSource, RawReading, SourceFetcher};
use crate::error::SourceFetchError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub struct SyntheticFetcher {
    state: Mutex<WalkState>,
}

struct WalkState {
    rng: StdRng,
    levels: HashMap<String, f64>,
}

impl SyntheticFetcher {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(WalkState {
                rng: StdRng::seed_from_u64(seed),
                levels: HashMap::new(),
            }),
        }
    }

    fn param(source: &DataSource, key: &str, default: f64) -> f64 {
        source
            .parameters
            .get(key)
            .and_then(|v| v.as_f64())
            .unwrap_or(default)
    }

    fn step(&self, source: &DataSource) -> Result<RawReading, SourceFetchError> {
        let volatility = Self::param(source, "volatility", 0.05).abs();
        let failure_rate = Self::param(source, "failureRate", 0.0).clamp(0.0, 1.0);
        let start = Self::param(source, "start", 0.0).clamp(-1.0, 1.0);

        // Poisoned lock only means a previous step panicked mid-update; the walk
        // state is still usable.
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let WalkState { rng, levels } = &mut *guard;

        if failure_rate > 0.0 && rng.gen_bool(failure_rate) {
            return Err(SourceFetchError::Unavailable(format!(
                "synthetic outage on {}",
                source.id
            )));
        }

        let delta = if volatility > 0.0 {
            rng.gen_range(-volatility..=volatility)
        } else {
            0.0
        };
        let level = levels.entry(source.id.clone()).or_insert(start);
        *level = (*level + delta).clamp(-1.0, 1.0);

        let confidence = rng.gen_range(0.5..=1.0) * source.reliability.clamp(0.0, 1.0).max(0.1);
        Ok(RawReading::new(*level, confidence.min(1.0)))
    }
}

#[async_trait]
impl SourceFetcher for SyntheticFetcher {
    async fn fetch(
        &self,
        source: &DataSource,
        cancel: &CancellationToken,
    ) -> Result<RawReading, SourceFetchError> {
        if cancel.is_cancelled() {
            return Err(SourceFetchError::Cancelled);
        }
        self.step(source)
    }
}
