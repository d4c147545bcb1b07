//! Source Connector - pulls one reading from one configured data source
//!
//! The engine never talks to a provider directly. Upstream access goes through
//! the `SourceFetcher` trait, injected into the registry at construction.
//! `SourceConnector` wraps a fetcher and guarantees:
//! - Disabled / disconnected sources are skipped (no call made)
//! - Every attempted fetch yields a `SourceReading`, failures included
//! - Fetches are bounded by a timeout and abandoned on cancellation

pub mod synthetic;
pub mod types;

pub use synthetic::SyntheticFetcher;
pub use types::{
    DataSource, RawReading, SourceCategory, SourceReading, SourcePatch, SourceStatus, SourceType,
};

use crate::error::SourceFetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pull-based access to an upstream provider
///
/// One call per source per refresh cycle. Implementations should watch the
/// token if they perform long waits; the connector also races the call against
/// cancellation, so a fetcher that ignores it is still abandoned.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(
        &self,
        source: &DataSource,
        cancel: &CancellationToken,
    ) -> Result<RawReading, SourceFetchError>;
}

/// Boundary between the engine and a `SourceFetcher`
#[derive(Clone)]
pub struct SourceConnector {
    fetcher: Arc<dyn SourceFetcher>,
    timeout: Duration,
}

impl SourceConnector {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Fetch one reading
    ///
    /// # Returns
    /// * `None` - source is disabled or disconnected; nothing attempted
    /// * `Some(reading)` - healthy reading, or an error reading with
    ///   `is_active = false` and the failure in `errors`
    pub async fn fetch(
        &self,
        source: &DataSource,
        cancel: &CancellationToken,
    ) -> Option<SourceReading> {
        if !source.is_fetchable() {
            log::debug!("Skipping source {} (enabled={}, status={:?})", source.id, source.enabled, source.status);
            return None;
        }

        let timeout_ms = self.timeout.as_millis() as u64;
        let result = tokio::select! {
            _ = cancel.cancelled() => Err(SourceFetchError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.fetcher.fetch(source, cancel)) => {
                res.unwrap_or(Err(SourceFetchError::Timeout(timeout_ms)))
            }
        };

        let now = Utc::now();
        Some(match result {
            Ok(raw) => normalize(source, raw, now),
            Err(e) => {
                log::debug!("Source {} fetch failed: {}", source.id, e);
                SourceReading::failed(source, e.to_string(), now)
            }
        })
    }
}

/// Turn a raw provider value into a bounded reading
fn normalize(source: &DataSource, raw: RawReading, now: DateTime<Utc>) -> SourceReading {
    if !raw.value.is_finite() || !raw.confidence.is_finite() {
        return SourceReading::failed(
            source,
            SourceFetchError::InvalidPayload(format!(
                "non-finite value/confidence ({}, {})",
                raw.value, raw.confidence
            ))
            .to_string(),
            now,
        );
    }

    let observed_at = raw.observed_at.unwrap_or(now);
    let freshness = (now - observed_at).to_std().unwrap_or(Duration::ZERO);

    SourceReading {
        source_id: source.id.clone(),
        source_type: source.source_type,
        value: raw.value.clamp(-1.0, 1.0),
        confidence: raw.confidence.clamp(0.0, 1.0),
        weight: source.weight,
        reliability: source.reliability,
        freshness,
        errors: Vec::new(),
        is_active: true,
        timestamp: now,
    }
}
