//! Error taxonomy for the engine
//!
//! Two layers:
//! - `EngineError` is returned to callers of registry operations and by a failed
//!   refresh cycle (`NoValidSources`).
//! - `SourceFetchError` is produced by a `SourceFetcher` and never crosses the
//!   connector boundary: it is folded into an error reading instead.

use crate::pipeline::types::DisplayId;
use thiserror::Error;

/// Errors surfaced by registry operations and refresh cycles
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Unknown (or already deleted) display id
    #[error("display not found: {0}")]
    NotFound(DisplayId),

    #[error("threshold {threshold_id} not found on display {display}")]
    ThresholdNotFound {
        display: DisplayId,
        threshold_id: String,
    },

    #[error("source {source_id} not found on display {display}")]
    SourceNotFound {
        display: DisplayId,
        source_id: String,
    },

    /// Aggregation had nothing to combine (no enabled, healthy sources)
    #[error("no valid sources to aggregate")]
    NoValidSources,

    /// Malformed configuration; nothing was changed
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Refresh result discarded because the display was deleted or rescheduled
    #[error("refresh cancelled")]
    Cancelled,
}

/// Per-source fetch failure, captured as data inside a `SourceReading`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceFetchError {
    #[error("fetch timed out after {0}ms")]
    Timeout(u64),

    #[error("fetch cancelled")]
    Cancelled,

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_id() {
        let id = DisplayId::new(3, 1);
        let err = EngineError::NotFound(id);
        assert_eq!(err.to_string(), "display not found: display-3.1");
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(
            SourceFetchError::Timeout(250).to_string(),
            "fetch timed out after 250ms"
        );
        assert!(SourceFetchError::Unavailable("503".into())
            .to_string()
            .contains("503"));
    }
}
