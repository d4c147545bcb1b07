//! # Display Pipeline
//!
//! Owns the monitored displays and drives their refresh cycles.
//!
//! ## Architecture
//!
//! ```text
//! RefreshScheduler (one task per active display)
//!     ↓ tick
//! DisplayRegistry::run_cycle()
//!     ├─ SourceConnector::fetch() per source (concurrent, cancellable)
//!     ├─ ScoringEngine::apply()   (aggregate → trend → alerts → history)
//!     └─ EventBus::publish()      (ScoreUpdated / RefreshFailed / AlertTriggered)
//! ```
//!
//! ## Module Organization
//!
//! - `types` - DisplayId, DisplayConfig, ScoreSnapshot, DisplayView
//! - `table` - generational slot table keyed by DisplayId
//! - `history` - capped, strictly time-ordered snapshot buffer
//! - `metrics` - per-display refresh counters
//! - `events` - broadcast event bus with callback dispatchers
//! - `scheduler` - per-display periodic refresh tasks
//! - `engine` - synchronous scoring step of a cycle
//! - `registry` - public API

pub mod engine;
pub mod events;
pub mod history;
pub mod metrics;
pub mod registry;
pub mod scheduler;
pub mod table;
pub mod types;

pub use events::{DisplayEvent, EventBus, EventKind, SubscriptionId};
pub use history::HistoryStore;
pub use metrics::PerformanceMetrics;
pub use registry::DisplayRegistry;
pub use scheduler::{RefreshScheduler, RefreshTarget};
pub use types::{DisplayConfig, DisplayConfigPatch, DisplayId, DisplayView, ScoreSnapshot, SentimentLabel};
