//! # sentiflow
//!
//! In-process signal aggregation and alerting engine.
//!
//! Pulls sentiment/risk readings from independently configured data sources,
//! combines them into one composite score per display, tracks trend and data
//! quality over a bounded history, and raises alerts on threshold rules.
//!
//! ```no_run
//! use sentiflow::{
//!     alerts::AlertConfig,
//!     config::EngineConfig,
//!     pipeline::{DisplayConfig, DisplayRegistry},
//!     sources::SyntheticFetcher,
//! };
//! use std::sync::Arc;
//!
//! # async fn demo() -> sentiflow::error::Result<()> {
//! let registry = DisplayRegistry::new(Arc::new(SyntheticFetcher::new(7)), EngineConfig::from_env());
//! let config = DisplayConfig::from_json(r#"{
//!     "name": "BTC",
//!     "dataSources": [{"id": "news", "name": "News", "type": "news_feed"}],
//!     "aggregationMethod": "weighted_average",
//!     "weightingStrategy": "confidence",
//!     "updateInterval": 5000
//! }"#)?;
//! let display = registry.create(config, AlertConfig::default()).await?;
//! let snapshot = registry.refresh_now(display.id).await?;
//! println!("{} -> {:.3}", display.id, snapshot.score);
//! # Ok(())
//! # }
//! ```

pub mod aggregator_core;
pub mod alerts;
pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sources;

pub use error::{EngineError, Result};
pub use pipeline::{DisplayEvent, DisplayRegistry};
