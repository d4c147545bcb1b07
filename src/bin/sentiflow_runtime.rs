//! Sentiflow Runtime - demo host for the engine
//!
//! Creates a few displays backed by the synthetic random-walk fetcher and
//! logs every event until CTRL+C.
//!
//! Usage:
//!   cargo run --release --bin sentiflow_runtime
//!
//! Environment variables:
//!   RUST_LOG - log filter (default: info)
//!   SENTIFLOW_SEED - synthetic fetcher seed (default: 42)
//!   SENTIFLOW_DISPLAYS - path to a JSON array of display configs (optional)
//!   SENTIFLOW_* - engine settings, see `EngineConfig::from_env`

use dotenv::dotenv;
use log::{error, info, warn};
use sentiflow::alerts::{AlertCondition, AlertConfig, AlertThreshold, EscalationPolicy, Severity};
use sentiflow::config::EngineConfig;
use sentiflow::pipeline::{DisplayConfig, DisplayEvent, DisplayRegistry};
use sentiflow::sources::{DataSource, SourceType, SyntheticFetcher};
use std::env;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Sentiflow Runtime");

    let config = EngineConfig::from_env();
    info!("   ├─ History capacity: {}", config.history_capacity);
    info!("   ├─ Trend window: {} points", config.trend_window);
    info!("   ├─ Default interval: {}ms", config.default_interval_ms);
    info!("   ├─ Fetch timeout: {}ms", config.fetch_timeout_ms);
    info!("   └─ Event buffer: {}", config.event_buffer);

    let seed = env::var("SENTIFLOW_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(42);
    let registry = DisplayRegistry::new(Arc::new(SyntheticFetcher::new(seed)), config);

    let mut events = registry.events().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("⚠️  Event logger lagging, dropped {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let displays = match env::var("SENTIFLOW_DISPLAYS") {
        Ok(path) => {
            info!("🔧 Loading displays from {}", path);
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<Vec<DisplayConfig>>(&raw)?
        }
        Err(_) => demo_displays(),
    };

    for display in displays {
        match registry.create(display, demo_alerts()).await {
            Ok(view) => info!("   ├─ {} {} ({} sources)", view.id, view.config.name, view.config.sources.len()),
            Err(e) => error!("❌ Failed to create display: {}", e),
        }
    }

    info!("✅ {} displays scheduled", registry.scheduled_count());
    info!("🔄 Press CTRL+C to shutdown gracefully");

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("");
            info!("⚠️  Received CTRL+C, shutting down...");
        }
        Err(err) => {
            error!("❌ Failed to listen for CTRL+C: {}", err);
        }
    }

    for id in registry.list().await {
        if let Ok(metrics) = registry.metrics(id).await {
            info!(
                "📈 {}: {} refreshes, success {:.0}%, {} alerts, avg {:.1}ms",
                id,
                metrics.refresh_count,
                metrics.success_rate() * 100.0,
                metrics.alerts_triggered,
                metrics.avg_refresh_duration_ms
            );
        }
    }

    registry.shutdown();
    tokio::time::sleep(Duration::from_millis(100)).await;

    info!("✅ Sentiflow runtime stopped");
    Ok(())
}

fn log_event(event: &DisplayEvent) {
    match event {
        DisplayEvent::DisplayCreated { id, name } => info!("🆕 {} created ({})", id, name),
        DisplayEvent::DisplayUpdated { id } => info!("✏️  {} updated", id),
        DisplayEvent::DisplayDeleted { id } => info!("🗑️  {} deleted", id),
        DisplayEvent::ScoreUpdated { id, snapshot } => info!(
            "📊 {} score={:+.3} {} trend={:?} quality={:.2}",
            id,
            snapshot.score,
            snapshot.label.as_str(),
            snapshot.trend.direction,
            snapshot.quality.overall
        ),
        DisplayEvent::RefreshFailed { id, error } => warn!("⚠️  {} refresh failed: {}", id, error),
        DisplayEvent::AlertTriggered(alert) => warn!(
            "🚨 {} [{:?}] {} (score {:+.3}, fired {}x)",
            alert.display,
            alert.severity,
            alert.threshold.name,
            alert.snapshot.score,
            alert.threshold.trigger_count
        ),
    }
}

fn synthetic(id: &str, name: &str, source_type: SourceType, volatility: f64, failure_rate: f64) -> DataSource {
    let mut source = DataSource::new(id, name, source_type);
    source.parameters = serde_json::json!({
        "volatility": volatility,
        "failureRate": failure_rate,
    });
    source
}

fn demo_displays() -> Vec<DisplayConfig> {
    vec![
        DisplayConfig::new("Market mood")
            .with_interval_ms(2_000)
            .with_source(synthetic("news", "Newswire", SourceType::NewsFeed, 0.08, 0.05))
            .with_source(synthetic("social", "Social chatter", SourceType::SocialMedia, 0.15, 0.1))
            .with_source(synthetic("rsi", "RSI(14)", SourceType::TechnicalIndicator, 0.05, 0.0)),
        DisplayConfig::new("Macro risk")
            .with_interval_ms(5_000)
            .with_source(synthetic("rates", "Rates", SourceType::MacroEconomic, 0.03, 0.0))
            .with_source(synthetic("earnings", "Earnings", SourceType::FundamentalData, 0.04, 0.02)),
    ]
}

fn demo_alerts() -> AlertConfig {
    let mut alerts = AlertConfig::default()
        .with_threshold(AlertThreshold::new(
            "euphoria",
            "Euphoria",
            AlertCondition::CrossesAbove,
            0.5,
            Severity::Warning,
        ))
        .with_threshold(AlertThreshold::new(
            "panic",
            "Panic",
            AlertCondition::CrossesBelow,
            -0.5,
            Severity::Critical,
        ))
        .with_threshold(AlertThreshold::new(
            "jump",
            "Sudden move",
            AlertCondition::ChangeExceeds,
            0.2,
            Severity::Info,
        ));
    alerts.escalation = EscalationPolicy {
        cooldown_ms: 10_000,
        escalate_after: Some(3),
    };
    alerts
}
