//! Alert Evaluator - checks a new snapshot against a display's thresholds

use super::threshold::{AlertConfig, AlertThreshold, DeliveryChannel, Severity};
use crate::pipeline::types::{DisplayId, ScoreSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Published on the bus when a threshold fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub display: DisplayId,
    /// Threshold state after the firing (counter already incremented)
    pub threshold: AlertThreshold,
    pub snapshot: ScoreSnapshot,
    pub previous_score: Option<f64>,
    /// Threshold severity, raised if the escalation policy applies
    pub severity: Severity,
    pub channels: Vec<DeliveryChannel>,
    pub timestamp: DateTime<Utc>,
}

pub struct AlertEvaluator;

impl AlertEvaluator {
    /// Evaluate every enabled threshold against a freshly computed snapshot
    ///
    /// Mutates threshold counters and breach markers in place. Thresholds are
    /// independent; several may fire for the same snapshot.
    ///
    /// # Arguments
    /// * `config` - The display's alert configuration
    /// * `display` - Owner of the thresholds
    /// * `snapshot` - The new composite snapshot
    /// * `previous` - Score of the snapshot before it, if any
    pub fn evaluate(
        config: &mut AlertConfig,
        display: DisplayId,
        snapshot: &ScoreSnapshot,
        previous: Option<f64>,
    ) -> Vec<AlertEvent> {
        if !config.enabled {
            return Vec::new();
        }

        let now = snapshot.timestamp;
        let policy = config.escalation.clone();
        let mut events = Vec::new();

        for threshold in config.thresholds.iter_mut().filter(|t| t.enabled) {
            if !threshold.condition.is_met(threshold.value, snapshot.score, previous) {
                threshold.breach_started = None;
                continue;
            }

            let started = *threshold.breach_started.get_or_insert(now);
            let sustained_ms = (now - started).num_milliseconds().max(0) as u64;
            if sustained_ms < threshold.duration_ms {
                continue;
            }

            if policy.cooldown_ms > 0 {
                if let Some(last) = threshold.last_triggered {
                    let since_ms = (now - last).num_milliseconds().max(0) as u64;
                    if since_ms < policy.cooldown_ms {
                        log::debug!("Threshold {} in cooldown ({}ms left)", threshold.id, policy.cooldown_ms - since_ms);
                        continue;
                    }
                }
            }

            threshold.trigger_count += 1;
            threshold.last_triggered = Some(now);

            let severity = match policy.escalate_after {
                Some(after) if after > 0 && threshold.trigger_count >= after => threshold.severity.escalated(),
                _ => threshold.severity,
            };

            log::info!(
                "🚨 Alert {} on {}: score={:.3} {:?} {:.3} (count={}, severity={:?})",
                threshold.id,
                display,
                snapshot.score,
                threshold.condition,
                threshold.value,
                threshold.trigger_count,
                severity
            );

            events.push(AlertEvent {
                display,
                threshold: threshold.clone(),
                snapshot: snapshot.clone(),
                previous_score: previous,
                severity,
                channels: config.delivery.clone(),
                timestamp: now,
            });
        }

        events
    }
}
