//! Threshold alerting
//!
//! Each display owns an `AlertConfig`: an ordered list of `AlertThreshold`
//! rules plus delivery channels and an escalation policy. After every
//! successful refresh, `AlertEvaluator` checks the new score against each
//! enabled rule and returns the `AlertEvent`s to publish.

pub mod evaluator;
pub mod threshold;

pub use evaluator::{AlertEvaluator, AlertEvent};
pub use threshold::{
    AlertCondition, AlertConfig, AlertThreshold, DeliveryChannel, EscalationPolicy, Severity,
    ThresholdPatch,
};
