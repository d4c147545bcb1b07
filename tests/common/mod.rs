//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sentiflow::error::SourceFetchError;
use sentiflow::pipeline::{DisplayEvent, DisplayId};
use sentiflow::sources::{DataSource, RawReading, SourceFetcher, SourceType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// What the fetcher does for one source id
#[derive(Debug, Clone)]
pub enum Step {
    /// (value, confidence)
    Value(f64, f64),
    Fail(String),
    /// Block until the cycle is cancelled
    Stall,
}

/// Fetcher whose per-source behavior can be changed mid-test
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<HashMap<String, Step>>,
    stalled: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, source_id: &str, step: Step) {
        self.script.lock().unwrap().insert(source_id.to_string(), step);
    }

    pub fn value(&self, source_id: &str, value: f64) {
        self.set(source_id, Step::Value(value, 0.9));
    }

    /// Fetches currently blocked in `Step::Stall`
    pub fn stalled(&self) -> usize {
        self.stalled.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        source: &DataSource,
        cancel: &CancellationToken,
    ) -> Result<RawReading, SourceFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .unwrap()
            .get(&source.id)
            .cloned()
            .unwrap_or_else(|| Step::Fail(format!("{} not scripted", source.id)));

        match step {
            Step::Value(value, confidence) => Ok(RawReading::new(value, confidence)),
            Step::Fail(reason) => Err(SourceFetchError::Unavailable(reason)),
            Step::Stall => {
                self.stalled.fetch_add(1, Ordering::SeqCst);
                cancel.cancelled().await;
                self.stalled.fetch_sub(1, Ordering::SeqCst);
                Err(SourceFetchError::Cancelled)
            }
        }
    }
}

pub fn make_source(id: &str, source_type: SourceType) -> DataSource {
    DataSource::new(id, id.to_uppercase(), source_type)
}

/// Next event for `id` matching `pred`, failing the test after 5s
pub async fn wait_for<F>(
    rx: &mut broadcast::Receiver<DisplayEvent>,
    id: DisplayId,
    mut pred: F,
) -> DisplayEvent
where
    F: FnMut(&DisplayEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) if event.display_id() == id && pred(&event) => return event,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

pub fn is_score_update(event: &DisplayEvent) -> bool {
    matches!(event, DisplayEvent::ScoreUpdated { .. })
}

/// Drain everything currently buffered
pub fn drain(rx: &mut broadcast::Receiver<DisplayEvent>) -> Vec<DisplayEvent> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    out
}
