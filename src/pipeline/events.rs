//! Event bus for display lifecycle, score and alert notifications
//!
//! Single tagged-union channel (`tokio::sync::broadcast`). Publishing never
//! blocks: each subscriber has a bounded buffer and a slow subscriber loses
//! its oldest events. Callback handlers registered with `on` run on their own
//! dispatcher task, so one slow or panicking handler cannot affect others.

use super::types::{DisplayId, ScoreSnapshot};
use crate::alerts::AlertEvent;
use crate::error::EngineError;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum DisplayEvent {
    DisplayCreated { id: DisplayId, name: String },
    DisplayUpdated { id: DisplayId },
    DisplayDeleted { id: DisplayId },
    ScoreUpdated { id: DisplayId, snapshot: ScoreSnapshot },
    RefreshFailed { id: DisplayId, error: EngineError },
    AlertTriggered(Box<AlertEvent>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DisplayCreated,
    DisplayUpdated,
    DisplayDeleted,
    ScoreUpdated,
    RefreshFailed,
    AlertTriggered,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DisplayCreated => "displayCreated",
            EventKind::DisplayUpdated => "displayUpdated",
            EventKind::DisplayDeleted => "displayDeleted",
            EventKind::ScoreUpdated => "scoreUpdated",
            EventKind::RefreshFailed => "refreshFailed",
            EventKind::AlertTriggered => "alertTriggered",
        }
    }
}

impl DisplayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DisplayEvent::DisplayCreated { .. } => EventKind::DisplayCreated,
            DisplayEvent::DisplayUpdated { .. } => EventKind::DisplayUpdated,
            DisplayEvent::DisplayDeleted { .. } => EventKind::DisplayDeleted,
            DisplayEvent::ScoreUpdated { .. } => EventKind::ScoreUpdated,
            DisplayEvent::RefreshFailed { .. } => EventKind::RefreshFailed,
            DisplayEvent::AlertTriggered(_) => EventKind::AlertTriggered,
        }
    }

    /// Display the event concerns
    pub fn display_id(&self) -> DisplayId {
        match self {
            DisplayEvent::DisplayCreated { id, .. }
            | DisplayEvent::DisplayUpdated { id }
            | DisplayEvent::DisplayDeleted { id }
            | DisplayEvent::ScoreUpdated { id, .. }
            | DisplayEvent::RefreshFailed { id, .. } => *id,
            DisplayEvent::AlertTriggered(alert) => alert.display,
        }
    }
}

/// Handle returned by `EventBus::on`, passed to `off`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DisplayEvent>,
    handlers: Arc<Mutex<HashMap<SubscriptionId, CancellationToken>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    /// # Arguments
    /// * `buffer` - Events buffered per subscriber before the oldest are dropped
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self {
            sender,
            handlers: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Fan an event out to every current subscriber
    pub fn publish(&self, event: DisplayEvent) {
        let kind = event.kind();
        if self.sender.send(event).is_err() {
            log::trace!("No subscribers for {}", kind.as_str());
        }
    }

    /// Raw receiver over every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Register a callback for one event kind
    ///
    /// Spawns a dispatcher task, so this must be called from within a tokio
    /// runtime. A panicking handler is logged and keeps receiving later events.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&DisplayEvent) + Send + Sync + 'static,
    {
        self.spawn_dispatcher(Some(kind), handler)
    }

    /// Register a callback for every event
    pub fn on_any<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&DisplayEvent) + Send + Sync + 'static,
    {
        self.spawn_dispatcher(None, handler)
    }

    /// Stop a callback registered with `on` / `on_any`
    pub fn off(&self, id: SubscriptionId) -> bool {
        let token = self.lock_handlers().remove(&id);
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn spawn_dispatcher<F>(&self, filter: Option<EventKind>, handler: F) -> SubscriptionId
    where
        F: Fn(&DisplayEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.lock_handlers().insert(id, token.clone());

        let mut rx = self.sender.subscribe();
        let handlers = self.handlers.clone();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    received = rx.recv() => received,
                };

                match event {
                    Ok(event) => {
                        if filter.map_or(false, |kind| kind != event.kind()) {
                            continue;
                        }
                        if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                            log::error!(
                                "❌ Event handler {:?} panicked on {} for {}",
                                id,
                                event.kind().as_str(),
                                event.display_id()
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("⚠️  Event handler {:?} lagging, dropped {} events", id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            lock_map(&handlers).remove(&id);
            log::debug!("Event handler {:?} stopped", id);
        });

        id
    }

    fn lock_handlers(&self) -> MutexGuard<'_, HashMap<SubscriptionId, CancellationToken>> {
        lock_map(&self.handlers)
    }
}

fn lock_map(
    handlers: &Mutex<HashMap<SubscriptionId, CancellationToken>>,
) -> MutexGuard<'_, HashMap<SubscriptionId, CancellationToken>> {
    handlers.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn id() -> DisplayId {
        DisplayId::new(1, 0)
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_harmless() {
        let bus = EventBus::new(4);
        bus.publish(DisplayEvent::DisplayUpdated { id: id() });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_loses_oldest() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(DisplayEvent::DisplayUpdated { id: id() });
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert!(rx.recv().await.is_ok());
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_filters_by_kind_and_survives_panics() {
        let bus = EventBus::new(16);
        let deleted = Arc::new(AtomicUsize::new(0));
        let seen = deleted.clone();

        bus.on(EventKind::DisplayDeleted, move |event| {
            if let DisplayEvent::DisplayDeleted { .. } = event {
                let n = seen.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    panic!("first delivery blows up");
                }
            }
        });

        bus.publish(DisplayEvent::DisplayUpdated { id: id() });
        bus.publish(DisplayEvent::DisplayDeleted { id: id() });
        bus.publish(DisplayEvent::DisplayDeleted { id: id() });

        tokio::time::timeout(Duration::from_secs(2), async {
            while deleted.load(Ordering::SeqCst) < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("handler should see both deletes");
    }

    #[tokio::test]
    async fn test_closed_bus_prunes_handlers() {
        // Edge case: dropping every sender ends the dispatcher and frees its slot
        let bus = EventBus::new(4);
        bus.on_any(|_| {});
        let handlers = bus.handlers.clone();
        assert_eq!(handlers.lock().unwrap().len(), 1);

        drop(bus);
        tokio::time::timeout(Duration::from_secs(2), async {
            while !handlers.lock().unwrap().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("dispatcher should remove itself once the bus is closed");
    }

    #[tokio::test]
    async fn test_off_stops_delivery() {
        let bus = EventBus::new(16);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = bus.on_any(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bus.off(sub));
        assert!(!bus.off(sub));

        tokio::time::sleep(Duration::from_millis(10)).await;
        bus.publish(DisplayEvent::DisplayUpdated { id: id() });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
