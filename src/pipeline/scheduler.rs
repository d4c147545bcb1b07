//! Refresh scheduler - one periodic task per active display
//!
//! Each task owns a `CancellationToken` (a child of the display's lifetime
//! token) and ticks at the display's interval. The first refresh runs
//! immediately; missed ticks are delayed, never bursted. A display's cycles
//! never overlap because the task awaits each refresh before the next tick.
//! A task that stops on its own removes its entry from the table.

use super::types::DisplayId;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Whatever performs one refresh cycle for a display
#[async_trait]
pub trait RefreshTarget: Send + Sync + 'static {
    async fn refresh(&self, id: DisplayId, cancel: &CancellationToken) -> Result<()>;
}

type TaskTable = Arc<Mutex<HashMap<DisplayId, ScheduledTask>>>;

struct ScheduledTask {
    /// Distinguishes a task from the one that replaced it
    serial: u64,
    token: CancellationToken,
    period: Duration,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct RefreshScheduler {
    tasks: TaskTable,
    next_serial: AtomicU64,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) the periodic refresh of one display
    ///
    /// Any existing task for `id` is cancelled before the new one is spawned.
    /// The task holds only a `Weak` reference to the target and exits once the
    /// target is dropped.
    ///
    /// # Arguments
    /// * `id` - Display to refresh
    /// * `period` - Interval between refreshes
    /// * `parent` - Display lifetime token; cancelling it stops the task
    /// * `target` - Refresh implementation
    pub fn schedule<T: RefreshTarget>(
        &self,
        id: DisplayId,
        period: Duration,
        parent: &CancellationToken,
        target: Weak<T>,
    ) {
        let mut tasks = self.lock_tasks();
        if let Some(old) = tasks.remove(&id) {
            old.token.cancel();
            log::debug!("⏹️  Cancelled refresh task for {} (was {:?})", id, old.period);
        }

        // The table lock is held until insert, so a task that exits at once
        // still finds its own entry to prune.
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let token = parent.child_token();
        let handle = tokio::spawn(run_refresh_loop(
            id,
            period,
            token.clone(),
            target,
            (self.tasks.clone(), serial),
        ));
        tasks.insert(
            id,
            ScheduledTask {
                serial,
                token,
                period,
                handle,
            },
        );
        log::info!("⏰ Scheduled {} every {}ms", id, period.as_millis());
    }

    /// Stop the task for one display
    pub fn cancel(&self, id: DisplayId) -> bool {
        match self.lock_tasks().remove(&id) {
            Some(task) => {
                task.token.cancel();
                log::debug!("⏹️  Cancelled refresh task for {}", id);
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, id: DisplayId) -> bool {
        self.lock_tasks()
            .get(&id)
            .map_or(false, |task| !task.handle.is_finished())
    }

    pub fn period_of(&self, id: DisplayId) -> Option<Duration> {
        self.lock_tasks().get(&id).map(|task| task.period)
    }

    pub fn len(&self) -> usize {
        self.lock_tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancel every task
    pub fn shutdown(&self) {
        let drained: Vec<ScheduledTask> = self.lock_tasks().drain().map(|(_, task)| task).collect();
        if !drained.is_empty() {
            log::info!("🛑 Stopping {} refresh tasks", drained.len());
        }
        for task in drained {
            task.token.cancel();
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<DisplayId, ScheduledTask>> {
        lock_table(&self.tasks)
    }
}

fn lock_table(tasks: &TaskTable) -> MutexGuard<'_, HashMap<DisplayId, ScheduledTask>> {
    tasks.lock().unwrap_or_else(|e| e.into_inner())
}

async fn run_refresh_loop<T: RefreshTarget>(
    id: DisplayId,
    period: Duration,
    token: CancellationToken,
    target: Weak<T>,
    (tasks, serial): (TaskTable, u64),
) {
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(strong) = target.upgrade() else {
            break;
        };

        match strong.refresh(id, &token).await {
            Ok(()) => {}
            Err(EngineError::Cancelled) => break,
            Err(EngineError::NotFound(_)) => {
                log::debug!("{} no longer exists, stopping its refresh task", id);
                break;
            }
            Err(e) => log::debug!("Refresh of {} failed, continuing: {}", id, e),
        }
    }

    let mut table = lock_table(&tasks);
    if table.get(&id).map_or(false, |task| task.serial == serial) {
        table.remove(&id);
    }
    drop(table);

    log::debug!("Refresh task for {} exited", id);
}
