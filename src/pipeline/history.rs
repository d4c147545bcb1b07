//! Capped, time-ordered snapshot history for one display

use super::types::ScoreSnapshot;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Bounded in-memory history
///
/// Newest entries are appended at the back; pushing beyond capacity drops the
/// oldest. Timestamps are strictly increasing: a snapshot that is not newer
/// than the last stored one is stamped 1ms after it.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    entries: VecDeque<ScoreSnapshot>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&ScoreSnapshot> {
        self.entries.back()
    }

    /// Earliest timestamp a new entry may carry
    pub fn next_timestamp(&self, candidate: DateTime<Utc>) -> DateTime<Utc> {
        match self.entries.back() {
            Some(last) if candidate <= last.timestamp => last.timestamp + Duration::milliseconds(1),
            _ => candidate,
        }
    }

    /// Append a snapshot, truncating from the front on overflow
    ///
    /// # Returns
    /// The timestamp the snapshot was stored with
    pub fn push(&mut self, mut snapshot: ScoreSnapshot) -> DateTime<Utc> {
        snapshot.timestamp = self.next_timestamp(snapshot.timestamp);
        let stored_at = snapshot.timestamp;
        self.entries.push_back(snapshot);
        self.truncate();
        stored_at
    }

    /// Change capacity; shrinking drops the oldest entries immediately
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.truncate();
    }

    /// Last `limit` entries (all when `None`), oldest first
    pub fn recent(&self, limit: Option<usize>) -> Vec<ScoreSnapshot> {
        let take = limit.unwrap_or(self.entries.len()).min(self.entries.len());
        self.entries
            .iter()
            .skip(self.entries.len() - take)
            .cloned()
            .collect()
    }

    /// `(timestamp, score)` pairs of the last `limit` entries, oldest first
    pub fn series(&self, limit: usize) -> Vec<(DateTime<Utc>, f64)> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries
            .iter()
            .skip(skip)
            .map(|s| (s.timestamp, s.score))
            .collect()
    }

    fn truncate(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}
