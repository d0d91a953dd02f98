// mobwatch/src/state/history.rs
//
// Bounded, time-pruned per-group message history.
// DashMap = sharded concurrent HashMap — group entries are created
// lazily and each group's ring buffer sits behind its own RwLock, so
// writes to two different groups never contend beyond the shard lock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::events::MessageRecord;

#[derive(Debug, Default)]
struct GroupHistory {
    messages: VecDeque<MessageRecord>,
}

impl GroupHistory {
    /// Drop entries older than the cutoff. Insertion order is
    /// chronological, so pruning only ever pops from the front.
    fn expire_before(&mut self, cutoff: DateTime<Utc>) {
        while self
            .messages
            .front()
            .map(|m| m.timestamp < cutoff)
            .unwrap_or(false)
        {
            self.messages.pop_front();
        }
    }
}

pub struct MessageStore {
    groups: DashMap<String, Arc<RwLock<GroupHistory>>>,
    capacity: usize,
    total_recorded: AtomicU64,
}

impl MessageStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: DashMap::new(),
            capacity: capacity.max(1),
            total_recorded: AtomicU64::new(0),
        }
    }

    /// Append one record, enforcing the ring-buffer capacity bound.
    pub fn record(&self, group_id: &str, record: MessageRecord) {
        let history = self
            .groups
            .entry(group_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(GroupHistory::default())))
            .clone();

        let mut h = history.write();
        h.messages.push_back(record);
        while h.messages.len() > self.capacity {
            h.messages.pop_front();
        }
        drop(h);

        self.total_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Chronological snapshot of entries no older than `window_secs`.
    /// Unknown groups yield an empty vec, never an error.
    pub fn recent(&self, group_id: &str, window_secs: i64) -> Vec<MessageRecord> {
        let Some(history) = self.groups.get(group_id).map(|h| h.clone()) else {
            return Vec::new();
        };
        let now = Utc::now();
        let snapshot = history
            .read()
            .messages
            .iter()
            .filter(|m| (now - m.timestamp).num_seconds() <= window_secs)
            .cloned()
            .collect();
        snapshot
    }

    /// Full snapshot of a group's stored history.
    pub fn all(&self, group_id: &str) -> Vec<MessageRecord> {
        self.groups
            .get(group_id)
            .map(|h| h.clone())
            .map(|h| h.read().messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop everything older than `cutoff`; groups whose history empties
    /// are removed entirely. Locks one group at a time.
    pub fn sweep(&self, cutoff: DateTime<Utc>) {
        let mut emptied: Vec<String> = Vec::new();
        for entry in self.groups.iter() {
            let mut h = entry.value().write();
            h.expire_before(cutoff);
            if h.messages.is_empty() {
                emptied.push(entry.key().clone());
            }
        }
        for key in emptied {
            // Re-check under the entry lock — a writer may have raced us.
            self.groups
                .remove_if(&key, |_, h| h.read().messages.is_empty());
        }
        debug!(groups = self.groups.len(), "history sweep complete");
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }
}
