// mobwatch/src/state/targeting.rs
//
// Rolling record of who attacked whom, keyed by (group, target).
// Lists are append-ordered; every append prunes entries that fell out
// of the lookback window, so a key never grows past what one window
// of traffic can hold.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::events::TargetingEvent;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct TargetKey {
    group_id: String,
    target_id: String,
}

#[derive(Default)]
pub struct TargetingLedger {
    events: DashMap<TargetKey, Vec<TargetingEvent>>,
}

impl TargetingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one targeting event, prune the key to `window_secs` of
    /// lookback relative to the new event, and return the pruned list
    /// so the caller can score without a second lookup.
    pub fn record(
        &self,
        group_id: &str,
        target_id: &str,
        attacker_id: &str,
        timestamp: DateTime<Utc>,
        base_score: f32,
        window_secs: i64,
    ) -> Vec<TargetingEvent> {
        let key = TargetKey {
            group_id: group_id.to_string(),
            target_id: target_id.to_string(),
        };
        let cutoff = timestamp - Duration::seconds(window_secs);

        let mut entry = self.events.entry(key).or_default();
        entry.push(TargetingEvent {
            timestamp,
            attacker_id: attacker_id.to_string(),
            base_score,
        });
        entry.retain(|e| e.timestamp >= cutoff);
        entry.clone()
    }

    /// Retention sweep — drops old events and emptied keys.
    pub fn sweep(&self, cutoff: DateTime<Utc>) {
        let before = self.events.len();
        self.events.retain(|_, evs| {
            evs.retain(|e| e.timestamp >= cutoff);
            !evs.is_empty()
        });
        debug!(
            evicted_keys = before - self.events.len(),
            remaining_keys = self.events.len(),
            "targeting sweep complete"
        );
    }

    pub fn key_count(&self) -> usize {
        self.events.len()
    }
}
