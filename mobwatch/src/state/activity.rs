// mobwatch/src/state/activity.rs
//
// Last-seen / message-count tracking per user, process-wide.
// Used only for inference ("was this user active, and have they gone
// quiet") — never for authorization. A user active in several groups
// keeps only the most recent group's record.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::events::UserActivity;

#[derive(Default)]
pub struct ActivityTracker {
    users: DashMap<String, UserActivity>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter and overwrite last-seen group/time.
    pub fn touch(&self, user_id: &str, group_id: &str, timestamp: DateTime<Utc>) {
        self.users
            .entry(user_id.to_string())
            .and_modify(|a| {
                a.message_count += 1;
                a.group_id = group_id.to_string();
                a.last_message_at = timestamp;
            })
            .or_insert_with(|| UserActivity {
                group_id: group_id.to_string(),
                message_count: 1,
                last_message_at: timestamp,
            });
    }

    pub fn get(&self, user_id: &str) -> Option<UserActivity> {
        self.users.get(user_id).map(|a| a.clone())
    }

    /// Evict records whose last message predates the cutoff.
    pub fn sweep(&self, cutoff: DateTime<Utc>) {
        let before = self.users.len();
        self.users.retain(|_, a| a.last_message_at >= cutoff);
        debug!(
            evicted = before - self.users.len(),
            remaining = self.users.len(),
            "activity sweep complete"
        );
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
