// mobwatch/src/engine/mod.rs
//
// TemporalEngine — the orchestration layer tying the message store,
// activity tracker, targeting ledger and the four detectors together.
//
// Contract with the caller (the surrounding moderation system):
//   - analyze() is called once per inbound message, in arrival order
//     per group; calls for different groups may run fully in parallel.
//   - analyze(), report() and context() are infallible — unknown keys
//     are created or yield empty results, never errors.
//   - Duplicate ingestion is the caller's responsibility; the engine
//     does not deduplicate.
//
// Detector order is load-bearing: the message is stored first, the
// three read-only detectors run over the stored window, and targeting
// runs last because it writes the ledger entry for this message. The
// sender's activity record is touched only after the detectors, so a
// silencing check never sees the current sender as "just active".

pub mod context;
pub mod report;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::detectors::{pile_on, silencing, targeting, velocity};
use crate::events::{
    ChatMessage, ContextWindow, GroupReport, MessageRecord, PatternBreakdown, PatternSnapshot,
    TemporalScore,
};
use crate::resolver::{MentionResolver, TargetResolver};
use crate::state::{ActivityTracker, MessageStore, TargetingLedger};

pub struct TemporalEngine {
    config: EngineConfig,
    history: MessageStore,
    activity: ActivityTracker,
    targeting: TargetingLedger,
    resolver: Arc<dyn TargetResolver>,
    messages_scored: AtomicU64,
}

/// Point-in-time counters for the stats loop.
#[derive(Debug, Clone, Copy)]
pub struct EngineStats {
    pub messages_scored: u64,
    pub groups: usize,
    pub tracked_users: usize,
    pub targeting_keys: usize,
}

impl TemporalEngine {
    pub fn new(config: EngineConfig) -> Self {
        let resolver = Arc::new(MentionResolver::new(config.max_scan_bytes));
        Self::with_resolver(config, resolver)
    }

    /// Inject a custom target-resolution heuristic.
    pub fn with_resolver(config: EngineConfig, resolver: Arc<dyn TargetResolver>) -> Self {
        Self {
            history: MessageStore::new(config.history_capacity),
            activity: ActivityTracker::new(),
            targeting: TargetingLedger::new(),
            resolver,
            messages_scored: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Scoring ───────────────────────────────────────────────────────────────

    /// Score one inbound message against the group's recent history.
    pub fn analyze(&self, group_id: &str, message: ChatMessage, base_score: f32) -> TemporalScore {
        let record = MessageRecord::from_message(message, base_score);
        let message_id = record.id.clone();
        let sender = record.sender.clone();
        let msg_ts = record.timestamp;
        let now = Utc::now();

        // 1. Store — every later read includes the current message.
        self.history.record(group_id, record.clone());

        // 2. Detectors, fixed order.
        let short_window = self.history.recent(group_id, self.config.pile_on.window_secs);
        let pile_on = pile_on::score(&short_window, self.resolver.as_ref(), &self.config.pile_on);

        let velocity_window = self.history.recent(group_id, self.config.velocity.window_secs);
        let velocity = velocity::score(&velocity_window, &self.config.velocity);

        let long_window = self.history.recent(group_id, self.config.silencing.window_secs);
        let silencing = silencing::score(
            &long_window,
            &self.activity,
            self.resolver.as_ref(),
            &self.config.silencing,
            now,
        );

        let targeting = targeting::score(
            &record,
            group_id,
            &self.targeting,
            self.resolver.as_ref(),
            &self.config.targeting,
        );

        // 3. Activity update for the sender — after the detectors.
        self.activity.touch(&sender, group_id, msg_ts);

        // 4. Aggregate + snapshot.
        let breakdown = PatternBreakdown {
            pile_on,
            velocity,
            silencing,
            targeting,
        };
        let patterns = self.snapshot(group_id);
        self.messages_scored.fetch_add(1, Ordering::Relaxed);

        let temporal_score = breakdown.total();
        if temporal_score > 0 {
            debug!(
                group = group_id,
                message = %message_id,
                score = temporal_score,
                pile_on, velocity, silencing, targeting,
                "temporal signal"
            );
        }

        TemporalScore {
            group_id: group_id.to_string(),
            message_id,
            temporal_score,
            breakdown,
            patterns,
            timestamp: now,
        }
    }

    fn snapshot(&self, group_id: &str) -> PatternSnapshot {
        let window = self
            .history
            .recent(group_id, self.config.snapshot_window_secs);
        let messages = window.len();
        let negative = window.iter().filter(|m| m.base_score > 0.0).count();
        let distinct_senders = window
            .iter()
            .map(|m| m.sender.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        let avg_base_score = if messages > 0 {
            window.iter().map(|m| m.base_score).sum::<f32>() / messages as f32
        } else {
            0.0
        };
        PatternSnapshot {
            messages,
            negative,
            distinct_senders,
            avg_base_score,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Messages around `message_id`, up to `radius` on each side.
    pub fn context(&self, group_id: &str, message_id: &str, radius: usize) -> ContextWindow {
        let history = self.history.all(group_id);
        context::window(&history, message_id, radius)
    }

    /// Windowed summary of one group over the trailing `range_secs`.
    pub fn report(&self, group_id: &str, range_secs: i64) -> GroupReport {
        let window = self.history.recent(group_id, range_secs);
        report::generate(
            group_id,
            &window,
            self.resolver.as_ref(),
            self.config.silencing.harassment_floor,
            &self.config.report,
        )
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            messages_scored: self.messages_scored.load(Ordering::Relaxed),
            groups: self.history.group_count(),
            tracked_users: self.activity.user_count(),
            targeting_keys: self.targeting.key_count(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Evict everything older than the retention horizon. Takes per-key
    /// locks only; concurrent analyze() calls proceed group by group.
    pub fn sweep(&self) {
        let cutoff = Utc::now() - Duration::seconds(self.config.retention_secs);
        self.history.sweep(cutoff);
        self.targeting.sweep(cutoff);
        if self.config.sweep_activity {
            self.activity.sweep(cutoff);
        }
        info!(
            groups = self.history.group_count(),
            targeting_keys = self.targeting.key_count(),
            tracked_users = self.activity.user_count(),
            "retention sweep complete"
        );
    }

    /// Test hook — run the sweep immediately instead of on the interval.
    pub fn force_cleanup(&self) {
        self.sweep();
    }

    /// Periodic retention sweep; spawn once alongside the feed.
    pub async fn housekeeping_loop(self: Arc<Self>) {
        let period = tokio::time::Duration::from_secs(self.config.sweep_interval_secs as u64);
        loop {
            tokio::time::sleep(period).await;
            self.sweep();
        }
    }
}
