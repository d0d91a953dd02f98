// mobwatch/src/detectors/silencing.rs
//
// Victim-silencing detection — a previously active user who took
// harassment-grade messages and then went quiet. Both gaps must be
// long: the last attack on them AND their own last message have to be
// older than the quiet threshold, otherwise the conversation is simply
// still in motion.
//
// Under the default FirstMatch policy one flat score is awarded per
// call no matter how many victims qualify; SumAll accumulates instead.

use chrono::{DateTime, Duration, Utc};

use crate::config::{SilencingConfig, SilencingPolicy};
use crate::events::MessageRecord;
use crate::resolver::TargetResolver;
use crate::state::ActivityTracker;

pub fn score(
    window: &[MessageRecord],
    activity: &ActivityTracker,
    resolver: &dyn TargetResolver,
    cfg: &SilencingConfig,
    now: DateTime<Utc>,
) -> u32 {
    if window.len() < cfg.min_messages {
        return 0;
    }

    // Distinct harassment targets in first-seen order, each with the
    // timestamp of the latest attack on them. Self-targeting is noise.
    let mut harassed: Vec<(String, DateTime<Utc>)> = Vec::new();
    for msg in window {
        if msg.base_score <= cfg.harassment_floor {
            continue;
        }
        let Some(target) = resolver.resolve(msg) else {
            continue;
        };
        if target == msg.sender {
            continue;
        }
        match harassed.iter_mut().find(|(t, _)| *t == target) {
            Some((_, last_hit)) => {
                if msg.timestamp > *last_hit {
                    *last_hit = msg.timestamp;
                }
            }
            None => harassed.push((target, msg.timestamp)),
        }
    }

    let quiet = Duration::seconds(cfg.quiet_secs);
    let mut total = 0;
    for (target, last_hit) in harassed {
        let Some(act) = activity.get(&target) else {
            continue;
        };
        if act.message_count <= cfg.active_floor {
            continue;
        }
        if now - last_hit > quiet && now - act.last_message_at > quiet {
            total += cfg.score;
            if cfg.policy == SilencingPolicy::FirstMatch {
                return cfg.score;
            }
        }
    }
    total
}
