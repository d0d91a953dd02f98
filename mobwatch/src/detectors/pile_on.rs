// mobwatch/src/detectors/pile_on.rs
//
// Pile-on detection — several distinct senders converging on one
// target inside a short window. What matters is the breadth of the
// mob, not the volume: ten messages from one attacker score nothing
// here (that is the targeting detector's job).

use std::collections::{HashMap, HashSet};

use crate::config::PileOnConfig;
use crate::events::MessageRecord;
use crate::resolver::TargetResolver;

/// Score the window: 0 below `small_mob` distinct attackers on the
/// worst-hit target, `small_score` up to `large_mob`, `large_score` above.
pub fn score(window: &[MessageRecord], resolver: &dyn TargetResolver, cfg: &PileOnConfig) -> u32 {
    if window.len() < cfg.min_messages {
        return 0;
    }

    let mut attackers: HashMap<String, HashSet<&str>> = HashMap::new();
    for msg in window {
        if let Some(target) = resolver.resolve(msg) {
            attackers.entry(target).or_default().insert(&msg.sender);
        }
    }

    let max_attackers = attackers.values().map(|s| s.len()).max().unwrap_or(0);
    if max_attackers >= cfg.large_mob {
        cfg.large_score
    } else if max_attackers >= cfg.small_mob {
        cfg.small_score
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MentionResolver;
    use chrono::Utc;

    fn reply(sender: &str, target: &str) -> MessageRecord {
        MessageRecord {
            id: format!("{sender}-{target}"),
            sender: sender.into(),
            timestamp: Utc::now(),
            base_score: 2.0,
            text: "typical".into(),
            quoted_sender: Some(target.into()),
        }
    }

    #[test]
    fn breadth_of_mob_sets_the_score() {
        let resolver = MentionResolver::new(4096);
        let cfg = PileOnConfig::default();

        let two: Vec<_> = ["a", "b", "a"].iter().map(|s| reply(s, "42")).collect();
        assert_eq!(score(&two, &resolver, &cfg), 0);

        let three: Vec<_> = ["a", "b", "c"].iter().map(|s| reply(s, "42")).collect();
        assert_eq!(score(&three, &resolver, &cfg), 5);

        let five: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|s| reply(s, "42")).collect();
        assert_eq!(score(&five, &resolver, &cfg), 10);
    }

    #[test]
    fn attackers_split_across_targets_do_not_pool() {
        let resolver = MentionResolver::new(4096);
        let cfg = PileOnConfig::default();
        let split = vec![reply("a", "42"), reply("b", "42"), reply("c", "77")];
        assert_eq!(score(&split, &resolver, &cfg), 0);
    }

    #[test]
    fn too_few_messages_skips_the_detector() {
        let resolver = MentionResolver::new(4096);
        let cfg = PileOnConfig::default();
        let two = vec![reply("a", "42"), reply("b", "42")];
        assert_eq!(score(&two, &resolver, &cfg), 0);
    }
}
