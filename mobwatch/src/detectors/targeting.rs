// mobwatch/src/detectors/targeting.rs
//
// Repeated-targeting escalation — every resolved attack on the same
// (group, target) key inside the rolling lookback raises the score
// linearly until the cap. The append to the ledger happens here, which
// is why this detector must run after the message is stored and last
// in the detector sequence.

use crate::config::TargetingConfig;
use crate::events::MessageRecord;
use crate::resolver::TargetResolver;
use crate::state::TargetingLedger;

pub fn score(
    record: &MessageRecord,
    group_id: &str,
    ledger: &TargetingLedger,
    resolver: &dyn TargetResolver,
    cfg: &TargetingConfig,
) -> u32 {
    let Some(target) = resolver.resolve(record) else {
        return 0;
    };

    let events = ledger.record(
        group_id,
        &target,
        &record.sender,
        record.timestamp,
        record.base_score,
        cfg.window_secs,
    );
    (events.len() as u32 * cfg.per_event).min(cfg.cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MentionResolver;
    use chrono::Utc;

    fn attack(n: u32) -> MessageRecord {
        MessageRecord {
            id: format!("m{n}"),
            sender: "a1".into(),
            timestamp: Utc::now(),
            base_score: 4.0,
            text: "@42 again".into(),
            quoted_sender: None,
        }
    }

    #[test]
    fn repeat_hits_escalate_to_the_cap() {
        let ledger = TargetingLedger::new();
        let resolver = MentionResolver::new(4096);
        let cfg = TargetingConfig::default();

        let scores: Vec<u32> = (0..4)
            .map(|i| score(&attack(i), "g", &ledger, &resolver, &cfg))
            .collect();
        assert_eq!(scores, vec![3, 6, 9, 9]);
    }

    #[test]
    fn untargeted_message_scores_zero_and_skips_the_ledger() {
        let ledger = TargetingLedger::new();
        let resolver = MentionResolver::new(4096);
        let cfg = TargetingConfig::default();

        let mut msg = attack(0);
        msg.text = "no mention here".into();
        assert_eq!(score(&msg, "g", &ledger, &resolver, &cfg), 0);
        assert_eq!(ledger.key_count(), 0);
    }
}
