// mobwatch/src/engine/report.rs
//
// Windowed group summary: volume, negativity ratio, the loudest
// harassers and the most-hit targets, and a four-level severity.
// Ties in the top lists keep first-seen order (stable sort over an
// insertion-ordered count — the accepted non-determinism of the
// aggregation is limited to which equal-count id comes first).

use chrono::Utc;

use crate::config::ReportConfig;
use crate::events::{GroupReport, MessageRecord, Severity};
use crate::resolver::TargetResolver;

/// Severity by strict `>` thresholds on the negative/total ratio —
/// a ratio of exactly `critical_ratio` still classifies one tier down.
pub fn classify(ratio: f32, cfg: &ReportConfig) -> Severity {
    if ratio > cfg.critical_ratio {
        Severity::Critical
    } else if ratio > cfg.high_ratio {
        Severity::High
    } else if ratio > cfg.medium_ratio {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn generate(
    group_id: &str,
    window: &[MessageRecord],
    resolver: &dyn TargetResolver,
    harassment_floor: f32,
    cfg: &ReportConfig,
) -> GroupReport {
    let total = window.len();
    let negative = window.iter().filter(|m| m.base_score > 0.0).count();
    let ratio = if total > 0 {
        negative as f32 / total as f32
    } else {
        0.0
    };

    let mut senders: Vec<(String, u32)> = Vec::new();
    let mut targets: Vec<(String, u32)> = Vec::new();
    for msg in window.iter().filter(|m| m.base_score > harassment_floor) {
        bump(&mut senders, &msg.sender);
        if let Some(target) = resolver.resolve(msg) {
            bump(&mut targets, &target);
        }
    }

    GroupReport {
        group_id: group_id.to_string(),
        total_messages: total,
        negative_messages: negative,
        negative_percentage: ratio * 100.0,
        top_senders: top_n(senders, cfg.top_n),
        top_targets: top_n(targets, cfg.top_n),
        severity: classify(ratio, cfg),
        generated_at: Utc::now(),
    }
}

fn bump(counts: &mut Vec<(String, u32)>, id: &str) {
    match counts.iter_mut().find(|(k, _)| k == id) {
        Some((_, n)) => *n += 1,
        None => counts.push((id.to_string(), 1)),
    }
}

fn top_n(mut counts: Vec<(String, u32)>, n: usize) -> Vec<(String, u32)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1)); // stable — ties keep first-seen order
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_boundaries_are_strict() {
        let cfg = ReportConfig::default();
        assert_eq!(classify(0.05, &cfg), Severity::Low);
        assert_eq!(classify(0.051, &cfg), Severity::Medium);
        assert_eq!(classify(0.15, &cfg), Severity::Medium);
        assert_eq!(classify(0.151, &cfg), Severity::High);
        assert_eq!(classify(0.30, &cfg), Severity::High);
        assert_eq!(classify(0.31, &cfg), Severity::Critical);
        assert_eq!(classify(0.0, &cfg), Severity::Low);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let counts = vec![
            ("a".to_string(), 2),
            ("b".to_string(), 3),
            ("c".to_string(), 2),
        ];
        let top = top_n(counts, 2);
        assert_eq!(top, vec![("b".to_string(), 3), ("a".to_string(), 2)]);
    }
}
