// Engine-level behavior: capacity bound, retention sweep, context
// extraction, report aggregation and severity boundaries.

use chrono::{Duration, Utc};
use mobwatch::{ChatMessage, EngineConfig, Severity, TemporalEngine};

const DAY_SECS: i64 = 24 * 60 * 60;

fn msg(id: &str, sender: &str, text: &str, secs_ago: i64) -> ChatMessage {
    ChatMessage {
        id: id.into(),
        sender: sender.into(),
        timestamp: Utc::now() - Duration::seconds(secs_ago),
        text: text.into(),
        quoted_sender: None,
    }
}

#[test]
fn history_never_exceeds_capacity() {
    let config = EngineConfig {
        history_capacity: 10,
        ..Default::default()
    };
    let engine = TemporalEngine::new(config);

    for i in 0..50 {
        engine.analyze("g", msg(&format!("m{i}"), "u", "hi", 0), 0.0);
    }

    let report = engine.report("g", DAY_SECS);
    assert_eq!(report.total_messages, 10);

    // only the newest 10 survive the ring buffer
    assert!(engine.context("g", "m39", 1).current.is_none());
    assert!(engine.context("g", "m49", 1).current.is_some());
}

#[test]
fn sweep_evicts_expired_groups_and_keys() {
    let engine = TemporalEngine::new(EngineConfig::default());

    engine.analyze("stale", msg("old", "u1", "@42 old attack", 25 * 60 * 60), 4.0);
    engine.analyze("live", msg("new", "u2", "hi", 10), 0.0);
    assert_eq!(engine.stats().groups, 2);
    assert_eq!(engine.stats().targeting_keys, 1);

    engine.force_cleanup();

    let s = engine.stats();
    assert_eq!(s.groups, 1);
    assert_eq!(s.targeting_keys, 0);
    assert!(engine.context("stale", "old", 3).current.is_none());
    assert!(engine.context("live", "new", 3).current.is_some());
}

#[test]
fn activity_sweep_is_configurable() {
    // default: stale users evicted alongside history
    let engine = TemporalEngine::new(EngineConfig::default());
    engine.analyze("g", msg("old", "ghost", "hi", 25 * 60 * 60), 0.0);
    engine.force_cleanup();
    assert_eq!(engine.stats().tracked_users, 0);

    // reference behavior: activity records are never evicted
    let config = EngineConfig {
        sweep_activity: false,
        ..Default::default()
    };
    let engine = TemporalEngine::new(config);
    engine.analyze("g", msg("old", "ghost", "hi", 25 * 60 * 60), 0.0);
    engine.force_cleanup();
    assert_eq!(engine.stats().tracked_users, 1);
}

#[test]
fn context_window_slices_around_the_message() {
    let engine = TemporalEngine::new(EngineConfig::default());
    for i in 0..10 {
        engine.analyze("g", msg(&format!("m{i}"), "u", "hi", 100 - i), 0.0);
    }

    let w = engine.context("g", "m5", 2);
    assert_eq!(
        w.before.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        vec!["m3", "m4"]
    );
    assert_eq!(w.current.unwrap().id, "m5");
    assert_eq!(
        w.after.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        vec!["m6", "m7"]
    );

    let w = engine.context("g", "unknown", 5);
    assert!(w.before.is_empty());
    assert!(w.current.is_none());
    assert!(w.after.is_empty());

    // unknown group behaves like an unknown id
    let w = engine.context("nowhere", "m5", 5);
    assert!(w.current.is_none());
}

#[test]
fn report_severity_boundaries_are_strict() {
    // 20 messages with n negative → ratio n/20
    let cases = [
        (1, Severity::Low),      // 0.05 — on the boundary, stays LOW
        (3, Severity::Medium),   // 0.15 — stays MEDIUM
        (6, Severity::High),     // 0.30 — stays HIGH
        (7, Severity::Critical), // 0.35
    ];
    for (negative, expected) in cases {
        let engine = TemporalEngine::new(EngineConfig::default());
        for i in 0..20 {
            let base = if i < negative { 1.0 } else { 0.0 };
            engine.analyze("g", msg(&format!("m{i}"), "u", "hi", 60), base);
        }
        let report = engine.report("g", DAY_SECS);
        assert_eq!(report.severity, expected, "negative={negative}");
    }
}

#[test]
fn report_ranks_harassers_and_targets() {
    let engine = TemporalEngine::new(EngineConfig::default());
    let g = "g";

    engine.analyze(g, msg("a1", "bully1", "@42 x", 50), 4.0);
    engine.analyze(g, msg("a2", "bully1", "@42 y", 40), 4.5);
    engine.analyze(g, msg("a3", "bully2", "@77 z", 30), 4.0);
    engine.analyze(g, msg("n1", "calm", "nice day", 20), 0.0);
    // negative but not harassment-grade — excluded from the top lists
    engine.analyze(g, msg("n2", "grump", "@42 meh", 10), 2.0);

    let report = engine.report(g, DAY_SECS);
    assert_eq!(report.total_messages, 5);
    assert_eq!(report.negative_messages, 4);
    assert_eq!(report.top_senders[0], ("bully1".to_string(), 2));
    assert_eq!(report.top_senders[1], ("bully2".to_string(), 1));
    assert_eq!(report.top_targets[0], ("42".to_string(), 2));
    assert_eq!(report.top_targets[1], ("77".to_string(), 1));
}

#[test]
fn report_on_unknown_group_is_empty_and_low() {
    let engine = TemporalEngine::new(EngineConfig::default());
    let report = engine.report("nowhere", DAY_SECS);
    assert_eq!(report.total_messages, 0);
    assert_eq!(report.negative_percentage, 0.0);
    assert_eq!(report.severity, Severity::Low);
    assert!(report.top_senders.is_empty());
}

#[test]
fn analyze_is_not_idempotent() {
    let engine = TemporalEngine::new(EngineConfig::default());
    let m = msg("dup", "u", "hi", 0);
    engine.analyze("g", m.clone(), 0.0);
    engine.analyze("g", m, 0.0);

    // duplicate ingestion is the caller's responsibility
    let report = engine.report("g", DAY_SECS);
    assert_eq!(report.total_messages, 2);
    let a = engine.stats();
    assert_eq!(a.messages_scored, 2);
}

#[test]
fn snapshot_reflects_the_recent_window() {
    let engine = TemporalEngine::new(EngineConfig::default());
    engine.analyze("g", msg("m0", "u1", "hi", 60), 0.0);
    engine.analyze("g", msg("m1", "u2", "hi", 50), 2.0);
    // outside the 15-minute snapshot window
    engine.analyze("g", msg("m2", "u3", "hi", 20 * 60), 4.0);
    let s = engine.analyze("g", msg("m3", "u1", "hi", 0), 1.0);

    assert_eq!(s.patterns.messages, 3);
    assert_eq!(s.patterns.negative, 2);
    assert_eq!(s.patterns.distinct_senders, 2);
    assert!((s.patterns.avg_base_score - 1.0).abs() < 1e-6);
}
