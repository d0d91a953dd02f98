// mobwatch/src/config.rs
//
// All tunable thresholds as named configuration, never inline literals
// in detector logic. Defaults reproduce the reference behavior exactly.
// A config file is plain JSON; every field is optional and falls back
// to its default, then gets clamped by `sanitize` rather than rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ── Window durations (seconds) ────────────────────────────────────────────────

pub const W_5MIN: i64 = 5 * 60;
pub const W_15MIN: i64 = 15 * 60;
pub const W_30MIN: i64 = 30 * 60;
pub const W_24HR: i64 = 24 * 60 * 60;

const SWEEP_INTERVAL: i64 = 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ── Detector sub-configs ──────────────────────────────────────────────────────

/// Pile-on: distinct senders attacking one target within a short window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PileOnConfig {
    pub window_secs: i64,
    /// Skip the detector entirely below this many messages in the window.
    pub min_messages: usize,
    pub small_mob: usize,
    pub large_mob: usize,
    pub small_score: u32,
    pub large_score: u32,
}

impl Default for PileOnConfig {
    fn default() -> Self {
        Self {
            window_secs: W_5MIN,
            min_messages: 3,
            small_mob: 3,
            large_mob: 5,
            small_score: 5,
            large_score: 10,
        }
    }
}

/// Velocity: message-rate burst weighted by negative messages.
/// The surge tier is checked first; both legs of a tier must hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub window_secs: i64,
    pub burst_total: usize,
    pub burst_negative: usize,
    pub burst_score: u32,
    pub surge_total: usize,
    pub surge_negative: usize,
    pub surge_score: u32,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            window_secs: W_5MIN,
            burst_total: 5,
            burst_negative: 3,
            burst_score: 3,
            surge_total: 10,
            surge_negative: 5,
            surge_score: 5,
        }
    }
}

/// Whether silencing awards a flat score at the first qualifying victim
/// (reference behavior) or accumulates across all silenced victims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SilencingPolicy {
    #[default]
    FirstMatch,
    SumAll,
}

/// Victim silencing: a previously active, harassed user going quiet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SilencingConfig {
    pub window_secs: i64,
    pub min_messages: usize,
    /// base_score strictly above this is harassment-grade.
    pub harassment_floor: f32,
    /// message_count strictly above this means "was previously active".
    pub active_floor: u64,
    /// Both quiet intervals must strictly exceed this.
    pub quiet_secs: i64,
    pub score: u32,
    pub policy: SilencingPolicy,
}

impl Default for SilencingConfig {
    fn default() -> Self {
        Self {
            window_secs: W_30MIN,
            min_messages: 5,
            harassment_floor: 3.0,
            active_floor: 5,
            quiet_secs: 10 * 60,
            score: 5,
            policy: SilencingPolicy::FirstMatch,
        }
    }
}

/// Targeted harassment: repeated targeting of one individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    pub window_secs: i64,
    pub per_event: u32,
    pub cap: u32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            window_secs: W_30MIN,
            per_event: 3,
            cap: 9,
        }
    }
}

/// Report severity thresholds on the negative/total ratio, strict `>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub medium_ratio: f32,
    pub high_ratio: f32,
    pub critical_ratio: f32,
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            medium_ratio: 0.05,
            high_ratio: 0.15,
            critical_ratio: 0.30,
            top_n: 5,
        }
    }
}

// ── Engine config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ring-buffer bound per group history.
    pub history_capacity: usize,
    /// Retention horizon for history and targeting data.
    pub retention_secs: i64,
    pub sweep_interval_secs: i64,
    /// Evict user-activity records older than the retention horizon.
    /// Off reproduces the reference behavior of never evicting them.
    pub sweep_activity: bool,
    /// Snapshot statistics window for TemporalScore.patterns.
    pub snapshot_window_secs: i64,
    /// Mention extraction scans at most this many bytes of text.
    pub max_scan_bytes: usize,
    pub pile_on: PileOnConfig,
    pub velocity: VelocityConfig,
    pub silencing: SilencingConfig,
    pub targeting: TargetingConfig,
    pub report: ReportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 500,
            retention_secs: W_24HR,
            sweep_interval_secs: SWEEP_INTERVAL,
            sweep_activity: true,
            snapshot_window_secs: W_15MIN,
            max_scan_bytes: 4096,
            pile_on: PileOnConfig::default(),
            velocity: VelocityConfig::default(),
            silencing: SilencingConfig::default(),
            targeting: TargetingConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        Ok(sanitize(cfg))
    }
}

/// Clamp out-of-range values instead of erroring.
pub fn sanitize(mut cfg: EngineConfig) -> EngineConfig {
    cfg.history_capacity = cfg.history_capacity.max(1);
    cfg.retention_secs = cfg.retention_secs.max(1);
    cfg.sweep_interval_secs = cfg.sweep_interval_secs.max(1);
    cfg.snapshot_window_secs = cfg.snapshot_window_secs.max(1);
    cfg.max_scan_bytes = cfg.max_scan_bytes.max(16);

    cfg.pile_on.window_secs = cfg.pile_on.window_secs.max(1);
    cfg.velocity.window_secs = cfg.velocity.window_secs.max(1);
    cfg.silencing.window_secs = cfg.silencing.window_secs.max(1);
    cfg.silencing.quiet_secs = cfg.silencing.quiet_secs.max(0);
    cfg.targeting.window_secs = cfg.targeting.window_secs.max(1);

    // Mob sizes must stay ordered or the large tier can never fire.
    if cfg.pile_on.large_mob < cfg.pile_on.small_mob {
        cfg.pile_on.large_mob = cfg.pile_on.small_mob;
    }

    cfg.report.top_n = cfg.report.top_n.max(1);
    cfg.report.medium_ratio = cfg.report.medium_ratio.clamp(0.0, 1.0);
    cfg.report.high_ratio = cfg.report.high_ratio.clamp(cfg.report.medium_ratio, 1.0);
    cfg.report.critical_ratio = cfg.report.critical_ratio.clamp(cfg.report.high_ratio, 1.0);

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_reference_thresholds() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.history_capacity, 500);
        assert_eq!(cfg.retention_secs, W_24HR);
        assert_eq!(cfg.pile_on.small_mob, 3);
        assert_eq!(cfg.pile_on.large_score, 10);
        assert_eq!(cfg.velocity.surge_total, 10);
        assert_eq!(cfg.silencing.quiet_secs, 600);
        assert_eq!(cfg.targeting.cap, 9);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let mut cfg = EngineConfig {
            history_capacity: 0,
            retention_secs: -5,
            max_scan_bytes: 0,
            ..Default::default()
        };
        cfg.pile_on.large_mob = 1; // below small_mob
        cfg.report.high_ratio = 0.01; // below medium_ratio

        let cfg = sanitize(cfg);
        assert_eq!(cfg.history_capacity, 1);
        assert_eq!(cfg.retention_secs, 1);
        assert_eq!(cfg.max_scan_bytes, 16);
        assert_eq!(cfg.pile_on.large_mob, cfg.pile_on.small_mob);
        assert!(cfg.report.high_ratio >= cfg.report.medium_ratio);
        assert!(cfg.report.critical_ratio >= cfg.report.high_ratio);
    }
}
