// mobwatch/src/detectors/velocity.rs
//
// Message-velocity spike detection — an abnormal burst weighted by how
// many messages carry a negative base score. Two independent tiers,
// surge checked first; both legs of a tier must hold simultaneously.

use crate::config::VelocityConfig;
use crate::events::MessageRecord;

pub fn score(window: &[MessageRecord], cfg: &VelocityConfig) -> u32 {
    let total = window.len();
    let negative = window.iter().filter(|m| m.base_score > 0.0).count();

    if total >= cfg.surge_total && negative >= cfg.surge_negative {
        cfg.surge_score
    } else if total >= cfg.burst_total && negative >= cfg.burst_negative {
        cfg.burst_score
    } else {
        0
    }
}
