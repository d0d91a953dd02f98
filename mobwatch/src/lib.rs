// mobwatch/src/lib.rs
//
// Mobwatch — temporal abuse-pattern detection for group chats.
//
// The engine ingests a live stream of per-group messages (each carrying
// a base abuse score computed upstream), keeps bounded sliding-window
// history, and emits a composite temporal score with a per-pattern
// breakdown: pile-ons, velocity spikes, victim silencing and repeated
// targeting. Everything is in-memory and CPU-bound; a periodic sweep
// evicts data past the retention horizon.

pub mod config;
pub mod detectors;
pub mod engine;
pub mod events;
pub mod resolver;
pub mod state;

pub use config::EngineConfig;
pub use engine::TemporalEngine;
pub use events::{
    ChatMessage, ContextWindow, GroupReport, MessageRecord, PatternBreakdown, PatternSnapshot,
    Severity, TemporalScore,
};
pub use resolver::{MentionResolver, TargetResolver};
