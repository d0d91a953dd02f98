// mobwatch/src/events.rs
//
// Shared domain types flowing through mobwatch.
// Messages arrive already normalized by the upstream transport layer;
// the base abuse score is computed by an external lexicon/ML component
// and travels alongside each message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound message ───────────────────────────────────────────────────────────

/// A normalized group-chat message as delivered by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub text: String,
    /// Sender of the quoted/replied-to message, when this is a reply.
    #[serde(default)]
    pub quoted_sender: Option<String>,
}

// ── Stored record ─────────────────────────────────────────────────────────────

/// A message as kept in group history — immutable once stored,
/// destroyed only by the capacity bound or the retention sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    /// Externally supplied abuse score. > 0 counts as negative,
    /// > 3 counts as harassment-grade.
    pub base_score: f32,
    pub text: String,
    pub quoted_sender: Option<String>,
}

impl MessageRecord {
    pub fn from_message(msg: ChatMessage, base_score: f32) -> Self {
        Self {
            id: msg.id,
            sender: msg.sender,
            timestamp: msg.timestamp,
            base_score,
            text: msg.text,
            quoted_sender: msg.quoted_sender,
        }
    }
}

// ── Per-user activity ─────────────────────────────────────────────────────────

/// One record per user across the process; the most recent group wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    pub group_id: String,
    pub message_count: u64,
    pub last_message_at: DateTime<Utc>,
}

// ── Targeting ledger entry ────────────────────────────────────────────────────

/// One "attacker → target" observation inside the rolling lookback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetingEvent {
    pub timestamp: DateTime<Utc>,
    pub attacker_id: String,
    pub base_score: f32,
}

// ── Scoring output ────────────────────────────────────────────────────────────

/// Per-detector sub-scores for one analyzed message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PatternBreakdown {
    pub pile_on: u32,
    pub velocity: u32,
    pub silencing: u32,
    pub targeting: u32,
}

impl PatternBreakdown {
    pub fn total(&self) -> u32 {
        self.pile_on + self.velocity + self.silencing + self.targeting
    }
}

/// Snapshot statistics over the trailing 15 minutes of group history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternSnapshot {
    pub messages: usize,
    pub negative: usize,
    pub distinct_senders: usize,
    pub avg_base_score: f32,
}

/// Result of scoring one message. Transient — never persisted.
/// The total is the raw additive sum of the four sub-scores (0–29);
/// callers interpret the sum, not a normalized probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalScore {
    pub group_id: String,
    pub message_id: String,
    pub temporal_score: u32,
    pub breakdown: PatternBreakdown,
    pub patterns: PatternSnapshot,
    pub timestamp: DateTime<Utc>,
}

// ── Reporting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// On-demand windowed summary for one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub group_id: String,
    pub total_messages: usize,
    pub negative_messages: usize,
    pub negative_percentage: f32,
    /// Top senders of harassment-grade messages, highest frequency first.
    pub top_senders: Vec<(String, u32)>,
    /// Top resolved targets of harassment-grade messages.
    pub top_targets: Vec<(String, u32)>,
    pub severity: Severity,
    pub generated_at: DateTime<Utc>,
}

// ── Context extraction ────────────────────────────────────────────────────────

/// Messages around a given message id, for downstream deep inspection.
/// An unknown id yields the default (empty/absent) window, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextWindow {
    pub before: Vec<MessageRecord>,
    pub current: Option<MessageRecord>,
    pub after: Vec<MessageRecord>,
}
