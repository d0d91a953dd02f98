// mobwatch/src/engine/context.rs
//
// Context window extraction — the slice of history around one message
// id, handed to downstream deep inspection (human review, an LLM pass)
// before escalation. Linear scan; history is capacity-bounded.

use crate::events::{ContextWindow, MessageRecord};

/// `radius` bounds the number of messages on each side, clipped to the
/// history boundaries. An unknown id yields the empty/absent window.
pub fn window(history: &[MessageRecord], message_id: &str, radius: usize) -> ContextWindow {
    let Some(idx) = history.iter().position(|m| m.id == message_id) else {
        return ContextWindow::default();
    };

    let start = idx.saturating_sub(radius);
    let end = (idx + 1 + radius).min(history.len());

    ContextWindow {
        before: history[start..idx].to_vec(),
        current: Some(history[idx].clone()),
        after: history[idx + 1..end].to_vec(),
    }
}
