// mobwatch/src/resolver.rs
//
// Target resolution — deciding who a message is aimed at.
//
// Quoted replies are authoritative: the author of the quoted message is
// the target. Otherwise we fall back to a permissive in-text mention
// heuristic (`@` followed by a decimal digit run, the user-id shape the
// transport layer emits). The heuristic is deliberately behind a trait
// so it can be swapped without touching detector logic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::events::MessageRecord;

static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\d+)").unwrap());

/// Resolves the target user of a message, if any. Messages with no
/// resolvable target carry no targeting signal — never an error.
pub trait TargetResolver: Send + Sync {
    fn resolve(&self, msg: &MessageRecord) -> Option<String>;
}

/// Default heuristic: quoted-reply sender, else first `@digits` mention.
pub struct MentionResolver {
    max_scan_bytes: usize,
}

impl MentionResolver {
    pub fn new(max_scan_bytes: usize) -> Self {
        Self { max_scan_bytes }
    }
}

impl TargetResolver for MentionResolver {
    fn resolve(&self, msg: &MessageRecord) -> Option<String> {
        if let Some(quoted) = msg.quoted_sender.as_deref() {
            if !quoted.is_empty() {
                return Some(quoted.to_string());
            }
        }

        // Bound the scan so pathological text can't make matching expensive.
        let text = clamp_utf8(&msg.text, self.max_scan_bytes);
        RE_MENTION
            .captures(text)
            .map(|caps| caps[1].to_string())
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 sequence.
fn clamp_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
