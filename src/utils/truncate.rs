//! Truncation Utilities
//!
//! Size caps for values copied into tool-call records. Text truncation keeps
//! a prefix and a suffix and respects UTF-8 boundaries; JSON truncation always
//! yields a value that re-serializes within the byte limit.

use serde_json::{json, Value};

/// Shorten `content` to roughly `max_bytes`, keeping its head and tail.
///
/// The result carries a marker with the number of elided bytes, so it may
/// exceed `max_bytes` by the marker's length.
pub fn truncate_text(content: &str, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content.to_string();
    }

    if max_bytes == 0 {
        return format!("... [{} bytes truncated] ...", content.len());
    }

    let half = max_bytes / 2;
    let mut prefix_end = 0;
    for (idx, c) in content.char_indices() {
        let char_end = idx + c.len_utf8();
        if char_end > half {
            break;
        }
        prefix_end = char_end;
    }

    let suffix_target = content.len().saturating_sub(half);
    let suffix_start = content
        .char_indices()
        .map(|(idx, _)| idx)
        .find(|idx| *idx >= suffix_target)
        .unwrap_or(content.len())
        .max(prefix_end);

    let prefix = &content[..prefix_end];
    let suffix = &content[suffix_start..];
    let truncated_count = content.len() - (prefix.len() + suffix.len());

    format!("{} ... [{} bytes truncated] ... {}", prefix, truncated_count, suffix)
}

/// Keep at most `max_chars` characters of `content`.
pub fn truncate_chars(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}

/// Cap the compact JSON encoding of `value` at `limit` bytes.
///
/// Values that fit are returned unchanged. Larger ones are replaced by
/// `{truncated: true, originalBytes, preview}` where `preview` is a
/// head-and-tail excerpt of the encoding, shrunk until the whole replacement
/// fits. When not even an empty preview fits, the result is `null`.
pub fn truncate_json(value: &Value, limit: usize) -> Value {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(_) => return Value::Null,
    };
    if encoded.len() <= limit {
        return value.clone();
    }

    let mut budget = limit;
    loop {
        let candidate = json!({
            "truncated": true,
            "originalBytes": encoded.len(),
            "preview": truncate_text(&encoded, budget),
        });
        let size = serde_json::to_string(&candidate).map_or(usize::MAX, |s| s.len());
        if size <= limit {
            return candidate;
        }
        if budget == 0 {
            return Value::Null;
        }
        let overshoot = size.saturating_sub(limit).max(1);
        budget = budget.saturating_sub(overshoot);
    }
}
