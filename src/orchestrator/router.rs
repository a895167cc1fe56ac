//! Router - Follow-up action selection
//!
//! Picks at most one follow-up call from the decision service's
//! classification: urgent situations look for calendar slots, everything
//! else scans the mailbox for meeting threads.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::agent::Parameters;
use crate::tools::{is_falsy, ToolCall};

pub const CALENDAR_TASK: &str = "calendar.get_events";
pub const EMAIL_TASK: &str = "gmail.search_emails";

const URGENT_LEVELS: &[&str] = &["high", "urgent"];
const CALENDAR_WINDOW_DAYS: i64 = 7;
const CALENDAR_MAX_RESULTS: u64 = 50;
const EMAIL_QUERY: &str = "meeting";
const EMAIL_MAX_RESULTS: u64 = 20;

/// Suggest the follow-up call for a decision-analysis response.
///
/// Reads `result.urgencyLevel` (or top-level `urgencyLevel` when `result` is
/// missing or empty). Returns `None` when the inspected value is not an
/// object.
pub fn suggest_next_action(decision: &Value, now: DateTime<Utc>) -> Option<ToolCall> {
    let result = match decision.get("result") {
        Some(inner) if !is_falsy(inner) => inner,
        _ => decision,
    };
    let fields = result.as_object()?;

    let urgent = fields
        .get("urgencyLevel")
        .and_then(Value::as_str)
        .map(|level| URGENT_LEVELS.contains(&level.to_lowercase().as_str()))
        .unwrap_or(false);

    let call = if urgent {
        ToolCall::new(
            CALENDAR_TASK,
            params(json!({
                "timeMin": iso_seconds(now),
                "timeMax": iso_seconds(now + Duration::days(CALENDAR_WINDOW_DAYS)),
                "maxResults": CALENDAR_MAX_RESULTS,
            })),
        )
    } else {
        ToolCall::new(
            EMAIL_TASK,
            params(json!({ "query": EMAIL_QUERY, "maxResults": EMAIL_MAX_RESULTS })),
        )
    };
    Some(call)
}

/// UTC timestamp at seconds precision with a trailing `Z`.
pub fn iso_seconds(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        _ => Parameters::new(),
    }
}
