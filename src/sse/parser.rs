//! Record parsing: one framed record into a `RawEvent`.
//!
//! Parsing never fails. A line sets the event name (`event:`) or appends
//! payload text (`data:`); every other line, including comments starting
//! with `':'`, is skipped so that servers can add metadata fields without
//! breaking older clients.

use crate::sse::events::{RawEvent, DEFAULT_EVENT_NAME};
use crate::sse::framer::SseRecord;

/// Parse one record into an event name and payload.
///
/// Multiple `data:` lines are joined with `'\n'`, preserving multi-line
/// payloads. A record with no `event:` line gets the name `"message"`.
pub fn parse_record(record: &SseRecord) -> RawEvent {
    let mut name: Option<String> = None;
    let mut data: Vec<&str> = Vec::new();

    for line in &record.lines {
        if let Some(rest) = line.strip_prefix("event:") {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data.push(rest.trim());
        }
    }

    RawEvent {
        name: name.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
        data: data.join("\n"),
    }
}
