use crate::domain::{DEFAULT_LEVEL, LogEvent};
use crate::error::RelayError;
use crate::pipeline::queue::EventSender;
use serde_json::{Map, Value};

/// Decode one inbound payload into a [`LogEvent`].
///
/// The payload must be a JSON object. `level` is used when it is a number
/// (fractions are truncated), `msg` when it is a string; anything else falls
/// back to the defaults. Attribution comes only from the arguments.
pub fn parse_event(
    payload: &[u8],
    source_ip: &str,
    identity: &str,
) -> Result<LogEvent, RelayError> {
    let document: Map<String, Value> = serde_json::from_slice(payload)?;

    let level = document
        .get("level")
        .and_then(Value::as_f64)
        .map_or(DEFAULT_LEVEL, |level| level as i64);
    let message = document
        .get("msg")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(LogEvent::new(level, message, source_ip, identity))
}

/// Parse a payload and push it onto the queue without waiting.
///
/// Returns `InvalidPayload` for undecodable input and `QueueFull` when the
/// event was shed; in both cases nothing is queued.
pub fn parse_and_submit(
    queue: &EventSender,
    payload: &[u8],
    source_ip: &str,
    identity: &str,
) -> Result<(), RelayError> {
    let event = parse_event(payload, source_ip, identity)?;
    queue.try_enqueue(event)
}
