//! Inbound message decoding for the map bridge

use serde_json::Value;

use lmap_core::prelude::*;
use lmap_core::BridgeMessage;

/// Discriminators the host understands
const KNOWN_TYPES: &[&str] = &[
    "mapReady",
    "placeSelect",
    "locationSelect",
    "placeDetails",
    "searchResult",
    "error",
];

/// Parses one inbound payload from the map runtime.
///
/// The payload must be a JSON object carrying a known `type` discriminator
/// and well-typed fields for that kind. Anything else is a protocol error;
/// callers log and drop it rather than letting it cross the boundary.
pub fn parse_bridge_message(payload: &str) -> Result<BridgeMessage> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(Error::protocol("empty payload"));
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| Error::protocol(format!("undecodable payload: {e}")))?;

    let kind = match &value {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => return Err(Error::protocol("discriminator 'type' is not a string")),
            None => return Err(Error::protocol("missing discriminator 'type'")),
        },
        _ => return Err(Error::protocol("payload is not a JSON object")),
    };

    if !KNOWN_TYPES.contains(&kind.as_str()) {
        return Err(Error::protocol(format!("unknown message type '{kind}'")));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::protocol(format!("invalid '{kind}' payload: {e}")))
}

/// Short summary of a payload for log lines
pub fn summarize(payload: &str) -> String {
    const MAX: usize = 120;
    let trimmed = payload.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX).collect();
        format!("{head}…")
    }
}
