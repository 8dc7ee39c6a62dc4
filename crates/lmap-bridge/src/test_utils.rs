//! Test utilities for bridge consumers
//!
//! Provides a recording command sender and canned inbound payloads.

use tokio::sync::mpsc;

use super::commands::{CommandSender, MapCommand};

/// Creates a command sender whose scripts can be inspected.
///
/// # Returns
/// The sender and the receiving end of its script channel.
pub fn recording_sender(capacity: usize) -> (CommandSender, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandSender::new(tx), rx)
}

/// Drains every script currently buffered and decodes it.
///
/// Scripts that fail to decode are skipped.
pub fn drain_commands(rx: &mut mpsc::Receiver<String>) -> Vec<MapCommand> {
    let mut commands = Vec::new();
    while let Ok(script) = rx.try_recv() {
        if let Ok(command) = MapCommand::parse(&script) {
            commands.push(command);
        }
    }
    commands
}

/// Inbound `locationSelect` payload
pub fn location_select_payload(latitude: f64, longitude: f64, address: &str) -> String {
    serde_json::json!({
        "type": "locationSelect",
        "latitude": latitude,
        "longitude": longitude,
        "address": address,
    })
    .to_string()
}

/// Inbound `placeSelect` payload with only the required fields
pub fn place_select_payload(place_id: &str, name: &str, latitude: f64, longitude: f64) -> String {
    serde_json::json!({
        "type": "placeSelect",
        "placeId": place_id,
        "name": name,
        "address": format!("{name}, Paris, France"),
        "latitude": latitude,
        "longitude": longitude,
    })
    .to_string()
}
