//! Outbound command encoding for the map runtime
//!
//! Commands are serialized as script invocations of the form
//! `name(arg, ...); true;` with JSON-encoded arguments. They carry no
//! request id and produce no response: delivery is fire-and-forget.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};
use tokio::sync::mpsc;

use lmap_core::prelude::*;
use lmap_core::MapLocation;

/// Global command counter, used only to correlate log lines
static COMMAND_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_command_id() -> u64 {
    COMMAND_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Command injected into the map runtime
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    /// Move the camera, optionally changing zoom
    SetCenter {
        location: MapLocation,
        zoom: Option<f64>,
    },
    /// Create or reposition the user-location marker
    SetUserLocation { location: MapLocation },
    ClearSelectedMarker,
    /// Zero heading and tilt
    ResetHeading,
    /// Recenter at focus zoom and pin a titled selection marker
    GoToPlace { location: MapLocation, name: String },
    ZoomBy { delta: i32 },
    /// Resolve a place and answer with a `placeDetails` message
    FetchPlaceDetails { place_id: String },
}

impl MapCommand {
    pub fn zoom_in() -> Self {
        MapCommand::ZoomBy { delta: 1 }
    }

    pub fn zoom_out() -> Self {
        MapCommand::ZoomBy { delta: -1 }
    }

    /// Function name invoked inside the map runtime
    pub fn function_name(&self) -> &'static str {
        match self {
            MapCommand::SetCenter { .. } => "setCenter",
            MapCommand::SetUserLocation { .. } => "setUserLocation",
            MapCommand::ClearSelectedMarker => "clearSelectedMarker",
            MapCommand::ResetHeading => "resetHeading",
            MapCommand::GoToPlace { .. } => "goToPlace",
            MapCommand::ZoomBy { .. } => "zoomBy",
            MapCommand::FetchPlaceDetails { .. } => "getPlaceDetails",
        }
    }

    fn args(&self) -> Vec<Value> {
        match self {
            MapCommand::SetCenter { location, zoom } => {
                vec![json!(location.latitude), json!(location.longitude), json!(zoom)]
            }
            MapCommand::SetUserLocation { location } => {
                vec![json!(location.latitude), json!(location.longitude)]
            }
            MapCommand::ClearSelectedMarker | MapCommand::ResetHeading => Vec::new(),
            MapCommand::GoToPlace { location, name } => vec![
                json!(location.latitude),
                json!(location.longitude),
                json!(name),
            ],
            MapCommand::ZoomBy { delta } => vec![json!(delta)],
            MapCommand::FetchPlaceDetails { place_id } => vec![json!(place_id)],
        }
    }

    /// Build the script invocation string
    pub fn build(&self) -> String {
        let args = self
            .args()
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}); true;", self.function_name(), args)
    }

    /// Decode a script invocation produced by [`MapCommand::build`]
    pub fn parse(script: &str) -> Result<Self> {
        let call = script
            .trim()
            .trim_end_matches("true;")
            .trim()
            .trim_end_matches(';')
            .trim();

        let open = call
            .find('(')
            .ok_or_else(|| Error::command(format!("not an invocation: {call}")))?;
        if !call.ends_with(')') {
            return Err(Error::command(format!("unterminated invocation: {call}")));
        }

        let name = call[..open].trim();
        let inner = &call[open + 1..call.len() - 1];
        let args: Vec<Value> = serde_json::from_str(&format!("[{inner}]"))
            .map_err(|e| Error::command(format!("bad arguments for {name}: {e}")))?;

        let command = match (name, args.as_slice()) {
            ("setCenter", [lat, lng]) => MapCommand::SetCenter {
                location: location_arg(name, lat, lng)?,
                zoom: None,
            },
            ("setCenter", [lat, lng, zoom]) => MapCommand::SetCenter {
                location: location_arg(name, lat, lng)?,
                zoom: match zoom {
                    Value::Null => None,
                    other => Some(number_arg(name, other)?),
                },
            },
            ("setUserLocation", [lat, lng]) => MapCommand::SetUserLocation {
                location: location_arg(name, lat, lng)?,
            },
            ("clearSelectedMarker", []) => MapCommand::ClearSelectedMarker,
            ("resetHeading", []) => MapCommand::ResetHeading,
            ("goToPlace", [lat, lng, title]) => MapCommand::GoToPlace {
                location: location_arg(name, lat, lng)?,
                name: string_arg(name, title)?,
            },
            ("zoomBy", [delta]) => MapCommand::ZoomBy {
                delta: delta
                    .as_i64()
                    .and_then(|d| i32::try_from(d).ok())
                    .ok_or_else(|| Error::command("zoomBy expects an integer"))?,
            },
            ("getPlaceDetails", [place_id]) => MapCommand::FetchPlaceDetails {
                place_id: string_arg(name, place_id)?,
            },
            _ => {
                return Err(Error::command(format!(
                    "unknown invocation {name} with {} argument(s)",
                    args.len()
                )))
            }
        };

        Ok(command)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            MapCommand::SetCenter { .. } => "set center",
            MapCommand::SetUserLocation { .. } => "set user location",
            MapCommand::ClearSelectedMarker => "clear selected marker",
            MapCommand::ResetHeading => "reset heading",
            MapCommand::GoToPlace { .. } => "go to place",
            MapCommand::ZoomBy { .. } => "zoom",
            MapCommand::FetchPlaceDetails { .. } => "fetch place details",
        }
    }
}

fn number_arg(name: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::command(format!("{name} expects numeric arguments")))
}

fn string_arg(name: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::command(format!("{name} expects a string argument")))
}

fn location_arg(name: &str, lat: &Value, lng: &Value) -> Result<MapLocation> {
    Ok(MapLocation::new(number_arg(name, lat)?, number_arg(name, lng)?))
}

/// Sends commands into the map runtime without waiting for any effect
#[derive(Clone)]
pub struct CommandSender {
    /// Channel feeding the bridge writer task
    script_tx: mpsc::Sender<String>,
}

impl std::fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSender")
            .field("script_tx", &"<channel>")
            .finish()
    }
}

impl CommandSender {
    pub fn new(script_tx: mpsc::Sender<String>) -> Self {
        Self { script_tx }
    }

    /// Create a CommandSender for testing (uses a dummy channel)
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn new_for_test() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self { script_tx: tx }
    }

    /// Send a fire-and-forget command
    pub async fn send(&self, command: MapCommand) -> Result<()> {
        let id = next_command_id();
        let script = command.build();

        debug!("Sending command #{}: {} ({})", id, command.description(), script);

        self.script_tx
            .send(script)
            .await
            .map_err(|_| Error::channel_send("map bridge"))
    }

    /// Send several commands in order
    pub async fn send_all(&self, commands: impl IntoIterator<Item = MapCommand>) -> Result<()> {
        for command in commands {
            self.send(command).await?;
        }
        Ok(())
    }

    /// Whether the bridge writer is gone
    pub fn is_closed(&self) -> bool {
        self.script_tx.is_closed()
    }
}
