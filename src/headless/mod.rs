//! Headless mode - NDJSON event output
//!
//! Host engine events and map camera changes are written to stdout as
//! newline-delimited JSON, one event per line. Each event has an "event"
//! field naming its type.
//!
//! # Example Output
//!
//! ```json
//! {"event":"map_ready","ready":true,"timestamp":1704700001000}
//! {"event":"location_phase","phase":"fetching","timestamp":1704700001002}
//! {"event":"camera","latitude":48.8566,"longitude":2.3522,"zoom":13.0,"heading":0.0,"tilt":0.0,"selected_marker":false,"user_marker":false,"timestamp":1704700001003}
//! ```

pub mod commands;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use lmap_app::{EngineEvent, LocationPhase, SearchView};
use lmap_core::{SavedPlace, Selection};
use lmap_sandbox::SandboxSnapshot;

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Map runtime became ready or went away
    MapReady { ready: bool, timestamp: i64 },

    /// Current selection replaced or cleared
    Selection {
        selection: Option<Selection>,
        timestamp: i64,
    },

    /// What the search panel would show
    Search {
        view: SearchView,
        error: Option<String>,
        no_results: bool,
        timestamp: i64,
    },

    SavedPlaces {
        places: Vec<SavedPlace>,
        timestamp: i64,
    },

    LocationPhase {
        phase: LocationPhase,
        timestamp: i64,
    },

    UserLocation {
        latitude: f64,
        longitude: f64,
        timestamp: i64,
    },

    /// Map camera or markers changed inside the runtime
    Camera {
        latitude: f64,
        longitude: f64,
        zoom: f64,
        heading: f64,
        tilt: f64,
        selected_marker: bool,
        user_marker: bool,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    /// Engine stopped
    Stopped { timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // Write to stdout with newline (NDJSON format)
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn from_engine_event(event: &EngineEvent) -> Self {
        let timestamp = Self::now();
        match event.clone() {
            EngineEvent::MapReadyChanged { ready } => Self::MapReady { ready, timestamp },
            EngineEvent::RuntimeError { message } => Self::Error {
                message,
                fatal: false,
                timestamp,
            },
            EngineEvent::SelectionChanged { selection } => Self::Selection {
                selection,
                timestamp,
            },
            EngineEvent::SavedPlacesChanged { places } => Self::SavedPlaces { places, timestamp },
            EngineEvent::SearchChanged {
                view,
                error,
                no_results,
            } => Self::Search {
                view,
                error,
                no_results,
                timestamp,
            },
            EngineEvent::LocationPhaseChanged { phase } => Self::LocationPhase { phase, timestamp },
            EngineEvent::UserLocationChanged { location } => Self::UserLocation {
                latitude: location.latitude,
                longitude: location.longitude,
                timestamp,
            },
            EngineEvent::Shutdown => Self::Stopped { timestamp },
        }
    }

    pub fn camera(snapshot: &SandboxSnapshot) -> Self {
        Self::Camera {
            latitude: snapshot.camera.center.latitude,
            longitude: snapshot.camera.center.longitude,
            zoom: snapshot.camera.zoom,
            heading: snapshot.camera.heading,
            tilt: snapshot.camera.tilt,
            selected_marker: snapshot.selected_marker.is_some(),
            user_marker: snapshot.user_marker.is_some(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }
}
