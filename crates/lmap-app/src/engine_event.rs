//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`. They describe what changed, so a renderer or the
//! headless runner never has to diff `AppState` itself.

use lmap_core::{MapLocation, SavedPlace, Selection};

use crate::location::LocationPhase;
use crate::search::SearchView;
use crate::state::AppState;

/// Domain events emitted by the Engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Map Runtime
    // ─────────────────────────────────────────────────────────
    /// The map runtime became ready or went away
    MapReadyChanged { ready: bool },

    /// The map runtime reported a fault; nothing in state changed
    RuntimeError { message: String },

    // ─────────────────────────────────────────────────────────
    // Selection & Places
    // ─────────────────────────────────────────────────────────
    SelectionChanged { selection: Option<Selection> },

    SavedPlacesChanged { places: Vec<SavedPlace> },

    // ─────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────
    SearchChanged {
        view: SearchView,
        error: Option<String>,
        no_results: bool,
    },

    // ─────────────────────────────────────────────────────────
    // Location
    // ─────────────────────────────────────────────────────────
    LocationPhaseChanged { phase: LocationPhase },

    UserLocationChanged { location: MapLocation },

    // ─────────────────────────────────────────────────────────
    // Engine Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MapReadyChanged { .. } => "map_ready_changed",
            Self::RuntimeError { .. } => "runtime_error",
            Self::SelectionChanged { .. } => "selection_changed",
            Self::SavedPlacesChanged { .. } => "saved_places_changed",
            Self::SearchChanged { .. } => "search_changed",
            Self::LocationPhaseChanged { .. } => "location_phase_changed",
            Self::UserLocationChanged { .. } => "user_location_changed",
            Self::Shutdown => "shutdown",
        }
    }
}

/// The parts of `AppState` that consumers observe
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StateSnapshot {
    map_ready: bool,
    selection: Option<Selection>,
    saved_places: Vec<SavedPlace>,
    search_view: SearchView,
    search_error: Option<String>,
    no_results: bool,
    location_phase: LocationPhase,
    user_location: Option<MapLocation>,
}

impl StateSnapshot {
    pub(crate) fn capture(state: &AppState) -> Self {
        Self {
            map_ready: state.map_ready,
            selection: state.selection.clone(),
            saved_places: state.saved_places.clone(),
            search_view: state.search.view(),
            search_error: state.search.error.clone(),
            no_results: state.search.no_results,
            location_phase: state.location.phase,
            user_location: state.location.user_location,
        }
    }

    /// Events describing the change from `self` to `after`
    pub(crate) fn diff(&self, after: &StateSnapshot) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if self.map_ready != after.map_ready {
            events.push(EngineEvent::MapReadyChanged {
                ready: after.map_ready,
            });
        }
        if self.selection != after.selection {
            events.push(EngineEvent::SelectionChanged {
                selection: after.selection.clone(),
            });
        }
        if self.saved_places != after.saved_places {
            events.push(EngineEvent::SavedPlacesChanged {
                places: after.saved_places.clone(),
            });
        }
        if self.search_view != after.search_view
            || self.search_error != after.search_error
            || self.no_results != after.no_results
        {
            events.push(EngineEvent::SearchChanged {
                view: after.search_view.clone(),
                error: after.search_error.clone(),
                no_results: after.no_results,
            });
        }
        if self.location_phase != after.location_phase {
            events.push(EngineEvent::LocationPhaseChanged {
                phase: after.location_phase,
            });
        }
        if let Some(location) = after.user_location {
            if self.user_location != after.user_location {
                events.push(EngineEvent::UserLocationChanged { location });
            }
        }

        events
    }
}
