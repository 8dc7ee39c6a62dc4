//! Message types for the host (TEA pattern)

use lmap_core::{AutocompleteSuggestion, BridgeEvent, MapLocation, SearchResult};

/// All possible messages in the host
#[derive(Debug, Clone)]
pub enum Message {
    /// Event from the map bridge
    Bridge(BridgeEvent),

    /// Stop the host
    Quit,

    // ─────────────────────────────────────────────────────────
    // Selection & Saved Places
    // ─────────────────────────────────────────────────────────
    /// User dismissed the details panel
    ClearSelection,

    /// Save the current selection
    SaveSelection,

    RemoveSavedPlace { id: String },

    ClearSavedPlaces,

    /// Jump to a saved place and select it
    SelectSavedPlace { id: String },

    /// Saved places changed and should be written through
    SavedPlacesChanged,

    // ─────────────────────────────────────────────────────────
    // Camera Controls
    // ─────────────────────────────────────────────────────────
    ZoomIn,
    ZoomOut,
    ResetHeading,

    // ─────────────────────────────────────────────────────────
    // Location Flow
    // ─────────────────────────────────────────────────────────
    /// "Go to my location", also triggered by `mapReady`
    LocateRequested,

    /// Result of the permission leg
    LocationPermission { granted: bool },

    /// Result of the fix leg
    LocationFixed { location: MapLocation },

    /// The flow failed; resolved silently
    LocationFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Search Pipeline
    // ─────────────────────────────────────────────────────────
    /// Keystroke: the full new query text
    SearchInput { text: String },

    /// Debounce timer fired
    DebounceElapsed { generation: u64 },

    /// Enter key or search button
    SearchSubmit,

    /// Reset query, results, suggestions and error
    ClearSearch,

    SearchCompleted {
        seq: u64,
        result: Result<Vec<SearchResult>, String>,
    },

    AutocompleteCompleted {
        seq: u64,
        result: Result<Vec<AutocompleteSuggestion>, String>,
    },

    SelectSuggestion { index: usize },

    SuggestionResolved {
        seq: u64,
        result: Result<SearchResult, String>,
    },

    SelectResult { index: usize },

    SelectHistory { index: usize },

    /// History changed and should be written through
    HistoryChanged,

    // ─────────────────────────────────────────────────────────
    // Preferences
    // ─────────────────────────────────────────────────────────
    /// `None` deletes the key
    SetApiKey { key: Option<String> },

    /// `None` deletes the map id; rendering mode changes on next start
    SetMapId { map_id: Option<String> },

    SetLocationEnabled { enabled: bool },
}
