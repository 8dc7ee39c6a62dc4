//! Handler module - TEA update function and message handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `bridge`: Reconciliation of inbound bridge messages
//! - `places`: Selection and saved place handlers
//! - `location`: "Go to my location" flow
//! - `search`: Search, autocomplete and history handlers

pub(crate) mod bridge;
pub(crate) mod location;
pub(crate) mod places;
pub(crate) mod search;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use std::time::Duration;

use lmap_bridge::MapCommand;
use lmap_core::{AutocompleteSuggestion, SavedPlace, SearchResult};
use lmap_places::LocationBias;

use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// A preference write
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceUpdate {
    ApiKey(Option<String>),
    MapId(Option<String>),
    LocationEnabled(bool),
}

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Inject commands into the map runtime, in order, without waiting
    SendCommands(Vec<MapCommand>),

    /// Permission leg of the location flow
    RequestLocationPermission,

    /// Fix leg of the location flow, bounded by `timeout`
    FetchLocation { timeout: Duration },

    /// Restart the single debounce timer
    ScheduleAutocomplete { generation: u64, delay: Duration },

    /// Drop the pending debounce timer, if any
    CancelDebounce,

    Autocomplete {
        seq: u64,
        input: String,
        bias: Option<LocationBias>,
    },

    /// Full-text search; cancels any pending debounce first
    TextSearch {
        seq: u64,
        query: String,
        bias: Option<LocationBias>,
    },

    /// Details lookup turning a suggestion into a result
    ResolveSuggestion {
        seq: u64,
        suggestion: AutocompleteSuggestion,
    },

    /// Replace the stored saved places list
    PersistSavedPlaces(Vec<SavedPlace>),

    /// Replace the stored history list
    PersistHistory(Vec<SearchResult>),

    PersistPreference(PreferenceUpdate),
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message
    pub message: Option<Message>,
    /// Optional action for the event loop
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    /// Perform `action`, then continue with `msg`
    pub fn action_then(action: UpdateAction, msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: Some(action),
        }
    }

    pub fn commands(commands: Vec<MapCommand>) -> Self {
        Self::action(UpdateAction::SendCommands(commands))
    }
}
