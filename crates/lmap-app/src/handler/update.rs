//! Main update function - handles state transitions (TEA pattern)

use lmap_bridge::MapCommand;
use lmap_core::prelude::*;

use super::{bridge, location, places, search, PreferenceUpdate, UpdateAction, UpdateResult};
use crate::message::Message;
use crate::state::{AppPhase, AppState};

/// Process a message and update state
/// Returns an optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Bridge(event) => bridge::handle_bridge_event(state, event),

        Message::Quit => {
            state.phase = AppPhase::Quitting;
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Selection & Saved Places
        // ─────────────────────────────────────────────────────────
        Message::ClearSelection => places::handle_clear_selection(state),
        Message::SaveSelection => places::handle_save_selection(state),
        Message::RemoveSavedPlace { id } => places::handle_remove(state, &id),
        Message::ClearSavedPlaces => places::handle_clear_all(state),
        Message::SelectSavedPlace { id } => places::handle_select_saved(state, &id),
        Message::SavedPlacesChanged => UpdateResult::action(UpdateAction::PersistSavedPlaces(
            state.saved_places.clone(),
        )),

        // ─────────────────────────────────────────────────────────
        // Camera Controls
        // ─────────────────────────────────────────────────────────
        Message::ZoomIn => UpdateResult::commands(vec![MapCommand::zoom_in()]),
        Message::ZoomOut => UpdateResult::commands(vec![MapCommand::zoom_out()]),
        Message::ResetHeading => {
            if state.prefs.supports_rotation() {
                UpdateResult::commands(vec![MapCommand::ResetHeading])
            } else {
                debug!("Heading reset unavailable without a map id");
                UpdateResult::none()
            }
        }

        // ─────────────────────────────────────────────────────────
        // Location Flow
        // ─────────────────────────────────────────────────────────
        Message::LocateRequested => location::handle_locate(state),
        Message::LocationPermission { granted } => location::handle_permission(state, granted),
        Message::LocationFixed { location } => location::handle_fix(state, location),
        Message::LocationFailed { reason } => location::handle_failure(state, &reason),

        // ─────────────────────────────────────────────────────────
        // Search Pipeline
        // ─────────────────────────────────────────────────────────
        Message::SearchInput { text } => search::handle_input(state, text),
        Message::DebounceElapsed { generation } => search::handle_debounce(state, generation),
        Message::SearchSubmit => search::handle_submit(state),
        Message::ClearSearch => search::handle_clear(state),
        Message::SearchCompleted { seq, result } => {
            search::handle_search_completed(state, seq, result)
        }
        Message::AutocompleteCompleted { seq, result } => {
            search::handle_autocomplete_completed(state, seq, result)
        }
        Message::SelectSuggestion { index } => search::handle_select_suggestion(state, index),
        Message::SuggestionResolved { seq, result } => {
            search::handle_suggestion_resolved(state, seq, result)
        }
        Message::SelectResult { index } => match state.search.results.get(index).cloned() {
            Some(result) => search::select_result(state, result),
            None => UpdateResult::none(),
        },
        Message::SelectHistory { index } => match state.search.history.get(index).cloned() {
            Some(result) => search::select_result(state, result),
            None => UpdateResult::none(),
        },
        Message::HistoryChanged => UpdateResult::action(UpdateAction::PersistHistory(
            state.search.history.entries().to_vec(),
        )),

        // ─────────────────────────────────────────────────────────
        // Preferences
        // ─────────────────────────────────────────────────────────
        Message::SetApiKey { key } => {
            let key = normalize(key);
            state.prefs.api_key = key.clone();
            UpdateResult::action(UpdateAction::PersistPreference(PreferenceUpdate::ApiKey(
                key,
            )))
        }
        Message::SetMapId { map_id } => {
            let map_id = normalize(map_id);
            state.prefs.map_id = map_id.clone();
            UpdateResult::action(UpdateAction::PersistPreference(PreferenceUpdate::MapId(
                map_id,
            )))
        }
        Message::SetLocationEnabled { enabled } => {
            state.prefs.location_enabled = enabled;
            UpdateResult::action(UpdateAction::PersistPreference(
                PreferenceUpdate::LocationEnabled(enabled),
            ))
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
