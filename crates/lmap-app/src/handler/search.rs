//! Search, autocomplete and history handlers
//!
//! Every request carries the sequence number current when it was issued.
//! A response whose number is no longer current is dropped.

use lmap_bridge::MapCommand;
use lmap_core::prelude::*;
use lmap_core::{AutocompleteSuggestion, SearchResult, Selection};

use super::{UpdateAction, UpdateResult};
use crate::message::Message;
use crate::state::AppState;

/// Keystroke: reset messages and restart the debounce timer
pub fn handle_input(state: &mut AppState, text: String) -> UpdateResult {
    let search = &mut state.search;
    search.query = text;
    search.error = None;
    search.no_results = false;
    search.results.clear();
    search.debounce_generation += 1;
    // Responses for the old query are now stale
    search.next_request();
    search.searching = false;

    if search.wants_autocomplete() {
        UpdateResult::action(UpdateAction::ScheduleAutocomplete {
            generation: search.debounce_generation,
            delay: state.settings.search.debounce(),
        })
    } else {
        search.suggestions.clear();
        UpdateResult::action(UpdateAction::CancelDebounce)
    }
}

pub fn handle_debounce(state: &mut AppState, generation: u64) -> UpdateResult {
    if generation != state.search.debounce_generation {
        trace!("Superseded debounce {}", generation);
        return UpdateResult::none();
    }
    if !state.search.wants_autocomplete() {
        return UpdateResult::none();
    }

    let seq = state.search.next_request();
    UpdateResult::action(UpdateAction::Autocomplete {
        seq,
        input: state.search.query.trim().to_string(),
        bias: state.search_bias(),
    })
}

/// Immediate full-text search
pub fn handle_submit(state: &mut AppState) -> UpdateResult {
    let query = state.search.query.trim().to_string();
    if query.is_empty() {
        return UpdateResult::none();
    }

    let bias = state.search_bias();
    let search = &mut state.search;
    search.debounce_generation += 1;
    search.suggestions.clear();
    search.error = None;
    search.no_results = false;
    search.searching = true;

    let seq = search.next_request();
    debug!("Searching for {:?} (#{})", query, seq);
    UpdateResult::action(UpdateAction::TextSearch { seq, query, bias })
}

pub fn handle_clear(state: &mut AppState) -> UpdateResult {
    state.search.clear();
    UpdateResult::action(UpdateAction::CancelDebounce)
}

pub fn handle_search_completed(
    state: &mut AppState,
    seq: u64,
    result: std::result::Result<Vec<SearchResult>, String>,
) -> UpdateResult {
    if !state.search.is_current(seq) {
        debug!("Discarding stale search response #{}", seq);
        return UpdateResult::none();
    }

    let search = &mut state.search;
    search.searching = false;
    match result {
        Ok(results) => {
            search.no_results = results.is_empty();
            search.results = results;
        }
        Err(message) => {
            warn!("Search failed: {}", message);
            search.error = Some(message);
        }
    }
    UpdateResult::none()
}

pub fn handle_autocomplete_completed(
    state: &mut AppState,
    seq: u64,
    result: std::result::Result<Vec<AutocompleteSuggestion>, String>,
) -> UpdateResult {
    if !state.search.is_current(seq) {
        debug!("Discarding stale autocomplete response #{}", seq);
        return UpdateResult::none();
    }

    match result {
        Ok(suggestions) => state.search.suggestions = suggestions,
        Err(message) => {
            warn!("Autocomplete failed: {}", message);
            state.search.error = Some(message);
        }
    }
    UpdateResult::none()
}

pub fn handle_select_suggestion(state: &mut AppState, index: usize) -> UpdateResult {
    let Some(suggestion) = state.search.suggestions.get(index).cloned() else {
        return UpdateResult::none();
    };

    let seq = state.search.next_request();
    UpdateResult::action(UpdateAction::ResolveSuggestion { seq, suggestion })
}

pub fn handle_suggestion_resolved(
    state: &mut AppState,
    seq: u64,
    result: std::result::Result<SearchResult, String>,
) -> UpdateResult {
    if !state.search.is_current(seq) {
        debug!("Discarding stale suggestion lookup #{}", seq);
        return UpdateResult::none();
    }

    match result {
        Ok(result) => select_result(state, result),
        Err(message) => {
            warn!("Suggestion lookup failed: {}", message);
            state.search.error = Some(message);
            UpdateResult::none()
        }
    }
}

/// Record in history, select, and fly the map there
pub fn select_result(state: &mut AppState, result: SearchResult) -> UpdateResult {
    state.search.history.push(result.clone());
    state.selection = Some(Selection {
        location: result.location,
        address: Some(result.address),
        details: None,
    });

    UpdateResult::action_then(
        UpdateAction::SendCommands(vec![MapCommand::GoToPlace {
            location: result.location,
            name: result.name,
        }]),
        Message::HistoryChanged,
    )
}
