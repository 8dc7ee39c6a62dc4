//! Selection and saved place handlers

use lmap_bridge::MapCommand;
use lmap_core::prelude::*;
use lmap_core::{PlaceDetails, SavedPlace, Selection};

use super::UpdateResult;
use crate::message::Message;
use crate::state::AppState;
use crate::store::MAX_SAVED_PLACES;

/// Forget the logical selection. The map marker stays where it is.
pub fn handle_clear_selection(state: &mut AppState) -> UpdateResult {
    state.selection = None;
    UpdateResult::none()
}

pub fn handle_save_selection(state: &mut AppState) -> UpdateResult {
    let Some(selection) = state.selection.take() else {
        debug!("Nothing selected to save");
        return UpdateResult::none();
    };

    let now = chrono::Utc::now().timestamp_millis();
    let created_at = next_saved_place_stamp(&state.saved_places, now);

    let place = SavedPlace {
        id: created_at.to_string(),
        name: selection.display_name(),
        address: selection.display_address(),
        location: selection.location,
        created_at,
    };
    info!("Saved place {} ({})", place.name, place.id);

    state.saved_places.insert(0, place);
    state.saved_places.truncate(MAX_SAVED_PLACES);
    UpdateResult::message(Message::SavedPlacesChanged)
}

/// Millisecond stamp for a new place, strictly newer than the newest existing one
pub(crate) fn next_saved_place_stamp(places: &[SavedPlace], now_ms: i64) -> i64 {
    match places.iter().map(|p| p.created_at).max() {
        Some(latest) if latest >= now_ms => latest + 1,
        _ => now_ms,
    }
}

pub fn handle_remove(state: &mut AppState, id: &str) -> UpdateResult {
    let before = state.saved_places.len();
    state.saved_places.retain(|p| p.id != id);

    if state.saved_places.len() == before {
        debug!("No saved place with id {}", id);
        return UpdateResult::none();
    }
    UpdateResult::message(Message::SavedPlacesChanged)
}

pub fn handle_clear_all(state: &mut AppState) -> UpdateResult {
    if state.saved_places.is_empty() {
        info!("No saved places to clear");
        return UpdateResult::none();
    }

    info!("Cleared {} saved place(s)", state.saved_places.len());
    state.saved_places.clear();
    UpdateResult::message(Message::SavedPlacesChanged)
}

pub fn handle_select_saved(state: &mut AppState, id: &str) -> UpdateResult {
    let Some(place) = state.saved_places.iter().find(|p| p.id == id).cloned() else {
        debug!("No saved place with id {}", id);
        return UpdateResult::none();
    };

    state.selection = Some(Selection {
        location: place.location,
        address: Some(place.address.clone()),
        details: Some(PlaceDetails {
            name: place.name.clone(),
            address: place.address,
            ..Default::default()
        }),
    });

    UpdateResult::commands(vec![MapCommand::GoToPlace {
        location: place.location,
        name: place.name,
    }])
}
