//! Reconciliation of inbound bridge messages
//!
//! Every message kind maps to one state transition. None of them touch the
//! marker rendered by the map runtime.

use lmap_core::prelude::*;
use lmap_core::{BridgeEvent, BridgeMessage, PlaceDetails};

use super::UpdateResult;
use crate::message::Message;
use crate::state::AppState;

pub fn handle_bridge_event(state: &mut AppState, event: BridgeEvent) -> UpdateResult {
    match event {
        BridgeEvent::Message(message) => handle_bridge_message(state, message),
        BridgeEvent::Disconnected => {
            warn!("Map runtime disconnected");
            state.map_ready = false;
            UpdateResult::none()
        }
    }
}

fn handle_bridge_message(state: &mut AppState, message: BridgeMessage) -> UpdateResult {
    match message {
        BridgeMessage::MapReady => {
            info!("Map runtime ready");
            state.map_ready = true;
            UpdateResult::message(Message::LocateRequested)
        }

        BridgeMessage::PlaceSelect(place) => {
            debug!("Place selected: {} ({})", place.name, place.place_id);
            state.selection = Some(place.to_selection());
            UpdateResult::none()
        }

        BridgeMessage::LocationSelect(location) => {
            debug!("Location selected: {}", location.location());
            state.selection = Some(location.to_selection());
            UpdateResult::none()
        }

        BridgeMessage::PlaceDetails(update) => {
            match state.selection.as_mut() {
                Some(selection) => selection
                    .details
                    .get_or_insert_with(PlaceDetails::default)
                    .merge(&update.to_details()),
                None => debug!("Place details for {} with no selection", update.name),
            }
            UpdateResult::none()
        }

        BridgeMessage::SearchResult(results) => {
            state.search.results = results.results;
            UpdateResult::none()
        }

        BridgeMessage::Error(e) => {
            error!("Map runtime error: {}", e.error);
            UpdateResult::none()
        }
    }
}
