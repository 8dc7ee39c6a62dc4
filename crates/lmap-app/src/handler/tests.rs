//! Tests for handler module

use std::time::Duration;

use super::*;
use crate::location::LocationPhase;
use crate::message::Message;
use crate::search::SearchView;
use crate::state::AppState;
use lmap_core::{
    BridgeError, BridgeEvent, BridgeMessage, LocationSelect, MapLocation, PlaceDetailsUpdate,
    PlaceSelect, SavedPlace, SearchResult, SearchResults, Selection,
};

fn bridge(message: BridgeMessage) -> Message {
    Message::Bridge(BridgeEvent::Message(message))
}

fn location_select(lat: f64, lng: f64, address: &str) -> BridgeMessage {
    BridgeMessage::LocationSelect(LocationSelect {
        latitude: lat,
        longitude: lng,
        address: address.to_string(),
        name: None,
    })
}

fn place_select(id: &str, name: &str) -> BridgeMessage {
    BridgeMessage::PlaceSelect(PlaceSelect {
        place_id: id.to_string(),
        name: name.to_string(),
        address: "Rue de Rivoli, 75001 Paris, France".to_string(),
        rating: Some(4.7),
        total_ratings: 1200,
        is_open: Some(true),
        opening_hours: Some(vec!["Monday: 9:00 AM – 6:00 PM".to_string()]),
        phone_number: Some("01 40 20 53 17".to_string()),
        latitude: 48.8606,
        longitude: 2.3376,
        reviews: Vec::new(),
    })
}

fn result(id: &str, name: &str) -> SearchResult {
    SearchResult {
        place_id: id.to_string(),
        name: name.to_string(),
        address: format!("{name}, Paris, France"),
        location: MapLocation::new(48.86, 2.34),
    }
}

/// Run a message and every follow-up message, collecting actions
fn run(state: &mut AppState, message: Message) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut next = Some(message);
    while let Some(msg) = next {
        let result = update(state, msg);
        actions.extend(result.action);
        next = result.message;
    }
    actions
}

fn sent_commands(actions: &[UpdateAction]) -> Vec<MapCommand> {
    actions
        .iter()
        .filter_map(|a| match a {
            UpdateAction::SendCommands(commands) => Some(commands.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

// ─────────────────────────────────────────────────────────
// Bridge reconciliation
// ─────────────────────────────────────────────────────────

#[test]
fn test_map_ready_starts_location_flow() {
    let mut state = AppState::new();

    let actions = run(&mut state, bridge(BridgeMessage::MapReady));

    assert!(state.map_ready);
    assert_eq!(state.location.phase, LocationPhase::Fetching);
    assert_eq!(
        actions,
        vec![UpdateAction::FetchLocation {
            timeout: Duration::from_secs(60)
        }]
    );
}

#[test]
fn test_location_select_derives_name_from_address() {
    let mut state = AppState::new();

    run(
        &mut state,
        bridge(location_select(48.85, 2.35, "10 Rue de Rivoli, Paris, France")),
    );

    let selection = state.selection.as_ref().unwrap();
    assert_eq!(selection.display_name(), "10 Rue de Rivoli");
    assert_eq!(selection.location, MapLocation::new(48.85, 2.35));
}

#[test]
fn test_place_select_sets_enriched_selection_without_commands() {
    let mut state = AppState::new();

    let actions = run(&mut state, bridge(place_select("louvre", "Louvre Museum")));

    let selection = state.selection.as_ref().unwrap();
    let details = selection.details.as_ref().unwrap();
    assert_eq!(details.name, "Louvre Museum");
    assert_eq!(details.rating, Some(4.7));
    assert_eq!(details.phone_number.as_deref(), Some("01 40 20 53 17"));
    assert!(actions.is_empty());
}

#[test]
fn test_place_details_merges_into_selection() {
    let mut state = AppState::new();
    run(&mut state, bridge(place_select("louvre", "Louvre")));

    run(
        &mut state,
        bridge(BridgeMessage::PlaceDetails(PlaceDetailsUpdate {
            name: "Musée du Louvre".to_string(),
            address: String::new(),
            rating: Some(4.8),
            total_ratings: 0,
            is_open: Some(false),
        })),
    );

    let details = state.selection.unwrap().details.unwrap();
    assert_eq!(details.name, "Musée du Louvre");
    assert_eq!(details.address, "Rue de Rivoli, 75001 Paris, France");
    assert_eq!(details.rating, Some(4.8));
    assert_eq!(details.total_ratings, 1200);
    assert_eq!(details.is_open, Some(false));
    assert!(details.opening_hours.is_some());
}

#[test]
fn test_place_details_without_selection_is_ignored() {
    let mut state = AppState::new();

    run(
        &mut state,
        bridge(BridgeMessage::PlaceDetails(PlaceDetailsUpdate {
            name: "Louvre".to_string(),
            address: String::new(),
            rating: None,
            total_ratings: 0,
            is_open: None,
        })),
    );

    assert!(state.selection.is_none());
}

#[test]
fn test_search_result_message_replaces_results() {
    let mut state = AppState::new();
    state.search.results = vec![result("old", "Old")];

    run(
        &mut state,
        bridge(BridgeMessage::SearchResult(SearchResults {
            results: vec![result("a", "A"), result("b", "B")],
        })),
    );

    assert_eq!(state.search.results.len(), 2);
    assert_eq!(state.search.results[0].place_id, "a");
}

#[test]
fn test_error_message_changes_nothing() {
    let mut state = AppState::new();
    run(&mut state, bridge(place_select("louvre", "Louvre")));
    let before = state.selection.clone();

    let actions = run(
        &mut state,
        bridge(BridgeMessage::Error(BridgeError {
            error: "Details lookup failed".to_string(),
        })),
    );

    assert_eq!(state.selection, before);
    assert!(actions.is_empty());
}

#[test]
fn test_disconnect_clears_ready_flag() {
    let mut state = AppState::new();
    state.map_ready = true;

    run(&mut state, Message::Bridge(BridgeEvent::Disconnected));

    assert!(!state.map_ready);
}

// ─────────────────────────────────────────────────────────
// Selection & saved places
// ─────────────────────────────────────────────────────────

#[test]
fn test_clear_selection_never_clears_marker() {
    let mut state = AppState::new();
    run(&mut state, bridge(place_select("louvre", "Louvre")));

    let actions = run(&mut state, Message::ClearSelection);

    assert!(state.selection.is_none());
    assert!(actions.is_empty());
}

#[test]
fn test_save_selection_uses_name_fallbacks_and_clears_selection() {
    let mut state = AppState::new();
    state.selection = Some(Selection {
        location: MapLocation::new(1.0, 2.0),
        address: Some("5 Avenue Anatole France, Paris".to_string()),
        details: None,
    });

    let actions = run(&mut state, Message::SaveSelection);

    assert!(state.selection.is_none());
    assert_eq!(state.saved_places.len(), 1);
    let saved = &state.saved_places[0];
    assert_eq!(saved.name, "5 Avenue Anatole France");
    assert_eq!(saved.address, "5 Avenue Anatole France, Paris");
    assert_eq!(saved.id, saved.created_at.to_string());
    assert_eq!(
        actions,
        vec![UpdateAction::PersistSavedPlaces(state.saved_places.clone())]
    );
}

#[test]
fn test_save_without_address_uses_label() {
    let mut state = AppState::new();
    state.selection = Some(Selection::at(MapLocation::new(1.0, 2.0)));

    run(&mut state, Message::SaveSelection);

    assert_eq!(state.saved_places[0].name, "Selected location");
    assert_eq!(state.saved_places[0].address, "");
}

#[test]
fn test_save_without_selection_is_noop() {
    let mut state = AppState::new();
    assert!(run(&mut state, Message::SaveSelection).is_empty());
    assert!(state.saved_places.is_empty());
}

#[test]
fn test_saved_places_newest_first_with_unique_ids() {
    let mut state = AppState::new();
    for i in 0..3 {
        state.selection = Some(Selection::at(MapLocation::new(i as f64, 0.0)));
        run(&mut state, Message::SaveSelection);
    }

    assert_eq!(state.saved_places.len(), 3);
    assert_eq!(state.saved_places[0].location.latitude, 2.0);
    assert!(state.saved_places[0].created_at > state.saved_places[1].created_at);
    assert!(state.saved_places[1].created_at > state.saved_places[2].created_at);
}

#[test]
fn test_next_saved_place_stamp_bumps_collisions() {
    let existing = SavedPlace {
        id: "1000".to_string(),
        name: String::new(),
        address: String::new(),
        location: MapLocation::new(0.0, 0.0),
        created_at: 1000,
    };
    assert_eq!(places::next_saved_place_stamp(&[], 1000), 1000);
    assert_eq!(
        places::next_saved_place_stamp(std::slice::from_ref(&existing), 1000),
        1001
    );
    assert_eq!(places::next_saved_place_stamp(&[existing], 2000), 2000);
}

#[test]
fn test_remove_and_clear_saved_places() {
    let mut state = AppState::new();
    for i in 0..2 {
        state.selection = Some(Selection::at(MapLocation::new(i as f64, 0.0)));
        run(&mut state, Message::SaveSelection);
    }
    let id = state.saved_places[1].id.clone();

    let actions = run(&mut state, Message::RemoveSavedPlace { id: id.clone() });
    assert_eq!(state.saved_places.len(), 1);
    assert_eq!(actions.len(), 1);

    assert!(run(&mut state, Message::RemoveSavedPlace { id }).is_empty());

    run(&mut state, Message::ClearSavedPlaces);
    assert!(state.saved_places.is_empty());
    assert!(run(&mut state, Message::ClearSavedPlaces).is_empty());
}

#[test]
fn test_select_saved_place_goes_there() {
    let mut state = AppState::new();
    state.selection = Some(Selection {
        location: MapLocation::new(48.86, 2.34),
        address: Some("Jardin des Tuileries, Paris".to_string()),
        details: None,
    });
    run(&mut state, Message::SaveSelection);
    let id = state.saved_places[0].id.clone();

    let actions = run(&mut state, Message::SelectSavedPlace { id });

    assert_eq!(
        sent_commands(&actions),
        vec![MapCommand::GoToPlace {
            location: MapLocation::new(48.86, 2.34),
            name: "Jardin des Tuileries".to_string(),
        }]
    );
    assert_eq!(
        state.selection.unwrap().display_name(),
        "Jardin des Tuileries"
    );
}

// ─────────────────────────────────────────────────────────
// Camera controls & preferences
// ─────────────────────────────────────────────────────────

#[test]
fn test_zoom_commands() {
    let mut state = AppState::new();
    assert_eq!(
        sent_commands(&run(&mut state, Message::ZoomIn)),
        vec![MapCommand::ZoomBy { delta: 1 }]
    );
    assert_eq!(
        sent_commands(&run(&mut state, Message::ZoomOut)),
        vec![MapCommand::ZoomBy { delta: -1 }]
    );
}

#[test]
fn test_reset_heading_requires_map_id() {
    let mut state = AppState::new();
    assert!(run(&mut state, Message::ResetHeading).is_empty());

    run(
        &mut state,
        Message::SetMapId {
            map_id: Some("abc123".to_string()),
        },
    );
    assert_eq!(
        sent_commands(&run(&mut state, Message::ResetHeading)),
        vec![MapCommand::ResetHeading]
    );
}

#[test]
fn test_blank_api_key_deletes() {
    let mut state = AppState::new();
    state.prefs.api_key = Some("old".to_string());

    let actions = run(
        &mut state,
        Message::SetApiKey {
            key: Some("  ".to_string()),
        },
    );

    assert!(state.prefs.api_key.is_none());
    assert_eq!(
        actions,
        vec![UpdateAction::PersistPreference(PreferenceUpdate::ApiKey(None))]
    );
}

// ─────────────────────────────────────────────────────────
// Location flow
// ─────────────────────────────────────────────────────────

#[test]
fn test_locate_disabled_is_noop() {
    let mut state = AppState::new();
    state.prefs.location_enabled = false;
    state.settings.location.requires_runtime_permission = true;

    let actions = run(&mut state, Message::LocateRequested);

    assert!(actions.is_empty());
    assert_eq!(state.location.phase, LocationPhase::Idle);
}

#[test]
fn test_locate_requests_permission_before_fix() {
    let mut state = AppState::new();
    state.settings.location.requires_runtime_permission = true;

    let actions = run(&mut state, Message::LocateRequested);
    assert_eq!(actions, vec![UpdateAction::RequestLocationPermission]);
    assert_eq!(state.location.phase, LocationPhase::RequestingPermission);

    let actions = run(&mut state, Message::LocationPermission { granted: true });
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::FetchLocation { .. }]
    ));
    assert_eq!(state.location.phase, LocationPhase::Fetching);
}

#[test]
fn test_permission_denied_returns_to_idle() {
    let mut state = AppState::new();
    state.settings.location.requires_runtime_permission = true;
    run(&mut state, Message::LocateRequested);

    let actions = run(&mut state, Message::LocationPermission { granted: false });

    assert!(actions.is_empty());
    assert_eq!(state.location.phase, LocationPhase::Idle);
    assert!(state.location.user_location.is_none());
}

#[test]
fn test_second_locate_while_busy_is_ignored() {
    let mut state = AppState::new();
    run(&mut state, Message::LocateRequested);

    assert!(run(&mut state, Message::LocateRequested).is_empty());
}

#[test]
fn test_fix_recenters_and_moves_user_marker() {
    let mut state = AppState::new();
    run(&mut state, Message::LocateRequested);
    let here = MapLocation::new(45.764, 4.8357);

    let actions = run(&mut state, Message::LocationFixed { location: here });

    assert_eq!(state.location.phase, LocationPhase::Idle);
    assert_eq!(state.location.user_location, Some(here));
    assert_eq!(
        sent_commands(&actions),
        vec![
            MapCommand::SetCenter {
                location: here,
                zoom: Some(15.0)
            },
            MapCommand::SetUserLocation { location: here },
        ]
    );
}

#[test]
fn test_failure_is_silent() {
    let mut state = AppState::new();
    run(&mut state, Message::LocateRequested);

    let actions = run(
        &mut state,
        Message::LocationFailed {
            reason: "Location fix timed out after 60s".to_string(),
        },
    );

    assert!(actions.is_empty());
    assert_eq!(state.location.phase, LocationPhase::Idle);
    assert!(state.search.error.is_none());
}

// ─────────────────────────────────────────────────────────
// Search pipeline
// ─────────────────────────────────────────────────────────

#[test]
fn test_keystrokes_supersede_debounce_generation() {
    let mut state = AppState::new();

    let first = run(&mut state, Message::SearchInput { text: "lo".into() });
    let second = run(&mut state, Message::SearchInput { text: "lou".into() });

    let (
        [UpdateAction::ScheduleAutocomplete { generation: g1, .. }],
        [UpdateAction::ScheduleAutocomplete { generation: g2, delay }],
    ) = (first.as_slice(), second.as_slice())
    else {
        panic!("expected debounce scheduling, got {first:?} / {second:?}");
    };
    assert!(g2 > g1);
    assert_eq!(*delay, Duration::from_millis(300));

    assert!(run(&mut state, Message::DebounceElapsed { generation: *g1 }).is_empty());

    let actions = run(&mut state, Message::DebounceElapsed { generation: *g2 });
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::Autocomplete { input, bias: None, .. }] if input == "lou"
    ));
}

#[test]
fn test_short_input_cancels_debounce_and_suggestions() {
    let mut state = AppState::new();
    state.search.suggestions = vec![lmap_core::AutocompleteSuggestion {
        place_id: "x".into(),
        name: "x".into(),
        address: String::new(),
    }];

    let actions = run(&mut state, Message::SearchInput { text: "l".into() });

    assert_eq!(actions, vec![UpdateAction::CancelDebounce]);
    assert!(state.search.suggestions.is_empty());
}

#[test]
fn test_keystroke_resets_error() {
    let mut state = AppState::new();
    state.search.error = Some("Network error".into());

    run(&mut state, Message::SearchInput { text: "par".into() });

    assert!(state.search.error.is_none());
}

#[test]
fn test_autocomplete_uses_location_bias() {
    let mut state = AppState::new();
    state.location.user_location = Some(MapLocation::new(48.0, 2.0));
    let generation = match run(&mut state, Message::SearchInput { text: "cafe".into() }).as_slice()
    {
        [UpdateAction::ScheduleAutocomplete { generation, .. }] => *generation,
        other => panic!("unexpected {other:?}"),
    };

    let actions = run(&mut state, Message::DebounceElapsed { generation });

    match actions.as_slice() {
        [UpdateAction::Autocomplete {
            bias: Some(bias), ..
        }] => {
            assert_eq!(bias.location, MapLocation::new(48.0, 2.0));
            assert_eq!(bias.radius_m, 50_000);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_submit_cancels_debounce_and_clears_suggestions() {
    let mut state = AppState::new();
    let generation = match run(&mut state, Message::SearchInput { text: "louvre".into() })
        .as_slice()
    {
        [UpdateAction::ScheduleAutocomplete { generation, .. }] => *generation,
        other => panic!("unexpected {other:?}"),
    };
    state.search.suggestions = vec![lmap_core::AutocompleteSuggestion {
        place_id: "x".into(),
        name: "x".into(),
        address: String::new(),
    }];

    let actions = run(&mut state, Message::SearchSubmit);

    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::TextSearch { query, .. }] if query == "louvre"
    ));
    assert!(state.search.suggestions.is_empty());
    assert!(state.search.searching);
    assert!(run(&mut state, Message::DebounceElapsed { generation }).is_empty());
}

#[test]
fn test_blank_submit_is_ignored() {
    let mut state = AppState::new();
    state.search.query = "   ".into();
    assert!(run(&mut state, Message::SearchSubmit).is_empty());
}

#[test]
fn test_zero_results_shows_notice_not_error() {
    let mut state = AppState::new();
    state.search.query = "qwertyuiop".into();
    let seq = match run(&mut state, Message::SearchSubmit).as_slice() {
        [UpdateAction::TextSearch { seq, .. }] => *seq,
        other => panic!("unexpected {other:?}"),
    };

    run(
        &mut state,
        Message::SearchCompleted {
            seq,
            result: Ok(Vec::new()),
        },
    );

    assert!(state.search.results.is_empty());
    assert!(state.search.no_results);
    assert!(state.search.error.is_none());
    assert!(!state.search.searching);
}

#[test]
fn test_network_error_keeps_results() {
    let mut state = AppState::new();
    state.search.results = vec![result("a", "A")];
    state.search.query = "louvre".into();
    let seq = match run(&mut state, Message::SearchSubmit).as_slice() {
        [UpdateAction::TextSearch { seq, .. }] => *seq,
        other => panic!("unexpected {other:?}"),
    };

    run(
        &mut state,
        Message::SearchCompleted {
            seq,
            result: Err("Network error".into()),
        },
    );

    assert_eq!(state.search.error.as_deref(), Some("Network error"));
    assert!(!state.search.no_results);
    assert_eq!(state.search.results.len(), 1);
}

#[test]
fn test_stale_search_response_is_discarded() {
    let mut state = AppState::new();
    state.search.query = "first".into();
    let first = match run(&mut state, Message::SearchSubmit).as_slice() {
        [UpdateAction::TextSearch { seq, .. }] => *seq,
        other => panic!("unexpected {other:?}"),
    };
    state.search.query = "second".into();
    run(&mut state, Message::SearchSubmit);

    run(
        &mut state,
        Message::SearchCompleted {
            seq: first,
            result: Ok(vec![result("stale", "Stale")]),
        },
    );

    assert!(state.search.results.is_empty());
    assert!(state.search.searching);
}

#[test]
fn test_edit_after_submit_discards_old_results() {
    let mut state = AppState::new();
    run(&mut state, Message::SearchInput { text: "louvre".into() });
    let louvre = match run(&mut state, Message::SearchSubmit).as_slice() {
        [UpdateAction::TextSearch { seq, .. }] => *seq,
        other => panic!("unexpected {other:?}"),
    };

    run(&mut state, Message::SearchInput { text: "pantheon".into() });
    assert!(!state.search.searching);

    run(
        &mut state,
        Message::SearchCompleted {
            seq: louvre,
            result: Ok(vec![result("louvre", "Louvre")]),
        },
    );

    assert_eq!(state.search.query, "pantheon");
    assert!(state.search.results.is_empty());
    assert!(!matches!(state.search.view(), SearchView::Results(_)));
}

#[test]
fn test_select_result_updates_history_selection_and_map() {
    let mut state = AppState::new();
    state.search.results = vec![result("louvre", "Louvre"), result("orsay", "Orsay")];

    let actions = run(&mut state, Message::SelectResult { index: 1 });

    assert_eq!(
        sent_commands(&actions),
        vec![MapCommand::GoToPlace {
            location: MapLocation::new(48.86, 2.34),
            name: "Orsay".to_string(),
        }]
    );
    assert!(actions.contains(&UpdateAction::PersistHistory(vec![result("orsay", "Orsay")])));
    assert_eq!(
        state.selection.as_ref().unwrap().address.as_deref(),
        Some("Orsay, Paris, France")
    );
}

#[test]
fn test_reselecting_history_moves_it_to_front() {
    let mut state = AppState::new();
    state.search.results = vec![result("a", "A"), result("b", "B")];
    run(&mut state, Message::SelectResult { index: 0 });
    run(&mut state, Message::SelectResult { index: 1 });

    run(&mut state, Message::SelectHistory { index: 1 });

    let ids: Vec<_> = state
        .search
        .history
        .entries()
        .iter()
        .map(|e| e.place_id.as_str())
        .collect();
    assert_eq!(ids, ["a", "b"]);
}

#[test]
fn test_suggestion_is_resolved_before_selection() {
    let mut state = AppState::new();
    state.search.query = "lou".into();
    state.search.suggestions = vec![lmap_core::AutocompleteSuggestion {
        place_id: "louvre".into(),
        name: "Louvre".into(),
        address: "Paris".into(),
    }];

    let seq = match run(&mut state, Message::SelectSuggestion { index: 0 }).as_slice() {
        [UpdateAction::ResolveSuggestion { seq, suggestion }] => {
            assert_eq!(suggestion.place_id, "louvre");
            *seq
        }
        other => panic!("unexpected {other:?}"),
    };
    assert!(state.selection.is_none());

    let actions = run(
        &mut state,
        Message::SuggestionResolved {
            seq,
            result: Ok(result("louvre", "Louvre Museum")),
        },
    );

    assert_eq!(sent_commands(&actions).len(), 1);
    assert_eq!(state.search.history.len(), 1);
    assert!(state.selection.is_some());
}

#[test]
fn test_clear_search_resets_everything_but_history() {
    let mut state = AppState::new();
    state.search.history.push(result("h", "H"));
    state.search.query = "louvre".into();
    state.search.results = vec![result("a", "A")];
    state.search.error = Some("boom".into());

    let actions = run(&mut state, Message::ClearSearch);

    assert_eq!(actions, vec![UpdateAction::CancelDebounce]);
    assert!(state.search.query.is_empty());
    assert!(state.search.results.is_empty());
    assert!(state.search.error.is_none());
    assert!(matches!(state.search.view(), SearchView::History(_)));
}
