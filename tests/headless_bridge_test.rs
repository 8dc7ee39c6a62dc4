//! Host engine and map runtime wired over an in-process bridge

use std::time::Duration;

use lmap_app::config::Settings;
use lmap_app::{AppState, Engine, LocationPhase, Message, PreferenceStore, StaticLocationProvider};
use lmap_bridge::channel;
use lmap_core::{AutocompleteSuggestion, MapLocation, PlaceDetails, SearchResult};
use lmap_places::{LocationBias, PlaceService};
use lmap_sandbox::{
    ControllerOptions, MapController, MapSdk, ResolvedPlace, SandboxHandle, SandboxSnapshot,
};

const RIVOLI: &str = "Rue de Rivoli, 75001 Paris, France";

struct FakeSdk;

impl MapSdk for FakeSdk {
    async fn place_details(&self, place_id: &str) -> lmap_core::Result<ResolvedPlace> {
        Ok(ResolvedPlace {
            place_id: place_id.to_string(),
            location: MapLocation::new(48.8606, 2.3376),
            details: PlaceDetails {
                name: "Louvre Museum".to_string(),
                address: RIVOLI.to_string(),
                rating: Some(4.7),
                ..Default::default()
            },
        })
    }

    async fn reverse_geocode(&self, _location: MapLocation) -> lmap_core::Result<Option<String>> {
        Ok(Some(RIVOLI.to_string()))
    }
}

struct FakePlaces;

impl PlaceService for FakePlaces {
    async fn text_search(
        &self,
        query: &str,
        _bias: Option<LocationBias>,
    ) -> lmap_core::Result<Vec<SearchResult>> {
        Ok(vec![SearchResult {
            place_id: "orsay".to_string(),
            name: query.to_string(),
            address: "1 Rue de la Légion d'Honneur, 75007 Paris, France".to_string(),
            location: MapLocation::new(48.86, 2.3266),
        }])
    }

    async fn autocomplete(
        &self,
        _input: &str,
        _bias: Option<LocationBias>,
    ) -> lmap_core::Result<Vec<AutocompleteSuggestion>> {
        Ok(Vec::new())
    }

    async fn resolve(
        &self,
        suggestion: &AutocompleteSuggestion,
    ) -> lmap_core::Result<SearchResult> {
        Err(lmap_core::Error::places(format!(
            "no lookup for {}",
            suggestion.place_id
        )))
    }
}

type TestEngine = Engine<FakePlaces, StaticLocationProvider>;

fn start(here: MapLocation) -> (TestEngine, SandboxHandle) {
    let (host, sandbox_end) = channel(64);
    let sandbox = MapController::spawn(sandbox_end, FakeSdk, ControllerOptions::default());
    let engine = Engine::attach(
        Settings::default(),
        PreferenceStore::in_memory(),
        FakePlaces,
        StaticLocationProvider::new(Some(here)),
        host,
    );
    (engine, sandbox)
}

/// Process messages until `done` holds
async fn pump_until(engine: &mut TestEngine, done: impl Fn(&AppState) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(&engine.state) {
            let message = engine.next_message().await.expect("message channel open");
            engine.process_message(message);
        }
    })
    .await
    .expect("engine state never matched");
}

async fn wait_for_map(sandbox: &SandboxHandle, done: impl Fn(&SandboxSnapshot) -> bool) {
    let mut snapshots = sandbox.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(&snapshots.borrow_and_update()) {
            snapshots.changed().await.expect("map runtime running");
        }
    })
    .await
    .expect("map state never matched");
}

#[tokio::test]
async fn test_map_ready_centers_on_user() {
    let here = MapLocation::new(45.764, 4.8357);
    let (mut engine, sandbox) = start(here);

    pump_until(&mut engine, |s| {
        s.map_ready && s.location.user_location.is_some()
    })
    .await;
    assert_eq!(engine.state.location.phase, LocationPhase::Idle);

    wait_for_map(&sandbox, |s| {
        s.user_marker.is_some() && s.camera.center == here && s.camera.zoom == 15.0
    })
    .await;

    engine.shutdown();
    sandbox.shutdown();
}

#[tokio::test]
async fn test_tap_select_then_save() {
    let (mut engine, sandbox) = start(MapLocation::new(45.764, 4.8357));
    pump_until(&mut engine, |s| s.map_ready).await;

    let tapped = MapLocation::new(48.8606, 2.3376);
    sandbox.tap(tapped).await.unwrap();
    pump_until(&mut engine, |s| s.selection.is_some()).await;

    let selection = engine.state.selection.clone().unwrap();
    assert_eq!(selection.location, tapped);
    assert_eq!(selection.address.as_deref(), Some(RIVOLI));
    assert!(sandbox.snapshot().selected_marker.is_some());

    engine.process_message(Message::SaveSelection);
    assert!(engine.state.selection.is_none());
    assert_eq!(engine.state.saved_places.len(), 1);
    assert_eq!(engine.state.saved_places[0].name, "Rue de Rivoli");
    assert_eq!(engine.state.saved_places[0].address, RIVOLI);

    engine.shutdown();
    sandbox.shutdown();
}

#[tokio::test]
async fn test_poi_tap_carries_details() {
    let (mut engine, sandbox) = start(MapLocation::new(45.764, 4.8357));
    pump_until(&mut engine, |s| s.map_ready).await;

    sandbox
        .tap_poi("louvre", MapLocation::new(48.8606, 2.3376))
        .await
        .unwrap();
    pump_until(&mut engine, |s| {
        s.selection.as_ref().is_some_and(|sel| sel.details.is_some())
    })
    .await;

    let details = engine.state.selection.clone().unwrap().details.unwrap();
    assert_eq!(details.name, "Louvre Museum");
    assert_eq!(details.rating, Some(4.7));
    assert_eq!(details.place_id.as_deref(), Some("louvre"));

    engine.shutdown();
    sandbox.shutdown();
}

#[tokio::test]
async fn test_search_result_flies_map_to_place() {
    let (mut engine, sandbox) = start(MapLocation::new(45.764, 4.8357));
    pump_until(&mut engine, |s| s.map_ready).await;

    engine.process_message(Message::SearchInput {
        text: "Musée d'Orsay".to_string(),
    });
    engine.process_message(Message::SearchSubmit);
    pump_until(&mut engine, |s| !s.search.results.is_empty()).await;

    engine.process_message(Message::SelectResult { index: 0 });
    assert_eq!(engine.state.search.history.len(), 1);

    let orsay = MapLocation::new(48.86, 2.3266);
    wait_for_map(&sandbox, |s| {
        s.camera.center == orsay
            && s.camera.zoom == 17.0
            && s.selected_marker
                .as_ref()
                .is_some_and(|m| m.title.as_deref() == Some("Musée d'Orsay"))
    })
    .await;

    engine.shutdown();
    sandbox.shutdown();
}
