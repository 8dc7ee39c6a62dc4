//! Headless mode runner - event loop without a UI
//!
//! Wires the host engine and the map runtime over an in-process bridge,
//! turns stdin lines into messages and gestures, and streams engine events
//! as NDJSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use lmap_app::config::{load_settings, ColorSchemeSetting, Settings};
use lmap_app::store::API_KEY;
use lmap_app::{
    Engine, EngineEvent, FileStore, LocationProvider, Message, PreferenceStore, SearchView,
    StaticLocationProvider,
};
use lmap_bridge::channel;
use lmap_core::prelude::*;
use lmap_places::{PlaceService, PlacesClient};
use lmap_sandbox::{ColorScheme, ControllerOptions, MapController, SandboxHandle, SandboxSnapshot};

use super::commands::{parse_command, StdinCommand};
use super::HeadlessEvent;

/// Run in headless mode with config from `base_path`
pub async fn run_headless(base_path: &Path, store_dir: Option<PathBuf>) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Light Maps starting in HEADLESS mode");
    info!("Config base: {}", base_path.display());
    info!("═══════════════════════════════════════════════════════");

    let settings = load_settings(base_path);
    let store_dir = match store_dir {
        Some(dir) => dir,
        None => FileStore::default_dir()?,
    };
    info!("Store: {}", store_dir.display());
    let prefs = PreferenceStore::new(Arc::new(FileStore::open(store_dir)?));
    let stored = prefs.load();

    let places = places_client(&settings, stored.api_key.as_deref())?;
    let location = StaticLocationProvider::new(settings.location.fixed.map(Into::into));

    let (host, sandbox_end) = channel(settings.bridge.channel_capacity.max(1));
    let sandbox = MapController::spawn(
        sandbox_end,
        places.clone(),
        controller_options(&settings, stored.map_id),
    );
    info!("Map rendering: {}", sandbox.render_mode().name());

    let mut engine = Engine::attach(settings, prefs, places, location, host);
    let emitter = spawn_event_emitter(engine.subscribe());
    let camera = spawn_camera_emitter(sandbox.subscribe());

    let (stdin_tx, mut stdin_rx) = mpsc::channel(32);
    std::thread::spawn(move || {
        read_stdin_blocking(stdin_tx);
    });

    headless_event_loop(&mut engine, &sandbox, &mut stdin_rx).await;

    engine.shutdown();
    if tokio::time::timeout(Duration::from_secs(2), engine.flush_store())
        .await
        .is_err()
    {
        warn!("Store writes still pending at exit");
    }
    camera.abort();
    sandbox.shutdown();
    // Let the emitter write the final event
    let _ = tokio::time::timeout(Duration::from_millis(250), emitter).await;

    info!("Light Maps headless mode exiting");
    Ok(())
}

/// Build the remote place client; a missing key is reported but not fatal
pub fn places_client(settings: &Settings, api_key: Option<&str>) -> Result<PlacesClient> {
    let api_key = match require_api_key(api_key) {
        Ok(key) => key,
        Err(e) => {
            warn!("{}, place lookups will fail until one is set", e);
            HeadlessEvent::error(e.to_string(), false).emit();
            ""
        }
    };

    let timeout = settings.places.timeout_secs;
    let client = match &settings.places.base_url {
        Some(base_url) => PlacesClient::with_base_url(api_key, timeout, base_url)?,
        None => PlacesClient::new(api_key, timeout)?,
    };
    Ok(client.with_limits(settings.search.max_results, settings.search.max_suggestions))
}

fn require_api_key(api_key: Option<&str>) -> Result<&str> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::missing_credential(API_KEY))
}

pub fn controller_options(settings: &Settings, map_id: Option<String>) -> ControllerOptions {
    ControllerOptions {
        center: settings.map.center(),
        zoom: settings.map.zoom,
        focus_zoom: settings.map.focus_zoom,
        poi_guard: settings.bridge.poi_guard(),
        map_id,
        color_scheme: match settings.map.color_scheme {
            ColorSchemeSetting::Light => ColorScheme::Light,
            ColorSchemeSetting::Dark => ColorScheme::Dark,
        },
    }
}

/// Main headless event loop
async fn headless_event_loop<P, L>(
    engine: &mut Engine<P, L>,
    sandbox: &SandboxHandle,
    stdin_rx: &mut mpsc::Receiver<StdinCommand>,
) where
    P: PlaceService + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    loop {
        if engine.state.should_quit() {
            info!("Quit requested");
            break;
        }

        tokio::select! {
            message = engine.next_message() => match message {
                Some(message) => engine.process_message(message),
                None => {
                    info!("Message channel closed");
                    break;
                }
            },
            command = stdin_rx.recv() => match command {
                Some(command) => apply_command(engine, sandbox, command).await,
                None => {
                    info!("Stdin closed");
                    engine.process_message(Message::Quit);
                }
            },
        }
    }
}

/// Route a stdin command to the map runtime or the engine
async fn apply_command<P, L>(engine: &mut Engine<P, L>, sandbox: &SandboxHandle, command: StdinCommand)
where
    P: PlaceService + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    let message = match command {
        StdinCommand::Tap(location) => {
            if let Err(e) = sandbox.tap(location).await {
                warn!("Tap not delivered: {}", e);
            }
            return;
        }
        StdinCommand::Poi { place_id, location } => {
            if let Err(e) = sandbox.tap_poi(place_id, location).await {
                warn!("POI tap not delivered: {}", e);
            }
            return;
        }
        StdinCommand::Type(text) => Message::SearchInput { text },
        StdinCommand::Search(query) => {
            if let Some(text) = query {
                engine.process_message(Message::SearchInput { text });
            }
            Message::SearchSubmit
        }
        StdinCommand::Select(index) => match select_message(&engine.state.search.view(), index) {
            Some(message) => message,
            None => {
                warn!("Nothing to select");
                return;
            }
        },
        StdinCommand::ClearSearch => Message::ClearSearch,
        StdinCommand::Save => Message::SaveSelection,
        StdinCommand::Unselect => Message::ClearSelection,
        StdinCommand::OpenSaved(id) => Message::SelectSavedPlace { id },
        StdinCommand::Forget(id) => Message::RemoveSavedPlace { id },
        StdinCommand::ForgetAll => Message::ClearSavedPlaces,
        StdinCommand::Locate => Message::LocateRequested,
        StdinCommand::ZoomIn => Message::ZoomIn,
        StdinCommand::ZoomOut => Message::ZoomOut,
        StdinCommand::ResetHeading => Message::ResetHeading,
        StdinCommand::ApiKey(key) => Message::SetApiKey { key },
        StdinCommand::MapId(map_id) => Message::SetMapId { map_id },
        StdinCommand::LocationEnabled(enabled) => Message::SetLocationEnabled { enabled },
        StdinCommand::Quit => Message::Quit,
    };
    engine.process_message(message);
}

/// `select <n>` picks from whichever list is showing
fn select_message(view: &SearchView, index: usize) -> Option<Message> {
    match view {
        SearchView::Results(_) => Some(Message::SelectResult { index }),
        SearchView::Suggestions(_) => Some(Message::SelectSuggestion { index }),
        SearchView::History(_) => Some(Message::SelectHistory { index }),
        SearchView::Empty => None,
    }
}

fn spawn_event_emitter(mut events: broadcast::Receiver<EngineEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    HeadlessEvent::from_engine_event(&event).emit();
                    if event == EngineEvent::Shutdown {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Headless output lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_camera_emitter(mut snapshots: watch::Receiver<SandboxSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let event = HeadlessEvent::camera(&snapshots.borrow_and_update());
            event.emit();
        }
    })
}

/// Read stdin lines on a plain thread and forward parsed commands
fn read_stdin_blocking(tx: mpsc::Sender<StdinCommand>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(command)) => {
                let quit = command == StdinCommand::Quit;
                if tx.blocking_send(command).is_err() || quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Stdin: {}", e);
                HeadlessEvent::error(e, false).emit();
            }
        }
    }

    info!("Stdin reader exiting");
}
