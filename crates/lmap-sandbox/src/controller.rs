//! Map runtime task
//!
//! Runs independently of the host. Injected scripts and user gestures are
//! handled one at a time on this task; SDK lookups run on spawned tasks and
//! post their results straight onto the bridge.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use lmap_bridge::{MapCommand, SandboxEnd};
use lmap_core::prelude::*;
use lmap_core::{first_address_segment, BridgeError, BridgeMessage, LocationSelect, MapLocation};

use crate::render::{ColorScheme, RenderMode};
use crate::sdk::MapSdk;
use crate::state::{CameraState, MapState, SandboxSnapshot};

/// Default window during which a POI event may not clear a tap marker
pub const DEFAULT_POI_GUARD: Duration = Duration::from_millis(500);

/// Zoom used by `goToPlace`
pub const DEFAULT_FOCUS_ZOOM: f64 = 17.0;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub center: MapLocation,
    pub zoom: f64,
    pub focus_zoom: f64,
    pub poi_guard: Duration,
    /// Cloud map styling id; selects vector rendering when set
    pub map_id: Option<String>,
    pub color_scheme: ColorScheme,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            center: MapLocation::new(48.8566, 2.3522),
            zoom: 13.0,
            focus_zoom: DEFAULT_FOCUS_ZOOM,
            poi_guard: DEFAULT_POI_GUARD,
            map_id: None,
            color_scheme: ColorScheme::Light,
        }
    }
}

/// User interaction with the rendered map
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Tap on empty map
    MapTap { location: MapLocation },
    /// Tap on a built-in point of interest
    PoiTap {
        place_id: String,
        location: MapLocation,
    },
    /// Two-finger rotate/tilt
    Rotate { heading: f64, tilt: f64 },
}

/// Which message a place lookup answers with
#[derive(Debug, Clone, Copy)]
enum PlaceReply {
    Select,
    Details,
}

pub struct MapController<S> {
    sdk: Arc<S>,
    state: MapState,
    render_mode: RenderMode,
    scripts_rx: mpsc::Receiver<String>,
    payloads_tx: mpsc::Sender<String>,
    gestures_rx: mpsc::Receiver<Gesture>,
    snapshot_tx: watch::Sender<SandboxSnapshot>,
}

impl<S> MapController<S>
where
    S: MapSdk + Send + Sync + 'static,
{
    /// Start the map runtime on the given end of the bridge
    pub fn spawn(end: SandboxEnd, sdk: S, options: ControllerOptions) -> SandboxHandle {
        let render_mode = RenderMode::select(options.map_id.as_deref(), options.color_scheme);
        let state = MapState::new(
            CameraState::new(options.center, options.zoom),
            options.focus_zoom,
            options.poi_guard,
        )
        .with_rotation(render_mode.supports_rotation());

        let (gestures_tx, gestures_rx) = mpsc::channel(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());

        let controller = Self {
            sdk: Arc::new(sdk),
            state,
            render_mode: render_mode.clone(),
            scripts_rx: end.scripts_rx,
            payloads_tx: end.payloads_tx,
            gestures_rx,
            snapshot_tx,
        };
        let task = tokio::spawn(controller.run());

        SandboxHandle {
            gestures_tx,
            snapshot_rx,
            render_mode,
            task,
        }
    }

    async fn run(mut self) {
        info!("Map runtime started ({} rendering)", self.render_mode.name());
        post(&self.payloads_tx, BridgeMessage::MapReady).await;

        loop {
            tokio::select! {
                script = self.scripts_rx.recv() => match script {
                    Some(script) => self.handle_script(&script).await,
                    None => {
                        info!("Host closed the bridge, map runtime stopping");
                        break;
                    }
                },
                Some(gesture) = self.gestures_rx.recv() => self.handle_gesture(gesture),
            }

            self.snapshot_tx.send_replace(self.state.snapshot());
        }
    }

    async fn handle_script(&mut self, script: &str) {
        let command = match MapCommand::parse(script) {
            Ok(command) => command,
            Err(e) => {
                error!("Map runtime rejected script: {}", e);
                post(
                    &self.payloads_tx,
                    BridgeMessage::Error(BridgeError {
                        error: e.to_string(),
                    }),
                )
                .await;
                return;
            }
        };

        debug!("Applying {}", command.description());
        if let MapCommand::FetchPlaceDetails { place_id } = &command {
            self.lookup_place(place_id.clone(), PlaceReply::Details);
        }
        self.state.apply(&command);
    }

    fn handle_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::MapTap { location } => {
                self.state.raw_tap(location, Instant::now());
                self.reverse_geocode(location);
            }
            Gesture::PoiTap { place_id, .. } => {
                // The SDK's own info popup is never shown; details come from the lookup
                if !self.state.poi_tap(Instant::now()) && self.state.selected_marker.is_some() {
                    debug!("POI event inside guard window, keeping tap marker");
                }
                self.lookup_place(place_id, PlaceReply::Select);
            }
            Gesture::Rotate { heading, tilt } => self.state.rotate(heading, tilt),
        }
    }

    fn lookup_place(&self, place_id: String, reply: PlaceReply) {
        let sdk = Arc::clone(&self.sdk);
        let tx = self.payloads_tx.clone();

        tokio::spawn(async move {
            let message = match sdk.place_details(&place_id).await {
                Ok(place) => match reply {
                    PlaceReply::Select => BridgeMessage::PlaceSelect(place.to_place_select()),
                    PlaceReply::Details => BridgeMessage::PlaceDetails(place.to_details_update()),
                },
                Err(e) => BridgeMessage::Error(BridgeError {
                    error: format!("Place details failed for {place_id}: {e}"),
                }),
            };
            post(&tx, message).await;
        });
    }

    fn reverse_geocode(&self, location: MapLocation) {
        let sdk = Arc::clone(&self.sdk);
        let tx = self.payloads_tx.clone();

        tokio::spawn(async move {
            let address = match sdk.reverse_geocode(location).await {
                Ok(address) => address.unwrap_or_default(),
                Err(e) => {
                    debug!("Reverse geocoding failed at {}: {}", location, e);
                    String::new()
                }
            };

            let name = first_address_segment(&address).map(str::to_string);
            post(
                &tx,
                BridgeMessage::LocationSelect(LocationSelect {
                    latitude: location.latitude,
                    longitude: location.longitude,
                    address,
                    name,
                }),
            )
            .await;
        });
    }
}

/// Serialize and post a message to the host
async fn post(tx: &mpsc::Sender<String>, message: BridgeMessage) {
    let payload = match message.to_json() {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to encode {} message: {}", message.kind(), e);
            return;
        }
    };

    if tx.send(payload).await.is_err() {
        debug!("Host end gone, dropping {} message", message.kind());
    }
}

/// Handle to a running map runtime
pub struct SandboxHandle {
    gestures_tx: mpsc::Sender<Gesture>,
    snapshot_rx: watch::Receiver<SandboxSnapshot>,
    render_mode: RenderMode,
    task: JoinHandle<()>,
}

impl SandboxHandle {
    pub async fn gesture(&self, gesture: Gesture) -> Result<()> {
        self.gestures_tx
            .send(gesture)
            .await
            .map_err(|_| Error::channel_send("map gestures"))
    }

    pub async fn tap(&self, location: MapLocation) -> Result<()> {
        self.gesture(Gesture::MapTap { location }).await
    }

    pub async fn tap_poi(&self, place_id: impl Into<String>, location: MapLocation) -> Result<()> {
        self.gesture(Gesture::PoiTap {
            place_id: place_id.into(),
            location,
        })
        .await
    }

    /// Current camera and markers
    pub fn snapshot(&self) -> SandboxSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SandboxSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn render_mode(&self) -> &RenderMode {
        &self.render_mode
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}
