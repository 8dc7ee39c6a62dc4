//! Camera and marker state owned by the map runtime

use std::time::Duration;

use tokio::time::Instant;

use lmap_bridge::MapCommand;
use lmap_core::MapLocation;

/// Lowest and highest zoom levels the SDK accepts
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub center: MapLocation,
    pub zoom: f64,
    pub heading: f64,
    pub tilt: f64,
}

impl CameraState {
    pub fn new(center: MapLocation, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            heading: 0.0,
            tilt: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: MapLocation,
    pub title: Option<String>,
}

/// Read-only view published after every change
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxSnapshot {
    pub camera: CameraState,
    pub selected_marker: Option<Marker>,
    pub user_marker: Option<Marker>,
    pub rotation_enabled: bool,
}

/// Everything the controller mutates.
///
/// At most one selection marker exists; placing one always replaces the
/// previous one.
#[derive(Debug)]
pub struct MapState {
    pub camera: CameraState,
    pub selected_marker: Option<Marker>,
    pub user_marker: Option<Marker>,
    rotation_enabled: bool,
    focus_zoom: f64,
    poi_guard: Duration,
    /// When the last coordinate tap placed the selection marker
    last_raw_tap: Option<Instant>,
}

impl MapState {
    pub fn new(camera: CameraState, focus_zoom: f64, poi_guard: Duration) -> Self {
        Self {
            camera,
            selected_marker: None,
            user_marker: None,
            rotation_enabled: false,
            focus_zoom,
            poi_guard,
            last_raw_tap: None,
        }
    }

    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotation_enabled = enabled;
        self
    }

    /// Apply an injected command. Repeating a command with the same values
    /// leaves the state unchanged.
    pub fn apply(&mut self, command: &MapCommand) {
        match command {
            MapCommand::SetCenter { location, zoom } => {
                self.camera.center = *location;
                if let Some(zoom) = zoom.filter(|z| *z > 0.0) {
                    self.camera.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
                }
            }
            MapCommand::SetUserLocation { location } => match &mut self.user_marker {
                Some(marker) => marker.position = *location,
                None => {
                    self.user_marker = Some(Marker {
                        position: *location,
                        title: None,
                    })
                }
            },
            MapCommand::ClearSelectedMarker => self.selected_marker = None,
            MapCommand::ResetHeading => {
                self.camera.heading = 0.0;
                self.camera.tilt = 0.0;
            }
            MapCommand::GoToPlace { location, name } => {
                self.camera.center = *location;
                self.camera.zoom = self.focus_zoom;
                self.selected_marker = Some(Marker {
                    position: *location,
                    title: Some(name.clone()),
                });
            }
            MapCommand::ZoomBy { delta } => {
                self.camera.zoom = (self.camera.zoom + f64::from(*delta)).clamp(MIN_ZOOM, MAX_ZOOM);
            }
            // Answered asynchronously; no local state
            MapCommand::FetchPlaceDetails { .. } => {}
        }
    }

    /// User rotated or tilted the map. Ignored in raster mode.
    pub fn rotate(&mut self, heading: f64, tilt: f64) {
        if self.rotation_enabled {
            self.camera.heading = heading.rem_euclid(360.0);
            self.camera.tilt = tilt.clamp(0.0, 67.5);
        }
    }

    /// A coordinate tap replaces the selection marker immediately
    pub fn raw_tap(&mut self, location: MapLocation, now: Instant) {
        self.last_raw_tap = Some(now);
        self.selected_marker = Some(Marker {
            position: location,
            title: None,
        });
    }

    /// A POI tap clears the selection marker unless a coordinate tap placed
    /// it within the guard window. Returns whether the marker was cleared.
    pub fn poi_tap(&mut self, now: Instant) -> bool {
        let guarded = self
            .last_raw_tap
            .is_some_and(|at| now.saturating_duration_since(at) <= self.poi_guard);
        if guarded {
            return false;
        }
        self.selected_marker.take().is_some()
    }

    pub fn snapshot(&self) -> SandboxSnapshot {
        SandboxSnapshot {
            camera: self.camera.clone(),
            selected_marker: self.selected_marker.clone(),
            user_marker: self.user_marker.clone(),
            rotation_enabled: self.rotation_enabled,
        }
    }
}
