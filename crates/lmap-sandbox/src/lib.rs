//! # lmap-sandbox - Embedded Map Controller
//!
//! The map runtime side of the bridge. It owns the camera, the selection
//! marker and the user-location marker, applies injected scripts, and turns
//! user gestures into outbound bridge messages.
//!
//! ## Public API
//!
//! - [`MapController`] - Spawns the runtime task on a [`lmap_bridge::SandboxEnd`]
//! - [`SandboxHandle`] - Inject gestures and observe [`SandboxSnapshot`]s
//! - [`MapSdk`] - Place lookups used for POI and coordinate taps
//! - [`RenderMode`] - Vector or raster rendering, chosen at start

pub mod controller;
pub mod render;
pub mod sdk;
pub mod state;

pub use controller::{
    ControllerOptions, Gesture, MapController, SandboxHandle, DEFAULT_FOCUS_ZOOM,
    DEFAULT_POI_GUARD,
};
pub use render::{raster_styles, ColorScheme, RenderMode, StyleRule};
pub use sdk::{LocalMapSdk, MapSdk, ResolvedPlace};
pub use state::{CameraState, Marker, SandboxSnapshot};
