//! Configuration types for Light Maps
//!
//! Defines `Settings` (`.lmap/config.toml`) and its sections.

use std::time::Duration;

use lmap_core::MapLocation;
use serde::{Deserialize, Serialize};

/// Application settings (.lmap/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub map: MapSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub location: LocationSettings,

    #[serde(default)]
    pub bridge: BridgeSettings,

    #[serde(default)]
    pub places: PlacesSettings,
}

/// Light or dark map styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSchemeSetting {
    #[default]
    Light,
    Dark,
}

impl std::fmt::Display for ColorSchemeSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorSchemeSetting::Light => write!(f, "light"),
            ColorSchemeSetting::Dark => write!(f, "dark"),
        }
    }
}

/// Camera defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapSettings {
    /// Initial camera latitude
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Initial camera longitude
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Zoom used by `goToPlace`
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: f64,

    /// Zoom used when recentering on a location fix
    #[serde(default = "default_locate_zoom")]
    pub locate_zoom: f64,

    #[serde(default)]
    pub color_scheme: ColorSchemeSetting,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            zoom: default_zoom(),
            focus_zoom: default_focus_zoom(),
            locate_zoom: default_locate_zoom(),
            color_scheme: ColorSchemeSetting::default(),
        }
    }
}

impl MapSettings {
    pub fn center(&self) -> MapLocation {
        MapLocation::new(self.latitude, self.longitude)
    }
}

fn default_latitude() -> f64 {
    48.8566
}

fn default_longitude() -> f64 {
    2.3522
}

fn default_zoom() -> f64 {
    13.0
}

fn default_focus_zoom() -> f64 {
    17.0
}

fn default_locate_zoom() -> f64 {
    15.0
}

/// Search pipeline settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Quiet period before an autocomplete request, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Shortest input that triggers autocomplete
    #[serde(default = "default_min_autocomplete_chars")]
    pub min_autocomplete_chars: usize,

    /// Radius of the location bias, in meters
    #[serde(default = "default_bias_radius_m")]
    pub bias_radius_m: u32,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Entries kept in the search history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_autocomplete_chars: default_min_autocomplete_chars(),
            bias_radius_m: default_bias_radius_m(),
            max_results: default_max_results(),
            max_suggestions: default_max_suggestions(),
            history_limit: default_history_limit(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_autocomplete_chars() -> usize {
    2
}

fn default_bias_radius_m() -> u32 {
    50_000
}

fn default_max_results() -> usize {
    15
}

fn default_max_suggestions() -> usize {
    5
}

fn default_history_limit() -> usize {
    10
}

/// A simulated position for the headless location provider
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<FixedPosition> for MapLocation {
    fn from(p: FixedPosition) -> Self {
        MapLocation::new(p.latitude, p.longitude)
    }
}

/// Location flow settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationSettings {
    /// Bounded wait for one fix, in seconds
    #[serde(default = "default_fix_timeout_secs")]
    pub fix_timeout_secs: u64,

    /// Ask for a runtime grant before every fix
    #[serde(default)]
    pub requires_runtime_permission: bool,

    /// Position reported by the headless provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<FixedPosition>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            fix_timeout_secs: default_fix_timeout_secs(),
            requires_runtime_permission: false,
            fixed: None,
        }
    }
}

impl LocationSettings {
    pub fn fix_timeout(&self) -> Duration {
        Duration::from_secs(self.fix_timeout_secs)
    }
}

fn default_fix_timeout_secs() -> u64 {
    60
}

/// Bridge and map runtime settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BridgeSettings {
    /// Window after a coordinate tap during which a POI event keeps the marker
    #[serde(default = "default_poi_guard_ms")]
    pub poi_guard_ms: u64,

    /// Capacity of each direction of the wire
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            poi_guard_ms: default_poi_guard_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl BridgeSettings {
    pub fn poi_guard(&self) -> Duration {
        Duration::from_millis(self.poi_guard_ms)
    }
}

fn default_poi_guard_ms() -> u64 {
    500
}

fn default_channel_capacity() -> usize {
    lmap_bridge::DEFAULT_CHANNEL_CAPACITY
}

/// Remote place service settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlacesSettings {
    /// Override the service base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}
