//! Configuration file parsing for Light Maps
//!
//! Supports `.lmap/config.toml` for map, search, location, bridge and
//! place service settings.

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings, save_settings};
pub use types::*;
