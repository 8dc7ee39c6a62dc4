//! Settings parser for .lmap/config.toml

use super::types::Settings;
use lmap_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const LMAP_DIR: &str = ".lmap";

/// Path of the config file under `base_dir`
pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(LMAP_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `.lmap/config.toml`.
///
/// A missing or unreadable file yields defaults.
pub fn load_settings(base_dir: &Path) -> Settings {
    let config_path = config_path(base_dir);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create `.lmap/config.toml` with commented defaults if it is missing
pub fn init_config_dir(base_dir: &Path) -> Result<()> {
    let lmap_dir = base_dir.join(LMAP_DIR);

    if !lmap_dir.exists() {
        std::fs::create_dir_all(&lmap_dir)
            .map_err(|e| Error::config(format!("Failed to create .lmap dir: {}", e)))?;
    }

    let config_path = lmap_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# Light Maps Configuration

[map]
latitude = 48.8566
longitude = 2.3522
zoom = 13.0
focus_zoom = 17.0       # Zoom used when jumping to a place
locate_zoom = 15.0      # Zoom used when centering on your position
color_scheme = "light"  # light | dark

[search]
debounce_ms = 300
min_autocomplete_chars = 2
bias_radius_m = 50000
max_results = 15
max_suggestions = 5
history_limit = 10

[location]
fix_timeout_secs = 60
requires_runtime_permission = false
# fixed = { latitude = 48.8566, longitude = 2.3522 }

[bridge]
poi_guard_ms = 500
channel_capacity = 64

[places]
timeout_secs = 15
# base_url = "https://maps.googleapis.com/maps/api/"
"#;

        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(())
}

/// Save settings to `.lmap/config.toml`.
///
/// Uses atomic write (temp file + rename).
pub fn save_settings(base_dir: &Path, settings: &Settings) -> Result<()> {
    let lmap_dir = base_dir.join(LMAP_DIR);

    if !lmap_dir.exists() {
        std::fs::create_dir_all(&lmap_dir)
            .map_err(|e| Error::config(format!("Failed to create .lmap dir: {}", e)))?;
    }

    let config_path = lmap_dir.join(CONFIG_FILENAME);
    let temp_path = lmap_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("# Light Maps Configuration\n\n{}", content);

    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}
