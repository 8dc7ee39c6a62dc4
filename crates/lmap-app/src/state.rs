//! Application state (Model in TEA pattern)

use lmap_core::{MapLocation, SavedPlace, Selection};
use lmap_places::LocationBias;

use crate::config::Settings;
use crate::location::LocationPhase;
use crate::search::{SearchHistory, SearchState};
use crate::store::StoredState;

/// Host lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Running,
    Quitting,
}

/// Credentials and flags persisted across runs
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub api_key: Option<String>,
    /// Map styling identifier; its presence selects vector rendering
    pub map_id: Option<String>,
    pub location_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_key: None,
            map_id: None,
            location_enabled: true,
        }
    }
}

impl Preferences {
    /// Heading reset needs camera rotation, which only vector mode has
    pub fn supports_rotation(&self) -> bool {
        self.map_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationState {
    pub phase: LocationPhase,
    /// Last successful fix
    pub user_location: Option<MapLocation>,
}

/// Complete host state
#[derive(Debug)]
pub struct AppState {
    pub phase: AppPhase,
    pub settings: Settings,
    pub prefs: Preferences,

    /// The map runtime has announced `mapReady` and not disconnected since
    pub map_ready: bool,

    /// What the UI is currently discussing; independent of the rendered marker
    pub selection: Option<Selection>,

    /// Newest first
    pub saved_places: Vec<SavedPlace>,

    pub search: SearchState,
    pub location: LocationState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let search = SearchState::new(
            settings.search.history_limit,
            settings.search.min_autocomplete_chars,
        );
        Self {
            phase: AppPhase::Running,
            settings,
            prefs: Preferences::default(),
            map_ready: false,
            selection: None,
            saved_places: Vec::new(),
            search,
            location: LocationState::default(),
        }
    }

    /// Apply values loaded from persistence
    pub fn restore(&mut self, stored: StoredState) {
        self.prefs = Preferences {
            api_key: stored.api_key,
            map_id: stored.map_id,
            location_enabled: stored.location_enabled,
        };
        self.saved_places = stored.saved_places;
        self.search.history =
            SearchHistory::from_entries(stored.history, self.settings.search.history_limit);
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    /// Bias searches around the last known user position
    pub fn search_bias(&self) -> Option<LocationBias> {
        self.location
            .user_location
            .map(|location| LocationBias::new(location, self.settings.search.bias_radius_m))
    }
}
