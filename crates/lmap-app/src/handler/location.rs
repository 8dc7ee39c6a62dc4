//! "Go to my location" flow
//!
//! `Idle -> RequestingPermission -> Fetching -> Idle`. The permission leg is
//! skipped when the platform needs no runtime grant. Failures are logged and
//! end quietly in `Idle`.

use lmap_bridge::MapCommand;
use lmap_core::prelude::*;
use lmap_core::MapLocation;

use super::{UpdateAction, UpdateResult};
use crate::location::LocationPhase;
use crate::state::AppState;

pub fn handle_locate(state: &mut AppState) -> UpdateResult {
    if !state.prefs.location_enabled {
        debug!("Location disabled, not locating");
        return UpdateResult::none();
    }

    if state.location.phase.is_busy() {
        debug!("Location flow already running ({:?})", state.location.phase);
        return UpdateResult::none();
    }

    if state.settings.location.requires_runtime_permission {
        state.location.phase = LocationPhase::RequestingPermission;
        UpdateResult::action(UpdateAction::RequestLocationPermission)
    } else {
        start_fetch(state)
    }
}

pub fn handle_permission(state: &mut AppState, granted: bool) -> UpdateResult {
    if state.location.phase != LocationPhase::RequestingPermission {
        debug!("Ignoring permission result in {:?}", state.location.phase);
        return UpdateResult::none();
    }

    if granted {
        start_fetch(state)
    } else {
        info!("Location permission denied");
        state.location.phase = LocationPhase::Idle;
        UpdateResult::none()
    }
}

/// Record the fix, recenter and move the user marker as one unit
pub fn handle_fix(state: &mut AppState, location: MapLocation) -> UpdateResult {
    if state.location.phase != LocationPhase::Fetching {
        debug!("Ignoring fix in {:?}", state.location.phase);
        return UpdateResult::none();
    }

    debug!("Location fix: {}", location);
    state.location.phase = LocationPhase::Idle;
    state.location.user_location = Some(location);

    UpdateResult::commands(vec![
        MapCommand::SetCenter {
            location,
            zoom: Some(state.settings.map.locate_zoom),
        },
        MapCommand::SetUserLocation { location },
    ])
}

pub fn handle_failure(state: &mut AppState, reason: &str) -> UpdateResult {
    debug!("Location flow failed: {}", reason);
    state.location.phase = LocationPhase::Idle;
    UpdateResult::none()
}

fn start_fetch(state: &mut AppState) -> UpdateResult {
    state.location.phase = LocationPhase::Fetching;
    UpdateResult::action(UpdateAction::FetchLocation {
        timeout: state.settings.location.fix_timeout(),
    })
}
