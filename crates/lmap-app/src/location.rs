//! Location service adapter
//!
//! The platform seam is [`LocationProvider`]: one permission request and one
//! position fix. The flow around it (preference gate, sequential legs,
//! bounded wait) lives in the handler and actions.

use std::time::Duration;

use lmap_core::prelude::*;
use lmap_core::MapLocation;

/// Phase of the "go to my location" flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPhase {
    #[default]
    Idle,
    RequestingPermission,
    Fetching,
}

impl LocationPhase {
    pub fn is_busy(&self) -> bool {
        !matches!(self, LocationPhase::Idle)
    }
}

/// Platform location services
#[trait_variant::make(LocationProvider: Send)]
pub trait LocalLocationProvider {
    /// Ask for a runtime grant. `Ok(false)` means denied.
    async fn request_permission(&self) -> Result<bool>;

    /// One position fix
    async fn current_position(&self) -> Result<MapLocation>;
}

/// Provider that answers from a configured position.
///
/// Used by the headless runner and tests. Without a position every fix fails
/// as unavailable.
#[derive(Debug, Clone)]
pub struct StaticLocationProvider {
    position: Option<MapLocation>,
    grant: bool,
    delay: Duration,
}

impl StaticLocationProvider {
    pub fn new(position: Option<MapLocation>) -> Self {
        Self {
            position,
            grant: true,
            delay: Duration::ZERO,
        }
    }

    pub fn denying(mut self) -> Self {
        self.grant = false;
        self
    }

    /// Delay every fix, to simulate a slow receiver
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl LocationProvider for StaticLocationProvider {
    async fn request_permission(&self) -> Result<bool> {
        Ok(self.grant)
    }

    async fn current_position(&self) -> Result<MapLocation> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.position
            .ok_or_else(|| Error::location_unavailable("no position configured"))
    }
}

/// The permission leg. A refusal is [`Error::LocationPermissionDenied`].
pub async fn request_grant<L: LocationProvider>(provider: &L) -> Result<()> {
    if provider.request_permission().await? {
        Ok(())
    } else {
        Err(Error::LocationPermissionDenied)
    }
}

/// One fix with a bounded wait
pub async fn fix_with_timeout<L: LocationProvider>(
    provider: &L,
    timeout: Duration,
) -> Result<MapLocation> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(Error::LocationTimeout {
            secs: timeout.as_secs(),
        }),
    }
}
