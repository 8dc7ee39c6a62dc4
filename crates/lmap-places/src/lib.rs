//! # lmap-places - Remote Place Service Client
//!
//! Text search, autocomplete, place details and reverse geocoding over HTTP.
//! [`PlacesClient`] backs both the host search pipeline ([`PlaceService`]) and
//! the map runtime's place lookups ([`lmap_sandbox::MapSdk`]).

pub mod client;
pub mod error;
pub mod service;
pub mod types;

pub use client::{PlacesClient, DEFAULT_MAX_RESULTS, DEFAULT_MAX_SUGGESTIONS};
pub use error::PlacesError;
pub use service::{LocalPlaceService, PlaceService};
pub use types::{LocationBias, PlaceStatus};
