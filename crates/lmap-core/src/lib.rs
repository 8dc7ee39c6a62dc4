//! # lmap-core - Core Domain Types
//!
//! Foundation crate for Light Maps. Provides the map domain types shared by the
//! host and the embedded map runtime, the inbound bridge message union, error
//! handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`MapLocation`] - Immutable WGS84 coordinate pair
//! - [`Selection`], [`PlaceDetails`], [`Review`] - The single active selection and its enrichment
//! - [`SavedPlace`] - A user-saved location
//! - [`SearchResult`], [`AutocompleteSuggestion`] - Search pipeline outputs
//!
//! ### Events (`events`)
//! - [`BridgeMessage`] - Tagged union of messages emitted by the map runtime
//! - [`BridgeEvent`] - Wrapper delivered to the host event loop
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum grouped by layer
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use lmap_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all Light Maps crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result};
pub use events::{
    BridgeError, BridgeEvent, BridgeMessage, LocationSelect, PlaceDetailsUpdate, PlaceSelect,
    SearchResults,
};
pub use types::{
    derive_place_name, first_address_segment, AutocompleteSuggestion, MapLocation, PlaceDetails,
    Review, SavedPlace, SearchResult, Selection, MAX_REVIEWS, SELECTED_LOCATION_LABEL,
};
