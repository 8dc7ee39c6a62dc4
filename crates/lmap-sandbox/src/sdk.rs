//! Map SDK services the controller calls asynchronously

use lmap_core::prelude::*;
use lmap_core::{MapLocation, PlaceDetails, PlaceDetailsUpdate, PlaceSelect};

/// A place resolved by the SDK from its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub place_id: String,
    pub location: MapLocation,
    pub details: PlaceDetails,
}

impl ResolvedPlace {
    /// Full `placeSelect` payload
    pub fn to_place_select(&self) -> PlaceSelect {
        let details = &self.details;
        let mut reviews = details.reviews.clone();
        reviews.truncate(lmap_core::MAX_REVIEWS);

        PlaceSelect {
            place_id: self.place_id.clone(),
            name: details.name.clone(),
            address: details.address.clone(),
            rating: details.rating,
            total_ratings: details.total_ratings,
            is_open: details.is_open,
            opening_hours: details.opening_hours.clone(),
            phone_number: details.phone_number.clone(),
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            reviews,
        }
    }

    /// Lighter `placeDetails` payload
    pub fn to_details_update(&self) -> PlaceDetailsUpdate {
        PlaceDetailsUpdate {
            name: self.details.name.clone(),
            address: self.details.address.clone(),
            rating: self.details.rating,
            total_ratings: self.details.total_ratings,
            is_open: self.details.is_open,
        }
    }
}

/// Place lookups backing POI and coordinate taps
#[trait_variant::make(MapSdk: Send)]
pub trait LocalMapSdk {
    /// Resolve full details for a place identifier
    async fn place_details(&self, place_id: &str) -> Result<ResolvedPlace>;

    /// Formatted address for a coordinate, `None` when nothing matches
    async fn reverse_geocode(&self, location: MapLocation) -> Result<Option<String>>;
}
