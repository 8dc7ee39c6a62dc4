//! Service seams implemented by [`PlacesClient`]

use lmap_core::prelude::*;
use lmap_core::{AutocompleteSuggestion, MapLocation, SearchResult};
use lmap_sandbox::{MapSdk, ResolvedPlace};

use crate::client::{PlacesClient, BASIC_DETAIL_FIELDS, FULL_DETAIL_FIELDS};
use crate::types::LocationBias;

/// Search operations the host pipeline depends on.
///
/// An empty `Ok` list means the service found nothing; `Err` means the
/// request failed.
#[trait_variant::make(PlaceService: Send)]
pub trait LocalPlaceService {
    async fn text_search(&self, query: &str, bias: Option<LocationBias>)
        -> Result<Vec<SearchResult>>;

    async fn autocomplete(
        &self,
        input: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<AutocompleteSuggestion>>;

    /// Resolve a suggestion to a selectable result with coordinates
    async fn resolve(&self, suggestion: &AutocompleteSuggestion) -> Result<SearchResult>;
}

impl PlaceService for PlacesClient {
    async fn text_search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<SearchResult>> {
        Ok(PlacesClient::text_search(self, query, bias).await?)
    }

    async fn autocomplete(
        &self,
        input: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<AutocompleteSuggestion>> {
        Ok(PlacesClient::autocomplete(self, input, bias).await?)
    }

    async fn resolve(&self, suggestion: &AutocompleteSuggestion) -> Result<SearchResult> {
        let place = self
            .details(&suggestion.place_id, BASIC_DETAIL_FIELDS)
            .await?;

        let name = if place.details.name.is_empty() {
            suggestion.name.clone()
        } else {
            place.details.name
        };
        let address = if place.details.address.is_empty() {
            suggestion.address.clone()
        } else {
            place.details.address
        };

        Ok(SearchResult {
            place_id: suggestion.place_id.clone(),
            name,
            address,
            location: place.location,
        })
    }
}

impl MapSdk for PlacesClient {
    async fn place_details(&self, place_id: &str) -> Result<ResolvedPlace> {
        Ok(self.details(place_id, FULL_DETAIL_FIELDS).await?)
    }

    async fn reverse_geocode(&self, location: MapLocation) -> Result<Option<String>> {
        Ok(PlacesClient::reverse_geocode(self, location).await?)
    }
}
