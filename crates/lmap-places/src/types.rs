//! Response shapes of the remote place service

use serde::Deserialize;

use lmap_core::{AutocompleteSuggestion, MapLocation, PlaceDetails, Review, SearchResult};

/// Envelope status. Only `OK` and `ZERO_RESULTS` are successful answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceStatus {
    Ok,
    ZeroResults,
    Other(String),
}

impl PlaceStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "OK" => PlaceStatus::Ok,
            "ZERO_RESULTS" => PlaceStatus::ZeroResults,
            other => PlaceStatus::Other(other.to_string()),
        }
    }
}

/// Search-origin bias
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationBias {
    pub location: MapLocation,
    pub radius_m: u32,
}

impl LocationBias {
    pub fn new(location: MapLocation, radius_m: u32) -> Self {
        Self { location, radius_m }
    }

    pub(crate) fn location_param(&self) -> String {
        format!("{},{}", self.location.latitude, self.location.longitude)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
}

impl Geometry {
    pub fn to_location(&self) -> MapLocation {
        MapLocation::new(self.location.lat, self.location.lng)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextSearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<RawPlace>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlace {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Option<Geometry>,
}

impl RawPlace {
    pub fn into_search_result(self) -> Option<SearchResult> {
        let location = self.geometry.as_ref()?.to_location();
        Some(SearchResult {
            place_id: self.place_id,
            name: self.name,
            address: self.formatted_address,
            location,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Prediction {
    pub place_id: String,
    #[serde(default)]
    pub description: String,
    pub structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StructuredFormatting {
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: String,
}

impl Prediction {
    pub fn into_suggestion(self) -> AutocompleteSuggestion {
        let (name, address) = match self.structured_formatting {
            Some(f) => (f.main_text, f.secondary_text),
            None => (self.description, String::new()),
        };
        AutocompleteSuggestion {
            place_id: self.place_id,
            name,
            address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    pub result: Option<RawDetails>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDetails {
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub opening_hours: Option<OpeningHours>,
    pub formatted_phone_number: Option<String>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub reviews: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpeningHours {
    pub open_now: Option<bool>,
    pub weekday_text: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawReview {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relative_time_description: String,
}

impl RawDetails {
    pub fn to_details(&self, place_id: &str) -> PlaceDetails {
        PlaceDetails {
            name: self.name.clone(),
            address: self.formatted_address.clone(),
            rating: self.rating,
            total_ratings: self.user_ratings_total.unwrap_or(0),
            is_open: self.opening_hours.as_ref().and_then(|h| h.open_now),
            opening_hours: self
                .opening_hours
                .as_ref()
                .and_then(|h| h.weekday_text.clone()),
            phone_number: self.formatted_phone_number.clone(),
            place_id: Some(self.place_id.clone().unwrap_or_else(|| place_id.to_string())),
            reviews: self
                .reviews
                .iter()
                .take(lmap_core::MAX_REVIEWS)
                .map(|r| Review {
                    author_name: r.author_name.clone(),
                    rating: r.rating,
                    text: r.text.clone(),
                    relative_time: r.relative_time_description.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
}
