//! Core domain types shared by the host and the map runtime

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Reviews kept per place; extra reviews are dropped at decode time
pub const MAX_REVIEWS: usize = 5;

/// Fallback display name when neither place details nor an address exist
pub const SELECTED_LOCATION_LABEL: &str = "Selected location";

/// A WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl MapLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for MapLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relative_time: String,
}

/// Enrichment attached to a selection once the map runtime resolves a place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
}

impl PlaceDetails {
    /// Overlay the lighter field set of a later update onto these details.
    ///
    /// Fields the update does not carry (hours, phone, reviews) are kept.
    pub fn merge(&mut self, update: &PlaceDetails) {
        if !update.name.is_empty() {
            self.name = update.name.clone();
        }
        if !update.address.is_empty() {
            self.address = update.address.clone();
        }
        if update.rating.is_some() {
            self.rating = update.rating;
        }
        if update.total_ratings > 0 {
            self.total_ratings = update.total_ratings;
        }
        if update.is_open.is_some() {
            self.is_open = update.is_open;
        }
        if update.opening_hours.is_some() {
            self.opening_hours = update.opening_hours.clone();
        }
        if update.phone_number.is_some() {
            self.phone_number = update.phone_number.clone();
        }
        if !update.reviews.is_empty() {
            self.reviews = update.reviews.clone();
        }
    }
}

/// The single logical selection the UI is currently discussing.
///
/// This is independent of the marker rendered inside the map runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub location: MapLocation,
    pub address: Option<String>,
    pub details: Option<PlaceDetails>,
}

impl Selection {
    pub fn at(location: MapLocation) -> Self {
        Self {
            location,
            address: None,
            details: None,
        }
    }

    /// Name shown for this selection: details name, then the first address
    /// segment, then a generic label
    pub fn display_name(&self) -> String {
        if let Some(details) = &self.details {
            if !details.name.trim().is_empty() {
                return details.name.clone();
            }
        }
        derive_place_name(self.address.as_deref().unwrap_or(""))
    }

    /// Address shown for this selection: details address, then the plain address
    pub fn display_address(&self) -> String {
        self.details
            .as_ref()
            .map(|d| d.address.clone())
            .filter(|a| !a.is_empty())
            .or_else(|| self.address.clone())
            .unwrap_or_default()
    }
}

/// A place the user explicitly saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlace {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub location: MapLocation,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl SavedPlace {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub place_id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub location: MapLocation,
}

/// An unconfirmed autocomplete candidate; it has no coordinates until resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteSuggestion {
    pub place_id: String,
    /// Primary text
    pub name: String,
    /// Secondary text
    pub address: String,
}

/// First comma-delimited segment of an address, trimmed
pub fn first_address_segment(address: &str) -> Option<&str> {
    address
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Derive a short place name from a formatted address
pub fn derive_place_name(address: &str) -> String {
    first_address_segment(address)
        .unwrap_or(SELECTED_LOCATION_LABEL)
        .to_string()
}
