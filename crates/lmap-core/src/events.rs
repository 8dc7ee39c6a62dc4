//! Inbound bridge messages emitted by the map runtime

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{
    derive_place_name, MapLocation, PlaceDetails, Review, SearchResult, Selection, MAX_REVIEWS,
};

/// A message from the map runtime to the host, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeMessage {
    MapReady,
    PlaceSelect(PlaceSelect),
    LocationSelect(LocationSelect),
    PlaceDetails(PlaceDetailsUpdate),
    SearchResult(SearchResults),
    Error(BridgeError),
}

impl BridgeMessage {
    /// Wire discriminator, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeMessage::MapReady => "mapReady",
            BridgeMessage::PlaceSelect(_) => "placeSelect",
            BridgeMessage::LocationSelect(_) => "locationSelect",
            BridgeMessage::PlaceDetails(_) => "placeDetails",
            BridgeMessage::SearchResult(_) => "searchResult",
            BridgeMessage::Error(_) => "error",
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A POI was tapped and its details resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSelect {
    pub place_id: String,
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
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "truncated_reviews")]
    pub reviews: Vec<Review>,
}

impl PlaceSelect {
    pub fn location(&self) -> MapLocation {
        MapLocation::new(self.latitude, self.longitude)
    }

    pub fn to_selection(&self) -> Selection {
        Selection {
            location: self.location(),
            address: Some(self.address.clone()),
            details: Some(PlaceDetails {
                name: self.name.clone(),
                address: self.address.clone(),
                rating: self.rating,
                total_ratings: self.total_ratings,
                is_open: self.is_open,
                opening_hours: self.opening_hours.clone(),
                phone_number: self.phone_number.clone(),
                place_id: Some(self.place_id.clone()),
                reviews: self.reviews.clone(),
            }),
        }
    }
}

/// A raw coordinate was tapped and reverse geocoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSelect {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LocationSelect {
    pub fn location(&self) -> MapLocation {
        MapLocation::new(self.latitude, self.longitude)
    }

    /// The carried name, or one derived from the address
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derive_place_name(&self.address),
        }
    }

    pub fn to_selection(&self) -> Selection {
        Selection {
            location: self.location(),
            address: (!self.address.is_empty()).then(|| self.address.clone()),
            details: Some(PlaceDetails {
                name: self.display_name(),
                address: self.address.clone(),
                ..Default::default()
            }),
        }
    }
}

/// Lighter enrichment for an existing selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailsUpdate {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
}

impl PlaceDetailsUpdate {
    pub fn to_details(&self) -> PlaceDetails {
        PlaceDetails {
            name: self.name.clone(),
            address: self.address.clone(),
            rating: self.rating,
            total_ratings: self.total_ratings,
            is_open: self.is_open,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A fault caught at the map runtime boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeError {
    pub error: String,
}

/// Transport-level event delivered to the host
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Message(BridgeMessage),
    /// The map runtime side of the channel went away
    Disconnected,
}

fn truncated_reviews<'de, D>(deserializer: D) -> Result<Vec<Review>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut reviews = Vec::<Review>::deserialize(deserializer)?;
    reviews.truncate(MAX_REVIEWS);
    Ok(reviews)
}
