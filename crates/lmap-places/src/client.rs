//! HTTP client for the remote place service.
//!
//! Wraps `reqwest` with API key handling, location bias, and typed response
//! decoding. Every endpoint checks the `"status"` field of the JSON envelope:
//! `OK` and `ZERO_RESULTS` are answers, anything else surfaces as
//! [`PlacesError::Api`].

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use lmap_core::{AutocompleteSuggestion, MapLocation, SearchResult};
use lmap_sandbox::ResolvedPlace;

use crate::error::PlacesError;
use crate::types::{
    AutocompleteResponse, DetailsResponse, GeocodeResponse, LocationBias, PlaceStatus,
    TextSearchResponse,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Default cap on text search results
pub const DEFAULT_MAX_RESULTS: usize = 15;

/// Default cap on autocomplete suggestions
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Fields requested for a POI tap
pub const FULL_DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "formatted_address",
    "rating",
    "user_ratings_total",
    "opening_hours",
    "geometry",
    "reviews",
    "formatted_phone_number",
];

/// Fields requested to resolve a suggestion or refresh details
pub const BASIC_DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "formatted_address",
    "rating",
    "user_ratings_total",
    "opening_hours",
    "geometry",
];

/// Client for the remote place service.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_results: usize,
    max_suggestions: usize,
}

impl PlacesClient {
    /// Creates a client pointed at the production service.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("light-maps/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Exactly one trailing slash so endpoint paths join under it
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_results: DEFAULT_MAX_RESULTS,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        })
    }

    pub fn with_limits(mut self, max_results: usize, max_suggestions: usize) -> Self {
        self.max_results = max_results;
        self.max_suggestions = max_suggestions;
        self
    }

    /// Full-text place search.
    ///
    /// `ZERO_RESULTS` yields an empty list. Results without coordinates are
    /// skipped and at most `max_results` are returned.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the service returns an error status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body has an unexpected shape.
    pub async fn text_search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<SearchResult>, PlacesError> {
        let mut params = vec![("query", query.to_string())];
        push_bias(&mut params, bias);

        let url = self.build_url("place/textsearch/json", &params)?;
        let response: TextSearchResponse = self.request_json(&url, "textsearch").await?;

        match check_status(&response.status, response.error_message)? {
            PlaceStatus::ZeroResults => Ok(Vec::new()),
            _ => Ok(response
                .results
                .into_iter()
                .filter_map(|place| place.into_search_result())
                .take(self.max_results)
                .collect()),
        }
    }

    /// Autocomplete predictions for partial input.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::text_search`].
    pub async fn autocomplete(
        &self,
        input: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<AutocompleteSuggestion>, PlacesError> {
        let mut params = vec![("input", input.to_string())];
        push_bias(&mut params, bias);

        let url = self.build_url("place/autocomplete/json", &params)?;
        let response: AutocompleteResponse = self.request_json(&url, "autocomplete").await?;

        match check_status(&response.status, response.error_message)? {
            PlaceStatus::ZeroResults => Ok(Vec::new()),
            _ => Ok(response
                .predictions
                .into_iter()
                .take(self.max_suggestions)
                .map(|p| p.into_suggestion())
                .collect()),
        }
    }

    /// Place details for an identifier.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] for any status other than `OK`, including
    ///   `ZERO_RESULTS` / `NOT_FOUND`.
    /// - [`PlacesError::MissingGeometry`] if the place has no coordinates.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] as above.
    pub async fn details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<ResolvedPlace, PlacesError> {
        let params = vec![
            ("place_id", place_id.to_string()),
            ("fields", fields.join(",")),
        ];

        let url = self.build_url("place/details/json", &params)?;
        let response: DetailsResponse = self.request_json(&url, "details").await?;

        let status = check_status(&response.status, response.error_message.clone())?;
        let result = match (status, response.result) {
            (PlaceStatus::Ok, Some(result)) => result,
            (_, _) => {
                return Err(PlacesError::Api {
                    status: response.status,
                    message: format!("No details for {place_id}"),
                })
            }
        };

        let location = result
            .geometry
            .as_ref()
            .map(|g| g.to_location())
            .ok_or_else(|| PlacesError::MissingGeometry(place_id.to_string()))?;

        Ok(ResolvedPlace {
            place_id: place_id.to_string(),
            location,
            details: result.to_details(place_id),
        })
    }

    /// Formatted address of the best match for a coordinate.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::text_search`].
    pub async fn reverse_geocode(
        &self,
        location: MapLocation,
    ) -> Result<Option<String>, PlacesError> {
        let latlng = format!("{},{}", location.latitude, location.longitude);
        let url = self.build_url("geocode/json", &[("latlng", latlng)])?;
        let response: GeocodeResponse = self.request_json(&url, "geocode").await?;

        match check_status(&response.status, response.error_message)? {
            PlaceStatus::ZeroResults => Ok(None),
            _ => Ok(response
                .results
                .into_iter()
                .map(|r| r.formatted_address)
                .find(|a| !a.is_empty())),
        }
    }

    /// Builds the endpoint URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, extra: &[(&str, String)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl(format!("'{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and decodes the body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlacesError> {
        tracing::debug!(endpoint = context, "place service request");

        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

fn push_bias(params: &mut Vec<(&str, String)>, bias: Option<LocationBias>) {
    if let Some(bias) = bias {
        params.push(("location", bias.location_param()));
        params.push(("radius", bias.radius_m.to_string()));
    }
}

/// Accepts `OK` and `ZERO_RESULTS`; anything else is an API error.
fn check_status(status: &str, error_message: Option<String>) -> Result<PlaceStatus, PlacesError> {
    match PlaceStatus::parse(status) {
        PlaceStatus::Other(status) => Err(PlacesError::Api {
            status,
            message: error_message.unwrap_or_default(),
        }),
        ok => Ok(ok),
    }
}
