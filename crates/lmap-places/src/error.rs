use thiserror::Error;

/// Errors returned by the place service client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a status other than `OK` or `ZERO_RESULTS`.
    #[error("Place service returned {status}: {message}")]
    Api { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A place came back without coordinates.
    #[error("Place {0} has no geometry")]
    MissingGeometry(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl PlacesError {
    /// Transport-level failure, as opposed to an answer from the service
    pub fn is_network(&self) -> bool {
        matches!(self, PlacesError::Http(_))
    }

    /// Message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            PlacesError::Http(_) => "Network error".to_string(),
            PlacesError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => "Search failed".to_string(),
        }
    }
}

impl From<PlacesError> for lmap_core::Error {
    fn from(err: PlacesError) -> Self {
        tracing::debug!("place service failure: {}", err);
        lmap_core::Error::places(err.user_message())
    }
}
