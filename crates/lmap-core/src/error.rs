//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Bridge Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Bridge protocol error: {message}")]
    Protocol { message: String },

    #[error("Invalid map command: {message}")]
    Command { message: String },

    #[error("Map runtime error: {message}")]
    Sandbox { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    // ─────────────────────────────────────────────────────────────
    // Place Service Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Place service error: {message}")]
    Places { message: String },

    #[error("Missing credential: {key}")]
    MissingCredential { key: String },

    // ─────────────────────────────────────────────────────────────
    // Location Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Location permission denied")]
    LocationPermissionDenied,

    #[error("Location fix timed out after {secs}s")]
    LocationTimeout { secs: u64 },

    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration / Storage Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    pub fn sandbox(message: impl Into<String>) -> Self {
        Self::Sandbox {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    pub fn places(message: impl Into<String>) -> Self {
        Self::Places {
            message: message.into(),
        }
    }

    pub fn missing_credential(key: impl Into<String>) -> Self {
        Self::MissingCredential { key: key.into() }
    }

    pub fn location_unavailable(message: impl Into<String>) -> Self {
        Self::LocationUnavailable {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Location failures resolve silently back to idle
    pub fn is_location_failure(&self) -> bool {
        matches!(
            self,
            Error::LocationPermissionDenied
                | Error::LocationTimeout { .. }
                | Error::LocationUnavailable { .. }
        )
    }
}
