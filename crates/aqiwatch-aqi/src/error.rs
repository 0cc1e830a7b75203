//! AQI client error types.

use thiserror::Error;

/// Why a single request to the backend failed.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures surfaced by [`crate::AqiClient`]. Display text is UI-ready.
#[derive(Debug, Error)]
pub enum AqiError {
    #[error("Failed to fetch AQI data: {0}")]
    Overview(#[source] RequestError),

    #[error("Failed to check API health: {0}")]
    Health(#[source] RequestError),
}

impl AqiError {
    /// Upstream HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AqiError::Overview(RequestError::Status(code))
            | AqiError::Health(RequestError::Status(code)) => Some(*code),
            _ => None,
        }
    }
}
