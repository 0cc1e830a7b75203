//! Centralized error types for AqiWatch.
//!
//! This module provides a typed error hierarchy that:
//! - Wraps the geocoding and AQI client errors without losing their detail
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;

use aqiwatch_aqi::{AqiError, RequestError};
use aqiwatch_geocoding::GeocodingError;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    #[error(transparent)]
    Aqi(#[from] AqiError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Geocoding(e) => geocoding_user_message(e),
            AppError::Aqi(e) => aqi_user_message(e),
        }
    }
}

fn geocoding_user_message(error: &GeocodingError) -> &'static str {
    match error {
        GeocodingError::NoResults => "No matching places found. Try a different search.",
        GeocodingError::InvalidReverse => "Couldn't name your current location.",
        GeocodingError::Network(e) => e.into_network_error().user_message(),
        GeocodingError::SearchStatus(_)
        | GeocodingError::ReverseStatus(_)
        | GeocodingError::InvalidCoordinate(_)
        | GeocodingError::Malformed(_) => "Location search failed. Please try again.",
    }
}

fn aqi_user_message(error: &AqiError) -> &'static str {
    let inner = match error {
        AqiError::Overview(inner) | AqiError::Health(inner) => inner,
    };
    match inner {
        RequestError::Status(status) if *status >= 500 => {
            "The air quality service is having issues. Please try again later."
        }
        RequestError::Status(_) => "The air quality request failed. Please try again.",
        RequestError::Transport(e) => e.into_network_error().user_message(),
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration IO error: {0}")]
    Io(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Check the path.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Io(_) => "Configuration file could not be read or written.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for &reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_error_passes_through_display() {
        let app_err: AppError = AqiError::Overview(RequestError::Status(503)).into();
        assert_eq!(
            app_err.to_string(),
            "Failed to fetch AQI data: HTTP error! status: 503"
        );
        assert_eq!(
            app_err.user_message(),
            "The air quality service is having issues. Please try again later."
        );
    }

    #[test]
    fn test_aqi_client_error_message() {
        let app_err: AppError = AqiError::Health(RequestError::Status(404)).into();
        assert_eq!(
            app_err.user_message(),
            "The air quality request failed. Please try again."
        );
    }

    #[test]
    fn test_geocoding_user_messages() {
        let app_err: AppError = GeocodingError::NoResults.into();
        assert_eq!(app_err.to_string(), "No locations found");
        assert!(app_err.user_message().contains("No matching places"));

        let app_err: AppError = GeocodingError::SearchStatus(500).into();
        assert!(app_err.user_message().contains("Location search failed"));
    }

    #[test]
    fn test_config_error_conversion() {
        let app_err: AppError = ConfigError::Invalid("server.bind".into()).into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
        assert_eq!(
            app_err.user_message(),
            "Invalid configuration. Check your settings."
        );
    }

    #[test]
    fn test_network_error_messages() {
        assert!(NetworkError::Timeout.user_message().contains("timed out"));
        let app_err: AppError = NetworkError::ConnectionFailed("refused".into()).into();
        assert_eq!(app_err.to_string(), "Network error: Connection failed: refused");
        assert!(app_err.user_message().contains("Unable to connect"));
    }
}
