use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use aqiwatch_geocoding::Location;

use crate::error::ConfigError;

/// Environment variable that selects the AQI backend base URL.
pub const AQI_API_URL_ENV: &str = "AQI_API_URL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Proxy server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream AQI prediction backend (used by the proxy)
    #[serde(default)]
    pub backend: BackendConfig,

    /// Where the AQI client sends its requests
    #[serde(default)]
    pub client: ClientConfig,

    /// Geocoding service
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Default and fallback locations
    #[serde(default)]
    pub locations: LocationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the proxy
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the AQI prediction API (`/overview`, `/health`)
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.aqi.watch".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the AQI client targets; defaults to the local proxy prefix
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: aqiwatch_aqi::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: aqiwatch_geocoding::geocode::NOMINATIM_URL.to_string(),
            user_agent: aqiwatch_geocoding::geocode::USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for every outbound call
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsConfig {
    /// Shown before the user picks anything
    pub default: Location,
    /// Used when the current position cannot be determined
    pub fallback: Location,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            default: Location::new(37.7749, -122.4194, "San Francisco, CA"),
            fallback: Location::new(40.7128, -74.0060, "New York, NY"),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if it doesn't exist.
    /// Environment overrides are applied afterwards.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        let mut config = Self::load_or_create(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file (must exist), then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let mut config = Self::read(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load and validate, failing on errors and logging warnings.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `AQI_API_URL`, which points both the proxy upstream and the
    /// client at the given backend.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(AQI_API_URL_ENV) {
            self.apply_api_url_override(&url);
        }
    }

    fn apply_api_url_override(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        tracing::debug!("{} override: {}", AQI_API_URL_ENV, url);
        self.backend.base_url = url.to_string();
        self.client.base_url = url.to_string();
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.bind.parse::<SocketAddr>().is_err() {
            result.add_error(
                "server.bind",
                format!("Invalid bind address: {}", self.server.bind),
            );
        }

        self.validate_url(&self.backend.base_url, "backend.base_url", &mut result);
        self.validate_url(&self.client.base_url, "client.base_url", &mut result);
        self.validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);

        if self.geocoding.user_agent.trim().is_empty() {
            result.add_error("geocoding.user_agent", "User-Agent must not be empty");
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        } else if self.http.timeout_secs > 120 {
            result.add_warning("http.timeout_secs", "Timeout is unusually long (>120s)");
        }

        validate_location(&self.locations.default, "locations.default", &mut result);
        validate_location(&self.locations.fallback, "locations.fallback", &mut result);

        if self.client.base_url.trim_end_matches('/') == self.backend.base_url.trim_end_matches('/') {
            result.add_warning(
                "client.base_url",
                "Client talks to the backend directly, bypassing the proxy",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the given file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("user config directory".to_string()))?
            .join("aqiwatch");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_location(location: &Location, field: &str, result: &mut ValidationResult) {
    if !(-90.0..=90.0).contains(&location.lat) {
        result.add_error(field, "Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&location.lng) {
        result.add_error(field, "Longitude must be between -180 and 180");
    }
    if location.name.trim().is_empty() {
        result.add_warning(field, "Location has no name");
    }
}
