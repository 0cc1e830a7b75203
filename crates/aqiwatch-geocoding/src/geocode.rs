//! Forward and reverse geocoding against Nominatim (OpenStreetMap).
//! Free, no API key required; every request carries the configured User-Agent.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use crate::types::{GeocodingError, GeocodingResult, NominatimAddress, NominatimPlace};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const USER_AGENT: &str = "AqiWatch/1.0";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Queries shorter than this (after trimming) never reach the network.
pub const MIN_QUERY_LEN: usize = 3;

const SEARCH_LIMIT: &str = "5";
const UNKNOWN_LOCATION: &str = "Unknown location";

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl GeocodingClient {
    /// Client for the public Nominatim instance.
    pub fn new() -> Result<Self, GeocodingError> {
        Self::with_options(
            NOMINATIM_URL,
            USER_AGENT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search places by free text, returning at most five matches.
    ///
    /// Short queries return an empty list without issuing a request.
    #[instrument(skip(self), level = "debug")]
    pub async fn search_location(
        &self,
        query: &str,
    ) -> Result<Vec<GeocodingResult>, GeocodingError> {
        if query.trim().chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", SEARCH_LIMIT),
                ("addressdetails", "1"),
                ("extratags", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Geocoding search returned status {}", status);
            return Err(GeocodingError::SearchStatus(status.as_u16()));
        }

        let items = match response.json::<Value>().await? {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Err(GeocodingError::NoResults),
        };

        let results = items
            .into_iter()
            .map(|item| {
                let place: NominatimPlace = serde_json::from_value(item)
                    .map_err(|e| GeocodingError::Malformed(e.to_string()))?;
                let kind = non_empty(&place.kind).unwrap_or("location").to_string();
                to_result(&place, kind)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Geocoding search found {} results", results.len());
        Ok(results)
    }

    /// Resolve a coordinate pair to a named place.
    #[instrument(skip(self), level = "debug")]
    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<GeocodingResult, GeocodingError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Reverse geocode returned status {}", status);
            return Err(GeocodingError::ReverseStatus(status.as_u16()));
        }

        // Nominatim answers unknown coordinates with 200 and {"error": "..."}
        let place: NominatimPlace = match response.json::<Value>().await? {
            value @ Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| GeocodingError::Malformed(e.to_string()))?,
            _ => return Err(GeocodingError::InvalidReverse),
        };
        if place.lat.is_none() || place.lon.is_none() {
            return Err(GeocodingError::InvalidReverse);
        }

        let result = to_result(&place, "reverse".to_string())?;
        tracing::info!("Reverse geocoded to: {}", result.name);
        Ok(result)
    }
}

fn to_result(place: &NominatimPlace, kind: String) -> Result<GeocodingResult, GeocodingError> {
    Ok(GeocodingResult {
        name: format_location_name(place),
        lat: parse_coordinate(place.lat.as_deref())?,
        lng: parse_coordinate(place.lon.as_deref())?,
        display_name: place.display_name.clone().unwrap_or_default(),
        kind,
    })
}

fn parse_coordinate(raw: Option<&str>) -> Result<f64, GeocodingError> {
    let raw = raw.ok_or_else(|| GeocodingError::InvalidCoordinate("missing".to_string()))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeocodingError::InvalidCoordinate(raw.to_string()))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Build a short place name.
///
/// Priority: city, town, village, state (each paired with the country),
/// then the country alone, then the first segment of the full display name.
pub fn format_location_name(place: &NominatimPlace) -> String {
    let empty = NominatimAddress::default();
    let address = place.address.as_ref().unwrap_or(&empty);

    if let Some(country) = non_empty(&address.country) {
        let locality = non_empty(&address.city)
            .or_else(|| non_empty(&address.town))
            .or_else(|| non_empty(&address.village))
            .or_else(|| non_empty(&address.state));

        return match locality {
            Some(locality) => format!("{}, {}", locality, country),
            None => country.to_string(),
        };
    }

    place
        .display_name
        .as_deref()
        .map(|d| d.split(',').next().unwrap_or_default().to_string())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}
