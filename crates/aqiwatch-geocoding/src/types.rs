use serde::{Deserialize, Serialize};

/// A place the user has chosen to look up air quality for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
        }
    }
}

/// A single forward or reverse geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    /// Short display name, e.g. "Paris, France"
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Full upstream description
    pub display_name: String,
    /// Upstream place type, "location" when unknown, "reverse" for reverse lookups
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&GeocodingResult> for Location {
    fn from(result: &GeocodingResult) -> Self {
        Location::new(result.lat, result.lng, result.name.clone())
    }
}

/// Nominatim place record, shared by `/search` (array items) and `/reverse`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimPlace {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub address: Option<NominatimAddress>,
}

/// Address breakdown returned when `addressdetails=1` is requested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

/// Geocoding failures. The display text is what gets shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    #[error("Geocoding API error: {0}")]
    SearchStatus(u16),
    #[error("Reverse geocoding API error: {0}")]
    ReverseStatus(u16),
    #[error("No locations found")]
    NoResults,
    #[error("Invalid reverse geocoding response")]
    InvalidReverse,
    #[error("Invalid coordinate in geocoding response: {0}")]
    InvalidCoordinate(String),
    #[error("Malformed geocoding response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}
