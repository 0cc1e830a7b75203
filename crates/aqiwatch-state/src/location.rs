//! Location selection: search suggestions, current position, fallback.
//! Every selection ends in a fetch on the shared store.

use std::sync::Arc;

use parking_lot::RwLock;

use aqiwatch_geocoding::{GeocodingClient, GeocodingResult, Location};

use crate::store::{AqiStore, Settlement};

/// Name used when a position can't be reverse geocoded.
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

pub struct LocationSelector {
    geocoder: GeocodingClient,
    store: Arc<AqiStore>,
    fallback: Location,
    selected: RwLock<Option<Location>>,
}

impl LocationSelector {
    pub fn new(geocoder: GeocodingClient, store: Arc<AqiStore>, fallback: Location) -> Self {
        Self {
            geocoder,
            store,
            fallback,
            selected: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<AqiStore> {
        &self.store
    }

    /// Most recently selected location, if any.
    pub fn selected(&self) -> Option<Location> {
        self.selected.read().clone()
    }

    /// Suggestions for a partially typed query. Failures yield no suggestions.
    pub async fn search_suggestions(&self, query: &str) -> Vec<GeocodingResult> {
        match self.geocoder.search_location(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Search error: {}", e);
                Vec::new()
            }
        }
    }

    /// Select a search suggestion and fetch its air quality.
    pub async fn select_suggestion(&self, suggestion: &GeocodingResult) -> Location {
        let location = Location::from(suggestion);
        self.select(location.clone()).await;
        location
    }

    /// Select the device position, or the fallback location when there is none.
    ///
    /// The position is named by reverse geocoding; if that fails the generic
    /// "Current Location" label is used.
    pub async fn use_current_position(&self, position: Option<(f64, f64)>) -> Location {
        let location = match position {
            None => {
                tracing::warn!(
                    "No current position, falling back to {}",
                    self.fallback.name
                );
                self.fallback.clone()
            }
            Some((lat, lng)) => match self.geocoder.reverse_geocode(lat, lng).await {
                Ok(result) => Location::new(lat, lng, result.name),
                Err(e) => {
                    tracing::warn!("Reverse geocoding error: {}", e);
                    Location::new(lat, lng, CURRENT_LOCATION_NAME)
                }
            },
        };

        self.select(location.clone()).await;
        location
    }

    /// Record the selection and fetch. Demo data is requested while the
    /// backend is marked unhealthy.
    pub async fn select(&self, location: Location) -> Settlement {
        tracing::info!(
            "Selected {} ({}, {})",
            location.name,
            location.lat,
            location.lng
        );
        let (lat, lng) = (location.lat, location.lng);
        *self.selected.write() = Some(location);

        let use_demo = !self.store.is_api_healthy();
        self.store.fetch_aqi_data(lat, lng, use_demo).await
    }
}
