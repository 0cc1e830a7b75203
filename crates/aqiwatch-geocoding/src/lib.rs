//! Geocoding for AqiWatch
//!
//! Turns free-text place queries and coordinate pairs into short,
//! human-readable place names via Nominatim.

pub mod geocode;
pub mod types;

pub use geocode::{format_location_name, GeocodingClient, MIN_QUERY_LEN};
pub use types::*;
