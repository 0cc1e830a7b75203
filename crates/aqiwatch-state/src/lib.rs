//! Shared application state for AqiWatch.
//!
//! [`AqiStore`] holds the last AQI overview plus loading, error and health
//! flags. [`LocationSelector`] turns user intent (a search pick, the current
//! position, or nothing at all) into a fetch on that store.

pub mod location;
pub mod store;

pub use location::{LocationSelector, CURRENT_LOCATION_NAME};
pub use store::{AqiState, AqiStore, Settlement};
