//! Client for the AQI prediction backend.
//!
//! Fetches the overview payload (current AQI, pollutants, trend, health
//! guidance, historical and predicted series) and probes backend health.

pub mod client;
pub mod error;
pub mod types;

pub use client::{AqiClient, DEFAULT_BASE_URL};
pub use error::{AqiError, RequestError};
pub use types::*;
