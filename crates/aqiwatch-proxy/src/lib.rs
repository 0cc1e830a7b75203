//! Same-origin proxy for the AQI prediction backend.
//!
//! Browsers and other clients call this service instead of the backend
//! directly, which keeps the backend host private and avoids CORS issues.
//!
//! # Endpoints
//!
//! - `GET /api/aqi/overview?lat=..&lon=..[&...]` - forwards the query
//!   string verbatim to `{backend}/overview`
//! - `GET /api/aqi/health` - forwards to `{backend}/health`
//!
//! Upstream responses are relayed with their status, body and content type.
//! Only transport failures are replaced by a generic `500 {"error": ...}`.
//!
//! # Configuration
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [backend]
//! base_url = "https://api.aqi.watch"   # or set AQI_API_URL
//! ```

pub mod api;
pub mod server;
pub mod state;

pub use api::{router, ProxyError, HEALTH_ROUTE, OVERVIEW_ROUTE};
pub use server::{app, serve};
pub use state::ProxyState;
