//! State shared across proxy handlers.

use std::sync::Arc;

use aqiwatch_core::Config;

/// Upstream connection pool and backend location. Immutable once built;
/// concurrent requests share nothing else.
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub client: reqwest::Client,
    pub backend_url: String,
}

impl ProxyState {
    pub fn new(client: reqwest::Client, backend_url: &str) -> Arc<Self> {
        Arc::new(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Arc<Self>, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .build()?;
        Ok(Self::new(client, &config.backend.base_url))
    }
}
