//! AQI backend client.
//!
//! Single-attempt requests; retry and backoff are the caller's concern.

use std::time::Duration;

use tracing::instrument;

use crate::error::{AqiError, RequestError};
use crate::types::{AqiOverview, HealthStatus};

/// Default base URL: the proxy's own route prefix on the default bind address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/api/aqi";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AqiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AqiClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for an overview request. `use_demo` only appears when set.
    pub fn overview_params(lat: f64, lon: f64, use_demo: bool) -> Vec<(&'static str, String)> {
        let mut params = vec![("lat", lat.to_string()), ("lon", lon.to_string())];
        if use_demo {
            params.push(("use_demo", "true".to_string()));
        }
        params
    }

    /// Fetch the full overview payload for a coordinate pair.
    #[instrument(skip(self), level = "info")]
    pub async fn get_overview(
        &self,
        lat: f64,
        lon: f64,
        use_demo: bool,
    ) -> Result<AqiOverview, AqiError> {
        let url = format!("{}/overview", self.base_url);
        let params = Self::overview_params(lat, lon, use_demo);

        self.get_json(&url, &params).await.map_err(|e| {
            tracing::error!("Error fetching AQI data: {}", e);
            AqiError::Overview(e)
        })
    }

    /// Probe backend health with a plain GET.
    #[instrument(skip(self), level = "debug")]
    pub async fn health_check(&self) -> Result<HealthStatus, AqiError> {
        let url = format!("{}/health", self.base_url);

        self.get_json(&url, &[]).await.map_err(|e| {
            tracing::warn!("Error checking API health: {}", e);
            AqiError::Health(e)
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, RequestError> {
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn overview_body(value: u32, category: &str) -> serde_json::Value {
        serde_json::json!({
            "location": {"city": "San Francisco", "coordinates": {"latitude": 37.7749, "longitude": -122.4194}},
            "current_aqi": {"value": value, "category": category, "description": "Air quality is satisfactory for most people."},
            "pollutant_breakdown": {
                "PM2.5": {"value": 16.8, "unit": "μg/m³", "category": "Good", "description": "Fine particulate matter"},
                "PM10": {"value": 21.0, "unit": "μg/m³", "category": "Good", "description": "Coarse particulate matter"},
                "O3": {"value": 33.6, "unit": "μg/m³", "category": "Good", "description": "Ground-level ozone"},
                "dominant_pollutant": {"name": "O3", "value": 33.6, "contribution": 80.0}
            },
            "trend_analysis": {
                "overall_trend": "Stable", "description": "Air quality has been stable",
                "trend_strength": "Weak", "historical_change": -2.5, "predicted_change": 1.0,
                "volatility": 5.8, "pattern": "Consistent", "confidence": "high"
            },
            "air_quality_alerts": [],
            "seasonal_recommendations": ["Good time for outdoor activities when air quality permits"],
            "historical_data": [{"date": "2026-10-17", "aqi": 39, "category": "Good"}],
            "predicted_data": [{"date": "2026-10-19", "aqi": 44.2, "category": "Good"}],
            "aqi_scale_reference": {"0-50": "Good"},
            "timestamp": "2026-10-18T09:30:00",
            "data_source": "real_api"
        })
    }

    #[test]
    fn test_overview_params_without_demo() {
        let params = AqiClient::overview_params(37.7749, -122.4194, false);
        assert_eq!(
            params,
            vec![("lat", "37.7749".to_string()), ("lon", "-122.4194".to_string())]
        );
    }

    #[test]
    fn test_overview_params_with_demo() {
        let params = AqiClient::overview_params(1.5, 2.5, true);
        assert!(params.contains(&("use_demo", "true".to_string())));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AqiClient::new("http://localhost:3000/api/aqi/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api/aqi");
    }

    #[tokio::test]
    async fn test_get_overview() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/overview"))
            .and(query_param("lat", "37.7749"))
            .and(query_param("lon", "-122.4194"))
            .and(query_param_is_missing("use_demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(overview_body(42, "Good")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AqiClient::new(&mock_server.uri()).unwrap();
        let overview = client.get_overview(37.7749, -122.4194, false).await.unwrap();

        assert_eq!(overview.current_aqi.value, 42.0);
        assert_eq!(overview.location.city, "San Francisco");
        assert_eq!(overview.pollutant_breakdown.entries().len(), 3);
        assert_eq!(overview.predicted_data[0].aqi, 44.2);
        assert!(!overview.is_demo());
    }

    #[tokio::test]
    async fn test_get_overview_demo_flag() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/overview"))
            .and(query_param("use_demo", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(overview_body(42, "Good")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AqiClient::new(&mock_server.uri()).unwrap();
        assert!(client.get_overview(10.0, 20.0, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_overview_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/overview"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = AqiClient::new(&mock_server.uri()).unwrap();
        let err = client.get_overview(1.0, 2.0, false).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to fetch AQI data: HTTP error! status: 503"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_get_overview_transport_error() {
        let client =
            AqiClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client.get_overview(1.0, 2.0, false).await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to fetch AQI data: "));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_health_check() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy",
                "predictor_loaded": true,
                "timestamp": "2026-10-18T09:30:00"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AqiClient::new(&mock_server.uri()).unwrap();
        let health = client.health_check().await.unwrap();

        assert_eq!(health.status, "healthy");
        assert!(health.predictor_loaded);
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = AqiClient::new(&mock_server.uri()).unwrap();
        let err = client.health_check().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to check API health: HTTP error! status: 500"
        );
    }
}
