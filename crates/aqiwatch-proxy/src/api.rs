//! Proxy route handlers.
//!
//! Each inbound request maps to exactly one outbound request. Handlers hold
//! no state beyond the shared connection pool, so concurrent requests are
//! independent.
//!
//! ## Error Handling
//!
//! Client errors (missing coordinates) return 400 before any upstream call.
//! Upstream HTTP errors are relayed as-is. Transport failures become a 500
//! with a fixed message via [`ProxyError`]; the underlying error is only logged.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, RawQuery, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::state::ProxyState;

pub const OVERVIEW_ROUTE: &str = "/api/aqi/overview";
pub const HEALTH_ROUTE: &str = "/api/aqi/health";

pub const MISSING_COORDINATES: &str = "Missing required parameters: lat and lon";
pub const OVERVIEW_FAILED: &str = "Failed to fetch AQI data";
pub const HEALTH_FAILED: &str = "Failed to check API health";

/// Create the proxy router.
pub fn router() -> Router<Arc<ProxyState>> {
    Router::new()
        .route(OVERVIEW_ROUTE, get(overview))
        .route(HEALTH_ROUTE, get(health))
}

/// Forward an overview request. `lat` and `lon` must be present and non-empty;
/// the rest of the query string passes through untouched.
async fn overview(
    State(state): State<Arc<ProxyState>>,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, ProxyError> {
    let present = |key: &str| params.get(key).is_some_and(|v| !v.is_empty());
    if !present("lat") || !present("lon") {
        return Err(ProxyError::BadRequest(MISSING_COORDINATES.to_string()));
    }

    let mut url = format!("{}/overview", state.backend_url);
    if let Some(query) = raw_query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(&query);
    }

    relay(&state, &url).await.map_err(|e| {
        tracing::error!("Error in AQI proxy: {}", e);
        ProxyError::Upstream(OVERVIEW_FAILED.to_string())
    })
}

/// Forward a health probe.
async fn health(State(state): State<Arc<ProxyState>>) -> Result<Response, ProxyError> {
    let url = format!("{}/health", state.backend_url);

    relay(&state, &url).await.map_err(|e| {
        tracing::error!("Error in AQI health proxy: {}", e);
        ProxyError::Upstream(HEALTH_FAILED.to_string())
    })
}

/// Issue one GET upstream and mirror its status, content type and body.
async fn relay(state: &ProxyState, url: &str) -> Result<Response, reqwest::Error> {
    tracing::debug!("Proxying to {}", url);

    let upstream = state
        .client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let body = upstream.bytes().await?;

    if !status.is_success() {
        tracing::warn!("Upstream returned {} for {}", status, url);
    }

    Ok((status, [(header::CONTENT_TYPE, content_type)], Body::from(body)).into_response())
}

/// Proxy error type. Rendered as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ProxyError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ProxyError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(backend_url: &str) -> Router {
        router().with_state(ProxyState::new(reqwest::Client::new(), backend_url))
    }

    async fn send(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_overview_forwards_query_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/overview"))
            .and(query_param("lat", "37.7749"))
            .and(query_param("lon", "-122.4194"))
            .and(query_param("use_demo", "true"))
            .and(query_param("extra", "kept"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_aqi": {"value": 42, "category": "Good"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = send(
            app_for(&mock_server.uri()),
            "/api/aqi/overview?lat=37.7749&lon=-122.4194&use_demo=true&extra=kept",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json = response_json(response).await;
        assert_eq!(json["current_aqi"]["value"], 42);
    }

    #[tokio::test]
    async fn test_overview_missing_lon_is_rejected_without_upstream_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let response = send(app_for(&mock_server.uri()), "/api/aqi/overview?lat=37.7749").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], MISSING_COORDINATES);
    }

    #[tokio::test]
    async fn test_overview_empty_lat_is_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let response = send(app_for(&mock_server.uri()), "/api/aqi/overview?lat=&lon=2").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(app_for(&mock_server.uri()), "/api/aqi/overview").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overview_relays_upstream_error_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/overview"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Invalid coordinates",
                "message": "Latitude must be between -90 and 90, longitude between -180 and 180"
            })))
            .mount(&mock_server)
            .await;

        let response = send(app_for(&mock_server.uri()), "/api/aqi/overview?lat=91&lon=0").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Invalid coordinates");
    }

    #[tokio::test]
    async fn test_overview_transport_failure_is_generic_500() {
        // Nothing listens on port 1
        let response = send(app_for("http://127.0.0.1:1"), "/api/aqi/overview?lat=1&lon=2").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], OVERVIEW_FAILED);
    }

    #[tokio::test]
    async fn test_health_forwards() {
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

        let response = send(app_for(&mock_server.uri()), HEALTH_ROUTE).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_health_relays_service_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Service unavailable"
            })))
            .mount(&mock_server)
            .await;

        let response = send(app_for(&mock_server.uri()), HEALTH_ROUTE).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_transport_failure() {
        let response = send(app_for("http://127.0.0.1:1"), HEALTH_ROUTE).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], HEALTH_FAILED);
    }

    #[tokio::test]
    async fn test_post_is_not_routed() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(HEALTH_ROUTE)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
