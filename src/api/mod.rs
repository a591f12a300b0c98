use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::simulate;

pub mod cli;
mod params;
mod usage;

pub use params::{QueryParams, resolve};
pub use usage::usage_text;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Where and how the HTTP API listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; any origin when `None`.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS origin {origin:?}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: header::InvalidHeaderValue,
    },
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server failed")]
    Serve(#[source] std::io::Error),
}

pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    match origin {
        None => Ok(layer.allow_origin(Any)),
        Some(origin) => {
            let value =
                HeaderValue::from_str(origin).map_err(|source| ServerError::InvalidOrigin {
                    origin: origin.to_string(),
                    source,
                })?;
            Ok(layer.allow_origin(value))
        }
    }
}

/// Every route is GET-only; other methods get an empty 405 from the router.
pub fn router(cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(usage_handler))
        .route("/usage", get(usage_handler))
        .route("/simulate", get(simulate_handler))
        .route("/api/simulate", get(simulate_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_http_server(config: ServerConfig) -> Result<(), ServerError> {
    let app = router(cors_layer(config.cors_origin.as_deref())?);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(%addr, cors_origin = ?config.cors_origin, "life plan HTTP API listening");
    info!("local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!(%err, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

async fn usage_handler() -> Response {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        usage_text(),
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(query: Option<Query<HashMap<String, String>>>) -> Response {
    let raw = query.map(|Query(raw)| raw).unwrap_or_default();
    let params = resolve(&raw);
    json_response(StatusCode::OK, simulate(&params))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    fn query(pairs: &[(&str, &str)]) -> Option<Query<HashMap<String, String>>> {
        Some(Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    async fn send(method: Method, uri: &str) -> Response {
        let app = router(cors_layer(None).expect("any origin"));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        app.oneshot(request).await.expect("router is infallible")
    }

    fn assert_no_store(response: &Response) {
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn simulate_without_query_uses_defaults() {
        let response = simulate_handler(None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);

        let json = body_json(response).await;
        assert_eq!(json["monthly"].as_array().map(Vec::len), Some(120));
        assert_eq!(json["inputs"]["months"], 120);
        assert_eq!(json["checkpoints"]["mid"]["month"], 60);
        assert_eq!(json["checkpoints"]["final"]["month"], 120);
        assert_eq!(json["recommendations"].as_array().map(Vec::len), Some(3));
        assert!(
            json["summary"]
                .as_str()
                .is_some_and(|s| s.starts_with("After 120 months"))
        );
    }

    #[tokio::test]
    async fn simulate_applies_query_overrides() {
        let response = simulate_handler(query(&[
            ("months", "36"),
            ("houseBuyMonth", "12"),
            ("homePrice", "300000"),
            ("collegeStartMonth", "2"),
        ]))
        .await;
        let json = body_json(response).await;

        assert_eq!(json["monthly"].as_array().map(Vec::len), Some(36));
        let events = json["lifeEvents"].as_array().expect("lifeEvents array");
        assert_eq!(events.len(), 2);
        assert!(events[0].as_str().is_some_and(|e| e.starts_with("Month 2: Started college")));
        assert!(events[1].as_str().is_some_and(|e| e.starts_with("Month 12: Bought a $300000.00 home")));
        assert_eq!(json["inputs"]["homePrice"], 300_000.0);
    }

    #[tokio::test]
    async fn malformed_query_values_fall_back_silently() {
        let response = simulate_handler(query(&[("months", "lots"), ("carLoanYears", "0")])).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["inputs"]["months"], 120);
        assert_eq!(json["inputs"]["carLoanYears"], 5);
    }

    #[tokio::test]
    async fn single_month_document_matches_hand_computation() {
        let response = simulate_handler(query(&[
            ("months", "1"),
            ("startingCash", "1000"),
            ("monthlyInvest", "100"),
            ("returnAnnual", "0"),
            ("salaryAnnual", "0"),
            ("monthlyExpenses", "0"),
        ]))
        .await;
        let json = body_json(response).await;
        let record = &json["monthly"][0];
        assert_eq!(record["cash"], 900.0);
        assert_eq!(record["portfolio"], 100.0);
        assert_eq!(record["debt"], 0.0);
        assert_eq!(record["netWorth"], 1_000.0);
        assert_eq!(json["checkpoints"]["mid"], json["checkpoints"]["final"]);
    }

    #[tokio::test]
    async fn usage_is_plain_text() {
        let response = usage_handler().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/plain; charset=utf-8"))
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let text = String::from_utf8(bytes.to_vec()).expect("utf-8");
        assert!(text.contains("studentLoanYears"));
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn post_to_simulate_is_an_empty_405() {
        let response = send(Method::POST, "/simulate").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn router_answers_unknown_paths_with_json_404() {
        let response = send(Method::GET, "/no-such-path").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_no_store(&response);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn router_serves_simulation_on_both_paths() {
        for path in ["/simulate?months=3", "/api/simulate?months=3"] {
            let response = send(Method::GET, path).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
            assert_no_store(&response);
            let json = body_json(response).await;
            assert_eq!(json["monthly"].as_array().map(Vec::len), Some(3), "{path}");
            assert!(json["houseAffordability"]["suggested"].is_object(), "{path}");
        }
    }

    #[test]
    fn server_config_default_binds_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.cors_origin, None);
    }

    #[test]
    fn cors_origin_must_be_a_header_value() {
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some("http://localhost:3000")).is_ok());
        let err = cors_layer(Some("http://bad\norigin")).expect_err("newline rejected");
        assert!(matches!(err, ServerError::InvalidOrigin { .. }));
    }

    #[test]
    fn router_builds_with_either_cors_policy() {
        let _open = router(cors_layer(None).expect("any origin"));
        let _pinned = router(cors_layer(Some("http://localhost:3000")).expect("pinned origin"));
    }
}
