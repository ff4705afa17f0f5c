//! HTTP route handlers.
//!
//! Probe and info responses are never cached. Every other path falls through
//! to the static file service.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod info;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_PROBE;
use crate::http::static_files::create_static_service;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Probes and diagnostics - always fresh
    let probe_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/livez", get(health::livez))
        .route("/probes/{name}", get(health::by_name))
        .route("/info", get(info::info))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PROBE),
        ));

    Router::new()
        .merge(probe_routes)
        .fallback_service(create_static_service(&state.config.static_files))
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::probes::{ProbeManager, ProbeOptions};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    fn state_with_delay(delay: i64, static_dir: &str) -> AppState {
        let mut config = AppConfig::default();
        config.static_files.dir = static_dir.to_string();
        config.app.namespace_path = "/nonexistent/namespace".to_string();
        let probes = ProbeManager::new(ProbeOptions {
            min_delay_seconds: Some(delay),
            max_delay_seconds: Some(delay),
        });
        AppState::new(config, probes)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, http::HeaderMap, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_probes_ready() {
        let app = create_router(state_with_delay(0, "/nonexistent"));

        for (uri, name) in [("/healthz", "healthz"), ("/readyz", "readyz"), ("/livez", "livez")] {
            let (status, headers, body) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(headers[CACHE_CONTROL], "no-store");
            assert_eq!(body["status"], "ok");
            assert_eq!(body["probe"], name);
            assert_eq!(body["ok"], true);
            assert_eq!(body["remainingSeconds"], 0);
        }
    }

    #[tokio::test]
    async fn test_probes_pending() {
        let app = create_router(state_with_delay(3600, "/nonexistent"));

        let (status, _, body) = get_json(app, "/readyz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["ok"], false);
        assert_eq!(body["delaySeconds"], 3600);
        assert!(body["remainingSeconds"].as_u64().unwrap() > 3500);
        assert!(body["since"].is_i64());
    }

    #[tokio::test]
    async fn test_probe_by_name() {
        let app = create_router(state_with_delay(0, "/nonexistent"));

        let (status, _, body) = get_json(app.clone(), "/probes/livez").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["probe"], "livez");

        let (status, _, body) = get_json(app, "/probes/startupz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_info_payload() {
        let state = state_with_delay(0, "/nonexistent");
        let started_at = state.probes.started_at().timestamp_millis();
        let app = create_router(state);

        let (status, headers, body) = get_json(app, "/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CACHE_CONTROL], "no-store");
        assert_eq!(body["app"]["name"], "kube-lab-image");
        assert_eq!(body["app"]["port"], 8080);
        assert!(body["app"]["startedAt"].as_str().unwrap().ends_with('Z'));
        for name in ["healthz", "readyz", "livez"] {
            assert_eq!(body["probes"][name]["probe"], name);
            assert_eq!(body["probes"][name]["since"], started_at);
            assert!(body["probes"][name].get("status").is_none());
        }
        assert!(body["kubernetes"]["api"].is_object());
        assert_eq!(body["container"]["pid"], std::process::id());
    }

    #[tokio::test]
    async fn test_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>lab</h1>").unwrap();
        let app = create_router(state_with_delay(0, dir.path().to_str().unwrap()));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[CACHE_CONTROL]
            .to_str()
            .unwrap()
            .starts_with("public"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>lab</h1>");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/missing.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
