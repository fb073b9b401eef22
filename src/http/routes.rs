//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.client_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let allowed_origins: Vec<HeaderValue> = state
            .config
            .client_origins
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    // The browser client connects to the bare host, `/ws` is kept for proxies
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_sessions: usize,
    time_acceleration: u32,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_sessions: state.registry.active_sessions(),
        time_acceleration: state.config.time_acceleration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::store::SessionStore;

    #[tokio::test]
    async fn health_reports_live_sessions() {
        let state = AppState::new(
            Config {
                time_acceleration: 3,
                ..Config::default()
            },
            SessionStore::memory(),
        );
        state.registry.claim(Uuid::new_v4());

        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["active_sessions"], 1);
        assert_eq!(json["time_acceleration"], 3);
    }

    #[tokio::test]
    async fn plain_get_on_socket_route_is_rejected() {
        let state = AppState::new(Config::default(), SessionStore::memory());

        let response = build_router(state)
            .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
