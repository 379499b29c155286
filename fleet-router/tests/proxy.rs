//! End-to-end proxy behavior against mocked backends (spec §8 S2-S4).

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use fleet_router::pool::{Pool, PoolMember};
use fleet_router::RouterState;
use serde_json::Map;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn state_with_pool(pool: Pool) -> Arc<RouterState> {
    Arc::new(RouterState {
        pool,
        http: fleet_common::http::client(Duration::from_secs(300)),
        health_http: fleet_common::http::client(Duration::from_secs(5)),
        health_timeout: Duration::from_secs(5),
        registry_url: "http://127.0.0.1:8081".to_string(),
    })
}

fn server_for(state: Arc<RouterState>) -> TestServer {
    use axum::routing::get;
    use tower_http::trace::TraceLayer;
    let router = axum::Router::new()
        .route("/health", get(fleet_router::handlers::health))
        .route("/stats", get(fleet_router::handlers::stats))
        .route("/services", get(fleet_router::handlers::list_services))
        .fallback(fleet_router::proxy::handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn proxies_to_the_only_healthy_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&backend)
        .await;

    let pool = Pool::new();
    pool.upsert(PoolMember::new(
        "a".to_string(),
        "127.0.0.1".to_string(),
        0,
        backend.uri(),
        1,
        Map::new(),
        false,
    ));
    let state = state_with_pool(pool).await;
    let server = server_for(state);

    let response = server.get("/v1/models").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn empty_pool_returns_503_with_flat_envelope() {
    let state = state_with_pool(Pool::new()).await;
    let server = server_for(state);

    let response = server.get("/v1/models").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No healthy services available");
}

#[tokio::test]
async fn liveness_gating_skips_unhealthy_backend() {
    let backend_a = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a"))
        .mount(&backend_a)
        .await;

    let pool = Pool::new();
    pool.upsert(PoolMember::new(
        "a".to_string(),
        "127.0.0.1".to_string(),
        0,
        backend_a.uri(),
        1,
        Map::new(),
        false,
    ));
    pool.upsert(PoolMember::new(
        "b".to_string(),
        "127.0.0.1".to_string(),
        0,
        "http://127.0.0.1:1".to_string(),
        1,
        Map::new(),
        false,
    ));
    pool.get("b")
        .unwrap()
        .healthy
        .store(false, std::sync::atomic::Ordering::Relaxed);

    let state = state_with_pool(pool).await;
    let server = server_for(state);

    for _ in 0..5 {
        let response = server.get("/ping").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "a");
    }
}

#[test]
fn weighted_selection_sequence_matches_cursor_order() {
    use fleet_router::selection::select;

    let pool = vec![
        Arc::new(PoolMember::new(
            "a".to_string(),
            "h".to_string(),
            0,
            "http://a".to_string(),
            2,
            Map::new(),
            false,
        )),
        Arc::new(PoolMember::new(
            "b".to_string(),
            "h".to_string(),
            0,
            "http://b".to_string(),
            1,
            Map::new(),
            false,
        )),
    ];
    let cursor = AtomicU64::new(0);
    let chosen: Vec<String> = (0..6)
        .map(|_| select(&pool, &cursor).unwrap().name.clone())
        .collect();
    assert_eq!(chosen, vec!["a", "a", "b", "a", "a", "b"]);
}
