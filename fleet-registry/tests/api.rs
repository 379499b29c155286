//! HTTP-surface tests for the Registry, exercised end-to-end through
//! `axum-test` rather than by calling handlers directly.

use axum_test::TestServer;
use fleet_registry::config::RegistryConfig;
use serde_json::{json, Value};

fn test_config() -> RegistryConfig {
    RegistryConfig {
        port: 0,
        health_interval: 30,
        health_timeout: 5,
        cleanup_interval: 60,
        log_level: "info".to_string(),
    }
}

fn test_server() -> TestServer {
    let (app, _state) = fleet_registry::create_server(&test_config());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn health_reports_zero_services_on_a_fresh_registry() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["registered_services"], 0);
    assert_eq!(body["healthy_services"], 0);
}

#[tokio::test]
async fn register_then_list_then_get_round_trips() {
    let server = test_server();

    let response = server
        .post("/services")
        .json(&json!({
            "name": "worker-1",
            "host": "10.0.0.2",
            "port": 9100,
            "hostname": "worker-1",
            "url": "http://10.0.0.2:9100",
            "status": "running",
            "metadata": {"type": "worker"},
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let list = server.get("/services").await;
    list.assert_status_ok();
    let body: Value = list.json();
    assert_eq!(body["total"], 1);

    let get = server.get("/services/worker-1").await;
    get.assert_status_ok();
    let body: Value = get.json();
    assert_eq!(body["host"], "10.0.0.2");
    assert_eq!(body["is_healthy"], true);
}

#[tokio::test]
async fn register_with_missing_field_is_rejected() {
    let server = test_server();
    let response = server
        .post("/services")
        .json(&json!({ "name": "worker-1" }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn get_unknown_service_is_404() {
    let server = test_server();
    let response = server.get("/services/does-not-exist").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn heartbeat_on_unknown_service_is_404() {
    let server = test_server();
    let response = server.post("/services/does-not-exist/heartbeat").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_returns_not_found() {
    let server = test_server();
    server
        .post("/services")
        .json(&json!({
            "name": "worker-1",
            "host": "10.0.0.2",
            "port": 9100,
            "hostname": "worker-1",
            "url": "http://10.0.0.2:9100",
            "status": "running",
            "metadata": {},
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    server
        .delete("/services/worker-1")
        .await
        .assert_status_ok();
    server
        .get("/services/worker-1")
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_reflects_status_distribution() {
    let server = test_server();
    for (name, status) in [("a", "running"), ("b", "running"), ("c", "stopped")] {
        server
            .post("/services")
            .json(&json!({
                "name": name,
                "host": "10.0.0.2",
                "port": 9100,
                "hostname": name,
                "url": format!("http://10.0.0.2:9100/{name}"),
                "status": status,
                "metadata": {},
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    let response = server.get("/stats").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_services"], 3);
    assert_eq!(body["status_distribution"]["running"], 2);
    assert_eq!(body["status_distribution"]["stopped"], 1);
}
