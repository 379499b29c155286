//! Readiness-polling behavior against a mocked worker (spec §4.3 step 2).

use std::time::Duration;

use fleet_supervisor::readiness::wait_ready;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn becomes_ready_on_first_successful_models_response() {
    let worker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "llama-3"}, {"id": "llama-3-70b"}]
        })))
        .mount(&worker)
        .await;

    let models = wait_ready(
        "127.0.0.1",
        worker.address().port(),
        Duration::from_secs(5),
    )
    .await;

    assert_eq!(
        models,
        Some(vec!["llama-3".to_string(), "llama-3-70b".to_string()])
    );
}

#[tokio::test]
async fn retries_silently_through_503_then_succeeds() {
    let worker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&worker)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "llama-3"}]
        })))
        .mount(&worker)
        .await;

    let models = wait_ready(
        "127.0.0.1",
        worker.address().port(),
        Duration::from_secs(5),
    )
    .await;

    assert_eq!(models, Some(vec!["llama-3".to_string()]));
}

#[tokio::test]
async fn exhausts_budget_against_a_worker_that_never_answers() {
    // Nothing listening on this port: every attempt is a connection
    // refused, which `wait_ready` treats as "not ready yet" and retries
    // silently until the budget elapses.
    let models = wait_ready("127.0.0.1", 1, Duration::from_millis(1200)).await;
    assert!(models.is_none());
}

#[tokio::test]
async fn empty_model_list_never_counts_as_ready() {
    let worker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&worker)
        .await;

    let models = wait_ready(
        "127.0.0.1",
        worker.address().port(),
        Duration::from_millis(1200),
    )
    .await;

    assert!(models.is_none());
}
