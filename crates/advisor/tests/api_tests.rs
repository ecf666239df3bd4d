//! Integration tests for the advisor API endpoints

use advisor_lib::{
    health::{components, HealthRegistry},
    observability::{AdvisorMetrics, StructuredLogger},
    RecommendationService,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use instance_advisor::api::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const CATALOG: &str = "\
InstanceType,vCPUs,MemoryMiB,GPUs
A,4,8192,0
B,8,16384,0
C,4,8192,0
D,2,4096,0
";

const MATRIX: &str = "\
InstanceType,A,B,C,D
A,True,True,True,False
B,False,False,False,False
C,True,True,False,True
D,False,False,False,False
";

async fn setup_test_app() -> (TempDir, Router, Arc<AppState>) {
    let temp_dir = TempDir::new().unwrap();
    let bucket = temp_dir.path().join("fleet");
    std::fs::create_dir_all(&bucket).unwrap();
    std::fs::write(bucket.join("catalog.csv"), CATALOG).unwrap();
    std::fs::write(bucket.join("matrix.csv"), MATRIX).unwrap();

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::TABLE_SOURCE).await;

    let service = RecommendationService::new(
        temp_dir.path(),
        reqwest::Client::new(),
        AdvisorMetrics::new(),
        StructuredLogger::new("api-test"),
        health_registry.clone(),
    );
    let state = Arc::new(AppState::new(service, health_registry));
    let router = create_router(state.clone());

    (temp_dir, router, state)
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/recommendations")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn located(extra: Value) -> Value {
    let mut body = json!({
        "bucket": "fleet",
        "catalog_key": "catalog.csv",
        "matrix_key": "matrix.csv",
    });
    for (k, v) in extra.as_object().unwrap() {
        body[k] = v.clone();
    }
    body
}

#[tokio::test]
async fn test_recommendation_ranks_exact_match_first() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        located(json!({
            "current_instance_type": "A",
            "required_vcpus": 4,
            "required_memory_mib": 8192,
            "required_gpus": 0,
            "top_n": 3,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], "A");
    assert_eq!(body["requested"], json!({"vcpus": 4, "memory_mib": 8192, "gpus": 0}));
    assert_eq!(body["best"]["InstanceType"], "C");
    assert_eq!(body["best"]["Score"], 0.0);

    let top: Vec<&str> = body["top_n"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["InstanceType"].as_str().unwrap())
        .collect();
    assert_eq!(top, ["C", "B"]);
}

#[tokio::test]
async fn test_top_n_limits_results() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        located(json!({"current_instance_type": "C", "top_n": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_n"].as_array().unwrap().len(), 1);
    assert_eq!(body["top_n"][0], body["best"]);
    // D (2 vCPU, 4 GiB) is closest to an all-zero requirement
    assert_eq!(body["best"]["InstanceType"], "D");
}

#[tokio::test]
async fn test_instance_type_alias_accepted() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(app, located(json!({"instance_type": "A"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], "A");
}

#[tokio::test]
async fn test_no_interchangeable_instances_is_ok() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(app, located(json!({"current_instance_type": "B"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], "no_interchangeable_instances");
    assert!(body["error"].as_str().unwrap().contains("B"));
    assert!(body.get("best").is_none());
}

#[tokio::test]
async fn test_no_feasible_candidate_is_ok() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        located(json!({"current_instance_type": "A", "required_gpus": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], "no_feasible_candidate");
    assert!(body["error"].as_str().unwrap().contains("GPU≥1"));
}

#[tokio::test]
async fn test_unknown_source_is_server_error() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(app, located(json!({"current_instance_type": "Z"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Z"));
}

#[tokio::test]
async fn test_missing_location_is_bad_request() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        json!({"current_instance_type": "A", "bucket": "fleet", "catalog_key": "catalog.csv"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing bucket, catalog_key, or matrix_key.");
}

#[tokio::test]
async fn test_missing_table_is_server_error_and_degrades_health() {
    let (_dir, app, state) = setup_test_app().await;

    let (status, _body) = post_json(
        app.clone(),
        located(json!({"current_instance_type": "A", "catalog_key": "missing.csv"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let health = state.health_registry.health().await;
    assert_eq!(
        serde_json::to_value(health.status).unwrap(),
        json!("degraded")
    );

    // Degraded is still operational
    let (status, _) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_path_traversal_is_bad_request() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        located(json!({"current_instance_type": "A", "catalog_key": "../../etc/passwd"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid table location"));
}

#[tokio::test]
async fn test_escaping_bucket_is_bad_request() {
    let (_dir, app, state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        located(json!({"current_instance_type": "A", "bucket": "../fleet"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("../fleet"));
    let health = state.health_registry.health().await;
    assert_eq!(serde_json::to_value(health.status).unwrap(), json!("healthy"));
}

#[tokio::test]
async fn test_undecodable_body_is_bad_request_json() {
    let (_dir, app, _state) = setup_test_app().await;

    for extra in [
        json!({"current_instance_type": "A", "required_vcpus": -1}),
        json!({"current_instance_type": 7}),
        json!({"current_instance_type": "A", "top_n": "many"}),
    ] {
        let (status, body) = post_json(app.clone(), located(extra)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }
}

#[tokio::test]
async fn test_non_json_body_is_bad_request_json() {
    let (_dir, app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/recommendations")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_numeric_strings_accepted() {
    let (_dir, app, _state) = setup_test_app().await;

    let (status, body) = post_json(
        app,
        located(json!({
            "current_instance_type": "A",
            "required_vcpus": "4",
            "required_memory_mib": "8192",
            "top_n": "1",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["best"]["InstanceType"], "C");
    assert_eq!(body["top_n"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_recommendation_refreshes_engine_health() {
    let (_dir, app, state) = setup_test_app().await;
    state
        .health_registry
        .set_unhealthy(components::ENGINE, "stale")
        .await;

    let (status, _) = post_json(app.clone(), located(json!({"current_instance_type": "A"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["components"]["engine"]["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_reflects_startup() {
    let (_dir, app, state) = setup_test_app().await;

    let (status, body) = get(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let readiness: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(readiness["ready"], false);

    state.health_registry.set_ready(true).await;
    let (status, _) = get(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_healthz_unhealthy_is_503() {
    let (_dir, app, state) = setup_test_app().await;
    state
        .health_registry
        .set_unhealthy(components::ENGINE, "panicked")
        .await;

    let (status, body) = get(app, "/healthz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_outcomes() {
    let (_dir, app, _state) = setup_test_app().await;

    post_json(app.clone(), located(json!({"current_instance_type": "A"}))).await;
    let (status, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("instance_advisor_recommendations_total"));
    assert!(text.contains("instance_advisor_recommendation_latency_seconds"));
}
