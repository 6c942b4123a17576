//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use para14a::api::{AppState, router};
use para14a::config::ScenarioConfig;
use para14a::runner::run_scenario;

/// Run the production-cap preset and return the API state.
fn build_api_state() -> Arc<AppState> {
    let run = run_scenario(&ScenarioConfig::production_cap());
    Arc::new(AppState {
        config: run.config,
        relay_mode: run.scheme.as_str().to_string(),
        kpi: run.kpi,
        results: run.results,
    })
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn full_scenario_state_endpoint() {
    let (status, json) = get_json("/state").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["config"]["steps_per_day"], 288);
    assert_eq!(json["config"]["days"], 1);
    assert_eq!(json["config"]["seed"], 42);
    assert_eq!(json["relay_mode"], "fnn_2bit_one_consumer_one_producer");

    assert_eq!(json["kpi"]["production_restricted_steps"], 60);
    assert!(json["kpi"]["pv_energy_kwh"].as_f64().unwrap().is_finite());

    assert_eq!(json["latest_step"]["timestep"], 287);
}

#[tokio::test]
async fn full_scenario_telemetry_endpoint() {
    let (status, json) = get_json("/telemetry").await;
    assert_eq!(status, StatusCode::OK);

    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 288);

    let first = &records[0];
    for key in [
        "production_level",
        "consumption_level",
        "grid_w",
        "pv_limit_sum_w",
        "evcs_budget_w",
        "health",
    ] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
    // internal names are not exposed
    assert!(first.get("production").is_none());
}

#[tokio::test]
async fn full_scenario_telemetry_range_covers_restriction() {
    let (status, json) = get_json("/telemetry?from=120&to=125").await;
    assert_eq!(status, StatusCode::OK);

    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0]["timestep"], 120);
    assert_eq!(records[0]["production_name"], "Reduced 60%");
    assert!(records[0]["pv_limit_sum_w"].is_i64());
}
