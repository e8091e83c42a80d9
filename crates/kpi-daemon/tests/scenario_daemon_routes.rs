//! In-process scenario tests for kpi-daemon HTTP endpoints.
//!
//! These tests build the Axum router **without** binding a TCP socket and
//! drive it via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use kpi_daemon::{routes, state};
use kpi_engine::{
    positions, AssignmentTable, EngineInputs, EngineParams, ForecastParams, ProductCatalog,
    ProductInfo, Trade,
};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
}

fn inputs(rate_x: f64) -> EngineInputs {
    let mut assignments = AssignmentTable::new();
    assignments.insert("AccountA", "Acme", "Alice");
    assignments.insert("AccountB", "Beta", "Bob");

    let products: ProductCatalog = [ProductInfo::daily("FundX", rate_x), ProductInfo::daily("FundY", 0.02)]
        .into_iter()
        .collect();

    EngineInputs {
        initial_holdings: positions([("AccountA", "FundX", 100.0), ("AccountB", "FundY", 10.0)]),
        trades: vec![Trade::new(d(2), "AccountA", "FundX", 50.0)],
        products,
        assignments,
    }
}

fn params() -> EngineParams {
    EngineParams::new(d(1), d(2)).with_forecast(ForecastParams {
        horizon_days: 3,
        trend_window_days: 2,
    })
}

fn make_state(rate_x: f64) -> Arc<state::AppState> {
    let source = state::SnapshotSource::InMemory {
        inputs: Box::new(inputs(rate_x)),
        params: params(),
    };
    Arc::new(state::AppState::new(source).expect("initial build"))
}

async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_test_reports_working() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/api/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["message"], "API is working");
}

#[tokio::test]
async fn health_returns_200_ok_true() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "kpi-daemon");
}

// ---------------------------------------------------------------------------
// Report views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_reports_latest_totals_and_trend() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/api/dashboard")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    // Day 2: 150 * 0.01 + 10 * 0.02 = 1.7
    assert!((json["total_income"].as_f64().unwrap() - 1.7).abs() < 1e-12);
    assert_eq!(json["total_clients"], 2);
    assert_eq!(json["total_funds"], 2);
    assert_eq!(json["total_sales"], 2);

    let trend = json["income_trend"].as_array().unwrap();
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0]["date"], "2024-01-01");
    assert!((trend[0]["income"].as_f64().unwrap() - 1.2).abs() < 1e-12);
}

#[tokio::test]
async fn sales_view_uses_camel_case_keys() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/api/sales")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    let people = json["salesPersons"].as_array().unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0]["name"], "Alice");
    assert!((people[0]["cumulativeIncome"].as_f64().unwrap() - 2.5).abs() < 1e-12);
    assert_eq!(people[0]["topClients"][0], "Acme");
    assert_eq!(people[0]["topFunds"][0], "FundX");

    assert_eq!(json["dailyContribution"].as_array().unwrap().len(), 2);
    assert_eq!(json["individualPerformance"]["Bob"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn clients_view_lists_latest_income() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/api/clients")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Acme");
    assert!((rows[0]["income"].as_f64().unwrap() - 1.5).abs() < 1e-12);
}

#[tokio::test]
async fn funds_view_returns_statistics() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/api/funds")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["FundX"]["count"], 2);
    assert!((json["FundX"]["mean"].as_f64().unwrap() - 1.25).abs() < 1e-12);
    assert!((json["FundX"]["max"].as_f64().unwrap() - 1.5).abs() < 1e-12);
}

#[tokio::test]
async fn malformed_fund_statistics_are_a_500_with_error_body() {
    // A non-finite rate yields non-finite income and therefore a malformed record.
    let (status, body) = call(routes::build_router(make_state(f64::NAN)), get("/api/funds")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json = parse_json(body);
    let msg = json["error"].as_str().unwrap();
    assert!(msg.contains("FundX"), "{msg}");
}

#[tokio::test]
async fn forecast_view_has_both_models() {
    let (status, body) = call(routes::build_router(make_state(0.01)), get("/api/forecast")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["simple"]["daily"].as_object().unwrap().len(), 3);
    assert_eq!(json["complex"]["daily"].as_object().unwrap().len(), 3);
    assert!(json["simple"]["by_fund"]["FundX"]["2024-01-03"].is_number());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = call(routes::build_router(make_state(0.01)), get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
