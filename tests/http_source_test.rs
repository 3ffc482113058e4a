mod common;

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use common::{start_server, url};
use lobview_rs::market_data::adapters::http::HttpSnapshotSource;
use lobview_rs::market_data::adapters::SnapshotSource;
use lobview_rs::market_data::types::PriceLevel;
use lobview_rs::server::{self, FixtureState, SNAPSHOT_ROUTE};
use lobview_rs::LadderError;

const TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_fetches_fixture_snapshot() {
    let addr = start_server(server::router(FixtureState { book: server::sample_book(), jitter: false })).await;
    let source = HttpSnapshotSource::new(&url(addr, SNAPSHOT_ROUTE), TIMEOUT).unwrap();

    let snap = source.fetch().await.unwrap();
    assert_eq!(snap, server::sample_book());
    assert_eq!(snap.asks[0], PriceLevel::new("19233.63", "0.71772706"));
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let router = Router::new().route("/api/data", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
    let addr = start_server(router).await;
    let source = HttpSnapshotSource::new(&url(addr, "/api/data"), TIMEOUT).unwrap();

    match source.fetch().await {
        Err(LadderError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let router = Router::new().route("/api/data", get(|| async { "{\"asks\": [[\"1.02\", " }));
    let addr = start_server(router).await;
    let source = HttpSnapshotSource::new(&url(addr, "/api/data"), TIMEOUT).unwrap();

    assert!(matches!(source.fetch().await, Err(LadderError::Parse(_))));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let router = Router::new().route(
        "/api/data",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "{\"asks\": [], \"bids\": []}"
        }),
    );
    let addr = start_server(router).await;
    let source = HttpSnapshotSource::new(&url(addr, "/api/data"), Duration::from_millis(100)).unwrap();

    match source.fetch().await {
        Err(LadderError::Timeout { timeout, .. }) => assert_eq!(timeout, Duration::from_millis(100)),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Grab a free port, then close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpSnapshotSource::new(&url(addr, "/api/data"), TIMEOUT).unwrap();
    assert!(matches!(source.fetch().await, Err(LadderError::Http(_))));
}
