//! Cover search API tests against an in-process router with mock sources.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::TestFixture;
use coverscout_core::sources::{CoverCandidate, CoverSourceKind};

fn candidate(key: &str, source: CoverSourceKind, save_url: &str) -> CoverCandidate {
    CoverCandidate {
        name: key.to_string(),
        key: key.to_string(),
        source,
        url: save_url.to_string(),
        save_url: save_url.to_string(),
        score: None,
    }
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sources"]["steamgriddb_configured"], false);
    assert!(response.body["sources"].get("steamgriddb").is_none());
}

#[tokio::test]
async fn test_best_cover_prefers_index() {
    let fixture = TestFixture::new();
    fixture.index.set_best_cover("https://index/cover.png").await;
    fixture
        .storefront
        .set_best_cover("https://steam/cover.jpg")
        .await;

    let response = fixture.get("/api/v1/covers/best?name=Portal%202").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Portal 2");
    assert_eq!(response.body["url"], "https://index/cover.png");
}

#[tokio::test]
async fn test_best_cover_empty_when_no_source_has_one() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/covers/best?name=Unknown").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["url"], "");
}

#[tokio::test]
async fn test_search_covers_returns_per_source_arrays() {
    let fixture = TestFixture::new();
    fixture
        .index
        .set_results(vec![candidate(
            "igdb_1",
            CoverSourceKind::Igdb,
            "https://index/1.png",
        )])
        .await;
    fixture
        .storefront
        .set_results(vec![
            candidate("steam_620", CoverSourceKind::Steam, "https://steam/620.jpg"),
            candidate("steam_400", CoverSourceKind::Steam, "https://steam/400.jpg"),
        ])
        .await;

    let response = fixture.get("/api/v1/covers/search?name=portal").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["igdb"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["steam"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["steam"][0]["key"], "steam_620");
}

#[tokio::test]
async fn test_search_covers_timeout_maps_to_504() {
    let fixture = TestFixture::new();
    fixture.index.set_delay(Duration::from_secs(5)).await;
    fixture.storefront.set_delay(Duration::from_secs(5)).await;

    let response = fixture
        .get("/api/v1/covers/search?name=portal&timeout_ms=20")
        .await;
    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("timed out"));
}

#[tokio::test]
async fn test_search_covers_missing_name_is_client_error() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/covers/search").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grids_unconfigured_is_503() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/covers/grids?steam_appid=620").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("not configured"));
}

#[tokio::test]
async fn test_batch_annotates_and_preserves_order() {
    let fixture = TestFixture::new();
    fixture.index.set_best_cover("https://index/cover.png").await;

    let response = fixture
        .post(
            "/api/v1/covers/batch",
            json!([
                {"name": "Portal 2"},
                {"name": "Half-Life", "image-path": "/existing/cover.png"}
            ]),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let apps = response.body.as_array().unwrap();
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0]["name"], "Portal 2");
    assert_eq!(apps[0]["image-path"], "https://index/cover.png");
    assert_eq!(apps[1]["image-path"], "/existing/cover.png");
}

#[tokio::test]
async fn test_clear_cache_hits_both_sources() {
    let fixture = TestFixture::new();
    let response = fixture.delete("/api/v1/covers/cache").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(fixture.index.clear_cache_calls().await, 1);
    assert_eq!(fixture.storefront.clear_cache_calls().await, 1);
}
