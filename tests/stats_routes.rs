//! Web routes and upstream clients exercised against a fake upstream served
//! from a local axum listener.

use assert_matches::assert_matches;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use valorant_stats::api::upstream::{ApiKeyPlacement, UpstreamClient};
use valorant_stats::server::{router, AppState};
use valorant_stats::{Config, StatsError, StatsService};

const HENRIK_KEY: &str = "henrik-test-key";
const TRN_KEY: &str = "trn-test-key";

type Hits = Arc<AtomicUsize>;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn key_ok(params: &HashMap<String, String>) -> bool {
    params.get("api_key").map(String::as_str) == Some(HENRIK_KEY)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"errors": [{"message": "Invalid API key"}]}))).into_response()
}

async fn fake_mmr(
    State(hits): State<Hits>,
    Path((_region, name, _tag)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    if !key_ok(&params) {
        return unauthorized();
    }
    if name == "Missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"errors": [{"message": "Player not found"}]}))).into_response();
    }
    Json(json!({
        "status": 200,
        "data": {"current_data": {"currenttierpatched": "Gold 2", "ranking_in_tier": 40}}
    }))
    .into_response()
}

async fn fake_history(
    State(hits): State<Hits>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    if !key_ok(&params) {
        return unauthorized();
    }
    Json(json!({"status": 200, "data": []})).into_response()
}

async fn fake_account(
    State(hits): State<Hits>,
    Path((name, tag)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    if !key_ok(&params) {
        return unauthorized();
    }
    if name == "Html" {
        let page = format!("<html>{}</html>", "maintenance ".repeat(100));
        return (StatusCode::SERVICE_UNAVAILABLE, page).into_response();
    }
    Json(json!({"status": 200, "data": {"name": name, "tag": tag, "account_level": 50}})).into_response()
}

async fn fake_profile(
    State(hits): State<Hits>,
    Path(riot_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    if headers.get("TRN-Api-Key").and_then(|v| v.to_str().ok()) != Some(TRN_KEY) {
        return unauthorized();
    }
    // Re-collection of this player always fails.
    if riot_id.starts_with("Flaky#") && params.contains_key("forceCollect") {
        return (StatusCode::BAD_GATEWAY, Json(json!({"errors": [{"message": "collector down"}]}))).into_response();
    }
    Json(json!({"data": {
        "platformInfo": {"platformUserHandle": riot_id, "avatarUrl": "https://trn.example/avatar.png"},
        "segments": [{"stats": {
            "level": {"value": 87},
            "competitiveTier": {"displayValue": "Gold 1"},
            "rank": {"displayValue": "Platinum 3"},
            "matchesPlayed": {"displayValue": "120"},
            "wins": {"value": 64},
            "kDRatio": {"displayValue": "1.12"}
        }}]
    }}))
    .into_response()
}

fn fake_upstream(hits: Hits) -> Router {
    Router::new()
        .route("/valorant/v2/mmr/{region}/{name}/{tag}", get(fake_mmr))
        .route("/valorant/v1/mmr-history/{region}/{name}/{tag}", get(fake_history))
        .route("/valorant/v1/account/{name}/{tag}", get(fake_account))
        .route("/trn/profile/riot/{riot_id}", get(fake_profile))
        .with_state(hits)
}

struct Harness {
    app: Router,
    hits: Hits,
    base: String,
}

async fn harness_with(henrik_key: Option<&str>) -> Harness {
    let hits: Hits = Arc::new(AtomicUsize::new(0));
    let base = spawn(fake_upstream(hits.clone())).await;
    let config = Config {
        henrik_api_key: henrik_key.map(str::to_string),
        trn_api_key: Some(TRN_KEY.to_string()),
        henrik_base_url: format!("{}/valorant", base),
        trn_base_url: format!("{}/trn", base),
        ..Config::default()
    };
    let stats = Arc::new(StatsService::new(&config).unwrap());
    Harness {
        app: router(AppState { stats }),
        hits,
        base,
    }
}

async fn harness() -> Harness {
    harness_with(Some(HENRIK_KEY)).await
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn field<'a>(message: &'a Value, name: &str) -> Option<&'a str> {
    message["fields"]
        .as_array()?
        .iter()
        .find(|f| f["name"] == name)
        .and_then(|f| f["value"].as_str())
}

#[tokio::test]
async fn health_route_is_plain_text() {
    let h = harness().await;
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Bot is running!");
}

#[tokio::test]
async fn valorant_route_renders_normalized_stats() {
    let h = harness().await;
    let (status, body) = get_json(&h.app, "/valorant/eu/Foo/1234").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "VALORANT: Foo#1234");
    assert_eq!(body["description"], "Region: EU");
    assert_eq!(field(&body, "Level"), Some("50"));
    assert_eq!(field(&body, "Rank"), Some("Gold 2"));
    assert_eq!(field(&body, "RR"), Some("40 RR"));
    assert_eq!(field(&body, "Games (current season)"), Some("0"));
    assert_eq!(field(&body, "Elo"), Some("N/A"));
    assert_eq!(field(&body, "Last RR change"), Some("N/A"));
    assert_eq!(h.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn repeated_lookup_is_served_from_cache() {
    let h = harness().await;
    get_json(&h.app, "/valorant/eu/Foo/1234").await;
    let (status, _) = get_json(&h.app, "/valorant/EU/foo/1234").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.hits.load(Ordering::SeqCst), 3);

    get_json(&h.app, "/valorant/na/Foo/1234").await;
    // Region-scoped mmr and history miss, the account is shared.
    assert_eq!(h.hits.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn non_json_upstream_body_is_a_400() {
    let h = harness().await;
    let (status, body) = get_json(&h.app, "/valorant/eu/Html/1234").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("status=503"), "{}", error);
    assert!(error.contains("non-JSON body"), "{}", error);
}

#[tokio::test]
async fn upstream_error_status_is_a_400() {
    let h = harness().await;
    let (status, body) = get_json(&h.app, "/valorant/eu/Missing/1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("status=404"));
}

#[tokio::test]
async fn failed_lookup_is_not_cached() {
    let h = harness().await;
    get_json(&h.app, "/valorant/eu/Missing/1234").await;
    let after_first = h.hits.load(Ordering::SeqCst);
    get_json(&h.app, "/valorant/eu/Missing/1234").await;
    // The failing mmr call goes upstream again.
    assert!(h.hits.load(Ordering::SeqCst) > after_first);
}

#[tokio::test]
async fn missing_api_key_never_reaches_upstream() {
    let h = harness_with(None).await;
    let (status, body) = get_json(&h.app, "/valorant/eu/Foo/1234").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("HENRIK_API_KEY"));
    assert_eq!(h.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_region_is_rejected() {
    let h = harness().await;
    let (status, body) = get_json(&h.app, "/valorant/e%2Eu/Foo/1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid region"));
}

#[tokio::test]
async fn tracker_route_uses_segment_precedence() {
    let h = harness().await;
    let (status, body) = get_json(&h.app, "/tracker/Boku%20wa%20Chopper/0001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "VALORANT Stats: Boku wa Chopper#0001");
    assert_eq!(body["description"], "Powered By Tracker Network");
    assert_eq!(body["thumbnailUrl"], "https://trn.example/avatar.png");
    assert_eq!(field(&body, "Rank"), Some("Platinum 3"));
    assert_eq!(field(&body, "Level"), Some("87"));
    assert_eq!(field(&body, "Matches"), Some("120"));
    assert_eq!(field(&body, "Wins"), Some("64"));
    assert_eq!(field(&body, "K/D"), Some("1.12"));
}

#[tokio::test]
async fn tracker_force_collect_skips_the_cache() {
    let h = harness().await;
    get_json(&h.app, "/tracker/Foo/1234").await;
    get_json(&h.app, "/tracker/Foo/1234").await;
    assert_eq!(h.hits.load(Ordering::SeqCst), 1);

    let (status, _) = get_json(&h.app, "/tracker/Foo/1234?forceCollect=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_force_collect_keeps_the_cached_profile() {
    let h = harness().await;
    let (status, _) = get_json(&h.app, "/tracker/Flaky/1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.hits.load(Ordering::SeqCst), 1);

    let (status, body) = get_json(&h.app, "/tracker/Flaky/1234?forceCollect=true").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("status=502"));
    assert_eq!(h.hits.load(Ordering::SeqCst), 2);

    let (status, body) = get_json(&h.app, "/tracker/Flaky/1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "VALORANT Stats: Flaky#1234");
    assert_eq!(h.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn hash_in_a_name_half_is_rejected_before_upstream() {
    let h = harness().await;
    for uri in [
        "/valorant/eu/a%23b/c",
        "/valorant/eu/a/b%23c",
        "/tracker/a%23b/c",
        "/tracker/a/b%23c",
    ] {
        let (status, body) = get_json(&h.app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].as_str().unwrap().contains('#'), "{}", uri);
    }
    assert_eq!(h.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_tracker_name_is_rejected() {
    let h = harness().await;
    let (status, body) = get_json(&h.app, "/tracker/%20%20/1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("must not be empty"));
    assert_eq!(h.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn client_reports_status_and_truncated_snippet() {
    let h = harness().await;
    let client = UpstreamClient::new(
        "Henrik",
        format!("{}/valorant", h.base),
        Some(HENRIK_KEY.to_string()),
        "HENRIK_API_KEY",
        ApiKeyPlacement::Query("api_key"),
    )
    .unwrap();

    let err = client.fetch(&["v1", "account", "Html", "1234"], &[]).await.unwrap_err();
    assert_matches!(
        err,
        StatsError::Upstream { status: Some(503), ref body_snippet, .. }
            if body_snippet.starts_with("non-JSON body: <html>") && body_snippet.chars().count() == 300
    );

    let ok = client.fetch(&["v1", "account", "Foo", "1234"], &[]).await.unwrap();
    assert_eq!(ok["data"]["account_level"], 50);
}
