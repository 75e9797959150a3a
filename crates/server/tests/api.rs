use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use oracle_aggregator::PriceAggregator;
use oracle_core::{PriceRequest, Quote, SourceError, SourceResult};
use oracle_price_feed::{PriceSource, SourceSet};
use oracle_server::{router, AppState};

const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

struct StubSource {
    name: &'static str,
    price: f64,
    confidence: f64,
    change_24h: Option<f64>,
}

#[async_trait::async_trait]
impl PriceSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _request: &PriceRequest) -> SourceResult<Quote> {
        Ok(Quote::valid(self.name, self.price, self.confidence)
            .with_optional_extra("change_24h", self.change_24h))
    }
}

struct DownSource;

#[async_trait::async_trait]
impl PriceSource for DownSource {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn fetch(&self, _request: &PriceRequest) -> SourceResult<Quote> {
        Err(SourceError::HttpStatus(500))
    }
}

fn app(sources: SourceSet) -> axum::Router {
    router(Arc::new(AppState::new(sources, PriceAggregator::default())))
}

fn two_sources() -> SourceSet {
    SourceSet::new(Duration::from_secs(1))
        .with_source(StubSource {
            name: "coingecko",
            price: 100.0,
            confidence: 0.9,
            change_24h: Some(1.5),
        })
        .with_source(StubSource {
            name: "dex",
            price: 102.0,
            confidence: 0.8,
            change_24h: None,
        })
}

fn price_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/entrypoints/price-oracle/invoke")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(two_sources())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "price-oracle");
    assert_eq!(body["sources"], json!(["coingecko", "dex"]));
}

#[tokio::test]
async fn test_price_from_two_agreeing_sources() {
    let response = app(two_sources())
        .oneshot(price_request(json!({ "token_address": WETH })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["token_address"], WETH);
    assert_eq!(body["chain_id"], 1);
    assert_eq!(body["price"], 100.941176);
    assert_eq!(body["confidence"], 1.0);
    assert_eq!(body["sources_count"], 2);
    assert_eq!(body["price_range"]["min"], 100.0);
    assert_eq!(body["price_range"]["max"], 102.0);
    assert_eq!(body["price_range"]["spread_percent"], 1.98);
    assert_eq!(body["change_24h"], 1.5);
    assert!(body["market_cap"].is_null());
    assert_eq!(body["sources"].as_array().unwrap().len(), 2);
    assert_eq!(body["sources"][0]["source"], "coingecko");
    assert_eq!(body["warnings"], json!([]));
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_total_failure_is_still_ok() {
    let sources = SourceSet::new(Duration::from_secs(1)).with_source(DownSource);
    let response = app(sources)
        .oneshot(price_request(json!({ "token_address": WETH, "chain_id": 8453 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["price"], 0.0);
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["sources_count"], 0);
    assert_eq!(body["chain_id"], 8453);
    assert_eq!(body["sources"][0]["error"], "API returned 500");
    assert_eq!(body["warnings"], json!(["No valid price data available"]));
}

#[tokio::test]
async fn test_partial_failure_warning() {
    let sources = two_sources().with_source(DownSource);
    let response = app(sources)
        .oneshot(price_request(json!({ "token_address": WETH })))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["sources_count"], 2);
    assert_eq!(body["warnings"], json!(["1 source(s) failed to provide price"]));
}

#[tokio::test]
async fn test_empty_token_is_bad_request() {
    let response = app(two_sources())
        .oneshot(price_request(json!({ "token_address": "  " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let response = app(two_sources())
        .oneshot(price_request(json!({ "chain_id": "one" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}
