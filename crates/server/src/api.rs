//! HTTP routes and response shaping

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use oracle_aggregator::PriceAggregator;
use oracle_core::{AggregationResult, CoreError, OracleConfig, PriceRange, PriceRequest, QualityWarning, Quote};
use oracle_price_feed::SourceSet;

pub const SERVICE_NAME: &str = "price-oracle";
pub const PRICE_ROUTE: &str = "/entrypoints/price-oracle/invoke";
pub const HEALTH_ROUTE: &str = "/health";

/// Shared handler state
pub struct AppState {
    pub sources: SourceSet,
    pub aggregator: PriceAggregator,
}

impl AppState {
    pub fn new(sources: SourceSet, aggregator: PriceAggregator) -> Self {
        Self { sources, aggregator }
    }

    pub fn from_config(config: &OracleConfig) -> anyhow::Result<Self> {
        let sources = SourceSet::from_config(&config.sources)?;
        let aggregator = PriceAggregator::try_new(config.aggregation.clone())?;
        Ok(Self::new(sources, aggregator))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(health))
        .route(PRICE_ROUTE, post(get_price))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Price lookup response
#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub token_address: String,
    pub chain_id: u64,
    pub price: f64,
    pub confidence: f64,
    pub sources_count: usize,
    pub price_range: PriceRange,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub sources: Vec<Quote>,
    pub warnings: Vec<QualityWarning>,
    /// ISO-8601 UTC with trailing `Z`
    pub timestamp: String,
}

impl PriceResponse {
    pub fn from_result(result: AggregationResult, at: DateTime<Utc>) -> Self {
        let market = |key: &str| {
            result
                .sources
                .iter()
                .filter(|q| q.is_valid())
                .find_map(|q| q.extra_f64(key))
        };
        let change_24h = market("change_24h");
        let market_cap = market("market_cap");
        let volume_24h = market("volume_24h");

        let timestamp = result
            .timestamp
            .unwrap_or(at)
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        Self {
            token_address: result.token_address,
            chain_id: result.chain_id,
            price: result.price,
            confidence: result.confidence,
            sources_count: result.valid_source_count,
            price_range: result.price_range,
            change_24h,
            market_cap,
            volume_24h,
            sources: result.sources,
            warnings: result.warnings,
            timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub sources: Vec<&'static str>,
}

/// Handler error, rendered as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        sources: state.sources.names(),
    })
}

async fn get_price(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, ApiError> {
    let Json(request) = payload?;
    let request = request.normalized()?;

    let quotes = state.sources.collect(&request).await;
    let now = Utc::now();
    let result = state
        .aggregator
        .aggregate(&request.token_address, request.chain_id, &quotes)
        .stamped(now);

    if result.is_total_failure() {
        warn!(token = %request.token_address, chain_id = request.chain_id, "No source returned a price");
    } else {
        info!(
            token = %request.token_address,
            chain_id = request.chain_id,
            price = result.price,
            confidence = result.confidence,
            sources = result.valid_source_count,
            "Price served"
        );
    }

    Ok(Json(PriceResponse::from_result(result, now)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result_with(sources: Vec<Quote>) -> AggregationResult {
        PriceAggregator::default().aggregate("0xabc", 1, &sources)
    }

    #[test]
    fn test_market_fields_come_from_first_valid_source() {
        let result = result_with(vec![
            Quote::failed("coingecko", "API returned 429").with_extra("change_24h", 9.9),
            Quote::valid("dex", 100.0, 0.9),
            Quote::valid("coingecko", 101.0, 0.95)
                .with_extra("change_24h", -2.5)
                .with_extra("market_cap", 1.0e9),
        ]);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let response = PriceResponse::from_result(result, at);
        assert_eq!(response.change_24h, Some(-2.5));
        assert_eq!(response.market_cap, Some(1.0e9));
        assert_eq!(response.volume_24h, None);
        assert_eq!(response.sources_count, 2);
        assert_eq!(response.timestamp, "2024-05-01T12:00:00.000000Z");
    }

    #[test]
    fn test_existing_stamp_wins() {
        let stamped_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let result = result_with(vec![Quote::valid("a", 1.0, 1.0)]).stamped(stamped_at);
        let response = PriceResponse::from_result(result, Utc::now());
        assert_eq!(response.timestamp, "2024-01-02T03:04:05.000000Z");
    }

    #[test]
    fn test_error_status_mapping() {
        let bad: ApiError = CoreError::InvalidRequest("token_address is required".into()).into();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = CoreError::InvalidConfig("sources.timeout_secs must be positive".into()).into();
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
