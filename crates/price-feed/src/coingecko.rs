//! CoinGecko adapter - CEX aggregated prices from the free public API

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use oracle_core::{ChainId, CoinGeckoConfig, PriceRequest, Quote, SourceError, SourceResult};

use crate::feeds::PriceSource;

pub const SOURCE_NAME: &str = "coingecko";

/// Known tokens resolve to a CoinGecko id and the simple price endpoint
const KNOWN_TOKEN_CONFIDENCE: f64 = 0.95;
/// Contract lookups are slightly less reliable (bridged or wrapped listings)
const CONTRACT_LOOKUP_CONFIDENCE: f64 = 0.85;

/// Lowercased Ethereum contract address → CoinGecko id
static TOKEN_IDS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "weth"),
        ("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "usd-coin"),
        ("0xdac17f958d2ee523a2206206994597c13d831ec7", "tether"),
        ("0x6b175474e89094c44da98b954eedeac495271d0f", "dai"),
        ("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", "wrapped-bitcoin"),
        ("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "uniswap"),
        ("0x7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9", "aave"),
        ("0x514910771af9ca656af840dff83e8264ecf986ca", "chainlink"),
    ])
});

/// Map a contract address to its CoinGecko id, ignoring case
pub fn token_id(address: &str) -> Option<&'static str> {
    TOKEN_IDS.get(address.to_lowercase().as_str()).copied()
}

/// CoinGecko price source (free tier, no API key)
pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new(config: &CoinGeckoConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn simple_price(&self, token_id: &str, vs_currency: &str) -> SourceResult<Quote> {
        let url = format!("{}/simple/price", self.base_url);
        let body = self
            .get_json(
                &url,
                &[
                    ("ids", token_id),
                    ("vs_currencies", vs_currency),
                    ("include_24hr_change", "true"),
                    ("include_market_cap", "true"),
                    ("include_24hr_vol", "true"),
                ],
            )
            .await?;

        parse_simple_price(&body, token_id, vs_currency)
    }

    async fn contract_price(
        &self,
        platform: &str,
        contract_address: &str,
        vs_currency: &str,
    ) -> SourceResult<Quote> {
        let url = format!("{}/simple/token_price/{}", self.base_url, platform);
        let body = self
            .get_json(
                &url,
                &[
                    ("contract_addresses", contract_address),
                    ("vs_currencies", vs_currency),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;

        parse_contract_price(&body, contract_address, vs_currency)
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> SourceResult<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Http(format!("request timed out: {e}"))
                } else {
                    SourceError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("CoinGecko API returned {}", status);
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, request: &PriceRequest) -> SourceResult<Quote> {
        let address = request.token_address.to_lowercase();

        match token_id(&address) {
            Some(id) => {
                debug!("CoinGecko simple price lookup for {} ({})", address, id);
                self.simple_price(id, &request.vs_currency).await
            }
            None => {
                let platform = request
                    .chain()
                    .unwrap_or(ChainId::Ethereum)
                    .coingecko_platform();
                debug!("CoinGecko contract lookup for {} on {}", address, platform);
                self.contract_price(platform, &address, &request.vs_currency).await
            }
        }
    }
}

/// Parse a `/simple/price` response body
pub fn parse_simple_price(body: &Value, token_id: &str, vs_currency: &str) -> SourceResult<Quote> {
    let entry = body.get(token_id).ok_or_else(not_found)?;
    let price = entry.get(vs_currency).and_then(Value::as_f64).ok_or_else(not_found)?;

    Ok(Quote::new(SOURCE_NAME, Some(price), Some(KNOWN_TOKEN_CONFIDENCE), None)
        .with_extra("method", "simple_price")
        .with_extra("token_id", token_id)
        .with_optional_extra("change_24h", field(entry, vs_currency, "24h_change"))
        .with_optional_extra("market_cap", field(entry, vs_currency, "market_cap"))
        .with_optional_extra("volume_24h", field(entry, vs_currency, "24h_vol")))
}

/// Parse a `/simple/token_price/{platform}` response body
pub fn parse_contract_price(body: &Value, contract_address: &str, vs_currency: &str) -> SourceResult<Quote> {
    let entry = body.get(contract_address).ok_or_else(not_found)?;
    let price = entry.get(vs_currency).and_then(Value::as_f64).ok_or_else(not_found)?;

    Ok(Quote::new(SOURCE_NAME, Some(price), Some(CONTRACT_LOOKUP_CONFIDENCE), None)
        .with_extra("method", "contract_price")
        .with_extra("contract_address", contract_address)
        .with_optional_extra("change_24h", field(entry, vs_currency, "24h_change")))
}

fn field(entry: &Value, vs_currency: &str, suffix: &str) -> Option<f64> {
    entry
        .get(format!("{vs_currency}_{suffix}"))
        .and_then(Value::as_f64)
}

fn not_found() -> SourceError {
    SourceError::NotFound("Token not found on CoinGecko".to_string())
}
