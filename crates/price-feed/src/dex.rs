//! DEX adapter - spot price from a Uniswap V2 style pair's reserves
//!
//! Reads `getReserves`, `token0` and `token1` over JSON-RPC and prices the
//! requested token against the other side of the pair. Reserves are raw
//! integers, so both sides are scaled by their token decimals before dividing.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use tracing::{debug, warn};

use oracle_core::{
    find_token, get_decimals, ChainId, DexConfig, PriceRequest, Quote, SourceError, SourceResult,
    TokenAmount,
};

use crate::feeds::PriceSource;
use crate::rpc::{IUniswapV2Pair, RpcClient};

pub const SOURCE_NAME: &str = "dex";

/// Pair quoted directly in a USD stablecoin
const STABLE_QUOTE_CONFIDENCE: f64 = 0.90;
/// Pair quoted in WETH, converted through the configured reference price
const WETH_QUOTE_CONFIDENCE: f64 = 0.75;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// On-chain state of a pair at one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSnapshot {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

/// Price derived from a pair, before it becomes a quote
#[derive(Debug, Clone, PartialEq)]
pub struct PairPrice {
    pub price: f64,
    pub confidence: f64,
    pub quote_symbol: String,
    pub token_reserve: U256,
    pub quote_reserve: U256,
}

/// Uniswap V2 pair reader
pub struct DexSource {
    rpcs: HashMap<u64, RpcClient>,
    weth_usd_reference: Option<f64>,
}

impl DexSource {
    pub fn new(config: &DexConfig) -> SourceResult<Self> {
        let secs = if config.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            config.timeout_secs
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let mut rpcs = HashMap::new();
        for (chain, url) in &config.rpc_urls {
            let chain_id: u64 = chain
                .parse()
                .map_err(|_| SourceError::Decode(format!("invalid chain id key: {chain}")))?;
            rpcs.insert(chain_id, RpcClient::new(client.clone(), url.clone()));
        }

        Ok(Self {
            rpcs,
            weth_usd_reference: config.weth_usd_reference,
        })
    }

    pub fn chains(&self) -> Vec<u64> {
        let mut chains: Vec<u64> = self.rpcs.keys().copied().collect();
        chains.sort_unstable();
        chains
    }

    async fn snapshot(&self, rpc: &RpcClient, pair: Address) -> SourceResult<PairSnapshot> {
        let (reserves, token0, token1) = futures::try_join!(
            rpc.call(pair, IUniswapV2Pair::getReservesCall {}),
            rpc.call(pair, IUniswapV2Pair::token0Call {}),
            rpc.call(pair, IUniswapV2Pair::token1Call {}),
        )?;

        Ok(PairSnapshot {
            token0: token0._0,
            token1: token1._0,
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
        })
    }
}

#[async_trait::async_trait]
impl PriceSource for DexSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, request: &PriceRequest) -> SourceResult<Quote> {
        if !request.vs_currency.eq_ignore_ascii_case("usd") {
            return Err(SourceError::UnsupportedCurrency(request.vs_currency.clone()));
        }

        let rpc = self
            .rpcs
            .get(&request.chain_id)
            .ok_or(SourceError::UnsupportedChain(request.chain_id))?;

        let pair_address = request.pair_address.as_deref().ok_or(SourceError::PairRequired)?;
        let pair = parse_address(pair_address)?;
        let token = parse_address(&request.token_address)?;

        debug!("Reading pair {} on chain {}", pair, request.chain_id);
        let snapshot = self.snapshot(rpc, pair).await?;

        let priced = price_from_pair(request.chain(), token, &snapshot, self.weth_usd_reference)
            .inspect_err(|e| warn!("Pair {} cannot price {}: {}", pair, token, e))?;

        Ok(Quote::valid(SOURCE_NAME, priced.price, priced.confidence)
            .with_extra("method", "uniswap_v2_pair")
            .with_extra("pair_address", pair.to_string())
            .with_extra("token_address", token.to_string())
            .with_extra("quote_token", priced.quote_symbol)
            .with_extra(
                "liquidity",
                serde_json::json!({
                    "token_reserve": priced.token_reserve.to_string(),
                    "quote_reserve": priced.quote_reserve.to_string(),
                }),
            ))
    }
}

/// Price `token` in USD against the other side of the pair
pub fn price_from_pair(
    chain: Option<ChainId>,
    token: Address,
    snapshot: &PairSnapshot,
    weth_usd_reference: Option<f64>,
) -> SourceResult<PairPrice> {
    let (token_reserve, quote_reserve, quote_token) = if token == snapshot.token0 {
        (snapshot.reserve0, snapshot.reserve1, snapshot.token1)
    } else if token == snapshot.token1 {
        (snapshot.reserve1, snapshot.reserve0, snapshot.token0)
    } else {
        return Err(SourceError::TokenNotInPair);
    };

    if token_reserve.is_zero() || quote_reserve.is_zero() {
        return Err(SourceError::ZeroLiquidity);
    }

    let chain = chain.unwrap_or(ChainId::Ethereum);
    let quote = find_token(chain, quote_token)
        .ok_or_else(|| SourceError::UnknownQuoteToken(quote_token.to_string()))?;

    let (usd_per_quote, confidence) = if quote.is_stablecoin() {
        (1.0, STABLE_QUOTE_CONFIDENCE)
    } else if quote.is_wrapped_ether() {
        match weth_usd_reference {
            Some(reference) => (reference, WETH_QUOTE_CONFIDENCE),
            None => return Err(SourceError::UnknownQuoteToken(quote.symbol.clone())),
        }
    } else {
        return Err(SourceError::UnknownQuoteToken(quote.symbol.clone()));
    };

    let token_amount = TokenAmount::new(token_reserve, get_decimals(chain, token));
    let quote_amount = TokenAmount::new(quote_reserve, quote.decimals);
    let price = quote_amount.to_human() / token_amount.to_human() * usd_per_quote;

    Ok(PairPrice {
        price,
        confidence,
        quote_symbol: quote.symbol.clone(),
        token_reserve,
        quote_reserve,
    })
}

fn parse_address(raw: &str) -> SourceResult<Address> {
    Address::from_str(raw.trim()).map_err(|_| SourceError::InvalidAddress(raw.to_string()))
}
