//! Token definitions and utilities
//!
//! CRITICAL: Always use correct decimals!
//! - USDC/USDT: 6 decimals (NOT 18!)
//! - WBTC: 8 decimals
//! - Most others: 18 decimals
//!
//! Pool reserves are raw integers; pricing a pair without scaling by these
//! decimals is off by up to twelve orders of magnitude.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ChainId;

/// Token information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub chain: ChainId,
}

impl Token {
    pub fn new(address: Address, symbol: &str, name: &str, decimals: u8, chain: ChainId) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            chain,
        }
    }

    pub fn is_stablecoin(&self) -> bool {
        is_stablecoin(&self.symbol)
    }

    pub fn is_wrapped_ether(&self) -> bool {
        self.symbol.eq_ignore_ascii_case("WETH")
    }
}

/// Well-known token addresses per chain
pub static TOKENS: LazyLock<HashMap<ChainId, HashMap<&'static str, Token>>> = LazyLock::new(|| {
    let mut chains = HashMap::new();

    // Ethereum Mainnet
    let eth = ChainId::Ethereum;
    let mut eth_tokens = HashMap::new();
    eth_tokens.insert("WETH", Token::new(
        address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        "WETH", "Wrapped Ether", 18, eth
    ));
    eth_tokens.insert("USDC", Token::new(
        address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        "USDC", "USD Coin", 6, eth  // ⚠️ 6 decimals!
    ));
    eth_tokens.insert("USDT", Token::new(
        address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
        "USDT", "Tether USD", 6, eth  // ⚠️ 6 decimals!
    ));
    eth_tokens.insert("DAI", Token::new(
        address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
        "DAI", "Dai Stablecoin", 18, eth
    ));
    eth_tokens.insert("WBTC", Token::new(
        address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
        "WBTC", "Wrapped Bitcoin", 8, eth  // ⚠️ 8 decimals!
    ));
    eth_tokens.insert("UNI", Token::new(
        address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
        "UNI", "Uniswap", 18, eth
    ));
    eth_tokens.insert("AAVE", Token::new(
        address!("7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9"),
        "AAVE", "Aave Token", 18, eth
    ));
    eth_tokens.insert("LINK", Token::new(
        address!("514910771AF9Ca656af840dff83E8264EcF986CA"),
        "LINK", "ChainLink Token", 18, eth
    ));
    chains.insert(eth, eth_tokens);

    // Arbitrum
    let arb = ChainId::Arbitrum;
    let mut arb_tokens = HashMap::new();
    arb_tokens.insert("WETH", Token::new(
        address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
        "WETH", "Wrapped Ether", 18, arb
    ));
    arb_tokens.insert("USDC", Token::new(
        address!("af88d065e77c8cC2239327C5EDb3A432268e5831"),
        "USDC", "USD Coin", 6, arb
    ));
    arb_tokens.insert("USDT", Token::new(
        address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"),
        "USDT", "Tether USD", 6, arb
    ));
    arb_tokens.insert("ARB", Token::new(
        address!("912CE59144191C1204E64559FE8253a0e49E6548"),
        "ARB", "Arbitrum", 18, arb
    ));
    chains.insert(arb, arb_tokens);

    // Base
    let base = ChainId::Base;
    let mut base_tokens = HashMap::new();
    base_tokens.insert("WETH", Token::new(
        address!("4200000000000000000000000000000000000006"),
        "WETH", "Wrapped Ether", 18, base
    ));
    base_tokens.insert("USDC", Token::new(
        address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        "USDC", "USD Coin", 6, base
    ));
    chains.insert(base, base_tokens);

    // Polygon
    let poly = ChainId::Polygon;
    let mut poly_tokens = HashMap::new();
    poly_tokens.insert("WETH", Token::new(
        address!("7ceB23fD6bC0adD59E62ac25578270cFf1b9f619"),
        "WETH", "Wrapped Ether", 18, poly
    ));
    poly_tokens.insert("USDC", Token::new(
        address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
        "USDC", "USD Coin", 6, poly
    ));
    poly_tokens.insert("WMATIC", Token::new(
        address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
        "WMATIC", "Wrapped Matic", 18, poly
    ));
    chains.insert(poly, poly_tokens);

    chains
});

/// Find a known token by contract address
pub fn find_token(chain: ChainId, address: Address) -> Option<&'static Token> {
    TOKENS
        .get(&chain)?
        .values()
        .find(|token| token.address == address)
}

/// Get token decimals - CRITICAL for correct amount calculations
pub fn get_decimals(chain: ChainId, address: Address) -> u8 {
    find_token(chain, address).map(|t| t.decimals).unwrap_or(18)
}

/// Check if token is a stablecoin
pub fn is_stablecoin(symbol: &str) -> bool {
    matches!(symbol.to_uppercase().as_str(), "USDC" | "USDT" | "DAI" | "FRAX" | "LUSD")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_symbol(chain: ChainId, symbol: &str) -> &'static Token {
        &TOKENS[&chain][symbol]
    }

    #[test]
    fn test_usdc_has_6_decimals() {
        let usdc = by_symbol(ChainId::Ethereum, "USDC");
        assert_eq!(usdc.decimals, 6, "USDC must have 6 decimals!");
    }

    #[test]
    fn test_wbtc_has_8_decimals() {
        let wbtc = by_symbol(ChainId::Ethereum, "WBTC");
        assert_eq!(wbtc.decimals, 8, "WBTC must have 8 decimals!");
    }

    #[test]
    fn test_stablecoin_detection() {
        assert!(is_stablecoin("USDC"));
        assert!(is_stablecoin("usdt"));
        assert!(!is_stablecoin("WETH"));
    }

    #[test]
    fn test_find_token_by_address() {
        let usdc: Address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".parse().unwrap();
        let token = find_token(ChainId::Ethereum, usdc).unwrap();
        assert_eq!(token.symbol, "USDC");
        assert!(token.is_stablecoin());

        let weth = by_symbol(ChainId::Base, "WETH");
        assert!(weth.is_wrapped_ether());
        assert!(find_token(ChainId::Arbitrum, weth.address).is_none());
    }

    #[test]
    fn test_unknown_token_defaults_to_18_decimals() {
        assert_eq!(get_decimals(ChainId::Ethereum, Address::repeat_byte(0x42)), 18);
    }
}
