//! Core type definitions

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain id assumed when a request does not name one
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Blockchain networks with known token tables and CoinGecko platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Ethereum,
    Arbitrum,
    Base,
    Polygon,
}

impl ChainId {
    pub fn chain_id(&self) -> u64 {
        match self {
            ChainId::Ethereum => 1,
            ChainId::Arbitrum => 42161,
            ChainId::Base => 8453,
            ChainId::Polygon => 137,
        }
    }

    /// Resolve a numeric EVM chain id. Unknown ids stay opaque to the oracle.
    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(ChainId::Ethereum),
            42161 => Some(ChainId::Arbitrum),
            8453 => Some(ChainId::Base),
            137 => Some(ChainId::Polygon),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Arbitrum => "arbitrum",
            ChainId::Base => "base",
            ChainId::Polygon => "polygon",
        }
    }

    /// Asset platform id used by CoinGecko's contract price endpoint
    pub fn coingecko_platform(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Arbitrum => "arbitrum-one",
            ChainId::Base => "base",
            ChainId::Polygon => "polygon-pos",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Token amount with proper decimal handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn to_human(&self) -> f64 {
        let divisor = 10f64.powi(self.decimals as i32);
        // U256 has no lossless f64 conversion; go through the decimal string
        let raw_f64: f64 = self.raw.to_string().parse().unwrap_or(0.0);
        raw_f64 / divisor
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_amount_conversion() {
        // USDC with 6 decimals
        let amount = TokenAmount::new(U256::from(100_000_000u64), 6);
        assert!((amount.to_human() - 100.0).abs() < 1e-9);

        // Reserves wider than u64 still convert
        let eth = TokenAmount::new(U256::from(1_500_000_000_000_000_000u128), 18);
        assert!((eth.to_human() - 1.5).abs() < 1e-9);

        assert!(TokenAmount::new(U256::ZERO, 18).is_zero());
    }

    #[test]
    fn test_chain_ids() {
        assert_eq!(ChainId::Ethereum.chain_id(), 1);
        assert_eq!(ChainId::Arbitrum.chain_id(), 42161);
        assert_eq!(ChainId::Base.chain_id(), 8453);
        assert_eq!(ChainId::from_id(137), Some(ChainId::Polygon));
        assert_eq!(ChainId::from_id(56), None);
    }

    #[test]
    fn test_chain_id_round_trips_through_numeric_id() {
        for chain in [ChainId::Ethereum, ChainId::Arbitrum, ChainId::Base, ChainId::Polygon] {
            assert_eq!(ChainId::from_id(chain.chain_id()), Some(chain));
        }
        assert_eq!(ChainId::Arbitrum.coingecko_platform(), "arbitrum-one");
    }
}
