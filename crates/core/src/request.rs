//! Price query parameters shared by the sources and the service layer

use serde::{Deserialize, Serialize};

use crate::{ChainId, CoreError, CoreResult, DEFAULT_CHAIN_ID};

/// Price query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRequest {
    /// Token contract address
    pub token_address: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    /// Liquidity pool to read for on-chain pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
}

fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

impl PriceRequest {
    pub fn new(token_address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            token_address: token_address.into(),
            chain_id,
            vs_currency: default_vs_currency(),
            pair_address: None,
        }
    }

    pub fn with_vs_currency(mut self, vs_currency: impl Into<String>) -> Self {
        self.vs_currency = vs_currency.into();
        self
    }

    pub fn with_pair(mut self, pair_address: impl Into<String>) -> Self {
        self.pair_address = Some(pair_address.into());
        self
    }

    pub fn chain(&self) -> Option<ChainId> {
        ChainId::from_id(self.chain_id)
    }

    /// Trim identifiers, lowercase the currency and reject empty fields
    pub fn normalized(self) -> CoreResult<Self> {
        let token_address = self.token_address.trim().to_string();
        if token_address.is_empty() {
            return Err(CoreError::InvalidRequest("token_address must not be empty".into()));
        }

        let vs_currency = self.vs_currency.trim().to_lowercase();
        if vs_currency.is_empty() {
            return Err(CoreError::InvalidRequest("vs_currency must not be empty".into()));
        }

        let pair_address = self
            .pair_address
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            token_address,
            chain_id: self.chain_id,
            vs_currency,
            pair_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_deserializing() {
        let req: PriceRequest =
            serde_json::from_str(r#"{"token_address":"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"}"#)
                .unwrap();
        assert_eq!(req.chain_id, 1);
        assert_eq!(req.vs_currency, "usd");
        assert_eq!(req.pair_address, None);
        assert_eq!(req.chain(), Some(ChainId::Ethereum));
    }

    #[test]
    fn test_normalization() {
        let req = PriceRequest::new("  0xabc ", 8453)
            .with_vs_currency("EUR")
            .with_pair("  ")
            .normalized()
            .unwrap();
        assert_eq!(req.token_address, "0xabc");
        assert_eq!(req.vs_currency, "eur");
        assert_eq!(req.pair_address, None);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = PriceRequest::new("   ", 1).normalized().unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }
}
