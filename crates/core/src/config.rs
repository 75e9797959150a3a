//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CoreError, CoreResult};

/// Thresholds and caps driving the aggregation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationPolicy {
    /// Spread (%) above which confidence is penalized and a warning raised
    pub max_spread_percent: f64,
    /// Spread (%) above which the escalated warning is raised
    pub very_high_spread_percent: f64,
    /// Multiplier applied to a lone source's confidence
    pub single_source_discount: f64,
    pub corroboration_bonus_per_source: f64,
    pub corroboration_bonus_cap: f64,
    pub spread_penalty_cap: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            max_spread_percent: 5.0,
            very_high_spread_percent: 15.0,
            single_source_discount: 0.8,
            corroboration_bonus_per_source: 0.1,
            corroboration_bonus_cap: 0.2,
            spread_penalty_cap: 0.3,
            min_confidence: 0.1,
            max_confidence: 1.0,
        }
    }
}

impl AggregationPolicy {
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("max_spread_percent", self.max_spread_percent),
            ("very_high_spread_percent", self.very_high_spread_percent),
            ("single_source_discount", self.single_source_discount),
            ("corroboration_bonus_per_source", self.corroboration_bonus_per_source),
            ("corroboration_bonus_cap", self.corroboration_bonus_cap),
            ("spread_penalty_cap", self.spread_penalty_cap),
            ("min_confidence", self.min_confidence),
            ("max_confidence", self.max_confidence),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.single_source_discount > 1.0 {
            return Err(CoreError::InvalidConfig(format!(
                "single_source_discount must be within [0, 1], got {}",
                self.single_source_discount
            )));
        }
        if self.max_confidence > 1.0 || self.min_confidence > self.max_confidence {
            return Err(CoreError::InvalidConfig(format!(
                "confidence bounds [{}, {}] must be ordered within [0, 1]",
                self.min_confidence, self.max_confidence
            )));
        }
        if self.very_high_spread_percent < self.max_spread_percent {
            return Err(CoreError::InvalidConfig(format!(
                "very_high_spread_percent ({}) below max_spread_percent ({})",
                self.very_high_spread_percent, self.max_spread_percent
            )));
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// CoinGecko API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinGeckoConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            timeout_secs: 10,
        }
    }
}

/// On-chain pair reader settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    pub enabled: bool,
    /// JSON-RPC endpoint per numeric chain id
    pub rpc_urls: HashMap<String, String>,
    /// USD price of WETH used to convert WETH-quoted pairs. Unset disables them.
    pub weth_usd_reference: Option<f64>,
    pub timeout_secs: u64,
}

impl DexConfig {
    pub fn rpc_url(&self, chain_id: u64) -> Option<&str> {
        self.rpc_urls.get(&chain_id.to_string()).map(String::as_str)
    }
}

/// Source adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Upper bound for each adapter call, enforced by the collector
    pub timeout_secs: u64,
    pub coingecko: CoinGeckoConfig,
    pub dex: DexConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            coingecko: CoinGeckoConfig::default(),
            dex: DexConfig {
                timeout_secs: 10,
                ..Default::default()
            },
        }
    }
}

/// Complete oracle configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub server: ServerConfig,
    pub aggregation: AggregationPolicy,
    pub sources: SourcesConfig,
}

impl OracleConfig {
    pub fn validate(&self) -> CoreResult<()> {
        self.aggregation.validate()?;

        if self.sources.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig("sources.timeout_secs must be positive".into()));
        }
        if self.sources.coingecko.enabled && self.sources.coingecko.base_url.is_empty() {
            return Err(CoreError::InvalidConfig("sources.coingecko.base_url is empty".into()));
        }
        if self.sources.dex.enabled && self.sources.dex.rpc_urls.is_empty() {
            return Err(CoreError::InvalidConfig(
                "sources.dex is enabled but no rpc_urls are configured".into(),
            ));
        }
        if let Some(reference) = self.sources.dex.weth_usd_reference {
            if !reference.is_finite() || reference <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "sources.dex.weth_usd_reference must be positive, got {reference}"
                )));
            }
        }
        Ok(())
    }

    pub fn get_rpc_url(&self, chain_id: u64) -> Option<&str> {
        self.sources.dex.rpc_url(chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = AggregationPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.max_spread_percent, 5.0);
        assert_eq!(policy.single_source_discount, 0.8);
    }

    #[test]
    fn test_policy_rejects_inverted_bounds() {
        let policy = AggregationPolicy {
            min_confidence: 0.9,
            max_confidence: 0.5,
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_policy_rejects_nan_and_bad_discount() {
        let nan = AggregationPolicy {
            spread_penalty_cap: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let discount = AggregationPolicy {
            single_source_discount: 1.5,
            ..Default::default()
        };
        assert!(discount.validate().is_err());

        let thresholds = AggregationPolicy {
            very_high_spread_percent: 2.0,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_oracle_config_validation() {
        let mut config = OracleConfig::default();
        assert!(config.validate().is_ok());

        config.sources.dex.enabled = true;
        assert!(config.validate().is_err());

        config
            .sources
            .dex
            .rpc_urls
            .insert("1".into(), "http://localhost:8545".into());
        assert!(config.validate().is_ok());
        assert_eq!(config.get_rpc_url(1), Some("http://localhost:8545"));
        assert_eq!(config.get_rpc_url(10), None);

        config.sources.dex.weth_usd_reference = Some(0.0);
        assert!(config.validate().is_err());
    }
}
