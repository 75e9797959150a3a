//! Layered configuration loading
//!
//! Built-in defaults, then an optional TOML file, then `ORACLE__*`
//! environment variables (`ORACLE__SERVER__PORT=9000`,
//! `ORACLE__SOURCES__DEX__RPC_URLS__1=https://...`).

use std::env;

use anyhow::Context;
use config::{Config, Environment, File};
use tracing::info;

use oracle_core::OracleConfig;

/// Overrides the config file location; the file is then required
pub const CONFIG_PATH_ENV: &str = "ORACLE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/oracle.toml";
pub const ENV_PREFIX: &str = "ORACLE";

/// Load and validate the service configuration
pub fn load() -> anyhow::Result<OracleConfig> {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from(&path, true),
        Err(_) => load_from(DEFAULT_CONFIG_PATH, false),
    }
}

pub fn load_from(path: &str, required: bool) -> anyhow::Result<OracleConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to build configuration from {path}"))?;

    let config: OracleConfig = settings
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config.validate().context("Invalid configuration")?;

    info!("{}", digest(&config));
    Ok(config)
}

/// One-line summary of the loaded configuration for the startup log
pub fn digest(config: &OracleConfig) -> String {
    let mut dex_chains: Vec<&str> = config.sources.dex.rpc_urls.keys().map(String::as_str).collect();
    dex_chains.sort_unstable();

    format!(
        "listen={}:{} timeout={}s coingecko={} dex={} dex_chains={:?} max_spread={}%",
        config.server.host,
        config.server.port,
        config.sources.timeout_secs,
        config.sources.coingecko.enabled,
        config.sources.dex.enabled,
        dex_chains,
        config.aggregation.max_spread_percent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let config = load_from("/nonexistent/oracle.toml", false).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.sources.timeout_secs, 15);
        assert!(config.sources.coingecko.enabled);
        assert!(!config.sources.dex.enabled);
    }

    #[test]
    fn test_missing_required_file_fails() {
        assert!(load_from("/nonexistent/oracle.toml", true).is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_temp(
            "oracle-settings-override",
            r#"
[server]
port = 9100

[aggregation]
max_spread_percent = 3.0

[sources.dex]
enabled = true
weth_usd_reference = 3000.0

[sources.dex.rpc_urls]
1 = "http://localhost:8545"
"#,
        );

        let config = load_from(path.to_str().unwrap(), true).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.aggregation.max_spread_percent, 3.0);
        assert_eq!(config.aggregation.very_high_spread_percent, 15.0);
        assert_eq!(config.get_rpc_url(1), Some("http://localhost:8545"));
        assert_eq!(config.sources.dex.weth_usd_reference, Some(3000.0));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let path = write_temp(
            "oracle-settings-invalid",
            "[aggregation]\nmax_spread_percent = 20.0\nvery_high_spread_percent = 10.0\n",
        );

        let err = load_from(path.to_str().unwrap(), true).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_digest() {
        let digest = digest(&OracleConfig::default());
        assert!(digest.contains("listen=127.0.0.1:8000"));
        assert!(digest.contains("coingecko=true"));
    }
}
