//! Price source trait and the concurrent quote collector

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use oracle_core::{PriceRequest, Quote, SourceError, SourceResult, SourcesConfig};

use crate::coingecko::CoinGeckoSource;
use crate::dex::DexSource;

/// One upstream price provider
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// Identifier written into every quote's `source` field
    fn name(&self) -> &'static str;

    /// Look up the requested token. Errors become invalid quotes in [`SourceSet::collect`].
    async fn fetch(&self, request: &PriceRequest) -> SourceResult<Quote>;
}

/// Registered sources, queried together for every request
#[derive(Clone)]
pub struct SourceSet {
    sources: Vec<Arc<dyn PriceSource>>,
    timeout: Duration,
}

impl SourceSet {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: vec![],
            timeout,
        }
    }

    /// Build the adapters enabled in the configuration
    pub fn from_config(config: &SourcesConfig) -> SourceResult<Self> {
        let mut set = Self::new(Duration::from_secs(config.timeout_secs));

        if config.coingecko.enabled {
            set.push(Arc::new(CoinGeckoSource::new(&config.coingecko)?));
            info!("CoinGecko source enabled ({})", config.coingecko.base_url);
        }

        if config.dex.enabled {
            set.push(Arc::new(DexSource::new(&config.dex)?));
            info!("DEX source enabled for {} chain(s)", config.dex.rpc_urls.len());
        }

        if set.is_empty() {
            warn!("No price sources enabled; every request will report total failure");
        }

        Ok(set)
    }

    pub fn with_source(mut self, source: impl PriceSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn push(&mut self, source: Arc<dyn PriceSource>) {
        self.sources.push(source);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query every source concurrently, each under its own timeout.
    ///
    /// Resolves once all sources have settled. Quotes come back in
    /// registration order; failures and timeouts are invalid quotes.
    pub async fn collect(&self, request: &PriceRequest) -> Vec<Quote> {
        let calls = self
            .sources
            .iter()
            .map(|source| fetch_with_timeout(source.as_ref(), request, self.timeout));

        let quotes = join_all(calls).await;

        debug!(
            token = %request.token_address,
            chain_id = request.chain_id,
            valid = quotes.iter().filter(|q| q.is_valid()).count(),
            total = quotes.len(),
            "Collected quotes"
        );

        quotes
    }
}

async fn fetch_with_timeout(source: &dyn PriceSource, request: &PriceRequest, timeout: Duration) -> Quote {
    match tokio::time::timeout(timeout, source.fetch(request)).await {
        Ok(Ok(quote)) => quote,
        Ok(Err(e)) => {
            warn!(source = source.name(), token = %request.token_address, "Source failed: {}", e);
            Quote::failed(source.name(), e.to_string())
        }
        Err(_) => {
            let e = SourceError::Timeout(timeout);
            warn!(source = source.name(), token = %request.token_address, "{}", e);
            Quote::failed(source.name(), e.to_string())
        }
    }
}
