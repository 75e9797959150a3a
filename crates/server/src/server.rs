//! HTTP server startup

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use oracle_core::ServerConfig;

use crate::api::{router, AppState};

/// HTTP server wrapper
pub struct OracleServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl OracleServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until `shutdown` fires, then drain in-flight requests
    pub async fn start_with_shutdown(
        &self,
        shutdown: tokio::sync::oneshot::Receiver<()>,
    ) -> anyhow::Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .with_context(|| format!("Invalid listen address {}", self.address()))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        axum::serve(listener, router(Arc::clone(&self.state)))
            .with_graceful_shutdown(async {
                shutdown.await.ok();
                info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use oracle_aggregator::PriceAggregator;
    use oracle_price_feed::SourceSet;

    fn state() -> AppState {
        AppState::new(SourceSet::new(Duration::from_secs(1)), PriceAggregator::default())
    }

    #[test]
    fn test_address() {
        let server = OracleServer::new(ServerConfig::default(), state());
        assert_eq!(server.address(), "127.0.0.1:8000");
        assert!(server.state().sources.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_stops_server() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };
        let server = OracleServer::new(config, state());
        let (tx, rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move { server.start_with_shutdown(rx).await });
        tx.send(()).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(outcome.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_host_is_rejected() {
        let config = ServerConfig {
            host: "not a host".into(),
            port: 8000,
        };
        let server = OracleServer::new(config, state());
        let (_tx, rx) = tokio::sync::oneshot::channel();
        assert!(server.start_with_shutdown(rx).await.is_err());
    }
}
