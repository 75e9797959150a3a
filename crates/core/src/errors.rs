//! Error types
//!
//! The aggregation engine itself never fails; these cover configuration,
//! request validation and the individual source adapters.

use std::time::Duration;
use thiserror::Error;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Source adapter errors. The collector turns each into an invalid quote.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {0}")]
    HttpStatus(u16),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    NotFound(String),

    #[error("Chain {0} not supported")]
    UnsupportedChain(u64),

    #[error("Currency {0} not supported")]
    UnsupportedCurrency(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Pair address required for DEX pricing")]
    PairRequired,

    #[error("Token not in pair")]
    TokenNotInPair,

    #[error("Zero liquidity")]
    ZeroLiquidity,

    #[error("Unknown quote token: {0}")]
    UnknownQuoteToken(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
pub type SourceResult<T> = Result<T, SourceError>;
