//! HTTP service for the price oracle
//!
//! Wires configuration, the source adapters and the aggregation engine
//! behind a small JSON API.

pub mod api;
pub mod server;
pub mod settings;

pub use api::{router, ApiError, AppState, HealthResponse, PriceResponse};
pub use server::OracleServer;
