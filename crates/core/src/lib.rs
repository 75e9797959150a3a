//! Core types for the multi-source price oracle
//!
//! This crate provides shared types used across all components:
//! - Chain and token definitions
//! - Per-source quotes and the aggregation result
//! - Price requests
//! - Aggregation policy and service configuration
//! - Error taxonomy

pub mod types;
pub mod tokens;
pub mod quotes;
pub mod result;
pub mod request;
pub mod config;
pub mod errors;

pub use types::*;
pub use tokens::*;
pub use quotes::*;
pub use result::*;
pub use request::*;
pub use config::*;
pub use errors::*;
