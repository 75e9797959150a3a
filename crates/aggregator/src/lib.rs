//! Consensus price engine
//!
//! Features:
//! - Confidence-weighted consensus with a median fallback
//! - Spread-aware confidence scoring with corroboration bonus
//! - Ordered data-quality warnings
//! - Pure and deterministic: no I/O, no clock, order-independent statistics

pub mod aggregator;
pub mod confidence;
pub mod stats;
pub mod warnings;

pub use aggregator::PriceAggregator;
