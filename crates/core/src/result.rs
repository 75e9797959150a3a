//! Aggregation output types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::Quote;

/// Min/max of the valid quotes and their spread relative to the consensus price
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub spread_percent: f64,
}

impl PriceRange {
    /// Range of a single observation
    pub fn point(price: f64) -> Self {
        Self {
            min: price,
            max: price,
            spread_percent: 0.0,
        }
    }
}

/// How much a warning should worry the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Data-quality concern attached to an aggregation result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "String")]
pub enum QualityWarning {
    /// Spread above the policy threshold
    HighSpread { spread_percent: f64 },
    /// Spread above the escalation threshold
    VeryHighSpread,
    SingleSource,
    SourcesFailed { failed: usize },
    NoValidData,
}

impl QualityWarning {
    pub fn severity(&self) -> Severity {
        match self {
            QualityWarning::HighSpread { .. } | QualityWarning::VeryHighSpread => Severity::Warning,
            QualityWarning::SingleSource | QualityWarning::SourcesFailed { .. } => Severity::Info,
            QualityWarning::NoValidData => Severity::Critical,
        }
    }
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::HighSpread { spread_percent } => {
                write!(f, "High price spread: {spread_percent:.1}% between sources")
            }
            QualityWarning::VeryHighSpread => write!(
                f,
                "Very high spread - price may be unreliable or an arbitrage opportunity"
            ),
            QualityWarning::SingleSource => write!(f, "Single price source - confidence reduced"),
            QualityWarning::SourcesFailed { failed } => {
                write!(f, "{failed} source(s) failed to provide price")
            }
            QualityWarning::NoValidData => write!(f, "No valid price data available"),
        }
    }
}

impl From<QualityWarning> for String {
    fn from(warning: QualityWarning) -> Self {
        warning.to_string()
    }
}

/// Consensus price for one (token, chain) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub token_address: String,
    pub chain_id: u64,
    /// Rounded to 6 decimals; 0.0 iff no valid quotes
    pub price: f64,
    /// Rounded to 3 decimals
    pub confidence: f64,
    pub valid_source_count: usize,
    pub price_range: PriceRange,
    /// Valid quotes in input order, or the full input on total failure
    pub sources: Vec<Quote>,
    pub warnings: Vec<QualityWarning>,
    /// Filled in by the caller; the engine never reads the clock
    pub timestamp: Option<DateTime<Utc>>,
}

impl AggregationResult {
    pub fn is_total_failure(&self) -> bool {
        self.valid_source_count == 0
    }

    /// Stamp the result with the time it is handed downstream
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Highest severity among the attached warnings
    pub fn worst_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(QualityWarning::severity).max()
    }
}
