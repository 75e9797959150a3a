//! Data-quality warnings, in the order consumers see them

use oracle_core::{AggregationPolicy, QualityWarning};

/// Warnings for a result with at least one valid quote.
///
/// Total failure is reported by the engine's error path instead.
pub fn collect(
    policy: &AggregationPolicy,
    spread_percent: f64,
    valid_count: usize,
    total_count: usize,
) -> Vec<QualityWarning> {
    let mut warnings = Vec::new();

    if spread_percent > policy.max_spread_percent {
        warnings.push(QualityWarning::HighSpread { spread_percent });
    }

    if spread_percent > policy.very_high_spread_percent {
        warnings.push(QualityWarning::VeryHighSpread);
    }

    if valid_count == 1 {
        warnings.push(QualityWarning::SingleSource);
    }

    if valid_count < total_count {
        warnings.push(QualityWarning::SourcesFailed {
            failed: total_count - valid_count,
        });
    }

    warnings
}
