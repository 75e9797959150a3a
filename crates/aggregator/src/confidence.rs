//! Confidence model
//!
//! Agreement between independent sources is the main trust signal: a lone
//! quote is discounted, several quotes earn a capped corroboration bonus, and
//! disagreement beyond the spread threshold costs a capped penalty.

use oracle_core::AggregationPolicy;

use crate::stats::median;

/// Confidence for a result backed by exactly one valid quote.
///
/// Only the discount applies; the floor and ceiling bound multi-source results.
pub fn single_source(policy: &AggregationPolicy, source_confidence: f64) -> f64 {
    source_confidence * policy.single_source_discount
}

/// Confidence for a result backed by two or more valid quotes
pub fn multi_source(policy: &AggregationPolicy, confidences: &[f64], spread_percent: f64) -> f64 {
    let base = median(confidences);
    let bonus = corroboration_bonus(policy, confidences.len());
    let penalty = spread_penalty(policy, spread_percent);

    clamp(policy, base + bonus - penalty)
}

/// `min(per_source * count, cap)`
pub fn corroboration_bonus(policy: &AggregationPolicy, source_count: usize) -> f64 {
    (policy.corroboration_bonus_per_source * source_count as f64).min(policy.corroboration_bonus_cap)
}

/// `min((spread - threshold) / 100, cap)` above the threshold, else 0
pub fn spread_penalty(policy: &AggregationPolicy, spread_percent: f64) -> f64 {
    if spread_percent > policy.max_spread_percent {
        ((spread_percent - policy.max_spread_percent) / 100.0).min(policy.spread_penalty_cap)
    } else {
        0.0
    }
}

fn clamp(policy: &AggregationPolicy, confidence: f64) -> f64 {
    confidence.clamp(policy.min_confidence, policy.max_confidence)
}
