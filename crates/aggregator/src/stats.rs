//! Small statistics helpers over valid observations

use std::cmp::Ordering;

/// Median of `values`; mean of the two middle values for an even count.
/// Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Confidence-weighted mean of `(price, weight)` pairs.
///
/// Falls back to the median price when the weights sum to zero.
pub fn weighted_price(observations: &[(f64, f64)]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }

    let weighted_sum: f64 = observations.iter().map(|(p, w)| p * w).sum();
    let total_weight: f64 = observations.iter().map(|(_, w)| w).sum();

    if total_weight == 0.0 {
        let prices: Vec<f64> = observations.iter().map(|(p, _)| *p).collect();
        return median(&prices);
    }

    weighted_sum / total_weight
}

/// `(max - min) / reference * 100`, or 0 when the reference is not positive
pub fn spread_percent(min: f64, max: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        (max - min) / reference * 100.0
    } else {
        0.0
    }
}

/// Smallest and largest value; `(0, 0)` for an empty slice
pub fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    })
}

/// Round half away from zero to `decimals` places.
///
/// Values too large to carry that many fractional digits are returned as is.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_INTEGER {
        return value;
    }
    scaled.round() / factor
}

/// 2^52: above this every f64 is already an integer
const MAX_EXACT_INTEGER: f64 = 4_503_599_627_370_496.0;

/// Total order on observations so floating-point sums do not depend on input order
pub fn canonical_order(a: &(f64, f64), b: &(f64, f64)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
}
