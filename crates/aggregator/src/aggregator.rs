//! Price aggregator - fuses per-source quotes into one consensus price

use tracing::{debug, warn};

use oracle_core::{
    AggregationPolicy, AggregationResult, CoreResult, Observation, PriceRange, QualityWarning,
    Quote,
};

use crate::stats::{self, canonical_order, round_to};
use crate::{confidence, warnings};

const PRICE_DECIMALS: i32 = 6;
const CONFIDENCE_DECIMALS: i32 = 3;
const SPREAD_DECIMALS: i32 = 2;

/// Stateless consensus engine.
///
/// Holds only its policy, so one instance can be shared across any number of
/// concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct PriceAggregator {
    policy: AggregationPolicy,
}

impl PriceAggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    /// Build an aggregator after validating the policy
    pub fn try_new(policy: AggregationPolicy) -> CoreResult<Self> {
        policy.validate()?;
        Ok(Self::new(policy))
    }

    /// Aggregate all quotes gathered for one (token, chain) pair.
    ///
    /// Never fails: with no valid quote the result has zero price, zero
    /// confidence, the full input as `sources` and one critical warning.
    /// The returned result is unstamped.
    pub fn aggregate(&self, token_address: &str, chain_id: u64, quotes: &[Quote]) -> AggregationResult {
        let valid: Vec<&Quote> = quotes.iter().filter(|q| q.is_valid()).collect();

        if valid.is_empty() {
            warn!(
                token = token_address,
                chain_id,
                sources = quotes.len(),
                "No valid price sources available"
            );
            return error_result(token_address, chain_id, quotes);
        }

        let mut observations: Vec<(f64, f64)> = valid
            .iter()
            .filter_map(|q| match q.observation {
                Observation::Valid { price, confidence } => Some((price, confidence)),
                Observation::Invalid { .. } => None,
            })
            .collect();
        observations.sort_by(canonical_order);

        let (price, range, confidence) = match observations.as_slice() {
            [(price, source_confidence)] => (
                *price,
                PriceRange::point(*price),
                confidence::single_source(&self.policy, *source_confidence),
            ),
            _ => self.fuse(&observations),
        };

        let warnings = warnings::collect(
            &self.policy,
            range.spread_percent,
            observations.len(),
            quotes.len(),
        );

        debug!(
            token = token_address,
            chain_id,
            valid = observations.len(),
            total = quotes.len(),
            price,
            confidence,
            spread_percent = range.spread_percent,
            "Aggregated price"
        );

        AggregationResult {
            token_address: token_address.to_string(),
            chain_id,
            price: round_to(price, PRICE_DECIMALS),
            confidence: round_to(confidence, CONFIDENCE_DECIMALS),
            valid_source_count: observations.len(),
            price_range: PriceRange {
                min: round_to(range.min, PRICE_DECIMALS),
                max: round_to(range.max, PRICE_DECIMALS),
                spread_percent: round_to(range.spread_percent, SPREAD_DECIMALS),
            },
            sources: valid.into_iter().cloned().collect(),
            warnings,
            timestamp: None,
        }
    }

    /// Weighted consensus, spread and confidence for two or more observations
    fn fuse(&self, observations: &[(f64, f64)]) -> (f64, PriceRange, f64) {
        let prices: Vec<f64> = observations.iter().map(|(p, _)| *p).collect();
        let confidences: Vec<f64> = observations.iter().map(|(_, c)| *c).collect();

        let price = stats::weighted_price(observations);
        let (min, max) = stats::min_max(&prices);
        let spread_percent = stats::spread_percent(min, max, price);
        let confidence = confidence::multi_source(&self.policy, &confidences, spread_percent);

        (price, PriceRange { min, max, spread_percent }, confidence)
    }
}

fn error_result(token_address: &str, chain_id: u64, quotes: &[Quote]) -> AggregationResult {
    AggregationResult {
        token_address: token_address.to_string(),
        chain_id,
        price: 0.0,
        confidence: 0.0,
        valid_source_count: 0,
        price_range: PriceRange::default(),
        sources: quotes.to_vec(),
        warnings: vec![QualityWarning::NoValidData],
        timestamp: None,
    }
}
