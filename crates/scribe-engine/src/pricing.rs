//! Pricing estimator
//!
//! Pure token/cost estimation over a section list and a notes-context
//! blob. Safe to call with no prior state: the same function serves
//! the informational preview endpoint and the admission path, and the
//! snapshot it produces is stored on the job and never recomputed.

use crate::types::Section;
use serde::{Deserialize, Serialize};

/// Number of decimal places cost bounds are rounded to
const COST_DECIMALS: i32 = 4;

/// Approximate bytes of notes context per input token
const BYTES_PER_TOKEN: u64 = 4;

/// Pricing model parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tag recorded on every estimate and job
    pub model: String,
    /// USD per 1000 input tokens
    pub input_rate_per_1k: f64,
    /// USD per 1000 output tokens
    pub output_rate_per_1k: f64,
    /// Fixed prompt overhead added per requested section, in tokens
    pub per_section_input_overhead: u64,
    /// Low-side output heuristic per section, in tokens
    pub output_tokens_low_per_section: u64,
    /// High-side output heuristic per section, in tokens
    pub output_tokens_high_per_section: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            model: "scribe-standard-1".to_string(),
            input_rate_per_1k: 0.003,
            output_rate_per_1k: 0.015,
            per_section_input_overhead: 250,
            output_tokens_low_per_section: 400,
            output_tokens_high_per_section: 1200,
        }
    }
}

/// Token and cost estimate for a proposed job
///
/// Invariant: `low <= high` for both tokens and cost, including the
/// degenerate zero-section case where every bound is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEstimate {
    /// Pricing model tag the estimate was computed under
    pub pricing_model: String,
    /// Deterministic input token count
    pub estimated_input_tokens: u64,
    /// Low-side output token bound
    pub estimated_output_tokens_low: u64,
    /// High-side output token bound
    pub estimated_output_tokens_high: u64,
    /// Low-side cost bound in USD
    pub estimated_cost_usd_low: f64,
    /// High-side cost bound in USD
    pub estimated_cost_usd_high: f64,
}

impl PricingEstimate {
    /// All-zero estimate under the given model tag
    #[must_use]
    pub fn zero(model: impl Into<String>) -> Self {
        Self {
            pricing_model: model.into(),
            estimated_input_tokens: 0,
            estimated_output_tokens_low: 0,
            estimated_output_tokens_high: 0,
            estimated_cost_usd_low: 0.0,
            estimated_cost_usd_high: 0.0,
        }
    }
}

/// Estimate tokens and cost for generating `sections` against
/// `notes_context`.
#[must_use]
pub fn estimate(sections: &[Section], notes_context: &str, config: &PricingConfig) -> PricingEstimate {
    let section_count = sections.len() as u64;
    if section_count == 0 {
        return PricingEstimate::zero(config.model.clone());
    }

    let context_tokens = (notes_context.len() as u64).div_ceil(BYTES_PER_TOKEN);
    let input_tokens = context_tokens + config.per_section_input_overhead * section_count;
    let output_low = config.output_tokens_low_per_section * section_count;
    let output_high = config.output_tokens_high_per_section * section_count;

    PricingEstimate {
        pricing_model: config.model.clone(),
        estimated_input_tokens: input_tokens,
        estimated_output_tokens_low: output_low,
        estimated_output_tokens_high: output_high,
        estimated_cost_usd_low: cost_usd(input_tokens, output_low, config),
        estimated_cost_usd_high: cost_usd(input_tokens, output_high, config),
    }
}

fn cost_usd(input_tokens: u64, output_tokens: u64, config: &PricingConfig) -> f64 {
    let raw = input_tokens as f64 / 1000.0 * config.input_rate_per_1k
        + output_tokens as f64 / 1000.0 * config.output_rate_per_1k;
    round_usd(raw)
}

/// Round to the fixed number of cost decimal places
#[must_use]
pub fn round_usd(amount: f64) -> f64 {
    let factor = 10f64.powi(COST_DECIMALS);
    (amount * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sections_give_zero_bounds() {
        let est = estimate(&[], "plenty of context", &PricingConfig::default());
        assert_eq!(est.estimated_input_tokens, 0);
        assert_eq!(est.estimated_output_tokens_low, 0);
        assert_eq!(est.estimated_output_tokens_high, 0);
        assert_eq!(est.estimated_cost_usd_low, 0.0);
        assert_eq!(est.estimated_cost_usd_high, 0.0);
    }

    #[test]
    fn input_tokens_are_deterministic() {
        let config = PricingConfig::default();
        let sections = vec![Section::Introduction, Section::Methods];
        let notes = "x".repeat(2000);

        let a = estimate(&sections, &notes, &config);
        let b = estimate(&sections, &notes, &config);
        assert_eq!(a, b);

        // 2000 bytes / 4 + 2 * 250 overhead
        assert_eq!(a.estimated_input_tokens, 500 + 500);
    }

    #[test]
    fn bounds_ordering_holds() {
        let est = estimate(
            &[Section::Introduction, Section::Methods, Section::Results],
            "short brief",
            &PricingConfig::default(),
        );
        assert!(est.estimated_output_tokens_low <= est.estimated_output_tokens_high);
        assert!(est.estimated_cost_usd_low <= est.estimated_cost_usd_high);
    }

    #[test]
    fn cost_is_rounded_to_four_decimals() {
        let est = estimate(
            &[Section::Discussion],
            "some notes",
            &PricingConfig::default(),
        );
        let rescaled = est.estimated_cost_usd_high * 10_000.0;
        assert!((rescaled - rescaled.round()).abs() < 1e-9);
    }

    #[test]
    fn context_length_raises_input_estimate() {
        let config = PricingConfig::default();
        let sections = vec![Section::Results];
        let small = estimate(&sections, "ab", &config);
        let large = estimate(&sections, &"ab".repeat(500), &config);
        assert!(large.estimated_input_tokens > small.estimated_input_tokens);
    }
}
