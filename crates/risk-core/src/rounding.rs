//! Fixed-point rounding for values handed to the presentation layer.
//!
//! Every derived number leaves the core as a `Decimal` rounded half-up
//! (midpoint away from zero) at a per-field scale, so serialized payloads
//! are reproducible.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a decimal half-up to `dp` fraction digits.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a float to a decimal rounded half-up to `dp` fraction digits.
/// Non-finite or out-of-range input becomes zero.
pub fn f64_half_up(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| round_half_up(d, dp))
        .unwrap_or_default()
}
