//! Decimal rounding policy shared by the returns calculator and statistics engine.
//!
//! Every division rounds half-up to the scale of its dividend, and every square root
//! is rounded half-up to [`SQRT_PRECISION`] significant digits.

use super::error::StatisticsError;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

/// Significant digits kept by every square root.
pub const SQRT_PRECISION: u32 = 3;

const HALF_UP: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

pub fn round_significant(value: Decimal, digits: u32) -> Result<Decimal, StatisticsError> {
    if value.is_zero() {
        return Ok(value);
    }
    value
        .round_sf_with_strategy(digits, HALF_UP)
        .ok_or(StatisticsError::Arithmetic {
            operation: "significant-digit rounding",
        })
}

/// `dividend / divisor`, rounded half-up to the dividend's scale.
///
/// A zero divisor yields `None` so callers can report the degenerate case by name.
pub fn divide_half_up(dividend: Decimal, divisor: Decimal) -> Option<Decimal> {
    if divisor.is_zero() {
        return None;
    }
    dividend
        .checked_div(divisor)
        .map(|q| q.round_dp_with_strategy(dividend.scale(), HALF_UP))
}

/// Square root rounded to [`SQRT_PRECISION`] significant digits.
///
/// Inexact roots keep all their significant digits, so `sqrt(26)` is `5.10`. Exact roots
/// take the scale closest to half the input's scale, so `sqrt(4)` is `2` and
/// `sqrt(0.0004)` is `0.02`.
pub fn sqrt_rounded(value: Decimal) -> Result<Decimal, StatisticsError> {
    if value.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let root = value.sqrt().ok_or(StatisticsError::Arithmetic {
        operation: "square root",
    })?;
    let rounded = round_significant(root, SQRT_PRECISION)?;
    if rounded * rounded != value {
        return Ok(rounded);
    }

    let mut exact = rounded.normalize();
    let digits = exact.mantissa().unsigned_abs().to_string().len() as u32;
    let widest = exact.scale() + SQRT_PRECISION.saturating_sub(digits);
    let preferred = (value.scale() / 2).min(widest);
    if exact.scale() < preferred {
        exact.rescale(preferred);
    }
    Ok(exact)
}

/// Two fractional digits, half-up, with a `$` prefix.
pub fn format_dollars(value: Decimal) -> String {
    format!("${:.2}", value.round_dp_with_strategy(2, HALF_UP))
}
