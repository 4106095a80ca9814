//! Conversions between odds formats and implied probability.
//!
//! Decimal is the canonical representation; American and fractional are
//! derived from it:
//!   American → decimal:  `1 + v/100` for `v > 0`, `1 + 100/|v|` otherwise
//!   decimal → American:  `round((d−1)·100)` for `d >= 2`, `round(−100/(d−1))` otherwise
//!   implied probability: `1 / d`

use super::{Odds, OddsFormat, OddsValue};
use crate::error::{EngineError, Result};

/// Tolerance used when checking that a fraction reproduces a decimal price.
pub(crate) const EPSILON: f64 = 1e-9;

const MAX_EXPANSION_TERMS: usize = 64;

pub(crate) fn validate_decimal(decimal: f64) -> Result<()> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(EngineError::invalid_odds(format!(
            "decimal odds must be a finite number > 1.0, got {}",
            decimal
        )));
    }
    Ok(())
}

pub(crate) fn to_decimal(odds: &Odds) -> f64 {
    match odds.value() {
        OddsValue::American { value } if value > 0 => 1.0 + value as f64 / 100.0,
        OddsValue::American { value } => 1.0 + 100.0 / (value as f64).abs(),
        OddsValue::Decimal { value } => value,
        OddsValue::Fractional {
            numerator,
            denominator,
        } => 1.0 + numerator as f64 / denominator as f64,
    }
}

pub(crate) fn to_american(decimal: f64) -> Result<i32> {
    validate_decimal(decimal)?;
    let american = if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round()
    } else {
        (-100.0 / (decimal - 1.0)).round()
    };
    if american.abs() > i32::MAX as f64 {
        return Err(EngineError::invalid_odds(format!(
            "decimal odds {} fall outside the American range",
            decimal
        )));
    }
    Ok(american as i32)
}

/// Best rational approximation of the profit ratio `decimal − 1`, found by
/// continued-fraction expansion.  Expansion stops once a convergent is
/// within [`EPSILON`] (scaled down for ratios below 1) or the next one no
/// longer fits in `u32`.  Convergents
/// are always in lowest terms.
pub(crate) fn to_fractional(decimal: f64) -> Result<(u32, u32)> {
    validate_decimal(decimal)?;
    let target = decimal - 1.0;
    let whole = target.floor();
    if whole > u32::MAX as f64 {
        return Err(EngineError::invalid_odds(format!(
            "decimal odds {} are too long to express as a fraction",
            decimal
        )));
    }

    let limit = u32::MAX as u64;
    let tolerance = EPSILON * target.min(1.0);
    let (mut h_prev, mut h) = (1u64, whole as u64);
    let (mut k_prev, mut k) = (0u64, 1u64);
    let mut remainder = target - whole;

    for _ in 0..MAX_EXPANSION_TERMS {
        if (target - h as f64 / k as f64).abs() <= tolerance || remainder <= f64::EPSILON {
            break;
        }
        let reciprocal = 1.0 / remainder;
        let term = reciprocal.floor();
        if term > limit as f64 {
            break;
        }
        // term, h and k all fit in u32, so neither product overflows u64
        let term = term as u64;
        let next_h = term * h + h_prev;
        let next_k = term * k + k_prev;
        if next_h > limit || next_k > limit {
            break;
        }
        (h_prev, h) = (h, next_h);
        (k_prev, k) = (k, next_k);
        remainder = reciprocal - term as f64;
    }

    if h == 0 {
        return Err(EngineError::invalid_odds(format!(
            "decimal odds {} are too short to express as a fraction",
            decimal
        )));
    }
    Ok((h as u32, k as u32))
}

/// A fractional price in lowest terms.
pub(crate) fn reduce(numerator: u32, denominator: u32) -> (u32, u32) {
    let g = gcd(numerator as u64, denominator as u64) as u32;
    (numerator / g, denominator / g)
}

/// The fractional view of `odds`.  Fractional input is reduced exactly;
/// other formats are approximated from their decimal value.
pub(crate) fn fractional_view(odds: &Odds) -> Result<(u32, u32)> {
    match odds.value() {
        OddsValue::Fractional {
            numerator,
            denominator,
        } => Ok(reduce(numerator, denominator)),
        _ => to_fractional(to_decimal(odds)),
    }
}

pub(crate) fn implied_probability(odds: &Odds) -> f64 {
    1.0 / to_decimal(odds)
}

/// Price a probability in the requested format.  `p` must lie strictly
/// between 0 and 1.
pub(crate) fn from_implied_probability(p: f64, target: OddsFormat) -> Result<Odds> {
    if !(p > 0.0 && p < 1.0) {
        return Err(EngineError::invalid_odds(format!(
            "probability must lie strictly between 0 and 1, got {}",
            p
        )));
    }
    let decimal = 1.0 / p;
    match target {
        OddsFormat::Decimal => Odds::decimal(decimal),
        OddsFormat::American => Odds::american(to_american(decimal)?),
        OddsFormat::Fractional => {
            let (numerator, denominator) = to_fractional(decimal)?;
            Odds::fractional(numerator, denominator)
        }
    }
}

pub(crate) fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
