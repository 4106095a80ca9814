//! Kelly Criterion stake sizing.
//!
//! The Kelly formula sizes a bet to maximise the expected logarithm of
//! bankroll:
//!   f* = (b·p − q) / b
//! where
//!   b  = net odds received on the bet (decimal odds − 1)
//!   p  = estimated probability of winning
//!   q  = 1 − p
//!
//! A *fractional* Kelly multiplier (0 < multiplier ≤ 1) trades a little
//! growth for much lower variance.

/// Fraction of bankroll to stake, in [0, 1].  Returns `0.0` when the bet has
/// no edge.
///
/// # Arguments
/// * `win_prob`     – Estimated probability that the bet wins (0.0–1.0).
/// * `decimal_odds` – Price taken, in decimal form.
/// * `multiplier`   – Fractional Kelly multiplier (0.0–1.0).
pub fn kelly_fraction(win_prob: f64, decimal_odds: f64, multiplier: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&win_prob), "win_prob out of range");
    debug_assert!(
        (0.0..=1.0).contains(&multiplier),
        "kelly multiplier out of range"
    );

    if decimal_odds <= 1.0 {
        return 0.0;
    }

    let b = decimal_odds - 1.0;
    let p = win_prob;
    let q = 1.0 - p;

    let f = (b * p - q) / b;

    if f <= 0.0 {
        return 0.0;
    }

    (f * multiplier).clamp(0.0, 1.0)
}

/// Expected return per unit staked: `p · d − 1`.
///
/// Positive edge means the price pays more than the estimated probability
/// warrants.
pub fn edge(win_prob: f64, decimal_odds: f64) -> f64 {
    win_prob * decimal_odds - 1.0
}
