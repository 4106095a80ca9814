//! Per-bet derived metrics: payout, break-even probability and expected
//! value, plus the leg fold that prices a parlay as its legs settle.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::ledger::{Bet, BetStatus, Leg};

/// A parlay priced over the legs still in play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParlaySettlement {
    pub status: BetStatus,
    /// Product of the decimal odds of every leg not pushed or voided.
    pub decimal_odds: f64,
    pub active_legs: usize,
    pub removed_legs: usize,
}

#[derive(Debug, Clone, Copy)]
struct LegFold {
    decimal_odds: f64,
    active: usize,
    removed: usize,
    voided: usize,
    lost: bool,
    pending: bool,
}

impl LegFold {
    fn new() -> Self {
        LegFold {
            decimal_odds: 1.0,
            active: 0,
            removed: 0,
            voided: 0,
            lost: false,
            pending: false,
        }
    }

    fn absorb(self, leg: &Leg) -> Self {
        match leg.status {
            BetStatus::Push => LegFold {
                removed: self.removed + 1,
                ..self
            },
            BetStatus::Void => LegFold {
                removed: self.removed + 1,
                voided: self.voided + 1,
                ..self
            },
            status => LegFold {
                decimal_odds: self.decimal_odds * leg.odds.to_decimal(),
                active: self.active + 1,
                lost: self.lost || status == BetStatus::Lost,
                pending: self.pending || status == BetStatus::Pending,
                ..self
            },
        }
    }

    fn finish(self) -> ParlaySettlement {
        let status = if self.lost {
            BetStatus::Lost
        } else if self.active == 0 {
            // Every leg came back: the ticket is refunded.
            if self.voided == self.removed {
                BetStatus::Void
            } else {
                BetStatus::Push
            }
        } else if self.pending {
            BetStatus::Pending
        } else {
            BetStatus::Won
        };
        ParlaySettlement {
            status,
            decimal_odds: self.decimal_odds,
            active_legs: self.active,
            removed_legs: self.removed,
        }
    }
}

/// Fold a leg list into the parlay's effective status and price.
///
/// Any Lost leg loses the ticket.  Push/Void legs drop out and the price is
/// compounded over what remains; the ticket wins only when every remaining
/// leg has won.
pub(crate) fn settle_parlay(bet_id: &str, legs: &[Leg]) -> Result<ParlaySettlement> {
    if legs.is_empty() {
        return Err(EngineError::invalid_bet(bet_id, "parlay has no legs"));
    }
    Ok(legs.iter().fold(LegFold::new(), LegFold::absorb).finish())
}

/// The status and price a bet actually settles at.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Effective {
    pub status: BetStatus,
    pub decimal_odds: f64,
    pub parlay: Option<ParlaySettlement>,
}

/// Check a bet's shape and work out its effective status and price.
pub(crate) fn resolve(bet: &Bet) -> Result<Effective> {
    if !bet.stake.is_finite() || bet.stake <= 0.0 {
        return Err(EngineError::invalid_bet(
            &bet.id,
            format!("stake must be a positive amount, got {}", bet.stake),
        ));
    }

    match (bet.status, bet.settled_at) {
        (BetStatus::Pending, Some(_)) => {
            return Err(EngineError::invalid_bet(
                &bet.id,
                "pending bet carries a settlement time",
            ))
        }
        (status, None) if status.is_settled() => {
            return Err(EngineError::invalid_bet(
                &bet.id,
                format!("{:?} bet has no settlement time", status),
            ))
        }
        (_, Some(settled_at)) if settled_at < bet.placed_at => {
            return Err(EngineError::invalid_bet(
                &bet.id,
                "settled before it was placed",
            ))
        }
        _ => {}
    }

    match &bet.legs {
        Some(legs) => {
            let settlement = settle_parlay(&bet.id, legs)?;
            if settlement.status != bet.status {
                return Err(EngineError::invalid_bet(
                    &bet.id,
                    format!(
                        "recorded status {:?} disagrees with its legs ({:?})",
                        bet.status, settlement.status
                    ),
                ));
            }
            Ok(Effective {
                status: settlement.status,
                decimal_odds: settlement.decimal_odds,
                parlay: Some(settlement),
            })
        }
        None => Ok(Effective {
            status: bet.status,
            decimal_odds: bet.odds.to_decimal(),
            parlay: None,
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub bet_id: String,
    pub status: BetStatus,
    /// Price the bet pays at; compounded over active legs for a parlay.
    pub decimal_odds: f64,
    /// Stake returned plus winnings if the bet wins.
    pub potential_payout: f64,
    pub potential_profit: f64,
    /// Break-even win probability, `1 / decimal_odds`.
    pub implied_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parlay: Option<ParlaySettlement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_probability: Option<f64>,
    /// Only present when a probability estimate was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<f64>,
}

/// Value a bet, optionally against an estimate of its true win probability.
///
/// `EV = p · profit − (1 − p) · stake`
pub(crate) fn valuate(bet: &Bet, fair_probability: Option<f64>) -> Result<Valuation> {
    let effective = resolve(bet)?;

    if let Some(p) = fair_probability {
        if !(0.0..=1.0).contains(&p) {
            return Err(EngineError::invalid_odds(format!(
                "fair probability must lie within [0, 1], got {}",
                p
            )));
        }
    }

    let potential_payout = bet.stake * effective.decimal_odds;
    let potential_profit = potential_payout - bet.stake;
    let expected_value =
        fair_probability.map(|p| p * potential_profit - (1.0 - p) * bet.stake);

    Ok(Valuation {
        bet_id: bet.id.clone(),
        status: effective.status,
        decimal_odds: effective.decimal_odds,
        potential_payout,
        potential_profit,
        implied_probability: 1.0 / effective.decimal_odds,
        parlay: effective.parlay,
        fair_probability,
        expected_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::models::fixtures::{day, parlay, pending, straight};
    use approx::assert_relative_eq;
    use BetStatus::*;

    #[test]
    fn won_bet_payout_and_profit() {
        let bet = straight("b1", 10.0, 2.5, Won, 3);
        let v = valuate(&bet, None).unwrap();
        assert_relative_eq!(v.potential_payout, 25.0, epsilon = 1e-9);
        assert_relative_eq!(v.potential_profit, 15.0, epsilon = 1e-9);
        assert_relative_eq!(v.implied_probability, 0.4, epsilon = 1e-9);
        assert!(v.parlay.is_none());
    }

    #[test]
    fn expected_value_with_estimate() {
        let bet = pending("b1", 10.0, 2.5, 3);
        let v = valuate(&bet, Some(0.5)).unwrap();
        // 0.5 · 15 − 0.5 · 10
        assert_relative_eq!(v.expected_value.unwrap(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn missing_estimate_is_not_zero_ev() {
        let bet = pending("b1", 10.0, 2.5, 3);
        let without = valuate(&bet, None).unwrap();
        assert_eq!(without.expected_value, None);

        // Break-even estimate yields a computed zero, which must stay distinct.
        let at_break_even = valuate(&bet, Some(0.4)).unwrap();
        let ev = at_break_even.expected_value.expect("ev computed");
        assert_relative_eq!(ev, 0.0, epsilon = 1e-9);

        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("expected_value").is_none());
    }

    #[test]
    fn estimate_outside_unit_interval_is_rejected() {
        let bet = pending("b1", 10.0, 2.5, 3);
        for p in [-0.1, 1.1, f64::NAN] {
            assert!(matches!(
                valuate(&bet, Some(p)),
                Err(EngineError::InvalidOdds { .. })
            ));
        }
    }

    #[test]
    fn non_positive_stake_is_rejected() {
        for stake in [0.0, -5.0, f64::NAN] {
            let bet = pending("bad", stake, 2.0, 3);
            match valuate(&bet, None) {
                Err(EngineError::InvalidBet { bet_id, .. }) => assert_eq!(bet_id, "bad"),
                other => panic!("Expected InvalidBet, got {:?}", other),
            }
        }
    }

    #[test]
    fn empty_parlay_is_rejected() {
        let mut bet = parlay("p0", 10.0, &[(2.0, Won)], Won);
        bet.legs = Some(vec![]);
        assert!(matches!(valuate(&bet, None), Err(EngineError::InvalidBet { .. })));
    }

    #[test]
    fn parlay_push_leg_drops_out() {
        let bet = parlay("p1", 10.0, &[(1.5, Won), (2.0, Push), (1.8, Won)], Won);
        let v = valuate(&bet, None).unwrap();
        assert_eq!(v.status, Won);
        assert_relative_eq!(v.decimal_odds, 1.5 * 1.8, epsilon = 1e-9);
        let settlement = v.parlay.unwrap();
        assert_eq!(settlement.active_legs, 2);
        assert_eq!(settlement.removed_legs, 1);
    }

    #[test]
    fn parlay_any_lost_leg_loses() {
        let s = settle_parlay("p", &leg_list(&[(1.5, Won), (2.0, Lost), (1.8, Pending)])).unwrap();
        assert_eq!(s.status, Lost);
    }

    #[test]
    fn parlay_with_open_leg_is_pending() {
        let s = settle_parlay("p", &leg_list(&[(1.5, Won), (2.0, Void), (1.8, Pending)])).unwrap();
        assert_eq!(s.status, Pending);
        assert_relative_eq!(s.decimal_odds, 1.5 * 1.8, epsilon = 1e-9);
    }

    #[test]
    fn parlay_with_every_leg_returned() {
        let s = settle_parlay("p", &leg_list(&[(1.5, Push), (2.0, Void)])).unwrap();
        assert_eq!(s.status, Push);
        assert_relative_eq!(s.decimal_odds, 1.0, epsilon = 1e-12);

        let s = settle_parlay("p", &leg_list(&[(1.5, Void), (2.0, Void)])).unwrap();
        assert_eq!(s.status, Void);
    }

    #[test]
    fn parlay_recorded_status_must_match_legs() {
        let bet = parlay("p2", 10.0, &[(1.5, Won), (2.0, Lost)], Won);
        match valuate(&bet, None) {
            Err(EngineError::InvalidBet { bet_id, reason }) => {
                assert_eq!(bet_id, "p2");
                assert!(reason.contains("disagrees"));
            }
            other => panic!("Expected InvalidBet, got {:?}", other),
        }
    }

    #[test]
    fn settlement_time_must_match_status() {
        let mut bet = straight("b", 10.0, 2.0, Won, 3);
        bet.settled_at = None;
        assert!(resolve(&bet).is_err());

        let mut bet = pending("b", 10.0, 2.0, 3);
        bet.settled_at = Some(day(4));
        assert!(resolve(&bet).is_err());

        let mut bet = straight("b", 10.0, 2.0, Lost, 3);
        bet.settled_at = Some(day(1));
        assert!(resolve(&bet).is_err());
    }

    fn leg_list(legs: &[(f64, BetStatus)]) -> Vec<Leg> {
        parlay("p", 1.0, legs, Pending).legs.unwrap()
    }
}
