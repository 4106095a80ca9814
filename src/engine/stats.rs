//! Roll a ledger of bets up into performance statistics.
//!
//! Totals (profit, ROI, win rate, CLV) are plain sums and do not depend on
//! the order of the input.  Streaks do: they are read in the order the bets
//! are supplied, which the storage layer guarantees is settlement order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::valuation::resolve;
use crate::error::Result;
use crate::ledger::{Bet, BetStatus, DateRange};

/// Summary of a set of bets.  Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Requested window, or the first/last settlement times observed.
    pub period: Option<DateRange>,
    pub total_bets: usize,
    /// Won + Lost + Push + Void
    pub settled_bets: usize,
    pub pending_bets: usize,
    pub wins: usize,
    pub losses: usize,
    /// Push and Void bets
    pub pushes: usize,
    /// wins / (wins + losses)
    pub win_rate: f64,
    /// Stake over Won and Lost bets
    pub total_staked: f64,
    /// Payouts received on Won bets
    pub total_returned: f64,
    pub net_profit: f64,
    /// net_profit / total_staked
    pub roi: f64,
    pub average_stake: f64,
    pub average_decimal_odds: f64,
    /// Positive: consecutive wins; negative: consecutive losses.
    pub current_streak: i32,
    pub longest_win_streak: u32,
    pub longest_loss_streak: u32,
    /// Mean probability points gained against the closing line.
    pub average_clv: Option<f64>,
    pub clv_samples: usize,
    /// Net profit in betting units, when a unit size is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_units: Option<f64>,
}

impl StatisticsSnapshot {
    /// True when nothing in the input has settled.
    pub fn is_empty(&self) -> bool {
        self.settled_bets == 0
    }
}

/// Win/loss run tracker.  Push and Void never reach it, so they neither
/// extend nor break a streak.
#[derive(Debug, Clone, Copy, Default)]
struct StreakTracker {
    current: i32,
    longest_win: u32,
    longest_loss: u32,
}

impl StreakTracker {
    fn record(&mut self, won: bool) {
        if won {
            self.current = if self.current > 0 { self.current + 1 } else { 1 };
            self.longest_win = self.longest_win.max(self.current.unsigned_abs());
        } else {
            self.current = if self.current < 0 { self.current - 1 } else { -1 };
            self.longest_loss = self.longest_loss.max(self.current.unsigned_abs());
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    total: usize,
    pending: usize,
    wins: usize,
    losses: usize,
    pushes: usize,
    staked: f64,
    returned: f64,
    odds_sum: f64,
    clv_sum: f64,
    clv_samples: usize,
    first_settled: Option<DateTime<Utc>>,
    last_settled: Option<DateTime<Utc>>,
    streak: StreakTracker,
}

impl Tally {
    fn record(&mut self, bet: &Bet) -> Result<()> {
        let effective = resolve(bet)?;
        self.total += 1;

        match effective.status {
            BetStatus::Pending => self.pending += 1,
            BetStatus::Won => {
                self.wins += 1;
                self.staked += bet.stake;
                self.returned += bet.stake * effective.decimal_odds;
                self.odds_sum += effective.decimal_odds;
                self.streak.record(true);
            }
            BetStatus::Lost => {
                self.losses += 1;
                self.staked += bet.stake;
                self.odds_sum += effective.decimal_odds;
                self.streak.record(false);
            }
            BetStatus::Push | BetStatus::Void => self.pushes += 1,
        }

        if let Some(settled_at) = bet.settled_at {
            self.first_settled = Some(
                self.first_settled
                    .map_or(settled_at, |t| t.min(settled_at)),
            );
            self.last_settled = Some(
                self.last_settled
                    .map_or(settled_at, |t| t.max(settled_at)),
            );
        }

        if let Some(closing) = &bet.closing_odds {
            self.clv_sum += closing_line_value(
                bet.odds.implied_probability(),
                closing.implied_probability(),
            );
            self.clv_samples += 1;
        }
        Ok(())
    }

    fn finish(self) -> StatisticsSnapshot {
        let graded = self.wins + self.losses;
        let net_profit = self.returned - self.staked;
        StatisticsSnapshot {
            period: match (self.first_settled, self.last_settled) {
                (Some(first), Some(last)) => Some(DateRange::between(first, last)),
                _ => None,
            },
            total_bets: self.total,
            settled_bets: graded + self.pushes,
            pending_bets: self.pending,
            wins: self.wins,
            losses: self.losses,
            pushes: self.pushes,
            win_rate: ratio(self.wins as f64, graded as f64),
            total_staked: self.staked,
            total_returned: self.returned,
            net_profit,
            roi: ratio(net_profit, self.staked),
            average_stake: ratio(self.staked, graded as f64),
            average_decimal_odds: ratio(self.odds_sum, graded as f64),
            current_streak: self.streak.current,
            longest_win_streak: self.streak.longest_win,
            longest_loss_streak: self.streak.longest_loss,
            average_clv: (self.clv_samples > 0)
                .then(|| self.clv_sum / self.clv_samples as f64),
            clv_samples: self.clv_samples,
            net_units: None,
        }
    }
}

/// `numerator / denominator`, or 0 when there is nothing to divide by.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Probability points gained by beating the close: positive when the
/// market moved toward the side taken after the bet was placed.
pub(crate) fn closing_line_value(placed_implied: f64, closing_implied: f64) -> f64 {
    closing_implied - placed_implied
}

/// Aggregate a sequence of bets, given in settlement order.
///
/// The first malformed bet rejects the whole call with `InvalidBet` naming
/// it; no partial snapshot is produced.  An input with nothing settled
/// yields a zeroed snapshot.
pub(crate) fn aggregate<'a, I>(bets: I) -> Result<StatisticsSnapshot>
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut tally = Tally::default();
    for bet in bets {
        tally.record(bet)?;
    }
    Ok(tally.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::ledger::models::fixtures::{parlay, pending, straight};
    use crate::odds::Odds;
    use approx::assert_relative_eq;
    use BetStatus::*;

    fn sample_ledger() -> Vec<Bet> {
        vec![
            straight("b1", 10.0, 2.5, Won, 1),
            straight("b2", 20.0, 1.8, Lost, 2),
            straight("b3", 10.0, 2.0, Push, 3),
            straight("b4", 15.0, 2.2, Won, 4),
            straight("b5", 10.0, 1.9, Won, 5),
            straight("b6", 5.0, 3.0, Void, 6),
            pending("b7", 25.0, 2.0, 7),
        ]
    }

    #[test]
    fn empty_input_yields_zeroed_snapshot() {
        let snap = aggregate(&Vec::<Bet>::new()).unwrap();
        assert_eq!(snap.roi, 0.0);
        assert_eq!(snap.win_rate, 0.0);
        assert_eq!(snap.total_bets, 0);
        assert_eq!(snap.current_streak, 0);
        assert!(snap.average_clv.is_none());
        assert!(snap.period.is_none());
        assert!(snap.is_empty());
    }

    #[test]
    fn only_pending_bets_counts_totals_but_no_ratios() {
        let bets = vec![pending("p1", 10.0, 2.0, 1), pending("p2", 10.0, 2.0, 2)];
        let snap = aggregate(&bets).unwrap();
        assert_eq!(snap.total_bets, 2);
        assert_eq!(snap.pending_bets, 2);
        assert_eq!(snap.settled_bets, 0);
        assert_eq!(snap.roi, 0.0);
        assert!(snap.is_empty());
    }

    #[test]
    fn single_won_bet_profit() {
        let snap = aggregate(&[straight("b", 10.0, 2.5, Won, 1)]).unwrap();
        assert_relative_eq!(snap.net_profit, 15.0, epsilon = 1e-9);
        assert_relative_eq!(snap.roi, 1.5, epsilon = 1e-9);
        assert_relative_eq!(snap.win_rate, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn mixed_ledger_totals() {
        let snap = aggregate(&sample_ledger()).unwrap();
        assert_eq!(snap.total_bets, 7);
        assert_eq!(snap.settled_bets, 6);
        assert_eq!(snap.pending_bets, 1);
        assert_eq!((snap.wins, snap.losses, snap.pushes), (3, 1, 2));
        assert_relative_eq!(snap.win_rate, 0.75, epsilon = 1e-9);

        // +15 − 20 + 18 + 9
        assert_relative_eq!(snap.net_profit, 22.0, epsilon = 1e-9);
        assert_relative_eq!(snap.total_staked, 55.0, epsilon = 1e-9);
        assert_relative_eq!(snap.roi, 22.0 / 55.0, epsilon = 1e-9);
        assert_relative_eq!(snap.average_stake, 55.0 / 4.0, epsilon = 1e-9);
        assert_relative_eq!(snap.average_decimal_odds, (2.5 + 1.8 + 2.2 + 1.9) / 4.0, epsilon = 1e-9);
    }

    #[test]
    fn streaks_skip_push_and_void() {
        let snap = aggregate(&sample_ledger()).unwrap();
        // W L (P) W W (V) → current +2, longest win 2, longest loss 1
        assert_eq!(snap.current_streak, 2);
        assert_eq!(snap.longest_win_streak, 2);
        assert_eq!(snap.longest_loss_streak, 1);
    }

    #[test]
    fn losing_run_is_negative() {
        let bets = vec![
            straight("a", 10.0, 2.0, Won, 1),
            straight("b", 10.0, 2.0, Lost, 2),
            straight("c", 10.0, 2.0, Push, 3),
            straight("d", 10.0, 2.0, Lost, 4),
            straight("e", 10.0, 2.0, Lost, 5),
        ];
        let snap = aggregate(&bets).unwrap();
        assert_eq!(snap.current_streak, -3);
        assert_eq!(snap.longest_loss_streak, 3);
        assert_eq!(snap.longest_win_streak, 1);
    }

    #[test]
    fn totals_ignore_order_but_streaks_do_not() {
        let forward = sample_ledger();
        let mut reordered = forward.clone();
        // pending V L W P W W
        reordered.swap(1, 4);
        reordered.reverse();

        let a = aggregate(&forward).unwrap();
        let b = aggregate(&reordered).unwrap();

        assert_relative_eq!(a.roi, b.roi, epsilon = 1e-9);
        assert_relative_eq!(a.win_rate, b.win_rate, epsilon = 1e-9);
        assert_relative_eq!(a.net_profit, b.net_profit, epsilon = 1e-9);
        assert_eq!(a.period, b.period);

        assert_ne!(
            (a.current_streak, a.longest_win_streak),
            (b.current_streak, b.longest_win_streak)
        );
    }

    #[test]
    fn roi_is_zero_when_only_refunds() {
        let bets = vec![
            straight("a", 10.0, 2.0, Push, 1),
            straight("b", 10.0, 2.0, Void, 2),
        ];
        let snap = aggregate(&bets).unwrap();
        assert_eq!(snap.roi, 0.0);
        assert_eq!(snap.win_rate, 0.0);
        assert_eq!(snap.settled_bets, 2);
        assert_eq!(snap.net_profit, 0.0);
    }

    #[test]
    fn clv_averages_only_bets_with_a_close() {
        let mut beat = straight("a", 10.0, 2.0, Won, 1);
        beat.closing_odds = Some(Odds::decimal(1.91).unwrap());
        let mut lagged = straight("b", 10.0, 2.0, Lost, 2);
        lagged.closing_odds = Some(Odds::decimal(2.1).unwrap());
        let no_close = straight("c", 10.0, 2.0, Won, 3);

        let single = aggregate(&[beat.clone()]).unwrap();
        assert_relative_eq!(single.average_clv.unwrap(), 0.0236, epsilon = 1e-4);

        let snap = aggregate(&[beat, lagged, no_close]).unwrap();
        assert_eq!(snap.clv_samples, 2);
        let expected = ((1.0 / 1.91 - 0.5) + (1.0 / 2.1 - 0.5)) / 2.0;
        assert_relative_eq!(snap.average_clv.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn voided_bet_with_a_close_counts_toward_clv() {
        let mut voided = straight("v", 10.0, 2.0, Void, 1);
        voided.closing_odds = Some(Odds::decimal(1.91).unwrap());
        let snap = aggregate(&[voided]).unwrap();
        assert_eq!(snap.clv_samples, 1);
        assert_relative_eq!(snap.average_clv.unwrap(), 1.0 / 1.91 - 0.5, epsilon = 1e-12);
        assert_eq!(snap.net_profit, 0.0);
    }

    #[test]
    fn parlays_settle_at_compounded_odds() {
        let ticket = parlay("p", 10.0, &[(1.5, Won), (2.0, Push), (1.8, Won)], Won);
        let snap = aggregate(&[ticket]).unwrap();
        assert_relative_eq!(snap.net_profit, 10.0 * 1.5 * 1.8 - 10.0, epsilon = 1e-9);
        assert_eq!(snap.wins, 1);
    }

    #[test]
    fn malformed_bet_rejects_whole_batch() {
        let mut bets = sample_ledger();
        bets[3].stake = 0.0;
        match aggregate(&bets) {
            Err(EngineError::InvalidBet { bet_id, .. }) => assert_eq!(bet_id, "b4"),
            other => panic!("Expected InvalidBet, got {:?}", other),
        }
    }

    #[test]
    fn observed_period_spans_settlements() {
        let snap = aggregate(&sample_ledger()).unwrap();
        let period = snap.period.unwrap();
        assert_eq!(period.start, sample_ledger()[0].settled_at);
        assert_eq!(period.end, sample_ledger()[5].settled_at);
    }
}
