use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::odds::Odds;

/// Settlement state of a bet or a parlay leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Push,
    Void,
}

impl BetStatus {
    pub fn is_settled(self) -> bool {
        self != BetStatus::Pending
    }

    /// Won or Lost: the outcomes that move money and count toward win rate.
    pub fn is_graded(self) -> bool {
        matches!(self, BetStatus::Won | BetStatus::Lost)
    }

    /// Push or Void: the stake comes back untouched.
    pub fn is_refunded(self) -> bool {
        matches!(self, BetStatus::Push | BetStatus::Void)
    }
}

/// One selection inside a parlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub odds: Odds,
    pub status: BetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
}

/// A logged wager, as handed over by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    /// Opaque identifier, unique within a ledger
    pub id: String,
    /// Sport or league tag, e.g. "NBA"
    pub sport: String,
    /// Amount risked, in currency units
    pub stake: f64,
    /// Price taken at placement.  For a parlay, the quoted ticket price.
    pub odds: Odds,
    pub status: BetStatus,
    pub placed_at: DateTime<Utc>,
    /// Present iff `status` is not Pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
    /// Market price at close, used for closing-line value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_odds: Option<Odds>,
    /// Parlay legs in ticket order; `None` for a straight bet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs: Option<Vec<Leg>>,
}

impl Bet {
    pub fn is_parlay(&self) -> bool {
        self.legs.is_some()
    }

    /// Timestamp used for calendar grouping: settlement time, or placement
    /// time while the bet is still open.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.settled_at.unwrap_or(self.placed_at)
    }
}

/// Inclusive time window; an open end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        DateRange {
            start: Some(start),
            end: None,
        }
    }

    pub fn until(end: DateTime<Utc>) -> Self {
        DateRange {
            start: None,
            end: Some(end),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Noon UTC on the given day of January 2024.
    pub fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, n, 12, 0, 0).unwrap()
    }

    pub fn straight(id: &str, stake: f64, decimal: f64, status: BetStatus, settled_day: u32) -> Bet {
        Bet {
            id: id.into(),
            sport: "NBA".into(),
            stake,
            odds: Odds::decimal(decimal).unwrap(),
            status,
            placed_at: day(settled_day) - Duration::hours(6),
            settled_at: status.is_settled().then(|| day(settled_day)),
            closing_odds: None,
            legs: None,
        }
    }

    pub fn pending(id: &str, stake: f64, decimal: f64, placed_day: u32) -> Bet {
        let mut bet = straight(id, stake, decimal, BetStatus::Pending, placed_day);
        bet.placed_at = day(placed_day);
        bet
    }

    pub fn parlay(id: &str, stake: f64, legs: &[(f64, BetStatus)], status: BetStatus) -> Bet {
        let quoted: f64 = legs.iter().map(|(d, _)| d).product();
        let mut bet = straight(id, stake, quoted, status, 10);
        bet.legs = Some(
            legs.iter()
                .map(|(d, s)| Leg {
                    odds: Odds::decimal(*d).unwrap(),
                    status: *s,
                    selection: None,
                })
                .collect(),
        );
        bet
    }
}
