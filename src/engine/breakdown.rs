use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stats::{aggregate, StatisticsSnapshot};
use crate::error::Result;
use crate::ledger::Bet;

/// How to split a ledger for per-group statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    Sport,
    Day,
    /// Weeks start on Sunday
    Week,
    Month,
}

impl Grouping {
    fn key(self, bet: &Bet) -> String {
        let date = bet.reference_time().date_naive();
        match self {
            Grouping::Sport => bet.sport.clone(),
            Grouping::Day => date.format("%Y-%m-%d").to_string(),
            Grouping::Week => {
                let offset = date.weekday().num_days_from_sunday() as i64;
                (date - Duration::days(offset)).format("%Y-%m-%d").to_string()
            }
            Grouping::Month => date.format("%Y-%m").to_string(),
        }
    }
}

/// Aggregate each group separately.  Bets keep their relative order inside
/// a group, so per-group streaks stay meaningful.
pub(crate) fn group_by<'a, I>(
    bets: I,
    grouping: Grouping,
) -> Result<BTreeMap<String, StatisticsSnapshot>>
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut groups: BTreeMap<String, Vec<&Bet>> = BTreeMap::new();
    for bet in bets {
        groups.entry(grouping.key(bet)).or_default().push(bet);
    }

    groups
        .into_iter()
        .map(|(key, members)| Ok((key, aggregate(members)?)))
        .collect()
}
