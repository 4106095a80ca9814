//! Bookmaker margin removal.
//!
//! The implied probabilities of every outcome in one market sum to more than
//! 1; the excess is the bookmaker's margin (vig).  Normalising each implied
//! probability by that sum gives the "fair" probabilities:
//!
//!   overround = Σ 1/dᵢ
//!   margin    = overround − 1
//!   fair(i)   = (1/dᵢ) / overround

use serde::{Deserialize, Serialize};

use super::convert::from_implied_probability;
use super::{Odds, OddsFormat};
use crate::error::{EngineError, Result};

/// Two or more mutually exclusive prices quoted for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Odds>", into = "Vec<Odds>")]
pub struct OutcomeSet {
    outcomes: Vec<Odds>,
}

impl OutcomeSet {
    pub fn new(outcomes: Vec<Odds>) -> Result<Self> {
        if outcomes.len() < 2 {
            return Err(EngineError::InsufficientOutcomes {
                found: outcomes.len(),
            });
        }
        Ok(OutcomeSet { outcomes })
    }

    pub fn outcomes(&self) -> &[Odds] {
        &self.outcomes
    }
}

impl TryFrom<Vec<Odds>> for OutcomeSet {
    type Error = EngineError;

    fn try_from(outcomes: Vec<Odds>) -> Result<Self> {
        OutcomeSet::new(outcomes)
    }
}

impl From<OutcomeSet> for Vec<Odds> {
    fn from(set: OutcomeSet) -> Self {
        set.outcomes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairOutcome {
    /// The quoted price, as supplied.
    pub odds: Odds,
    pub implied_probability: f64,
    pub fair_probability: f64,
    /// The no-vig price, in the same format as `odds` when that format can
    /// express it, otherwise decimal.  Absent when the fair probability
    /// rounds to 1, since no price pays out on a certainty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_odds: Option<Odds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairMarket {
    /// One entry per quoted outcome, in input order.
    pub outcomes: Vec<FairOutcome>,
    /// Sum of the implied probabilities.
    pub overround: f64,
    /// `overround − 1`.  Negative when the prices leave an arbitrage.
    pub margin: f64,
}

impl FairMarket {
    pub fn fair_probability(&self, index: usize) -> Option<f64> {
        self.outcomes.get(index).map(|o| o.fair_probability)
    }
}

/// Strip the margin from a market.  `OutcomeSet` guarantees at least two
/// prices, so the overround is always a sum over a real market.
pub(crate) fn remove_vig(set: &OutcomeSet) -> FairMarket {
    let implied: Vec<f64> = set
        .outcomes
        .iter()
        .map(|o| o.implied_probability())
        .collect();
    let overround: f64 = implied.iter().sum();

    let outcomes = set
        .outcomes
        .iter()
        .zip(implied)
        .map(|(odds, implied_probability)| {
            let fair_probability = implied_probability / overround;
            FairOutcome {
                odds: *odds,
                implied_probability,
                fair_probability,
                fair_odds: fair_price(fair_probability, odds.format()),
            }
        })
        .collect();

    FairMarket {
        outcomes,
        overround,
        margin: overround - 1.0,
    }
}

fn fair_price(p: f64, format: OddsFormat) -> Option<Odds> {
    from_implied_probability(p, format)
        .or_else(|_| from_implied_probability(p, OddsFormat::Decimal))
        .ok()
}
