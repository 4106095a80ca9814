//! Reporting facade: the one surface callers (API handlers, the CLI, UI
//! view-models) use.  Converters, the vig remover and the aggregator stay
//! behind it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::breakdown::{group_by, Grouping};
use crate::engine::cache::{CacheKey, SummaryCache};
use crate::engine::kelly::{edge, kelly_fraction};
use crate::engine::stats::{aggregate, StatisticsSnapshot};
use crate::engine::valuation::{valuate, Valuation};
use crate::error::{EngineError, Result};
use crate::ledger::{within_range, Bet, DateRange};
use crate::odds::convert::{fractional_view, to_american};
use crate::odds::vig::remove_vig;
use crate::odds::{FairMarket, Odds, OutcomeSet};

/// Tunables for reports and candidate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Fractional Kelly multiplier (0.0–1.0)
    pub kelly_fraction: f64,
    /// Currency value of one betting unit
    pub unit_size: Option<f64>,
    /// Bankroll that Kelly fractions are applied to
    pub bankroll: Option<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            kelly_fraction: 0.25,
            unit_size: None,
            bankroll: None,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.kelly_fraction) {
            return Err(EngineError::InvalidConfig {
                field: "kelly_fraction",
                reason: format!("must be between 0.0 and 1.0, got {}", self.kelly_fraction),
            });
        }
        for (field, value) in [("unit_size", self.unit_size), ("bankroll", self.bankroll)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(EngineError::InvalidConfig {
                        field,
                        reason: format!("must be positive, got {}", v),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A quoted market and the index of the outcome the candidate backs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub outcomes: OutcomeSet,
    pub selection: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub valuation: Valuation,
    /// The de-vigged market, when one was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<FairMarket>,
    /// Expected return per unit staked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<f64>,
    /// Bankroll fraction after the configured Kelly multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelly_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_stake: Option<f64>,
}

/// One price shown in every format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsConversion {
    pub decimal: f64,
    pub american: i32,
    pub fractional: String,
    pub implied_probability: f64,
}

#[derive(Debug, Clone)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Reporter { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    // ── Ledger summaries ──────────────────────────────────────────────────────

    /// Summarise `bets` (in settlement order), optionally restricted to an
    /// inclusive settlement window.  Pending bets are always counted.
    pub fn summarize(&self, bets: &[Bet], range: Option<&DateRange>) -> Result<StatisticsSnapshot> {
        let mut snapshot = match range {
            Some(range) => {
                let mut snapshot = aggregate(within_range(bets, range))?;
                snapshot.period = Some(*range);
                snapshot
            }
            None => aggregate(bets)?,
        };
        self.apply_units(&mut snapshot);
        Ok(snapshot)
    }

    /// `summarize`, memoized in a caller-owned cache.
    pub fn summarize_cached(
        &self,
        cache: &SummaryCache,
        bets: &[Bet],
        range: Option<&DateRange>,
    ) -> Result<StatisticsSnapshot> {
        let key = CacheKey::compute(bets, range, self.config.unit_size)?;
        if let Some(snapshot) = cache.get(&key) {
            return Ok(snapshot);
        }
        let snapshot = self.summarize(bets, range)?;
        cache.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    /// Per-group snapshots, keyed and ordered by group.
    pub fn breakdown(
        &self,
        bets: &[Bet],
        range: Option<&DateRange>,
        grouping: Grouping,
    ) -> Result<BTreeMap<String, StatisticsSnapshot>> {
        let mut groups = match range {
            Some(range) => group_by(within_range(bets, range), grouping)?,
            None => group_by(bets, grouping)?,
        };
        for snapshot in groups.values_mut() {
            self.apply_units(snapshot);
        }
        Ok(groups)
    }

    fn apply_units(&self, snapshot: &mut StatisticsSnapshot) {
        snapshot.net_units = self.config.unit_size.map(|unit| snapshot.net_profit / unit);
    }

    // ── Candidate bets ────────────────────────────────────────────────────────

    /// Value a proposed bet.  When the market it comes from is supplied, the
    /// vig is stripped and the selected outcome's fair probability drives
    /// expected value, edge and Kelly sizing.
    pub fn evaluate_candidate(
        &self,
        bet: &Bet,
        market: Option<&MarketQuote>,
    ) -> Result<CandidateEvaluation> {
        let (fair_probability, fair_market) = match market {
            Some(quote) => {
                let fair = remove_vig(&quote.outcomes);
                let p = fair.fair_probability(quote.selection).ok_or(
                    EngineError::SelectionOutOfRange {
                        index: quote.selection,
                        outcomes: fair.outcomes.len(),
                    },
                )?;
                (Some(p), Some(fair))
            }
            None => (None, None),
        };
        self.evaluate(bet, fair_probability, fair_market)
    }

    /// Value a proposed bet against the caller's own probability estimate.
    pub fn evaluate_with_probability(
        &self,
        bet: &Bet,
        fair_probability: f64,
    ) -> Result<CandidateEvaluation> {
        self.evaluate(bet, Some(fair_probability), None)
    }

    fn evaluate(
        &self,
        bet: &Bet,
        fair_probability: Option<f64>,
        market: Option<FairMarket>,
    ) -> Result<CandidateEvaluation> {
        let valuation = valuate(bet, fair_probability)?;
        let edge = fair_probability.map(|p| edge(p, valuation.decimal_odds));
        let kelly = fair_probability
            .map(|p| kelly_fraction(p, valuation.decimal_odds, self.config.kelly_fraction));
        let suggested_stake = kelly
            .zip(self.config.bankroll)
            .map(|(fraction, bankroll)| fraction * bankroll);

        Ok(CandidateEvaluation {
            valuation,
            market,
            edge,
            kelly_fraction: kelly,
            suggested_stake,
        })
    }

    // ── Odds calculator ───────────────────────────────────────────────────────

    pub fn convert_odds(&self, odds: &Odds) -> Result<OddsConversion> {
        let decimal = odds.to_decimal();
        let american = to_american(decimal)?;
        let (numerator, denominator) = fractional_view(odds)?;
        Ok(OddsConversion {
            decimal,
            american,
            fractional: format!("{}/{}", numerator, denominator),
            implied_probability: odds.implied_probability(),
        })
    }
}
