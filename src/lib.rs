//! Odds conversion, vig removal, bet valuation and betting-ledger
//! statistics.
//!
//! Everything is reached through [`Reporter`]; the odds and ledger types
//! are the vocabulary it speaks.

pub mod error;
pub mod ledger;
pub mod odds;
pub mod report;

mod engine;

pub use engine::{CacheKey, Grouping, ParlaySettlement, StatisticsSnapshot, SummaryCache, Valuation};
pub use error::{EngineError, Result};
pub use ledger::{Bet, BetStatus, DateRange, Leg};
pub use odds::{FairMarket, FairOutcome, Odds, OddsFormat, OddsValue, OutcomeSet};
pub use report::{CandidateEvaluation, MarketQuote, OddsConversion, ReportConfig, Reporter};
