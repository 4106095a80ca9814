use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use betledger::{DateRange, Grouping, ReportConfig};

/// Odds and betting-ledger statistics
#[derive(Parser, Debug, Clone)]
#[command(name = "betledger", version, about)]
pub struct Config {
    /// Fractional Kelly multiplier for suggested stakes (0.0–1.0)
    #[arg(long, global = true, env = "KELLY_FRACTION", default_value = "0.25")]
    pub kelly_fraction: f64,

    /// Currency value of one betting unit; reports profit in units when set
    #[arg(long, global = true, env = "UNIT_SIZE")]
    pub unit_size: Option<f64>,

    /// Bankroll used to turn Kelly fractions into stakes
    #[arg(long, global = true, env = "BANKROLL")]
    pub bankroll: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Summarise a JSON array of bets
    Summary {
        /// Path to the bets file
        #[arg(long)]
        input: PathBuf,

        /// Only count bets settled at or after this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        from: Option<DateTime<Utc>>,

        /// Only count bets settled at or before this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_end_timestamp)]
        to: Option<DateTime<Utc>>,

        /// Also break the summary down by this key
        #[arg(long, value_enum)]
        group_by: Option<GroupBy>,
    },

    /// Value a candidate bet, optionally against the market it comes from
    Evaluate {
        /// Path to the candidate JSON
        #[arg(long)]
        input: PathBuf,
    },

    /// Show one price in every odds format
    Convert {
        /// e.g. "+150", "-110", "2.50" or "3/2"
        #[arg(allow_hyphen_values = true)]
        odds: String,
    },
}

/// Command-line spelling of a breakdown key.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Sport,
    Day,
    /// Weeks start on Sunday
    Week,
    Month,
}

impl From<GroupBy> for Grouping {
    fn from(group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Sport => Grouping::Sport,
            GroupBy::Day => Grouping::Day,
            GroupBy::Week => Grouping::Week,
            GroupBy::Month => Grouping::Month,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.kelly_fraction) {
            anyhow::bail!("kelly_fraction must be between 0.0 and 1.0");
        }
        if matches!(self.unit_size, Some(u) if u <= 0.0) {
            anyhow::bail!("unit_size must be positive");
        }
        if matches!(self.bankroll, Some(b) if b <= 0.0) {
            anyhow::bail!("bankroll must be positive");
        }
        if let Command::Summary {
            from: Some(from),
            to: Some(to),
            ..
        } = &self.command
        {
            if from > to {
                anyhow::bail!("--from ({}) is after --to ({})", from, to);
            }
        }
        Ok(())
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            kelly_fraction: self.kelly_fraction,
            unit_size: self.unit_size,
            bankroll: self.bankroll,
        }
    }
}

/// Settlement window for a summary, if either bound was given.
pub fn date_range(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<DateRange> {
    (from.is_some() || to.is_some()).then_some(DateRange {
        start: from,
        end: to,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    parse_with_default_time(s, 0, 0, 0)
}

/// A bare date as an upper bound covers the whole day.
fn parse_end_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    parse_with_default_time(s, 23, 59, 59)
}

fn parse_with_default_time(s: &str, h: u32, m: u32, sec: u32) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(h, m, sec))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date", s))
}
