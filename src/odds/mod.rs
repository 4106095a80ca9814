//! Odds representations.
//!
//! An [`Odds`] value is one of three formats, validated on construction:
//! - **American**: signed integer, `>= +100` or `<= -100`
//! - **Decimal**: finite multiplier `> 1.0` (the canonical internal form)
//! - **Fractional**: positive `numerator/denominator` profit-to-stake ratio
//!
//! Deserialisation goes through the same constructors, so an `Odds` that
//! exists is always valid.

pub(crate) mod convert;
pub(crate) mod vig;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};

pub use vig::{FairMarket, FairOutcome, OutcomeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddsFormat {
    American,
    Decimal,
    Fractional,
}

/// Raw tagged form of an odds value, as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum OddsValue {
    American { value: i32 },
    Decimal { value: f64 },
    Fractional { numerator: u32, denominator: u32 },
}

/// Validated betting odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OddsValue", into = "OddsValue")]
pub struct Odds(OddsValue);

impl Odds {
    pub fn american(value: i32) -> Result<Self> {
        if value > -100 && value < 100 {
            return Err(EngineError::invalid_odds(format!(
                "American odds must be <= -100 or >= +100, got {}",
                value
            )));
        }
        Ok(Odds(OddsValue::American { value }))
    }

    pub fn decimal(value: f64) -> Result<Self> {
        convert::validate_decimal(value)?;
        Ok(Odds(OddsValue::Decimal { value }))
    }

    /// Fractional odds need not be in lowest terms; `Display` reduces them.
    pub fn fractional(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 {
            return Err(EngineError::invalid_odds(
                "fractional numerator must be positive",
            ));
        }
        if denominator == 0 {
            return Err(EngineError::invalid_odds(
                "fractional denominator must be positive",
            ));
        }
        Ok(Odds(OddsValue::Fractional {
            numerator,
            denominator,
        }))
    }

    pub fn value(&self) -> OddsValue {
        self.0
    }

    pub fn format(&self) -> OddsFormat {
        match self.0 {
            OddsValue::American { .. } => OddsFormat::American,
            OddsValue::Decimal { .. } => OddsFormat::Decimal,
            OddsValue::Fractional { .. } => OddsFormat::Fractional,
        }
    }

    pub fn to_decimal(&self) -> f64 {
        convert::to_decimal(self)
    }

    /// Probability encoded by the price before margin removal, in (0, 1).
    pub fn implied_probability(&self) -> f64 {
        convert::implied_probability(self)
    }
}

impl TryFrom<OddsValue> for Odds {
    type Error = EngineError;

    fn try_from(value: OddsValue) -> Result<Self> {
        match value {
            OddsValue::American { value } => Odds::american(value),
            OddsValue::Decimal { value } => Odds::decimal(value),
            OddsValue::Fractional {
                numerator,
                denominator,
            } => Odds::fractional(numerator, denominator),
        }
    }
}

impl From<Odds> for OddsValue {
    fn from(odds: Odds) -> Self {
        odds.0
    }
}

/// Parses odds as typed by a user or read off a bet slip:
/// `"5/2"` is fractional, `"+150"` / `"-110"` are American, anything else
/// (`"2.50"`) is decimal.
impl FromStr for Odds {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EngineError::invalid_odds("empty odds string"));
        }

        if let Some((num, den)) = s.split_once('/') {
            let numerator = parse_fraction_part(num)?;
            let denominator = parse_fraction_part(den)?;
            return Odds::fractional(numerator, denominator);
        }

        if s.starts_with('+') || s.starts_with('-') {
            let value = s.parse::<i32>().map_err(|_| {
                EngineError::invalid_odds(format!("American odds '{}' must be a whole number", s))
            })?;
            return Odds::american(value);
        }

        let value = s
            .parse::<f64>()
            .map_err(|_| EngineError::invalid_odds(format!("'{}' is not a number", s)))?;
        Odds::decimal(value)
    }
}

fn parse_fraction_part(part: &str) -> Result<u32> {
    let part = part.trim();
    part.parse::<u32>().map_err(|_| {
        EngineError::invalid_odds(format!(
            "fractional part '{}' must be a positive integer",
            part
        ))
    })
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            OddsValue::American { value } if value > 0 => write!(f, "+{}", value),
            OddsValue::American { value } => write!(f, "{}", value),
            // Two places unless that would lose precision
            OddsValue::Decimal { value } => {
                let short = format!("{:.2}", value);
                if short.parse::<f64>() == Ok(value) {
                    f.write_str(&short)
                } else {
                    write!(f, "{}", value)
                }
            }
            OddsValue::Fractional {
                numerator,
                denominator,
            } => {
                let (numerator, denominator) = convert::reduce(numerator, denominator);
                write!(f, "{}/{}", numerator, denominator)
            }
        }
    }
}
