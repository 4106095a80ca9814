use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything the engine can reject.  All variants except `Encoding` are
/// caused by the caller's input and map to a 4xx-style response.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid odds: {reason}")]
    InvalidOdds { reason: String },

    #[error("vig removal needs at least 2 outcomes, got {found}")]
    InsufficientOutcomes { found: usize },

    #[error("invalid bet '{bet_id}': {reason}")]
    InvalidBet { bet_id: String, reason: String },

    #[error("selection {index} is out of range for a market with {outcomes} outcomes")]
    SelectionOutOfRange { index: usize, outcomes: usize },

    #[error("invalid value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to encode bets for hashing: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invalid_odds(reason: impl Into<String>) -> Self {
        EngineError::InvalidOdds {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_bet(bet_id: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidBet {
            bet_id: bet_id.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the error was caused by malformed input rather than an
    /// internal fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Encoding(_))
    }
}
