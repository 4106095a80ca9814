pub(crate) mod breakdown;
pub(crate) mod cache;
pub(crate) mod kelly;
pub(crate) mod stats;
pub(crate) mod valuation;

pub use breakdown::Grouping;
pub use cache::{CacheKey, SummaryCache};
pub use stats::StatisticsSnapshot;
pub use valuation::{ParlaySettlement, Valuation};
