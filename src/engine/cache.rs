//! Memoized summaries, keyed by a digest of the input.
//!
//! The cache is owned by the caller and shared by cloning the handle.  It
//! is never consulted implicitly: a caller opts in through
//! `Reporter::summarize_cached` and decides when entries go stale.

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::stats::StatisticsSnapshot;
use crate::error::Result;
use crate::ledger::{Bet, DateRange};

/// SHA-256 over the JSON-encoded bet sequence plus every parameter that
/// shapes the snapshot.  Reordering the bets changes the key, since streaks
/// depend on order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn compute(bets: &[Bet], range: Option<&DateRange>, unit_size: Option<f64>) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(bets)?);
        hasher.update(serde_json::to_vec(&range)?);
        hasher.update(serde_json::to_vec(&unit_size)?);
        Ok(CacheKey(hasher.finalize().into()))
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Eight bytes are plenty to tell keys apart in logs
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Thread-safe snapshot cache.
#[derive(Clone, Default)]
pub struct SummaryCache {
    inner: Arc<RwLock<HashMap<CacheKey, StatisticsSnapshot>>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<StatisticsSnapshot> {
        let hit = self.inner.read().get(key).cloned();
        debug!(?key, hit = hit.is_some(), "SummaryCache lookup");
        hit
    }

    pub fn insert(&self, key: CacheKey, snapshot: StatisticsSnapshot) {
        self.inner.write().insert(key, snapshot);
    }

    /// Drop one entry.  Returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.inner.write().remove(key).is_some();
        debug!(?key, removed, "SummaryCache invalidate");
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        debug!(entries = inner.len(), "SummaryCache cleared");
        inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
