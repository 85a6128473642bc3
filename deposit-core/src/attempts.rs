//! Per-claimant failed-claim accounting
//!
//! Each claimant accumulates failures toward a block threshold. Counters are
//! durable, created lazily on first failure, and never reset or expire.

use crate::{
    error::Result,
    storage::Storage,
    types::{AttemptCounter, ClaimantId},
};
use chrono::Utc;
use std::sync::Arc;

/// Tracks failed claims per claimant and enforces the guess budget
#[derive(Clone)]
pub struct AttemptTracker {
    storage: Arc<Storage>,
    block_threshold: u32,
}

impl AttemptTracker {
    /// Create tracker over shared storage
    pub fn new(storage: Arc<Storage>, block_threshold: u32) -> Self {
        Self {
            storage,
            block_threshold,
        }
    }

    /// Current failure count for a claimant, 0 if unseen
    pub fn failure_count(&self, claimant: &ClaimantId) -> Result<u32> {
        Ok(self
            .storage
            .get_counter(claimant)?
            .map(|c| c.failure_count)
            .unwrap_or(0))
    }

    /// Whether the claimant has exhausted the failure quota
    pub fn is_blocked(&self, claimant: &ClaimantId) -> Result<bool> {
        Ok(self.failure_count(claimant)? >= self.block_threshold)
    }

    /// Charge one failed attempt to a claimant.
    ///
    /// Creates the counter on first failure. Must not be called for a
    /// blocked claimant; the verifier checks [`Self::is_blocked`] first, so
    /// blocked attempts never reach this and the count stays at the
    /// threshold. Runs inside the single-writer actor turn, which makes the
    /// read-increment-write atomic across concurrent claims.
    pub fn record_failure(&self, claimant: &ClaimantId) -> Result<u32> {
        let now = Utc::now();

        let mut counter = self
            .storage
            .get_counter(claimant)?
            .unwrap_or_else(|| AttemptCounter::new(claimant.clone(), now));

        counter.failure_count += 1;
        counter.last_attempt_at = now;
        self.storage.put_counter(&counter)?;

        if counter.failure_count >= self.block_threshold {
            tracing::warn!(
                claimant_id = %claimant,
                failures = counter.failure_count,
                "Claimant reached the failure quota"
            );
        }

        Ok(counter.failure_count)
    }
}
