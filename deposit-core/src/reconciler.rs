//! Main reconciliation orchestration layer
//!
//! This module ties together storage, the ledger, the attempt tracker and
//! the claim verifier into a high-level API for the transport adapters.
//!
//! # Example
//!
//! ```no_run
//! use deposit_core::{ClaimantId, Config, Reconciler, TransactionId};
//!
//! #[tokio::main]
//! async fn main() -> deposit_core::Result<()> {
//!     let reconciler = Reconciler::open(Config::default()).await?;
//!
//!     // Notification adapter feeds extracted values:
//!     reconciler.ingest(TransactionId::new("843512"), 500).await?;
//!
//!     // Claim adapter feeds raw chat text:
//!     let verdict = reconciler
//!         .verify_claim_text(ClaimantId::new("chat-42"), "843512, 500")
//!         .await?;
//!     println!("{verdict}");
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_reconciler_actor, ReconcilerHandle},
    attempts::AttemptTracker,
    claim::Claim,
    config::Config,
    error::{Error, Result},
    ledger::Ledger,
    metrics::Metrics,
    storage::{Storage, StorageStats},
    types::{ClaimantId, Transaction, TransactionId, Verdict},
    verifier::ClaimVerifier,
};
use std::sync::Arc;
use std::time::Instant;

/// Main reconciler interface
pub struct Reconciler {
    /// Actor handle for mutations
    handle: ReconcilerHandle,

    /// Attempt tracker (for operator reads)
    attempts: AttemptTracker,

    /// Direct storage access (for reads)
    storage: Arc<Storage>,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Reconciler {
    /// Open reconciler with configuration
    pub async fn open(config: Config) -> Result<Self> {
        // Open storage
        let storage = Arc::new(Storage::open(&config)?);

        // Wire components over shared storage
        let ledger = Ledger::new(storage.clone());
        let attempts = AttemptTracker::new(storage.clone(), config.attempts.block_threshold);
        let verifier = ClaimVerifier::new(ledger.clone(), attempts.clone());

        // Spawn single-writer actor
        let handle = spawn_reconciler_actor(ledger, verifier);

        let metrics = Metrics::new()?;

        Ok(Self {
            handle,
            attempts,
            storage,
            metrics,
            config,
        })
    }

    /// Record a deposit notification.
    ///
    /// The notification adapter calls this after extracting `id` and
    /// `amount` from the raw text. Re-delivery of the same notification
    /// fails with [`Error::DuplicateTransaction`] and changes nothing.
    pub async fn ingest(&self, id: TransactionId, amount: u64) -> Result<()> {
        match self.handle.ingest(id, amount).await {
            Ok(()) => {
                self.metrics.record_ingested();
                Ok(())
            }
            Err(Error::DuplicateTransaction(id)) => {
                self.metrics.record_duplicate();
                Err(Error::DuplicateTransaction(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluate a claim against the ledger and the claimant's quota
    pub async fn verify(
        &self,
        claimant: ClaimantId,
        id: TransactionId,
        amount: u64,
    ) -> Result<Verdict> {
        let started = Instant::now();

        let verdict = self.handle.verify(claimant, id, amount).await?;

        self.metrics.record_verdict(verdict);
        self.metrics
            .record_verify_duration(started.elapsed().as_secs_f64());

        Ok(verdict)
    }

    /// Parse raw claim text and evaluate the claim.
    ///
    /// Malformed text surfaces as [`Error::MalformedClaim`] without touching
    /// the store: no attempt is charged for a format error.
    pub async fn verify_claim_text(&self, claimant: ClaimantId, text: &str) -> Result<Verdict> {
        let claim = match Claim::parse(text) {
            Ok(claim) => claim,
            Err(e) => {
                self.metrics.record_malformed();
                return Err(e);
            }
        };

        self.verify(claimant, claim.transaction_id, claim.amount)
            .await
    }

    /// Current failure count for a claimant, 0 if unseen
    pub fn failure_count(&self, claimant: &ClaimantId) -> Result<u32> {
        self.attempts.failure_count(claimant)
    }

    /// Raw transaction row by id (operator read, bypasses claim gating)
    pub fn transaction(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        self.storage.get_transaction(id)
    }

    /// Storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        self.storage.stats()
    }

    /// Metrics collector (for scraping/export by the embedding service)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration this reconciler was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shutdown reconciler
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_reconciler() -> (Reconciler, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        (Reconciler::open(config).await.unwrap(), temp_dir)
    }

    #[tokio::test]
    async fn test_claim_race_on_consumed_transaction() {
        let (reconciler, _temp) = create_test_reconciler().await;

        reconciler
            .ingest(TransactionId::new("TX1"), 500)
            .await
            .unwrap();

        let first = reconciler
            .verify(ClaimantId::new("u1"), TransactionId::new("TX1"), 500)
            .await
            .unwrap();
        assert_eq!(first, Verdict::Accepted);

        // Same correct values immediately after: the transaction is spent
        let second = reconciler
            .verify(ClaimantId::new("u2"), TransactionId::new("TX1"), 500)
            .await
            .unwrap();
        assert_eq!(second, Verdict::Rejected);
        assert_eq!(
            reconciler.failure_count(&ClaimantId::new("u2")).unwrap(),
            1
        );

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_quota_exhaustion() {
        let (reconciler, _temp) = create_test_reconciler().await;
        let claimant = ClaimantId::new("u1");

        for expected in 1..=10 {
            let verdict = reconciler
                .verify(claimant.clone(), TransactionId::new("TX2"), 100)
                .await
                .unwrap();
            assert_eq!(verdict, Verdict::Rejected);
            assert_eq!(reconciler.failure_count(&claimant).unwrap(), expected);
        }

        let eleventh = reconciler
            .verify(claimant.clone(), TransactionId::new("TX2"), 100)
            .await
            .unwrap();
        assert_eq!(eleventh, Verdict::Blocked);
        assert_eq!(reconciler.failure_count(&claimant).unwrap(), 10);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_amount_then_correct() {
        let (reconciler, _temp) = create_test_reconciler().await;
        let claimant = ClaimantId::new("u1");

        reconciler
            .ingest(TransactionId::new("TX3"), 200)
            .await
            .unwrap();

        let wrong = reconciler
            .verify(claimant.clone(), TransactionId::new("TX3"), 999)
            .await
            .unwrap();
        assert_eq!(wrong, Verdict::Rejected);

        let correct = reconciler
            .verify(claimant, TransactionId::new("TX3"), 200)
            .await
            .unwrap();
        assert_eq!(correct, Verdict::Accepted);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_notification_is_inert() {
        let (reconciler, _temp) = create_test_reconciler().await;
        let id = TransactionId::new("TX4");

        reconciler.ingest(id.clone(), 50).await.unwrap();
        let first_row = reconciler.transaction(&id).unwrap().unwrap();

        let result = reconciler.ingest(id.clone(), 50).await;
        assert!(matches!(result, Err(Error::DuplicateTransaction(_))));

        let row = reconciler.transaction(&id).unwrap().unwrap();
        assert_eq!(row, first_row);
        assert_eq!(row.amount, 50);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_claim_charges_nothing() {
        let (reconciler, _temp) = create_test_reconciler().await;
        let claimant = ClaimantId::new("u1");

        let result = reconciler
            .verify_claim_text(claimant.clone(), "not a claim")
            .await;
        assert!(matches!(result, Err(Error::MalformedClaim(_))));

        assert_eq!(reconciler.failure_count(&claimant).unwrap(), 0);
        assert_eq!(reconciler.metrics().malformed_total.get(), 1);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_claim_text_round_trip() {
        let (reconciler, _temp) = create_test_reconciler().await;

        reconciler
            .ingest(TransactionId::new("843512"), 500)
            .await
            .unwrap();

        let verdict = reconciler
            .verify_claim_text(ClaimantId::new("u1"), "843512, 500")
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Accepted);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_blocked_claim_leaves_counter_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        config.attempts.block_threshold = 2;
        let reconciler = Reconciler::open(config).await.unwrap();
        let claimant = ClaimantId::new("u1");

        for _ in 0..2 {
            reconciler
                .verify(claimant.clone(), TransactionId::new("TX9"), 100)
                .await
                .unwrap();
        }
        let counter = reconciler.storage.get_counter(&claimant).unwrap().unwrap();

        let verdict = reconciler
            .verify(claimant.clone(), TransactionId::new("TX9"), 100)
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Blocked);

        let after = reconciler.storage.get_counter(&claimant).unwrap().unwrap();
        assert_eq!(after, counter);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_metrics_follow_outcomes() {
        let (reconciler, _temp) = create_test_reconciler().await;

        reconciler
            .ingest(TransactionId::new("TX5"), 75)
            .await
            .unwrap();
        let _ = reconciler.ingest(TransactionId::new("TX5"), 75).await;

        reconciler
            .verify(ClaimantId::new("u1"), TransactionId::new("TX5"), 75)
            .await
            .unwrap();
        reconciler
            .verify(ClaimantId::new("u1"), TransactionId::new("TX5"), 75)
            .await
            .unwrap();

        let metrics = reconciler.metrics();
        assert_eq!(metrics.ingested_total.get(), 1);
        assert_eq!(metrics.duplicate_total.get(), 1);
        assert_eq!(metrics.accepted_total.get(), 1);
        assert_eq!(metrics.rejected_total.get(), 1);

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_counts_rows() {
        let (reconciler, _temp) = create_test_reconciler().await;

        reconciler
            .ingest(TransactionId::new("TX6"), 10)
            .await
            .unwrap();
        reconciler
            .ingest(TransactionId::new("TX7"), 20)
            .await
            .unwrap();

        let stats = reconciler.stats().unwrap();
        assert_eq!(stats.total_transactions, 2);

        reconciler.shutdown().await.unwrap();
    }
}
