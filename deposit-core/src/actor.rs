//! Actor-based concurrency for the reconciliation core
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One logical writer task eliminates race conditions
//! - Every message is processed as one atomic turn
//! - Async message passing with backpressure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │   Notification adapter        Claim adapter          │
//! │   (HTTP listener)             (chat bot)             │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │             ReconcilerHandle (Clone)                  │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │            ReconcilerActor (Single Task)              │
//! │                                                       │
//! │   Ingest  → Ledger::ingest    (duplicate check)       │
//! │   Verify  → ClaimVerifier::verify                     │
//! │             (quota check, lookup + consume,           │
//! │              failure increment)                       │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! Because the actor processes one message at a time, a verify evaluation
//! is linearizable end to end: two concurrent claims on the same open
//! transaction produce exactly one `Accepted`, and two concurrent claims by
//! the same claimant can never lose a failure increment or overshoot the
//! block threshold.

use crate::{
    error::{Error, Result},
    ledger::Ledger,
    types::{ClaimantId, TransactionId, Verdict},
    verifier::ClaimVerifier,
};
use tokio::sync::{mpsc, oneshot};

/// Message sent to the reconciler actor
pub enum ReconcilerMessage {
    /// Record a notified deposit
    Ingest {
        /// Transaction identifier from the notification
        id: TransactionId,
        /// Amount from the notification (minor currency unit)
        amount: u64,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Evaluate a claim
    Verify {
        /// Claimant identity
        claimant: ClaimantId,
        /// Claimed transaction identifier
        id: TransactionId,
        /// Claimed amount
        amount: u64,
        /// Reply channel
        response: oneshot::Sender<Result<Verdict>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes reconciler messages
pub struct ReconcilerActor {
    /// Ledger for ingest
    ledger: Ledger,

    /// Verifier for claims
    verifier: ClaimVerifier,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<ReconcilerMessage>,
}

impl ReconcilerActor {
    /// Create new actor
    pub fn new(
        ledger: Ledger,
        verifier: ClaimVerifier,
        mailbox: mpsc::Receiver<ReconcilerMessage>,
    ) -> Self {
        Self {
            ledger,
            verifier,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                ReconcilerMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }

        tracing::debug!("Reconciler actor stopped");
    }

    /// Handle a single message as one atomic turn
    fn handle_message(&mut self, msg: ReconcilerMessage) {
        match msg {
            ReconcilerMessage::Ingest {
                id,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.ingest(id, amount));
            }

            ReconcilerMessage::Verify {
                claimant,
                id,
                amount,
                response,
            } => {
                let _ = response.send(self.verifier.verify(&claimant, &id, amount));
            }

            ReconcilerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct ReconcilerHandle {
    sender: mpsc::Sender<ReconcilerMessage>,
}

impl ReconcilerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<ReconcilerMessage>) -> Self {
        Self { sender }
    }

    /// Record a notified deposit
    pub async fn ingest(&self, id: TransactionId, amount: u64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ReconcilerMessage::Ingest {
                id,
                amount,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Evaluate a claim
    pub async fn verify(
        &self,
        claimant: ClaimantId,
        id: TransactionId,
        amount: u64,
    ) -> Result<Verdict> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ReconcilerMessage::Verify {
                claimant,
                id,
                amount,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(ReconcilerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the reconciler actor
pub fn spawn_reconciler_actor(ledger: Ledger, verifier: ClaimVerifier) -> ReconcilerHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = ReconcilerActor::new(ledger, verifier, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    ReconcilerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attempts::AttemptTracker, config::Config, storage::Storage};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn spawn_test_actor() -> (ReconcilerHandle, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        let storage = Arc::new(Storage::open(&config).unwrap());

        let ledger = Ledger::new(storage.clone());
        let attempts = AttemptTracker::new(storage, config.attempts.block_threshold);
        let verifier = ClaimVerifier::new(ledger.clone(), attempts);
        (spawn_reconciler_actor(ledger, verifier), temp_dir)
    }

    #[tokio::test]
    async fn test_ingest_and_verify_through_handle() {
        let (handle, _temp) = spawn_test_actor();
        let id = TransactionId::new("843512");

        handle.ingest(id.clone(), 500).await.unwrap();

        let verdict = handle
            .verify(ClaimantId::new("chat-1"), id, 500)
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Accepted);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_ingest_surfaces_error() {
        let (handle, _temp) = spawn_test_actor();
        let id = TransactionId::new("843512");

        handle.ingest(id.clone(), 50).await.unwrap();

        let result = handle.ingest(id, 50).await;
        assert!(matches!(result, Err(Error::DuplicateTransaction(_))));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_after_shutdown_errors() {
        let (handle, _temp) = spawn_test_actor();
        handle.shutdown().await.unwrap();

        // Give the actor a moment to drain and drop the mailbox
        tokio::task::yield_now().await;

        let result = handle.ingest(TransactionId::new("843512"), 500).await;
        assert!(matches!(result, Err(Error::Concurrency(_))));
    }
}
