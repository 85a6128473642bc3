//! Ledger of known deposit transactions
//!
//! Durable record of every notified deposit and its consumption state.
//! Rows are inserted once, consumed at most once, and never deleted.
//!
//! Mutations (`ingest`, `consume`) must run inside the single-writer actor
//! turn; the duplicate check and the conditional status transition rely on
//! it for atomicity against concurrent callers.

use crate::{
    error::{Error, Result},
    storage::Storage,
    types::{Transaction, TransactionId, TransactionStatus},
};
use chrono::Utc;
use std::sync::Arc;

/// Durable set of all known transactions and their consumption state
#[derive(Clone)]
pub struct Ledger {
    storage: Arc<Storage>,
}

impl Ledger {
    /// Create ledger over shared storage
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Record a newly notified deposit as an open transaction.
    ///
    /// A second ingest for the same id fails with
    /// [`Error::DuplicateTransaction`] and leaves the original row untouched,
    /// so re-delivered notifications are safe.
    pub fn ingest(&self, id: TransactionId, amount: u64) -> Result<()> {
        self.validate(&id, amount)?;

        if self.storage.get_transaction(&id)?.is_some() {
            tracing::warn!(transaction_id = %id, "Duplicate notification ignored");
            return Err(Error::DuplicateTransaction(id.to_string()));
        }

        let tx = Transaction {
            id: id.clone(),
            amount,
            status: TransactionStatus::Unused,
            created_at: Utc::now(),
        };
        self.storage.put_transaction(&tx)?;

        tracing::info!(transaction_id = %id, amount, "Deposit recorded");

        Ok(())
    }

    /// Find an open transaction matching the claimed identifier and amount.
    ///
    /// Wrong amount, already consumed, and unknown id all yield `None`; the
    /// caller cannot tell which condition failed, so a guessing claimant
    /// learns nothing about which identifiers exist.
    pub fn lookup(&self, id: &TransactionId, amount: u64) -> Result<Option<Transaction>> {
        Ok(self
            .storage
            .get_transaction(id)?
            .filter(|tx| tx.amount == amount && tx.is_unused()))
    }

    /// Transition a transaction from `Unused` to `Used`.
    ///
    /// Fails with [`Error::AlreadyConsumed`] when an earlier claim won the
    /// transaction, [`Error::TransactionNotFound`] when the id is unknown.
    pub fn consume(&self, id: &TransactionId) -> Result<()> {
        let mut tx = self
            .storage
            .get_transaction(id)?
            .ok_or_else(|| Error::TransactionNotFound(id.to_string()))?;

        if !tx.is_unused() {
            return Err(Error::AlreadyConsumed(id.to_string()));
        }

        tx.status = TransactionStatus::Used;
        self.storage.put_transaction(&tx)?;

        tracing::debug!(transaction_id = %id, "Transaction consumed");

        Ok(())
    }

    /// Validate notification preconditions
    fn validate(&self, id: &TransactionId, amount: u64) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidDeposit(
                "Transaction id must be non-empty".to_string(),
            ));
        }

        if amount == 0 {
            return Err(Error::InvalidDeposit(
                "Amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
