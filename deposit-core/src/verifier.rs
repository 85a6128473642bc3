//! Claim verification decision engine
//!
//! Single-step decision over the ledger and the attempt tracker:
//!
//! ```text
//! Start ──► Blocked    claimant over quota, ledger never consulted
//!       ──► Accepted   open transaction matched and consumed
//!       ──► Rejected   no match (or lost consume race), one failure charged
//! ```
//!
//! The quota check runs first and unconditionally: a blocked claimant never
//! touches the ledger, which closes a timing side channel and keeps hot
//! transaction rows out of contention.

use crate::{
    attempts::AttemptTracker,
    error::{Error, Result},
    ledger::Ledger,
    types::{ClaimantId, TransactionId, Verdict},
};

/// Stateful decision engine producing a [`Verdict`] per claim
#[derive(Clone)]
pub struct ClaimVerifier {
    ledger: Ledger,
    attempts: AttemptTracker,
}

impl ClaimVerifier {
    /// Create verifier over the ledger and attempt tracker
    pub fn new(ledger: Ledger, attempts: AttemptTracker) -> Self {
        Self { ledger, attempts }
    }

    /// Evaluate a claim.
    ///
    /// Runs inside the single-writer actor turn, so the lookup-consume pair
    /// and the failure increment are atomic against concurrent claims. The
    /// failure budget is charged only for substantively wrong guesses;
    /// being blocked does not itself consume an attempt.
    pub fn verify(
        &self,
        claimant: &ClaimantId,
        id: &TransactionId,
        amount: u64,
    ) -> Result<Verdict> {
        if self.attempts.is_blocked(claimant)? {
            tracing::debug!(claimant_id = %claimant, "Claim refused, claimant over quota");
            return Ok(Verdict::Blocked);
        }

        if self.ledger.lookup(id, amount)?.is_some() {
            match self.ledger.consume(id) {
                Ok(()) => {
                    tracing::info!(
                        claimant_id = %claimant,
                        transaction_id = %id,
                        amount,
                        "Claim accepted"
                    );
                    return Ok(Verdict::Accepted);
                }
                // Lost the transaction to a concurrent claim; for this
                // claimant that is an ordinary miss, not an error.
                Err(Error::AlreadyConsumed(_)) | Err(Error::TransactionNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let failures = self.attempts.record_failure(claimant)?;
        tracing::debug!(
            claimant_id = %claimant,
            transaction_id = %id,
            failures,
            "Claim rejected"
        );

        Ok(Verdict::Rejected)
    }
}
