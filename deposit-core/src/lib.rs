//! Deposit Reconciliation Core
//!
//! Reconciles two independent, asynchronous event streams (inbound payment
//! notifications and user-submitted claims) to decide whether a claimed
//! deposit is genuine, unused, and matches the claimed amount, while
//! resisting brute-force guessing of transaction identifiers.
//!
//! # Architecture
//!
//! - **Ledger**: durable record of every notified transaction, consumable
//!   exactly once
//! - **Attempt Tracker**: per-claimant failure counters enforcing a guess
//!   budget
//! - **Claim Verifier**: three-way decision (accepted / rejected / blocked)
//! - **Single Writer**: one actor task serializes all mutations, making each
//!   decision atomic against concurrent callers
//!
//! Transport adapters (the HTTP notification listener and the chat bot) stay
//! outside this crate; they hand in extracted values and raw claim text, and
//! map verdicts to user-facing replies.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! # Invariants
//!
//! - One row per transaction id, first writer wins
//! - `Unused -> Used` exactly once, only through an accepted claim
//! - Failure counts only increase; a blocked claimant never touches the
//!   ledger and is not charged further

pub mod actor;
pub mod attempts;
pub mod claim;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod reconciler;
pub mod storage;
pub mod types;
pub mod verifier;

// Re-exports
pub use attempts::AttemptTracker;
pub use claim::Claim;
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use reconciler::Reconciler;
pub use storage::Storage;
pub use types::{
    AttemptCounter, ClaimantId, Transaction, TransactionId, TransactionStatus, Verdict,
};
pub use verifier::ClaimVerifier;
