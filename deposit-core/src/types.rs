//! Core types for the deposit reconciliation engine
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (integer minor currency units)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier, supplied by the notification source
///
/// Opaque and globally unique; never generated internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create new transaction ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Claimant identity (one per chat/user)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimantId(String);

impl ClaimantId {
    /// Create new claimant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Consumption state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionStatus {
    /// Deposit recorded, not yet claimed
    Unused = 1,
    /// Deposit claimed (terminal)
    Used = 2,
}

/// A single deposit notification, consumable exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier from the notification source
    pub id: TransactionId,

    /// Deposit amount (minor currency unit)
    pub amount: u64,

    /// Consumption state
    pub status: TransactionStatus,

    /// Insertion timestamp, never modified
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether this transaction is still open for claiming
    pub fn is_unused(&self) -> bool {
        self.status == TransactionStatus::Unused
    }
}

/// Per-claimant failed-claim counter
///
/// Created lazily on a claimant's first failure; the count only increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounter {
    /// Claimant this counter belongs to
    pub claimant_id: ClaimantId,

    /// Number of failed claims so far
    pub failure_count: u32,

    /// Timestamp of the most recent failed claim
    pub last_attempt_at: DateTime<Utc>,
}

impl AttemptCounter {
    /// Create a fresh counter for an unseen claimant
    pub fn new(claimant_id: ClaimantId, now: DateTime<Utc>) -> Self {
        Self {
            claimant_id,
            failure_count: 0,
            last_attempt_at: now,
        }
    }
}

/// Three-way outcome of evaluating a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Verdict {
    /// Claim matched an open transaction, which is now consumed
    Accepted = 1,
    /// Claim did not match, one failure charged to the claimant
    Rejected = 2,
    /// Claimant exceeded the failure quota, ledger not consulted
    Blocked = 3,
}

impl Verdict {
    /// Stable lowercase label (metrics, logs)
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::Rejected => "rejected",
            Verdict::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
