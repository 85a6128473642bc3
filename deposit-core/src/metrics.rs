//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the reconciler.
//!
//! # Metrics
//!
//! - `deposit_ingested_total` - Deposits recorded from notifications
//! - `deposit_duplicate_notifications_total` - Re-delivered notifications rejected
//! - `deposit_claims_accepted_total` - Claims that consumed a transaction
//! - `deposit_claims_rejected_total` - Claims charged as failures
//! - `deposit_claims_blocked_total` - Claims refused over quota
//! - `deposit_claims_malformed_total` - Claim texts that failed to parse
//! - `deposit_verify_duration_seconds` - Histogram of verify latencies
//!
//! Collectors live on a crate-owned [`Registry`] rather than the process
//! default, so an embedding service can construct and scrape several
//! instances without name collisions.

use crate::types::Verdict;
use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Deposits recorded
    pub ingested_total: IntCounter,

    /// Duplicate notifications rejected
    pub duplicate_total: IntCounter,

    /// Claims accepted
    pub accepted_total: IntCounter,

    /// Claims rejected
    pub rejected_total: IntCounter,

    /// Claims blocked
    pub blocked_total: IntCounter,

    /// Malformed claim texts
    pub malformed_total: IntCounter,

    /// Verify latency histogram
    pub verify_duration: Histogram,

    /// Prometheus registry
    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let ingested_total = IntCounter::with_opts(Opts::new(
            "deposit_ingested_total",
            "Deposits recorded from notifications",
        ))?;
        registry.register(Box::new(ingested_total.clone()))?;

        let duplicate_total = IntCounter::with_opts(Opts::new(
            "deposit_duplicate_notifications_total",
            "Re-delivered notifications rejected",
        ))?;
        registry.register(Box::new(duplicate_total.clone()))?;

        let accepted_total = IntCounter::with_opts(Opts::new(
            "deposit_claims_accepted_total",
            "Claims that consumed a transaction",
        ))?;
        registry.register(Box::new(accepted_total.clone()))?;

        let rejected_total = IntCounter::with_opts(Opts::new(
            "deposit_claims_rejected_total",
            "Claims charged as failures",
        ))?;
        registry.register(Box::new(rejected_total.clone()))?;

        let blocked_total = IntCounter::with_opts(Opts::new(
            "deposit_claims_blocked_total",
            "Claims refused because the claimant is over quota",
        ))?;
        registry.register(Box::new(blocked_total.clone()))?;

        let malformed_total = IntCounter::with_opts(Opts::new(
            "deposit_claims_malformed_total",
            "Claim texts that failed to parse",
        ))?;
        registry.register(Box::new(malformed_total.clone()))?;

        let verify_duration = Histogram::with_opts(
            HistogramOpts::new(
                "deposit_verify_duration_seconds",
                "Histogram of verify latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
        )?;
        registry.register(Box::new(verify_duration.clone()))?;

        Ok(Self {
            ingested_total,
            duplicate_total,
            accepted_total,
            rejected_total,
            blocked_total,
            malformed_total,
            verify_duration,
            registry,
        })
    }

    /// Record a recorded deposit
    pub fn record_ingested(&self) {
        self.ingested_total.inc();
    }

    /// Record a rejected duplicate notification
    pub fn record_duplicate(&self) {
        self.duplicate_total.inc();
    }

    /// Record a claim verdict
    pub fn record_verdict(&self, verdict: Verdict) {
        match verdict {
            Verdict::Accepted => self.accepted_total.inc(),
            Verdict::Rejected => self.rejected_total.inc(),
            Verdict::Blocked => self.blocked_total.inc(),
        }
    }

    /// Record a malformed claim text
    pub fn record_malformed(&self) {
        self.malformed_total.inc();
    }

    /// Record verify latency
    pub fn record_verify_duration(&self, duration_seconds: f64) {
        self.verify_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
