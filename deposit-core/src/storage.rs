//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `transactions` - deposit rows (key: transaction id bytes)
//! - `attempts` - per-claimant failure counters (key: claimant id bytes)
//!
//! Rows are bincode-encoded. Point reads are atomic per key; all writes go
//! through the single-writer actor (see `actor`), so no row-level locking
//! lives here.

use crate::{
    config::Config,
    error::{Error, Result},
    types::{AttemptCounter, ClaimantId, Transaction, TransactionId},
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DBCompactionStyle, Options, DB};
use std::sync::Arc;

/// Column family names
const CF_TRANSACTIONS: &str = "transactions";
const CF_ATTEMPTS: &str = "attempts";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
    // Column family handles are stored in DB, accessed by name
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);
        db_opts.set_level_zero_file_num_compaction_trigger(
            config.rocksdb.level0_file_num_compaction_trigger,
        );

        // Universal compaction for write-heavy workload
        db_opts.set_compaction_style(DBCompactionStyle::Universal);

        // Enable statistics
        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Self::cf_options_transactions()),
            ColumnFamilyDescriptor::new(CF_ATTEMPTS, Self::cf_options_attempts()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_transactions() -> Options {
        let mut opts = Options::default();
        // Transaction rows are read by point lookup on every claim
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false); // 10 bits per key
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn cf_options_attempts() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Transaction operations

    /// Get transaction row by id
    pub fn get_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;

        match self.db.get_cf(cf, id.as_str().as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Put transaction row (insert or overwrite)
    pub fn put_transaction(&self, tx: &Transaction) -> Result<()> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;
        let value = bincode::serialize(tx)?;

        self.db.put_cf(cf, tx.id.as_str().as_bytes(), &value)?;

        tracing::debug!(
            transaction_id = %tx.id,
            status = ?tx.status,
            "Transaction row written"
        );

        Ok(())
    }

    // Attempt counter operations

    /// Get attempt counter by claimant id
    pub fn get_counter(&self, claimant: &ClaimantId) -> Result<Option<AttemptCounter>> {
        let cf = self.cf_handle(CF_ATTEMPTS)?;

        match self.db.get_cf(cf, claimant.as_str().as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Put attempt counter (insert or overwrite)
    pub fn put_counter(&self, counter: &AttemptCounter) -> Result<()> {
        let cf = self.cf_handle(CF_ATTEMPTS)?;
        let value = bincode::serialize(counter)?;

        self.db
            .put_cf(cf, counter.claimant_id.as_str().as_bytes(), &value)?;

        Ok(())
    }

    // Statistics

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;
        let cf_attempts = self.cf_handle(CF_ATTEMPTS)?;

        Ok(StorageStats {
            total_transactions: self.approximate_count(cf_transactions)?,
            total_claimants: self.approximate_count(cf_attempts)?,
        })
    }

    fn approximate_count(&self, cf: &ColumnFamily) -> Result<u64> {
        // RocksDB property for approximate count
        let prop = self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);

        Ok(prop)
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// Approximate number of recorded transactions
    pub total_transactions: u64,

    /// Approximate number of claimants with a counter
    pub total_claimants: u64,
}
