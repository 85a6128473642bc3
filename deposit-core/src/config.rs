//! Configuration for the reconciliation core

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// RocksDB configuration
    pub rocksdb: RocksDbConfig,

    /// Attempt-quota configuration
    pub attempts: AttemptConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/deposits"),
            service_name: "deposit-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            rocksdb: RocksDbConfig::default(),
            attempts: AttemptConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Target file size (MB)
    pub target_file_size_mb: u64,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,

    /// Level 0 file num compaction trigger
    pub level0_file_num_compaction_trigger: i32,

    /// Enable statistics
    pub enable_statistics: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,       // 64 MB
            max_write_buffer_number: 4,
            target_file_size_mb: 64,        // 64 MB
            max_background_jobs: 2,
            level0_file_num_compaction_trigger: 4,
            enable_statistics: false,
        }
    }
}

/// Attempt-quota configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptConfig {
    /// Failed claims allowed before a claimant is blocked
    pub block_threshold: u32,
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            block_threshold: 10,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("DEPOSIT_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(threshold) = std::env::var("DEPOSIT_BLOCK_THRESHOLD") {
            config.attempts.block_threshold = threshold.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid DEPOSIT_BLOCK_THRESHOLD: {}", e))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "deposit-core");
        assert_eq!(config.attempts.block_threshold, 10);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.attempts.block_threshold, config.attempts.block_threshold);
    }
}
