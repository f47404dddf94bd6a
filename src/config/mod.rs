//! Configuration module for queuescope
//!
//! This module is organized into submodules for better maintainability:
//! - `defaults` - Default constants and values
//! - `args` - CLI argument definitions
//! - `file` - TOML configuration file support
//! - `merge` - File/CLI merging

mod args;
mod defaults;
pub mod file;
mod merge;

// Re-export submodule types
pub use args::CollectorArgs;
pub use defaults::*;
pub use file::ConfigFile;
pub use merge::merge_config_with_args;

use std::path::PathBuf;
use std::time::Duration;

use crate::admin::AdminConfig;
use crate::error::{CollectError, Result};
use crate::metrics::MetricStoreConfig;

/// Complete configuration for the queuescope collector.
///
/// # Configuration Sources
///
/// Configuration is loaded from multiple sources with this precedence:
/// 1. **Environment variables** (highest priority) - `QUEUESCOPE_*` prefix
/// 2. **CLI arguments** - Command-line flags
/// 3. **Config file** - TOML configuration file
/// 4. **Built-in defaults** (lowest priority)
///
/// The polling and persistence schedules themselves are fixed (see the
/// constants in this module); configuration covers where data lands, how
/// the admin API is reached, and how much memory the in-process stores may
/// hold.
///
/// # Generating Example Config
///
/// ```bash
/// queuescope --generate-config > queuescope.toml
/// ```
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Whether the broker and topic polling cycles run at all
    pub enabled: bool,

    /// Directory for daily snapshot files
    pub data_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Admin API connection settings
    pub admin: AdminConfig,

    /// In-memory store sizing
    pub store: MetricStoreConfig,

    /// Concurrent per-topic collection workers
    pub topic_workers: usize,

    /// Attempts per broker when fetching runtime stats
    pub stats_retries: u32,

    /// Pause between runtime-stats retry attempts
    pub retry_backoff: Duration,
}

impl CollectorConfig {
    /// Create a new collector configuration from command-line arguments
    pub fn from_args(args: CollectorArgs) -> Result<Self> {
        if args.admin_endpoint.trim().is_empty() {
            return Err(CollectError::Config(
                "admin endpoint must not be empty".to_string(),
            ));
        }

        Ok(Self {
            enabled: args.collect_enabled,
            data_dir: args.data_dir,
            log_level: args.log_level,
            admin: AdminConfig {
                endpoint: args.admin_endpoint,
                timeout: Duration::from_secs(args.admin_timeout_secs),
            },
            store: MetricStoreConfig {
                idle_ttl: Duration::from_secs(args.store_idle_secs),
                max_series: args.store_max_series,
            },
            topic_workers: args.topic_workers,
            stats_retries: args.stats_retries,
            retry_backoff: Duration::from_millis(args.retry_backoff_ms),
        })
    }

    /// Validate the configuration for consistency and correctness
    ///
    /// Call this method after loading configuration to catch issues early.
    pub fn validate(&self) -> Result<()> {
        use tracing::warn;

        if self.data_dir.as_os_str().is_empty() {
            return Err(CollectError::Config(
                "data_dir must not be empty".to_string(),
            ));
        }

        if !self.admin.endpoint.starts_with("http://")
            && !self.admin.endpoint.starts_with("https://")
        {
            return Err(CollectError::Config(format!(
                "admin endpoint '{}' must start with http:// or https://",
                self.admin.endpoint
            )));
        }

        if self.admin.timeout.is_zero() {
            return Err(CollectError::Config(
                "admin timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.topic_workers == 0 {
            return Err(CollectError::Config(
                "topic_workers must be greater than 0".to_string(),
            ));
        }

        if self.stats_retries == 0 {
            return Err(CollectError::Config(
                "stats_retries must be greater than 0".to_string(),
            ));
        }

        if self.store.max_series == 0 {
            return Err(CollectError::Config(
                "store max_series must be greater than 0".to_string(),
            ));
        }

        // A full retry sequence must fit inside one collection interval,
        // otherwise cycles stack up behind a dead broker.
        let worst_case = self.retry_backoff.as_secs() * u64::from(self.stats_retries);
        if worst_case >= COLLECT_INTERVAL_SECS {
            return Err(CollectError::Config(format!(
                "stats_retries x retry_backoff_ms ({}s) exceeds the {}s collection interval",
                worst_case, COLLECT_INTERVAL_SECS
            )));
        }

        if self.store.idle_ttl < Duration::from_secs(COLLECT_INTERVAL_SECS) {
            warn!(
                "store idle_secs {}s is below the collection interval - series may expire \
                 between polls and lose history",
                self.store.idle_ttl.as_secs()
            );
        }

        if !self.enabled {
            warn!(
                "collection is disabled; only the daily consumer group refresh will run \
                 and no snapshot files will be written"
            );
        }

        Ok(())
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_COLLECT_ENABLED,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            admin: AdminConfig::default(),
            store: MetricStoreConfig::default(),
            topic_workers: DEFAULT_TOPIC_WORKERS,
            stats_retries: DEFAULT_STATS_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}
