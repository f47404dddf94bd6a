//! Command-line arguments for the queuescope collector
//!
//! This module defines the CLI arguments structure using clap.

use clap::Parser;
use std::path::PathBuf;

use super::defaults::*;

/// Command-line arguments for the queuescope collector
#[derive(Parser, Debug, Clone)]
#[command(name = "queuescope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Background metric collector for message-queue cluster dashboards")]
pub struct CollectorArgs {
    /// Path to configuration file (TOML format)
    /// If not specified, looks for queuescope.toml in current directory,
    /// /etc/queuescope/, or ~/.config/queuescope/
    #[arg(short, long, env = "QUEUESCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Generate example configuration file and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Enable the broker and topic polling cycles.
    /// When disabled the collector still refreshes the consumer group list
    /// but records and persists no throughput data.
    #[arg(long, env = "QUEUESCOPE_COLLECT_ENABLED", default_value_t = DEFAULT_COLLECT_ENABLED)]
    pub collect_enabled: bool,

    /// Directory for daily snapshot files
    #[arg(long, env = "QUEUESCOPE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "QUEUESCOPE_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Base URL of the cluster admin API
    #[arg(long, env = "QUEUESCOPE_ADMIN_ENDPOINT", default_value = DEFAULT_ADMIN_ENDPOINT)]
    pub admin_endpoint: String,

    /// Request timeout for admin calls in seconds
    #[arg(long, env = "QUEUESCOPE_ADMIN_TIMEOUT_SECS", default_value_t = DEFAULT_ADMIN_TIMEOUT_SECS)]
    pub admin_timeout_secs: u64,

    /// Number of per-topic collection units allowed to run at once
    #[arg(long, env = "QUEUESCOPE_TOPIC_WORKERS", default_value_t = DEFAULT_TOPIC_WORKERS)]
    pub topic_workers: usize,

    /// Attempts per broker when fetching runtime stats before the broker
    /// is skipped for the cycle
    #[arg(long, env = "QUEUESCOPE_STATS_RETRIES", default_value_t = DEFAULT_STATS_RETRIES)]
    pub stats_retries: u32,

    /// Pause between runtime-stats retry attempts in milliseconds
    #[arg(long, env = "QUEUESCOPE_RETRY_BACKOFF_MS", default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Idle expiry for in-memory series in seconds.
    /// Series not read or written for this long are dropped from memory;
    /// snapshot files are unaffected.
    #[arg(long, env = "QUEUESCOPE_STORE_IDLE_SECS", default_value_t = DEFAULT_STORE_IDLE_SECS)]
    pub store_idle_secs: u64,

    /// Maximum number of series held per in-memory store
    #[arg(long, env = "QUEUESCOPE_STORE_MAX_SERIES", default_value_t = DEFAULT_STORE_MAX_SERIES)]
    pub store_max_series: usize,
}
