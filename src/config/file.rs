//! Configuration file support for queuescope
//!
//! This module provides TOML configuration file parsing and merging with CLI arguments.
//!
//! ## Priority Order
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! ## Example Configuration
//!
//! ```toml
//! # queuescope.toml
//!
//! [collector]
//! enabled = true
//! data_dir = "/var/lib/queuescope"
//! log_level = "info"
//! topic_workers = 10
//!
//! [admin]
//! endpoint = "http://127.0.0.1:8080"
//! timeout_secs = 10
//! stats_retries = 3
//! retry_backoff_ms = 1000
//!
//! [store]
//! idle_secs = 86400
//! max_series = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CollectError, Result};

/// Root configuration structure for TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Collector configuration
    pub collector: CollectorSection,

    /// Admin API configuration
    pub admin: AdminSection,

    /// In-memory store configuration
    pub store: StoreSection,
}

/// Collector section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSection {
    /// Enable broker and topic polling
    pub enabled: Option<bool>,

    /// Directory for daily snapshot files
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,

    /// Concurrent per-topic collection workers
    pub topic_workers: Option<usize>,
}

/// Admin API section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    /// Base URL of the cluster admin API
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Attempts per broker when fetching runtime stats
    pub stats_retries: Option<u32>,

    /// Pause between retry attempts in milliseconds
    pub retry_backoff_ms: Option<u64>,
}

/// In-memory store section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Idle expiry for series in seconds
    pub idle_secs: Option<u64>,

    /// Maximum number of series held per store
    pub max_series: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CollectError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            CollectError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Try to load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./queuescope.toml
    /// 2. /etc/queuescope/queuescope.toml
    /// 3. ~/.config/queuescope/queuescope.toml
    pub fn load_default() -> Option<Self> {
        let default_paths = [
            PathBuf::from("queuescope.toml"),
            PathBuf::from("/etc/queuescope/queuescope.toml"),
            dirs::config_dir()
                .map(|p| p.join("queuescope/queuescope.toml"))
                .unwrap_or_default(),
        ];

        for path in default_paths.iter().filter(|p| !p.as_os_str().is_empty()) {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {:?}", path);
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        None
    }

    /// Generate an example configuration file
    pub fn generate_example() -> String {
        r#"# Queuescope Configuration File
# Copy to queuescope.toml and customize as needed
#
# Configuration priority (highest to lowest):
# 1. Command-line arguments
# 2. Environment variables
# 3. This configuration file
# 4. Default values

[collector]
# Enable the broker and topic polling cycles.
# When disabled the collector still refreshes the consumer group list
# but records and persists no throughput data.
enabled = true

# Directory for daily snapshot files
data_dir = "./data"

# Log level (trace, debug, info, warn, error)
log_level = "info"

# Number of per-topic collection units allowed to run at once
topic_workers = 10

[admin]
# Base URL of the cluster admin API
endpoint = "http://127.0.0.1:8080"

# Request timeout for admin calls in seconds
timeout_secs = 10

# Attempts per broker when fetching runtime stats before the broker
# is skipped for the cycle
stats_retries = 3

# Pause between runtime-stats retry attempts in milliseconds
retry_backoff_ms = 1000

[store]
# Idle expiry for in-memory series in seconds.
# Series not read or written for this long are dropped from memory;
# snapshot files are unaffected.
idle_secs = 86400

# Maximum number of series held per in-memory store
max_series = 1000
"#
        .to_string()
    }
}
