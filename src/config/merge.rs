//! Configuration merging utilities
//!
//! This module provides functions to merge configuration from files
//! with command-line arguments, where CLI arguments take precedence.

use super::args::CollectorArgs;
use super::file::ConfigFile;
use super::*;

/// Merge configuration file values with CLI arguments.
/// CLI arguments take precedence over config file values.
/// Only applies config file values where CLI uses defaults.
pub fn merge_config_with_args(mut args: CollectorArgs, config: &ConfigFile) -> CollectorArgs {
    // Helper macro to apply config value if CLI is at default
    macro_rules! apply_if_default {
        ($field:ident, $config_val:expr, $default:expr) => {
            if let Some(val) = $config_val {
                if args.$field == $default {
                    args.$field = val;
                }
            }
        };
    }

    macro_rules! apply_if_default_string {
        ($field:ident, $config_val:expr, $default:expr) => {
            if let Some(ref val) = $config_val {
                if args.$field == $default {
                    args.$field = val.clone();
                }
            }
        };
    }

    // Collector section
    apply_if_default!(
        collect_enabled,
        config.collector.enabled,
        DEFAULT_COLLECT_ENABLED
    );
    if let Some(ref path) = config.collector.data_dir {
        if args.data_dir == std::path::Path::new(DEFAULT_DATA_DIR) {
            args.data_dir = path.clone();
        }
    }
    apply_if_default_string!(log_level, config.collector.log_level, DEFAULT_LOG_LEVEL);
    apply_if_default!(
        topic_workers,
        config.collector.topic_workers,
        DEFAULT_TOPIC_WORKERS
    );

    // Admin section
    apply_if_default_string!(admin_endpoint, config.admin.endpoint, DEFAULT_ADMIN_ENDPOINT);
    apply_if_default!(
        admin_timeout_secs,
        config.admin.timeout_secs,
        DEFAULT_ADMIN_TIMEOUT_SECS
    );
    apply_if_default!(
        stats_retries,
        config.admin.stats_retries,
        DEFAULT_STATS_RETRIES
    );
    apply_if_default!(
        retry_backoff_ms,
        config.admin.retry_backoff_ms,
        DEFAULT_RETRY_BACKOFF_MS
    );

    // Store section
    apply_if_default!(store_idle_secs, config.store.idle_secs, DEFAULT_STORE_IDLE_SECS);
    apply_if_default!(
        store_max_series,
        config.store.max_series,
        DEFAULT_STORE_MAX_SERIES
    );

    args
}
