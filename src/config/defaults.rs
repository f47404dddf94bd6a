//! Default constants for queuescope configuration
//!
//! These constants define the default values used throughout the configuration
//! system when no explicit value is provided.

/// Default collection enabled state
pub const DEFAULT_COLLECT_ENABLED: bool = true;

/// Default data directory for daily snapshot files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default base URL of the cluster admin API
pub const DEFAULT_ADMIN_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Default request timeout for admin calls in seconds
pub const DEFAULT_ADMIN_TIMEOUT_SECS: u64 = 10;

/// Default number of concurrent per-topic collection workers
pub const DEFAULT_TOPIC_WORKERS: usize = 10;

/// Default number of attempts when fetching broker runtime stats
pub const DEFAULT_STATS_RETRIES: u32 = 3;

/// Default pause between runtime-stats retry attempts in milliseconds
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

/// Default idle expiry for in-memory series in seconds (1 day)
pub const DEFAULT_STORE_IDLE_SECS: u64 = 24 * 60 * 60;

/// Default maximum number of series held per store
pub const DEFAULT_STORE_MAX_SERIES: usize = 1000;

/// Broker and topic cycles both run once per minute
pub const COLLECT_INTERVAL_SECS: u64 = 60;

/// Broker cycles fire at second :00 of each minute
pub const BROKER_OFFSET_SECS: u64 = 0;

/// Topic cycles fire at second :30, offset from the broker cycle
pub const TOPIC_OFFSET_SECS: u64 = 30;

/// Snapshot files are rewritten every 5 seconds
pub const PERSIST_INTERVAL_SECS: u64 = 5;

/// Consumer group list refreshes daily at this local hour
pub const GROUP_REFRESH_HOUR: u32 = 2;

/// Minute of the hour for the daily consumer group refresh
pub const GROUP_REFRESH_MINUTE: u32 = 0;
