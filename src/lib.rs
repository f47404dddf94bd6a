#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # Queuescope
//!
//! Queuescope is the background collection core of a message-queue cluster
//! dashboard: it polls broker and topic throughput over the cluster admin
//! API, keeps today's series in expiring in-memory stores, and persists
//! merged daily snapshots to disk as JSON.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with defaults (admin API on 127.0.0.1:8080, snapshots in ./data)
//! $ ./queuescope
//!
//! # Point at a different cluster and data directory
//! $ ./queuescope --admin-endpoint http://mq-admin:8080 --data-dir /var/lib/queuescope
//!
//! # Write a commented example config
//! $ ./queuescope --generate-config > queuescope.toml
//! ```
//!
//! ## Architecture
//!
//! - [`collect`]: the poller cycles, system-topic filtering, and schedules
//! - [`metrics`]: expiring series store, sample model, decimal rounding
//! - [`snapshot`]: daily snapshot merge, rollover, and file writing
//! - [`admin`]: the cluster admin API collaborator trait and HTTP client
//! - [`config`]: CLI arguments, TOML config file, and merged settings
//! - [`error`]: error types and Result alias
//!
//! ## Configuration
//!
//! Key options (via CLI args, environment variables, or config file):
//!
//! | Option | Env Variable | Default | Description |
//! |--------|--------------|---------|-------------|
//! | `--admin-endpoint` | `QUEUESCOPE_ADMIN_ENDPOINT` | `http://127.0.0.1:8080` | Cluster admin API |
//! | `--data-dir` | `QUEUESCOPE_DATA_DIR` | `./data` | Snapshot directory |
//! | `--topic-workers` | `QUEUESCOPE_TOPIC_WORKERS` | `10` | Per-topic collection workers |
//! | `--stats-retries` | `QUEUESCOPE_STATS_RETRIES` | `3` | Attempts per broker stats fetch |
//!
//! See [`CollectorArgs`] for the complete list of options.

pub mod admin;
pub mod collect;
pub mod config;
pub mod error;
pub mod metrics;
pub mod snapshot;

pub use admin::{AdminClient, AdminConfig, ClusterInfo, HttpAdminClient};
pub use collect::{
    BrokerCollector, Collector, CycleSummary, GroupRefresher, SystemTopicRegistry, TopicCollector,
};
pub use config::{CollectorArgs, CollectorConfig, ConfigFile};
pub use error::{CollectError, Result};
pub use metrics::{MetricStore, MetricStoreConfig, Sample, Series};
pub use snapshot::SnapshotService;
