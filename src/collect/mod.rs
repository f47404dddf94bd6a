//! Collection cycles and their schedules
//!
//! The [`Collector`] owns the two in-memory stores, the pollers that feed
//! them, and the snapshot service that drains them to disk. Each concern
//! runs as its own periodic task:
//!
//! - broker polling every minute on the minute
//! - topic polling every minute at :30, staggered off the broker cycle
//! - snapshot merge/write every 5 seconds
//! - consumer-group refresh daily at 02:00 local time
//!
//! The poller tasks align to wall-clock offsets the way cron schedules do:
//! an initial sleep lands on the next offset, then a fixed interval keeps
//! the cadence. All loops watch a shared shutdown flag and exit after the
//! tick on which it flips.

pub mod broker;
pub mod consumer;
pub mod system_topics;
pub mod topic;

pub use broker::BrokerCollector;
pub use consumer::GroupRefresher;
pub use system_topics::SystemTopicRegistry;
pub use topic::TopicCollector;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::admin::AdminClient;
use crate::config::{
    CollectorConfig, BROKER_OFFSET_SECS, COLLECT_INTERVAL_SECS, GROUP_REFRESH_HOUR,
    GROUP_REFRESH_MINUTE, PERSIST_INTERVAL_SECS, TOPIC_OFFSET_SECS,
};
use crate::error::Result;
use crate::metrics::MetricStore;
use crate::snapshot::SnapshotService;

/// Outcome counts for one poller cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Series that recorded a sample this cycle.
    pub collected: usize,
    /// Units that failed and were skipped.
    pub failed: usize,
}

/// Owns the stores, pollers, and snapshot service, and runs them on their
/// schedules.
pub struct Collector {
    config: CollectorConfig,
    broker_store: Arc<MetricStore>,
    topic_store: Arc<MetricStore>,
    broker: BrokerCollector,
    topic: TopicCollector,
    groups: GroupRefresher,
    snapshot: SnapshotService,
}

impl Collector {
    pub fn new(config: CollectorConfig, admin: Arc<dyn AdminClient>) -> Self {
        let broker_store = Arc::new(MetricStore::new(config.store.clone()));
        let topic_store = Arc::new(MetricStore::new(config.store.clone()));
        let registry = Arc::new(SystemTopicRegistry::new());

        let broker = BrokerCollector::new(
            admin.clone(),
            broker_store.clone(),
            config.stats_retries,
            config.retry_backoff,
        );
        let topic = TopicCollector::new(
            admin.clone(),
            topic_store.clone(),
            registry,
            config.topic_workers,
        );
        let groups = GroupRefresher::new(admin);
        let snapshot = SnapshotService::new(
            config.data_dir.clone(),
            broker_store.clone(),
            topic_store.clone(),
        );

        Self {
            config,
            broker_store,
            topic_store,
            broker,
            topic,
            groups,
            snapshot,
        }
    }

    /// Spawn every scheduled loop and return their handles.
    ///
    /// With collection disabled only the daily group refresh runs; polling
    /// and persistence stay off entirely.
    pub fn spawn_all(self: Arc<Self>, shutdown: Arc<AtomicBool>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if self.config.enabled {
            handles.push(self.clone().spawn_broker_loop(shutdown.clone()));
            handles.push(self.clone().spawn_topic_loop(shutdown.clone()));
            handles.push(self.clone().spawn_persist_loop(shutdown.clone()));
        } else {
            info!("metric collection disabled, only the daily group refresh will run");
        }
        handles.push(self.spawn_group_refresh_loop(shutdown));
        handles
    }

    /// Write one final snapshot, waiting out any in-flight persist cycle.
    ///
    /// A no-op when collection is disabled, so shutdown never creates
    /// snapshot files that polling was not feeding.
    pub async fn flush(&self) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        self.snapshot.flush().await
    }

    fn spawn_broker_loop(self: Arc<Self>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(delay_until_minute_offset(BROKER_OFFSET_SECS)).await;
            let mut ticker = interval(Duration::from_secs(COLLECT_INTERVAL_SECS));
            loop {
                ticker.tick().await;

                if shutdown.load(Ordering::Relaxed) {
                    break;
                }

                match self.broker.collect_once().await {
                    Ok(summary) => debug!(
                        collected = summary.collected,
                        failed = summary.failed,
                        "broker cycle finished"
                    ),
                    Err(e) => error!(error = %e, "broker collection cycle failed"),
                }
            }
        })
    }

    fn spawn_topic_loop(self: Arc<Self>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(delay_until_minute_offset(TOPIC_OFFSET_SECS)).await;
            let mut ticker = interval(Duration::from_secs(COLLECT_INTERVAL_SECS));
            loop {
                ticker.tick().await;

                if shutdown.load(Ordering::Relaxed) {
                    break;
                }

                match self.topic.collect_once().await {
                    Ok(summary) => debug!(
                        collected = summary.collected,
                        failed = summary.failed,
                        "topic cycle finished"
                    ),
                    Err(e) => error!(error = %e, "topic collection cycle failed"),
                }
            }
        })
    }

    fn spawn_persist_loop(self: Arc<Self>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(PERSIST_INTERVAL_SECS));
            loop {
                ticker.tick().await;

                if shutdown.load(Ordering::Relaxed) {
                    break;
                }

                if let Err(e) = self.snapshot.persist_cycle().await {
                    error!(error = %e, "snapshot persist cycle failed");
                }

                let swept = self.broker_store.sweep_idle() + self.topic_store.sweep_idle();
                if swept > 0 {
                    debug!(series = swept, "expired idle series");
                }
            }
        })
    }

    fn spawn_group_refresh_loop(self: Arc<Self>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                // recomputed every iteration so clock adjustments heal
                let delay = delay_until_daily(GROUP_REFRESH_HOUR, GROUP_REFRESH_MINUTE);
                debug!(delay_secs = delay.as_secs(), "next consumer-group refresh scheduled");
                tokio::time::sleep(delay).await;

                if shutdown.load(Ordering::Relaxed) {
                    break;
                }

                match self.groups.refresh_once().await {
                    Ok(count) => info!(groups = count, "daily consumer-group refresh finished"),
                    Err(e) => error!(error = %e, "consumer-group refresh failed"),
                }
            }
        })
    }
}

/// Sleep length until the next wall-clock `offset_secs` within a minute.
fn delay_until_minute_offset(offset_secs: u64) -> Duration {
    let now = Local::now();
    let into_minute =
        u64::from(now.second()) * 1000 + u64::from(now.timestamp_subsec_millis()).min(999);
    Duration::from_millis(offset_wait_ms(into_minute, offset_secs))
}

/// Milliseconds from `into_minute_ms` within the current minute until the
/// next occurrence of `offset_secs`. Landing exactly on the offset waits a
/// full minute rather than firing twice.
fn offset_wait_ms(into_minute_ms: u64, offset_secs: u64) -> u64 {
    let target_ms = offset_secs * 1000;
    if into_minute_ms < target_ms {
        target_ms - into_minute_ms
    } else {
        60_000 - into_minute_ms + target_ms
    }
}

/// Sleep length until the next local `hour:minute`, today or tomorrow.
///
/// Falls back to a flat 24 hours when the target time does not exist on the
/// local calendar (DST gaps).
fn delay_until_daily(hour: u32, minute: u32) -> Duration {
    const FULL_DAY: Duration = Duration::from_secs(24 * 60 * 60);

    let now = Local::now();
    let today_target = match now.date_naive().and_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => return FULL_DAY,
    };

    let naive_target = if today_target > now.naive_local() {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };

    match naive_target.and_local_timezone(Local).earliest() {
        Some(target) => (target - now).to_std().unwrap_or(FULL_DAY),
        None => FULL_DAY,
    }
}
