//! Broker throughput poller
//!
//! Once per minute this poller flattens the cluster topology to a set of
//! broker addresses, pulls each broker's runtime stats table, and records
//! the averaged total TPS as one sample in the broker store. A broker that
//! stays unreachable through the retry budget is skipped for the cycle; the
//! others still record.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::admin::{AdminClient, BrokerRuntimeStats};
use crate::error::{CollectError, Result};
use crate::metrics::{decimal, MetricStore, Sample};

use super::CycleSummary;

/// Polls every broker in the cluster and records averaged throughput.
pub struct BrokerCollector {
    admin: Arc<dyn AdminClient>,
    store: Arc<MetricStore>,
    retries: u32,
    backoff: Duration,
}

impl BrokerCollector {
    pub fn new(
        admin: Arc<dyn AdminClient>,
        store: Arc<MetricStore>,
        retries: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            admin,
            store,
            retries,
            backoff,
        }
    }

    /// Run one broker collection cycle.
    ///
    /// Fails only when the topology itself cannot be fetched; individual
    /// broker failures are logged, counted, and do not stop the cycle.
    /// All samples of a cycle share one timestamp.
    pub async fn collect_once(&self) -> Result<CycleSummary> {
        let info = self.admin.examine_broker_cluster_info().await?;
        let addresses = info.broker_addresses();

        if addresses.is_empty() {
            debug!("no brokers in cluster topology, nothing to collect");
            return Ok(CycleSummary::default());
        }

        let timestamp_ms = Utc::now().timestamp_millis();
        let mut summary = CycleSummary::default();

        for (addr, series_key) in addresses {
            match self.record_broker(&addr, &series_key, timestamp_ms).await {
                Ok(tps) => {
                    debug!(broker = %series_key, tps = %tps, "recorded broker throughput");
                    summary.collected += 1;
                }
                Err(e) => {
                    warn!(
                        broker = %series_key,
                        broker_addr = %addr,
                        error = %e,
                        "skipping broker for this cycle"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn record_broker(&self, addr: &str, series_key: &str, timestamp_ms: i64) -> Result<String> {
        let stats = self.fetch_runtime_stats_with_retry(addr).await?;
        let tps = decimal::average_half_up_5(stats.total_tps()?.split_whitespace())?;
        self.store
            .append(series_key, Sample::new(timestamp_ms, tps.clone()));
        Ok(tps)
    }

    /// Fetch one broker's runtime stats, pausing between attempts.
    ///
    /// The attempt budget and pause are configured; validation guarantees
    /// the whole sequence fits inside a collection interval.
    async fn fetch_runtime_stats_with_retry(&self, addr: &str) -> Result<BrokerRuntimeStats> {
        let mut last_err = None;

        for attempt in 1..=self.retries {
            match self.admin.fetch_broker_runtime_stats(addr).await {
                Ok(stats) => return Ok(stats),
                Err(e) => {
                    warn!(
                        broker_addr = %addr,
                        attempt,
                        max_attempts = self.retries,
                        error = %e,
                        "runtime stats fetch failed"
                    );
                    last_err = Some(e);
                    if attempt < self.retries {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            CollectError::admin("fetch_broker_runtime_stats", "no attempts configured")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::admin::{BrokerData, ClusterInfo, GroupList, TopicList, TopicStats, TOTAL_TPS_STAT};
    use crate::metrics::MetricStoreConfig;

    /// Admin stub whose runtime-stats responses are scripted per address.
    /// An exhausted script keeps failing.
    struct ScriptedAdmin {
        info: ClusterInfo,
        stats: Mutex<HashMap<String, VecDeque<Result<BrokerRuntimeStats>>>>,
        stats_calls: AtomicUsize,
    }

    impl ScriptedAdmin {
        fn new(info: ClusterInfo) -> Self {
            Self {
                info,
                stats: Mutex::new(HashMap::new()),
                stats_calls: AtomicUsize::new(0),
            }
        }

        fn script(&self, addr: &str, responses: Vec<Result<BrokerRuntimeStats>>) {
            self.stats
                .lock()
                .insert(addr.to_string(), responses.into());
        }
    }

    #[async_trait]
    impl AdminClient for ScriptedAdmin {
        async fn fetch_all_topics(&self) -> Result<TopicList> {
            Ok(TopicList::default())
        }

        async fn examine_broker_cluster_info(&self) -> Result<ClusterInfo> {
            Ok(self.info.clone())
        }

        async fn fetch_broker_runtime_stats(&self, broker_addr: &str) -> Result<BrokerRuntimeStats> {
            self.stats_calls.fetch_add(1, Ordering::SeqCst);
            self.stats
                .lock()
                .get_mut(broker_addr)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(CollectError::admin("fetch_broker_runtime_stats", "down")))
        }

        async fn examine_topic_stats(&self, _topic: &str) -> Result<TopicStats> {
            Err(CollectError::admin("examine_topic_stats", "not scripted"))
        }

        async fn query_consumer_groups(&self) -> Result<GroupList> {
            Ok(GroupList::default())
        }
    }

    fn topology(brokers: &[(&str, &str)]) -> ClusterInfo {
        let mut info = ClusterInfo::default();
        for (name, addr) in brokers {
            info.broker_addr_table.insert(
                name.to_string(),
                BrokerData {
                    cluster: "DefaultCluster".to_string(),
                    broker_name: name.to_string(),
                    broker_addrs: [(0u64, addr.to_string())].into_iter().collect(),
                },
            );
        }
        info
    }

    fn stats_with_tps(tps: &str) -> BrokerRuntimeStats {
        let mut stats = BrokerRuntimeStats::default();
        stats
            .table
            .insert(TOTAL_TPS_STAT.to_string(), tps.to_string());
        stats
    }

    fn collector(admin: Arc<ScriptedAdmin>) -> (BrokerCollector, Arc<MetricStore>) {
        let store = Arc::new(MetricStore::new(MetricStoreConfig::default()));
        let collector = BrokerCollector::new(admin, store.clone(), 3, Duration::ZERO);
        (collector, store)
    }

    #[tokio::test]
    async fn test_collect_once_records_rounded_average() {
        let admin = Arc::new(ScriptedAdmin::new(topology(&[("broker-a", "10.0.0.1:10911")])));
        admin.script("10.0.0.1:10911", vec![Ok(stats_with_tps("1.0 2.0 3.0"))]);
        let (collector, store) = collector(admin);

        let summary = collector.collect_once().await.unwrap();
        assert_eq!(summary.collected, 1);
        assert_eq!(summary.failed, 0);

        let series = store.get("broker-a:0").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, "2.00000");
        assert!(series[0].timestamp_ms > 0);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let admin = Arc::new(ScriptedAdmin::new(topology(&[("broker-a", "10.0.0.1:10911")])));
        admin.script(
            "10.0.0.1:10911",
            vec![
                Err(CollectError::admin("fetch_broker_runtime_stats", "timeout")),
                Ok(stats_with_tps("4.5")),
            ],
        );
        let (collector, store) = collector(admin.clone());

        let summary = collector.collect_once().await.unwrap();
        assert_eq!(summary.collected, 1);
        assert_eq!(admin.stats_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.get("broker-a:0").unwrap()[0].value, "4.50000");
    }

    #[tokio::test]
    async fn test_dead_broker_does_not_stop_cycle() {
        let admin = Arc::new(ScriptedAdmin::new(topology(&[
            ("broker-a", "10.0.0.1:10911"),
            ("broker-b", "10.0.0.2:10911"),
        ])));
        // broker-a has no script, so every attempt fails
        admin.script("10.0.0.2:10911", vec![Ok(stats_with_tps("7.0"))]);
        let (collector, store) = collector(admin.clone());

        let summary = collector.collect_once().await.unwrap();
        assert_eq!(summary.collected, 1);
        assert_eq!(summary.failed, 1);
        assert!(store.get("broker-a:0").is_none());
        assert_eq!(store.get("broker-b:0").unwrap()[0].value, "7.00000");
        // 3 attempts for the dead broker, 1 for the healthy one
        assert_eq!(admin.stats_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_missing_stat_skips_broker() {
        let admin = Arc::new(ScriptedAdmin::new(topology(&[("broker-a", "10.0.0.1:10911")])));
        admin.script("10.0.0.1:10911", vec![Ok(BrokerRuntimeStats::default())]);
        let (collector, store) = collector(admin);

        let summary = collector.collect_once().await.unwrap();
        assert_eq!(summary.collected, 0);
        assert_eq!(summary.failed, 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cycle_shares_one_timestamp() {
        let admin = Arc::new(ScriptedAdmin::new(topology(&[
            ("broker-a", "10.0.0.1:10911"),
            ("broker-b", "10.0.0.2:10911"),
        ])));
        admin.script("10.0.0.1:10911", vec![Ok(stats_with_tps("1.0"))]);
        admin.script("10.0.0.2:10911", vec![Ok(stats_with_tps("2.0"))]);
        let (collector, store) = collector(admin);

        collector.collect_once().await.unwrap();

        let a = store.get("broker-a:0").unwrap();
        let b = store.get("broker-b:0").unwrap();
        assert_eq!(a[0].timestamp_ms, b[0].timestamp_ms);
    }

    #[tokio::test]
    async fn test_consecutive_cycles_append() {
        let admin = Arc::new(ScriptedAdmin::new(topology(&[("broker-a", "10.0.0.1:10911")])));
        admin.script(
            "10.0.0.1:10911",
            vec![Ok(stats_with_tps("1.0")), Ok(stats_with_tps("3.0"))],
        );
        let (collector, store) = collector(admin);

        collector.collect_once().await.unwrap();
        collector.collect_once().await.unwrap();

        let series = store.get("broker-a:0").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, "1.00000");
        assert_eq!(series[1].value, "3.00000");
    }
}
