//! Shared test fixtures for queuescope integration tests
//!
//! Provides a scriptable [`MockAdminClient`] standing in for the cluster
//! admin API: tests declare the topology, per-broker runtime stats, topic
//! stats, and failure injections up front, then drive the collectors
//! against it.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use queuescope::admin::{
    AdminClient, BrokerData, BrokerRuntimeStats, ClusterInfo, GroupList, TopicList, TopicStats,
    TOTAL_TPS_STAT,
};
use queuescope::{CollectError, Result};

#[derive(Default)]
struct MockState {
    info: ClusterInfo,
    topics: BTreeSet<String>,
    groups: BTreeSet<String>,
    /// Broker address -> space-separated TPS samples.
    broker_tps: HashMap<String, String>,
    /// Broker address -> number of stats calls that fail before success.
    broker_failures: HashMap<String, usize>,
    /// Topic name -> put TPS value.
    topic_tps: HashMap<String, String>,
}

/// Scriptable in-memory [`AdminClient`].
pub struct MockAdminClient {
    state: Mutex<MockState>,
    pub stats_calls: AtomicUsize,
    pub topic_stats_calls: AtomicUsize,
}

impl MockAdminClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            stats_calls: AtomicUsize::new(0),
            topic_stats_calls: AtomicUsize::new(0),
        }
    }

    /// Add a broker to the topology.
    pub fn with_broker(self, cluster: &str, name: &str, id: u64, addr: &str) -> Self {
        {
            let mut state = self.state.lock();
            state
                .info
                .cluster_addr_table
                .entry(cluster.to_string())
                .or_default()
                .insert(name.to_string());
            let data = state
                .info
                .broker_addr_table
                .entry(name.to_string())
                .or_insert_with(|| BrokerData {
                    cluster: cluster.to_string(),
                    broker_name: name.to_string(),
                    broker_addrs: Default::default(),
                });
            data.broker_addrs.insert(id, addr.to_string());
        }
        self
    }

    /// Script the space-separated TPS samples a broker reports.
    pub fn with_total_tps(self, addr: &str, samples: &str) -> Self {
        self.state
            .lock()
            .broker_tps
            .insert(addr.to_string(), samples.to_string());
        self
    }

    /// Make the first `n` stats calls for `addr` fail before succeeding.
    pub fn fail_stats_times(self, addr: &str, n: usize) -> Self {
        self.state
            .lock()
            .broker_failures
            .insert(addr.to_string(), n);
        self
    }

    /// Add a topic to the cluster topic list.
    pub fn with_topic(self, name: &str) -> Self {
        self.state.lock().topics.insert(name.to_string());
        self
    }

    /// Add a topic along with its put TPS value.
    pub fn with_topic_tps(self, name: &str, tps: &str) -> Self {
        {
            let mut state = self.state.lock();
            state.topics.insert(name.to_string());
            state.topic_tps.insert(name.to_string(), tps.to_string());
        }
        self
    }

    /// Script the consumer-group listing.
    pub fn with_groups(self, names: &[&str]) -> Self {
        self.state.lock().groups = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

impl Default for MockAdminClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdminClient for MockAdminClient {
    async fn fetch_all_topics(&self) -> Result<TopicList> {
        Ok(TopicList {
            topics: self.state.lock().topics.clone(),
        })
    }

    async fn examine_broker_cluster_info(&self) -> Result<ClusterInfo> {
        Ok(self.state.lock().info.clone())
    }

    async fn fetch_broker_runtime_stats(&self, broker_addr: &str) -> Result<BrokerRuntimeStats> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(remaining) = state.broker_failures.get_mut(broker_addr) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CollectError::admin(
                    "fetch_broker_runtime_stats",
                    format!("{} unavailable", broker_addr),
                ));
            }
        }
        match state.broker_tps.get(broker_addr) {
            Some(samples) => {
                let mut stats = BrokerRuntimeStats::default();
                stats
                    .table
                    .insert(TOTAL_TPS_STAT.to_string(), samples.clone());
                Ok(stats)
            }
            None => Err(CollectError::admin(
                "fetch_broker_runtime_stats",
                format!("unknown broker {}", broker_addr),
            )),
        }
    }

    async fn examine_topic_stats(&self, topic: &str) -> Result<TopicStats> {
        self.topic_stats_calls.fetch_add(1, Ordering::SeqCst);
        match self.state.lock().topic_tps.get(topic) {
            Some(tps) => Ok(TopicStats {
                put_tps: tps.clone(),
            }),
            None => Err(CollectError::admin(
                "examine_topic_stats",
                format!("no stats for {}", topic),
            )),
        }
    }

    async fn query_consumer_groups(&self) -> Result<GroupList> {
        Ok(GroupList {
            groups: self.state.lock().groups.clone(),
        })
    }
}

/// Today's date the way snapshot files are named.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
