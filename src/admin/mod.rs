//! Cluster admin API collaborator
//!
//! The dashboard core never speaks the message-queue admin protocol itself;
//! it consumes a narrow slice of the cluster admin surface through the
//! [`AdminClient`] trait: topic enumeration, cluster topology, per-broker
//! runtime stats, topic-level throughput, and the consumer-group listing the
//! daily refresh warms. Tests script the trait directly;
//! [`http::HttpAdminClient`] is the thin JSON glue used by the binary.

pub mod http;

pub use http::{AdminConfig, HttpAdminClient};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CollectError, Result};

/// Runtime-stats key holding space-separated throughput samples.
pub const TOTAL_TPS_STAT: &str = "getTotalTps";

/// Addresses and grouping of every broker in the cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Broker name -> broker data (addresses per replica id).
    pub broker_addr_table: BTreeMap<String, BrokerData>,
    /// Cluster name -> broker names in that cluster.
    pub cluster_addr_table: BTreeMap<String, BTreeSet<String>>,
}

/// One named broker group and its replica addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerData {
    pub cluster: String,
    pub broker_name: String,
    /// Replica id -> address; id 0 is the master.
    pub broker_addrs: BTreeMap<u64, String>,
}

impl ClusterInfo {
    /// Flatten the topology to `address -> series key`.
    ///
    /// The series key is `"<brokerName>:<brokerId>"`, the identifier the
    /// snapshot files key broker series by. An address listed under two
    /// names keeps the last one, so each address is polled exactly once per
    /// cycle.
    pub fn broker_addresses(&self) -> BTreeMap<String, String> {
        let mut addresses = BTreeMap::new();
        for (broker_name, data) in &self.broker_addr_table {
            for (broker_id, addr) in &data.broker_addrs {
                addresses.insert(addr.clone(), format!("{}:{}", broker_name, broker_id));
            }
        }
        addresses
    }
}

/// String-keyed broker runtime stats table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerRuntimeStats {
    pub table: HashMap<String, String>,
}

impl BrokerRuntimeStats {
    /// The space-separated total-TPS samples, or `StatMissing`.
    pub fn total_tps(&self) -> Result<&str> {
        self.table
            .get(TOTAL_TPS_STAT)
            .map(String::as_str)
            .ok_or_else(|| CollectError::StatMissing(TOTAL_TPS_STAT.to_string()))
    }
}

/// All topic names known to the cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicList {
    pub topics: BTreeSet<String>,
}

/// Topic-level throughput as reported by the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicStats {
    /// Put (inbound) throughput, a decimal string.
    pub put_tps: String,
}

/// Consumer group names, used by the daily cache-warm refresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupList {
    pub groups: BTreeSet<String>,
}

/// The slice of the cluster admin API the collection core depends on.
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// List every topic in the cluster, system topics included.
    async fn fetch_all_topics(&self) -> Result<TopicList>;

    /// Fetch the cluster topology (cluster -> brokers -> addresses).
    async fn examine_broker_cluster_info(&self) -> Result<ClusterInfo>;

    /// Fetch the runtime stats table of one broker.
    async fn fetch_broker_runtime_stats(&self, broker_addr: &str) -> Result<BrokerRuntimeStats>;

    /// Fetch topic-level throughput for one topic.
    async fn examine_topic_stats(&self, topic: &str) -> Result<TopicStats>;

    /// List consumer groups; the collaborator warms its own caches.
    async fn query_consumer_groups(&self) -> Result<GroupList>;
}
