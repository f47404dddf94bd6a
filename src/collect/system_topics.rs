//! System-topic registry and exclusion rules
//!
//! Topic collection skips the cluster's own plumbing: retry queues, dead
//! letter queues, and system topics. The well-known built-in names are in
//! the registry from the start; cluster names, their internal reply topics,
//! and broker names all surface in the topic list of a live cluster, so
//! each topic cycle re-registers those before filtering; registration is
//! idempotent.

use std::collections::BTreeSet;

use parking_lot::RwLock;

use crate::admin::ClusterInfo;

/// Prefix of per-group retry queues.
pub const RETRY_TOPIC_PREFIX: &str = "%RETRY%";

/// Prefix of per-group dead-letter queues.
pub const DLQ_TOPIC_PREFIX: &str = "%DLQ%";

/// Prefix reserved for cluster-internal topics.
pub const SYSTEM_TOPIC_PREFIX: &str = "rmq_sys_";

/// Suffix of a cluster's internal request-reply topic.
pub const REPLY_TOPIC_SUFFIX: &str = "_REPLY_TOPIC";

/// Built-in system topics that carry no reserved prefix, or use the
/// uppercase `RMQ_SYS_` convention the case-sensitive prefix check does
/// not match. Every registry starts with these.
pub const BUILT_IN_SYSTEM_TOPICS: &[&str] = &[
    "TBW102",
    "BenchmarkTest",
    "OFFSET_MOVED_EVENT",
    "SCHEDULE_TOPIC_XXXX",
    "SELF_TEST_TOPIC",
    "RMQ_SYS_TRACE_TOPIC",
    "RMQ_SYS_TRANS_HALF_TOPIC",
    "RMQ_SYS_TRANS_OP_HALF_TOPIC",
    "TRANS_CHECK_MAX_TIME_TOPIC",
];

/// The internal reply topic name for a cluster.
pub fn reply_topic(cluster: &str) -> String {
    format!("{}{}", cluster, REPLY_TOPIC_SUFFIX)
}

/// Process-wide set of names excluded from topic-level collection.
#[derive(Debug)]
pub struct SystemTopicRegistry {
    names: RwLock<BTreeSet<String>>,
}

impl Default for SystemTopicRegistry {
    fn default() -> Self {
        let names = BUILT_IN_SYSTEM_TOPICS
            .iter()
            .map(|name| name.to_string())
            .collect();
        Self {
            names: RwLock::new(names),
        }
    }
}

impl SystemTopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name; returns whether it was newly added.
    pub fn register(&self, name: impl Into<String>) -> bool {
        self.names.write().insert(name.into())
    }

    /// Register every cluster name, its reply topic, and every broker name.
    pub fn register_cluster(&self, info: &ClusterInfo) {
        let mut names = self.names.write();
        for (cluster, broker_names) in &info.cluster_addr_table {
            names.insert(cluster.clone());
            names.insert(reply_topic(cluster));
            for broker_name in broker_names {
                names.insert(broker_name.clone());
            }
        }
    }

    /// Whether a name is a system topic (registered or reserved prefix).
    pub fn is_system_topic(&self, name: &str) -> bool {
        name.starts_with(SYSTEM_TOPIC_PREFIX) || self.names.read().contains(name)
    }

    /// Whether topic collection should skip this topic entirely.
    pub fn is_excluded(&self, topic: &str) -> bool {
        topic.starts_with(RETRY_TOPIC_PREFIX)
            || topic.starts_with(DLQ_TOPIC_PREFIX)
            || self.is_system_topic(topic)
    }

    /// Number of registered names, built-ins included.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Whether the registry holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}
