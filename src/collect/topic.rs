//! Topic throughput poller
//!
//! Once per minute, offset from the broker cycle, this poller refreshes the
//! system-topic registry from the cluster topology, filters the full topic
//! list down to application topics, and fans one collection unit per topic
//! out to a bounded worker pool. Units record independently; one slow or
//! failing topic never blocks the rest beyond its worker slot.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::admin::AdminClient;
use crate::error::Result;
use crate::metrics::{MetricStore, Sample};

use super::system_topics::SystemTopicRegistry;
use super::CycleSummary;

/// Polls per-topic throughput across a bounded worker pool.
pub struct TopicCollector {
    admin: Arc<dyn AdminClient>,
    store: Arc<MetricStore>,
    registry: Arc<SystemTopicRegistry>,
    workers: Arc<Semaphore>,
}

impl TopicCollector {
    pub fn new(
        admin: Arc<dyn AdminClient>,
        store: Arc<MetricStore>,
        registry: Arc<SystemTopicRegistry>,
        workers: usize,
    ) -> Self {
        Self {
            admin,
            store,
            registry,
            workers: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Run one topic collection cycle.
    ///
    /// Fails only when the topic list or topology cannot be fetched; each
    /// surviving topic is collected by its own unit and failures there are
    /// counted, not propagated.
    pub async fn collect_once(&self) -> Result<CycleSummary> {
        let info = self.admin.examine_broker_cluster_info().await?;
        self.registry.register_cluster(&info);

        let topic_list = self.admin.fetch_all_topics().await?;
        let mut units: Vec<JoinHandle<bool>> = Vec::new();

        for topic in topic_list.topics {
            if self.registry.is_excluded(&topic) {
                continue;
            }

            // Holding the permit across the unit bounds in-flight units at
            // the pool size; submission stalls until a slot frees.
            let permit = match self.workers.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // pool closed, only possible during teardown
            };

            let admin = self.admin.clone();
            let store = self.store.clone();
            units.push(tokio::spawn(async move {
                let _permit = permit;
                let timestamp_ms = Utc::now().timestamp_millis();
                match admin.examine_topic_stats(&topic).await {
                    Ok(stats) => {
                        store.append(&topic, Sample::new(timestamp_ms, stats.put_tps));
                        debug!(topic = %topic, "recorded topic throughput");
                        true
                    }
                    Err(e) => {
                        warn!(topic = %topic, error = %e, "topic stats fetch failed");
                        false
                    }
                }
            }));
        }

        let mut summary = CycleSummary::default();
        for unit in units {
            match unit.await {
                Ok(true) => summary.collected += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    error!(error = %e, "topic collection unit aborted");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
