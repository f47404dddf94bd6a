//! Integration tests for the collection pipeline
//!
//! These tests drive the broker and topic pollers against a scripted admin
//! client and verify what lands in the stores and on disk.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{today, MockAdminClient};
use queuescope::{
    BrokerCollector, Collector, CollectorConfig, GroupRefresher, MetricStore, MetricStoreConfig,
    SnapshotService, SystemTopicRegistry, TopicCollector,
};
use tempfile::tempdir;

fn store() -> Arc<MetricStore> {
    Arc::new(MetricStore::new(MetricStoreConfig::default()))
}

/// One full collection round: broker cycle, topic cycle, snapshot flush.
#[tokio::test]
async fn test_collection_round_trip_to_disk() {
    let dir = tempdir().unwrap();
    let admin = Arc::new(
        MockAdminClient::new()
            .with_broker("DefaultCluster", "broker-a", 0, "10.0.0.1:10911")
            .with_total_tps("10.0.0.1:10911", "1.0 2.0 3.0")
            .with_topic("%RETRY%order-consumer")
            .with_topic("rmq_sys_trace")
            .with_topic_tps("orders", "4.5"),
    );

    let broker_store = store();
    let topic_store = store();
    let broker = BrokerCollector::new(
        admin.clone(),
        broker_store.clone(),
        3,
        Duration::ZERO,
    );
    let topic = TopicCollector::new(
        admin.clone(),
        topic_store.clone(),
        Arc::new(SystemTopicRegistry::new()),
        4,
    );
    let snapshot = SnapshotService::new(
        dir.path().to_path_buf(),
        broker_store.clone(),
        topic_store.clone(),
    );

    let broker_summary = broker.collect_once().await.unwrap();
    assert_eq!(broker_summary.collected, 1);
    assert_eq!(broker_summary.failed, 0);

    let topic_summary = topic.collect_once().await.unwrap();
    assert_eq!(topic_summary.collected, 1);
    assert_eq!(topic_summary.failed, 0);

    snapshot.flush().await.unwrap();

    let broker_file = dir.path().join(format!("{}.json", today()));
    let broker_map: std::collections::BTreeMap<String, Vec<String>> =
        serde_json::from_str(&std::fs::read_to_string(&broker_file).unwrap()).unwrap();
    let samples = &broker_map["broker-a:0"];
    assert_eq!(samples.len(), 1);
    // "1.0 2.0 3.0" averages to 2.00000 at 5 digits
    assert!(samples[0].ends_with(",2.00000"), "got {}", samples[0]);

    let topic_file = dir.path().join(format!("{}_topic.json", today()));
    let topic_map: std::collections::BTreeMap<String, Vec<String>> =
        serde_json::from_str(&std::fs::read_to_string(&topic_file).unwrap()).unwrap();
    assert_eq!(topic_map.keys().collect::<Vec<_>>(), vec!["orders"]);
    assert!(topic_map["orders"][0].ends_with(",4.5"));
}

/// A broker that fails once is retried within the same cycle.
#[tokio::test]
async fn test_broker_retry_recovers_within_cycle() {
    let admin = Arc::new(
        MockAdminClient::new()
            .with_broker("DefaultCluster", "broker-a", 0, "10.0.0.1:10911")
            .with_total_tps("10.0.0.1:10911", "5.0")
            .fail_stats_times("10.0.0.1:10911", 1),
    );
    let broker_store = store();
    let broker = BrokerCollector::new(admin.clone(), broker_store.clone(), 3, Duration::ZERO);

    let summary = broker.collect_once().await.unwrap();

    assert_eq!(summary.collected, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(admin.stats_calls.load(Ordering::SeqCst), 2);
    assert!(broker_store.get("broker-a:0").is_some());
}

/// A broker that stays down is skipped; the rest of the cycle completes.
#[tokio::test]
async fn test_dead_broker_does_not_abort_cycle() {
    let admin = Arc::new(
        MockAdminClient::new()
            .with_broker("DefaultCluster", "broker-a", 0, "10.0.0.1:10911")
            .with_broker("DefaultCluster", "broker-b", 0, "10.0.0.2:10911")
            .with_total_tps("10.0.0.2:10911", "7.0"),
    );
    let broker_store = store();
    let broker = BrokerCollector::new(admin.clone(), broker_store.clone(), 3, Duration::ZERO);

    let summary = broker.collect_once().await.unwrap();

    assert_eq!(summary.collected, 1);
    assert_eq!(summary.failed, 1);
    assert!(broker_store.get("broker-a:0").is_none());
    assert!(broker_store.get("broker-b:0").is_some());
}

/// Consecutive cycles accumulate samples in collection order.
#[tokio::test]
async fn test_consecutive_cycles_accumulate() {
    let admin = Arc::new(
        MockAdminClient::new()
            .with_broker("DefaultCluster", "broker-a", 0, "10.0.0.1:10911")
            .with_total_tps("10.0.0.1:10911", "3.0"),
    );
    let broker_store = store();
    let broker = BrokerCollector::new(admin.clone(), broker_store.clone(), 3, Duration::ZERO);

    broker.collect_once().await.unwrap();
    broker.collect_once().await.unwrap();

    let series = broker_store.get("broker-a:0").unwrap();
    assert_eq!(series.len(), 2);
    assert!(series[0].timestamp_ms <= series[1].timestamp_ms);
}

#[tokio::test]
async fn test_group_refresh_reports_count() {
    let admin = Arc::new(MockAdminClient::new().with_groups(&["order-consumer", "audit"]));
    let refresher = GroupRefresher::new(admin);
    assert_eq!(refresher.refresh_once().await.unwrap(), 2);
}

/// With collection enabled, four loops run: broker, topic, persist, groups.
#[tokio::test]
async fn test_spawn_all_enabled_runs_all_loops() {
    let dir = tempdir().unwrap();
    let mut config = CollectorConfig::default();
    config.data_dir = dir.path().to_path_buf();
    let admin = Arc::new(MockAdminClient::new());

    let collector = Arc::new(Collector::new(config, admin));
    let shutdown = Arc::new(AtomicBool::new(false));
    let handles = collector.clone().spawn_all(shutdown.clone());

    assert_eq!(handles.len(), 4);

    shutdown.store(true, Ordering::Relaxed);
    for handle in &handles {
        handle.abort();
    }
}

/// Disabling collection leaves only the daily group refresh, and a flush
/// writes nothing.
#[tokio::test]
async fn test_disabled_collection_only_refreshes_groups() {
    let dir = tempdir().unwrap();
    let mut config = CollectorConfig::default();
    config.enabled = false;
    config.data_dir = dir.path().to_path_buf();
    let admin = Arc::new(MockAdminClient::new());

    let collector = Arc::new(Collector::new(config, admin));
    let shutdown = Arc::new(AtomicBool::new(false));
    let handles = collector.clone().spawn_all(shutdown.clone());

    assert_eq!(handles.len(), 1);

    collector.flush().await.unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    shutdown.store(true, Ordering::Relaxed);
    for handle in &handles {
        handle.abort();
    }
}
