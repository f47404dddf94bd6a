//! Daily snapshot merge and persistence
//!
//! Every few seconds the snapshot service reconciles the in-memory stores
//! against today's on-disk files and rewrites them. Each domain (broker,
//! topic) gets its own file, named by date:
//! `<dataDir>/<yyyy-MM-dd>.json` and `<dataDir>/<yyyy-MM-dd>_topic.json`,
//! holding a JSON object of series key to `"<epochMillis>,<value>"` strings.
//!
//! The merge never duplicates ranges: disk history older than everything in
//! memory is prepended; when ranges overlap the in-memory series wins and
//! the overlapping disk history is dropped. Disk-only series flow back into
//! the store so a restart mid-day keeps continuity.
//!
//! One persist cycle runs at a time. A tick that fires while the previous
//! one is still writing skips instead of queueing, so a slow disk cannot
//! pile up interleaved read-merge-write races on the same file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics::{leading_timestamp, MetricStore, Sample, Series};

/// Broker snapshot file suffix, appended to the date.
pub const BROKER_SNAPSHOT_SUFFIX: &str = ".json";
/// Topic snapshot file suffix, appended to the date.
pub const TOPIC_SNAPSHOT_SUFFIX: &str = "_topic.json";

/// Serialized snapshot form: series key to sample strings.
pub type SnapshotMap = BTreeMap<String, Vec<String>>;

/// Merges in-memory series with on-disk history and owns the date marker
/// that triggers the daily reset.
pub struct SnapshotService {
    data_dir: PathBuf,
    broker_store: Arc<MetricStore>,
    topic_store: Arc<MetricStore>,
    /// Date the in-memory stores belong to, `yyyy-MM-dd`.
    current_date: Mutex<String>,
    /// Held for the duration of one cycle; overlapping ticks skip.
    persist_gate: tokio::sync::Mutex<()>,
}

impl SnapshotService {
    pub fn new(
        data_dir: PathBuf,
        broker_store: Arc<MetricStore>,
        topic_store: Arc<MetricStore>,
    ) -> Self {
        Self {
            data_dir,
            broker_store,
            topic_store,
            current_date: Mutex::new(today_string()),
            persist_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one scheduled persist cycle, skipping if the previous one is
    /// still in flight.
    pub async fn persist_cycle(&self) -> Result<()> {
        let _gate = match self.persist_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                debug!("previous snapshot cycle still running, skipping this tick");
                return Ok(());
            }
        };
        self.run_cycle(&today_string())
    }

    /// Persist unconditionally, waiting for any in-flight cycle to finish
    /// first. Used for the final write on shutdown.
    pub async fn flush(&self) -> Result<()> {
        let _gate = self.persist_gate.lock().await;
        self.run_cycle(&today_string())
    }

    fn run_cycle(&self, today: &str) -> Result<()> {
        self.roll_over_if_needed(today);
        self.persist_domain(today, BROKER_SNAPSHOT_SUFFIX, &self.broker_store)?;
        self.persist_domain(today, TOPIC_SNAPSHOT_SUFFIX, &self.topic_store)?;
        Ok(())
    }

    /// Compare `today` against the owned date marker; on mismatch clear
    /// both stores and advance the marker before anything is merged.
    fn roll_over_if_needed(&self, today: &str) {
        let mut marker = self.current_date.lock();
        if *marker != today {
            info!(from = %*marker, to = %today, "day rolled over, resetting in-memory series");
            self.broker_store.invalidate_all();
            self.topic_store.invalidate_all();
            *marker = today.to_string();
        }
    }

    fn snapshot_path(&self, date: &str, suffix: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", date, suffix))
    }

    /// Merge one store against its file for `date` and rewrite the file.
    ///
    /// A file that exists but does not parse fails the cycle without
    /// touching the file; the next tick retries against the same content.
    fn persist_domain(&self, date: &str, suffix: &str, store: &MetricStore) -> Result<()> {
        let path = self.snapshot_path(date, suffix);
        let disk = load_snapshot(&path)?;
        let memory = store.as_map();

        let mut result = SnapshotMap::new();
        if disk.is_empty() {
            for (key, series) in &memory {
                result.insert(key.clone(), render_series(series));
            }
        } else {
            for (key, disk_list) in &disk {
                let mem = memory.get(key);
                let merged = merge_series(mem, disk_list)?;
                if mem.map_or(true, |series| series.is_empty()) {
                    // disk-only series flow back in so later cycles see them
                    store.put(key.clone(), parse_series(&merged)?);
                }
                result.insert(key.clone(), merged);
            }
            for (key, series) in &memory {
                if disk.get(key).map_or(true, |list| list.is_empty()) {
                    result.insert(key.clone(), render_series(series));
                }
            }
        }

        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(&result)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), series = result.len(), "snapshot written");
        Ok(())
    }
}

/// Merge one key's in-memory series with its on-disk sample strings.
///
/// Empty sides pass the other side through. When both sides have data, disk
/// history strictly older than the first in-memory sample is prepended;
/// otherwise the ranges overlap and only the in-memory series is kept.
pub fn merge_series(memory: Option<&Series>, disk: &[String]) -> Result<Vec<String>> {
    let memory = match memory {
        Some(series) if !series.is_empty() => series,
        _ => return Ok(disk.to_vec()),
    };
    let disk_last = match disk.last() {
        Some(sample) => leading_timestamp(sample)?,
        None => return Ok(render_series(memory)),
    };
    let memory_first = match memory.first() {
        Some(sample) => sample.timestamp_ms,
        None => return Ok(disk.to_vec()),
    };
    if disk_last < memory_first {
        let mut merged = disk.to_vec();
        merged.extend(render_series(memory));
        Ok(merged)
    } else {
        Ok(render_series(memory))
    }
}

fn render_series(series: &Series) -> Vec<String> {
    series.iter().map(|sample| sample.to_string()).collect()
}

/// Parse disk lines for the back-fill path.
///
/// As lenient as the merge comparison: only the leading timestamp must
/// parse, and whatever follows the first comma (possibly nothing) is the
/// value.
fn parse_series(lines: &[String]) -> Result<Series> {
    lines
        .iter()
        .map(|line| {
            let timestamp_ms = leading_timestamp(line)?;
            let value = line.split_once(',').map_or("", |(_, rest)| rest);
            Ok(Sample::new(timestamp_ms, value))
        })
        .collect()
}

/// Load a snapshot file; a missing or empty file is an empty map.
fn load_snapshot(path: &Path) -> Result<SnapshotMap> {
    if !path.exists() {
        return Ok(SnapshotMap::new());
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(SnapshotMap::new());
    }
    Ok(serde_json::from_str(&text)?)
}

fn today_string() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
