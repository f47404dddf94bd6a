//! In-memory metric store
//!
//! The store is the single shared structure between the pollers (writers)
//! and the snapshot persister (reader): a map from series key to its ordered
//! samples. It mirrors the expiring-cache backing of the legacy dashboard:
//! entries untouched for the idle TTL may be swept, the map is capped at a
//! maximum number of series, and the persister clears everything once per
//! day at rollover.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::metrics::sample::{Sample, Series};

/// Configuration for a metric store.
#[derive(Debug, Clone)]
pub struct MetricStoreConfig {
    /// Entries untouched for this long become eligible for `sweep_idle`.
    pub idle_ttl: Duration,
    /// Maximum number of series held; inserting beyond this evicts the
    /// least-recently-touched series.
    pub max_series: usize,
}

impl Default for MetricStoreConfig {
    fn default() -> Self {
        Self {
            // matches the legacy cache: one day of inactivity, 1000 series
            idle_ttl: Duration::from_secs(24 * 60 * 60),
            max_series: 1000,
        }
    }
}

#[derive(Debug)]
struct Slot {
    series: Series,
    touched: Instant,
}

/// Expiring map from series key to ordered samples.
///
/// Concurrent `put`/`append` from different poller tasks is safe; each key is
/// written by at most one task per cycle, so last-write-wins per key is the
/// only ordering the store promises.
#[derive(Debug)]
pub struct MetricStore {
    slots: RwLock<HashMap<String, Slot>>,
    config: MetricStoreConfig,
}

impl MetricStore {
    /// Create a store with the given expiry configuration.
    pub fn new(config: MetricStoreConfig) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get a clone of the series for a key, refreshing its idle timer.
    pub fn get(&self, key: &str) -> Option<Series> {
        let mut slots = self.slots.write();
        let slot = slots.get_mut(key)?;
        slot.touched = Instant::now();
        Some(slot.series.clone())
    }

    /// Replace the series for a key.
    pub fn put(&self, key: impl Into<String>, series: Series) {
        let key = key.into();
        let mut slots = self.slots.write();
        if !slots.contains_key(&key) {
            Self::make_room(&mut slots, self.config.max_series);
        }
        slots.insert(
            key,
            Slot {
                series,
                touched: Instant::now(),
            },
        );
    }

    /// Append one sample to a key's series, creating the series on first use.
    pub fn append(&self, key: &str, sample: Sample) {
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(key) {
            slot.series.push(sample);
            slot.touched = Instant::now();
            return;
        }
        Self::make_room(&mut slots, self.config.max_series);
        slots.insert(
            key.to_string(),
            Slot {
                series: vec![sample],
                touched: Instant::now(),
            },
        );
    }

    /// Drop every series. Called once per day at rollover.
    pub fn invalidate_all(&self) {
        self.slots.write().clear();
    }

    /// Snapshot of all keys and their series, sorted by key.
    ///
    /// Sorted output keeps downstream snapshot files deterministic.
    pub fn as_map(&self) -> BTreeMap<String, Series> {
        self.slots
            .read()
            .iter()
            .map(|(key, slot)| (key.clone(), slot.series.clone()))
            .collect()
    }

    /// Remove entries idle beyond the configured TTL; returns how many.
    pub fn sweep_idle(&self) -> usize {
        let ttl = self.config.idle_ttl;
        let mut slots = self.slots.write();
        let before = slots.len();
        slots.retain(|_, slot| slot.touched.elapsed() < ttl);
        before - slots.len()
    }

    /// Number of series currently held.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether the store holds no series.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    fn make_room(slots: &mut HashMap<String, Slot>, max_series: usize) {
        while slots.len() >= max_series.max(1) {
            let oldest = slots
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => slots.remove(&key),
                None => break,
            };
        }
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(MetricStoreConfig::default())
    }
}
