//! Sample model and in-memory series storage
//!
//! Everything the pollers produce passes through here: `Sample` is one
//! timestamped observation in the legacy `"<epochMillis>,<decimalValue>"`
//! text form, `MetricStore` holds the per-key series between snapshot
//! cycles, and `decimal` provides the exact half-up rounding the throughput
//! averages are contracted to.

pub mod decimal;
pub mod sample;
pub mod store;

pub use sample::{leading_timestamp, Sample, Series};
pub use store::{MetricStore, MetricStoreConfig};
