//! Metric primitives.
//!
//! Counters and histograms fan out into one series per label set, created
//! lazily on first observation. Gauges are a single scalar. Every update is
//! atomic per series; different series never contend on a shared lock.

mod atomic;
pub mod counter;
pub mod desc;
pub mod gauge;
pub mod histogram;
pub mod labels;

pub use counter::CounterVec;
pub use desc::{Desc, MetricKind};
pub use gauge::Gauge;
pub use histogram::{validate_buckets, HistogramVec, DEFAULT_BUCKETS};
pub use labels::LabelSet;
