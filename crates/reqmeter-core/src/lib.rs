//! reqmeter core: transport-agnostic metric primitives, registry, and text exposition.
//!
//! This crate owns everything that holds metric state: counters, gauges and
//! histograms keyed by label sets, the registry that enforces name
//! uniqueness, point-in-time snapshots, and the line-oriented text encoder.
//! It carries no HTTP or runtime dependencies so the same primitives can be
//! driven by any host.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Rejected observations surface as `MeterError` so instrumentation bugs never
//! take down the request path.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod encoder;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod snapshot;

/// Shared result type.
pub use error::{ErrorKind, MeterError, Result};
pub use encoder::{Exposition, TextEncoder};
pub use metrics::{CounterVec, Desc, Gauge, HistogramVec, LabelSet, MetricKind};
pub use registry::{Collector, Registry};
pub use snapshot::{FamilySnapshot, HistogramSnapshot, SeriesSnapshot, SeriesValue, Snapshot};
