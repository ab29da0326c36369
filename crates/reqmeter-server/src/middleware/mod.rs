//! Request interceptor.
//!
//! `MetricsLayer` wraps every route (and the fallback). Each request gets a
//! `RequestTracker` that records counter, histogram and gauge updates exactly
//! once, whether the request completes, panics, or is dropped mid-flight.
//! Requests to the exposition path pass through unmeasured.

pub mod layer;
pub mod tracker;

pub use layer::{canonical_path, method_label, MetricsLayer, MetricsService, PathLabels};
pub use tracker::RequestTracker;
