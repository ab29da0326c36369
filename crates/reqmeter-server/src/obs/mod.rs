//! Request and process instrumentation.
//!
//! `http` defines the request metrics the interceptor updates; `process`
//! provides the optional process-level collector and the scheduler lag
//! sampler.

pub mod http;
pub mod process;

pub use http::HttpMetrics;
pub use process::{run_lag_sampler, ProcessCollector};
