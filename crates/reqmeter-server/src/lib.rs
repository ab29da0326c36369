//! reqmeter server library entry.
//!
//! This crate wires configuration, the metrics registry, the request
//! interceptor and the exposition endpoint into an axum application. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod router;
pub mod routes;
