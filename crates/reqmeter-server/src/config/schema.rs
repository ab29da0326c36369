use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use reqmeter_core::error::{MeterError, Result};
use reqmeter_core::metrics::{desc::valid_metric_name, validate_buckets, DEFAULT_BUCKETS};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeterError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.parse::<IpAddr>().is_err() {
            return Err(MeterError::Config(format!(
                "server.host must be an IP address, got {:?}",
                self.host
            )));
        }
        if !(100..=600_000).contains(&self.request_timeout_ms) {
            return Err(MeterError::Config(
                "server.request_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| MeterError::Config(format!("server.host: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3001
}
fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Application routes the exposition endpoint may not shadow.
const RESERVED_PATHS: [&str; 2] = ["/health", "/api/data"];

/// What to put in the `path` label when no route matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPaths {
    /// Use `metrics.unmatched_label` (bounded cardinality).
    #[default]
    Collapse,
    /// Use the raw request path (unbounded cardinality).
    Raw,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_path")]
    pub path: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_buckets")]
    pub buckets: Vec<f64>,

    #[serde(default)]
    pub unmatched_paths: UnmatchedPaths,

    #[serde(default = "default_unmatched_label")]
    pub unmatched_label: String,

    #[serde(default = "default_process_metrics")]
    pub process_metrics: bool,

    #[serde(default = "default_lag_sample_interval_ms")]
    pub lag_sample_interval_ms: u64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            namespace: default_namespace(),
            buckets: default_buckets(),
            unmatched_paths: UnmatchedPaths::default(),
            unmatched_label: default_unmatched_label(),
            process_metrics: default_process_metrics(),
            lag_sample_interval_ms: default_lag_sample_interval_ms(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(MeterError::Config(
                "metrics.path must start with '/' and name a route".into(),
            ));
        }
        if self.path.ends_with('/') {
            return Err(MeterError::Config("metrics.path must not end with '/'".into()));
        }
        // Served as a literal route; captures or wildcards would match more
        // than the scrape path.
        if self.path.contains(&[':', '*', '{', '}'][..]) {
            return Err(MeterError::Config(format!(
                "metrics.path {} must be a literal path without route parameters",
                self.path
            )));
        }
        if RESERVED_PATHS.contains(&self.path.as_str()) {
            return Err(MeterError::Config(format!(
                "metrics.path {} collides with an application route",
                self.path
            )));
        }
        if !self.namespace.is_empty() && !valid_metric_name(&self.namespace) {
            return Err(MeterError::Config(format!(
                "metrics.namespace {:?} is not a valid metric name prefix",
                self.namespace
            )));
        }
        validate_buckets(&self.buckets)?;
        if self.unmatched_label.is_empty() {
            return Err(MeterError::Config("metrics.unmatched_label must not be empty".into()));
        }
        if !(10..=60_000).contains(&self.lag_sample_interval_ms) {
            return Err(MeterError::Config(
                "metrics.lag_sample_interval_ms must be between 10 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn lag_sample_interval(&self) -> Duration {
        Duration::from_millis(self.lag_sample_interval_ms)
    }
}

fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_namespace() -> String {
    "backend".into()
}
fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
fn default_unmatched_label() -> String {
    "unmatched".into()
}
fn default_process_metrics() -> bool {
    true
}
fn default_lag_sample_interval_ms() -> u64 {
    500
}
