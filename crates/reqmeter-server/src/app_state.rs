//! Shared application state.
//!
//! Owns the metrics registry and the request metrics registered into it.
//! The registry is constructed here and injected into the interceptor and
//! the exposition handler; tests build one `AppState` per case.

use std::sync::Arc;

use reqmeter_core::error::Result;
use reqmeter_core::{Exposition, Registry, TextEncoder};

use crate::config::ServerConfig;
use crate::obs::{HttpMetrics, ProcessCollector};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Arc<Registry>,
    http: Arc<HttpMetrics>,
    process: Option<Arc<ProcessCollector>>,
    encoder: TextEncoder,
}

impl AppState {
    /// Build state with a fresh registry.
    /// Returns Result so startup can fail cleanly on bad metric definitions.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build state around an existing registry (e.g. one that already
    /// carries application-specific collectors).
    pub fn with_registry(cfg: ServerConfig, registry: Arc<Registry>) -> Result<Self> {
        cfg.validate()?;

        let http = Arc::new(HttpMetrics::register(
            &registry,
            &cfg.metrics.namespace,
            &cfg.metrics.buckets,
        )?);

        let process = if cfg.metrics.process_metrics {
            let collector = Arc::new(ProcessCollector::new(&cfg.metrics.namespace)?);
            registry.register(Arc::clone(&collector))?;
            Some(collector)
        } else {
            None
        };

        tracing::info!(
            families = registry.names().len(),
            path = %cfg.metrics.path,
            "metrics registry initialised"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                http,
                process,
                encoder: TextEncoder::new(),
            }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn http_metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.inner.http)
    }

    pub fn process(&self) -> Option<Arc<ProcessCollector>> {
        self.inner.process.clone()
    }

    pub fn encoder(&self) -> &TextEncoder {
        &self.inner.encoder
    }

    /// Snapshot the registry and encode it.
    pub fn render(&self) -> Exposition {
        self.inner.encoder.encode(&self.inner.registry.snapshot())
    }
}
