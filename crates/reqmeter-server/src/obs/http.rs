//! HTTP request metrics.

use std::sync::Arc;

use reqmeter_core::error::Result;
use reqmeter_core::metrics::desc::fq_name;
use reqmeter_core::{CounterVec, Gauge, HistogramVec, Registry};

/// Label names shared by the request counter and duration histogram.
pub const REQUEST_LABELS: [&str; 3] = ["method", "path", "status"];

/// Request metrics updated by the interceptor.
///
/// These are registered into a [`Registry`] at startup; the handles are
/// shared (`Arc`) with the registry so scrapes see every update.
pub struct HttpMetrics {
    /// Completed requests by method/path/status.
    pub requests_total: Arc<CounterVec>,
    /// Request duration in seconds by method/path/status.
    pub request_duration_seconds: Arc<HistogramVec>,
    /// Requests started but not yet finished.
    pub requests_active: Arc<Gauge>,
}

impl HttpMetrics {
    /// Registers request metrics into the given `Registry`.
    pub fn register(registry: &Registry, namespace: &str, buckets: &[f64]) -> Result<Self> {
        let requests_total = Arc::new(CounterVec::new(
            fq_name(namespace, "http_requests_total"),
            "Total number of HTTP requests",
            &REQUEST_LABELS,
        )?);
        registry.register(Arc::clone(&requests_total))?;

        let request_duration_seconds = Arc::new(HistogramVec::new(
            fq_name(namespace, "http_request_duration_seconds"),
            "HTTP request duration in seconds",
            &REQUEST_LABELS,
            buckets,
        )?);
        registry.register(Arc::clone(&request_duration_seconds))?;

        let requests_active = Arc::new(Gauge::new(
            fq_name(namespace, "http_requests_active"),
            "Number of HTTP requests currently in flight",
        )?);
        registry.register(Arc::clone(&requests_active))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            requests_active,
        })
    }

    pub fn request_started(&self) {
        self.requests_active.inc();
    }

    /// Record a finished request.
    ///
    /// The three updates are independent: a rejected observation is logged
    /// and the others still apply. The gauge decrement is always attempted.
    pub fn request_finished(&self, method: &str, path: &str, status: u16, elapsed_secs: f64) {
        let status = status.to_string();
        let labels = [("method", method), ("path", path), ("status", status.as_str())];

        if let Err(e) = self.requests_total.inc(&labels) {
            tracing::warn!(error = %e, kind = e.kind().as_str(), "request counter update rejected");
        }
        if let Err(e) = self.request_duration_seconds.observe(&labels, elapsed_secs) {
            tracing::warn!(error = %e, kind = e.kind().as_str(), "request duration observation rejected");
        }
        if let Err(e) = self.requests_active.dec() {
            tracing::warn!(error = %e, kind = e.kind().as_str(), "active request gauge update rejected");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqmeter_core::MeterError;

    fn metrics() -> (Registry, HttpMetrics) {
        let registry = Registry::new();
        let m = HttpMetrics::register(&registry, "backend", &[0.1, 1.0]).unwrap();
        (registry, m)
    }

    #[test]
    fn names_carry_namespace() {
        let (registry, _m) = metrics();
        assert_eq!(
            registry.names(),
            vec![
                "backend_http_requests_total".to_string(),
                "backend_http_request_duration_seconds".to_string(),
                "backend_http_requests_active".to_string(),
            ]
        );
    }

    #[test]
    fn registering_twice_fails() {
        let (registry, _m) = metrics();
        let err = HttpMetrics::register(&registry, "backend", &[0.1]).err().unwrap();
        assert!(matches!(err, MeterError::DuplicateMetricName(_)));
    }

    #[test]
    fn finished_request_updates_all_three() {
        let (_r, m) = metrics();
        m.request_started();
        m.request_finished("GET", "/api/data", 200, 0.05);

        let labels = [("method", "GET"), ("path", "/api/data"), ("status", "200")];
        assert_eq!(m.requests_total.value(&labels).unwrap(), 1.0);
        let h = m.request_duration_seconds.snapshot(&labels).unwrap().unwrap();
        assert_eq!(h.count, 1);
        assert_eq!(h.buckets[0], (0.1, 1));
        assert_eq!(m.requests_active.get(), 0.0);
    }

    #[test]
    fn negative_duration_is_rejected_but_rest_applies() {
        let (_r, m) = metrics();
        m.request_started();
        m.request_finished("GET", "/x", 200, -1.0);

        let labels = [("method", "GET"), ("path", "/x"), ("status", "200")];
        assert_eq!(m.requests_total.value(&labels).unwrap(), 1.0);
        assert!(m.request_duration_seconds.snapshot(&labels).unwrap().is_none());
        assert_eq!(m.requests_active.get(), 0.0);
    }
}
