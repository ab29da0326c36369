use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::obs::HttpMetrics;

/// Status recorded when the response future is dropped before completing
/// (client went away, or the host cancelled the request).
pub const STATUS_CLIENT_CLOSED: u16 = 499;

/// Per-request completion hook: not started -> in flight -> finished once.
///
/// Start time and labels live on the tracker itself, so completion can run
/// on any task or thread without consulting shared state.
pub struct RequestTracker {
    metrics: Arc<HttpMetrics>,
    start: Instant,
    method: String,
    path: String,
    done: AtomicBool,
}

impl RequestTracker {
    /// Mark the request in flight.
    pub fn start(metrics: Arc<HttpMetrics>, method: impl Into<String>, path: impl Into<String>) -> Self {
        metrics.request_started();
        Self {
            metrics,
            start: Instant::now(),
            method: method.into(),
            path: path.into(),
            done: AtomicBool::new(false),
        }
    }

    /// Record completion with `status`. Only the first call has any effect;
    /// returns whether this call was the one that recorded.
    pub fn finish(&self, status: u16) -> bool {
        if self.done.swap(true, Ordering::AcqRel) {
            tracing::debug!(method = %self.method, path = %self.path, status, "duplicate completion ignored");
            return false;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        self.metrics
            .request_finished(&self.method, &self.path, status, elapsed);
        true
    }

    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        if !self.is_finished() {
            tracing::debug!(method = %self.method, path = %self.path, "request dropped before completion");
            self.finish(STATUS_CLIENT_CLOSED);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqmeter_core::Registry;

    fn metrics() -> Arc<HttpMetrics> {
        Arc::new(HttpMetrics::register(&Registry::new(), "t", &[0.1, 1.0]).unwrap())
    }

    #[test]
    fn finishes_exactly_once() {
        let m = metrics();
        let t = RequestTracker::start(Arc::clone(&m), "GET", "/a");
        assert_eq!(m.requests_active.get(), 1.0);
        assert!(t.finish(200));
        assert!(!t.finish(500));
        drop(t);

        assert_eq!(m.requests_total.total(), 1.0);
        assert_eq!(
            m.requests_total
                .value(&[("method", "GET"), ("path", "/a"), ("status", "200")])
                .unwrap(),
            1.0
        );
        assert_eq!(m.requests_active.get(), 0.0);
    }

    #[test]
    fn drop_without_finish_counts_as_client_closed() {
        let m = metrics();
        {
            let _t = RequestTracker::start(Arc::clone(&m), "POST", "/b");
        }
        assert_eq!(
            m.requests_total
                .value(&[("method", "POST"), ("path", "/b"), ("status", "499")])
                .unwrap(),
            1.0
        );
        assert_eq!(m.requests_active.get(), 0.0);
    }

    #[test]
    fn completion_from_another_thread() {
        let m = metrics();
        let t = RequestTracker::start(Arc::clone(&m), "GET", "/c");
        std::thread::spawn(move || {
            t.finish(204);
        })
        .join()
        .unwrap();
        assert_eq!(m.request_duration_seconds.total_count(), 1);
        assert_eq!(m.requests_active.get(), 0.0);
    }
}
