use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::{MatchedPath, Request};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::{Layer, Service};

use crate::config::{MetricsSection, UnmatchedPaths};
use crate::middleware::tracker::RequestTracker;
use crate::obs::HttpMetrics;

/// Strip trailing slashes; the root stays `/`.
pub fn canonical_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Label for the request verb. Extension methods share one placeholder so
/// arbitrary verbs cannot create new series.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::CONNECT => "CONNECT",
        Method::OPTIONS => "OPTIONS",
        Method::TRACE => "TRACE",
        Method::PATCH => "PATCH",
        _ => "other",
    }
}

/// How the `path` label is derived.
#[derive(Debug, Clone)]
pub struct PathLabels {
    pub unmatched: UnmatchedPaths,
    pub unmatched_label: String,
}

impl PathLabels {
    pub fn from_config(cfg: &MetricsSection) -> Self {
        Self {
            unmatched: cfg.unmatched_paths,
            unmatched_label: cfg.unmatched_label.clone(),
        }
    }

    /// Route template when a route matched, otherwise per policy.
    pub fn label_for(&self, req: &Request) -> String {
        if let Some(matched) = req.extensions().get::<MatchedPath>() {
            return matched.as_str().to_owned();
        }
        match self.unmatched {
            UnmatchedPaths::Collapse => self.unmatched_label.clone(),
            UnmatchedPaths::Raw => req.uri().path().to_owned(),
        }
    }
}

struct Shared {
    metrics: Arc<HttpMetrics>,
    exposition_path: String,
    paths: PathLabels,
}

/// Tower layer for request metrics.
#[derive(Clone)]
pub struct MetricsLayer {
    shared: Arc<Shared>,
}

impl MetricsLayer {
    pub fn new(metrics: Arc<HttpMetrics>, cfg: &MetricsSection) -> Self {
        Self {
            shared: Arc::new(Shared {
                metrics,
                exposition_path: canonical_path(&cfg.path).to_owned(),
                paths: PathLabels::from_config(cfg),
            }),
        }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Tower service for request metrics.
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    shared: Arc<Shared>,
}

impl<S> Service<Request> for MetricsService<S>
where
    S: Service<Request, Response = Response>,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // Self-scrape exclusion.
        let matched_exposition = req
            .extensions()
            .get::<MatchedPath>()
            .is_some_and(|m| m.as_str() == self.shared.exposition_path);
        if matched_exposition || canonical_path(req.uri().path()) == self.shared.exposition_path {
            return Box::pin(self.inner.call(req));
        }

        let path = self.shared.paths.label_for(&req);
        let tracker = RequestTracker::start(
            Arc::clone(&self.shared.metrics),
            method_label(req.method()),
            path,
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => {
                    let status = match &result {
                        Ok(response) => response.status(),
                        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    };
                    tracker.finish(status.as_u16());
                    result
                }
                Err(panic) => {
                    tracker.finish(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                    std::panic::resume_unwind(panic)
                }
            }
        })
    }
}
