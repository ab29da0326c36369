//! Line-oriented text exposition encoder.
//!
//! Each series is rendered into its own buffer first and only appended when
//! it encodes cleanly, so one broken series is logged and skipped instead of
//! failing the whole scrape.

use std::fmt::Write;

use crate::error::{MeterError, Result};
use crate::metrics::LabelSet;
use crate::snapshot::{FamilySnapshot, SeriesSnapshot, SeriesValue, Snapshot};

/// Media type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encoded scrape body plus the number of series that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposition {
    pub body: String,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextEncoder;

impl TextEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    /// Render every family. Never fails as a whole.
    pub fn encode(&self, snapshot: &Snapshot) -> Exposition {
        let mut body = String::new();
        let mut skipped = 0;

        for family in &snapshot.families {
            let _ = writeln!(body, "# HELP {} {}", family.name, escape_help(&family.help));
            let _ = writeln!(body, "# TYPE {} {}", family.name, family.kind.as_str());

            for err in &family.errors {
                tracing::warn!(metric = %family.name, error = %err, "series collect failed; skipped");
                skipped += 1;
            }

            for series in &family.series {
                let mut line = String::new();
                match render_series(&mut line, family, series) {
                    Ok(()) => body.push_str(&line),
                    Err(e) => {
                        tracing::warn!(metric = %family.name, error = %e, "series encode failed; skipped");
                        skipped += 1;
                    }
                }
            }
        }

        Exposition { body, skipped }
    }
}

fn render_series(out: &mut String, family: &FamilySnapshot, series: &SeriesSnapshot) -> Result<()> {
    let name = &family.name;
    let labels = render_labels(&series.labels, None);

    match &series.value {
        SeriesValue::Counter(v) => {
            if !v.is_finite() || *v < 0.0 {
                return Err(MeterError::Encode(format!("{name}: invalid counter value {v}")));
            }
            let _ = writeln!(out, "{name}{labels} {}", fmt_float(*v));
        }
        SeriesValue::Gauge(v) => {
            let _ = writeln!(out, "{name}{labels} {}", fmt_float(*v));
        }
        SeriesValue::Histogram(h) => {
            if !h.is_consistent() {
                return Err(MeterError::Encode(format!("{name}: inconsistent histogram buckets")));
            }
            for (bound, count) in &h.buckets {
                let le = render_labels(&series.labels, Some(&fmt_float(*bound)));
                let _ = writeln!(out, "{name}_bucket{le} {count}");
            }
            let inf = render_labels(&series.labels, Some("+Inf"));
            let _ = writeln!(out, "{name}_bucket{inf} {}", h.count);
            let _ = writeln!(out, "{name}_sum{labels} {}", fmt_float(h.sum));
            let _ = writeln!(out, "{name}_count{labels} {}", h.count);
        }
    }
    Ok(())
}

/// `{k="v",...}`, with an optional trailing `le` label; empty string if no labels.
fn render_labels(labels: &LabelSet, le: Option<&str>) -> String {
    let mut parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
        .collect();
    if let Some(le) = le {
        parts.push(format!("le=\"{le}\""));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metrics::{Desc, HistogramVec, MetricKind};
    use crate::snapshot::HistogramSnapshot;
    use crate::{CounterVec, Registry};
    use std::sync::Arc;

    #[test]
    fn counter_lines() {
        let r = Registry::new();
        let c = Arc::new(CounterVec::new("http_requests_total", "Total requests", &["method", "path"]).unwrap());
        r.register(Arc::clone(&c)).unwrap();
        c.inc(&[("method", "GET"), ("path", "/api/data")]).unwrap();

        let out = TextEncoder::new().encode(&r.snapshot());
        assert_eq!(out.skipped, 0);
        assert_eq!(
            out.body,
            "# HELP http_requests_total Total requests\n\
             # TYPE http_requests_total counter\n\
             http_requests_total{method=\"GET\",path=\"/api/data\"} 1\n"
        );
    }

    #[test]
    fn histogram_lines() {
        let r = Registry::new();
        let h = Arc::new(HistogramVec::new("d_seconds", "Durations", &[], &[0.1, 1.0]).unwrap());
        r.register(Arc::clone(&h)).unwrap();
        h.observe(&[], 0.1).unwrap();
        h.observe(&[], 2.0).unwrap();

        let body = TextEncoder::new().encode(&r.snapshot()).body;
        assert!(body.contains("d_seconds_bucket{le=\"0.1\"} 1\n"));
        assert!(body.contains("d_seconds_bucket{le=\"1\"} 1\n"));
        assert!(body.contains("d_seconds_bucket{le=\"+Inf\"} 2\n"));
        assert!(body.contains("d_seconds_sum 2.1\n"));
        assert!(body.contains("d_seconds_count 2\n"));
    }

    #[test]
    fn label_values_are_escaped() {
        let labels = LabelSet::resolve(
            &Desc::new("x", "x", MetricKind::Gauge, &["p"]).unwrap(),
            &[("p", "a\"b\\c\nd")],
        )
        .unwrap();
        assert_eq!(render_labels(&labels, None), "{p=\"a\\\"b\\\\c\\nd\"}");
    }

    #[test]
    fn broken_series_is_isolated() {
        let desc = Desc::new("h_seconds", "h", MetricKind::Histogram, &["k"]).unwrap();
        let good = SeriesSnapshot {
            labels: LabelSet::resolve(&desc, &[("k", "good")]).unwrap(),
            value: SeriesValue::Histogram(HistogramSnapshot {
                buckets: vec![(1.0, 1)],
                sum: 0.5,
                count: 1,
            }),
        };
        let bad = SeriesSnapshot {
            labels: LabelSet::resolve(&desc, &[("k", "bad")]).unwrap(),
            value: SeriesValue::Histogram(HistogramSnapshot {
                buckets: vec![(1.0, 5)],
                sum: 0.5,
                count: 1,
            }),
        };
        let snap = Snapshot {
            families: vec![FamilySnapshot::new(&desc, vec![good, bad])
                .with_errors(vec![MeterError::Collect("boom".into())])],
        };

        let out = TextEncoder::new().encode(&snap);
        assert_eq!(out.skipped, 2);
        assert!(out.body.contains("h_seconds_count{k=\"good\"} 1"));
        assert!(!out.body.contains("k=\"bad\""));
    }

    #[test]
    fn float_formatting() {
        assert_eq!(fmt_float(1.0), "1");
        assert_eq!(fmt_float(0.005), "0.005");
        assert_eq!(fmt_float(f64::INFINITY), "+Inf");
    }
}
