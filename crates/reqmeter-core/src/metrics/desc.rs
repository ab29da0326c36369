//! Metric descriptors and name validation.

use crate::error::{MeterError, Result};

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Immutable definition of a metric family: name, help, kind and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
}

impl Desc {
    /// Build a validated descriptor.
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Self> {
        let name = name.into();
        if !valid_metric_name(&name) {
            return Err(MeterError::InvalidMetricName(name));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(label_names.len());
        for &l in label_names {
            let reserved = kind == MetricKind::Histogram && l == "le";
            if !valid_label_name(l) || reserved || seen.contains(&l) {
                return Err(MeterError::InvalidLabelName {
                    metric: name,
                    label: l.to_string(),
                });
            }
            seen.push(l);
        }

        Ok(Self {
            name,
            help: help.into(),
            kind,
            label_names: label_names.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Join a namespace and a metric name (`ns_name`), or return the name alone.
pub fn fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn valid_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
pub fn valid_label_name(s: &str) -> bool {
    if s.starts_with("__") {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
