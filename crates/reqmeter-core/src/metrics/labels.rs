//! Label sets (series identity within a metric family).

use crate::error::{MeterError, Result};
use crate::metrics::desc::Desc;

/// Label name/value pairs in the family's declared name order.
///
/// Callers may pass pairs in any order; `resolve` normalizes them so that
/// `[("path", "/a"), ("method", "GET")]` and `[("method", "GET"), ("path", "/a")]`
/// address the same series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(Vec<(String, String)>);

impl LabelSet {
    /// The label set of an unlabelled metric.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Match `labels` against the declared names of `desc`.
    pub fn resolve(desc: &Desc, labels: &[(&str, &str)]) -> Result<Self> {
        let mismatch = || MeterError::LabelMismatch {
            metric: desc.name.clone(),
            expected: desc.label_names.clone(),
            got: labels.iter().map(|(k, _)| k.to_string()).collect(),
        };

        if labels.len() != desc.label_names.len() {
            return Err(mismatch());
        }

        let mut pairs = Vec::with_capacity(labels.len());
        for name in &desc.label_names {
            let mut hits = labels.iter().filter(|(k, _)| k == name);
            let (Some((_, v)), None) = (hits.next(), hits.next()) else {
                return Err(mismatch());
            };
            pairs.push((name.clone(), v.to_string()));
        }
        Ok(Self(pairs))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every pair in `pairs` is present with the same value.
    pub fn matches(&self, pairs: &[(&str, &str)]) -> bool {
        pairs.iter().all(|(k, v)| self.get(k) == Some(*v))
    }
}
