//! Metrics registry.
//!
//! Owns every registered collector and enforces that each family name is
//! registered once. Construct one per process (or one per test) and pass it
//! explicitly to whoever needs it; there is no global instance.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{MeterError, Result};
use crate::metrics::Desc;
use crate::snapshot::{FamilySnapshot, Snapshot};

/// A source of metric families.
///
/// Built-in primitives implement this; custom sources (process stats,
/// derived values) implement it to be scraped alongside them.
pub trait Collector: Send + Sync {
    /// Descriptors of every family this collector produces.
    fn describe(&self) -> Vec<Desc>;

    /// Current state. Must not block on in-flight work.
    fn collect(&self) -> Vec<FamilySnapshot>;
}

struct Entry {
    names: Vec<String>,
    collector: Arc<dyn Collector>,
}

#[derive(Default)]
pub struct Registry {
    entries: RwLock<Vec<Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Fails if any of its family names is taken.
    pub fn register<C>(&self, collector: Arc<C>) -> Result<()>
    where
        C: Collector + 'static,
    {
        let names: Vec<String> = collector.describe().into_iter().map(|d| d.name).collect();

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut taken: HashSet<&str> = entries
            .iter()
            .flat_map(|e| e.names.iter().map(String::as_str))
            .collect();
        for n in &names {
            if !taken.insert(n.as_str()) {
                return Err(MeterError::DuplicateMetricName(n.clone()));
            }
        }
        drop(taken);

        tracing::debug!(families = ?names, "collector registered");
        entries.push(Entry {
            names,
            collector: collector as Arc<dyn Collector>,
        });
        Ok(())
    }

    /// Registered family names, in registration order.
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().flat_map(|e| e.names.iter().cloned()).collect()
    }

    /// Collect every family, in registration order.
    ///
    /// The registry lock is released before collectors run, so a slow
    /// collector never blocks registration.
    pub fn snapshot(&self) -> Snapshot {
        let collectors: Vec<Arc<dyn Collector>> = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries.iter().map(|e| Arc::clone(&e.collector)).collect()
        };

        Snapshot {
            families: collectors.iter().flat_map(|c| c.collect()).collect(),
        }
    }
}
