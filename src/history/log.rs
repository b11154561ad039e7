//! Provenance log for top-level executions
//!
//! - `HistoryLog`: thread-safe, append-only log of top-level records
//! - `HistoryCollector`: gathers a running parent's child records until the
//!   parent's own record is written
//!
//! A record only appears here once its unit has finished, so consumers never
//! observe an in-progress entry.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::record::AlgorithmHistory;

/// Thread-safe, append-only history log
#[derive(Clone, Default)]
pub struct HistoryLog {
    records: Arc<RwLock<Vec<Arc<AlgorithmHistory>>>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished record, returning its position
    pub fn append(&self, record: Arc<AlgorithmHistory>) -> usize {
        let mut records = self.records.write();
        records.push(record);
        records.len() - 1
    }

    /// Snapshot of every record, oldest first
    pub fn records(&self) -> Vec<Arc<AlgorithmHistory>> {
        self.records.read().clone()
    }

    pub fn last(&self) -> Option<Arc<AlgorithmHistory>> {
        self.records.read().last().cloned()
    }

    /// Records for one algorithm name
    pub fn filter_name(&self, name: &str) -> Vec<Arc<AlgorithmHistory>> {
        self.records
            .read()
            .iter()
            .filter(|r| r.name() == name)
            .cloned()
            .collect()
    }

    /// Only way to remove records
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Serialize to JSON for persistence/debugging
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.records()).unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLog")
            .field("len", &self.len())
            .finish()
    }
}

/// Child records of one running parent, in completion order
#[derive(Clone, Default)]
pub struct HistoryCollector {
    children: Arc<Mutex<Vec<Arc<AlgorithmHistory>>>>,
}

impl HistoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: Arc<AlgorithmHistory>) {
        self.children.lock().push(record);
    }

    /// Take the collected records, leaving the collector empty
    pub fn take(&self) -> Vec<Arc<AlgorithmHistory>> {
        std::mem::take(&mut *self.children.lock())
    }

    pub fn len(&self) -> usize {
        self.children.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HistoryCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryCollector")
            .field("len", &self.len())
            .finish()
    }
}
