//! Immutable history records
//!
//! One `AlgorithmHistory` per execution that got past its Started
//! notification. Children are nested in call order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::property::{Direction, Property, PropertyKind};

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing record id
pub(crate) fn next_record_id() -> u64 {
    NEXT_RECORD_ID.fetch_add(1, Ordering::SeqCst)
}

/// How the recorded execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Failed,
    Cancelled,
}

/// Final value of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyHistory {
    pub name: String,
    pub value: String,
    pub kind: PropertyKind,
    pub direction: Direction,
    pub is_default: bool,
}

impl From<&Property> for PropertyHistory {
    fn from(p: &Property) -> Self {
        Self {
            name: p.name().to_string(),
            value: p.value_text(),
            kind: p.kind(),
            direction: p.direction(),
            is_default: p.is_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmHistory {
    id: u64,
    name: String,
    version: u32,
    exec_date: DateTime<Utc>,
    duration: Duration,
    status: ExecutionStatus,
    properties: Vec<PropertyHistory>,
    children: Vec<Arc<AlgorithmHistory>>,
}

impl AlgorithmHistory {
    pub fn new(
        name: impl Into<String>,
        version: u32,
        exec_date: DateTime<Utc>,
        duration: Duration,
        status: ExecutionStatus,
        properties: Vec<PropertyHistory>,
        children: Vec<Arc<AlgorithmHistory>>,
    ) -> Self {
        Self {
            id: next_record_id(),
            name: name.into(),
            version,
            exec_date,
            duration,
            status,
            properties,
            children,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn exec_date(&self) -> DateTime<Utc> {
        self.exec_date
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    pub fn properties(&self) -> &[PropertyHistory] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyHistory> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn children(&self) -> &[Arc<AlgorithmHistory>] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of records in this subtree, including self
    pub fn tree_size(&self) -> usize {
        1 + self.children.iter().map(|c| c.tree_size()).sum::<usize>()
    }
}

impl fmt::Display for AlgorithmHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {} v{}", self.name, self.version)?;
        writeln!(f, "Execution Date: {}", self.exec_date.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(
            f,
            "Execution Duration: {:.3} seconds",
            self.duration.as_secs_f64()
        )?;
        writeln!(f, "Status: {:?}", self.status)?;
        writeln!(f, "Parameters:")?;
        for p in &self.properties {
            writeln!(
                f,
                "  Name: {}, Value: {}, Default?: {}, Direction: {}",
                p.name,
                p.value,
                if p.is_default { "Yes" } else { "No" },
                p.direction
            )?;
        }
        Ok(())
    }
}
