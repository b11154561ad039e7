//! Managed algorithm instances
//!
//! Handles created through the framework are kept here, oldest first, so they
//! can be looked up by id or cancelled together. Above the configured limit
//! the oldest instance that is not running is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::handle::AlgorithmHandle;

/// Unique id of a managed instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AlgorithmId(Uuid);

impl AlgorithmId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlgorithmId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub struct AlgorithmManager {
    instances: Arc<Mutex<VecDeque<AlgorithmHandle>>>,
    max_instances: usize,
}

impl AlgorithmManager {
    pub fn new(max_instances: usize) -> Self {
        Self {
            instances: Arc::new(Mutex::new(VecDeque::new())),
            max_instances: max_instances.max(1),
        }
    }

    /// Track a handle, evicting old idle instances above the limit
    pub fn register(&self, handle: AlgorithmHandle) {
        let mut instances = self.instances.lock();
        instances.push_back(handle);
        while instances.len() > self.max_instances {
            match instances.iter().position(|h| !h.is_running()) {
                Some(idx) => {
                    if let Some(old) = instances.remove(idx) {
                        debug!(name = old.name(), "evicted managed algorithm");
                    }
                }
                None => {
                    warn!(
                        count = instances.len(),
                        "all managed algorithms are running, limit exceeded"
                    );
                    break;
                }
            }
        }
    }

    pub fn get(&self, id: AlgorithmId) -> Option<AlgorithmHandle> {
        self.instances
            .lock()
            .iter()
            .find(|h| h.id() == Some(id))
            .cloned()
    }

    /// Handles whose unit is executing right now
    pub fn running(&self) -> Vec<AlgorithmHandle> {
        self.instances
            .lock()
            .iter()
            .filter(|h| h.is_running())
            .cloned()
            .collect()
    }

    /// Request cancellation of every running instance
    pub fn cancel_all(&self) -> usize {
        let running = self.running();
        for handle in &running {
            handle.cancel();
        }
        running.len()
    }

    pub fn ids(&self) -> Vec<AlgorithmId> {
        self.instances.lock().iter().filter_map(|h| h.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.instances.lock().clear();
    }
}

impl fmt::Debug for AlgorithmManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmManager")
            .field("len", &self.len())
            .field("max_instances", &self.max_instances)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = AlgorithmId::new();
        let b = AlgorithmId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn id_serializes_as_string() {
        let id = AlgorithmId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json.as_str().unwrap(), id.to_string());
    }
}
