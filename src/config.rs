//! Framework configuration
//!
//! Read from YAML; every key is optional. `ALGORUN_WORKERS` overrides the
//! worker count after the file is applied.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlgoError;

pub const WORKERS_ENV: &str = "ALGORUN_WORKERS";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameworkConfig {
    /// Threads in the shared worker pool
    pub worker_threads: usize,
    /// Managed instances kept before the oldest idle one is dropped
    pub max_managed_instances: usize,
    /// Whether new units record history by default
    pub record_history: bool,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            max_managed_instances: 100,
            record_history: true,
        }
    }
}

impl FrameworkConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, AlgoError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AlgoError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            AlgoError::Config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let config = Self::default();
        config.apply_env().unwrap_or_default()
    }

    pub fn apply_env(self) -> Result<Self, AlgoError> {
        match std::env::var(WORKERS_ENV) {
            Ok(raw) => self.with_workers_override(&raw),
            Err(_) => Ok(self),
        }
    }

    fn with_workers_override(mut self, raw: &str) -> Result<Self, AlgoError> {
        self.worker_threads = raw
            .trim()
            .parse()
            .map_err(|_| AlgoError::Config(format!("{WORKERS_ENV}='{raw}' is not a number")))?;
        self.check()
    }

    fn check(self) -> Result<Self, AlgoError> {
        if self.worker_threads == 0 {
            return Err(AlgoError::Config("worker_threads must be at least 1".into()));
        }
        if self.max_managed_instances == 0 {
            return Err(AlgoError::Config(
                "max_managed_instances must be at least 1".into(),
            ));
        }
        Ok(self)
    }
}
