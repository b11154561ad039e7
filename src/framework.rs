//! Framework entry point
//!
//! Owns the shared services (registry, data store, history log, worker pool)
//! and the managed-instance list. Use [`Framework::new`] for an isolated
//! instance or [`Framework::global`] for the process-wide one.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, instrument};

use crate::algorithm::Algorithm;
use crate::builtin;
use crate::config::FrameworkConfig;
use crate::datastore::DataStore;
use crate::error::AlgoError;
use crate::factory::AlgorithmFactory;
use crate::handle::AlgorithmHandle;
use crate::history::{HistoryLog, HistoryView, ScriptBuilder, VersionPolicy};
use crate::manager::{AlgorithmId, AlgorithmManager};
use crate::runtime::WorkerPool;
use crate::task::TaskUnit;

static GLOBAL: OnceCell<Framework> = OnceCell::new();

/// What every unit needs from its framework
///
/// Cloned into each unit; holds no reference back to the manager.
#[derive(Clone, Debug)]
pub struct Services {
    pub(crate) factory: AlgorithmFactory,
    pub(crate) data: DataStore,
    pub(crate) history: HistoryLog,
    pub(crate) pool: WorkerPool,
    pub(crate) config: Arc<FrameworkConfig>,
}

impl Services {
    pub fn factory(&self) -> &AlgorithmFactory {
        &self.factory
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}

#[derive(Clone, Debug)]
pub struct Framework {
    services: Services,
    manager: AlgorithmManager,
}

impl Framework {
    /// Empty framework with nothing registered
    pub fn new(config: FrameworkConfig) -> Result<Self, AlgoError> {
        let pool = WorkerPool::new(config.worker_threads)?;
        let manager = AlgorithmManager::new(config.max_managed_instances);
        debug!(workers = pool.size(), "framework created");
        Ok(Self {
            services: Services {
                factory: AlgorithmFactory::new(),
                data: DataStore::new(),
                history: HistoryLog::new(),
                pool,
                config: Arc::new(config),
            },
            manager,
        })
    }

    /// Framework with the built-in algorithms registered
    pub fn with_builtins(config: FrameworkConfig) -> Result<Self, AlgoError> {
        let framework = Self::new(config)?;
        builtin::register_builtins(framework.factory())?;
        Ok(framework)
    }

    /// Process-wide framework, built from the environment on first use
    pub fn global() -> Result<&'static Framework, AlgoError> {
        GLOBAL.get_or_try_init(|| Self::with_builtins(FrameworkConfig::from_env()))
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn factory(&self) -> &AlgorithmFactory {
        &self.services.factory
    }

    pub fn data(&self) -> &DataStore {
        &self.services.data
    }

    pub fn history(&self) -> &HistoryLog {
        &self.services.history
    }

    pub fn manager(&self) -> &AlgorithmManager {
        &self.manager
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.services.config
    }

    /// Managed, initialized instance
    #[instrument(skip(self))]
    pub fn create(&self, name: &str, version: Option<u32>) -> Result<AlgorithmHandle, AlgoError> {
        let imp = self.services.factory.create(name, version)?;
        let mut unit = TaskUnit::new(imp, self.services.clone(), Some(AlgorithmId::new()));
        unit.initialize()?;
        let handle = AlgorithmHandle::new(unit);
        self.manager.register(handle.clone());
        Ok(handle)
    }

    /// Unmanaged, uninitialized unit owned by the caller
    pub fn create_unmanaged(&self, name: &str, version: Option<u32>) -> Result<TaskUnit, AlgoError> {
        let imp = self.services.factory.create(name, version)?;
        Ok(TaskUnit::new(imp, self.services.clone(), None))
    }

    /// Wrap an algorithm value that was never registered
    pub fn wrap(&self, imp: Box<dyn Algorithm>) -> TaskUnit {
        TaskUnit::new(imp, self.services.clone(), None)
    }

    /// Rolled view over the top-level history
    pub fn history_view(&self) -> HistoryView {
        HistoryView::from_log(&self.services.history)
    }

    /// Replay script for the whole session, every node rolled
    pub fn script(&self, versions: VersionPolicy) -> String {
        let view = self.history_view();
        ScriptBuilder::new(&view).with_versions(versions).build()
    }

    /// Drop managed instances, stored data and history
    pub fn clear(&self) {
        self.manager.clear();
        self.services.data.clear();
        self.services.history.clear();
    }
}
