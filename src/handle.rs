//! Shareable algorithm handle
//!
//! Wraps a [`TaskUnit`] in `Arc<Mutex<..>>` so it can be driven from several
//! threads and run on the worker pool. State, cancellation and the bus are
//! reachable without taking the lock, so they keep working during a run.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::algorithm::{CancelFlag, ExecutionOutcome, ExecutionState, StateCell};
use crate::error::AlgoError;
use crate::history::AlgorithmHistory;
use crate::manager::AlgorithmId;
use crate::notification::{NotificationBus, Observer, ObserverId};
use crate::property::{FromProperty, PropertyStore, PropertyValue};
use crate::runtime::{ExecutionFuture, WorkerPool};
use crate::task::TaskUnit;

#[derive(Clone)]
pub struct AlgorithmHandle {
    id: Option<AlgorithmId>,
    name: Arc<str>,
    version: u32,
    unit: Arc<Mutex<TaskUnit>>,
    bus: Arc<NotificationBus>,
    cancel: CancelFlag,
    state: StateCell,
    mirror: Arc<RwLock<PropertyStore>>,
    in_flight: Arc<AtomicBool>,
    pool: WorkerPool,
}

impl AlgorithmHandle {
    pub fn new(mut unit: TaskUnit) -> Self {
        let mirror = Arc::new(RwLock::new(unit.props.clone()));
        unit.mirror = Some(Arc::clone(&mirror));
        Self {
            id: unit.id,
            name: Arc::from(unit.name.as_str()),
            version: unit.version,
            bus: Arc::clone(&unit.bus),
            cancel: unit.cancel.clone(),
            state: unit.state.clone(),
            pool: unit.services.pool.clone(),
            mirror,
            in_flight: Arc::new(AtomicBool::new(false)),
            unit: Arc::new(Mutex::new(unit)),
        }
    }

    pub fn id(&self) -> Option<AlgorithmId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    // ═══════════════════════════════════════════════════════════════
    // Lock-free queries
    // ═══════════════════════════════════════════════════════════════

    pub fn state(&self) -> ExecutionState {
        self.state.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get() != ExecutionState::Uninitialized
    }

    pub fn is_executed(&self) -> bool {
        self.state.get() == ExecutionState::Executed
    }

    pub fn is_running(&self) -> bool {
        self.state.get() == ExecutionState::Executing
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    pub fn subscribe(&self, observer: impl Observer + 'static) -> ObserverId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ═══════════════════════════════════════════════════════════════
    // Properties
    // ═══════════════════════════════════════════════════════════════

    fn ensure_idle(&self) -> Result<(), AlgoError> {
        if self.is_running() || self.in_flight.load(Ordering::SeqCst) {
            return Err(AlgoError::ExecutionInProgress {
                name: self.name.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> Result<(), AlgoError> {
        self.ensure_idle()?;
        self.unit.lock().set_property(name, value)
    }

    pub fn set_property_value(&self, name: &str, text: &str) -> Result<(), AlgoError> {
        self.ensure_idle()?;
        self.unit.lock().set_property_value(name, text)
    }

    /// Reads go through the last published snapshot, so they never wait on a run
    pub fn get_property<T: FromProperty>(&self, name: &str) -> Result<T, AlgoError> {
        self.mirror.read().get(name)
    }

    pub fn get_property_value(&self, name: &str) -> Result<String, AlgoError> {
        self.mirror.read().get_text(name)
    }

    pub fn property_names(&self) -> Vec<String> {
        self.mirror
            .read()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════
    // Execution
    // ═══════════════════════════════════════════════════════════════

    /// Run on the calling thread; waits for any run already holding the unit
    pub fn execute(&self) -> ExecutionOutcome {
        self.unit.lock().execute()
    }

    /// Run on the worker pool
    ///
    /// At most one asynchronous run per handle may be pending.
    pub fn execute_async(&self) -> Result<ExecutionFuture, AlgoError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(AlgoError::AsyncInFlight {
                name: self.name.to_string(),
            });
        }
        let unit = Arc::clone(&self.unit);
        let in_flight = Arc::clone(&self.in_flight);
        let rx = self.pool.submit(move || {
            let _clear = ClearOnDrop(in_flight);
            unit.lock().execute()
        });
        Ok(ExecutionFuture::new(self.name.to_string(), rx))
    }

    pub fn last_history(&self) -> Option<Arc<AlgorithmHistory>> {
        self.unit.lock().last_history()
    }

    /// Exclusive access to the unit; blocks while a run holds it
    pub fn with_unit<R>(&self, f: impl FnOnce(&mut TaskUnit) -> R) -> R {
        f(&mut self.unit.lock())
    }
}

/// Clears the in-flight flag even if the worker unwinds
struct ClearOnDrop(Arc<AtomicBool>);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl fmt::Debug for AlgorithmHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("state", &self.state.get())
            .finish()
    }
}
