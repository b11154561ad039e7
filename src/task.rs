//! Algorithm instance lifecycle
//!
//! A [`TaskUnit`] wraps one [`Algorithm`] value with everything the
//! framework tracks about it: state, properties, notification bus, cancel
//! flag, child status and history settings. Execution itself lives in
//! `executor`, child wiring in `composer`.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::algorithm::{Algorithm, CancelFlag, ExecutionState, StateCell};
use crate::error::AlgoError;
use crate::framework::Services;
use crate::handle::AlgorithmHandle;
use crate::history::{AlgorithmHistory, HistoryCollector};
use crate::manager::AlgorithmId;
use crate::notification::{NotificationBus, Observer, ObserverId, Source};
use crate::property::{FromProperty, PropertyStore, PropertyValue};

pub struct TaskUnit {
    pub(crate) imp: Box<dyn Algorithm>,
    pub(crate) name: String,
    pub(crate) version: u32,
    pub(crate) props: PropertyStore,
    pub(crate) state: StateCell,
    pub(crate) bus: Arc<NotificationBus>,
    pub(crate) cancel: CancelFlag,
    pub(crate) id: Option<AlgorithmId>,
    pub(crate) is_child: bool,
    pub(crate) progress_range: (f64, f64),
    pub(crate) logging: bool,
    pub(crate) record_history: bool,
    pub(crate) store_outputs: bool,
    pub(crate) history_parent: Option<HistoryCollector>,
    pub(crate) services: Services,
    pub(crate) last_record: Option<Arc<AlgorithmHistory>>,
    /// Copy of the properties readable while the unit is locked by a run
    pub(crate) mirror: Option<Arc<RwLock<PropertyStore>>>,
}

impl TaskUnit {
    pub(crate) fn new(imp: Box<dyn Algorithm>, services: Services, id: Option<AlgorithmId>) -> Self {
        let name = imp.name().to_string();
        let version = imp.version();
        let bus = Arc::new(NotificationBus::new(Source {
            name: name.clone(),
            version,
            id,
        }));
        Self {
            props: PropertyStore::new(name.clone()),
            record_history: services.config.record_history,
            imp,
            name,
            version,
            state: StateCell::new(),
            bus,
            cancel: CancelFlag::new(),
            id,
            is_child: false,
            progress_range: (0.0, 1.0),
            logging: true,
            store_outputs: true,
            history_parent: None,
            services,
            last_record: None,
            mirror: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Identity
    // ═══════════════════════════════════════════════════════════════

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn category(&self) -> &str {
        self.imp.category()
    }

    pub fn summary(&self) -> &str {
        self.imp.summary()
    }

    /// Present for managed instances only
    pub fn id(&self) -> Option<AlgorithmId> {
        self.id
    }

    // ═══════════════════════════════════════════════════════════════
    // Initialization
    // ═══════════════════════════════════════════════════════════════

    /// Declare properties; exactly once per unit
    pub fn initialize(&mut self) -> Result<(), AlgoError> {
        if self.state.get() != ExecutionState::Uninitialized {
            return Err(AlgoError::AlreadyInitialized {
                name: self.name.clone(),
            });
        }
        if self.name.is_empty() {
            return Err(AlgoError::AbstractMethod {
                what: "name".into(),
            });
        }
        if self.version == 0 {
            return Err(AlgoError::AbstractMethod {
                what: "version".into(),
            });
        }
        let mut props = PropertyStore::new(self.name.clone());
        self.imp.init(&mut props)?;
        debug!(algorithm = %self.name, properties = props.len(), "initialized");
        self.props = props;
        self.state.set(ExecutionState::Initialized);
        self.sync_mirror();
        Ok(())
    }

    /// Throw away all property values and declare them afresh
    pub fn reinitialize(&mut self) -> Result<(), AlgoError> {
        self.ensure_idle()?;
        self.state.set(ExecutionState::Uninitialized);
        self.cancel.reset();
        self.last_record = None;
        self.initialize()
    }

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

    fn ensure_idle(&self) -> Result<(), AlgoError> {
        if self.is_running() {
            return Err(AlgoError::ExecutionInProgress {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════
    // Properties
    // ═══════════════════════════════════════════════════════════════

    pub fn properties(&self) -> &PropertyStore {
        &self.props
    }

    /// Typed write
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<(), AlgoError> {
        self.ensure_idle()?;
        self.props.set(name, value)?;
        self.after_property_change();
        Ok(())
    }

    /// Text write; dataset inputs are looked up in the data store
    pub fn set_property_value(&mut self, name: &str, text: &str) -> Result<(), AlgoError> {
        self.ensure_idle()?;
        self.props.set_text(name, text, &self.services.data)?;
        self.after_property_change();
        Ok(())
    }

    pub fn get_property<T: FromProperty>(&self, name: &str) -> Result<T, AlgoError> {
        self.props.get(name)
    }

    pub fn get_property_value(&self, name: &str) -> Result<String, AlgoError> {
        self.props.get_text(name)
    }

    /// A finished unit becomes runnable again once an input changes
    fn after_property_change(&mut self) {
        if self.state.get().is_terminal() {
            self.state.set(ExecutionState::Initialized);
            self.cancel.reset();
        }
        self.sync_mirror();
    }

    pub(crate) fn sync_mirror(&self) {
        if let Some(mirror) = &self.mirror {
            *mirror.write() = self.props.clone();
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Cancellation, observers, settings
    // ═══════════════════════════════════════════════════════════════

    /// Ask the running work to stop at its next interruption point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
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

    pub fn set_logging(&mut self, enabled: bool) {
        self.logging = enabled;
    }

    pub fn is_logging(&self) -> bool {
        self.logging
    }

    pub fn set_record_history(&mut self, enabled: bool) {
        self.record_history = enabled;
    }

    pub fn records_history(&self) -> bool {
        self.record_history
    }

    /// Whether successful top-level outputs are added to the data store
    pub fn set_store_outputs(&mut self, enabled: bool) {
        self.store_outputs = enabled;
    }

    pub fn is_child(&self) -> bool {
        self.is_child
    }

    pub fn progress_range(&self) -> (f64, f64) {
        self.progress_range
    }

    /// Record of the most recent run, if history was recorded
    pub fn last_history(&self) -> Option<Arc<AlgorithmHistory>> {
        self.last_record.clone()
    }

    /// Share this unit across threads
    pub fn into_handle(self) -> AlgorithmHandle {
        AlgorithmHandle::new(self)
    }
}

impl fmt::Debug for TaskUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskUnit")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("state", &self.state.get())
            .field("is_child", &self.is_child)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameworkConfig;
    use crate::context::ExecContext;
    use crate::framework::Framework;
    use crate::property::Property;
    use crate::validator::Bounded;

    #[derive(Default)]
    struct Doubler;

    impl Algorithm for Doubler {
        fn name(&self) -> &str {
            "Doubler"
        }
        fn version(&self) -> u32 {
            1
        }
        fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
            props.declare(Property::input("Value", 1.0).with_validator(Bounded::at_least(0.0)))?;
            props.declare(Property::output("Result", 0.0))
        }
        fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
            let v: f64 = ctx.get("Value")?;
            ctx.set("Result", v * 2.0)
        }
    }

    struct Nameless;

    impl Algorithm for Nameless {
        fn name(&self) -> &str {
            ""
        }
        fn version(&self) -> u32 {
            1
        }
        fn init(&mut self, _props: &mut PropertyStore) -> Result<(), AlgoError> {
            Ok(())
        }
        fn exec(&mut self, _ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
            Ok(())
        }
    }

    fn unit() -> TaskUnit {
        let fw = Framework::new(FrameworkConfig::default()).unwrap();
        fw.wrap(Box::new(Doubler))
    }

    #[test]
    fn initialize_once() {
        let mut u = unit();
        assert!(!u.is_initialized());
        u.initialize().unwrap();
        assert!(u.is_initialized());
        assert!(matches!(
            u.initialize().unwrap_err(),
            AlgoError::AlreadyInitialized { .. }
        ));
    }

    #[test]
    fn nameless_algorithm_is_abstract() {
        let fw = Framework::new(FrameworkConfig::default()).unwrap();
        let mut u = fw.wrap(Box::new(Nameless));
        assert!(matches!(
            u.initialize().unwrap_err(),
            AlgoError::AbstractMethod { .. }
        ));
    }

    #[test]
    fn property_before_initialize_not_found() {
        let mut u = unit();
        assert!(matches!(
            u.set_property("Value", 2.0).unwrap_err(),
            AlgoError::PropertyNotFound { .. }
        ));
    }

    #[test]
    fn text_round_trip() {
        let mut u = unit();
        u.initialize().unwrap();
        u.set_property_value("value", "2.5").unwrap();
        assert_eq!(u.get_property_value("Value").unwrap(), "2.5");
        assert_eq!(u.get_property::<f64>("VALUE").unwrap(), 2.5);
    }

    #[test]
    fn invalid_value_keeps_previous() {
        let mut u = unit();
        u.initialize().unwrap();
        u.set_property("Value", 3.0).unwrap();
        assert!(u.set_property("Value", -1.0).is_err());
        assert_eq!(u.get_property::<f64>("Value").unwrap(), 3.0);
    }

    #[test]
    fn property_change_rearms_finished_unit() {
        let mut u = unit();
        u.initialize().unwrap();
        assert!(u.execute().is_success());
        assert!(u.is_executed());
        u.set_property("Value", 4.0).unwrap();
        assert_eq!(u.state(), ExecutionState::Initialized);
        assert!(u.execute().is_success());
        assert_eq!(u.get_property::<f64>("Result").unwrap(), 8.0);
    }

    #[test]
    fn reinitialize_restores_defaults() {
        let mut u = unit();
        u.initialize().unwrap();
        u.set_property("Value", 7.0).unwrap();
        u.reinitialize().unwrap();
        assert_eq!(u.get_property::<f64>("Value").unwrap(), 1.0);
    }
}
