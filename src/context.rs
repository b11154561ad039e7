//! Execution context handed to `Algorithm::exec`
//!
//! Borrows the running unit's properties, bus and cancel flag for the
//! duration of one run. Child creation is in `composer`.

use std::sync::Arc;

use crate::algorithm::CancelFlag;
use crate::datastore::{DataStore, Dataset, DatasetGroup};
use crate::error::AlgoError;
use crate::framework::Services;
use crate::history::HistoryCollector;
use crate::notification::NotificationBus;
use crate::property::{FromProperty, PropertyStore, PropertyValue};

pub struct ExecContext<'a> {
    pub(crate) name: &'a str,
    pub(crate) props: &'a mut PropertyStore,
    pub(crate) bus: &'a Arc<NotificationBus>,
    pub(crate) cancel: &'a CancelFlag,
    pub(crate) services: &'a Services,
    pub(crate) children: &'a HistoryCollector,
    pub(crate) record_history: bool,
}

impl<'a> ExecContext<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    // ═══════════════════════════════════════════════════════════════
    // Properties
    // ═══════════════════════════════════════════════════════════════

    pub fn properties(&self) -> &PropertyStore {
        self.props
    }

    pub fn get<T: FromProperty>(&self, name: &str) -> Result<T, AlgoError> {
        self.props.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<(), AlgoError> {
        self.props.set(name, value)
    }

    /// Store `dataset` in an output property under the name the caller chose
    ///
    /// Keeps the dataset's own name when the property has none.
    pub fn set_output_dataset(&mut self, property: &str, dataset: Dataset) -> Result<Arc<Dataset>, AlgoError> {
        let target = self.output_name(property)?;
        let dataset = if target.is_empty() {
            dataset
        } else {
            dataset.renamed(target)
        };
        let dataset = Arc::new(dataset);
        self.props.set(property, Arc::clone(&dataset))?;
        Ok(dataset)
    }

    /// Group counterpart of [`ExecContext::set_output_dataset`]
    pub fn set_output_group(
        &mut self,
        property: &str,
        members: Vec<Arc<Dataset>>,
    ) -> Result<Arc<DatasetGroup>, AlgoError> {
        let target = self.output_name(property)?;
        let group = Arc::new(DatasetGroup::new(target, members));
        self.props.set(property, Arc::clone(&group))?;
        Ok(group)
    }

    fn output_name(&self, property: &str) -> Result<String, AlgoError> {
        match self.props.value(property)? {
            PropertyValue::Data(data_ref) => Ok(data_ref.name.clone()),
            other => Err(AlgoError::TypeMismatch {
                property: property.to_string(),
                expected: "dataset".into(),
                found: other.kind().to_string(),
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Progress and cancellation
    // ═══════════════════════════════════════════════════════════════

    /// Report progress in `[0, 1]`; out-of-range values are clamped
    pub fn progress(&self, fraction: f64, message: impl Into<String>) {
        self.bus.progress(fraction, message);
    }

    /// Returns `Err(Cancelled)` once cancellation was requested
    pub fn interruption_point(&self) -> Result<(), AlgoError> {
        if self.cancel.is_cancelled() {
            return Err(AlgoError::Cancelled);
        }
        Ok(())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ═══════════════════════════════════════════════════════════════
    // Shared services
    // ═══════════════════════════════════════════════════════════════

    pub fn data(&self) -> &DataStore {
        &self.services.data
    }

    pub fn services(&self) -> &Services {
        self.services
    }
}
