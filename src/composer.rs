//! Child algorithms
//!
//! A running algorithm may create and run other algorithms as children.
//! Children never touch the data store, report progress into a sub-range of
//! the parent's, see the parent's cancellation and nest their history under
//! the parent's record.

use std::sync::Arc;

use crate::algorithm::CancelFlag;
use crate::context::ExecContext;
use crate::error::AlgoError;
use crate::history::HistoryCollector;
use crate::notification::{Notification, NotificationBus, NotificationKind, Observer};
use crate::task::TaskUnit;

/// How a child is attached to its parent
#[derive(Debug, Clone)]
pub struct ChildOptions {
    /// Sub-range of the parent's progress; `None` keeps child progress local
    pub progress: Option<(f64, f64)>,
    pub enable_logging: bool,
    /// `None` picks the highest registered version
    pub version: Option<u32>,
    /// Re-emit the child's error notifications on the parent's bus
    pub forward_errors: bool,
}

impl Default for ChildOptions {
    fn default() -> Self {
        Self {
            progress: None,
            enable_logging: true,
            version: None,
            forward_errors: false,
        }
    }
}

impl ChildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(mut self, start: f64, end: f64) -> Self {
        self.progress = Some((start, end));
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn forward_errors(mut self) -> Self {
        self.forward_errors = true;
        self
    }
}

/// What a child borrows from the parent's run
pub(crate) struct ParentLink<'a> {
    pub(crate) bus: &'a Arc<NotificationBus>,
    pub(crate) cancel: &'a CancelFlag,
    pub(crate) collector: &'a HistoryCollector,
    pub(crate) record_history: bool,
}

// ═══════════════════════════════════════════════════════════════
// Forwarders
// ═══════════════════════════════════════════════════════════════

/// Maps child progress `p` to `start + p * (end - start)` on the parent bus
struct ProgressForwarder {
    parent: Arc<NotificationBus>,
    start: f64,
    end: f64,
}

impl Observer for ProgressForwarder {
    fn notify(&self, notification: &Notification) {
        if let NotificationKind::Progress { fraction, message } = &notification.kind {
            let scaled = self.start + fraction * (self.end - self.start);
            self.parent.progress(scaled, message.clone());
        }
    }
}

struct ErrorForwarder {
    parent: Arc<NotificationBus>,
}

impl Observer for ErrorForwarder {
    fn notify(&self, notification: &Notification) {
        if let NotificationKind::Error { message } = &notification.kind {
            self.parent
                .error(format!("{}: {message}", notification.source.name));
        }
    }
}

fn check_range(start: f64, end: f64) -> Result<(), AlgoError> {
    if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) || start > end {
        return Err(AlgoError::validation(
            "progress",
            format!("range [{start}, {end}] must satisfy 0 <= start <= end <= 1"),
        ));
    }
    Ok(())
}

impl TaskUnit {
    /// Turn this unit into a child of the run described by `link`
    pub(crate) fn adopt(&mut self, link: ParentLink<'_>, options: &ChildOptions) -> Result<(), AlgoError> {
        if let Some((start, end)) = options.progress {
            check_range(start, end)?;
            self.progress_range = (start, end);
            self.bus.subscribe(ProgressForwarder {
                parent: Arc::clone(link.bus),
                start,
                end,
            });
        }
        if options.forward_errors {
            self.bus.subscribe(ErrorForwarder {
                parent: Arc::clone(link.bus),
            });
        }
        self.is_child = true;
        self.logging = options.enable_logging;
        self.store_outputs = false;
        self.record_history = link.record_history;
        self.history_parent = Some(link.collector.clone());
        self.cancel = link.cancel.child();
        Ok(())
    }
}

impl ExecContext<'_> {
    /// Create an initialized child of the running algorithm
    pub fn create_child(&self, name: &str, options: ChildOptions) -> Result<TaskUnit, AlgoError> {
        let imp = self.services.factory.create(name, options.version)?;
        let mut child = TaskUnit::new(imp, self.services.clone(), None);
        child.initialize()?;
        child.adopt(
            ParentLink {
                bus: self.bus,
                cancel: self.cancel,
                collector: self.children,
                record_history: self.record_history,
            },
            &options,
        )?;
        Ok(child)
    }
}
