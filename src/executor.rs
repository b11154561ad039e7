//! Synchronous execution engine
//!
//! `TaskUnit::execute` runs the full pipeline on the calling thread:
//! state check, group planning, validation, `exec` (once or per group
//! member), history, output publication, notifications. Errors never escape as `Err`; they end as an
//! [`ExecutionOutcome`] plus Error/Finished notifications.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::algorithm::{ExecutionOutcome, ExecutionState};
use crate::context::ExecContext;
use crate::datastore::{DataObject, Dataset, DatasetGroup};
use crate::error::AlgoError;
use crate::fanout;
use crate::history::{AlgorithmHistory, ExecutionStatus, HistoryCollector, PropertyHistory};
use crate::property::PropertyKind;
use crate::task::TaskUnit;

impl TaskUnit {
    /// Run the algorithm to completion on this thread
    #[instrument(skip(self), fields(algorithm = %self.name, version = self.version))]
    pub fn execute(&mut self) -> ExecutionOutcome {
        match self.state.get() {
            ExecutionState::Initialized => {}
            ExecutionState::Uninitialized => {
                let err = AlgoError::NotInitialized {
                    name: self.name.clone(),
                };
                return self.reject(err, false);
            }
            ExecutionState::Executing => {
                let err = AlgoError::ExecutionInProgress {
                    name: self.name.clone(),
                };
                return self.reject(err, false);
            }
            ExecutionState::Executed | ExecutionState::Failed => {
                let err = AlgoError::AlreadyExecuted {
                    name: self.name.clone(),
                };
                return self.reject(err, false);
            }
        }

        let plan = match fanout::plan(self) {
            Ok(plan) => plan,
            Err(err) => return self.reject(err, true),
        };

        // Grouped runs check their shared inputs here; members check the rest
        let mut problems = self.props.validate();
        match &plan {
            Some(plan) => problems.retain(|name, _| !plan.covers(name)),
            None => problems.extend(self.imp.validate_inputs(&self.props)),
        }
        if !problems.is_empty() {
            let details = problems
                .iter()
                .map(|(name, reason)| format!("{name}: {reason}"))
                .collect::<Vec<_>>()
                .join("; ");
            let err = AlgoError::InvalidInputs {
                algorithm: self.name.clone(),
                details,
            };
            return self.reject(err, true);
        }

        match plan {
            Some(plan) => fanout::run(self, plan),
            None => self.run(),
        }
    }

    /// Execute and turn anything but success into an error
    pub fn execute_checked(&mut self) -> Result<(), AlgoError> {
        let name = self.name.clone();
        self.execute().into_result(&name)
    }

    fn run(&mut self) -> ExecutionOutcome {
        let started = self.begin();
        let collector = HistoryCollector::new();

        let result = {
            let mut ctx = ExecContext {
                name: &self.name,
                props: &mut self.props,
                bus: &self.bus,
                cancel: &self.cancel,
                services: &self.services,
                children: &collector,
                record_history: self.record_history,
            };
            let imp = &mut self.imp;
            panic::catch_unwind(AssertUnwindSafe(|| imp.exec(&mut ctx)))
        };

        let outcome = match result {
            Ok(Ok(())) if self.cancel.is_cancelled() => ExecutionOutcome::Cancelled,
            Ok(Ok(())) => ExecutionOutcome::Success,
            Ok(Err(err)) if err.is_cancelled() => ExecutionOutcome::Cancelled,
            Ok(Err(err)) => ExecutionOutcome::Failed(err.to_string()),
            Err(payload) => ExecutionOutcome::Failed(panic_message(payload)),
        };
        self.finish(outcome, started, collector.take())
    }

    // ═══════════════════════════════════════════════════════════════
    // Shared by plain and fanned-out runs
    // ═══════════════════════════════════════════════════════════════

    /// Enter Executing and announce it
    pub(crate) fn begin(&mut self) -> RunClock {
        self.sync_mirror();
        self.state.set(ExecutionState::Executing);
        self.announce(&format!("{} started", self.name));
        self.bus.started();
        RunClock {
            date: Utc::now(),
            instant: Instant::now(),
        }
    }

    /// Record, publish, change state, notify
    pub(crate) fn finish(
        &mut self,
        outcome: ExecutionOutcome,
        started: RunClock,
        children: Vec<Arc<AlgorithmHistory>>,
    ) -> ExecutionOutcome {
        let duration = started.instant.elapsed();
        let status = match &outcome {
            ExecutionOutcome::Success => ExecutionStatus::Completed,
            ExecutionOutcome::Failed(_) => ExecutionStatus::Failed,
            ExecutionOutcome::Cancelled => ExecutionStatus::Cancelled,
        };

        let record = self
            .record_history
            .then(|| Arc::new(self.build_record(started.date, duration, status, children)));

        if outcome.is_success() {
            self.publish_outputs(record.as_ref());
        }

        if let Some(record) = &record {
            match &self.history_parent {
                Some(collector) => collector.push(Arc::clone(record)),
                None => {
                    self.services.history.append(Arc::clone(record));
                }
            }
        }
        self.last_record = record;

        let state = if outcome.is_success() {
            ExecutionState::Executed
        } else {
            ExecutionState::Failed
        };
        self.sync_mirror();
        self.state.set(state);

        match &outcome {
            ExecutionOutcome::Success => {
                self.announce(&format!(
                    "{} successful, Duration {:.2} seconds",
                    self.name,
                    duration.as_secs_f64()
                ));
                self.bus.finished(true);
            }
            ExecutionOutcome::Failed(message) => {
                self.complain(message);
                self.bus.error(message.clone());
                self.bus.finished(false);
            }
            ExecutionOutcome::Cancelled => {
                if self.logging {
                    warn!(algorithm = %self.name, "execution cancelled");
                } else {
                    debug!(algorithm = %self.name, "execution cancelled");
                }
                self.bus.finished(false);
            }
        }
        outcome
    }

    /// Refuse to run; no Started is ever emitted on this path
    fn reject(&mut self, err: AlgoError, mark_failed: bool) -> ExecutionOutcome {
        let message = err.to_string();
        self.complain(&message);
        if mark_failed {
            self.state.set(ExecutionState::Failed);
        }
        self.bus.error(message.clone());
        self.bus.finished(false);
        ExecutionOutcome::Failed(message)
    }

    fn build_record(
        &self,
        date: DateTime<Utc>,
        duration: Duration,
        status: ExecutionStatus,
        children: Vec<Arc<AlgorithmHistory>>,
    ) -> AlgorithmHistory {
        let properties = self.props.iter().map(PropertyHistory::from).collect();
        AlgorithmHistory::new(
            self.name.clone(),
            self.version,
            date,
            duration,
            status,
            properties,
            children,
        )
    }

    /// Stamp output datasets with provenance and add them to the data store
    ///
    /// Children skip this; their outputs only live in their properties.
    fn publish_outputs(&mut self, record: Option<&Arc<AlgorithmHistory>>) {
        if self.is_child {
            return;
        }

        let lineage = record.map(|record| {
            let mut lineage = self.input_histories();
            lineage.push(Arc::clone(record));
            lineage
        });

        let outputs: Vec<(String, DataObject)> = self
            .props
            .iter()
            .filter(|p| p.direction().is_output() && p.kind() == PropertyKind::Dataset)
            .filter_map(|p| p.value().data_object().map(|o| (p.name().to_string(), o.clone())))
            .collect();

        for (name, object) in outputs {
            let object = match &lineage {
                Some(lineage) => stamp(&object, lineage),
                None => object,
            };
            if let Err(err) = self.props.set(&name, object.clone()) {
                warn!(algorithm = %self.name, property = %name, "cannot stamp output: {err}");
                continue;
            }
            if self.store_outputs && !object.name().is_empty() {
                self.services.data.add(object);
            }
        }
    }

    /// Histories carried by every input dataset, each record once
    fn input_histories(&self) -> Vec<Arc<AlgorithmHistory>> {
        let mut seen = std::collections::HashSet::new();
        self.props
            .iter()
            .filter(|p| p.direction().is_input())
            .filter_map(|p| p.value().data_object())
            .flat_map(DataObject::histories)
            .filter(|h| seen.insert(h.id()))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════
    // Logging
    // ═══════════════════════════════════════════════════════════════

    fn announce(&self, message: &str) {
        if self.logging {
            info!(algorithm = %self.name, "{message}");
        } else {
            debug!(algorithm = %self.name, "{message}");
        }
    }

    fn complain(&self, message: &str) {
        if self.logging {
            error!(algorithm = %self.name, "Error in execution of algorithm {}: {message}", self.name);
        } else {
            debug!(algorithm = %self.name, "Error in execution of algorithm {}: {message}", self.name);
        }
    }
}

/// Wall-clock start plus a monotonic timer for the duration
pub(crate) struct RunClock {
    date: DateTime<Utc>,
    instant: Instant,
}

fn stamp(object: &DataObject, lineage: &[Arc<AlgorithmHistory>]) -> DataObject {
    match object {
        DataObject::Dataset(d) => DataObject::Dataset(Arc::new(stamp_dataset(d, lineage))),
        DataObject::Group(g) => {
            let members = g
                .members()
                .iter()
                .map(|m| Arc::new(stamp_dataset(m, lineage)))
                .collect();
            DataObject::Group(Arc::new(DatasetGroup::new(g.name(), members)))
        }
    }
}

fn stamp_dataset(dataset: &Dataset, lineage: &[Arc<AlgorithmHistory>]) -> Dataset {
    dataset.clone().with_history(lineage.to_vec())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("algorithm panicked: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_from_str_and_string() {
        let p: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(p), "algorithm panicked: boom");
        let p: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(p), "algorithm panicked: bang");
        let p: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(p), "algorithm panicked: unknown panic");
    }
}
