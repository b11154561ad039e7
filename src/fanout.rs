//! Group fan-out
//!
//! When dataset inputs hold groups, the algorithm runs once per member as a
//! child, members zipped by position. Member `i` of `n` reports progress in
//! `[i/n, (i+1)/n]` and writes outputs named `{output}_{i+1}`. The first
//! failing member stops the run; members that already succeeded are kept in
//! the output groups.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::algorithm::ExecutionOutcome;
use crate::composer::{ChildOptions, ParentLink};
use crate::datastore::{Dataset, DatasetGroup};
use crate::error::AlgoError;
use crate::history::HistoryCollector;
use crate::property::{DataRef, PropertyKind, PropertyValue};
use crate::task::TaskUnit;

pub(crate) struct GroupPlan {
    /// Input property name and the group it holds
    inputs: Vec<(String, Arc<DatasetGroup>)>,
    size: usize,
}

impl GroupPlan {
    /// Whether `property` is one of the grouped inputs
    pub(crate) fn covers(&self, property: &str) -> bool {
        self.inputs.iter().any(|(name, _)| name.eq_ignore_ascii_case(property))
    }
}

/// Output dataset property and the group name it was given
struct OutputSlot {
    property: String,
    base: String,
    members: Vec<Arc<Dataset>>,
}

/// Group inputs to fan out over, if any
pub(crate) fn plan(unit: &TaskUnit) -> Result<Option<GroupPlan>, AlgoError> {
    if !unit.imp.process_groups_individually() {
        return Ok(None);
    }
    let inputs: Vec<(String, Arc<DatasetGroup>)> = unit
        .props
        .iter()
        .filter(|p| p.direction().is_input())
        .filter_map(|p| {
            p.value()
                .data_object()
                .and_then(|o| o.as_group())
                .map(|g| (p.name().to_string(), Arc::clone(g)))
        })
        .collect();

    let Some((_, first)) = inputs.first() else {
        return Ok(None);
    };
    let size = first.len();
    if inputs.iter().any(|(_, g)| g.len() != size) {
        let sizes = inputs
            .iter()
            .map(|(name, g)| format!("{name}={}", g.len()))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AlgoError::GroupSizeMismatch {
            algorithm: unit.name.clone(),
            sizes,
        });
    }
    Ok(Some(GroupPlan { inputs, size }))
}

pub(crate) fn run(unit: &mut TaskUnit, plan: GroupPlan) -> ExecutionOutcome {
    let started = unit.begin();
    let collector = HistoryCollector::new();
    let n = plan.size;
    debug!(algorithm = %unit.name, members = n, "processing group member by member");

    let mut outputs: Vec<OutputSlot> = unit
        .props
        .iter()
        .filter(|p| p.kind() == PropertyKind::Dataset && p.direction().is_output())
        .map(|p| OutputSlot {
            property: p.name().to_string(),
            base: p.value_text(),
            members: Vec::with_capacity(n),
        })
        .collect();

    let mut failure = None;
    for i in 0..n {
        if unit.cancel.is_cancelled() {
            failure = Some(ExecutionOutcome::Cancelled);
            break;
        }
        match run_member(unit, &plan, &outputs, i, &collector) {
            Ok(produced) => {
                for (slot, dataset) in outputs.iter_mut().zip(produced) {
                    if let Some(dataset) = dataset {
                        slot.members.push(dataset);
                    }
                }
            }
            Err(outcome) => {
                failure = Some(outcome);
                break;
            }
        }
    }

    for slot in outputs {
        if slot.base.is_empty() {
            continue;
        }
        let group = Arc::new(DatasetGroup::new(slot.base, slot.members));
        if let Err(err) = unit.props.set(&slot.property, Arc::clone(&group)) {
            warn!(algorithm = %unit.name, property = %slot.property, "cannot set output group: {err}");
            continue;
        }
        // Successful runs are stored by `finish`; partial results are kept here
        if failure.is_some() && unit.store_outputs && !unit.is_child {
            unit.services.data.add(group);
        }
    }

    let outcome = failure.unwrap_or(ExecutionOutcome::Success);
    unit.finish(outcome, started, collector.take())
}

fn run_member(
    unit: &TaskUnit,
    plan: &GroupPlan,
    outputs: &[OutputSlot],
    i: usize,
    collector: &HistoryCollector,
) -> Result<Vec<Option<Arc<Dataset>>>, ExecutionOutcome> {
    let n = plan.size;
    let fail = |err: AlgoError| {
        ExecutionOutcome::Failed(format!("Group member {} of {n} failed: {err}", i + 1))
    };

    let imp = unit
        .services
        .factory
        .create(&unit.name, Some(unit.version))
        .map_err(fail)?;
    let mut member = TaskUnit::new(imp, unit.services.clone(), None);
    member.initialize().map_err(fail)?;
    member
        .adopt(
            ParentLink {
                bus: &unit.bus,
                cancel: &unit.cancel,
                collector,
                record_history: unit.record_history,
            },
            &ChildOptions::new()
                .progress(i as f64 / n as f64, (i + 1) as f64 / n as f64)
                .logging(unit.logging),
        )
        .map_err(fail)?;

    for prop in unit.props.iter() {
        let name = prop.name();
        if let Some((_, group)) = plan.inputs.iter().find(|(p, _)| p == name) {
            member
                .props
                .set(name, Arc::clone(&group.members()[i]))
                .map_err(fail)?;
        } else if let Some(slot) = outputs.iter().find(|s| s.property == name) {
            if !slot.base.is_empty() {
                let target = PropertyValue::Data(DataRef::named(format!("{}_{}", slot.base, i + 1)));
                member.props.set(name, target).map_err(fail)?;
            }
        } else {
            member.props.set(name, prop.value().clone()).map_err(fail)?;
        }
    }

    match member.execute() {
        ExecutionOutcome::Success => Ok(outputs
            .iter()
            .map(|slot| member.props.get::<Arc<Dataset>>(&slot.property).ok())
            .collect()),
        ExecutionOutcome::Cancelled => Err(ExecutionOutcome::Cancelled),
        ExecutionOutcome::Failed(message) => Err(ExecutionOutcome::Failed(format!(
            "Group member {} of {n} failed: {message}",
            i + 1
        ))),
    }
}
