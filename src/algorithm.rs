//! The algorithm contract
//!
//! Concrete algorithms implement [`Algorithm`]: identity, property
//! declaration and the work itself. Everything else (state machine,
//! notifications, history, fan-out) is driven by [`crate::TaskUnit`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crate::context::ExecContext;
use crate::error::AlgoError;
use crate::property::PropertyStore;

/// A declared unit of work
///
/// `name()` and `version()` must be constant for the lifetime of the value.
pub trait Algorithm: Send {
    fn name(&self) -> &str;

    fn version(&self) -> u32;

    /// Backslash-separated category path, e.g. `Arithmetic\Scaling`
    fn category(&self) -> &str {
        "General"
    }

    fn summary(&self) -> &str {
        ""
    }

    /// Declare every property
    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError>;

    /// Do the work; check `ctx.interruption_point()` as often as is sensible
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError>;

    /// Cross-property checks run after per-property validation
    fn validate_inputs(&self, _props: &PropertyStore) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Whether grouped inputs are fanned out member by member
    fn process_groups_individually(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════
// Lifecycle state
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExecutionState {
    Uninitialized = 0,
    Initialized = 1,
    Executing = 2,
    Executed = 3,
    Failed = 4,
}

impl ExecutionState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Initialized,
            2 => Self::Executing,
            3 => Self::Executed,
            4 => Self::Failed,
            _ => Self::Uninitialized,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Executed | Self::Failed)
    }
}

/// Lock-free shared state, readable while the unit itself is locked
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ExecutionState::Uninitialized as u8)))
    }

    pub(crate) fn get(&self) -> ExecutionState {
        ExecutionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: ExecutionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}

// ═══════════════════════════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════════════════════════

/// Cooperative cancellation flag
///
/// A child's flag is linked to its parent's: cancelling the parent is seen
/// by the child, not the other way round.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    own: Arc<AtomicBool>,
    parent: Option<Box<CancelFlag>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.own.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.own.load(Ordering::SeqCst)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    pub(crate) fn reset(&self) {
        self.own.store(false, Ordering::SeqCst);
    }

    /// Fresh flag that also observes this one
    pub fn child(&self) -> Self {
        Self {
            own: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════════════════════════

/// Terminal result of one `execute()` call
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Success,
    Failed(String),
    Cancelled,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Turn a child's outcome into something a parent can `?`
    pub fn into_result(self, name: &str) -> Result<(), AlgoError> {
        match self {
            Self::Success => Ok(()),
            Self::Cancelled => Err(AlgoError::Cancelled),
            Self::Failed(message) => Err(AlgoError::ChildFailed {
                name: name.to_string(),
                message,
            }),
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed(message) => write!(f, "failed: {message}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_cell_round_trips() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), ExecutionState::Uninitialized);
        let shared = cell.clone();
        shared.set(ExecutionState::Executing);
        assert_eq!(cell.get(), ExecutionState::Executing);
        assert!(!cell.get().is_terminal());
        cell.set(ExecutionState::Failed);
        assert!(shared.get().is_terminal());
    }

    #[test]
    fn child_flag_sees_parent_cancel() {
        let parent = CancelFlag::new();
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn parent_flag_ignores_child_cancel() {
        let parent = CancelFlag::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
        child.reset();
        assert!(!child.is_cancelled());
    }

    #[test]
    fn outcome_into_result() {
        assert!(ExecutionOutcome::Success.into_result("C").is_ok());
        assert!(ExecutionOutcome::Cancelled
            .into_result("C")
            .unwrap_err()
            .is_cancelled());
        let err = ExecutionOutcome::Failed("bad".into())
            .into_result("C")
            .unwrap_err();
        assert_eq!(err.to_string(), "ALGO-031: Child algorithm 'C' failed: bad");
    }
}
