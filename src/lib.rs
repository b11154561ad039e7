//! Algorun - algorithm execution and provenance framework

pub mod algorithm;
pub mod builtin;
pub mod composer;
pub mod config;
pub mod context;
pub mod datastore;
pub mod error;
mod executor;
pub mod factory;
mod fanout;
pub mod framework;
pub mod handle;
pub mod history;
pub mod job;
pub mod manager;
pub mod notification;
pub mod property;
pub mod runtime;
pub mod task;
pub mod validator;

pub use algorithm::{Algorithm, CancelFlag, ExecutionOutcome, ExecutionState};
pub use composer::ChildOptions;
pub use config::FrameworkConfig;
pub use context::ExecContext;
pub use datastore::{DataObject, DataStore, Dataset, DatasetGroup};
pub use error::{AlgoError, FixSuggestion};
pub use factory::{AlgorithmDescriptor, AlgorithmFactory};
pub use framework::{Framework, Services};
pub use handle::AlgorithmHandle;
pub use history::{
    AlgorithmHistory, ExecutionStatus, HistoryLog, HistoryView, ScriptBuilder, VersionPolicy,
};
pub use job::Job;
pub use manager::{AlgorithmId, AlgorithmManager};
pub use notification::{
    Notification, NotificationBus, NotificationKind, NotificationRecorder, Observer, ObserverId,
};
pub use property::{Direction, Property, PropertyKind, PropertyStore, PropertyValue};
pub use runtime::{ExecutionFuture, WorkerPool};
pub use task::TaskUnit;
