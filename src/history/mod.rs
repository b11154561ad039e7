//! Execution provenance
//!
//! Records (`record`), the append-only top-level log (`log`), the expandable
//! view (`view`) and script regeneration (`script`).

mod log;
mod record;
mod script;
mod view;

pub use log::{HistoryCollector, HistoryLog};
pub use record::{AlgorithmHistory, ExecutionStatus, PropertyHistory};
pub use script::{ScriptBuilder, VersionPolicy};
pub use view::{HistoryView, NodeId, VisibleNode};
