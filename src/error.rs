//! Error types with fix suggestions
//!
//! Every failure the framework can report lives here. Configuration errors
//! (ALGO-01x/02x) are raised before a unit starts, execution errors
//! (ALGO-03x) while it runs.

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum AlgoError {
    // ─────────────────────────────────────────────────────────────
    // Lifecycle errors (ALGO-010 to ALGO-016)
    // ─────────────────────────────────────────────────────────────
    #[error("ALGO-010: Algorithm '{name}' is already initialized")]
    AlreadyInitialized { name: String },

    #[error("ALGO-011: Algorithm '{name}' is not initialized")]
    NotInitialized { name: String },

    #[error("ALGO-012: Algorithm does not supply its {what}")]
    AbstractMethod { what: String },

    #[error("ALGO-013: Algorithm '{name}' has already been executed with these property values")]
    AlreadyExecuted { name: String },

    #[error("ALGO-014: Algorithm '{name}' is currently executing")]
    ExecutionInProgress { name: String },

    #[error("ALGO-015: An asynchronous execution of '{name}' is already in flight")]
    AsyncInFlight { name: String },

    #[error("ALGO-016: Worker running '{name}' dropped its result")]
    WorkerLost { name: String },

    // ─────────────────────────────────────────────────────────────
    // Property errors (ALGO-020 to ALGO-026)
    // ─────────────────────────────────────────────────────────────
    #[error("ALGO-020: Unknown property '{property}' on algorithm '{algorithm}'")]
    PropertyNotFound { algorithm: String, property: String },

    #[error("ALGO-021: Invalid value for property '{property}': {reason}")]
    Validation { property: String, reason: String },

    #[error("ALGO-022: Property '{property}' is already declared")]
    DuplicateProperty { property: String },

    #[error("ALGO-023: Invalid property name '{property}'")]
    InvalidPropertyName { property: String },

    #[error("ALGO-024: Property '{property}' holds {found}, expected {expected}")]
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    #[error("ALGO-025: Invalid properties for '{algorithm}': {details}")]
    InvalidInputs { algorithm: String, details: String },

    #[error("ALGO-026: Grouped inputs of '{algorithm}' have different sizes ({sizes})")]
    GroupSizeMismatch { algorithm: String, sizes: String },

    // ─────────────────────────────────────────────────────────────
    // Registry errors (ALGO-040 to ALGO-043)
    // ─────────────────────────────────────────────────────────────
    #[error("ALGO-040: Unknown algorithm '{name}'{}", version.map(|v| format!(" version {v}")).unwrap_or_default())]
    UnknownAlgorithm {
        name: String,
        version: Option<u32>,
        suggestions: Vec<String>,
    },

    #[error("ALGO-041: Algorithm '{name}' version {version} is already registered")]
    AlreadyRegistered { name: String, version: u32 },

    #[error("ALGO-042: No data object named '{name}'")]
    DataNotFound { name: String },

    #[error("ALGO-043: Unknown history node {0}")]
    UnknownHistoryNode(usize),

    // ─────────────────────────────────────────────────────────────
    // Execution errors (ALGO-030 to ALGO-033)
    // ─────────────────────────────────────────────────────────────
    #[error("ALGO-030: Execution cancelled")]
    Cancelled,

    #[error("ALGO-031: Child algorithm '{name}' failed: {message}")]
    ChildFailed { name: String, message: String },

    #[error("ALGO-032: Execution error: {0}")]
    Execution(String),

    #[error("ALGO-033: Worker pool error: {0}")]
    Pool(String),

    // ─────────────────────────────────────────────────────────────
    // Ambient errors
    // ─────────────────────────────────────────────────────────────
    #[error("Config error: {0}")]
    Config(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlgoError {
    /// Shorthand for an execution failure raised from concrete work
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Shorthand for a rejected property value
    pub fn validation(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Errors raised before a unit starts running (never emit Started)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInitialized { .. }
                | Self::NotInitialized { .. }
                | Self::AbstractMethod { .. }
                | Self::AlreadyExecuted { .. }
                | Self::ExecutionInProgress { .. }
                | Self::AsyncInFlight { .. }
                | Self::PropertyNotFound { .. }
                | Self::Validation { .. }
                | Self::DuplicateProperty { .. }
                | Self::InvalidPropertyName { .. }
                | Self::TypeMismatch { .. }
                | Self::InvalidInputs { .. }
                | Self::GroupSizeMismatch { .. }
        )
    }

    /// Check for the cooperative cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl FixSuggestion for AlgoError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            AlgoError::AlreadyInitialized { .. } => {
                Some("Call reinitialize() to redeclare the properties")
            }
            AlgoError::NotInitialized { .. } => Some("Call initialize() before execute()"),
            AlgoError::AbstractMethod { .. } => {
                Some("Return a non-empty name and a version >= 1 from the algorithm")
            }
            AlgoError::AlreadyExecuted { .. } => {
                Some("Change a property value or call reinitialize() before running again")
            }
            AlgoError::ExecutionInProgress { .. } => {
                Some("Wait for the running execution to finish or cancel it")
            }
            AlgoError::AsyncInFlight { .. } => {
                Some("Await the previous ExecutionFuture before starting another")
            }
            AlgoError::WorkerLost { .. } => Some("Check the logs for a panic in the worker pool"),
            AlgoError::PropertyNotFound { .. } => {
                Some("Run `algorun describe <name>` to list declared properties")
            }
            AlgoError::Validation { .. } => Some("Check the value against the property's validator"),
            AlgoError::DuplicateProperty { .. } => Some("Use unique property names in init()"),
            AlgoError::InvalidPropertyName { .. } => {
                Some("Property names start with a letter and contain only letters, digits or '_'")
            }
            AlgoError::TypeMismatch { .. } => Some("Read the property with its declared type"),
            AlgoError::InvalidInputs { .. } => Some("Fix the listed properties and run again"),
            AlgoError::GroupSizeMismatch { .. } => {
                Some("Give every grouped input the same number of members")
            }
            AlgoError::UnknownAlgorithm { .. } => {
                Some("Run `algorun list` to see registered algorithms")
            }
            AlgoError::AlreadyRegistered { .. } => {
                Some("Bump the algorithm version or register it only once")
            }
            AlgoError::DataNotFound { .. } => {
                Some("Create the data object first or check its name")
            }
            AlgoError::UnknownHistoryNode(_) => Some("Node ids come from HistoryView::visible()"),
            AlgoError::Cancelled => None,
            AlgoError::ChildFailed { .. } => Some("Inspect the child's error notification"),
            AlgoError::Execution(_) => None,
            AlgoError::Pool(_) => Some("Lower worker_threads in the config"),
            AlgoError::Config(_) => Some("Check the config file fields and their types"),
            AlgoError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            AlgoError::Io(_) => Some("Check file path and permissions"),
        }
    }
}
