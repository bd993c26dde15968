//! Error types shared by the pipeline graph and parameter store.

use thiserror::Error;

/// Errors raised by the core pipeline/parameter machinery.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stage's `process` call failed — fatal to the whole pipeline (§7: fatal runtime error).
    #[error("stage '{stage}' failed: {reason}")]
    StageFailed {
        /// Name of the stage that failed.
        stage: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// A graph was built with no stages, or a chain referenced an unknown node.
    #[error("pipeline graph is empty or malformed: {0}")]
    MalformedGraph(String),

    /// A parameter name was looked up but does not exist in the store.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// A parameter was addressed with the wrong variant (e.g. `step()` on a `Function` cell).
    #[error("parameter '{name}' is not a {expected} cell")]
    WrongParameterKind {
        /// Name of the parameter.
        name: String,
        /// The kind of cell the caller expected.
        expected: &'static str,
    },

    /// A parameter name was registered twice with conflicting kinds during startup validation.
    #[error("parameter '{0}' registered more than once")]
    DuplicateParameter(String),
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
