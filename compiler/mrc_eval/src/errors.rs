//! Error types for compilation and execution.

use mrc_diagnostic::CollectedDiagnostics;
use mrc_ir::Span;
use mrc_runtime::RuntimeError;
use mrc_types::Primitive;

/// A backend could not realize part of the algebra.
///
/// These are configuration or compiler bugs, never problems in the user's
/// program, and abort compilation immediately.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend `{backend}` has no arithmetic for {repr:?}")]
    UnsupportedRepresentation {
        backend: &'static str,
        repr: Primitive,
    },

    #[error("backend `{backend}` does not implement `{operation}`")]
    UnimplementedOperation {
        backend: &'static str,
        operation: &'static str,
    },

    /// An identifier survived type checking without a slot.
    #[error("no slot for `{name}`")]
    UnresolvedName { name: String },

    #[error("malformed expression: {0}")]
    Malformed(&'static str),

    /// Native code generation failed.
    #[error("code generation failed: {0}")]
    Codegen(String),
}

/// Why a program could not be compiled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Every problem found in the program.
    #[error("{0}")]
    Diagnostics(#[from] CollectedDiagnostics),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A runtime error tied to the statement that raised it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct ExecError {
    pub span: Span,
    pub error: RuntimeError,
}

/// Why the worker could not run a program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("a program is already running")]
    Busy,

    #[error("the worker thread is gone")]
    Disconnected,

    #[error(transparent)]
    Exec(#[from] ExecError),
}
