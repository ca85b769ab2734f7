use std::io;
use std::path::PathBuf;

use mrc_eval::{CompileError, WorkerError};
use mrc_jit::JitError;

/// Everything that can stop a driver command.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("`{}` is not a valid program: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("runtime error: {0}")]
    Worker(#[from] WorkerError),

    #[error("JIT unavailable: {0}")]
    Jit(#[from] JitError),

    #[error("cannot start the execution thread: {0}")]
    Spawn(io::Error),

    #[error("unknown backend `{0}` (expected `interp` or `jit`)")]
    UnknownBackend(String),

    #[error("invalid option `{0}`")]
    InvalidFlag(String),
}

impl DriverError {
    /// Whether the program itself is at fault, as opposed to the driver's
    /// environment or configuration.
    pub fn is_program_error(&self) -> bool {
        matches!(self, DriverError::Compile(_) | DriverError::Worker(_))
    }
}
