use mrc_eval::BackendError;

/// Cranelift failures.
#[derive(Debug, thiserror::Error)]
pub enum JitError {
    #[error("host ISA unavailable: {0}")]
    Isa(String),

    #[error(transparent)]
    Module(#[from] cranelift_module::ModuleError),

    #[error("JIT unit already finalized")]
    Finalized,

    #[error("JIT unit is in use")]
    Busy,
}

impl From<JitError> for BackendError {
    fn from(err: JitError) -> Self {
        BackendError::Codegen(err.to_string())
    }
}
