//! Run configuration.
//!
//! Precedence: command-line flags, then `MRC_BACKEND`, then defaults.

use std::fmt;
use std::str::FromStr;

use mrc_diagnostic::{DiagnosticConfig, DiagnosticEmitter};
use mrc_runtime::{RuntimeContext, DEFAULT_PARALLEL_THRESHOLD};

use crate::DriverError;

/// Which backend compiles the program.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Interpreter,
    Jit,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Interpreter => "interp",
            BackendKind::Jit => "jit",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interp" | "interpreter" => Ok(BackendKind::Interpreter),
            "jit" | "native" => Ok(BackendKind::Jit),
            other => Err(DriverError::UnknownBackend(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub backend: BackendKind,
    pub parallel: bool,
    /// Sequences shorter than this stay sequential in parallel mode.
    pub parallel_threshold: usize,
    /// Collect output in a buffer instead of writing to stdout.
    pub capture_output: bool,
    /// Diagnostics kept per compile attempt. `None` keeps all of them.
    pub error_limit: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            backend: BackendKind::default(),
            parallel: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            capture_output: false,
            error_limit: None,
        }
    }
}

impl RunConfig {
    /// Defaults with `MRC_BACKEND` applied.
    pub fn from_env() -> Result<Self, DriverError> {
        let mut config = RunConfig::default();
        if let Ok(backend) = std::env::var("MRC_BACKEND") {
            if !backend.is_empty() {
                config.backend = backend.parse()?;
            }
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_parallel_threshold(mut self, min_len: usize) -> Self {
        self.parallel_threshold = min_len;
        self
    }

    #[must_use]
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = Some(limit);
        self
    }

    /// Apply one command-line option. Returns `false` for arguments that are
    /// not options.
    pub fn apply_flag(&mut self, arg: &str) -> Result<bool, DriverError> {
        if let Some(name) = arg.strip_prefix("--backend=") {
            self.backend = name.parse()?;
        } else if arg == "--parallel" || arg == "-p" {
            self.parallel = true;
        } else if let Some(n) = arg.strip_prefix("--parallel-threshold=") {
            self.parallel_threshold = n
                .parse()
                .map_err(|_| DriverError::InvalidFlag(arg.to_owned()))?;
            self.parallel = true;
        } else if let Some(n) = arg.strip_prefix("--error-limit=") {
            let limit = n
                .parse()
                .map_err(|_| DriverError::InvalidFlag(arg.to_owned()))?;
            self.error_limit = Some(limit);
        } else if arg.starts_with('-') {
            return Err(DriverError::InvalidFlag(arg.to_owned()));
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// A fresh emitter honoring [`RunConfig::error_limit`].
    pub fn emitter(&self) -> DiagnosticEmitter {
        let config = DiagnosticConfig {
            error_limit: self.error_limit,
        };
        DiagnosticEmitter::with_config(config)
    }

    pub fn runtime_context(&self) -> RuntimeContext {
        if self.parallel {
            RuntimeContext::parallel_with_threshold(self.parallel_threshold)
        } else {
            RuntimeContext::sequential()
        }
    }
}
