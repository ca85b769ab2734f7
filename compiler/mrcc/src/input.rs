//! Loading parser output.
//!
//! The external parser writes a JSON [`ParseOutcome`]: either a whole
//! [`Program`] or the syntax errors that prevented one.

use std::path::Path;

use mrc_eval::accept;
use mrc_ir::{ParseOutcome, Program};

use crate::DriverError;

pub fn parse_outcome(text: &str) -> Result<ParseOutcome, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn load_outcome(path: &Path) -> Result<ParseOutcome, DriverError> {
    let text = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_outcome(&text).map_err(|source| DriverError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Load a program, turning forwarded syntax errors into diagnostics.
pub fn load_program(path: &Path) -> Result<Program, DriverError> {
    let program = accept(load_outcome(path)?)?;
    tracing::debug!(path = %path.display(), stmts = program.stmts.len(), "loaded program");
    Ok(program)
}
