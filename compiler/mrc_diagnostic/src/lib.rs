//! Diagnostic system for the MrCalc compiler.
//!
//! - Error codes for searchability
//! - A message saying what went wrong
//! - A primary span saying where
//!
//! # Reporting model
//!
//! Phases never fail fast on user errors. They report through a
//! [`DiagnosticEmitter`], which fans every diagnostic out to its listeners and
//! to any open collection frame. [`DiagnosticEmitter::collect`] turns
//! everything reported inside a closure into one [`CollectedDiagnostics`]
//! error, so a compile attempt reports every independent issue at once.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{syntax_error, Diagnostic, Label};
pub use emitter::{
    CollectedDiagnostics, DiagnosticConfig, DiagnosticEmitter, DiagnosticListener, ListenerId,
};
pub use error_code::ErrorCode;
