//! MrCalc driver.
//!
//! Programs arrive as JSON produced by the external parser (a serialized
//! [`ParseOutcome`](mrc_ir::ParseOutcome)). The driver type-checks them,
//! compiles them for the configured backend and runs them on a
//! [`ProgramWorker`](mrc_eval::ProgramWorker).

pub mod commands;
pub mod config;
mod errors;
pub mod input;
mod tracing_setup;

pub use config::{BackendKind, RunConfig};
pub use errors::DriverError;
pub use tracing_setup::init_tracing;
