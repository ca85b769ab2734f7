//! MrCalc evaluation core.
//!
//! # Pipeline
//!
//! ```text
//! Program (AST) -> infer_program -> ExprBuilder over a Backend -> Stmt*
//!               -> CompiledProgram::execute(Memory) -> PrintHandler
//! ```
//!
//! Backends realize the expression algebra in [`algebra`]. This crate ships
//! the interpreted backend ([`InterpBackend`]); native code generation lives
//! in its own crate and plugs in through the same [`Backend`] trait.

pub mod algebra;
mod builder;
mod compile;
mod errors;
mod interp;
mod print_handler;
mod program;
mod worker;

pub use algebra::{Arithmetic, Backend, Constant, Evaluable, ExprAlgebra, FunctionAssembler};
pub use builder::ExprBuilder;
pub use compile::{accept, check, compile, compile_with};
pub use errors::{BackendError, CompileError, ExecError, WorkerError};
pub use interp::{InterpAssembler, InterpBackend, InterpFunction};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandler,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use program::{CancelToken, CompiledProgram, Memory, Stmt};
pub use worker::{JobHandle, ProgramWorker};
