//! Cranelift JIT backend for MrCalc.
//!
//! Realizes the expression algebra as native code. Every statement becomes
//! one JIT module holding the statement function and the functions of its
//! lambdas; sequence work is delegated to C-ABI helpers in [`helpers`] that
//! call back into the lambdas through plain function pointers.
//!
//! # Calling convention
//!
//! - Statement: `fn(ctx, args: *const u64) -> W`
//! - Lambda: `fn(ctx, W[, W]) -> W`
//!
//! where `W` is `i64`, `f64` or a sequence pointer, and `ctx` points to a
//! [`JitContext`](context::JitContext).
//!
//! # Sequence ownership
//!
//! Every sequence-valued expression produces an owned `Arc<Sequence>` raw
//! pointer. Loading a parameter retains; helpers consume their sequence
//! arguments and return owned pointers; a statement's result is adopted by
//! the caller. Lambda arguments are borrowed from the sequence being mapped.
//!
//! # Errors
//!
//! Native code cannot unwind. Helpers record the first runtime error in the
//! context and return a neutral value; callers check the context after every
//! call that may fail.

#![warn(clippy::allow_attributes_without_reason)]
#![allow(
    unsafe_code,
    reason = "executing JIT code and the C-ABI helpers require raw pointers"
)]
#![allow(
    clippy::not_unsafe_ptr_arg_deref,
    reason = "helpers receive pointers from generated code which guarantees validity"
)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    reason = "arguments cross the native boundary as 64-bit words"
)]
#![allow(
    improper_ctypes_definitions,
    reason = "sequence pointers are opaque to generated code"
)]

mod artifact;
mod backend;
pub mod context;
mod emit;
mod errors;
pub mod helpers;

pub use backend::{JitAssembler, JitBackend, JitFunction, JitLambda};
pub use errors::JitError;
