//! MrCalc runtime.
//!
//! - [`Value`]: the result of evaluating any expression
//! - [`Sequence`]: immutable integer, float or object sequences
//! - [`range`], [`range_inclusive`], [`map`], [`reduce`]: the sequence
//!   operations, sequential or spread over the rayon pool depending on the
//!   [`RuntimeContext`]
//! - [`arith`]: numeric kernels shared by every backend so results agree
//!   bit for bit

pub mod arith;
mod context;
mod errors;
mod ops;
mod sequence;
mod value;

pub use context::{ExecMode, RuntimeContext, DEFAULT_PARALLEL_THRESHOLD};
pub use errors::RuntimeError;
pub use ops::{map, map_by, range, range_inclusive, reduce, reduce_by, MAX_SEQUENCE_LEN};
pub use sequence::{ElementKind, FloatSequence, IntSequence, ObjectSequence, Sequence};
pub use value::Value;
