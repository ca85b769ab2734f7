//! Types and type inference for MrCalc.
//!
//! The type language is tiny: two numeric primitives, an error sentinel and
//! (possibly nested) sequences of primitives. [`infer_program`] walks every
//! statement in order, reporting problems through a
//! [`DiagnosticEmitter`](mrc_diagnostic::DiagnosticEmitter) and always
//! producing a type so one mistake never hides the next.

mod diagnostics;
mod infer;
mod ty;
mod variable;

pub use infer::{infer_program, StmtSignature, TypeInferrer, TypeMap, TypedProgram};
pub use ty::{promote, Primitive, Type};
pub use variable::{Scope, Variable};
