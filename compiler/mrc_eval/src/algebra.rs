//! The expression algebra.
//!
//! Backends implement these traits over an opaque expression type. The
//! [`ExprBuilder`](crate::ExprBuilder) walks the AST once and speaks only this
//! vocabulary, so adding a backend never touches the traversal.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`ExprAlgebra`] | constants, casts and the sequence operations |
//! | [`Arithmetic`] | `+ - * / ^` and negation for one numeric representation |
//! | [`FunctionAssembler`] | parameter loads, lambdas, turning a body into a function |
//! | [`Backend`] | creates assemblers, turns functions into [`Evaluable`]s |
//!
//! Requests a backend cannot serve (an unregistered representation, an
//! operation without native support) fail with a [`BackendError`] right
//! away. Nothing is ever approximated.

use std::sync::Arc;

use mrc_runtime::{RuntimeContext, RuntimeError, Value};
use mrc_types::{Primitive, Type};

use crate::BackendError;

/// A compiled unit, invocable with a runtime context and positional
/// arguments.
pub trait Evaluable: Send + Sync {
    fn eval(&self, ctx: &RuntimeContext, args: &[Value]) -> Result<Value, RuntimeError>;
}

/// A literal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
}

/// Arithmetic over one numeric representation.
pub trait Arithmetic<E> {
    fn add(&self, a: E, b: E) -> Result<E, BackendError>;
    fn sub(&self, a: E, b: E) -> Result<E, BackendError>;
    fn mul(&self, a: E, b: E) -> Result<E, BackendError>;
    fn div(&self, a: E, b: E) -> Result<E, BackendError>;
    fn pow(&self, a: E, b: E) -> Result<E, BackendError>;
    fn neg(&self, a: E) -> Result<E, BackendError>;
}

/// Operations that do not depend on the function being assembled.
pub trait ExprAlgebra {
    /// Opaque expression representation.
    type Expr;
    /// A function usable as the lambda argument of `map`/`reduce`.
    type Lambda;

    fn constant(&mut self, value: Constant) -> Result<Self::Expr, BackendError>;

    /// Numeric conversion between representations.
    fn cast(
        &mut self,
        expr: Self::Expr,
        from: Primitive,
        to: Primitive,
    ) -> Result<Self::Expr, BackendError>;

    /// Half-open integer range `[start, end)`.
    fn range(&mut self, start: Self::Expr, end: Self::Expr) -> Result<Self::Expr, BackendError>;

    /// Closed integer range `[start, end]`. Overflows instead of wrapping
    /// when `end` is `i64::MAX`.
    fn range_inclusive(
        &mut self,
        start: Self::Expr,
        end: Self::Expr,
    ) -> Result<Self::Expr, BackendError>;

    /// Apply a one-parameter lambda to every element of `seq`, whose
    /// elements have type `from`. The lambda returns `to`.
    fn map(
        &mut self,
        seq: Self::Expr,
        lambda: Self::Lambda,
        from: Type,
        to: Type,
    ) -> Result<Self::Expr, BackendError>;

    /// Fold `seq` (elements of type `element`) into `neutral` with a
    /// two-parameter lambda over the accumulator representation `acc`.
    fn reduce(
        &mut self,
        seq: Self::Expr,
        neutral: Self::Expr,
        lambda: Self::Lambda,
        element: Primitive,
        acc: Primitive,
    ) -> Result<Self::Expr, BackendError>;
}

/// Builds one function: a return type, typed parameters, one body.
pub trait FunctionAssembler: ExprAlgebra + Sized {
    /// An assembled, not yet invocable, function.
    type Function;

    /// Load parameter `slot`.
    fn param(&mut self, slot: usize) -> Result<Self::Expr, BackendError>;

    /// Arithmetic for `repr`.
    fn arithmetic(&self, repr: Primitive) -> Result<&dyn Arithmetic<Self::Expr>, BackendError>;

    /// An assembler for a lambda body that will be passed to this function's
    /// `map`/`reduce` calls.
    fn nested(&mut self, ret: Type, params: &[Type]) -> Result<Self, BackendError>;

    /// Finish the function with `body` as its result.
    fn assemble(self, body: Self::Expr) -> Result<Self::Function, BackendError>;

    /// Wrap an assembled function as a lambda argument.
    fn lambda(&mut self, function: &Self::Function) -> Result<Self::Lambda, BackendError>;
}

/// A code generation strategy.
pub trait Backend {
    type Assembler: FunctionAssembler;

    fn name(&self) -> &'static str;

    /// Start a function returning `ret` and taking `params`.
    fn assembler(&self, ret: Type, params: &[Type]) -> Result<Self::Assembler, BackendError>;

    /// Turn an assembled top-level function into an invocable unit.
    fn finish(
        &self,
        function: <Self::Assembler as FunctionAssembler>::Function,
    ) -> Result<Arc<dyn Evaluable>, BackendError>;
}
