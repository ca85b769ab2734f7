//! Expression building.
//!
//! [`ExprBuilder`] is the only AST traversal after inference. It lowers a
//! type-checked expression through any [`FunctionAssembler`], inserting casts
//! wherever promotion widened an operand, and lowers each lambda into a
//! nested function of its own.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use mrc_ir::stack::ensure_sufficient_stack;
use mrc_ir::{BinaryOp, ExprArena, ExprId, ExprKind, UnaryOp};
use mrc_types::{Primitive, StmtSignature, Type, TypeMap};

use crate::algebra::{Backend, Constant, Evaluable, FunctionAssembler};
use crate::BackendError;

/// Parameter slots visible to the function being built.
struct Slots<'a> {
    by_name: FxHashMap<&'a str, usize>,
}

impl<'a> Slots<'a> {
    fn new(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut by_name = FxHashMap::default();
        for (slot, name) in names.into_iter().enumerate() {
            by_name.entry(name).or_insert(slot);
        }
        Slots { by_name }
    }
}

pub struct ExprBuilder<'a> {
    arena: &'a ExprArena,
    types: &'a TypeMap,
}

impl<'a> ExprBuilder<'a> {
    pub fn new(arena: &'a ExprArena, types: &'a TypeMap) -> Self {
        ExprBuilder { arena, types }
    }

    /// Compile the value of one statement into an invocable unit taking the
    /// statement's inputs as positional arguments.
    pub fn build_statement<B: Backend>(
        &self,
        backend: &B,
        signature: &StmtSignature,
        value: ExprId,
    ) -> Result<Arc<dyn Evaluable>, BackendError> {
        let params: Vec<Type> = signature.inputs.iter().map(|v| v.ty()).collect();
        let mut asm = backend.assembler(signature.output.ty(), &params)?;
        let slots = Slots::new(signature.inputs.iter().map(|v| v.name()));
        let body = self.lower(&mut asm, value, &slots)?;
        let function = asm.assemble(body)?;
        tracing::debug!(
            backend = backend.name(),
            output = %signature.output,
            inputs = params.len(),
            "built statement"
        );
        backend.finish(function)
    }

    fn lower<A: FunctionAssembler>(
        &self,
        asm: &mut A,
        id: ExprId,
        slots: &Slots<'_>,
    ) -> Result<A::Expr, BackendError> {
        ensure_sufficient_stack(|| self.lower_kind(asm, id, slots))
    }

    fn lower_kind<A: FunctionAssembler>(
        &self,
        asm: &mut A,
        id: ExprId,
        slots: &Slots<'_>,
    ) -> Result<A::Expr, BackendError> {
        match self.arena.get_expr(id).kind {
            ExprKind::Int(v) => asm.constant(Constant::Int(v)),
            ExprKind::Float(bits) => asm.constant(Constant::Float(f64::from_bits(bits))),

            ExprKind::Ident(name) => {
                let text = self.arena.name(name);
                match slots.by_name.get(text) {
                    Some(&slot) => asm.param(slot),
                    None => Err(BackendError::UnresolvedName {
                        name: text.to_owned(),
                    }),
                }
            }

            ExprKind::Unary { op, operand } => {
                let value = self.lower(asm, operand, slots)?;
                match op {
                    UnaryOp::Plus => Ok(value),
                    UnaryOp::Neg => asm.arithmetic(self.primitive(id)?)?.neg(value),
                }
            }

            ExprKind::Binary { op, left, right } => {
                let repr = self.primitive(id)?;
                let lhs = self.lower_as(asm, left, repr, slots)?;
                let rhs = self.lower_as(asm, right, repr, slots)?;
                let arith = asm.arithmetic(repr)?;
                match op {
                    BinaryOp::Add => arith.add(lhs, rhs),
                    BinaryOp::Sub => arith.sub(lhs, rhs),
                    BinaryOp::Mul => arith.mul(lhs, rhs),
                    BinaryOp::Div => arith.div(lhs, rhs),
                    BinaryOp::Pow => arith.pow(lhs, rhs),
                }
            }

            // `{start, end}` includes `end`
            ExprKind::Range { start, end } => {
                let start = self.lower(asm, start, slots)?;
                let end = self.lower(asm, end, slots)?;
                asm.range_inclusive(start, end)
            }

            ExprKind::Map { seq, lambda } => {
                let from = self
                    .types
                    .get(seq)
                    .element_type()
                    .ok_or(BackendError::Malformed("map over a scalar"))?;
                let to = self.types.get(lambda);
                let source = self.lower(asm, seq, slots)?;
                let lambda = self.lower_lambda(asm, lambda, to, &[from])?;
                asm.map(source, lambda, from, to)
            }

            ExprKind::Reduce {
                seq,
                neutral,
                lambda,
            } => {
                let acc = self.primitive(id)?;
                let element = self
                    .types
                    .get(seq)
                    .element_type()
                    .and_then(Type::as_primitive)
                    .ok_or(BackendError::Malformed("reduce over non-scalar elements"))?;
                let source = self.lower(asm, seq, slots)?;
                let start = self.lower_as(asm, neutral, acc, slots)?;
                let acc_ty = Type::Primitive(acc);
                let lambda = self.lower_lambda(asm, lambda, acc_ty, &[acc_ty, acc_ty])?;
                asm.reduce(source, start, lambda, element, acc)
            }

            ExprKind::Lambda { .. } => Err(BackendError::Malformed(
                "lambda outside of map/reduce",
            )),
        }
    }

    /// Lower `id` and cast it to `repr` if its own type differs.
    fn lower_as<A: FunctionAssembler>(
        &self,
        asm: &mut A,
        id: ExprId,
        repr: Primitive,
        slots: &Slots<'_>,
    ) -> Result<A::Expr, BackendError> {
        let value = self.lower(asm, id, slots)?;
        let own = self.primitive(id)?;
        if own == repr {
            Ok(value)
        } else {
            asm.cast(value, own, repr)
        }
    }

    /// Lower a lambda into a nested function. Its body sees only its own
    /// parameters.
    fn lower_lambda<A: FunctionAssembler>(
        &self,
        asm: &mut A,
        id: ExprId,
        ret: Type,
        params: &[Type],
    ) -> Result<A::Lambda, BackendError> {
        let ExprKind::Lambda {
            params: names,
            body,
        } = self.arena.get_expr(id).kind
        else {
            return Err(BackendError::Malformed("expected a lambda"));
        };
        let names = self.arena.get_params(names);
        if names.len() != params.len() {
            return Err(BackendError::Malformed("lambda arity"));
        }

        let mut nested = asm.nested(ret, params)?;
        let slots = Slots::new(names.iter().map(|&n| self.arena.name(n)));
        let value = self.lower(&mut nested, body, &slots)?;
        let function = nested.assemble(value)?;
        asm.lambda(&function)
    }

    /// Scalar type of `id`.
    fn primitive(&self, id: ExprId) -> Result<Primitive, BackendError> {
        match self.types.get(id) {
            Type::Primitive(Primitive::Unknown) => {
                Err(BackendError::Malformed("expression has unknown type"))
            }
            Type::Primitive(p) => Ok(p),
            Type::Sequence { .. } => Err(BackendError::Malformed("expected a scalar")),
        }
    }
}
