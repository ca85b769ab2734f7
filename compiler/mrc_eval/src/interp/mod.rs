//! Interpreted backend.
//!
//! Every expression is a closure over a [`Frame`] (the runtime context plus
//! the argument array). Algebra operations compose closures and assembling
//! a function just wraps the body closure, so there is no compile step.
//! This backend is the reference the native one is tested against.

use std::sync::Arc;

use mrc_runtime::arith::{
    float_pow, float_to_int, int_add, int_div, int_mul, int_neg, int_pow, int_sub, int_to_float,
};
use mrc_runtime::{ElementKind, RuntimeContext, RuntimeError, Value};
use mrc_types::{Primitive, Type};

use crate::algebra::{Arithmetic, Backend, Constant, Evaluable, ExprAlgebra, FunctionAssembler};
use crate::BackendError;

const NAME: &str = "interp";

/// What a closure sees when it runs.
pub struct Frame<'a> {
    ctx: &'a RuntimeContext,
    args: &'a [Value],
}

/// An interpreted expression.
pub type Node = Arc<dyn Fn(&Frame<'_>) -> Result<Value, RuntimeError> + Send + Sync>;

fn node<F>(f: F) -> Node
where
    F: Fn(&Frame<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An assembled interpreted function.
pub struct InterpFunction {
    body: Node,
}

impl Evaluable for InterpFunction {
    fn eval(&self, ctx: &RuntimeContext, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.body)(&Frame { ctx, args })
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct InterpBackend;

impl Backend for InterpBackend {
    type Assembler = InterpAssembler;

    fn name(&self) -> &'static str {
        NAME
    }

    fn assembler(&self, ret: Type, params: &[Type]) -> Result<InterpAssembler, BackendError> {
        Ok(InterpAssembler {
            ret,
            params: params.to_vec(),
        })
    }

    fn finish(&self, function: Arc<InterpFunction>) -> Result<Arc<dyn Evaluable>, BackendError> {
        Ok(function)
    }
}

pub struct InterpAssembler {
    ret: Type,
    params: Vec<Type>,
}

struct IntArithmetic;
struct FloatArithmetic;

fn int_binary(a: Node, b: Node, op: fn(i64, i64) -> Result<i64, RuntimeError>) -> Node {
    node(move |fr| Ok(Value::Int(op(a(fr)?.as_int()?, b(fr)?.as_int()?)?)))
}

fn float_binary(a: Node, b: Node, op: fn(f64, f64) -> f64) -> Node {
    node(move |fr| Ok(Value::Float(op(a(fr)?.as_float()?, b(fr)?.as_float()?))))
}

impl Arithmetic<Node> for IntArithmetic {
    fn add(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(int_binary(a, b, |x, y| Ok(int_add(x, y))))
    }

    fn sub(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(int_binary(a, b, |x, y| Ok(int_sub(x, y))))
    }

    fn mul(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(int_binary(a, b, |x, y| Ok(int_mul(x, y))))
    }

    fn div(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(int_binary(a, b, int_div))
    }

    fn pow(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(int_binary(a, b, int_pow))
    }

    fn neg(&self, a: Node) -> Result<Node, BackendError> {
        Ok(node(move |fr| Ok(Value::Int(int_neg(a(fr)?.as_int()?)))))
    }
}

impl Arithmetic<Node> for FloatArithmetic {
    fn add(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(float_binary(a, b, |x, y| x + y))
    }

    fn sub(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(float_binary(a, b, |x, y| x - y))
    }

    fn mul(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(float_binary(a, b, |x, y| x * y))
    }

    fn div(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(float_binary(a, b, |x, y| x / y))
    }

    fn pow(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(float_binary(a, b, float_pow))
    }

    fn neg(&self, a: Node) -> Result<Node, BackendError> {
        Ok(node(move |fr| Ok(Value::Float(-a(fr)?.as_float()?))))
    }
}

fn unsupported(repr: Primitive) -> BackendError {
    BackendError::UnsupportedRepresentation {
        backend: NAME,
        repr,
    }
}

/// Element kind a sequence of `ty` values is stored as.
fn element_kind(ty: Type, backend: &'static str) -> Result<ElementKind, BackendError> {
    match ty {
        Type::Primitive(Primitive::Integer) => Ok(ElementKind::Int),
        Type::Primitive(Primitive::Float) => Ok(ElementKind::Float),
        Type::Sequence { .. } => Ok(ElementKind::Object),
        Type::Primitive(repr @ Primitive::Unknown) => {
            Err(BackendError::UnsupportedRepresentation { backend, repr })
        }
    }
}

impl ExprAlgebra for InterpAssembler {
    type Expr = Node;
    type Lambda = Arc<InterpFunction>;

    fn constant(&mut self, value: Constant) -> Result<Node, BackendError> {
        Ok(match value {
            Constant::Int(v) => node(move |_| Ok(Value::Int(v))),
            Constant::Float(v) => node(move |_| Ok(Value::Float(v))),
        })
    }

    fn cast(&mut self, expr: Node, from: Primitive, to: Primitive) -> Result<Node, BackendError> {
        match (from, to) {
            (Primitive::Unknown, _) => Err(unsupported(from)),
            (_, Primitive::Unknown) => Err(unsupported(to)),
            _ if from == to => Ok(expr),
            (Primitive::Integer, Primitive::Float) => Ok(node(move |fr| {
                Ok(Value::Float(int_to_float(expr(fr)?.as_int()?)))
            })),
            _ => Ok(node(move |fr| {
                Ok(Value::Int(float_to_int(expr(fr)?.as_float()?)))
            })),
        }
    }

    fn range(&mut self, start: Node, end: Node) -> Result<Node, BackendError> {
        Ok(node(move |fr| {
            let seq = mrc_runtime::range(start(fr)?.as_int()?, end(fr)?.as_int()?)?;
            Ok(Value::seq(seq))
        }))
    }

    fn range_inclusive(&mut self, start: Node, end: Node) -> Result<Node, BackendError> {
        Ok(node(move |fr| {
            let seq = mrc_runtime::range_inclusive(start(fr)?.as_int()?, end(fr)?.as_int()?)?;
            Ok(Value::seq(seq))
        }))
    }

    fn map(
        &mut self,
        seq: Node,
        lambda: Arc<InterpFunction>,
        _from: Type,
        to: Type,
    ) -> Result<Node, BackendError> {
        let kind = element_kind(to, NAME)?;
        Ok(node(move |fr| {
            let source = seq(fr)?;
            let ctx = fr.ctx;
            let mapped = mrc_runtime::map(ctx, source.as_seq()?, kind, |v| {
                lambda.eval(ctx, std::slice::from_ref(&v))
            })?;
            Ok(Value::seq(mapped))
        }))
    }

    fn reduce(
        &mut self,
        seq: Node,
        neutral: Node,
        lambda: Arc<InterpFunction>,
        element: Primitive,
        acc: Primitive,
    ) -> Result<Node, BackendError> {
        for repr in [element, acc] {
            if !repr.is_numeric() {
                return Err(unsupported(repr));
            }
        }
        Ok(node(move |fr| {
            let source = seq(fr)?;
            let start = neutral(fr)?;
            let ctx = fr.ctx;
            mrc_runtime::reduce(ctx, source.as_seq()?, start, |a, b| lambda.eval(ctx, &[a, b]))
        }))
    }
}

impl FunctionAssembler for InterpAssembler {
    type Function = Arc<InterpFunction>;

    fn param(&mut self, slot: usize) -> Result<Node, BackendError> {
        if slot >= self.params.len() {
            return Err(BackendError::Malformed("parameter slot out of range"));
        }
        Ok(node(move |fr| {
            fr.args
                .get(slot)
                .cloned()
                .ok_or_else(|| RuntimeError::UnboundVariable {
                    name: format!("#{slot}"),
                })
        }))
    }

    fn arithmetic(&self, repr: Primitive) -> Result<&dyn Arithmetic<Node>, BackendError> {
        match repr {
            Primitive::Integer => Ok(&IntArithmetic),
            Primitive::Float => Ok(&FloatArithmetic),
            Primitive::Unknown => Err(unsupported(repr)),
        }
    }

    fn nested(&mut self, ret: Type, params: &[Type]) -> Result<Self, BackendError> {
        InterpBackend.assembler(ret, params)
    }

    fn assemble(self, body: Node) -> Result<Arc<InterpFunction>, BackendError> {
        tracing::trace!(ret = %self.ret, params = self.params.len(), "assembled closure");
        Ok(Arc::new(InterpFunction { body }))
    }

    fn lambda(&mut self, function: &Arc<InterpFunction>) -> Result<Arc<InterpFunction>, BackendError> {
        Ok(Arc::clone(function))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
