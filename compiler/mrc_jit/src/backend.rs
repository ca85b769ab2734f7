//! The Cranelift realization of the expression algebra.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cranelift_codegen::ir::{types, AbiParam, InstBuilder, UserFuncName, Value as ClValue};
use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_codegen::settings::{self, Configurable};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};
use mrc_eval::{
    Arithmetic, Backend, BackendError, Constant, Evaluable, ExprAlgebra, FunctionAssembler,
};
use mrc_runtime::ElementKind;
use mrc_types::{Primitive, Type};
use target_lexicon::Triple;

use crate::artifact::JitArtifact;
use crate::emit::{node, Emit, Node, Params};
use crate::helpers::{cl_type, Helper};
use crate::JitError;

const NAME: &str = "jit";

/// Set `MRC_DEBUG_JIT=1` to log the IR of every function.
fn debug_ir() -> bool {
    std::env::var_os("MRC_DEBUG_JIT").is_some_and(|v| !v.is_empty() && v != "0")
}

/// Compiles statements to native code with Cranelift.
#[derive(Clone)]
pub struct JitBackend {
    isa: OwnedTargetIsa,
}

impl JitBackend {
    /// Backend for the host machine.
    pub fn new() -> Result<Self, JitError> {
        let mut flags = settings::builder();
        for (name, value) in [
            ("opt_level", "speed"),
            ("use_colocated_libcalls", "false"),
            ("is_pic", "false"),
        ] {
            flags
                .set(name, value)
                .map_err(|e| JitError::Isa(e.to_string()))?;
        }
        let isa = cranelift_codegen::isa::lookup(Triple::host())
            .map_err(|e| JitError::Isa(e.to_string()))?
            .finish(settings::Flags::new(flags))
            .map_err(|e| JitError::Isa(e.to_string()))?;
        Ok(JitBackend { isa })
    }
}

impl std::fmt::Debug for JitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JitBackend")
            .field("isa", &self.isa.name())
            .finish()
    }
}

fn unsupported(repr: Primitive) -> BackendError {
    BackendError::UnsupportedRepresentation {
        backend: NAME,
        repr,
    }
}

/// Storage kind of a value of type `ty`.
fn kind_of(ty: Type) -> Result<ElementKind, BackendError> {
    match ty {
        Type::Primitive(Primitive::Integer) => Ok(ElementKind::Int),
        Type::Primitive(Primitive::Float) => Ok(ElementKind::Float),
        Type::Sequence { .. } => Ok(ElementKind::Object),
        Type::Primitive(repr @ Primitive::Unknown) => Err(unsupported(repr)),
    }
}

/// One JIT module: a statement function and its lambdas.
struct JitUnit {
    /// `None` once finalized into an artifact.
    module: Option<JITModule>,
    helpers: Vec<(Helper, FuncId)>,
    fb_ctx: FunctionBuilderContext,
}

impl JitUnit {
    fn new(isa: OwnedTargetIsa) -> Result<Self, JitError> {
        let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        for helper in Helper::all() {
            builder.symbol(helper.symbol(), helper.address());
        }
        let mut module = JITModule::new(builder);
        let ptr_ty = module.target_config().pointer_type();

        let mut helpers = Vec::new();
        for helper in Helper::all() {
            let (params, ret) = helper.signature(ptr_ty);
            let mut sig = module.make_signature();
            sig.params.extend(params.into_iter().map(AbiParam::new));
            sig.returns.push(AbiParam::new(ret));
            let id = module.declare_function(helper.symbol(), Linkage::Import, &sig)?;
            helpers.push((helper, id));
        }

        Ok(JitUnit {
            module: Some(module),
            helpers,
            fb_ctx: FunctionBuilderContext::new(),
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum FnKind {
    Statement,
    Lambda,
}

/// Assembles one function of a [`JitUnit`].
pub struct JitAssembler {
    unit: Rc<RefCell<JitUnit>>,
    kind: FnKind,
    ret: ElementKind,
    params: Vec<ElementKind>,
}

/// A function defined in its unit's module.
pub struct JitFunction {
    id: FuncId,
    unit: Rc<RefCell<JitUnit>>,
    ret: ElementKind,
    params: Vec<ElementKind>,
}

/// Reference to a lambda defined in the same module as its caller.
#[derive(Copy, Clone, Debug)]
pub struct JitLambda {
    id: FuncId,
    params: usize,
}

impl JitAssembler {
    fn new(
        unit: Rc<RefCell<JitUnit>>,
        kind: FnKind,
        ret: Type,
        params: &[Type],
    ) -> Result<Self, BackendError> {
        Ok(JitAssembler {
            unit,
            kind,
            ret: kind_of(ret)?,
            params: params.iter().map(|&ty| kind_of(ty)).collect::<Result<_, _>>()?,
        })
    }
}

impl Backend for JitBackend {
    type Assembler = JitAssembler;

    fn name(&self) -> &'static str {
        NAME
    }

    fn assembler(&self, ret: Type, params: &[Type]) -> Result<JitAssembler, BackendError> {
        let unit = JitUnit::new(self.isa.clone())?;
        JitAssembler::new(Rc::new(RefCell::new(unit)), FnKind::Statement, ret, params)
    }

    fn finish(&self, function: JitFunction) -> Result<Arc<dyn Evaluable>, BackendError> {
        let mut unit = function.unit.try_borrow_mut().map_err(|_| JitError::Busy)?;
        let mut module = unit.module.take().ok_or(JitError::Finalized)?;
        module.finalize_definitions().map_err(JitError::from)?;
        let code = module.get_finalized_function(function.id);
        tracing::debug!(params = function.params.len(), "finalized JIT unit");
        Ok(Arc::new(JitArtifact::new(
            module,
            code,
            function.ret,
            function.params,
        )))
    }
}

struct IntArithmetic;
struct FloatArithmetic;

fn binary<F>(a: Node, b: Node, op: F) -> Node
where
    F: FnOnce(&mut Emit<'_, '_>, ClValue, ClValue) -> Result<ClValue, BackendError> + 'static,
{
    node(move |e| {
        let x = a(e)?;
        let y = b(e)?;
        op(e, x, y)
    })
}

impl Arithmetic<Node> for IntArithmetic {
    fn add(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().iadd(x, y))))
    }

    fn sub(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().isub(x, y))))
    }

    fn mul(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().imul(x, y))))
    }

    // `sdiv` traps on zero and on MIN / -1, so division goes through the
    // runtime kernel.
    fn div(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| {
            let ctx = e.ctx;
            e.call(Helper::IntDiv, &[ctx, x, y])
        }))
    }

    fn pow(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| {
            let ctx = e.ctx;
            e.call(Helper::IntPow, &[ctx, x, y])
        }))
    }

    fn neg(&self, a: Node) -> Result<Node, BackendError> {
        Ok(node(move |e| {
            let x = a(e)?;
            Ok(e.builder.ins().ineg(x))
        }))
    }
}

impl Arithmetic<Node> for FloatArithmetic {
    fn add(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().fadd(x, y))))
    }

    fn sub(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().fsub(x, y))))
    }

    fn mul(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().fmul(x, y))))
    }

    fn div(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| Ok(e.builder.ins().fdiv(x, y))))
    }

    fn pow(&self, a: Node, b: Node) -> Result<Node, BackendError> {
        Ok(binary(a, b, |e, x, y| e.call(Helper::FloatPow, &[x, y])))
    }

    fn neg(&self, a: Node) -> Result<Node, BackendError> {
        Ok(node(move |e| {
            let x = a(e)?;
            Ok(e.builder.ins().fneg(x))
        }))
    }
}

impl ExprAlgebra for JitAssembler {
    type Expr = Node;
    type Lambda = JitLambda;

    fn constant(&mut self, value: Constant) -> Result<Node, BackendError> {
        Ok(match value {
            Constant::Int(v) => node(move |e| Ok(e.iconst(v))),
            Constant::Float(v) => node(move |e| Ok(e.fconst(v))),
        })
    }

    fn cast(&mut self, expr: Node, from: Primitive, to: Primitive) -> Result<Node, BackendError> {
        match (from, to) {
            (Primitive::Unknown, _) => Err(unsupported(from)),
            (_, Primitive::Unknown) => Err(unsupported(to)),
            _ if from == to => Ok(expr),
            (Primitive::Integer, Primitive::Float) => Ok(node(move |e| {
                let x = expr(e)?;
                Ok(e.builder.ins().fcvt_from_sint(types::F64, x))
            })),
            // saturating, NaN becomes 0
            _ => Ok(node(move |e| {
                let x = expr(e)?;
                Ok(e.builder.ins().fcvt_to_sint_sat(types::I64, x))
            })),
        }
    }

    fn range(&mut self, start: Node, end: Node) -> Result<Node, BackendError> {
        Ok(binary(start, end, |e, s, t| {
            let ctx = e.ctx;
            e.call(Helper::Range, &[ctx, s, t])
        }))
    }

    fn range_inclusive(&mut self, start: Node, end: Node) -> Result<Node, BackendError> {
        Ok(binary(start, end, |e, s, t| {
            let ctx = e.ctx;
            e.call(Helper::RangeInclusive, &[ctx, s, t])
        }))
    }

    fn map(
        &mut self,
        seq: Node,
        lambda: JitLambda,
        from: Type,
        to: Type,
    ) -> Result<Node, BackendError> {
        if lambda.params != 1 {
            return Err(BackendError::Malformed("map lambda must take one parameter"));
        }
        let helper = Helper::Map(kind_of(from)?, kind_of(to)?);
        Ok(node(move |e| {
            let source = seq(e)?;
            let f = e.func_addr(lambda.id);
            let ctx = e.ctx;
            e.call(helper, &[ctx, source, f])
        }))
    }

    fn reduce(
        &mut self,
        seq: Node,
        neutral: Node,
        lambda: JitLambda,
        element: Primitive,
        acc: Primitive,
    ) -> Result<Node, BackendError> {
        if lambda.params != 2 {
            return Err(BackendError::Malformed("reduce lambda must take two parameters"));
        }
        let helper = match (element, acc) {
            (Primitive::Unknown, _) => return Err(unsupported(element)),
            (_, Primitive::Unknown) => return Err(unsupported(acc)),
            (Primitive::Integer, Primitive::Integer) => Helper::ReduceInt,
            (_, Primitive::Float) => Helper::ReduceFloat,
            (Primitive::Float, Primitive::Integer) => {
                return Err(BackendError::UnimplementedOperation {
                    backend: NAME,
                    operation: "reduce of floats into an int accumulator",
                })
            }
        };
        Ok(node(move |e| {
            let source = seq(e)?;
            let start = neutral(e)?;
            let f = e.func_addr(lambda.id);
            let ctx = e.ctx;
            e.call(helper, &[ctx, source, start, f])
        }))
    }
}

impl FunctionAssembler for JitAssembler {
    type Function = JitFunction;

    fn param(&mut self, slot: usize) -> Result<Node, BackendError> {
        if slot >= self.params.len() {
            return Err(BackendError::Malformed("parameter slot out of range"));
        }
        Ok(node(move |e| e.param(slot)))
    }

    fn arithmetic(&self, repr: Primitive) -> Result<&dyn Arithmetic<Node>, BackendError> {
        match repr {
            Primitive::Integer => Ok(&IntArithmetic),
            Primitive::Float => Ok(&FloatArithmetic),
            Primitive::Unknown => Err(unsupported(repr)),
        }
    }

    fn nested(&mut self, ret: Type, params: &[Type]) -> Result<Self, BackendError> {
        JitAssembler::new(Rc::clone(&self.unit), FnKind::Lambda, ret, params)
    }

    fn assemble(self, body: Node) -> Result<JitFunction, BackendError> {
        let mut guard = self.unit.try_borrow_mut().map_err(|_| JitError::Busy)?;
        let unit = &mut *guard;
        let module = unit.module.as_mut().ok_or(JitError::Finalized)?;
        let ptr_ty = module.target_config().pointer_type();

        let mut sig = module.make_signature();
        sig.params.push(AbiParam::new(ptr_ty));
        match self.kind {
            FnKind::Statement => sig.params.push(AbiParam::new(ptr_ty)),
            FnKind::Lambda => sig.params.extend(
                self.params
                    .iter()
                    .map(|&kind| AbiParam::new(cl_type(kind, ptr_ty))),
            ),
        }
        sig.returns.push(AbiParam::new(cl_type(self.ret, ptr_ty)));

        let id = module
            .declare_anonymous_function(&sig)
            .map_err(JitError::from)?;
        let mut ctx = module.make_context();
        ctx.func.signature = sig;
        ctx.func.name = UserFuncName::user(0, id.as_u32());

        {
            let mut builder = FunctionBuilder::new(&mut ctx.func, &mut unit.fb_ctx);
            let entry = builder.create_block();
            builder.append_block_params_for_function_params(entry);
            builder.switch_to_block(entry);
            builder.seal_block(entry);

            let block_params = builder.block_params(entry).to_vec();
            let Some((&ctx_value, rest)) = block_params.split_first() else {
                return Err(BackendError::Codegen("missing context parameter".into()));
            };
            let params = match self.kind {
                FnKind::Statement => Params::Memory {
                    base: rest
                        .first()
                        .copied()
                        .ok_or_else(|| BackendError::Codegen("missing argument array".into()))?,
                    kinds: self.params.clone(),
                },
                FnKind::Lambda => Params::Registers {
                    values: rest.to_vec(),
                    kinds: self.params.clone(),
                },
            };

            let mut emit = Emit {
                builder: &mut builder,
                module: &mut *module,
                helpers: &unit.helpers,
                ptr_ty,
                ctx: ctx_value,
                params,
            };
            let result = body(&mut emit)?;
            builder.ins().return_(&[result]);
            builder.finalize();
        }

        if debug_ir() {
            tracing::debug!(kind = ?self.kind, ir = %ctx.func.display(), "JIT function");
        }
        module
            .define_function(id, &mut ctx)
            .map_err(JitError::from)?;
        module.clear_context(&mut ctx);
        tracing::debug!(kind = ?self.kind, params = self.params.len(), "defined JIT function");

        drop(guard);
        Ok(JitFunction {
            id,
            unit: self.unit,
            ret: self.ret,
            params: self.params,
        })
    }

    fn lambda(&mut self, function: &JitFunction) -> Result<JitLambda, BackendError> {
        if !Rc::ptr_eq(&self.unit, &function.unit) {
            return Err(BackendError::Malformed("lambda assembled in another unit"));
        }
        Ok(JitLambda {
            id: function.id,
            params: function.params.len(),
        })
    }
}
