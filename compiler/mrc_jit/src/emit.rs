//! Deferred instruction emission.
//!
//! The expression algebra is bottom-up, but Cranelift instructions can only
//! be emitted once the function builder for the enclosing function exists.
//! A [`Node`] therefore captures what to emit and runs when the assembler
//! builds the function body.

use cranelift_codegen::ir::{types, InstBuilder, MemFlags, Type as ClType, Value as ClValue};
use cranelift_frontend::FunctionBuilder;
use cranelift_jit::JITModule;
use cranelift_module::{FuncId, Module};
use mrc_eval::BackendError;
use mrc_runtime::ElementKind;

use crate::helpers::{cl_type, Helper};

/// A deferred expression.
pub type Node = Box<dyn FnOnce(&mut Emit<'_, '_>) -> Result<ClValue, BackendError>>;

pub(crate) fn node<F>(f: F) -> Node
where
    F: FnOnce(&mut Emit<'_, '_>) -> Result<ClValue, BackendError> + 'static,
{
    Box::new(f)
}

/// Where parameters come from.
pub(crate) enum Params {
    /// Statement functions read 64-bit words from an argument array.
    Memory {
        base: ClValue,
        kinds: Vec<ElementKind>,
    },
    /// Lambdas receive their parameters in registers.
    Registers {
        values: Vec<ClValue>,
        kinds: Vec<ElementKind>,
    },
}

/// Emission state for one function body.
pub struct Emit<'a, 'f> {
    pub(crate) builder: &'a mut FunctionBuilder<'f>,
    pub(crate) module: &'a mut JITModule,
    pub(crate) helpers: &'a [(Helper, FuncId)],
    pub(crate) ptr_ty: ClType,
    pub(crate) ctx: ClValue,
    pub(crate) params: Params,
}

impl Emit<'_, '_> {
    pub(crate) fn iconst(&mut self, value: i64) -> ClValue {
        self.builder.ins().iconst(types::I64, value)
    }

    pub(crate) fn fconst(&mut self, value: f64) -> ClValue {
        self.builder.ins().f64const(value)
    }

    /// Call `helper` and return its single result.
    pub(crate) fn call(
        &mut self,
        helper: Helper,
        args: &[ClValue],
    ) -> Result<ClValue, BackendError> {
        let id = self
            .helpers
            .iter()
            .find_map(|&(h, id)| (h == helper).then_some(id))
            .ok_or_else(|| BackendError::Codegen(format!("{} not declared", helper.symbol())))?;
        let callee = self.module.declare_func_in_func(id, self.builder.func);
        let inst = self.builder.ins().call(callee, args);
        self.builder
            .inst_results(inst)
            .first()
            .copied()
            .ok_or_else(|| BackendError::Codegen(format!("{} returns nothing", helper.symbol())))
    }

    /// Address of a function defined in this module.
    pub(crate) fn func_addr(&mut self, id: FuncId) -> ClValue {
        let callee = self.module.declare_func_in_func(id, self.builder.func);
        self.builder.ins().func_addr(self.ptr_ty, callee)
    }

    /// Load parameter `slot`. Sequences are retained so the result is owned.
    pub(crate) fn param(&mut self, slot: usize) -> Result<ClValue, BackendError> {
        let out_of_range = || BackendError::Malformed("parameter slot out of range");
        let (value, kind) = match &self.params {
            Params::Memory { base, kinds } => {
                let kind = *kinds.get(slot).ok_or_else(out_of_range)?;
                let offset = i32::try_from(slot * 8).map_err(|_| out_of_range())?;
                let ty = cl_type(kind, self.ptr_ty);
                let value = self.builder.ins().load(ty, MemFlags::trusted(), *base, offset);
                (value, kind)
            }
            Params::Registers { values, kinds } => {
                let value = *values.get(slot).ok_or_else(out_of_range)?;
                (value, *kinds.get(slot).ok_or_else(out_of_range)?)
            }
        };
        if kind == ElementKind::Object {
            self.call(Helper::SeqRetain, &[value])
        } else {
            Ok(value)
        }
    }
}
