//! Finalized statement code.

use std::sync::Arc;

use cranelift_jit::JITModule;
use mrc_eval::Evaluable;
use mrc_runtime::{ElementKind, RuntimeContext, RuntimeError, Value};

use crate::context::JitContext;
use crate::helpers::SeqPtr;

type IntEntry = extern "C" fn(*const JitContext, *const u64) -> i64;
type FloatEntry = extern "C" fn(*const JitContext, *const u64) -> f64;
type SeqEntry = extern "C" fn(*const JitContext, *const u64) -> SeqPtr;

/// A compiled statement together with the module owning its code.
pub struct JitArtifact {
    module: Option<JITModule>,
    code: *const u8,
    ret: ElementKind,
    params: Vec<ElementKind>,
}

// SAFETY: the module is never touched again after finalization except to
// free it on drop, and the generated code keeps no global state, so calling
// it from several threads at once is sound.
unsafe impl Send for JitArtifact {}
// SAFETY: see above.
unsafe impl Sync for JitArtifact {}

impl JitArtifact {
    pub(crate) fn new(
        module: JITModule,
        code: *const u8,
        ret: ElementKind,
        params: Vec<ElementKind>,
    ) -> Self {
        JitArtifact {
            module: Some(module),
            code,
            ret,
            params,
        }
    }

    /// Arguments as the 64-bit words the statement function reads.
    ///
    /// Sequence words borrow from `args`, which outlives the call.
    fn words(&self, args: &[Value]) -> Result<Vec<u64>, RuntimeError> {
        if args.len() != self.params.len() {
            return Err(RuntimeError::TypeMismatch {
                expected: "matching argument count",
                found: "different argument count",
            });
        }
        args.iter()
            .zip(&self.params)
            .map(|(value, &kind)| match (value, kind) {
                (Value::Int(v), ElementKind::Int) => Ok(*v as u64),
                (Value::Float(v), ElementKind::Float) => Ok(v.to_bits()),
                (Value::Seq(seq), ElementKind::Object) => Ok(Arc::as_ptr(seq) as usize as u64),
                (other, ElementKind::Int) => Err(mismatch("int", other)),
                (other, ElementKind::Float) => Err(mismatch("float", other)),
                (other, ElementKind::Object) => Err(mismatch("sequence", other)),
            })
            .collect()
    }
}

fn mismatch(expected: &'static str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

impl Evaluable for JitArtifact {
    fn eval(&self, ctx: &RuntimeContext, args: &[Value]) -> Result<Value, RuntimeError> {
        let words = self.words(args)?;
        let jit = JitContext::new(ctx.clone());
        let (jit_ptr, args_ptr) = (std::ptr::from_ref(&jit), words.as_ptr());

        // SAFETY: `code` was finalized with the signature matching `ret`, the
        // module is alive, and `words` holds one word per parameter.
        let value = unsafe {
            match self.ret {
                ElementKind::Int => {
                    let entry = std::mem::transmute::<*const u8, IntEntry>(self.code);
                    Some(Value::Int(entry(jit_ptr, args_ptr)))
                }
                ElementKind::Float => {
                    let entry = std::mem::transmute::<*const u8, FloatEntry>(self.code);
                    Some(Value::Float(entry(jit_ptr, args_ptr)))
                }
                ElementKind::Object => {
                    let entry = std::mem::transmute::<*const u8, SeqEntry>(self.code);
                    let seq = entry(jit_ptr, args_ptr);
                    // null only after a recorded error
                    (!seq.is_null()).then(|| Value::Seq(Arc::from_raw(seq)))
                }
            }
        };

        match jit.take_error() {
            Some(err) => Err(err),
            None => value.ok_or(RuntimeError::TypeMismatch {
                expected: "sequence",
                found: "null",
            }),
        }
    }
}

impl Drop for JitArtifact {
    fn drop(&mut self) {
        if let Some(module) = self.module.take() {
            // SAFETY: the artifact owns the only entry point into this
            // module, and it is being dropped.
            unsafe { module.free_memory() };
        }
    }
}
