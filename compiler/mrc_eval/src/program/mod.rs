//! Statements, memory and the program executor.
//!
//! A program runs strictly in textual order on one thread. [`Memory`] is the
//! only state that crosses statement boundaries and belongs to exactly one
//! run.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use mrc_ir::Span;
use mrc_runtime::{RuntimeContext, RuntimeError, Value};
use mrc_types::Variable;

use crate::algebra::Evaluable;
use crate::{ExecError, PrintHandler};

/// Variable bindings of one program run. Each variable is written once.
#[derive(Default)]
pub struct Memory {
    values: FxHashMap<Variable, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &Variable) -> Result<&Value, RuntimeError> {
        self.values
            .get(var)
            .ok_or_else(|| RuntimeError::UnboundVariable {
                name: var.name().to_owned(),
            })
    }

    /// Bind `var`. Rebinding within one run is an error.
    pub fn bind(&mut self, var: Variable, value: Value) -> Result<(), RuntimeError> {
        if self.values.contains_key(&var) {
            return Err(RuntimeError::AlreadyBound {
                name: var.name().to_owned(),
            });
        }
        self.values.insert(var, value);
        Ok(())
    }

    /// Value bound to the user variable called `name`.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(var, _)| var.name() == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(k, v)| (k.name(), v)))
            .finish()
    }
}

/// One compiled statement: a callable, the variables it reads, the variable
/// it writes.
pub struct Stmt {
    callable: Arc<dyn Evaluable>,
    inputs: Vec<Variable>,
    output: Variable,
    span: Span,
}

impl Stmt {
    pub fn new(
        callable: Arc<dyn Evaluable>,
        inputs: Vec<Variable>,
        output: Variable,
        span: Span,
    ) -> Self {
        Stmt {
            callable,
            inputs,
            output,
            span,
        }
    }

    /// Read the inputs from `memory`, run, and bind the output.
    pub fn exec(&self, ctx: &RuntimeContext, memory: &mut Memory) -> Result<Value, RuntimeError> {
        let args = self
            .inputs
            .iter()
            .map(|var| memory.get(var).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let value = self.callable.eval(ctx, &args)?;
        memory.bind(self.output.clone(), value.clone())?;
        Ok(value)
    }

    pub fn inputs(&self) -> &[Variable] {
        &self.inputs
    }

    pub fn output(&self) -> &Variable {
        &self.output
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Whether the result goes to the output sink.
    pub fn prints(&self) -> bool {
        self.output.is_print_marker()
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stmt")
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

/// Cooperative cancellation flag, checked before every statement.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Compiled statements in program order.
#[derive(Debug, Default)]
pub struct CompiledProgram {
    stmts: Vec<Stmt>,
}

impl CompiledProgram {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        CompiledProgram { stmts }
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Run every statement in order, printing the marked ones.
    pub fn execute(
        &self,
        ctx: &RuntimeContext,
        memory: &mut Memory,
        out: &PrintHandler,
    ) -> Result<(), ExecError> {
        self.execute_with_cancel(ctx, memory, out, &CancelToken::new())
    }

    pub fn execute_with_cancel(
        &self,
        ctx: &RuntimeContext,
        memory: &mut Memory,
        out: &PrintHandler,
        cancel: &CancelToken,
    ) -> Result<(), ExecError> {
        for (index, stmt) in self.stmts.iter().enumerate() {
            let fail = |error: RuntimeError| ExecError {
                span: stmt.span,
                error,
            };
            if cancel.is_cancelled() {
                tracing::debug!(stmt = index, "cancelled");
                return Err(fail(RuntimeError::Cancelled));
            }
            tracing::trace!(stmt = index, output = %stmt.output, "executing");
            let value = stmt.exec(ctx, memory).map_err(fail)?;
            if stmt.prints() {
                out.print_value(&value);
            }
        }
        Ok(())
    }
}
