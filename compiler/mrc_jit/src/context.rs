//! Per-call state shared by generated code and helpers.

use std::sync::atomic::{AtomicBool, Ordering};

use mrc_runtime::{RuntimeContext, RuntimeError};
use parking_lot::Mutex;

/// Runtime configuration plus the first error raised during one call.
///
/// Shared across rayon workers when `map`/`reduce` run in parallel.
pub struct JitContext {
    runtime: RuntimeContext,
    failed: AtomicBool,
    error: Mutex<Option<RuntimeError>>,
}

impl JitContext {
    pub fn new(runtime: RuntimeContext) -> Self {
        JitContext {
            runtime,
            failed: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    pub fn runtime(&self) -> &RuntimeContext {
        &self.runtime
    }

    /// Record `error` unless an earlier one is already recorded.
    pub fn fail(&self, error: RuntimeError) {
        let mut slot = self.error.lock();
        if slot.is_none() {
            *slot = Some(error);
        }
        self.failed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// `Err` with the recorded error once anything failed.
    pub fn check(&self) -> Result<(), RuntimeError> {
        if self.is_failed() {
            Err(self.error.lock().clone().unwrap_or(RuntimeError::Cancelled))
        } else {
            Ok(())
        }
    }

    pub fn take_error(&self) -> Option<RuntimeError> {
        self.error.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_wins() {
        let ctx = JitContext::new(RuntimeContext::sequential());
        assert!(ctx.check().is_ok());
        ctx.fail(RuntimeError::DivisionByZero);
        ctx.fail(RuntimeError::Cancelled);
        assert_eq!(ctx.check(), Err(RuntimeError::DivisionByZero));
        assert_eq!(ctx.take_error(), Some(RuntimeError::DivisionByZero));
    }
}
