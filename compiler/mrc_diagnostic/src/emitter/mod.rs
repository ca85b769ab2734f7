//! Listener-based diagnostic reporting.
//!
//! Every reported [`Diagnostic`] is forwarded to all attached listeners and
//! recorded in the innermost open collection frame, if there is one.
//!
//! ```
//! use mrc_diagnostic::{Diagnostic, DiagnosticEmitter, ErrorCode};
//! use mrc_ir::Span;
//!
//! let mut emitter = DiagnosticEmitter::new();
//! let result = emitter.collect(|em| {
//!     em.report(Diagnostic::error(ErrorCode::E2003).with_label(Span::new(0, 1), ""));
//!     em.report(Diagnostic::error(ErrorCode::E2001).with_label(Span::new(4, 5), ""));
//! });
//! assert_eq!(result.unwrap_err().len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::Diagnostic;

/// Receives every diagnostic reported while attached.
pub trait DiagnosticListener: Send + Sync {
    fn on_diagnostic(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticListener for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Handle returned by [`DiagnosticEmitter::add_listener`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ListenerId(u64);

/// Emitter configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiagnosticConfig {
    /// Stop recording errors after this many. `None` means unlimited.
    pub error_limit: Option<usize>,
}

impl DiagnosticConfig {
    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = Some(limit);
        self
    }
}

/// All diagnostics gathered inside one [`DiagnosticEmitter::collect`] call.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CollectedDiagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl CollectedDiagnostics {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        CollectedDiagnostics { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }
}

impl fmt::Display for CollectedDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CollectedDiagnostics {}

#[derive(Default)]
struct Frame {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
}

/// Fans diagnostics out to listeners and open collection frames.
#[derive(Default)]
pub struct DiagnosticEmitter {
    listeners: Vec<(ListenerId, Arc<dyn DiagnosticListener>)>,
    frames: Vec<Frame>,
    next_id: u64,
    config: DiagnosticConfig,
    error_count: usize,
}

impl DiagnosticEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticEmitter {
            config,
            ..Self::default()
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn DiagnosticListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Detach a listener. Returns `false` if it was not attached.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Run `f` with `listener` attached, detaching it afterwards.
    pub fn scoped<R>(
        &mut self,
        listener: Arc<dyn DiagnosticListener>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let id = self.add_listener(listener);
        let result = f(self);
        self.remove_listener(id);
        result
    }

    /// Run `f`, gathering everything it reports.
    ///
    /// Returns `Err` if anything was reported inside `f`. Frames nest;
    /// diagnostics go to the innermost frame only.
    pub fn collect<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Result<R, CollectedDiagnostics> {
        self.frames.push(Frame::default());
        let result = f(self);
        let frame = self.frames.pop().unwrap_or_default();
        if frame.errors > 0 {
            Err(CollectedDiagnostics::new(frame.diagnostics))
        } else {
            Ok(result)
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = %diagnostic.code, message = %diagnostic.message, "diagnostic");
        for (_, listener) in &self.listeners {
            listener.on_diagnostic(&diagnostic);
        }
        self.error_count += 1;
        let limit = self.config.error_limit;
        if let Some(frame) = self.frames.last_mut() {
            frame.errors += 1;
            if limit.is_some_and(|max| frame.errors > max) {
                return;
            }
            frame.diagnostics.push(diagnostic);
        }
    }

    /// Errors reported over the emitter's lifetime.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

impl fmt::Debug for DiagnosticEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticEmitter")
            .field("listeners", &self.listeners.len())
            .field("frames", &self.frames.len())
            .field("error_count", &self.error_count)
            .finish_non_exhaustive()
    }
}
