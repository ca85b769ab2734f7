//! Stack growth for recursive traversals.
//!
//! Inference and expression building recurse once per AST level. Programs
//! produced by an external parser can nest arbitrarily deep (long operator
//! chains, lambdas inside lambdas), so every recursive step goes through
//! [`ensure_sufficient_stack`].

/// Grow the stack when fewer than this many bytes remain.
const RED_ZONE: usize = 64 * 1024;

/// Size of each newly allocated stack segment.
const GROWTH: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
