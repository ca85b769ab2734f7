//! Sequence operations.
//!
//! [`map_by`] and [`reduce_by`] are the generic cores, parameterized over
//! element access so compiled code can run them on unboxed `i64`/`f64`
//! lanes. [`map`] and [`reduce`] are the [`Value`]-level entry points.

use rayon::prelude::*;

use crate::{ElementKind, IntSequence, RuntimeContext, RuntimeError, Sequence, Value};

/// Largest sequence `range` will materialize (`i32::MAX`).
pub const MAX_SEQUENCE_LEN: usize = 0x7fff_ffff;

/// Integers in `[start, end)`. Empty when `end <= start`.
pub fn range(start: i64, end: i64) -> Result<IntSequence, RuntimeError> {
    if end <= start {
        return Ok(IntSequence::default());
    }
    materialize(start, end - 1)
}

/// Integers in `[start, end]`. Empty when `end < start`.
///
/// The length is computed in `i128`, so `end == i64::MAX` overflows the
/// sequence limit instead of wrapping to an empty range.
pub fn range_inclusive(start: i64, end: i64) -> Result<IntSequence, RuntimeError> {
    if end < start {
        return Ok(IntSequence::default());
    }
    materialize(start, end)
}

/// `start..=last` with `start <= last`.
fn materialize(start: i64, last: i64) -> Result<IntSequence, RuntimeError> {
    let len = i128::from(last) - i128::from(start) + 1;
    if len > i128::from(i32::MAX) {
        return Err(RuntimeError::RangeOverflow {
            start,
            last,
            max: MAX_SEQUENCE_LEN,
        });
    }
    Ok((start..=last).collect::<Vec<_>>().into())
}

/// Compute `f(0)..f(len)` in order, stopping at the first error.
pub fn map_by<T, F>(ctx: &RuntimeContext, len: usize, f: F) -> Result<Vec<T>, RuntimeError>
where
    T: Send,
    F: Fn(usize) -> Result<T, RuntimeError> + Sync + Send,
{
    if ctx.is_parallel_for(len) {
        tracing::trace!(len, "parallel map");
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}

/// Fold `item(0)..item(len)` into `neutral` with `op`.
///
/// Sequentially this is the left fold `op(..op(op(neutral, x0), x1).., xn)`.
/// In parallel the elements are combined in an unspecified tree shape and the
/// result folded into `neutral` last, so `op` must be associative.
pub fn reduce_by<T, I, F>(
    ctx: &RuntimeContext,
    len: usize,
    item: I,
    neutral: T,
    op: F,
) -> Result<T, RuntimeError>
where
    T: Send,
    I: Fn(usize) -> T + Sync + Send,
    F: Fn(T, T) -> Result<T, RuntimeError> + Sync + Send,
{
    if ctx.is_parallel_for(len) {
        tracing::trace!(len, "parallel reduce");
        let combined = (0..len)
            .into_par_iter()
            .map(|i| Ok::<T, RuntimeError>(item(i)))
            .try_reduce_with(|a, b| op(a, b));
        match combined {
            Some(partial) => op(neutral, partial?),
            None => Ok(neutral),
        }
    } else {
        (0..len).try_fold(neutral, |acc, i| op(acc, item(i)))
    }
}

/// Apply `f` to every element, collecting results of kind `out`.
pub fn map<F>(
    ctx: &RuntimeContext,
    seq: &Sequence,
    out: ElementKind,
    f: F,
) -> Result<Sequence, RuntimeError>
where
    F: Fn(Value) -> Result<Value, RuntimeError> + Sync + Send,
{
    let len = seq.len();
    let mapped = match out {
        ElementKind::Int => Sequence::from(map_by(ctx, len, |i| f(seq.value(i))?.as_int())?),
        ElementKind::Float => Sequence::from(map_by(ctx, len, |i| f(seq.value(i))?.as_float())?),
        ElementKind::Object => Sequence::from(map_by(ctx, len, |i| f(seq.value(i)))?),
    };
    Ok(mapped)
}

/// Fold every element of `seq` into `neutral`.
///
/// Elements are converted to the kind of `neutral` first, so an integer
/// sequence can be reduced into a float accumulator.
pub fn reduce<F>(
    ctx: &RuntimeContext,
    seq: &Sequence,
    neutral: Value,
    op: F,
) -> Result<Value, RuntimeError>
where
    F: Fn(Value, Value) -> Result<Value, RuntimeError> + Sync + Send,
{
    let kind = neutral.kind();
    reduce_by(ctx, seq.len(), |i| seq.value_as(i, kind), neutral, op)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
