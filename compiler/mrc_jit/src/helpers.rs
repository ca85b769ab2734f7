//! C-ABI helpers called from generated code.
//!
//! Every helper takes the [`JitContext`] first (except `mrc_float_pow` and
//! `mrc_seq_retain`, which cannot fail), never panics, and reports failure by
//! recording an error and returning a neutral value (`0`, `0.0` or null).
//! Helpers skip their work once the context has failed.

use std::ptr;
use std::sync::Arc;

use cranelift_codegen::ir::{types, Type as ClType};
use mrc_runtime::arith::{float_pow, int_div, int_pow, int_to_float};
use mrc_runtime::{
    map_by, range, range_inclusive, reduce_by, ElementKind, IntSequence, RuntimeError, Sequence,
    Value,
};

use crate::context::JitContext;

/// A sequence crossing the native boundary.
pub type SeqPtr = *const Sequence;

/// One-parameter lambda as seen from Rust.
pub type MapFn<A, R> = extern "C" fn(*const JitContext, A) -> R;

/// Two-parameter lambda as seen from Rust.
pub type FoldFn<T> = extern "C" fn(*const JitContext, T, T) -> T;

/// Native type of a value of `kind`.
pub(crate) fn cl_type(kind: ElementKind, ptr_ty: ClType) -> ClType {
    match kind {
        ElementKind::Int => types::I64,
        ElementKind::Float => types::F64,
        ElementKind::Object => ptr_ty,
    }
}

/// Hand an owned sequence to generated code.
fn into_raw(seq: Sequence) -> SeqPtr {
    Arc::into_raw(Arc::new(seq))
}

/// Adopt an owned sequence pointer. Null stays `None`.
///
/// # Safety
///
/// `seq` must be null or come from [`Arc::into_raw`] with a strong count the
/// caller owns.
unsafe fn adopt(seq: SeqPtr) -> Option<Arc<Sequence>> {
    if seq.is_null() {
        None
    } else {
        // SAFETY: guaranteed by the caller.
        Some(unsafe { Arc::from_raw(seq) })
    }
}

/// Add one strong reference to `seq`. Null passes through.
pub extern "C" fn mrc_seq_retain(seq: SeqPtr) -> SeqPtr {
    if !seq.is_null() {
        // SAFETY: generated code only passes pointers produced by `into_raw`
        // or borrowed from a live `Arc<Sequence>`.
        unsafe { Arc::increment_strong_count(seq) };
    }
    seq
}

/// `[start, end)` as a fresh sequence.
pub extern "C" fn mrc_range(ctx: *const JitContext, start: i64, end: i64) -> SeqPtr {
    new_range(ctx, range(start, end))
}

/// `[start, end]` as a fresh sequence.
pub extern "C" fn mrc_range_inclusive(ctx: *const JitContext, start: i64, end: i64) -> SeqPtr {
    new_range(ctx, range_inclusive(start, end))
}

fn new_range(ctx: *const JitContext, seq: Result<IntSequence, RuntimeError>) -> SeqPtr {
    // SAFETY: generated code passes the context of the running call.
    let Some(jit) = (unsafe { ctx.as_ref() }) else {
        return ptr::null();
    };
    if jit.is_failed() {
        return ptr::null();
    }
    match seq {
        Ok(seq) => into_raw(seq.into()),
        Err(err) => {
            jit.fail(err);
            ptr::null()
        }
    }
}

pub extern "C" fn mrc_int_div(ctx: *const JitContext, a: i64, b: i64) -> i64 {
    checked(ctx, int_div(a, b))
}

pub extern "C" fn mrc_int_pow(ctx: *const JitContext, a: i64, b: i64) -> i64 {
    checked(ctx, int_pow(a, b))
}

pub extern "C" fn mrc_float_pow(a: f64, b: f64) -> f64 {
    float_pow(a, b)
}

fn checked(ctx: *const JitContext, result: Result<i64, RuntimeError>) -> i64 {
    result.unwrap_or_else(|err| {
        // SAFETY: generated code passes the context of the running call.
        if let Some(jit) = unsafe { ctx.as_ref() } {
            jit.fail(err);
        }
        0
    })
}

/// Element types generated code can receive from a sequence.
trait InLane: Copy {
    const EXPECTED: &'static str;

    fn accepts(seq: &Sequence) -> bool;

    /// Element `index` of a sequence `accepts` returned true for.
    fn read(seq: &Sequence, index: usize) -> Self;
}

impl InLane for i64 {
    const EXPECTED: &'static str = "int sequence";

    fn accepts(seq: &Sequence) -> bool {
        matches!(seq, Sequence::Int(_))
    }

    fn read(seq: &Sequence, index: usize) -> i64 {
        match seq {
            Sequence::Int(s) => s.values().get(index).copied().unwrap_or_default(),
            _ => 0,
        }
    }
}

impl InLane for f64 {
    const EXPECTED: &'static str = "numeric sequence";

    fn accepts(seq: &Sequence) -> bool {
        matches!(seq, Sequence::Int(_) | Sequence::Float(_))
    }

    fn read(seq: &Sequence, index: usize) -> f64 {
        match seq {
            Sequence::Float(s) => s.values().get(index).copied().unwrap_or_default(),
            Sequence::Int(s) => int_to_float(s.values().get(index).copied().unwrap_or_default()),
            Sequence::Object(_) => 0.0,
        }
    }
}

impl InLane for SeqPtr {
    const EXPECTED: &'static str = "nested sequence";

    fn accepts(seq: &Sequence) -> bool {
        matches!(seq, Sequence::Object(_))
    }

    /// Borrowed: the element stays owned by `seq`.
    fn read(seq: &Sequence, index: usize) -> SeqPtr {
        match seq {
            Sequence::Object(s) => match s.values().get(index) {
                Some(Value::Seq(inner)) => Arc::as_ptr(inner),
                _ => ptr::null(),
            },
            _ => ptr::null(),
        }
    }
}

/// Results generated code can hand back for a sequence element.
trait OutLane: Copy {
    type Elem: Send;

    fn take(self) -> Result<Self::Elem, RuntimeError>;

    fn collect(elems: Vec<Self::Elem>) -> Sequence;
}

impl OutLane for i64 {
    type Elem = i64;

    fn take(self) -> Result<i64, RuntimeError> {
        Ok(self)
    }

    fn collect(elems: Vec<i64>) -> Sequence {
        elems.into()
    }
}

impl OutLane for f64 {
    type Elem = f64;

    fn take(self) -> Result<f64, RuntimeError> {
        Ok(self)
    }

    fn collect(elems: Vec<f64>) -> Sequence {
        elems.into()
    }
}

impl OutLane for SeqPtr {
    type Elem = Value;

    fn take(self) -> Result<Value, RuntimeError> {
        // SAFETY: lambdas return owned pointers.
        match unsafe { adopt(self) } {
            Some(seq) => Ok(Value::Seq(seq)),
            None => Err(RuntimeError::TypeMismatch {
                expected: "sequence",
                found: "null",
            }),
        }
    }

    fn collect(elems: Vec<Value>) -> Sequence {
        elems.into()
    }
}

fn mismatch<A: InLane>(seq: &Sequence) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected: A::EXPECTED,
        found: match seq.kind() {
            ElementKind::Int => "int sequence",
            ElementKind::Float => "float sequence",
            ElementKind::Object => "nested sequence",
        },
    }
}

fn map_lanes<A: InLane, R: OutLane>(
    ctx: *const JitContext,
    seq: SeqPtr,
    f: MapFn<A, R>,
) -> SeqPtr {
    // SAFETY: generated code passes the context of the running call.
    let Some(jit) = (unsafe { ctx.as_ref() }) else {
        return ptr::null();
    };
    // SAFETY: the sequence argument is owned by this call.
    let Some(source) = (unsafe { adopt(seq) }) else {
        return ptr::null();
    };
    if jit.is_failed() {
        return ptr::null();
    }
    if !A::accepts(&source) {
        jit.fail(mismatch::<A>(&source));
        return ptr::null();
    }
    let mapped = map_by(jit.runtime(), source.len(), |i| {
        let out = f(ptr::from_ref(jit), A::read(&source, i)).take();
        jit.check()?;
        out
    });
    match mapped {
        Ok(elems) => into_raw(R::collect(elems)),
        Err(err) => {
            jit.fail(err);
            ptr::null()
        }
    }
}

fn reduce_lanes<T: InLane + Default + Send>(
    ctx: *const JitContext,
    seq: SeqPtr,
    neutral: T,
    f: FoldFn<T>,
) -> T {
    // SAFETY: generated code passes the context of the running call.
    let Some(jit) = (unsafe { ctx.as_ref() }) else {
        return T::default();
    };
    // SAFETY: the sequence argument is owned by this call.
    let Some(source) = (unsafe { adopt(seq) }) else {
        return T::default();
    };
    if jit.is_failed() {
        return T::default();
    }
    if !T::accepts(&source) {
        jit.fail(mismatch::<T>(&source));
        return T::default();
    }
    let reduced = reduce_by(
        jit.runtime(),
        source.len(),
        |i| T::read(&source, i),
        neutral,
        |a, b| {
            let out = f(ptr::from_ref(jit), a, b);
            jit.check()?;
            Ok(out)
        },
    );
    reduced.unwrap_or_else(|err| {
        jit.fail(err);
        T::default()
    })
}

pub extern "C" fn mrc_reduce_int(
    ctx: *const JitContext,
    seq: SeqPtr,
    neutral: i64,
    f: FoldFn<i64>,
) -> i64 {
    reduce_lanes(ctx, seq, neutral, f)
}

pub extern "C" fn mrc_reduce_float(
    ctx: *const JitContext,
    seq: SeqPtr,
    neutral: f64,
    f: FoldFn<f64>,
) -> f64 {
    reduce_lanes(ctx, seq, neutral, f)
}

macro_rules! map_helpers {
    ($($name:ident: $from:ty => $to:ty;)*) => {
        $(
            pub extern "C" fn $name(
                ctx: *const JitContext,
                seq: SeqPtr,
                f: MapFn<$from, $to>,
            ) -> SeqPtr {
                map_lanes(ctx, seq, f)
            }
        )*
    };
}

map_helpers! {
    mrc_map_ii: i64 => i64;
    mrc_map_if: i64 => f64;
    mrc_map_io: i64 => SeqPtr;
    mrc_map_fi: f64 => i64;
    mrc_map_ff: f64 => f64;
    mrc_map_fo: f64 => SeqPtr;
    mrc_map_oi: SeqPtr => i64;
    mrc_map_of: SeqPtr => f64;
    mrc_map_oo: SeqPtr => SeqPtr;
}

/// Helpers generated code can import.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Helper {
    SeqRetain,
    Range,
    RangeInclusive,
    IntDiv,
    IntPow,
    FloatPow,
    Map(ElementKind, ElementKind),
    ReduceInt,
    ReduceFloat,
}

const KINDS: [ElementKind; 3] = [ElementKind::Int, ElementKind::Float, ElementKind::Object];

impl Helper {
    pub fn all() -> impl Iterator<Item = Helper> {
        let maps = KINDS
            .into_iter()
            .flat_map(|from| KINDS.into_iter().map(move |to| Helper::Map(from, to)));
        [
            Helper::SeqRetain,
            Helper::Range,
            Helper::RangeInclusive,
            Helper::IntDiv,
            Helper::IntPow,
            Helper::FloatPow,
            Helper::ReduceInt,
            Helper::ReduceFloat,
        ]
        .into_iter()
        .chain(maps)
    }

    pub fn symbol(self) -> &'static str {
        use ElementKind::{Float, Int, Object};
        match self {
            Helper::SeqRetain => "mrc_seq_retain",
            Helper::Range => "mrc_range",
            Helper::RangeInclusive => "mrc_range_inclusive",
            Helper::IntDiv => "mrc_int_div",
            Helper::IntPow => "mrc_int_pow",
            Helper::FloatPow => "mrc_float_pow",
            Helper::ReduceInt => "mrc_reduce_int",
            Helper::ReduceFloat => "mrc_reduce_float",
            Helper::Map(Int, Int) => "mrc_map_ii",
            Helper::Map(Int, Float) => "mrc_map_if",
            Helper::Map(Int, Object) => "mrc_map_io",
            Helper::Map(Float, Int) => "mrc_map_fi",
            Helper::Map(Float, Float) => "mrc_map_ff",
            Helper::Map(Float, Object) => "mrc_map_fo",
            Helper::Map(Object, Int) => "mrc_map_oi",
            Helper::Map(Object, Float) => "mrc_map_of",
            Helper::Map(Object, Object) => "mrc_map_oo",
        }
    }

    pub fn address(self) -> *const u8 {
        use ElementKind::{Float, Int, Object};
        match self {
            Helper::SeqRetain => mrc_seq_retain as *const u8,
            Helper::Range => mrc_range as *const u8,
            Helper::RangeInclusive => mrc_range_inclusive as *const u8,
            Helper::IntDiv => mrc_int_div as *const u8,
            Helper::IntPow => mrc_int_pow as *const u8,
            Helper::FloatPow => mrc_float_pow as *const u8,
            Helper::ReduceInt => mrc_reduce_int as *const u8,
            Helper::ReduceFloat => mrc_reduce_float as *const u8,
            Helper::Map(Int, Int) => mrc_map_ii as *const u8,
            Helper::Map(Int, Float) => mrc_map_if as *const u8,
            Helper::Map(Int, Object) => mrc_map_io as *const u8,
            Helper::Map(Float, Int) => mrc_map_fi as *const u8,
            Helper::Map(Float, Float) => mrc_map_ff as *const u8,
            Helper::Map(Float, Object) => mrc_map_fo as *const u8,
            Helper::Map(Object, Int) => mrc_map_oi as *const u8,
            Helper::Map(Object, Float) => mrc_map_of as *const u8,
            Helper::Map(Object, Object) => mrc_map_oo as *const u8,
        }
    }

    /// Parameter and return types. `ptr_ty` covers contexts, sequences and
    /// function pointers.
    pub(crate) fn signature(self, ptr_ty: ClType) -> (Vec<ClType>, ClType) {
        let (i, f, p) = (types::I64, types::F64, ptr_ty);
        match self {
            Helper::SeqRetain => (vec![p], p),
            Helper::Range | Helper::RangeInclusive => (vec![p, i, i], p),
            Helper::IntDiv | Helper::IntPow => (vec![p, i, i], i),
            Helper::FloatPow => (vec![f, f], f),
            Helper::ReduceInt => (vec![p, p, i, p], i),
            Helper::ReduceFloat => (vec![p, p, f, p], f),
            Helper::Map(..) => (vec![p, p, p], p),
        }
    }
}
