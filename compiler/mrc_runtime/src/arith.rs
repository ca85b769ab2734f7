//! Numeric kernels.
//!
//! Integer arithmetic wraps on overflow. Operations that native code cannot
//! express with a single instruction (division with its zero check, both
//! powers) live here so the interpreter and compiled code call the very same
//! functions.

use crate::RuntimeError;

#[inline]
pub fn int_add(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

#[inline]
pub fn int_sub(a: i64, b: i64) -> i64 {
    a.wrapping_sub(b)
}

#[inline]
pub fn int_mul(a: i64, b: i64) -> i64 {
    a.wrapping_mul(b)
}

#[inline]
pub fn int_neg(a: i64) -> i64 {
    a.wrapping_neg()
}

/// Truncating division. `i64::MIN / -1` wraps to `i64::MIN`.
#[inline]
pub fn int_div(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(a.wrapping_div(b))
}

/// Integer power by squaring, wrapping on overflow.
///
/// Negative exponents follow `1 / base^-exp` truncated toward zero.
pub fn int_pow(base: i64, exp: i64) -> Result<i64, RuntimeError> {
    if exp < 0 {
        return match base {
            0 => Err(RuntimeError::DivisionByZero),
            1 => Ok(1),
            -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
            _ => Ok(0),
        };
    }
    let mut result: i64 = 1;
    let mut base = base;
    let mut exp = exp.unsigned_abs();
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        exp >>= 1;
        if exp > 0 {
            base = base.wrapping_mul(base);
        }
    }
    Ok(result)
}

#[inline]
pub fn float_pow(base: f64, exp: f64) -> f64 {
    base.powf(exp)
}

/// Integer to float promotion.
#[inline]
#[expect(
    clippy::cast_precision_loss,
    reason = "promotion rounds large integers like every numeric language does"
)]
pub fn int_to_float(v: i64) -> f64 {
    v as f64
}

/// Float to integer, truncating toward zero and saturating. NaN becomes 0.
#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "saturating conversion is the documented behavior"
)]
pub fn float_to_int(v: f64) -> i64 {
    v as i64
}
