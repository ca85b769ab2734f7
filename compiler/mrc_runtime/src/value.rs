//! Runtime values.

use std::fmt;
use std::sync::Arc;

use crate::{ElementKind, RuntimeError, Sequence};

/// The result of evaluating an expression.
///
/// Sequences are reference counted and immutable, so cloning a value is
/// always cheap.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Seq(Arc<Sequence>),
}

impl Value {
    pub fn seq(sequence: impl Into<Sequence>) -> Self {
        Value::Seq(Arc::new(sequence.into()))
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Value::Int(_) => ElementKind::Int,
            Value::Float(_) => ElementKind::Float,
            Value::Seq(_) => ElementKind::Object,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Seq(_) => "sequence",
        }
    }

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_float(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Float(v) => Ok(*v),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_seq(&self) -> Result<&Arc<Sequence>, RuntimeError> {
        match self {
            Value::Seq(s) => Ok(s),
            other => Err(other.mismatch("sequence")),
        }
    }

    /// Whether two values are identical, comparing floats by bit pattern.
    pub fn bit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Seq(a), Value::Seq(b)) => a.bit_eq(b),
            _ => false,
        }
    }

    fn mismatch(&self, expected: &'static str) -> RuntimeError {
        RuntimeError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl fmt::Display for Value {
    /// Integers in decimal, floats in shortest round-trip form with a
    /// trailing `.0` when integral.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Seq(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_display() {
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
    }

    #[test]
    fn accessors_report_mismatches() {
        assert_eq!(Value::Int(1).as_int(), Ok(1));
        assert_eq!(
            Value::Int(1).as_float(),
            Err(RuntimeError::TypeMismatch {
                expected: "float",
                found: "int"
            })
        );
        assert!(Value::Float(1.0).as_seq().is_err());
    }

    #[test]
    fn bit_equality_distinguishes_zero_signs() {
        assert!(Value::Float(0.0).bit_eq(&Value::Float(0.0)));
        assert!(!Value::Float(0.0).bit_eq(&Value::Float(-0.0)));
        assert!(!Value::Int(0).bit_eq(&Value::Float(0.0)));
    }
}
