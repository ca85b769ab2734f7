//! Immutable sequences.
//!
//! The representation follows the element kind: unboxed `i64` and `f64`
//! storage for scalars, boxed [`Value`]s for everything else (sequences of
//! sequences). All three offer O(1) random access.

use std::fmt;

use crate::arith::int_to_float;
use crate::Value;

/// Sequences longer than this print elided.
const ELIDE_ABOVE: usize = 20;
/// Elements printed at each end of an elided sequence.
const ELIDED_EDGE: usize = 5;

/// Element kind, which selects the sequence representation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementKind {
    Int,
    Float,
    Object,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntSequence {
    values: Box<[i64]>,
}

impl IntSequence {
    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

impl From<Vec<i64>> for IntSequence {
    fn from(values: Vec<i64>) -> Self {
        IntSequence {
            values: values.into_boxed_slice(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatSequence {
    values: Box<[f64]>,
}

impl FloatSequence {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for FloatSequence {
    fn from(values: Vec<f64>) -> Self {
        FloatSequence {
            values: values.into_boxed_slice(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectSequence {
    values: Box<[Value]>,
}

impl ObjectSequence {
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl From<Vec<Value>> for ObjectSequence {
    fn from(values: Vec<Value>) -> Self {
        ObjectSequence {
            values: values.into_boxed_slice(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Sequence {
    Int(IntSequence),
    Float(FloatSequence),
    Object(ObjectSequence),
}

impl Sequence {
    pub fn kind(&self) -> ElementKind {
        match self {
            Sequence::Int(_) => ElementKind::Int,
            Sequence::Float(_) => ElementKind::Float,
            Sequence::Object(_) => ElementKind::Object,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Sequence::Int(s) => s.values.len(),
            Sequence::Float(s) => s.values.len(),
            Sequence::Object(s) => s.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Sequence::Int(s) => s.values.get(index).copied().map(Value::Int),
            Sequence::Float(s) => s.values.get(index).copied().map(Value::Float),
            Sequence::Object(s) => s.values.get(index).cloned(),
        }
    }

    /// Element `index` converted to `kind`. Integers widen to floats; every
    /// other combination returns the element unchanged.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn value_as(&self, index: usize, kind: ElementKind) -> Value {
        match (self, kind) {
            (Sequence::Int(s), ElementKind::Float) => Value::Float(int_to_float(s.values[index])),
            (Sequence::Int(s), _) => Value::Int(s.values[index]),
            (Sequence::Float(s), _) => Value::Float(s.values[index]),
            (Sequence::Object(s), _) => s.values[index].clone(),
        }
    }

    /// Element `index` as stored.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn value(&self, index: usize) -> Value {
        self.value_as(index, self.kind())
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(|i| self.value(i))
    }

    pub fn bit_eq(&self, other: &Sequence) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.bit_eq(&b))
    }
}

impl From<Vec<i64>> for Sequence {
    fn from(values: Vec<i64>) -> Self {
        Sequence::Int(values.into())
    }
}

impl From<Vec<f64>> for Sequence {
    fn from(values: Vec<f64>) -> Self {
        Sequence::Float(values.into())
    }
}

impl From<Vec<Value>> for Sequence {
    fn from(values: Vec<Value>) -> Self {
        Sequence::Object(values.into())
    }
}

impl From<IntSequence> for Sequence {
    fn from(seq: IntSequence) -> Self {
        Sequence::Int(seq)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        f.write_str("[")?;
        if len > ELIDE_ABOVE {
            for i in 0..ELIDED_EDGE {
                write!(f, "{}, ", self.value(i))?;
            }
            write!(f, "... ({} more) ...", len - 2 * ELIDED_EDGE)?;
            for i in len - ELIDED_EDGE..len {
                write!(f, ", {}", self.value(i))?;
            }
        } else {
            for i in 0..len {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", self.value(i))?;
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests;
