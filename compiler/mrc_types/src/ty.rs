//! The type model.

use std::fmt;

/// Scalar types. `Unknown` marks an expression whose type could not be
/// determined because of an earlier error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Integer,
    Float,
    Unknown,
}

impl Primitive {
    pub fn is_numeric(self) -> bool {
        matches!(self, Primitive::Integer | Primitive::Float)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Integer => f.write_str("int"),
            Primitive::Float => f.write_str("float"),
            Primitive::Unknown => f.write_str("{unknown}"),
        }
    }
}

/// Common type of two numeric operands.
///
/// `Unknown` is absorbing: it never widens into a valid type.
pub fn promote(a: Primitive, b: Primitive) -> Primitive {
    match (a, b) {
        (Primitive::Unknown, _) | (_, Primitive::Unknown) => Primitive::Unknown,
        (Primitive::Float, _) | (_, Primitive::Float) => Primitive::Float,
        (Primitive::Integer, Primitive::Integer) => Primitive::Integer,
    }
}

/// A MrCalc type.
///
/// Sequences are normalized: `element` is always the innermost scalar and
/// `depth` counts the nesting, so `[[int]]` is `Sequence { Integer, 2 }`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Primitive(Primitive),
    Sequence { element: Primitive, depth: u32 },
}

impl Type {
    pub const INTEGER: Type = Type::Primitive(Primitive::Integer);
    pub const FLOAT: Type = Type::Primitive(Primitive::Float);
    pub const UNKNOWN: Type = Type::Primitive(Primitive::Unknown);

    /// The sequence type whose elements are `element`.
    pub fn sequence_of(element: Type) -> Type {
        match element {
            Type::Primitive(p) => Type::Sequence {
                element: p,
                depth: 1,
            },
            Type::Sequence { element, depth } => Type::Sequence {
                element,
                depth: depth + 1,
            },
        }
    }

    /// Element type of a sequence, `None` for scalars.
    pub fn element_type(self) -> Option<Type> {
        match self {
            Type::Primitive(_) => None,
            Type::Sequence { element, depth } if depth <= 1 => Some(Type::Primitive(element)),
            Type::Sequence { element, depth } => Some(Type::Sequence {
                element,
                depth: depth - 1,
            }),
        }
    }

    pub fn as_primitive(self) -> Option<Primitive> {
        match self {
            Type::Primitive(p) => Some(p),
            Type::Sequence { .. } => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Type::UNKNOWN
    }

    pub fn is_sequence(self) -> bool {
        matches!(self, Type::Sequence { .. })
    }
}

impl From<Primitive> for Type {
    fn from(p: Primitive) -> Self {
        Type::Primitive(p)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Sequence { element, depth } => {
                for _ in 0..*depth {
                    f.write_str("[")?;
                }
                write!(f, "{element}")?;
                for _ in 0..*depth {
                    f.write_str("]")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn promotion_widens_to_float() {
        use Primitive::{Float, Integer};
        assert_eq!(promote(Integer, Integer), Integer);
        assert_eq!(promote(Integer, Float), Float);
        assert_eq!(promote(Float, Integer), Float);
        assert_eq!(promote(Float, Float), Float);
    }

    #[test]
    fn unknown_never_widens() {
        use Primitive::{Float, Integer, Unknown};
        for other in [Integer, Float, Unknown] {
            assert_eq!(promote(Unknown, other), Unknown);
            assert_eq!(promote(other, Unknown), Unknown);
        }
    }

    #[test]
    fn nested_sequences_normalize() {
        let ints = Type::sequence_of(Type::INTEGER);
        let nested = Type::sequence_of(ints);
        assert_eq!(
            nested,
            Type::Sequence {
                element: Primitive::Integer,
                depth: 2
            }
        );
        assert_eq!(nested.element_type(), Some(ints));
        assert_eq!(ints.element_type(), Some(Type::INTEGER));
        assert_eq!(Type::FLOAT.element_type(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Type::INTEGER.to_string(), "int");
        assert_eq!(
            Type::sequence_of(Type::sequence_of(Type::FLOAT)).to_string(),
            "[[float]]"
        );
    }
}
