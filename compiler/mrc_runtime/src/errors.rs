//! Runtime errors.

/// Errors raised while executing a compiled program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// A statement read a variable no earlier statement wrote.
    #[error("unbound variable `{name}`")]
    UnboundVariable { name: String },

    /// A statement wrote a variable that was already written in this run.
    #[error("variable `{name}` is already bound")]
    AlreadyBound { name: String },

    /// `last` is the largest element the range would contain.
    #[error("range {start}..={last} has more than {max} elements")]
    RangeOverflow { start: i64, last: i64, max: usize },

    #[error("division by zero")]
    DivisionByZero,

    /// A value had a different shape than the compiled code expected.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("execution cancelled")]
    Cancelled,
}

impl RuntimeError {
    /// Whether this error signals a compiler bug rather than a problem in
    /// the user's program. Type-checked programs never raise these.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RuntimeError::UnboundVariable { .. }
                | RuntimeError::AlreadyBound { .. }
                | RuntimeError::TypeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_classification() {
        assert!(RuntimeError::UnboundVariable { name: "x".into() }.is_internal());
        assert!(!RuntimeError::DivisionByZero.is_internal());
        assert!(!RuntimeError::Cancelled.is_internal());
    }

    #[test]
    fn messages() {
        let err = RuntimeError::RangeOverflow {
            start: 0,
            last: 4_999_999_999,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "range 0..=4999999999 has more than 10 elements"
        );
    }
}
