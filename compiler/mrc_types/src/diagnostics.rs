//! Constructors for type-error diagnostics.

use mrc_diagnostic::{Diagnostic, ErrorCode};
use mrc_ir::Span;

use crate::Type;

pub(crate) fn undefined_variable(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("undefined variable `{name}`"))
        .with_label(span, "not found in this scope")
}

pub(crate) fn undefined_in_lambda(span: Span, name: &str) -> Diagnostic {
    undefined_variable(span, name)
        .with_note("lambdas only see their own parameters and cannot capture outer variables")
}

pub(crate) fn operator_not_applicable(span: Span, op: &str, left: Type, right: Type) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!(
            "operator `{op}` cannot be applied to {left} and {right}"
        ))
        .with_label(span, "")
}

pub(crate) fn unary_not_applicable(span: Span, op: &str, operand: Type) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!("operator `{op}` cannot be applied to {operand}"))
        .with_label(span, "")
}

pub(crate) fn bad_range_boundary(span: Span, ty: Type) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2005)
        .with_message(format!("range cannot have {ty} as its boundary"))
        .with_label(span, "expected int")
}

pub(crate) fn sequence_expected(span: Span, found: Type) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2007)
        .with_message(format!("expected a sequence, found {found}"))
        .with_label(span, "")
}

pub(crate) fn lambda_arity(span: Span, combinator: &str, expected: usize, found: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2004)
        .with_message(format!(
            "`{combinator}` expects a lambda with {expected} parameter{}, found {found}",
            if expected == 1 { "" } else { "s" }
        ))
        .with_label(span, "")
        .with_suggestion(match expected {
            1 => "write the lambda as `x -> ...`",
            _ => "write the lambda as `acc x -> ...`",
        })
}

pub(crate) fn lambda_expected(span: Span, combinator: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("`{combinator}` expects a lambda as its last argument"))
        .with_label(span, "")
}

pub(crate) fn lambda_outside_combinator(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2008)
        .with_message("lambdas can only be used as the last argument of `map` or `reduce`")
        .with_label(span, "")
}

pub(crate) fn duplicate_definition(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2006)
        .with_message(format!("`{name}` is already defined"))
        .with_label(span, "redefined here")
}

pub(crate) fn type_mismatch(span: Span, expected: Type, found: Type, context: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!(
            "type mismatch in {context}: expected {expected}, found {found}"
        ))
        .with_label(span, format!("expected {expected}"))
}

pub(crate) fn scalar_expected(span: Span, found: Type, context: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("{context} must be a number, found {found}"))
        .with_label(span, "")
}
