use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("type mismatch")
        .with_label(Span::new(0, 5), "here")
        .with_label(Span::new(8, 9), "and here")
        .with_note("context")
        .with_suggestion("convert it");

    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.labels.len(), 2);
    assert!(diag.labels[0].is_primary);
    assert!(!diag.labels[1].is_primary);
    assert_eq!(diag.primary_span(), Some(Span::new(0, 5)));
}

#[test]
fn test_unlabeled_has_no_primary_span() {
    let diag = Diagnostic::error(ErrorCode::E2001).with_message("hm");
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message("undefined variable `x`")
        .with_label(Span::new(4, 5), "not found in this scope")
        .with_note("variables must be defined before use");

    assert_eq!(
        diag.to_string(),
        "error [E2003]: undefined variable `x`\n  \
         --> 4..5: not found in this scope\n  \
         = note: variables must be defined before use"
    );
}

#[test]
fn test_suggestions_follow_notes() {
    let diag = Diagnostic::error(ErrorCode::E2004)
        .with_message("wrong arity")
        .with_suggestion("write the lambda as `x -> ...`")
        .with_note("lambdas take one parameter per element");
    assert_eq!(
        diag.to_string(),
        "error [E2004]: wrong arity\n  \
         = note: lambdas take one parameter per element\n  \
         = help: write the lambda as `x -> ...`"
    );
}

#[test]
fn test_syntax_error_conversion() {
    let err = SyntaxError {
        span: Span::new(3, 7),
        message: "expected expression".to_owned(),
    };
    let diag = syntax_error(&err);
    assert_eq!(diag.code, ErrorCode::E1001);
    assert_eq!(diag.message, "expected expression");
    assert_eq!(diag.primary_span(), Some(Span::new(3, 7)));
}
