//! End-to-end programs on the interpreted backend.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use mrc_diagnostic::ErrorCode;
use mrc_eval::{
    accept, buffer_handler, compile, CompileError, InterpBackend, Memory,
};
use mrc_ir::{ParseOutcome, Program, ProgramBuilder, Span, SyntaxError};
use mrc_runtime::{RuntimeContext, RuntimeError, Value};
use pretty_assertions::assert_eq;

fn run_with(program: &Program, ctx: &RuntimeContext) -> (String, Memory) {
    let compiled = compile(program, &InterpBackend).unwrap();
    let out = buffer_handler();
    let mut memory = Memory::new();
    compiled.execute(ctx, &mut memory, &out).unwrap();
    (out.output(), memory)
}

fn run(program: &Program) -> String {
    run_with(program, &RuntimeContext::sequential()).0
}

#[test]
fn promotion_through_variables() {
    // var x = 2; var y = x + 1.5; print y
    let mut b = ProgramBuilder::new();
    let two = b.int(2);
    b.var_def("x", two);
    let (x, half) = (b.ident("x"), b.float(1.5));
    let sum = b.add(x, half);
    b.var_def("y", sum);
    let y = b.ident("y");
    b.print(y);

    let (out, memory) = run_with(&b.finish(), &RuntimeContext::sequential());
    assert_eq!(out, "3.5\n");
    assert_eq!(memory.lookup("y"), Some(&Value::Float(3.5)));
}

#[test]
fn inclusive_range_literal() {
    // print {0, 4}
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(0), b.int(4));
    let range = b.range(lo, hi);
    b.print(range);
    assert_eq!(run(&b.finish()), "[0, 1, 2, 3, 4]\n");
}

#[test]
fn map_squares() {
    // print map({1, 3}, x -> x * x)
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(3));
    let range = b.range(lo, hi);
    let (x1, x2) = (b.ident("x"), b.ident("x"));
    let body = b.mul(x1, x2);
    let lambda = b.lambda(&["x"], body);
    let mapped = b.map(range, lambda);
    b.print(mapped);
    assert_eq!(run(&b.finish()), "[1, 4, 9]\n");
}

fn sum_program(n: i64) -> Program {
    // var s = reduce({1, n}, 0, a b -> a + b); print s
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(n));
    let range = b.range(lo, hi);
    let zero = b.int(0);
    let (a, c) = (b.ident("a"), b.ident("b"));
    let body = b.add(a, c);
    let lambda = b.lambda(&["a", "b"], body);
    let total = b.reduce(range, zero, lambda);
    b.var_def("s", total);
    let s = b.ident("s");
    b.print(s);
    b.finish()
}

#[test]
fn reduce_sum_in_both_modes() {
    let program = sum_program(4);
    assert_eq!(run(&program), "10\n");
    let (out, _) = run_with(&program, &RuntimeContext::parallel_with_threshold(0));
    assert_eq!(out, "10\n");

    let big = sum_program(100_000);
    let (seq, _) = run_with(&big, &RuntimeContext::sequential());
    let (par, _) = run_with(&big, &RuntimeContext::parallel());
    assert_eq!(seq, "5000050000\n");
    assert_eq!(par, seq);
}

#[test]
fn reduce_promotes_integer_elements() {
    // print reduce({1, 3}, 0.5, a b -> a + b)
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(3));
    let range = b.range(lo, hi);
    let half = b.float(0.5);
    let (a, c) = (b.ident("a"), b.ident("b"));
    let body = b.add(a, c);
    let lambda = b.lambda(&["a", "b"], body);
    let total = b.reduce(range, half, lambda);
    b.print(total);
    assert_eq!(run(&b.finish()), "6.5\n");
}

#[test]
fn nested_map_prints_recursively() {
    // print map({1, 3}, x -> {1, x})
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(3));
    let range = b.range(lo, hi);
    let (one, x) = (b.int(1), b.ident("x"));
    let inner = b.range(one, x);
    let lambda = b.lambda(&["x"], inner);
    let mapped = b.map(range, lambda);
    b.print(mapped);
    assert_eq!(run(&b.finish()), "[[1], [1, 2], [1, 2, 3]]\n");
}

#[test]
fn long_output_is_elided() {
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(1000));
    let range = b.range(lo, hi);
    b.print(range);
    assert_eq!(
        run(&b.finish()),
        "[1, 2, 3, 4, 5, ... (990 more) ..., 996, 997, 998, 999, 1000]\n"
    );
}

#[test]
fn bindings_are_silent() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    b.var_def("a", one);
    let neg = b.neg(one);
    b.print(neg);
    assert_eq!(run(&b.finish()), "-1\n");
}

#[test]
fn type_errors_are_reported_together() {
    let mut b = ProgramBuilder::new();
    let ghost = b.ident("ghost");
    b.print(ghost);
    let (lo, hi) = (b.float(1.0), b.int(2));
    let range = b.range(lo, hi);
    b.print(range);

    let Err(CompileError::Diagnostics(diags)) = compile(&b.finish(), &InterpBackend) else {
        panic!("expected diagnostics");
    };
    let codes: Vec<_> = diags.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2003, ErrorCode::E2005]);
}

#[test]
fn division_by_zero_carries_statement_span() {
    let mut b = ProgramBuilder::new();
    b.set_span(Span::new(10, 15));
    let (one, zero) = (b.int(1), b.int(0));
    let q = b.div(one, zero);
    b.print(q);

    let compiled = compile(&b.finish(), &InterpBackend).unwrap();
    let err = compiled
        .execute(&RuntimeContext::sequential(), &mut Memory::new(), &buffer_handler())
        .unwrap_err();
    assert_eq!(err.error, RuntimeError::DivisionByZero);
    assert_eq!(err.span, Span::new(10, 15));
}

#[test]
fn oversized_range_is_a_runtime_error() {
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(0), b.int(i64::from(i32::MAX) + 5));
    let range = b.range(lo, hi);
    b.var_def("r", range);

    let compiled = compile(&b.finish(), &InterpBackend).unwrap();
    let err = compiled
        .execute(&RuntimeContext::sequential(), &mut Memory::new(), &buffer_handler())
        .unwrap_err();
    assert!(matches!(err.error, RuntimeError::RangeOverflow { .. }));
}

#[test]
fn range_up_to_i64_max_overflows() {
    for (lo, hi) in [(0, i64::MAX), (i64::MIN, i64::MAX)] {
        // print {lo, hi}
        let mut b = ProgramBuilder::new();
        let (lo, hi) = (b.int(lo), b.int(hi));
        let range = b.range(lo, hi);
        b.print(range);

        let compiled = compile(&b.finish(), &InterpBackend).unwrap();
        let out = buffer_handler();
        let err = compiled
            .execute(&RuntimeContext::sequential(), &mut Memory::new(), &out)
            .unwrap_err();
        assert!(
            matches!(err.error, RuntimeError::RangeOverflow { last: i64::MAX, .. }),
            "{err:?}"
        );
        assert_eq!(out.output(), "");
    }
}

#[test]
fn single_element_range_at_i64_max() {
    // print {i64::MAX, i64::MAX}
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(i64::MAX), b.int(i64::MAX));
    let range = b.range(lo, hi);
    b.print(range);
    assert_eq!(run(&b.finish()), "[9223372036854775807]\n");
}

#[test]
fn syntax_errors_become_diagnostics() {
    let outcome = ParseOutcome::SyntaxErrors(vec![SyntaxError {
        span: Span::new(0, 3),
        message: "unexpected token".into(),
    }]);
    let Err(CompileError::Diagnostics(diags)) = accept(outcome) else {
        panic!("expected diagnostics");
    };
    assert_eq!(diags.diagnostics()[0].code, ErrorCode::E1001);
}
