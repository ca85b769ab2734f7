//! Whole programs on the JIT backend, checked against the interpreter.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use mrc_eval::{buffer_handler, compile, Backend, InterpBackend, Memory};
use mrc_ir::{Program, ProgramBuilder, Span};
use mrc_jit::JitBackend;
use mrc_runtime::{RuntimeContext, RuntimeError, Value};
use pretty_assertions::assert_eq;

fn run_on<B: Backend>(backend: &B, program: &Program, ctx: &RuntimeContext) -> (String, Memory) {
    let compiled = compile(program, backend).unwrap();
    let out = buffer_handler();
    let mut memory = Memory::new();
    compiled.execute(ctx, &mut memory, &out).unwrap();
    (out.output(), memory)
}

/// Sequential output on the JIT backend, asserted equal to the
/// interpreter's.
fn run(program: &Program) -> String {
    let ctx = RuntimeContext::sequential();
    let (expected, _) = run_on(&InterpBackend, program, &ctx);
    let (actual, _) = run_on(&JitBackend::new().unwrap(), program, &ctx);
    assert_eq!(actual, expected);
    actual
}

/// [`run`], then the same output again in parallel mode. Only for programs
/// whose result does not depend on the reduction order.
fn run_exact(program: &Program) -> String {
    let sequential = run(program);
    let ctx = RuntimeContext::parallel_with_threshold(2);
    let (parallel, _) = run_on(&JitBackend::new().unwrap(), program, &ctx);
    assert_eq!(parallel, sequential);
    sequential
}

#[test]
fn leibniz_pi() {
    // var n = 500
    // var seq = map({0, n}, i -> (-1)^i / (2.0 * i + 1))
    // var pi = 4 * reduce(seq, 0, x y -> x + y)
    // print pi
    let mut b = ProgramBuilder::new();
    let n = b.int(500);
    b.var_def("n", n);

    let (zero, n) = (b.int(0), b.ident("n"));
    let range = b.range(zero, n);
    let one = b.int(1);
    let minus_one = b.neg(one);
    let i = b.ident("i");
    let sign = b.pow(minus_one, i);
    let (two, i) = (b.float(2.0), b.ident("i"));
    let twice = b.mul(two, i);
    let one = b.int(1);
    let denom = b.add(twice, one);
    let term = b.div(sign, denom);
    let lambda = b.lambda(&["i"], term);
    let seq = b.map(range, lambda);
    b.var_def("seq", seq);

    let (four, seq) = (b.int(4), b.ident("seq"));
    let zero = b.int(0);
    let (x, y) = (b.ident("x"), b.ident("y"));
    let sum = b.add(x, y);
    let lambda = b.lambda(&["x", "y"], sum);
    let total = b.reduce(seq, zero, lambda);
    let pi = b.mul(four, total);
    b.var_def("pi", pi);
    let pi = b.ident("pi");
    b.print(pi);

    let out = run(&b.finish());
    assert!(out.starts_with("3.14"), "{out}");
}

#[test]
fn nested_sequences_cross_lambdas() {
    // var rows = map({1, 4}, x -> {1, x})
    // print rows
    // print map(rows, r -> reduce(r, 0, a b -> a + b))
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(4));
    let outer = b.range(lo, hi);
    let (one, x) = (b.int(1), b.ident("x"));
    let inner = b.range(one, x);
    let lambda = b.lambda(&["x"], inner);
    let rows = b.map(outer, lambda);
    b.var_def("rows", rows);
    let rows = b.ident("rows");
    b.print(rows);

    let rows = b.ident("rows");
    let (r, zero) = (b.ident("r"), b.int(0));
    let (a, c) = (b.ident("a"), b.ident("b"));
    let sum = b.add(a, c);
    let add = b.lambda(&["a", "b"], sum);
    let total = b.reduce(r, zero, add);
    let per_row = b.lambda(&["r"], total);
    let sums = b.map(rows, per_row);
    b.print(sums);

    assert_eq!(
        run_exact(&b.finish()),
        "[[1], [1, 2], [1, 2, 3], [1, 2, 3, 4]]\n[1, 3, 6, 10]\n"
    );
}

#[test]
fn identity_map_over_sequences_shares_elements() {
    // print map(map({1, 2}, x -> {0, x}), s -> s)
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(2));
    let outer = b.range(lo, hi);
    let (zero, x) = (b.int(0), b.ident("x"));
    let inner = b.range(zero, x);
    let make = b.lambda(&["x"], inner);
    let rows = b.map(outer, make);
    let s = b.ident("s");
    let identity = b.lambda(&["s"], s);
    let same = b.map(rows, identity);
    b.print(same);
    assert_eq!(run_exact(&b.finish()), "[[0, 1], [0, 1, 2]]\n");
}

#[test]
fn float_map_and_reduce() {
    // print reduce(map({1, 4}, x -> x / 2.0), 0, a b -> a + b)
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(4));
    let range = b.range(lo, hi);
    let (x, two) = (b.ident("x"), b.float(2.0));
    let half = b.div(x, two);
    let halve = b.lambda(&["x"], half);
    let halves = b.map(range, halve);
    let zero = b.int(0);
    let (a, c) = (b.ident("a"), b.ident("b"));
    let sum = b.add(a, c);
    let add = b.lambda(&["a", "b"], sum);
    let total = b.reduce(halves, zero, add);
    b.print(total);
    assert_eq!(run_exact(&b.finish()), "5.0\n");
}

#[test]
fn variables_flow_between_statements() {
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(10));
    let range = b.range(lo, hi);
    b.var_def("r", range);
    let r = b.ident("r");
    let (x, two) = (b.ident("x"), b.int(2));
    let doubled_body = b.mul(x, two);
    let double = b.lambda(&["x"], doubled_body);
    let doubled = b.map(r, double);
    b.var_def("d", doubled);

    let jit = JitBackend::new().unwrap();
    let (out, memory) = run_on(&jit, &b.finish(), &RuntimeContext::sequential());
    assert_eq!(out, "");
    let Some(Value::Seq(d)) = memory.lookup("d") else {
        panic!("`d` not bound");
    };
    assert_eq!(d.to_string(), "[2, 4, 6, 8, 10, 12, 14, 16, 18, 20]");
}

#[test]
fn runtime_errors_inside_lambdas_surface() {
    // print map({-2, 2}, x -> 10 / x)
    let mut b = ProgramBuilder::new();
    b.set_span(Span::new(3, 9));
    let (lo, two) = (b.int(2), b.int(2));
    let lo = b.neg(lo);
    let range = b.range(lo, two);
    let (ten, x) = (b.int(10), b.ident("x"));
    let q = b.div(ten, x);
    let lambda = b.lambda(&["x"], q);
    let mapped = b.map(range, lambda);
    b.print(mapped);
    let program = b.finish();

    let jit = JitBackend::new().unwrap();
    for ctx in [RuntimeContext::sequential(), RuntimeContext::parallel_with_threshold(0)] {
        let compiled = compile(&program, &jit).unwrap();
        let out = buffer_handler();
        let err = compiled.execute(&ctx, &mut Memory::new(), &out).unwrap_err();
        assert_eq!(err.error, RuntimeError::DivisionByZero);
        assert_eq!(err.span, Span::new(3, 9));
        assert_eq!(out.output(), "");
    }
}

#[test]
fn oversized_range_fails_like_the_interpreter() {
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(0), b.int(i64::from(i32::MAX) + 5));
    let range = b.range(lo, hi);
    b.var_def("r", range);

    let compiled = compile(&b.finish(), &JitBackend::new().unwrap()).unwrap();
    let err = compiled
        .execute(&RuntimeContext::sequential(), &mut Memory::new(), &buffer_handler())
        .unwrap_err();
    assert!(matches!(err.error, RuntimeError::RangeOverflow { .. }));
}

#[test]
fn range_up_to_i64_max_overflows() {
    let jit = JitBackend::new().unwrap();
    for (lo, hi) in [(0, i64::MAX), (i64::MIN, i64::MAX)] {
        // print {lo, hi}
        let mut b = ProgramBuilder::new();
        let (lo, hi) = (b.int(lo), b.int(hi));
        let range = b.range(lo, hi);
        b.print(range);

        let compiled = compile(&b.finish(), &jit).unwrap();
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
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(i64::MAX), b.int(i64::MAX));
    let range = b.range(lo, hi);
    b.print(range);
    assert_eq!(run(&b.finish()), "[9223372036854775807]\n");
}

#[test]
fn integer_powers() {
    // print 2 ^ 10; print 2 ^ -1; print 2.0 ^ 0.5 * 0
    let mut b = ProgramBuilder::new();
    let (two, ten) = (b.int(2), b.int(10));
    let p = b.pow(two, ten);
    b.print(p);
    let (two, one) = (b.int(2), b.int(1));
    let minus_one = b.neg(one);
    let p = b.pow(two, minus_one);
    b.print(p);
    let (two, half) = (b.float(2.0), b.float(0.5));
    let root = b.pow(two, half);
    let zero = b.int(0);
    let p = b.mul(root, zero);
    b.print(p);
    assert_eq!(run(&b.finish()), "1024\n0\n0.0\n");
}
