use pretty_assertions::assert_eq;

use super::*;
use crate::Span;

#[test]
fn interning_is_stable() {
    let mut arena = ExprArena::new();
    let a = arena.intern("x");
    let b = arena.intern("y");
    assert_eq!(arena.intern("x"), a);
    assert_ne!(a, b);
    assert_eq!(arena.name(b), "y");
}

#[test]
fn params_round_trip_through_arena() {
    let mut arena = ExprArena::new();
    let a = arena.intern("a");
    let b = arena.intern("b");
    let range = arena.alloc_params(&[a, b]);
    assert_eq!(range.len(), 2);
    assert_eq!(arena.get_params(range), &[a, b]);
    assert!(arena.get_params(ParamRange::EMPTY).is_empty());
}

#[test]
fn builder_records_statements_in_order() {
    let mut b = ProgramBuilder::new();
    let two = b.int(2);
    b.var_def("x", two);
    let x = b.ident("x");
    let half = b.float(1.5);
    let sum = b.add(x, half);
    b.print(sum);
    let program = b.finish();

    assert_eq!(program.stmts.len(), 2);
    let StmtKind::VarDef { name, value } = program.stmts[0].kind else {
        panic!("expected a variable definition");
    };
    assert_eq!(program.arena.name(name), "x");
    assert_eq!(program.arena.get_expr(value).kind, ExprKind::Int(2));

    let StmtKind::Expr(printed) = program.stmts[1].kind else {
        panic!("expected a print statement");
    };
    let ExprKind::Binary { op, right, .. } = program.arena.get_expr(printed).kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(program.arena.get_expr(right).kind, ExprKind::float(1.5));
}

#[test]
fn builder_applies_current_span() {
    let mut b = ProgramBuilder::new();
    b.set_span(Span::new(3, 9));
    let one = b.int(1);
    b.print(one);
    let program = b.finish();
    assert_eq!(program.arena.get_expr(one).span, Span::new(3, 9));
    assert_eq!(program.stmts[0].span, Span::new(3, 9));
}

#[test]
fn lambda_params_resolve_to_names() {
    let mut b = ProgramBuilder::new();
    let body = b.ident("x");
    let lambda = b.lambda(&["x"], body);
    let program = b.finish();
    let ExprKind::Lambda { params, .. } = program.arena.get_expr(lambda).kind else {
        panic!("expected a lambda");
    };
    let names: Vec<_> = program
        .arena
        .get_params(params)
        .iter()
        .map(|&n| program.arena.name(n))
        .collect();
    assert_eq!(names, vec!["x"]);
}

#[test]
fn built_programs_validate() {
    let mut b = ProgramBuilder::new();
    let (lo, hi) = (b.int(1), b.int(3));
    let range = b.range(lo, hi);
    let x = b.ident("x");
    let lambda = b.lambda(&["x"], x);
    let mapped = b.map(range, lambda);
    b.var_def("xs", mapped);
    assert_eq!(b.finish().validate(), Ok(()));
}

#[test]
fn dangling_statement_value_is_rejected() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    b.print(one);
    let mut program = b.finish();
    program.stmts[0].kind = StmtKind::Expr(ExprId::new(99));

    let errors = program.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "malformed AST: statement 0 refers to expression 99"
    );
}

#[test]
fn cycles_and_forward_references_are_rejected() {
    let mut arena = ExprArena::new();
    let span = Span::new(0, 1);
    // refers to itself
    let own = arena.alloc_expr(Expr::new(
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: ExprId::new(0),
        },
        span,
    ));
    // refers to a later expression
    arena.alloc_expr(Expr::new(
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: own,
            right: ExprId::new(2),
        },
        span,
    ));
    arena.alloc_expr(Expr::new(ExprKind::Int(1), span));
    let program = Program {
        arena,
        stmts: vec![Stmt {
            kind: StmtKind::Expr(ExprId::new(1)),
            span,
        }],
    };

    let messages: Vec<_> = program
        .validate()
        .unwrap_err()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "malformed AST: expression 0 refers to expression 0",
            "malformed AST: expression 1 refers to expression 2",
        ]
    );
}

#[test]
fn bad_names_and_params_are_rejected() {
    let mut arena = ExprArena::new();
    let span = Span::new(0, 1);
    let ghost = arena.alloc_expr(Expr::new(ExprKind::Ident(Name::from_raw(7)), span));
    arena.alloc_expr(Expr::new(
        ExprKind::Lambda {
            params: ParamRange::new(0, 2),
            body: ghost,
        },
        span,
    ));
    let program = Program {
        arena,
        stmts: Vec::new(),
    };

    let errors = program.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains("unknown identifier"));
    assert!(errors[1].message.contains("lambda parameters"));
}
