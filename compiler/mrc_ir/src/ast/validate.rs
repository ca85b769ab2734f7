//! Structural checks for programs built outside [`ProgramBuilder`].
//!
//! Traversals index the arena directly, so a deserialized program is checked
//! once before anything walks it. Every child id must be strictly below its
//! parent's, which rules out dangling ids and cycles in one pass.
//!
//! [`ProgramBuilder`]: super::ProgramBuilder

use crate::{ExprId, ExprKind, Name, ParamRange, Program, Span, StmtKind, SyntaxError};

impl Program {
    /// Report every malformed node. Programs from `ProgramBuilder` always
    /// pass.
    pub fn validate(&self) -> Result<(), Vec<SyntaxError>> {
        let mut errors = Errors::default();
        let arena = &self.arena;

        for (index, expr) in arena.exprs.iter().enumerate() {
            for child in children(&expr.kind).into_iter().flatten() {
                if child.index() >= index {
                    errors.push(
                        expr.span,
                        format!("expression {index} refers to expression {}", child.raw()),
                    );
                }
            }
            match expr.kind {
                ExprKind::Ident(name) => errors.check_name(self, name, expr.span),
                ExprKind::Lambda { params, .. } => {
                    if self.params_in_range(params) {
                        for &name in arena.get_params(params) {
                            errors.check_name(self, name, expr.span);
                        }
                    } else {
                        errors.push(
                            expr.span,
                            format!("lambda parameters {params:?} are out of range"),
                        );
                    }
                }
                _ => {}
            }
        }

        for (index, stmt) in self.stmts.iter().enumerate() {
            let (StmtKind::VarDef { value, .. } | StmtKind::Expr(value)) = stmt.kind;
            if value.index() >= arena.expr_count() {
                errors.push(
                    stmt.span,
                    format!("statement {index} refers to expression {}", value.raw()),
                );
            }
            if let StmtKind::VarDef { name, .. } = stmt.kind {
                errors.check_name(self, name, stmt.span);
            }
        }

        errors.finish()
    }

    fn params_in_range(&self, params: ParamRange) -> bool {
        params.start as usize + params.len() <= self.arena.params.len()
    }
}

fn children(kind: &ExprKind) -> [Option<ExprId>; 3] {
    match *kind {
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Ident(_) => [None; 3],
        ExprKind::Unary { operand, .. } => [Some(operand), None, None],
        ExprKind::Lambda { body, .. } => [Some(body), None, None],
        ExprKind::Binary { left, right, .. } => [Some(left), Some(right), None],
        ExprKind::Range { start, end } => [Some(start), Some(end), None],
        ExprKind::Map { seq, lambda } => [Some(seq), Some(lambda), None],
        ExprKind::Reduce {
            seq,
            neutral,
            lambda,
        } => [Some(seq), Some(neutral), Some(lambda)],
    }
}

#[derive(Default)]
struct Errors(Vec<SyntaxError>);

impl Errors {
    fn push(&mut self, span: Span, detail: String) {
        self.0.push(SyntaxError {
            span,
            message: format!("malformed AST: {detail}"),
        });
    }

    fn check_name(&mut self, program: &Program, name: Name, span: Span) {
        if name.index() >= program.arena.names.len() {
            self.push(span, format!("unknown identifier {name:?}"));
        }
    }

    fn finish(self) -> Result<(), Vec<SyntaxError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}
