//! Programmatic AST construction.
//!
//! The core has no parser of its own. Drivers that do not go through the
//! JSON interchange, and every test in the workspace, assemble programs with
//! [`ProgramBuilder`].
//!
//! ```text
//! let mut b = ProgramBuilder::new();
//! let x = b.int(2);
//! b.var_def("x", x);
//! let (x, half) = (b.ident("x"), b.float(1.5));
//! let sum = b.add(x, half);
//! b.print(sum);
//! let program = b.finish();
//! ```

use super::{BinaryOp, Expr, ExprArena, ExprKind, Program, Stmt, StmtKind, UnaryOp};
use crate::{ExprId, Span};

/// Incremental builder for a [`Program`].
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    arena: ExprArena,
    stmts: Vec<Stmt>,
    span: Span,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Span attached to every node created from now on.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, self.span))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.alloc(ExprKind::float(value))
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.arena.intern(name);
        self.alloc(ExprKind::Ident(name))
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right })
    }

    pub fn add(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn sub(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Mul, left, right)
    }

    pub fn div(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Div, left, right)
    }

    pub fn pow(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Pow, left, right)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.alloc(ExprKind::Unary { op, operand })
    }

    pub fn neg(&mut self, operand: ExprId) -> ExprId {
        self.unary(UnaryOp::Neg, operand)
    }

    /// Inclusive range `{start, end}`.
    pub fn range(&mut self, start: ExprId, end: ExprId) -> ExprId {
        self.alloc(ExprKind::Range { start, end })
    }

    pub fn lambda(&mut self, params: &[&str], body: ExprId) -> ExprId {
        let names: Vec<_> = params.iter().map(|p| self.arena.intern(p)).collect();
        let params = self.arena.alloc_params(&names);
        self.alloc(ExprKind::Lambda { params, body })
    }

    pub fn map(&mut self, seq: ExprId, lambda: ExprId) -> ExprId {
        self.alloc(ExprKind::Map { seq, lambda })
    }

    pub fn reduce(&mut self, seq: ExprId, neutral: ExprId, lambda: ExprId) -> ExprId {
        self.alloc(ExprKind::Reduce {
            seq,
            neutral,
            lambda,
        })
    }

    /// `var name = value`
    pub fn var_def(&mut self, name: &str, value: ExprId) {
        let name = self.arena.intern(name);
        self.stmts.push(Stmt {
            kind: StmtKind::VarDef { name, value },
            span: self.span,
        });
    }

    /// `print value`
    pub fn print(&mut self, value: ExprId) {
        self.stmts.push(Stmt {
            kind: StmtKind::Expr(value),
            span: self.span,
        });
    }

    pub fn finish(self) -> Program {
        Program {
            arena: self.arena,
            stmts: self.stmts,
        }
    }
}
