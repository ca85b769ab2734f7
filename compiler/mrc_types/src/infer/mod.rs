//! Scoped type inference.
//!
//! Statements are inferred in program order against one growing statement
//! scope. Lambda bodies are inferred against a fresh [`Scope`] that holds only
//! the lambda's parameters; the statement scope is never consulted from
//! inside a lambda.
//!
//! Every expression gets a type, `UNKNOWN` when it is erroneous. An operand
//! that is already `UNKNOWN` propagates silently so each mistake is reported
//! exactly once.

use mrc_diagnostic::{Diagnostic, DiagnosticEmitter};
use mrc_ir::stack::ensure_sufficient_stack;
use mrc_ir::{ExprArena, ExprId, ExprKind, Name, Program, Span, Stmt, StmtKind};

use crate::diagnostics;
use crate::{promote, Scope, Type, Variable};

/// Inferred type of every expression, indexed by [`ExprId`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeMap {
    types: Vec<Type>,
}

impl TypeMap {
    fn with_len(len: usize) -> Self {
        TypeMap {
            types: vec![Type::UNKNOWN; len],
        }
    }

    /// Type of `id`; `UNKNOWN` for expressions never visited.
    #[inline]
    pub fn get(&self, id: ExprId) -> Type {
        self.types.get(id.index()).copied().unwrap_or(Type::UNKNOWN)
    }

    fn set(&mut self, id: ExprId, ty: Type) {
        if let Some(slot) = self.types.get_mut(id.index()) {
            *slot = ty;
        }
    }
}

/// What a statement reads and writes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StmtSignature {
    /// The bound variable, or a print marker for `print` statements.
    pub output: Variable,
    /// Statement-level variables the value reads, in order of first use.
    pub inputs: Vec<Variable>,
}

/// Result of inferring a whole program.
#[derive(Clone, Debug)]
pub struct TypedProgram {
    pub types: TypeMap,
    pub stmts: Vec<StmtSignature>,
}

/// Infer every statement of `program`, reporting through `emitter`.
pub fn infer_program(program: &Program, emitter: &mut DiagnosticEmitter) -> TypedProgram {
    let mut inferrer = TypeInferrer::new(&program.arena, emitter);
    let mut scope = Scope::new();
    let stmts = program
        .stmts
        .iter()
        .enumerate()
        .map(|(index, stmt)| inferrer.infer_stmt(index, stmt, &mut scope))
        .collect();
    TypedProgram {
        types: inferrer.finish(),
        stmts,
    }
}

/// Where identifiers resolve while inferring one expression tree.
struct Env<'s> {
    scope: &'s Scope,
    /// `Some` at statement level, `None` inside lambdas.
    inputs: Option<&'s mut Vec<Variable>>,
}

pub struct TypeInferrer<'a> {
    arena: &'a ExprArena,
    emitter: &'a mut DiagnosticEmitter,
    types: TypeMap,
}

impl<'a> TypeInferrer<'a> {
    pub fn new(arena: &'a ExprArena, emitter: &'a mut DiagnosticEmitter) -> Self {
        TypeInferrer {
            arena,
            emitter,
            types: TypeMap::with_len(arena.expr_count()),
        }
    }

    pub fn finish(self) -> TypeMap {
        self.types
    }

    /// Infer `id` against `scope` without treating it as a statement.
    pub fn infer_expr(&mut self, id: ExprId, scope: &Scope) -> Type {
        let mut env = Env {
            scope,
            inputs: None,
        };
        self.infer(id, &mut env)
    }

    /// Infer one statement and extend `scope` with what it defines.
    pub fn infer_stmt(&mut self, index: usize, stmt: &Stmt, scope: &mut Scope) -> StmtSignature {
        let mut inputs = Vec::new();
        let value = match stmt.kind {
            StmtKind::VarDef { value, .. } | StmtKind::Expr(value) => value,
        };
        let ty = {
            let mut env = Env {
                scope: &*scope,
                inputs: Some(&mut inputs),
            };
            self.infer(value, &mut env)
        };

        let output = match stmt.kind {
            StmtKind::VarDef { name, .. } => {
                let text = self.arena.name(name);
                let var = Variable::new(text, ty);
                if scope.define(var.clone()).is_err() {
                    self.report(diagnostics::duplicate_definition(stmt.span, text));
                }
                var
            }
            StmtKind::Expr(_) => Variable::print_marker(index, ty),
        };

        tracing::debug!(stmt = index, output = %output, inputs = inputs.len(), "inferred statement");
        StmtSignature { output, inputs }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.emitter.report(diagnostic);
    }

    fn infer(&mut self, id: ExprId, env: &mut Env<'_>) -> Type {
        ensure_sufficient_stack(|| {
            let ty = self.infer_kind(id, env);
            self.types.set(id, ty);
            ty
        })
    }

    fn infer_kind(&mut self, id: ExprId, env: &mut Env<'_>) -> Type {
        let expr = *self.arena.get_expr(id);
        match expr.kind {
            ExprKind::Int(_) => Type::INTEGER,
            ExprKind::Float(_) => Type::FLOAT,
            ExprKind::Ident(name) => self.resolve(name, expr.span, env),

            ExprKind::Unary { op, operand } => {
                let ty = self.infer(operand, env);
                if ty.is_sequence() {
                    self.report(diagnostics::unary_not_applicable(
                        expr.span,
                        op.as_symbol(),
                        ty,
                    ));
                    return Type::UNKNOWN;
                }
                ty
            }

            ExprKind::Binary { op, left, right } => {
                let lhs = self.infer(left, env);
                let rhs = self.infer(right, env);
                match (lhs.as_primitive(), rhs.as_primitive()) {
                    (Some(a), Some(b)) => promote(a, b).into(),
                    _ if lhs.is_unknown() || rhs.is_unknown() => Type::UNKNOWN,
                    _ => {
                        self.report(diagnostics::operator_not_applicable(
                            expr.span,
                            op.as_symbol(),
                            lhs,
                            rhs,
                        ));
                        Type::UNKNOWN
                    }
                }
            }

            ExprKind::Range { start, end } => {
                for bound in [start, end] {
                    let ty = self.infer(bound, env);
                    if ty != Type::INTEGER && !ty.is_unknown() {
                        let span = self.arena.get_expr(bound).span;
                        self.report(diagnostics::bad_range_boundary(span, ty));
                    }
                }
                Type::sequence_of(Type::INTEGER)
            }

            ExprKind::Map { seq, lambda } => {
                let seq_ty = self.infer(seq, env);
                let element = self.element_of(seq, seq_ty);
                let (body, _) = self.infer_lambda(lambda, "map", &[element]);
                if body.is_unknown() {
                    Type::UNKNOWN
                } else {
                    Type::sequence_of(body)
                }
            }

            ExprKind::Reduce {
                seq,
                neutral,
                lambda,
            } => {
                let seq_ty = self.infer(seq, env);
                let neutral_ty = self.infer(neutral, env);
                let element = self.element_of(seq, seq_ty);
                let acc = match (element, neutral_ty) {
                    (Type::Primitive(a), Type::Primitive(b)) => Type::from(promote(a, b)),
                    _ => {
                        if element.is_sequence() {
                            let span = self.arena.get_expr(seq).span;
                            self.report(diagnostics::scalar_expected(
                                span,
                                element,
                                "reduced element",
                            ));
                        }
                        if neutral_ty.is_sequence() {
                            let span = self.arena.get_expr(neutral).span;
                            self.report(diagnostics::scalar_expected(
                                span,
                                neutral_ty,
                                "neutral element",
                            ));
                        }
                        Type::UNKNOWN
                    }
                };
                let (body, body_span) = self.infer_lambda(lambda, "reduce", &[acc, acc]);
                if !acc.is_unknown() && !body.is_unknown() && body != acc {
                    self.report(diagnostics::type_mismatch(
                        body_span,
                        acc,
                        body,
                        "reduce lambda",
                    ));
                }
                acc
            }

            ExprKind::Lambda { .. } => {
                self.report(diagnostics::lambda_outside_combinator(expr.span));
                Type::UNKNOWN
            }
        }
    }

    fn resolve(&mut self, name: Name, span: Span, env: &mut Env<'_>) -> Type {
        let text = self.arena.name(name);
        match (env.scope.lookup(text), env.inputs.as_deref_mut()) {
            (Some(var), Some(inputs)) => {
                if !inputs.contains(var) {
                    inputs.push(var.clone());
                }
                var.ty()
            }
            (Some(var), None) => var.ty(),
            (None, Some(_)) => {
                self.report(diagnostics::undefined_variable(span, text));
                Type::UNKNOWN
            }
            (None, None) => {
                self.report(diagnostics::undefined_in_lambda(span, text));
                Type::UNKNOWN
            }
        }
    }

    /// Element type of the sequence `seq`, reporting scalars.
    fn element_of(&mut self, seq: ExprId, seq_ty: Type) -> Type {
        match seq_ty.element_type() {
            Some(element) => element,
            None => {
                if !seq_ty.is_unknown() {
                    let span = self.arena.get_expr(seq).span;
                    self.report(diagnostics::sequence_expected(span, seq_ty));
                }
                Type::UNKNOWN
            }
        }
    }

    /// Infer a combinator's lambda argument in a scope of its own.
    ///
    /// Returns the body type and span.
    fn infer_lambda(&mut self, id: ExprId, combinator: &str, param_types: &[Type]) -> (Type, Span) {
        let expr = *self.arena.get_expr(id);
        let ExprKind::Lambda { params, body } = expr.kind else {
            self.report(diagnostics::lambda_expected(expr.span, combinator));
            return (Type::UNKNOWN, expr.span);
        };

        let names = self.arena.get_params(params);
        if names.len() != param_types.len() {
            self.report(diagnostics::lambda_arity(
                expr.span,
                combinator,
                param_types.len(),
                names.len(),
            ));
        }

        let mut scope = Scope::new();
        for (i, &name) in names.iter().enumerate() {
            let text = self.arena.name(name);
            let ty = param_types.get(i).copied().unwrap_or(Type::UNKNOWN);
            if scope.define(Variable::new(text, ty)).is_err() {
                self.report(diagnostics::duplicate_definition(expr.span, text));
            }
        }

        let mut env = Env {
            scope: &scope,
            inputs: None,
        };
        let body_ty = self.infer(body, &mut env);
        self.types.set(id, body_ty);
        (body_ty, self.arena.get_expr(body).span)
    }
}
