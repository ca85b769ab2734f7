//! AST node types.
//!
//! The tree is a closed set of variants matched exhaustively by every
//! traversal. Expressions live in an [`ExprArena`] and refer to their children
//! by [`ExprId`]; a [`Program`] owns the arena together with its ordered
//! statements.
//!
//! Floats are stored as `u64` bits so every node stays `Copy + Eq + Hash`.

mod builder;
mod operators;
mod validate;

pub use builder::ProgramBuilder;
pub use operators::{BinaryOp, UnaryOp};

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{ExprId, Name, ParamRange, Span};

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Expression variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Integer literal: `42`
    Int(i64),

    /// Float literal: `2.5` (stored as bits)
    Float(u64),

    /// Variable reference
    Ident(Name),

    /// `left op right`
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// `op operand`
    Unary { op: UnaryOp, operand: ExprId },

    /// `{start, end}`, both bounds inclusive.
    Range { start: ExprId, end: ExprId },

    /// `map(seq, lambda)`
    Map { seq: ExprId, lambda: ExprId },

    /// `reduce(seq, neutral, lambda)`
    Reduce {
        seq: ExprId,
        neutral: ExprId,
        lambda: ExprId,
    },

    /// `x y -> body`. Only valid as the last argument of `map`/`reduce`.
    Lambda { params: ParamRange, body: ExprId },
}

impl ExprKind {
    /// Float literal from an `f64`.
    pub fn float(value: f64) -> Self {
        ExprKind::Float(value.to_bits())
    }
}

/// Statement node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// `var name = value`, a silent binding.
    VarDef { name: Name, value: ExprId },
    /// `print value`, evaluated and written to the output sink.
    Expr(ExprId),
}

/// Flat storage for expressions, identifiers and lambda parameter lists.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExprArena {
    exprs: Vec<Expr>,
    names: Vec<String>,
    params: Vec<Name>,
    #[cfg_attr(feature = "serde", serde(skip))]
    name_lookup: FxHashMap<String, Name>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression and return its id.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    /// Panics on ids from another arena; deserialized programs go through
    /// [`Program::validate`] first.
    #[inline]
    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Number of expressions, i.e. one past the largest valid `ExprId` index.
    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Intern an identifier.
    pub fn intern(&mut self, text: &str) -> Name {
        if self.name_lookup.is_empty() && !self.names.is_empty() {
            self.rebuild_lookup();
        }
        if let Some(&name) = self.name_lookup.get(text) {
            return name;
        }
        let name = Name::from_raw(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(text.to_owned());
        self.name_lookup.insert(text.to_owned(), name);
        name
    }

    /// Text of an interned identifier. Unknown names resolve to `"<?>"`.
    pub fn name(&self, name: Name) -> &str {
        self.names.get(name.index()).map_or("<?>", String::as_str)
    }

    /// Store a lambda parameter list.
    pub fn alloc_params(&mut self, params: &[Name]) -> ParamRange {
        let start = u32::try_from(self.params.len()).unwrap_or(u32::MAX);
        self.params.extend_from_slice(params);
        ParamRange::new(start, u16::try_from(params.len()).unwrap_or(u16::MAX))
    }

    pub fn get_params(&self, range: ParamRange) -> &[Name] {
        let start = range.start as usize;
        self.params
            .get(start..start + range.len())
            .unwrap_or_default()
    }

    /// Deserialized arenas skip the lookup table; rebuild it on first intern.
    fn rebuild_lookup(&mut self) {
        for (index, text) in self.names.iter().enumerate() {
            let raw = u32::try_from(index).unwrap_or(u32::MAX);
            self.name_lookup.insert(text.clone(), Name::from_raw(raw));
        }
    }
}

impl PartialEq for ExprArena {
    fn eq(&self, other: &Self) -> bool {
        self.exprs == other.exprs && self.names == other.names && self.params == other.params
    }
}

impl Eq for ExprArena {}

impl fmt::Debug for ExprArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprArena")
            .field("exprs", &self.exprs.len())
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// A complete program: ordered statements over one expression arena.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    pub arena: ExprArena,
    pub stmts: Vec<Stmt>,
}

/// A syntax error reported by the external parser.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntaxError {
    pub span: Span,
    pub message: String,
}

/// What the external parser hands to the core: an AST, or why there is none.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParseOutcome {
    Program(Program),
    SyntaxErrors(Vec<SyntaxError>),
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
