//! MrCalc IR - AST and source locations.
//!
//! - Spans for source locations
//! - Names for interned identifiers
//! - AST nodes (`Expr`, `Stmt`, `Program`) in a flat arena
//! - `ProgramBuilder` for constructing programs without a parser
//! - Stack growth for recursive traversals
//!
//! # Design
//!
//! - **Flatten everything**: no `Box<Expr>`, children are `ExprId(u32)` indices
//! - **Intern identifiers**: `Name(u32)` resolved through the arena
//! - **Closed variants**: every traversal is an exhaustive `match`

pub mod ast;
mod expr_id;
mod span;
pub mod stack;

pub use ast::{
    BinaryOp, Expr, ExprArena, ExprKind, ParseOutcome, Program, ProgramBuilder, Stmt, StmtKind,
    SyntaxError, UnaryOp,
};
pub use expr_id::{ExprId, Name, ParamRange};
pub use span::Span;
