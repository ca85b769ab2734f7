//! Compilation entry points.

use mrc_diagnostic::{syntax_error, CollectedDiagnostics, DiagnosticEmitter};
use mrc_ir::{ParseOutcome, Program, StmtKind};
use mrc_types::{infer_program, TypedProgram};

use crate::algebra::Backend;
use crate::{CompileError, CompiledProgram, ExprBuilder, Stmt};

/// Type-check and compile `program` for `backend`.
///
/// Every type error in the program is reported in one
/// [`CompileError::Diagnostics`]. Backend failures abort at the first one.
pub fn compile<B: Backend>(program: &Program, backend: &B) -> Result<CompiledProgram, CompileError> {
    compile_with(program, backend, &mut DiagnosticEmitter::new())
}

/// [`compile`] reporting through a caller-provided emitter, so listeners
/// attached to it see every diagnostic as it is found.
pub fn compile_with<B: Backend>(
    program: &Program,
    backend: &B,
    emitter: &mut DiagnosticEmitter,
) -> Result<CompiledProgram, CompileError> {
    let TypedProgram { types, stmts: sigs } = check(program, emitter)?;
    let builder = ExprBuilder::new(&program.arena, &types);

    let mut stmts = Vec::with_capacity(sigs.len());
    for (stmt, sig) in program.stmts.iter().zip(sigs) {
        let (StmtKind::VarDef { value, .. } | StmtKind::Expr(value)) = stmt.kind;
        let callable = builder.build_statement(backend, &sig, value)?;
        stmts.push(Stmt::new(callable, sig.inputs, sig.output, stmt.span));
    }
    tracing::debug!(backend = backend.name(), stmts = stmts.len(), "compiled program");
    Ok(CompiledProgram::new(stmts))
}

/// Type-check without compiling.
pub fn check(
    program: &Program,
    emitter: &mut DiagnosticEmitter,
) -> Result<TypedProgram, CollectedDiagnostics> {
    emitter.collect(|em| infer_program(program, em))
}

/// Unwrap a parser result, turning syntax errors into diagnostics.
///
/// The program is validated structurally; dangling or cyclic expression ids
/// are reported as syntax errors rather than reaching the type checker.
pub fn accept(outcome: ParseOutcome) -> Result<Program, CompileError> {
    let errors = match outcome {
        ParseOutcome::Program(program) => match program.validate() {
            Ok(()) => return Ok(program),
            Err(errors) => errors,
        },
        ParseOutcome::SyntaxErrors(errors) => errors,
    };
    Err(CompileError::Diagnostics(CollectedDiagnostics::new(
        errors.iter().map(syntax_error).collect(),
    )))
}
