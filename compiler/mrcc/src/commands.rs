//! Driver commands.

use std::path::Path;
use std::sync::Arc;

use mrc_diagnostic::{Diagnostic, DiagnosticEmitter};
use mrc_eval::{
    buffer_handler, check, compile_with, stdout_handler, Backend, CompileError, CompiledProgram,
    InterpBackend, Memory, ProgramWorker, SharedPrintHandler,
};
use mrc_ir::Program;
use mrc_jit::JitBackend;
use mrc_types::TypedProgram;

use crate::input::load_program;
use crate::{BackendKind, DriverError, RunConfig};

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub memory: Memory,
    /// Captured output when [`RunConfig::capture_output`] is set.
    pub output: Option<String>,
}

fn compile_for(program: &Program, config: &RunConfig) -> Result<CompiledProgram, DriverError> {
    fn with<B: Backend>(
        program: &Program,
        backend: &B,
        emitter: &mut DiagnosticEmitter,
    ) -> Result<CompiledProgram, DriverError> {
        Ok(compile_with(program, backend, emitter)?)
    }
    let emitter = &mut config.emitter();
    match config.backend {
        BackendKind::Interpreter => with(program, &InterpBackend, emitter),
        BackendKind::Jit => with(program, &JitBackend::new()?, emitter),
    }
}

/// Compile `program` and run it on a fresh worker thread.
#[tracing::instrument(level = "debug", skip_all, fields(backend = %config.backend))]
pub fn run_program(program: &Program, config: &RunConfig) -> Result<RunOutcome, DriverError> {
    let compiled = Arc::new(compile_for(program, config)?);
    let out: SharedPrintHandler = if config.capture_output {
        buffer_handler()
    } else {
        stdout_handler()
    };

    let worker = ProgramWorker::spawn().map_err(DriverError::Spawn)?;
    let job = worker.submit(compiled, config.runtime_context(), Arc::clone(&out))?;
    let memory = job.wait()?;
    Ok(RunOutcome {
        memory,
        output: config.capture_output.then(|| out.output()),
    })
}

/// Type-check `program`, reporting every diagnostic to `emitter`'s listeners.
pub fn check_program(
    program: &Program,
    emitter: &mut DiagnosticEmitter,
) -> Result<TypedProgram, DriverError> {
    check(program, emitter).map_err(|diags| DriverError::Compile(CompileError::Diagnostics(diags)))
}

/// `mrc run <program.json>`
pub fn run_file(path: &Path, config: &RunConfig) -> Result<RunOutcome, DriverError> {
    let program = load_program(path)?;
    run_program(&program, config)
}

/// `mrc check <program.json>`: prints one line per statement signature.
pub fn check_file(path: &Path, config: &RunConfig) -> Result<(), DriverError> {
    let program = load_program(path)?;
    let typed = check_program(&program, &mut config.emitter())?;
    for sig in &typed.stmts {
        let inputs: Vec<String> = sig.inputs.iter().map(ToString::to_string).collect();
        println!("{} <- [{}]", sig.output, inputs.join(", "));
    }
    println!("OK: {} ({} statements)", path.display(), typed.stmts.len());
    Ok(())
}

/// Render a driver error for the terminal. Compile errors list every
/// diagnostic.
pub fn render_error(err: &DriverError) -> String {
    match err {
        DriverError::Compile(CompileError::Diagnostics(diags)) => diags
            .diagnostics()
            .iter()
            .map(Diagnostic::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => format!("error: {other}"),
    }
}
