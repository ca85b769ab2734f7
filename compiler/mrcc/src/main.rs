//! MrCalc CLI

use std::path::Path;

use mrcc::commands::{check_file, render_error, run_file};
use mrcc::{init_tracing, DriverError, RunConfig};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let result = match command.as_str() {
        "run" => run_command(&args[2..]),
        "check" => check_command(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("MrCalc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => {
            // If it looks like a program file, run it
            if Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            {
                run_command(&args[1..])
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    };

    if let Err(err) = result {
        eprintln!("{}", render_error(&err));
        std::process::exit(if err.is_program_error() { 1 } else { 2 });
    }
}

/// Split `args` into options applied to a fresh config and the program path.
fn parse_args<'a>(args: &'a [String], usage: &str) -> Result<(RunConfig, &'a Path), DriverError> {
    let mut config = RunConfig::from_env()?;
    let mut path = None;
    for arg in args {
        if !config.apply_flag(arg)? && path.is_none() {
            path = Some(Path::new(arg));
        }
    }

    let Some(path) = path else {
        eprintln!("error: missing program path");
        eprintln!("Usage: {usage}");
        std::process::exit(1);
    };
    Ok((config, path))
}

fn run_command(args: &[String]) -> Result<(), DriverError> {
    let (config, path) = parse_args(
        args,
        "mrc run <program.json> [--backend=interp|jit] [--parallel]",
    )?;
    run_file(path, &config).map(|_| ())
}

fn check_command(args: &[String]) -> Result<(), DriverError> {
    let (config, path) = parse_args(args, "mrc check <program.json> [--error-limit=<n>]")?;
    check_file(path, &config)
}

fn print_usage() {
    println!("MrCalc");
    println!();
    println!("Usage: mrc <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <program.json>    Compile and run a parsed program");
    println!("  check <program.json>  Type check only, printing statement signatures");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Run options:");
    println!("  --backend=<name>            interp (default) or jit");
    println!("  --parallel, -p              Run map/reduce on the thread pool");
    println!("  --parallel-threshold=<n>    Minimum sequence length for parallel work");
    println!("  --error-limit=<n>           Report at most n type errors (run and check)");
    println!();
    println!("Environment:");
    println!("  MRC_BACKEND     Backend when --backend is not given");
    println!("  MRC_LOG         Tracing filter, e.g. mrc_eval=debug");
    println!("  MRC_LOG_TREE    Set to 1 for hierarchical log output");
    println!("  MRC_DEBUG_JIT   Log the Cranelift IR of every JIT function");
    println!();
    println!("Examples:");
    println!("  mrc run pi.json");
    println!("  mrc run pi.json --backend=jit --parallel");
    println!("  mrc check pi.json");
}
