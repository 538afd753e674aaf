use std::fs;
use std::process::ExitCode;

use lox_rs::error::InterpretResult;
use lox_rs::interner::StringInterner;

fn print_usage() {
    eprintln!("usage: lox [script]");
    eprintln!("       lox -c <script>   (compile only, disassemble)");
}

enum Mode {
    Repl,
    RunFile(String),
    CompileOnly(String),
}

fn parse_args() -> Result<Mode, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(Mode::Repl),
        [flag, path] if flag == "-c" => Ok(Mode::CompileOnly(path.clone())),
        [path] if !path.starts_with('-') => Ok(Mode::RunFile(path.clone())),
        _ => Err(format!("unrecognized arguments: {}", args.join(" "))),
    }
}

/// Runs a file to completion, mapping its outcome to the spec's exit-code
/// contract (0 / 65 / 70). Grounded in `original_source/cli/src/repl.cpp`'s
/// `runFile`.
fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("lox: cannot open '{}': {}", path, e);
            return ExitCode::from(1);
        }
    };

    match lox_rs::interpret(&source) {
        InterpretResult::Ok => ExitCode::from(0),
        InterpretResult::CompileError(err) => {
            eprintln!("{err}");
            ExitCode::from(65)
        }
        InterpretResult::RuntimeError(err) => {
            eprintln!("{err}");
            ExitCode::from(70)
        }
    }
}

fn compile_only(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("lox: cannot open '{}': {}", path, e);
            return ExitCode::from(1);
        }
    };

    let mut interner = StringInterner::new();
    match lox_rs::compiler::compile(&source, &mut interner) {
        Ok(function) => {
            lox_rs::disassembler::disassemble_chunk(&function.chunk, path);
            ExitCode::from(0)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(65)
        }
    }
}

fn main() -> ExitCode {
    let mode = match parse_args() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("lox: {}", e);
            print_usage();
            return ExitCode::from(64);
        }
    };

    match mode {
        Mode::Repl => {
            lox_rs::repl::run();
            ExitCode::from(0)
        }
        Mode::RunFile(path) => run_file(&path),
        Mode::CompileOnly(path) => compile_only(&path),
    }
}
