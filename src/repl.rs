//! Interactive read-eval-print loop. Grounded directly in
//! `original_source/cli/src/repl.cpp`'s `repl()`: same meta-command set,
//! same trim-then-dispatch flow, same `#interpret` toggle between executing
//! a line and only disassembling it.

use std::io::{self, Write};

use crate::error::InterpretResult;
use crate::interner::StringInterner;
use crate::vm::Vm;

pub fn run() {
    let mut vm = Vm::new();
    let mut interner = StringInterner::new();
    let mut interpret = true;

    println!("Lox REPL");
    println!("Type '#exit' to quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            if !dispatch_command(command, &mut vm, &mut interpret) {
                break;
            }
            continue;
        }

        if interpret {
            run_line(line, &mut vm, &mut interner);
        } else {
            disassemble_line(line, &mut interner);
        }
    }
}

/// Returns `false` when the REPL should exit (`#exit`).
fn dispatch_command(command: &str, vm: &mut Vm, interpret: &mut bool) -> bool {
    match command {
        "exit" => return false,
        "help" => {
            println!("Lox REPL");
            println!("Type '#exit' to quit");
        }
        "clear" => {
            print!("\x1b[2J\x1b[1;1H");
            let _ = io::stdout().flush();
        }
        "debug_trace" => {
            vm.debug_trace_instructions = !vm.debug_trace_instructions;
            println!(
                "Debug trace is {}",
                if vm.debug_trace_instructions { "on" } else { "off" }
            );
        }
        "debug_stack" => {
            vm.debug_trace_stack = !vm.debug_trace_stack;
            println!(
                "Debug stack is {}",
                if vm.debug_trace_stack { "on" } else { "off" }
            );
        }
        "interpret" => {
            *interpret = !*interpret;
            println!("Interpret is {}", if *interpret { "on" } else { "off" });
        }
        _ => println!("Unknown command"),
    }
    true
}

fn run_line(line: &str, vm: &mut Vm, interner: &mut StringInterner) {
    match crate::compiler::compile(line, interner) {
        Ok(function) => match vm.interpret(function) {
            InterpretResult::Ok => {}
            InterpretResult::CompileError(err) => eprintln!("{err}"),
            InterpretResult::RuntimeError(err) => eprintln!("{err}"),
        },
        Err(err) => eprintln!("{err}"),
    }
}

fn disassemble_line(line: &str, interner: &mut StringInterner) {
    match crate::compiler::compile(line, interner) {
        Ok(function) => crate::disassembler::disassemble_chunk(&function.chunk, "REPL"),
        Err(err) => eprintln!("{err}"),
    }
}
