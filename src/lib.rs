// Lox bytecode compiler and VM.

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod error;
pub mod interner;
pub mod opcode;
pub mod repl;
pub mod scanner;
pub mod terminal;
pub mod token;
pub mod value;
pub mod vm;

use interner::StringInterner;

pub use error::InterpretResult;
pub use vm::Vm;

/// Compiles and runs `source` against a fresh VM and string interner.
/// Used by the file-running CLI path; the REPL keeps its own `Vm` alive
/// across lines instead.
pub fn interpret(source: &str) -> InterpretResult {
    let mut interner = StringInterner::new();
    match compiler::compile(source, &mut interner) {
        Ok(function) => Vm::new().interpret(function),
        Err(err) => InterpretResult::CompileError(err),
    }
}
