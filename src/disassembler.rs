//! Human-readable bytecode listings, used by the `-c`/`--compile-only` CLI
//! flag and the REPL's `#debug_trace` command.
//!
//! Grounded in `original_source/cli/src/debug.cpp`'s `ChunkDisassembly`/
//! `InstructionDisassembly`/`*Instruction` functions: same column layout
//! (offset, line-or-`|`, colored opcode name), same `cyan` opcode / `yellow`
//! operand / `green` constant-value coloring roles.

use crate::chunk::Chunk;
use crate::opcode::OpCode;
use crate::terminal;

pub fn disassemble_chunk(chunk: &Chunk, name: &str) {
    let header = format!(" {name} ");
    println!("{:=^40}", header);
    let mut offset = 0;
    while offset < chunk.code.len() {
        offset = disassemble_instruction(chunk, offset);
    }
}

/// Prints one instruction and returns the offset of the next one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> usize {
    print!("{:04} ", offset);
    if offset > 0 && chunk.get_line(offset) == chunk.get_line(offset - 1) {
        print!("   | ");
    } else {
        print!("{:4} ", chunk.get_line(offset));
    }

    let byte = chunk.code[offset];
    let Some(op) = OpCode::from_u8(byte) else {
        println!(
            "{}",
            terminal::red(terminal::Stream::Stdout, &format!("OP_UNKNOWN ({byte:#04x})"))
        );
        return offset + 1;
    };

    use OpCode::*;
    match op {
        Constant => constant_instruction(chunk, op, offset, false),
        ConstantLong => constant_instruction(chunk, op, offset, true),
        GetLocal | SetLocal => byte_instruction(chunk, op, offset, false),
        GetLocalLong | SetLocalLong => byte_instruction(chunk, op, offset, true),
        GetGlobal | DefineGlobal | SetGlobal => constant_instruction(chunk, op, offset, false),
        GetGlobalLong | DefineGlobalLong | SetGlobalLong => {
            constant_instruction(chunk, op, offset, true)
        }
        Closure => constant_instruction(chunk, op, offset, false),
        ClosureLong => constant_instruction(chunk, op, offset, true),
        Jump | JumpIfFalse => jump_instruction(chunk, op, offset, 1),
        Loop => jump_instruction(chunk, op, offset, -1),
        Call => byte_instruction(chunk, op, offset, false),
        Nil | True | False | Pop | Equal | NotEqual | Greater | GreaterEqual | Less
        | LessEqual | Add | Subtract | Multiply | Divide | Not | Negate | Print | Return => {
            simple_instruction(op, offset)
        }
    }
}

fn simple_instruction(op: OpCode, offset: usize) -> usize {
    println!("{}", terminal::cyan(terminal::Stream::Stdout, op.name()));
    offset + 1
}

fn constant_instruction(chunk: &Chunk, op: OpCode, offset: usize, long: bool) -> usize {
    let (index, next) = if long {
        let hi = chunk.code[offset + 1] as usize;
        let lo = chunk.code[offset + 2] as usize;
        ((hi << 8) | lo, offset + 3)
    } else {
        (chunk.code[offset + 1] as usize, offset + 2)
    };
    let value = chunk
        .constants
        .get(index)
        .map(|v| v.to_display_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "{:<16} {} '{}'",
        terminal::cyan(terminal::Stream::Stdout, op.name()),
        terminal::yellow(terminal::Stream::Stdout, &format!("{index:4}")),
        terminal::green(terminal::Stream::Stdout, &value)
    );
    next
}

fn byte_instruction(chunk: &Chunk, op: OpCode, offset: usize, long: bool) -> usize {
    let (slot, next) = if long {
        let hi = chunk.code[offset + 1] as usize;
        let lo = chunk.code[offset + 2] as usize;
        ((hi << 8) | lo, offset + 3)
    } else {
        (chunk.code[offset + 1] as usize, offset + 2)
    };
    println!(
        "{:<16} {}",
        terminal::cyan(terminal::Stream::Stdout, op.name()),
        terminal::yellow(terminal::Stream::Stdout, &format!("{slot:4}"))
    );
    next
}

fn jump_instruction(chunk: &Chunk, op: OpCode, offset: usize, sign: i32) -> usize {
    let hi = chunk.code[offset + 1] as usize;
    let lo = chunk.code[offset + 2] as usize;
    let jump = (hi << 8) | lo;
    let target = offset as i64 + 3 + sign as i64 * jump as i64;
    println!(
        "{:<16} {} -> {}",
        terminal::cyan(terminal::Stream::Stdout, op.name()),
        terminal::yellow(terminal::Stream::Stdout, &format!("{offset:4}")),
        target
    );
    offset + 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn walks_every_instruction_exactly_once() {
        let mut chunk = Chunk::new();
        chunk.write_constant(Value::Number(1.0), 1);
        chunk.write_op(OpCode::Return, 1);
        let mut offset = 0;
        let mut steps = 0;
        while offset < chunk.code.len() {
            offset = disassemble_instruction(&chunk, offset);
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert_eq!(offset, chunk.code.len());
    }
}
