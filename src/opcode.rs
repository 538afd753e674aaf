//! The flat stack-machine instruction set. Each instruction is one opcode
//! byte followed by zero or more operand bytes; see [`OpCode`] docs for the
//! operand shape of each variant.

/// Bytecode operations. Every `_LONG` variant has identical semantics to its
/// short counterpart but reads a 2-byte big-endian operand instead of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Constant = 0,
    ConstantLong,
    Nil,
    True,
    False,
    Pop,

    GetLocal,
    GetLocalLong,
    SetLocal,
    SetLocalLong,
    GetGlobal,
    GetGlobalLong,
    DefineGlobal,
    DefineGlobalLong,
    SetGlobal,
    SetGlobalLong,

    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    Add,
    Subtract,
    Multiply,
    Divide,

    Not,
    Negate,

    Print,

    Jump,
    JumpIfFalse,
    Loop,

    Call,

    Closure,
    ClosureLong,

    Return,
}

impl OpCode {
    pub fn from_u8(byte: u8) -> Option<Self> {
        if byte <= OpCode::Return as u8 {
            // SAFETY: `OpCode` is `repr(u8)` and every discriminant up to
            // `Return` is defined contiguously above.
            Some(unsafe { std::mem::transmute::<u8, OpCode>(byte) })
        } else {
            None
        }
    }

    /// Name used by the disassembler, matching the `OP_*` spelling from the
    /// bytecode contract.
    pub fn name(self) -> &'static str {
        use OpCode::*;
        match self {
            Constant => "OP_CONSTANT",
            ConstantLong => "OP_CONSTANT_LONG",
            Nil => "OP_NIL",
            True => "OP_TRUE",
            False => "OP_FALSE",
            Pop => "OP_POP",
            GetLocal => "OP_GET_LOCAL",
            GetLocalLong => "OP_GET_LOCAL_LONG",
            SetLocal => "OP_SET_LOCAL",
            SetLocalLong => "OP_SET_LOCAL_LONG",
            GetGlobal => "OP_GET_GLOBAL",
            GetGlobalLong => "OP_GET_GLOBAL_LONG",
            DefineGlobal => "OP_DEFINE_GLOBAL",
            DefineGlobalLong => "OP_DEFINE_GLOBAL_LONG",
            SetGlobal => "OP_SET_GLOBAL",
            SetGlobalLong => "OP_SET_GLOBAL_LONG",
            Equal => "OP_EQUAL",
            NotEqual => "OP_NOT_EQUAL",
            Greater => "OP_GREATER",
            GreaterEqual => "OP_GREATER_EQUAL",
            Less => "OP_LESS",
            LessEqual => "OP_LESS_EQUAL",
            Add => "OP_ADD",
            Subtract => "OP_SUBTRACT",
            Multiply => "OP_MULTIPLY",
            Divide => "OP_DIVIDE",
            Not => "OP_NOT",
            Negate => "OP_NEGATE",
            Print => "OP_PRINT",
            Jump => "OP_JUMP",
            JumpIfFalse => "OP_JUMP_IF_FALSE",
            Loop => "OP_LOOP",
            Call => "OP_CALL",
            Closure => "OP_CLOSURE",
            ClosureLong => "OP_CLOSURE_LONG",
            Return => "OP_RETURN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_discriminant() {
        for byte in 0..=(OpCode::Return as u8) {
            assert_eq!(OpCode::from_u8(byte).unwrap() as u8, byte);
        }
    }

    #[test]
    fn rejects_out_of_range_byte() {
        assert!(OpCode::from_u8(OpCode::Return as u8 + 1).is_none());
    }
}
