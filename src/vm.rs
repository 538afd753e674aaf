//! The stack-based bytecode interpreter. Fetches and dispatches one opcode
//! at a time from the top call frame, against a value stack, a call-frame
//! stack, and a globals map.
//!
//! Grounded in the teacher's `vm.rs` `VM`/`CallFrame` shape and `run()`
//! dispatch loop, with the register-file/upvalue machinery stripped out: this
//! is a stack machine, so frames index into a shared `Vec<Value>` rather than
//! owning a private register file.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use ahash::RandomState;
use std::collections::HashMap;

use crate::chunk::Chunk;
use crate::error::{FrameTrace, InterpretResult, RuntimeError};
use crate::opcode::OpCode;
use crate::value::{Closure, LoxFunction, Value};

const DEFAULT_MAX_CALLFRAMES: usize = 1024;

struct CallFrame {
    closure: Rc<Closure>,
    ip: usize,
    /// Absolute stack index of this frame's implicit slot-0 "callee" local.
    /// Locals at compiler slot `s` live at `stack_offset + s`.
    stack_offset: usize,
}

impl CallFrame {
    fn chunk(&self) -> &Chunk {
        &self.closure.function.chunk
    }
}

pub struct Vm {
    stack: Vec<Value>,
    frames: Vec<CallFrame>,
    globals: HashMap<Rc<str>, Value, RandomState>,
    max_callframes: usize,
    pub debug_trace_instructions: bool,
    pub debug_trace_stack: bool,
}

impl Vm {
    pub fn new() -> Self {
        let mut vm = Vm {
            stack: Vec::new(),
            frames: Vec::new(),
            globals: HashMap::with_hasher(RandomState::new()),
            max_callframes: DEFAULT_MAX_CALLFRAMES,
            debug_trace_instructions: false,
            debug_trace_stack: false,
        };
        vm.define_native("clock", native_clock);
        vm
    }

    fn define_native(&mut self, name: &str, function: crate::value::NativeFn) {
        self.globals
            .insert(Rc::from(name), Value::native(name, function));
    }

    #[cfg(test)]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Runs a freshly compiled script function to completion.
    pub fn interpret(&mut self, function: Rc<LoxFunction>) -> InterpretResult {
        self.stack.clear();
        self.frames.clear();

        let closure = Rc::new(Closure {
            function: Rc::clone(&function),
        });
        self.stack.push(Value::closure(Rc::clone(&function)));
        self.frames.push(CallFrame {
            closure,
            ip: 0,
            stack_offset: self.stack.len() - 1,
        });

        match self.run() {
            Ok(()) => InterpretResult::Ok,
            Err(err) => InterpretResult::RuntimeError(err),
        }
    }

    fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            if self.debug_trace_stack {
                self.print_stack_trace();
            }
            if self.debug_trace_instructions {
                let frame = self.frames.last().expect("run loop requires a frame");
                crate::disassembler::disassemble_instruction(frame.chunk(), frame.ip);
            }

            let op = self.read_op()?;
            use OpCode::*;
            match op {
                Constant => {
                    let value = self.read_constant(false)?;
                    self.push(value);
                }
                ConstantLong => {
                    let value = self.read_constant(true)?;
                    self.push(value);
                }
                Nil => self.push(Value::Nil),
                True => self.push(Value::Bool(true)),
                False => self.push(Value::Bool(false)),
                Pop => {
                    self.pop()?;
                }
                GetLocal => self.get_local(false)?,
                GetLocalLong => self.get_local(true)?,
                SetLocal => self.set_local(false)?,
                SetLocalLong => self.set_local(true)?,
                GetGlobal => self.get_global(false)?,
                GetGlobalLong => self.get_global(true)?,
                DefineGlobal => self.define_global(false)?,
                DefineGlobalLong => self.define_global(true)?,
                SetGlobal => self.set_global(false)?,
                SetGlobalLong => self.set_global(true)?,
                Equal => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.push(Value::Bool(a.equals(&b)));
                }
                NotEqual => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.push(Value::Bool(!a.equals(&b)));
                }
                Greater => self.number_comparison(|a, b| a > b)?,
                GreaterEqual => self.number_comparison(|a, b| a >= b)?,
                Less => self.number_comparison(|a, b| a < b)?,
                LessEqual => self.number_comparison(|a, b| a <= b)?,
                Add => self.add()?,
                Subtract => self.number_binary_op(|a, b| a - b)?,
                Multiply => self.number_binary_op(|a, b| a * b)?,
                Divide => self.divide()?,
                Not => {
                    let value = self.pop()?;
                    self.push(Value::Bool(!value.is_truthy()));
                }
                Negate => {
                    let value = self.pop()?;
                    match value.as_number() {
                        Some(n) => self.push(Value::Number(-n)),
                        None => return Err(self.runtime_error("Operand must be a number.")),
                    }
                }
                Print => {
                    let value = self.pop()?;
                    println!("{}", value.to_display_string());
                }
                Jump => {
                    let offset = self.read_u16()?;
                    self.frame_mut().ip += offset as usize;
                }
                JumpIfFalse => {
                    let offset = self.read_u16()?;
                    if !self.peek(0)?.is_truthy() {
                        self.frame_mut().ip += offset as usize;
                    }
                }
                Loop => {
                    let offset = self.read_u16()?;
                    self.frame_mut().ip -= offset as usize;
                }
                Call => {
                    let argc = self.read_byte()? as usize;
                    self.call_value(argc)?;
                }
                Closure => self.closure(false)?,
                ClosureLong => self.closure(true)?,
                Return => {
                    let value = self.pop()?;
                    let frame = self.frames.pop().expect("return requires a frame");
                    self.stack.truncate(frame.stack_offset);
                    if self.frames.is_empty() {
                        // Top-level script return: nobody awaits this value,
                        // so don't leave it on the stack (a successful run
                        // with no leftover expression statements ends with
                        // an empty stack).
                        return Ok(());
                    }
                    self.push(value);
                }
            }
        }
    }

    // ---- fetch helpers --------------------------------------------------

    fn frame(&self) -> &CallFrame {
        self.frames.last().expect("dispatch loop requires a frame")
    }

    fn frame_mut(&mut self) -> &mut CallFrame {
        self.frames.last_mut().expect("dispatch loop requires a frame")
    }

    fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        let frame = self.frame_mut();
        let byte = *frame
            .chunk()
            .code
            .get(frame.ip)
            .ok_or_else(|| {
                RuntimeError {
                    message: "Bytecode read past end of chunk.".to_string(),
                    frames: Vec::new(),
                }
            })?;
        frame.ip += 1;
        Ok(byte)
    }

    fn read_u16(&mut self) -> Result<u16, RuntimeError> {
        let hi = self.read_byte()? as u16;
        let lo = self.read_byte()? as u16;
        Ok((hi << 8) | lo)
    }

    fn read_op(&mut self) -> Result<OpCode, RuntimeError> {
        let byte = self.read_byte()?;
        OpCode::from_u8(byte).ok_or_else(|| self.runtime_error("Unknown opcode."))
    }

    fn read_index(&mut self, long: bool) -> Result<usize, RuntimeError> {
        if long {
            Ok(self.read_u16()? as usize)
        } else {
            Ok(self.read_byte()? as usize)
        }
    }

    fn read_constant(&mut self, long: bool) -> Result<Value, RuntimeError> {
        let index = self.read_index(long)?;
        self.frame()
            .chunk()
            .constants
            .get(index)
            .cloned()
            .ok_or_else(|| self.runtime_error("Invalid constant address."))
    }

    // ---- stack helpers ----------------------------------------------------

    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or_else(|| self.runtime_error("Stack underflow."))
    }

    fn peek(&self, distance: usize) -> Result<&Value, RuntimeError> {
        let len = self.stack.len();
        if distance >= len {
            return Err(self.runtime_error("Stack underflow."));
        }
        Ok(&self.stack[len - 1 - distance])
    }

    fn print_stack_trace(&self) {
        print!("          ");
        for value in &self.stack {
            print!("[ {} ]", value.to_display_string());
        }
        println!();
    }

    // ---- locals / globals -------------------------------------------------

    fn get_local(&mut self, long: bool) -> Result<(), RuntimeError> {
        let slot = self.read_index(long)?;
        let base = self.frame().stack_offset;
        let value = self
            .stack
            .get(base + slot)
            .cloned()
            .ok_or_else(|| self.runtime_error("Tried to access a non-existing local."))?;
        self.push(value);
        Ok(())
    }

    fn set_local(&mut self, long: bool) -> Result<(), RuntimeError> {
        let slot = self.read_index(long)?;
        let base = self.frame().stack_offset;
        let value = self.peek(0)?.clone();
        match self.stack.get_mut(base + slot) {
            Some(target) => *target = value,
            None => return Err(self.runtime_error("Tried to set a non-existing local.")),
        }
        Ok(())
    }

    fn global_name(&mut self, long: bool) -> Result<Rc<str>, RuntimeError> {
        let value = self.read_constant(long)?;
        value
            .as_string()
            .cloned()
            .ok_or_else(|| self.runtime_error("Global name constant was not a string."))
    }

    fn get_global(&mut self, long: bool) -> Result<(), RuntimeError> {
        let name = self.global_name(long)?;
        match self.globals.get(&name) {
            Some(value) => {
                let value = value.clone();
                self.push(value);
                Ok(())
            }
            None => Err(self.runtime_error(&format!("Undefined variable '{}'.", name))),
        }
    }

    fn define_global(&mut self, long: bool) -> Result<(), RuntimeError> {
        let name = self.global_name(long)?;
        let value = self.pop()?;
        self.globals.insert(name, value);
        Ok(())
    }

    fn set_global(&mut self, long: bool) -> Result<(), RuntimeError> {
        let name = self.global_name(long)?;
        if !self.globals.contains_key(&name) {
            return Err(self.runtime_error(&format!("Undefined variable '{}'.", name)));
        }
        let value = self.peek(0)?.clone();
        self.globals.insert(name, value);
        Ok(())
    }

    // ---- arithmetic ---------------------------------------------------------

    fn number_binary_op(&mut self, op: impl Fn(f64, f64) -> f64) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => {
                self.push(Value::Number(op(a, b)));
                Ok(())
            }
            _ => Err(self.runtime_error("Operands must be numbers.")),
        }
    }

    fn number_comparison(&mut self, op: impl Fn(f64, f64) -> bool) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => {
                self.push(Value::Bool(op(a, b)));
                Ok(())
            }
            _ => Err(self.runtime_error("Operands must be numbers.")),
        }
    }

    fn add(&mut self) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => {
                self.push(Value::Number(a + b));
                return Ok(());
            }
            _ => {}
        }
        match (a.as_string(), b.as_string()) {
            (Some(a), Some(b)) => {
                let mut s = String::with_capacity(a.len() + b.len());
                s.push_str(a);
                s.push_str(b);
                self.push(Value::string(s));
                Ok(())
            }
            _ => Err(self.runtime_error("Operands must be two numbers or two strings.")),
        }
    }

    fn divide(&mut self) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a.as_number(), b.as_number()) {
            (Some(_), Some(b)) if b == 0.0 => Err(self.runtime_error("Division by zero.")),
            (Some(a), Some(b)) => {
                self.push(Value::Number(a / b));
                Ok(())
            }
            _ => Err(self.runtime_error("Operands must be numbers.")),
        }
    }

    // ---- calls ------------------------------------------------------------

    fn closure(&mut self, long: bool) -> Result<(), RuntimeError> {
        let value = self.read_constant(long)?;
        let function = value
            .as_callable_function()
            .ok_or_else(|| self.runtime_error("Expected function for closure."))?;
        self.push(Value::closure(function));
        Ok(())
    }

    fn call_value(&mut self, argc: usize) -> Result<(), RuntimeError> {
        if self.stack.len() < argc + 1 {
            return Err(self.runtime_error("Not enough values to call function."));
        }
        let callee = self.stack[self.stack.len() - argc - 1].clone();

        if let Some(function) = callee.as_callable_function() {
            return self.call_function(function, argc);
        }
        if let Some(native) = callee.as_native() {
            let start = self.stack.len() - argc;
            let args: Vec<Value> = self.stack[start..].to_vec();
            let result = (native.function)(&args).map_err(|message| self.runtime_error(&message))?;
            self.stack.truncate(self.stack.len() - argc - 1);
            self.push(result);
            return Ok(());
        }
        Err(self.runtime_error("Can only call functions and classes."))
    }

    fn call_function(&mut self, function: Rc<LoxFunction>, argc: usize) -> Result<(), RuntimeError> {
        if argc != function.arity as usize {
            return Err(self.runtime_error(&format!(
                "Expected {} arguments but got {}.",
                function.arity, argc
            )));
        }
        if self.frames.len() == self.max_callframes {
            return Err(self.runtime_error("Stack overflow."));
        }
        let stack_offset = self.stack.len() - argc - 1;
        self.frames.push(CallFrame {
            closure: Rc::new(Closure { function }),
            ip: 0,
            stack_offset,
        });
        Ok(())
    }

    // ---- errors -------------------------------------------------------------

    fn runtime_error(&self, message: &str) -> RuntimeError {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|frame| FrameTrace {
                line: frame.chunk().get_line(frame.ip.saturating_sub(1)),
                function_name: frame.closure.function.display_name().to_string(),
            })
            .collect();
        RuntimeError {
            message: message.to_string(),
            frames,
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}

fn native_clock(_args: &[Value]) -> Result<Value, String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| e.to_string())?;
    Ok(Value::Number(now.as_millis() as f64 / 1000.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::StringInterner;

    fn run(source: &str) -> InterpretResult {
        let mut interner = StringInterner::new();
        let function = crate::compiler::compile(source, &mut interner).expect("should compile");
        Vm::new().interpret(function)
    }

    #[test]
    fn arithmetic_runs_to_completion() {
        assert!(matches!(run("print 1 + 2 * 3;"), InterpretResult::Ok));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        assert!(matches!(
            run("print 1 / 0;"),
            InterpretResult::RuntimeError(_)
        ));
    }

    #[test]
    fn calling_a_non_callable_is_a_runtime_error() {
        assert!(matches!(
            run("var x = 1; x();"),
            InterpretResult::RuntimeError(_)
        ));
    }

    #[test]
    fn user_functions_can_call_and_return() {
        assert!(matches!(
            run("fun add(a, b) { return a + b; } print add(1, 2);"),
            InterpretResult::Ok
        ));
    }

    #[test]
    fn clock_native_is_callable_and_returns_a_number() {
        assert!(matches!(run("print clock();"), InterpretResult::Ok));
    }

    #[test]
    fn wrong_arity_is_a_runtime_error() {
        assert!(matches!(
            run("fun f(a) { return a; } f(1, 2);"),
            InterpretResult::RuntimeError(_)
        ));
    }

    #[test]
    fn stack_is_empty_after_script_with_no_leftover_expressions() {
        let mut interner = StringInterner::new();
        let function = crate::compiler::compile(
            "var a = 1; fun f(x) { return x + 1; } print f(a);",
            &mut interner,
        )
        .expect("should compile");
        let mut vm = Vm::new();
        assert!(matches!(vm.interpret(function), InterpretResult::Ok));
        assert_eq!(vm.stack_len(), 0);
    }

    #[test]
    fn while_loop_terminates_and_prints_expected_count() {
        assert!(matches!(
            run("var i = 0; while (i < 5) { i = i + 1; } print i;"),
            InterpretResult::Ok
        ));
    }
}
