//! Single-pass Pratt parser: walks tokens once, emitting bytecode directly
//! into the `Chunk` of the function currently being compiled. Nested
//! function declarations push a new compilation frame onto `self.frames`
//! rather than recursing through a separate struct — this crate has no GC so
//! there's no need for the teacher's enclosing-pointer dance, a plain stack
//! suffices.

use std::rc::Rc;

use crate::error::CompileError;
use crate::interner::StringInterner;
use crate::opcode::OpCode;
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};
use crate::value::{LoxFunction, Value};

const MAX_LOCALS: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Precedence {
        use Precedence::*;
        match self {
            None => Assignment,
            Assignment => Or,
            Or => And,
            And => Equality,
            Equality => Comparison,
            Comparison => Term,
            Term => Factor,
            Factor => Unary,
            Unary => Call,
            Call => Primary,
            Primary => Primary,
        }
    }
}

type ParseFn<'src> = fn(&mut Compiler<'src>, bool);

struct ParseRule<'src> {
    prefix: Option<ParseFn<'src>>,
    infix: Option<ParseFn<'src>>,
    precedence: Precedence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    Script,
    Function,
}

struct Local {
    name: String,
    depth: i32,
    initialized: bool,
}

/// One function's worth of compilation state: the chunk being built, its
/// locals, and the current lexical scope depth.
struct Frame {
    function: LoxFunction,
    function_type: FunctionType,
    locals: Vec<Local>,
    scope_depth: i32,
}

impl Frame {
    fn new(function_type: FunctionType, name: Rc<str>) -> Self {
        // Slot 0 is reserved for the callee itself (matches the VM's
        // `stack_offset - arity + slot` addressing).
        let locals = vec![Local {
            name: String::new(),
            depth: 0,
            initialized: true,
        }];
        Frame {
            function: LoxFunction::new(name),
            function_type,
            locals,
            scope_depth: 0,
        }
    }
}

pub struct Compiler<'src> {
    scanner: Scanner<'src>,
    interner: &'src mut StringInterner,
    current: Token<'src>,
    previous: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    diagnostics: Vec<String>,
    frames: Vec<Frame>,
}

/// Compiles `source` into the implicit top-level script function.
pub fn compile(
    source: &str,
    interner: &mut StringInterner,
) -> Result<Rc<LoxFunction>, CompileError> {
    let mut compiler = Compiler {
        scanner: Scanner::new(source),
        interner,
        current: Token {
            kind: TokenType::Eof,
            lexeme: "",
            line: 0,
        },
        previous: Token {
            kind: TokenType::Eof,
            lexeme: "",
            line: 0,
        },
        had_error: false,
        panic_mode: false,
        diagnostics: Vec::new(),
        frames: vec![Frame::new(FunctionType::Script, Rc::from(""))],
    };

    compiler.advance();
    while !compiler.match_token(TokenType::Eof) {
        compiler.declaration();
    }
    let function = compiler.end_frame();

    if compiler.had_error {
        Err(CompileError {
            diagnostics: compiler.diagnostics,
        })
    } else {
        Ok(Rc::new(function))
    }
}

impl<'src> Compiler<'src> {
    fn frame(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("at least one frame")
    }

    fn chunk(&mut self) -> &mut crate::chunk::Chunk {
        &mut self.frame().function.chunk
    }

    // ---- token stream -------------------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenType::Error {
                break;
            }
            let message = self.current.lexeme.to_string();
            self.error_at_current(&message);
        }
    }

    fn consume(&mut self, kind: TokenType, message: &str) {
        if self.current.kind == kind {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    fn check(&self, kind: TokenType) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenType) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        let where_ = match token.kind {
            TokenType::Eof => " at end".to_string(),
            TokenType::Error => String::new(),
            _ => format!(" at '{}'", token.lexeme),
        };
        self.diagnostics
            .push(format!("[line {}] Error{}: {}", token.line, where_, message));
        self.had_error = true;
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenType::Eof {
            if self.previous.kind == TokenType::Semicolon {
                return;
            }
            use TokenType::*;
            match self.current.kind {
                Class | Fun | Var | For | If | While | Print | Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    // ---- emit helpers ---------------------------------------------------

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk().write(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op as u8);
    }

    fn emit_bytes(&mut self, op: OpCode, byte: u8) {
        self.emit_op(op);
        self.emit_byte(byte);
    }

    fn emit_return(&mut self) {
        self.emit_op(OpCode::Nil);
        self.emit_op(OpCode::Return);
    }

    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit_op(op);
        self.emit_byte(0xff);
        self.emit_byte(0xff);
        self.chunk().code.len() - 2
    }

    fn patch_jump(&mut self, offset: usize) {
        let jump = self.chunk().code.len() - offset - 2;
        if jump > u16::MAX as usize {
            self.error("Too much code to jump over.");
            return;
        }
        let hi = ((jump >> 8) & 0xff) as u8;
        let lo = (jump & 0xff) as u8;
        self.chunk().patch_byte(offset, hi);
        self.chunk().patch_byte(offset + 1, lo);
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_op(OpCode::Loop);
        let offset = self.chunk().code.len() - loop_start + 2;
        if offset > u16::MAX as usize {
            self.error("Loop body too large.");
        }
        self.emit_byte(((offset >> 8) & 0xff) as u8);
        self.emit_byte((offset & 0xff) as u8);
    }

    /// Adds `value` to the constant pool and emits the short/long form of
    /// `(short, long)` sized by the resulting index.
    fn emit_constant_op(&mut self, value: Value, short: OpCode, long: OpCode) {
        let index = self.chunk().add_constant(value);
        self.emit_indexed(short, long, index);
    }

    fn emit_indexed(&mut self, short: OpCode, long: OpCode, index: usize) {
        if index > 0xffff {
            self.error("Too many constants in one chunk.");
            return;
        }
        if index <= u8::MAX as usize {
            self.emit_bytes(short, index as u8);
        } else {
            self.emit_op(long);
            self.emit_byte(((index >> 8) & 0xff) as u8);
            self.emit_byte((index & 0xff) as u8);
        }
    }

    fn identifier_constant(&mut self, name: &str) -> usize {
        let interned = self.interner.intern(name);
        self.chunk().add_constant(Value::Object(Rc::new(
            crate::value::Object::String(interned),
        )))
    }

    fn end_frame(&mut self) -> LoxFunction {
        self.emit_return();
        let frame = self.frames.pop().expect("frame pushed by caller");
        frame.function
    }

    // ---- declarations / statements -------------------------------------

    fn declaration(&mut self) {
        if self.match_token(TokenType::Var) {
            self.var_declaration();
        } else if self.match_token(TokenType::Fun) {
            self.fun_declaration();
        } else {
            self.statement();
        }
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");
        if self.match_token(TokenType::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(TokenType::Semicolon, "Expect ';' after variable declaration.");
        self.define_variable(global);
    }

    fn fun_declaration(&mut self) {
        let global = self.parse_variable("Expect function name.");
        self.mark_initialized();
        self.function(FunctionType::Function);
        self.define_variable(global);
    }

    fn function(&mut self, function_type: FunctionType) {
        let name: Rc<str> = Rc::from(self.previous.lexeme);
        self.frames.push(Frame::new(function_type, name));
        self.begin_scope();

        self.consume(TokenType::LeftParen, "Expect '(' after function name.");
        if !self.check(TokenType::RightParen) {
            loop {
                if self.frame().function.arity == 255 {
                    self.error_at_current("Can't have more than 255 parameters.");
                }
                self.frame().function.arity += 1;
                let constant = self.parse_variable("Expect parameter name.");
                self.define_variable(constant);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after parameters.");
        self.consume(TokenType::LeftBrace, "Expect '{' before function body.");
        self.block();

        let function = self.end_frame();
        let index = self.chunk().add_constant(Value::function(Rc::new(function)));
        self.emit_indexed(OpCode::Closure, OpCode::ClosureLong, index);
    }

    fn statement(&mut self) {
        if self.match_token(TokenType::Print) {
            self.print_statement();
        } else if self.match_token(TokenType::If) {
            self.if_statement();
        } else if self.match_token(TokenType::While) {
            self.while_statement();
        } else if self.match_token(TokenType::For) {
            self.for_statement();
        } else if self.match_token(TokenType::Return) {
            self.return_statement();
        } else if self.match_token(TokenType::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn return_statement(&mut self) {
        if self.frame().function_type == FunctionType::Script {
            self.error("Can't return from top-level code.");
        }
        if self.match_token(TokenType::Semicolon) {
            self.emit_return();
        } else {
            self.expression();
            self.consume(TokenType::Semicolon, "Expect ';' after return value.");
            self.emit_op(OpCode::Return);
        }
    }

    fn block(&mut self) {
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            self.declaration();
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.");
    }

    fn if_statement(&mut self) {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();

        let else_jump = self.emit_jump(OpCode::Jump);
        self.patch_jump(then_jump);
        self.emit_op(OpCode::Pop);

        if self.match_token(TokenType::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk().code.len();
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_op(OpCode::Pop);
    }

    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.");

        if self.match_token(TokenType::Semicolon) {
            // no initializer
        } else if self.match_token(TokenType::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk().code.len();
        let mut exit_jump: Option<usize> = None;
        if !self.match_token(TokenType::Semicolon) {
            self.expression();
            self.consume(TokenType::Semicolon, "Expect ';' after loop condition.");
            exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
            self.emit_op(OpCode::Pop);
        }

        if !self.match_token(TokenType::RightParen) {
            let body_jump = self.emit_jump(OpCode::Jump);
            let increment_start = self.chunk().code.len();
            self.expression();
            self.emit_op(OpCode::Pop);
            self.consume(TokenType::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_op(OpCode::Pop);
        }

        self.end_scope();
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    // ---- scope / locals -------------------------------------------------

    fn begin_scope(&mut self) {
        self.frame().scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.frame().scope_depth -= 1;
        let depth = self.frame().scope_depth;
        while let Some(local) = self.frame().locals.last() {
            if local.depth <= depth {
                break;
            }
            self.frame().locals.pop();
            self.emit_op(OpCode::Pop);
        }
    }

    fn declare_variable(&mut self) {
        if self.frame().scope_depth == 0 {
            return;
        }
        let name = self.previous.lexeme.to_string();
        let depth = self.frame().scope_depth;
        let mut duplicate = false;
        for local in self.frame().locals.iter().rev() {
            if local.depth < depth {
                break;
            }
            if local.name == name {
                duplicate = true;
                break;
            }
        }
        if duplicate {
            self.error("Already a variable with this name in this scope.");
            return;
        }
        if self.frame().locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.frame().locals.push(Local {
            name,
            depth,
            initialized: false,
        });
    }

    fn parse_variable(&mut self, message: &str) -> usize {
        self.consume(TokenType::Identifier, message);
        self.declare_variable();
        if self.frame().scope_depth > 0 {
            return 0;
        }
        let name = self.previous.lexeme.to_string();
        self.identifier_constant(&name)
    }

    fn mark_initialized(&mut self) {
        if self.frame().scope_depth == 0 {
            return;
        }
        if let Some(local) = self.frame().locals.last_mut() {
            local.initialized = true;
        }
    }

    fn define_variable(&mut self, global: usize) {
        if self.frame().scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_indexed(OpCode::DefineGlobal, OpCode::DefineGlobalLong, global);
    }

    fn resolve_local(&mut self, name: &str) -> Option<usize> {
        let locals = &self.frame().locals;
        for (i, local) in locals.iter().enumerate().rev() {
            if local.name == name {
                if !local.initialized {
                    self.error("Can't read local variable in its own initializer.");
                }
                return Some(i);
            }
        }
        None
    }

    fn named_variable(&mut self, name: &str, can_assign: bool) {
        let (get_short, get_long, set_short, set_long, index) =
            if let Some(slot) = self.resolve_local(name) {
                (
                    OpCode::GetLocal,
                    OpCode::GetLocalLong,
                    OpCode::SetLocal,
                    OpCode::SetLocalLong,
                    slot,
                )
            } else {
                let index = self.identifier_constant(name);
                (
                    OpCode::GetGlobal,
                    OpCode::GetGlobalLong,
                    OpCode::SetGlobal,
                    OpCode::SetGlobalLong,
                    index,
                )
            };

        if can_assign && self.match_token(TokenType::Equal) {
            self.expression();
            self.emit_indexed(set_short, set_long, index);
        } else {
            self.emit_indexed(get_short, get_long, index);
        }
    }

    // ---- expressions ------------------------------------------------------

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let prefix = get_rule(self.previous.kind).prefix;
        let Some(prefix) = prefix else {
            self.error("Expect expression.");
            return;
        };
        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= get_rule(self.current.kind).precedence {
            self.advance();
            let infix = get_rule(self.previous.kind)
                .infix
                .expect("token with precedence has infix rule");
            infix(self, can_assign);
        }

        if can_assign && self.match_token(TokenType::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn grouping(&mut self, _can_assign: bool) {
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self, _can_assign: bool) {
        let kind = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match kind {
            TokenType::Minus => self.emit_op(OpCode::Negate),
            TokenType::Bang => self.emit_op(OpCode::Not),
            _ => unreachable!("unary rule only registered for - and !"),
        }
    }

    fn binary(&mut self, _can_assign: bool) {
        let kind = self.previous.kind;
        let rule = get_rule(kind);
        self.parse_precedence(rule.precedence.next());
        match kind {
            TokenType::Plus => self.emit_op(OpCode::Add),
            TokenType::Minus => self.emit_op(OpCode::Subtract),
            TokenType::Star => self.emit_op(OpCode::Multiply),
            TokenType::Slash => self.emit_op(OpCode::Divide),
            TokenType::BangEqual => self.emit_op(OpCode::NotEqual),
            TokenType::EqualEqual => self.emit_op(OpCode::Equal),
            TokenType::Greater => self.emit_op(OpCode::Greater),
            TokenType::GreaterEqual => self.emit_op(OpCode::GreaterEqual),
            TokenType::Less => self.emit_op(OpCode::Less),
            TokenType::LessEqual => self.emit_op(OpCode::LessEqual),
            _ => unreachable!("binary rule only registered for binary operators"),
        }
    }

    fn call(&mut self, _can_assign: bool) {
        let argc = self.argument_list();
        self.emit_bytes(OpCode::Call, argc);
    }

    fn argument_list(&mut self) -> u8 {
        let mut argc: u32 = 0;
        if !self.check(TokenType::RightParen) {
            loop {
                self.expression();
                if argc == 255 {
                    self.error("Can't have more than 255 arguments.");
                }
                argc += 1;
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after arguments.");
        argc as u8
    }

    fn number(&mut self, _can_assign: bool) {
        let value: f64 = self.previous.lexeme.parse().unwrap_or(f64::NAN);
        self.emit_constant_op(Value::Number(value), OpCode::Constant, OpCode::ConstantLong);
    }

    fn string(&mut self, _can_assign: bool) {
        let raw = self.previous.lexeme;
        let text = &raw[1..raw.len() - 1];
        let interned = self.interner.intern(text);
        self.emit_constant_op(
            Value::Object(Rc::new(crate::value::Object::String(interned))),
            OpCode::Constant,
            OpCode::ConstantLong,
        );
    }

    fn literal(&mut self, _can_assign: bool) {
        match self.previous.kind {
            TokenType::False => self.emit_op(OpCode::False),
            TokenType::True => self.emit_op(OpCode::True),
            TokenType::Nil => self.emit_op(OpCode::Nil),
            _ => unreachable!("literal rule only registered for false/true/nil"),
        }
    }

    fn variable(&mut self, can_assign: bool) {
        let name = self.previous.lexeme.to_string();
        self.named_variable(&name, can_assign);
    }

    fn and_(&mut self, _can_assign: bool) {
        let end_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.parse_precedence(Precedence::And);
        self.patch_jump(end_jump);
    }

    fn or_(&mut self, _can_assign: bool) {
        let else_jump = self.emit_jump(OpCode::JumpIfFalse);
        let end_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(else_jump);
        self.emit_op(OpCode::Pop);

        self.parse_precedence(Precedence::Or);
        self.patch_jump(end_jump);
    }
}

fn get_rule<'src>(kind: TokenType) -> ParseRule<'src> {
    use TokenType as T;
    let (prefix, infix, precedence): (Option<ParseFn<'src>>, Option<ParseFn<'src>>, Precedence) =
        match kind {
            T::LeftParen => (
                Some(Compiler::grouping),
                Some(Compiler::call),
                Precedence::Call,
            ),
            T::Minus => (
                Some(Compiler::unary),
                Some(Compiler::binary),
                Precedence::Term,
            ),
            T::Plus => (None, Some(Compiler::binary), Precedence::Term),
            T::Slash | T::Star => (None, Some(Compiler::binary), Precedence::Factor),
            T::Bang => (Some(Compiler::unary), None, Precedence::None),
            T::BangEqual | T::EqualEqual => {
                (None, Some(Compiler::binary), Precedence::Equality)
            }
            T::Greater | T::GreaterEqual | T::Less | T::LessEqual => {
                (None, Some(Compiler::binary), Precedence::Comparison)
            }
            T::Identifier => (Some(Compiler::variable), None, Precedence::None),
            T::String => (Some(Compiler::string), None, Precedence::None),
            T::Number => (Some(Compiler::number), None, Precedence::None),
            T::And => (None, Some(Compiler::and_), Precedence::And),
            T::Or => (None, Some(Compiler::or_), Precedence::Or),
            T::False | T::Nil | T::True => (Some(Compiler::literal), None, Precedence::None),
            _ => (None, None, Precedence::None),
        };
    ParseRule {
        prefix,
        infix,
        precedence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(source: &str) -> Rc<LoxFunction> {
        let mut interner = StringInterner::new();
        compile(source, &mut interner).expect("expected source to compile")
    }

    #[test]
    fn compiles_arithmetic_expression_statement() {
        let function = compile_ok("1 + 2 * 3;");
        assert!(function.chunk.code.contains(&(OpCode::Add as u8)));
        assert!(function.chunk.code.contains(&(OpCode::Multiply as u8)));
        assert_eq!(*function.chunk.code.last().unwrap(), OpCode::Return as u8);
    }

    #[test]
    fn global_variable_round_trips_define_and_get() {
        let function = compile_ok("var x = 1; print x;");
        assert!(function.chunk.code.contains(&(OpCode::DefineGlobal as u8)));
        assert!(function.chunk.code.contains(&(OpCode::GetGlobal as u8)));
    }

    #[test]
    fn local_variable_uses_local_opcodes_not_global() {
        let function = compile_ok("{ var x = 1; print x; }");
        assert!(function.chunk.code.contains(&(OpCode::GetLocal as u8)));
        assert!(!function.chunk.code.contains(&(OpCode::DefineGlobal as u8)));
    }

    #[test]
    fn reading_local_in_its_own_initializer_is_an_error() {
        let mut interner = StringInterner::new();
        let result = compile("{ var a = a; }", &mut interner);
        assert!(result.is_err());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let mut interner = StringInterner::new();
        let result = compile("return 1;", &mut interner);
        assert!(result.is_err());
    }

    #[test]
    fn function_declaration_emits_closure_and_defines_global() {
        let function = compile_ok("fun add(a, b) { return a + b; } print add(1, 2);");
        assert!(function.chunk.code.contains(&(OpCode::Closure as u8)));
        assert!(function.chunk.code.contains(&(OpCode::Call as u8)));
    }

    #[test]
    fn if_else_patches_both_jumps_in_range() {
        let function = compile_ok("if (true) { print 1; } else { print 2; }");
        assert!(function.chunk.code.contains(&(OpCode::JumpIfFalse as u8)));
        assert!(function.chunk.code.contains(&(OpCode::Jump as u8)));
    }

    #[test]
    fn while_loop_emits_loop_instruction() {
        let function = compile_ok("var i = 0; while (i < 3) { i = i + 1; }");
        assert!(function.chunk.code.contains(&(OpCode::Loop as u8)));
    }

    #[test]
    fn compiling_same_source_twice_is_byte_identical() {
        let mut interner_a = StringInterner::new();
        let mut interner_b = StringInterner::new();
        let a = compile("var x = 1 + 2; print x;", &mut interner_a).unwrap();
        let b = compile("var x = 1 + 2; print x;", &mut interner_b).unwrap();
        assert_eq!(a.chunk.code, b.chunk.code);
    }

    #[test]
    fn syntax_error_reports_line_and_does_not_panic() {
        let mut interner = StringInterner::new();
        let err = compile("var = 1;", &mut interner).unwrap_err();
        assert!(!err.diagnostics.is_empty());
    }
}
