//! Structured error types threaded through `Result<_, String>`-shaped
//! compiler/VM entry points, mirroring the teacher's own `Result<LuaValue,
//! String>` convention rather than reaching for `thiserror`/`anyhow` (the
//! teacher's workspace carries neither).

use std::fmt;

/// One entry in a runtime-error stack trace: `[Line L] in <name>`.
#[derive(Debug, Clone)]
pub struct FrameTrace {
    pub line: u32,
    pub function_name: String,
}

/// A runtime error raised by the VM during dispatch. Carries the rendered
/// message plus the call-frame trace so callers can re-render or inspect it
/// without re-parsing printed text.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub message: String,
    pub frames: Vec<FrameTrace>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{} in {}",
                crate::terminal::green(
                    crate::terminal::Stream::Stderr,
                    &format!("[Line {}]", frame.line)
                ),
                crate::terminal::yellow(crate::terminal::Stream::Stderr, &frame.function_name)
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

/// Compile-time diagnostics batched across one compile call (synchronized
/// error recovery lets the compiler report more than one).
#[derive(Debug, Clone, Default)]
pub struct CompileError {
    pub diagnostics: Vec<String>,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Outcome of `VM::interpret`, matching the spec's CLI exit-code contract
/// (0 / 65 / 70) at the driver layer.
#[derive(Debug)]
pub enum InterpretResult {
    Ok,
    CompileError(CompileError),
    RuntimeError(RuntimeError),
}
