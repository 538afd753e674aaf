//! Minimal ANSI color helpers for the disassembler and runtime-error traces.
//!
//! Grounded in `original_source/cli`'s `terminal::*_colored` family (used by
//! `cli/src/debug.cpp` and the VM's `runtimeError`): each helper wraps text in
//! a color code and resets it afterward. Colors are only emitted when the
//! *target* stream is a TTY — the disassembler writes to stdout, the
//! runtime-error trace writes to stderr, and the two can disagree (e.g.
//! `lox script.lox >out.txt` redirects stdout but leaves stderr attached to a
//! terminal), so every helper takes a [`Stream`] telling it which one to gate
//! on instead of always checking stdout.

use std::io::IsTerminal;

/// Which output stream a colored string is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn is_terminal(self) -> bool {
        match self {
            Stream::Stdout => std::io::stdout().is_terminal(),
            Stream::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

fn wrap(stream: Stream, code: &str, text: &str) -> String {
    if stream.is_terminal() {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn cyan(stream: Stream, text: &str) -> String {
    wrap(stream, "36", text)
}

pub fn yellow(stream: Stream, text: &str) -> String {
    wrap(stream, "33", text)
}

pub fn green(stream: Stream, text: &str) -> String {
    wrap(stream, "32", text)
}

pub fn red(stream: Stream, text: &str) -> String {
    wrap(stream, "31", text)
}
