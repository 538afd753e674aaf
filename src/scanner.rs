//! Hand-rolled lexer: a cursor over the source string that yields one
//! [`Token`] at a time. No lookahead buffer is kept; the compiler drives the
//! cursor one token ahead of what it is currently parsing.

use crate::token::{keyword_kind, Token, TokenType};

pub struct Scanner<'src> {
    source: &'src str,
    bytes: &'src [u8],
    start: usize,
    current: usize,
    line: u32,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Scanner {
            source,
            bytes: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return self.make_token(TokenType::Eof);
        }

        let c = self.advance();

        if is_digit(c) {
            return self.number();
        }
        if is_alpha(c) {
            return self.identifier();
        }

        match c {
            b'(' => self.make_token(TokenType::LeftParen),
            b')' => self.make_token(TokenType::RightParen),
            b'{' => self.make_token(TokenType::LeftBrace),
            b'}' => self.make_token(TokenType::RightBrace),
            b';' => self.make_token(TokenType::Semicolon),
            b',' => self.make_token(TokenType::Comma),
            b'.' => self.make_token(TokenType::Dot),
            b'-' => self.make_token(TokenType::Minus),
            b'+' => self.make_token(TokenType::Plus),
            b'/' => self.make_token(TokenType::Slash),
            b'*' => self.make_token(TokenType::Star),
            b'!' => {
                let kind = if self.match_char(b'=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.make_token(kind)
            }
            b'=' => {
                let kind = if self.match_char(b'=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.make_token(kind)
            }
            b'<' => {
                let kind = if self.match_char(b'=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.make_token(kind)
            }
            b'>' => {
                let kind = if self.match_char(b'=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.make_token(kind)
            }
            b'"' => self.string(),
            _ => self.error_token("Unexpected character."),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.bytes.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.bytes[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.bytes.len() {
            0
        } else {
            self.bytes[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.bytes[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | 0x0c => {
                    self.current += 1;
                }
                b'\n' => {
                    self.line += 1;
                    self.current += 1;
                }
                b'/' => {
                    if self.peek_next() == b'/' {
                        while self.peek() != b'\n' && !self.is_at_end() {
                            self.current += 1;
                        }
                    } else if self.peek_next() == b'*' {
                        self.current += 2;
                        self.skip_block_comment();
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Consumes up to and including the closing `*/`. Nested newlines bump
    /// the line counter; nested `/* */` pairs are not tracked (the first
    /// `*/` found closes the comment, matching the spec).
    fn skip_block_comment(&mut self) {
        while !self.is_at_end() {
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.current += 2;
                return;
            }
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.current += 1;
        }
    }

    fn string(&mut self) -> Token<'src> {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string.");
        }

        self.current += 1; // closing quote
        self.make_token(TokenType::String)
    }

    fn number(&mut self) -> Token<'src> {
        while is_digit(self.peek()) {
            self.current += 1;
        }

        if self.peek() == b'.' && is_digit(self.peek_next()) {
            self.current += 1; // consume '.'
            while is_digit(self.peek()) {
                self.current += 1;
            }
        }

        self.make_token(TokenType::Number)
    }

    fn identifier(&mut self) -> Token<'src> {
        while is_alpha(self.peek()) || is_digit(self.peek()) {
            self.current += 1;
        }
        let text = &self.source[self.start..self.current];
        let kind = keyword_kind(text).unwrap_or(TokenType::Identifier);
        self.make_token(kind)
    }

    fn make_token(&self, kind: TokenType) -> Token<'src> {
        Token {
            kind,
            lexeme: &self.source[self.start..self.current],
            line: self.line,
        }
    }

    /// Byte offset of the start of the token last produced by `scan_token`.
    /// Exposed only so tests can reconstruct the source from token spans.
    #[cfg(test)]
    fn token_start(&self) -> usize {
        self.start
    }

    #[cfg(test)]
    fn cursor(&self) -> usize {
        self.current
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token {
            kind: TokenType::Error,
            lexeme: message,
            line: self.line,
        }
    }
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenType> {
        let mut scanner = Scanner::new(src);
        let mut out = Vec::new();
        loop {
            let tok = scanner.scan_token();
            let done = tok.kind == TokenType::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_arithmetic_expression() {
        use TokenType::*;
        assert_eq!(
            kinds("1 + 2 * 3;"),
            vec![Number, Plus, Number, Star, Number, Semicolon, Eof]
        );
    }

    #[test]
    fn recognizes_keywords_not_identifiers() {
        use TokenType::*;
        assert_eq!(kinds("var x = nil;"), vec![Var, Identifier, Equal, Nil, Semicolon, Eof]);
    }

    #[test]
    fn unterminated_string_is_error_token() {
        let mut scanner = Scanner::new("\"abc");
        let tok = scanner.scan_token();
        assert_eq!(tok.kind, TokenType::Error);
        assert_eq!(tok.lexeme, "Unterminated string.");
    }

    #[test]
    fn string_may_span_multiple_lines() {
        let mut scanner = Scanner::new("\"a\nb\" 1");
        let tok = scanner.scan_token();
        assert_eq!(tok.kind, TokenType::String);
        let next = scanner.scan_token();
        assert_eq!(next.line, 2);
    }

    #[test]
    fn block_comment_tracks_newlines() {
        let mut scanner = Scanner::new("/* a\nb */ 1");
        let tok = scanner.scan_token();
        assert_eq!(tok.kind, TokenType::Number);
        assert_eq!(tok.line, 2);
    }

    #[test]
    fn eof_repeats_indefinitely() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.scan_token().kind, TokenType::Eof);
        assert_eq!(scanner.scan_token().kind, TokenType::Eof);
    }

    #[test]
    fn reconstructs_source_from_token_spans_and_skipped_gaps() {
        let src = "var x = 1; // comment\nprint x + \"hi\";";
        let mut scanner = Scanner::new(src);
        let mut reconstructed = String::new();
        let mut prev_end = 0usize;
        loop {
            let tok = scanner.scan_token();
            let start = scanner.token_start();
            reconstructed.push_str(&src[prev_end..start]);
            if tok.kind == TokenType::Eof {
                break;
            }
            reconstructed.push_str(tok.lexeme);
            prev_end = scanner.cursor();
        }
        assert_eq!(reconstructed, src);
    }
}
