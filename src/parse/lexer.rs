use std::collections::VecDeque;
use std::error::Error;
use std::fmt::Display;
use std::iter::FusedIterator;

use serde::Serialize;

use crate::parse::scan::Scanner;
use crate::parse::token::{self, Token, TokenValue};
use crate::position::{HasSpan, Position, Span};

pub const FORM_FEED: u8 = 0x0c;

const TAB_WIDTH: usize = 8;

type ScanResult<'buf> = Result<TokenValue<'buf>, PosLexerError>;

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || !c.is_ascii()
}

fn is_ident_continuation(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || !c.is_ascii()
}

fn is_quote(c: u8) -> bool {
    c == b'\'' || c == b'"'
}

// r"..." / b'...' / rb"...": the prefix belongs to the string literal
fn is_string_prefix(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 2
        && name
            .bytes()
            .all(|c| matches!(c.to_ascii_lowercase(), b'r' | b'b' | b'u' | b'f'))
}

#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum LexerErrorKind {
    UnterminatedString,
    InconsistentDedent,
    UnrecognizedCharacter(char),
    InvalidUtf8,
}

impl Display for LexerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Self::UnrecognizedCharacter(c) = self {
            write!(f, "encountered an unrecognized character '")?;

            if c.is_ascii_graphic() {
                write!(f, "{}", c)?;
            } else {
                write!(f, "\\x{:02x}", *c as u32)?;
            }

            return write!(f, "'");
        }

        write!(
            f,
            "{}",
            match self {
                Self::UnterminatedString => "the string literal is not terminated",
                Self::InconsistentDedent => "unindent does not match an outer indentation level",
                Self::InvalidUtf8 => "the file is not valid utf-8",

                Self::UnrecognizedCharacter(_) => unreachable!(),
            }
        )
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct PosLexerError {
    end: Position,
    kind: LexerErrorKind,
}

impl PosLexerError {
    fn with_start(self, start: Position) -> LexerError {
        LexerError {
            span: Span {
                start,
                end: self.end,
            },
            kind: self.kind,
        }
    }
}

#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub struct LexerError {
    span: Span,
    kind: LexerErrorKind,
}

impl LexerError {
    pub fn kind(&self) -> LexerErrorKind {
        self.kind
    }

    /// An error for a buffer that failed utf-8 validation before lexing.
    pub fn invalid_utf8(buf: &[u8], valid_up_to: usize) -> Self {
        let prefix = &buf[..valid_up_to];
        let line_start = prefix
            .iter()
            .rposition(|&c| c == b'\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);

        let pos = Position {
            byte: valid_up_to,
            line: 1 + prefix.iter().filter(|&&c| c == b'\n').count(),
            col: valid_up_to - line_start + 1,
        };

        Self {
            span: Span {
                start: pos,
                end: pos,
            },
            kind: LexerErrorKind::InvalidUtf8,
        }
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tokenization failed: {}", self.kind)
    }
}

impl Error for LexerError {}

impl HasSpan for LexerError {
    fn span(&self) -> std::borrow::Cow<'_, Span> {
        std::borrow::Cow::Borrowed(&self.span)
    }
}

/// A tokenizer for Python source text.
///
/// Emits name, string, operator, and number tokens plus the `Indent`/`Dedent`
/// pair tracking block structure, followed by a final `Eof`. Comments and
/// newlines are consumed internally; indentation is ignored while inside
/// brackets. Any dedents still open at the end of input are flushed before
/// `Eof` so block scans always terminate.
#[derive(Debug, Clone)]
pub struct Lexer<'buf> {
    buf: &'buf str,
    scanner: Scanner<'buf>,
    indents: Vec<usize>,
    pending: VecDeque<Token<'buf>>,
    bracket_depth: usize,
    at_line_start: bool,
    eof: bool,
}

impl<'buf> Lexer<'buf> {
    pub fn new(buf: &'buf str) -> Self {
        Self {
            buf,
            scanner: Scanner::new(buf),
            indents: vec![0],
            pending: VecDeque::new(),
            bracket_depth: 0,
            at_line_start: true,
            eof: false,
        }
    }

    fn create_error_at_pos(&self, kind: LexerErrorKind) -> PosLexerError {
        PosLexerError {
            end: self.scanner.pos(),
            kind,
        }
    }

    fn point_span(&self) -> Span {
        let pos = self.scanner.pos();

        Span {
            start: pos,
            end: pos,
        }
    }

    fn push_structural(&mut self, value: TokenValue<'buf>) {
        let span = self.point_span();

        self.pending.push_back(Token {
            value,
            lexeme: "",
            span,
        });
    }

    /// Consumes the indentation of the next logical line, queueing `Indent`
    /// or `Dedent` tokens for the level change. Blank and comment-only lines
    /// do not affect the indentation stack.
    fn measure_indent(&mut self) -> Result<(), LexerError> {
        let width = loop {
            let mut width = 0;

            loop {
                match self.scanner.peek() {
                    Some(b' ') => {
                        self.scanner.next();
                        width += 1;
                    }

                    Some(b'\t') => {
                        self.scanner.next();
                        width = width - width % TAB_WIDTH + TAB_WIDTH;
                    }

                    Some(FORM_FEED) => {
                        self.scanner.next();
                        width = 0;
                    }

                    _ => break,
                }
            }

            match self.scanner.peek() {
                Some(b'#') => {
                    self.scanner.consume_while(|&c| c != b'\n');
                }

                Some(b'\r') | Some(b'\n') => {
                    self.scanner.next();
                }

                None => {
                    // the eof path flushes the remaining dedents
                    self.at_line_start = false;

                    return Ok(());
                }

                Some(_) => break width,
            }
        };

        let top = *self.indents.last().unwrap();

        if width > top {
            self.indents.push(width);
            self.push_structural(TokenValue::Indent);
        } else {
            while width < *self.indents.last().unwrap() {
                self.indents.pop();
                self.push_structural(TokenValue::Dedent);
            }

            if width != *self.indents.last().unwrap() {
                return Err(LexerError {
                    span: self.point_span(),
                    kind: LexerErrorKind::InconsistentDedent,
                });
            }
        }

        self.at_line_start = false;

        Ok(())
    }

    fn flush_at_eof(&mut self) {
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_structural(TokenValue::Dedent);
        }

        self.push_structural(TokenValue::Eof);
        self.eof = true;
    }

    fn scan_name(&mut self) -> ScanResult<'buf> {
        let name = self.scanner.consume_while(|&c| is_ident_continuation(c));

        if is_string_prefix(name) && matches!(self.scanner.peek(), Some(c) if is_quote(c)) {
            return self.scan_string();
        }

        Ok(TokenValue::Name(name))
    }

    fn scan_string(&mut self) -> ScanResult<'buf> {
        let quote = self.scanner.next().unwrap();
        let quote_str = if quote == b'"' { "\"\"" } else { "''" };
        let triple = self.scanner.consume_expecting(quote_str).is_some();

        let content_start = self.scanner.pos().byte;
        let content_end;

        if triple {
            let closing = if quote == b'"' { "\"\"\"" } else { "'''" };

            loop {
                if self.scanner.starts_with(closing) {
                    content_end = self.scanner.pos().byte;
                    self.scanner.consume_n(3);
                    break;
                }

                match self.scanner.next() {
                    Some(b'\\') => {
                        self.scanner.next();
                    }

                    Some(_) => {}

                    None => {
                        return Err(self.create_error_at_pos(LexerErrorKind::UnterminatedString))
                    }
                }
            }
        } else {
            loop {
                match self.scanner.peek() {
                    Some(c) if c == quote => {
                        content_end = self.scanner.pos().byte;
                        self.scanner.next();
                        break;
                    }

                    Some(b'\\') => {
                        self.scanner.next();
                        self.scanner.next();
                    }

                    Some(b'\n') | Some(b'\r') | None => {
                        return Err(self.create_error_at_pos(LexerErrorKind::UnterminatedString))
                    }

                    Some(_) => {
                        self.scanner.next();
                    }
                }
            }
        }

        Ok(TokenValue::Str {
            content: &self.buf[content_start..content_end],
            triple,
        })
    }

    fn scan_number(&mut self) -> TokenValue<'buf> {
        // loose: good enough for signature defaults, not a literal validator
        let num = self
            .scanner
            .consume_while(|&c| c.is_ascii_alphanumeric() || c == b'.' || c == b'_');

        TokenValue::Num(num)
    }

    fn scan_op(&mut self, c: u8) -> ScanResult<'buf> {
        if let Some(op) = token::scan_multi_op(self.scanner.remaining()) {
            self.scanner.consume_n(op.len());

            return Ok(TokenValue::Op(op));
        }

        if c.is_ascii_punctuation() {
            let op = self.scanner.consume_n(1);

            match c {
                b'(' | b'[' | b'{' => self.bracket_depth += 1,
                b')' | b']' | b'}' => self.bracket_depth = self.bracket_depth.saturating_sub(1),
                _ => {}
            }

            return Ok(TokenValue::Op(op));
        }

        Err(self.create_error_at_pos(LexerErrorKind::UnrecognizedCharacter(c as char)))
    }
}

impl<'buf> Iterator for Lexer<'buf> {
    type Item = Result<Token<'buf>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }

            if self.eof {
                return None;
            }

            if self.at_line_start && self.bracket_depth == 0 {
                if let Err(e) = self.measure_indent() {
                    self.eof = true;

                    return Some(Err(e));
                }

                continue;
            }

            let start = self.scanner.pos();

            let scan_result = match self.scanner.peek() {
                None => {
                    self.flush_at_eof();

                    continue;
                }

                Some(b' ') | Some(b'\t') | Some(FORM_FEED) => {
                    self.scanner.next();

                    continue;
                }

                Some(c @ (b'\r' | b'\n')) => {
                    self.scanner.next();

                    if c == b'\r' && self.scanner.peek() == Some(b'\n') {
                        self.scanner.next();
                    }

                    if self.bracket_depth == 0 {
                        self.at_line_start = true;
                    }

                    continue;
                }

                Some(b'\\') => {
                    self.scanner.next();

                    match self.scanner.next() {
                        // an explicit line continuation
                        Some(c @ (b'\r' | b'\n')) => {
                            if c == b'\r' && self.scanner.peek() == Some(b'\n') {
                                self.scanner.next();
                            }

                            continue;
                        }

                        _ => Err(self.create_error_at_pos(LexerErrorKind::UnrecognizedCharacter('\\'))),
                    }
                }

                Some(b'#') => {
                    self.scanner.consume_while(|&c| c != b'\n');

                    continue;
                }

                Some(c) if is_quote(c) => self.scan_string(),

                Some(c) if c.is_ascii_digit() => Ok(self.scan_number()),

                Some(b'.')
                    if matches!(
                        self.scanner.remaining().as_bytes().get(1),
                        Some(c) if c.is_ascii_digit()
                    ) =>
                {
                    Ok(self.scan_number())
                }

                Some(c) if is_ident_start(c) => self.scan_name(),

                Some(c) => self.scan_op(c),
            };

            return Some(match scan_result {
                Ok(value) => Ok(Token {
                    value,
                    lexeme: &self.buf[start.byte..self.scanner.pos().byte],
                    span: Span {
                        start,
                        end: self.scanner.prev_pos(),
                    },
                }),

                Err(err) => {
                    self.eof = true;

                    Err(err.with_start(start))
                }
            });
        }
    }
}

impl<'buf> FusedIterator for Lexer<'buf> {}
