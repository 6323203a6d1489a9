//! Parse error types.
//!
//! The parser is deliberately assertive (spec §7): the first inconsistency
//! between what the dispatcher expects and what the buffer actually holds
//! is fatal. There is no multi-error collection and no recovery -- a
//! `ParseError` is propagated with `?` all the way out of [`crate::parse`].

use std::fmt;

use msl_common::Span;

/// What kind of assertion failed.
///
/// Matches the taxonomy in spec §7 exactly: every parser-detected failure
/// is one of these four shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The statement/term dispatcher found a character it cannot classify.
    UnexpectedCharacter(char),
    /// A `findend_*` scan reached the sentinel padding without closing.
    UnterminatedConstruct(&'static str),
    /// A construct was nested somewhere it cannot legally appear (newline in
    /// a string, comment inside a paren group, ...).
    ForbiddenNesting(&'static str),
    /// A recognized-but-unimplemented language feature (`while`, `switch`,
    /// `try`, bare cell literals -- spec §7/§9).
    NotImplemented(&'static str),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedConstruct(what) => write!(f, "unterminated {what}"),
            Self::ForbiddenNesting(what) => write!(f, "forbidden nesting: {what}"),
            Self::NotImplemented(what) => write!(f, "not implemented: {what}"),
        }
    }
}

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// 0-based line of `span.start`, threaded through from the parser's own
    /// line counter rather than recomputed, since the parser always knows
    /// it at the point of failure.
    pub line: u32,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, line: u32) -> Self {
        Self { kind, span, line }
    }

    pub fn at(kind: ParseErrorKind, cur: u32, line: u32) -> Self {
        Self::new(kind, Span::point(cur), line)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line + 1)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
