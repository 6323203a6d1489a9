//! Scanner primitives (spec §4.1): locate the balanced end of a string,
//! comment, parenthesized group, matrix, line continuation, or bare
//! expression, starting from a character already known to open one of
//! those constructs.
//!
//! All of them return the offset of the **last** character belonging to
//! the construct (inclusive), and all of them assume well-formed input --
//! a violation is a fatal [`ParseError`], never a best-effort guess (spec
//! §7). This module plays the role the teacher splits into a separate
//! `mesh-lexer` crate (`snow-lexer/src/cursor.rs`'s byte-cursor), folded
//! in here because the language has no context-free token stream to hand
//! off: whether `'` opens a string or closes a transpose, for instance,
//! depends on the character immediately to its left, which only the
//! parser's own position in the grammar can resolve.

use crate::buffer::Buffer;
use crate::error::{ParseError, ParseErrorKind};

pub fn line_at(buf: &Buffer, upto: usize) -> u32 {
    buf.slice(0, upto.min(buf.source_len())).matches('\n').count() as u32
}

fn err_unterminated(buf: &Buffer, start: usize, what: &'static str) -> ParseError {
    ParseError::at(ParseErrorKind::UnterminatedConstruct(what), start as u32, line_at(buf, start))
}

fn err_forbidden(buf: &Buffer, at: usize, what: &'static str) -> ParseError {
    ParseError::at(ParseErrorKind::ForbiddenNesting(what), at as u32, line_at(buf, at))
}

pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether an expression terminates at `c` (spec §4.1 `findend_expression`).
pub fn is_expr_terminator(c: char) -> bool {
    matches!(c, '%' | ']' | ')' | '}' | ',' | ';' | '\n')
}

/// Skip spaces and tabs only; newlines are never absorbed here because
/// their significance is context-dependent (statement separator inside a
/// block, row separator inside a matrix, insignificant inside a paren
/// group -- each caller decides).
pub fn skip_inline_ws(buf: &Buffer, mut i: usize) -> usize {
    while matches!(buf.ch(i), ' ' | '\t') {
        i += 1;
    }
    i
}

/// Skip spaces, tabs, and newlines, returning the new position and the
/// number of newlines skipped (so callers can advance their line counter).
///
/// Stops as soon as `buf.at_eof(i)` holds, *before* indexing `buf.ch(i)`:
/// the padding (`buffer.rs`'s `PADDING`) is itself all whitespace, so a
/// leading-whitespace run that reaches the true end of the padded buffer
/// must not walk past the two characters of EOF slack every scanner relies
/// on, or the next `buf.ch` call indexes past the buffer's end.
pub fn skip_ws_nl(buf: &Buffer, mut i: usize) -> (usize, u32) {
    let mut lines = 0;
    loop {
        if buf.at_eof(i) {
            break;
        }
        match buf.ch(i) {
            ' ' | '\t' | '\r' => i += 1,
            '\n' => {
                i += 1;
                lines += 1;
            }
            _ => break,
        }
    }
    (i, lines)
}

/// Whether the non-space character preceding `at` makes a `'`/`+`/`-` at
/// `at` a postfix/binary operator rather than a string delimiter/unary
/// prefix (spec §4.3.2 bullet 2 and 3; also used by `findend_paren` for
/// the apostrophe rule per spec §9's open question -- this repo resolves
/// that ambiguity by reusing the same rule everywhere).
pub fn follows_operand(buf: &Buffer, at: usize) -> bool {
    if at == 0 {
        return false;
    }
    let mut j = at;
    while j > 0 && matches!(buf.ch(j - 1), ' ' | '\t') {
        j -= 1;
    }
    if j == 0 {
        return false;
    }
    let prev = buf.ch(j - 1);
    prev.is_ascii_alphanumeric() || prev == '_' || matches!(prev, ')' | ']' | '}')
}

/// `findend_string` -- `A[s] == '\''`.
pub fn findend_string(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    debug_assert_eq!(buf.ch(s), '\'');
    let mut i = s + 1;
    loop {
        if buf.at_eof(i) {
            return Err(err_unterminated(buf, s, "string literal"));
        }
        match buf.ch(i) {
            '\n' => return Err(err_forbidden(buf, i, "newline inside string literal")),
            '\\' if buf.ch(i + 1) == '\'' => i += 2,
            '\'' => return Ok(i),
            _ => i += 1,
        }
    }
}

/// `findend_comment` -- `A[s] == '%'`. A block comment (`%{ ... %}`)
/// returns the index of the closing `}`, inclusive, like every other
/// `findend_*`. A line comment returns the index of the *next* `\n`
/// itself (spec §4.1), not the last character of the comment's own text --
/// every call site already does `+1` to land just past it either way.
pub fn findend_comment(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    debug_assert_eq!(buf.ch(s), '%');
    if buf.ch(s + 1) == '{' {
        let mut i = s + 2;
        loop {
            if buf.at_eof(i) {
                return Err(err_unterminated(buf, s, "block comment"));
            }
            if buf.ch(i) == '%' && buf.ch(i + 1) == '}' {
                return Ok(i + 1);
            }
            i += 1;
        }
    } else {
        let mut i = s + 1;
        while !buf.at_eof(i) && buf.ch(i) != '\n' {
            i += 1;
        }
        Ok(i)
    }
}

/// `findend_paren` -- `A[s] == '('`.
pub fn findend_paren(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    debug_assert_eq!(buf.ch(s), '(');
    let mut depth: i32 = 0;
    let mut i = s;
    loop {
        if buf.at_eof(i) {
            return Err(err_unterminated(buf, s, "parenthesized group"));
        }
        match buf.ch(i) {
            '(' => {
                depth += 1;
                i += 1;
            }
            ')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(i - 1);
                }
            }
            '\'' if follows_operand(buf, i) => i += 1, // transpose postfix, not a string
            '\'' => i = findend_string(buf, i)? + 1,
            '%' => return Err(err_forbidden(buf, i, "comment inside parenthesized group")),
            _ => i += 1,
        }
    }
}

/// `findend_matrix` -- `A[s] == '['`. Does not descend into parens; nested
/// parens balance naturally by character counting at the matrix level.
pub fn findend_matrix(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    debug_assert_eq!(buf.ch(s), '[');
    let mut depth: i32 = 0;
    let mut i = s;
    loop {
        if buf.at_eof(i) {
            return Err(err_unterminated(buf, s, "matrix literal"));
        }
        match buf.ch(i) {
            '[' => {
                depth += 1;
                i += 1;
            }
            ']' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(i - 1);
                }
            }
            '\'' if follows_operand(buf, i) => i += 1,
            '\'' => i = findend_string(buf, i)? + 1,
            '%' => i = findend_comment(buf, i)? + 1,
            _ => i += 1,
        }
    }
}

/// `findend_brace` -- `A[s] == '{'`. Balance braces the same way
/// `findend_paren` balances parens; used for chained `Cget`/`Cset` subscript
/// groups (`a{i}{j}`), not for the unimplemented bare cell literal.
pub fn findend_brace(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    debug_assert_eq!(buf.ch(s), '{');
    let mut depth: i32 = 0;
    let mut i = s;
    loop {
        if buf.at_eof(i) {
            return Err(err_unterminated(buf, s, "cell index group"));
        }
        match buf.ch(i) {
            '{' => {
                depth += 1;
                i += 1;
            }
            '}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(i - 1);
                }
            }
            '\'' if follows_operand(buf, i) => i += 1,
            '\'' => i = findend_string(buf, i)? + 1,
            '%' => return Err(err_forbidden(buf, i, "comment inside cell index group")),
            _ => i += 1,
        }
    }
}

/// `findend_dots` -- `A[s..s+3] == "..."`. Returns the offset of the next
/// newline; the caller resumes scanning past it, effectively splicing the
/// two physical lines into one logical line.
pub fn findend_dots(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    debug_assert!(buf.starts_with(s, "..."));
    let mut i = s + 3;
    while !buf.at_eof(i) && buf.ch(i) != '\n' {
        i += 1;
    }
    if buf.at_eof(i) {
        return Err(err_unterminated(buf, s, "line continuation"));
    }
    Ok(i)
}

/// `findend_expression` -- scan forward across nested parens/matrices/
/// strings/continuations, skipping `==`, and return the first offset whose
/// character is an expression terminator or a bare `=`.
pub fn findend_expression(buf: &Buffer, s: usize) -> Result<usize, ParseError> {
    let mut i = s;
    loop {
        if buf.at_eof(i) {
            return Err(err_unterminated(buf, s, "expression"));
        }
        let c = buf.ch(i);
        if c == '=' {
            if buf.ch(i + 1) == '=' {
                i += 2;
                continue;
            }
            return Ok(i);
        }
        if is_expr_terminator(c) {
            return Ok(i);
        }
        match c {
            '(' => i = findend_paren(buf, i)? + 1,
            '[' => i = findend_matrix(buf, i)? + 1,
            '\'' if follows_operand(buf, i) => i += 1,
            '\'' => i = findend_string(buf, i)? + 1,
            _ if buf.starts_with(i, "...") => i = findend_dots(buf, i)? + 1,
            _ => i += 1,
        }
    }
}
