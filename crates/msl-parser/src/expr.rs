//! The expression builder (spec §4.3): precedence climbing over a fixed
//! operator ladder, unary prefixes, postfix transpose, and leaf dispatch
//! for literals, parens, matrices, and variable references.
//!
//! The ladder-splitting approach (find the lowest-precedence top-level
//! operator, split on every occurrence, recurse with a tighter floor) is
//! quadratic in expression length. A Pratt parser would be linear; this
//! repo keeps the ladder because it is what the reference grammar in
//! `SPEC_FULL.md` §4.3.2 specifies operator-by-operator, and expressions
//! in this language are short (matrix entries, loop bounds, RHS terms).

use crate::buffer::Buffer;
use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::matrix;
use crate::node::{Node, NodeKind};
use crate::refs;
use crate::scanner;
use crate::Parser;

/// Lowest to highest precedence (spec §4.3.2).
const LADDER: &[(&str, NodeKind)] = &[
    ("||", NodeKind::Lor),
    ("&&", NodeKind::Land),
    ("|", NodeKind::Bor),
    ("&", NodeKind::Band),
    ("~=", NodeKind::Ne),
    ("==", NodeKind::Eq),
    (">=", NodeKind::Ge),
    (">", NodeKind::Gt),
    ("<=", NodeKind::Le),
    ("<", NodeKind::Lt),
    (":", NodeKind::Colon),
    ("+", NodeKind::Plus),
    ("-", NodeKind::Minus),
    (".*", NodeKind::Elmul),
    ("*", NodeKind::Mul),
    ("./", NodeKind::Elrdiv),
    ("/", NodeKind::Rdiv),
    (".\\", NodeKind::Elldiv),
    ("\\", NodeKind::Ldiv),
    (".^", NodeKind::Elexp),
    ("^", NodeKind::Exp),
];

fn trim_span(buf: &Buffer, mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && matches!(buf.ch(start), ' ' | '\t' | '\r' | '\n') {
        start += 1;
    }
    while end > start && matches!(buf.ch(end - 1), ' ' | '\t' | '\r' | '\n') {
        end -= 1;
    }
    (start, end)
}

/// Whether `buf[i..]` starting with `+`/`-` is a binary occurrence: the
/// preceding non-space character is an operand, and it is not the exponent
/// sign of a numeric literal (spec §4.3.2 bullets 2-3).
fn is_binary_sign(buf: &Buffer, i: usize) -> bool {
    if i == 0 {
        return false;
    }
    if matches!(buf.ch(i - 1), 'd' | 'D' | 'e' | 'E') && buf.ch(i + 1).is_ascii_digit() {
        return false;
    }
    let mut j = i;
    while j > 0 && matches!(buf.ch(j - 1), ' ' | '\t') {
        j -= 1;
    }
    if j == 0 {
        return false;
    }
    let prev = buf.ch(j - 1);
    prev.is_ascii_alphanumeric() || prev == '_' || matches!(prev, ')' | ']' | '}')
}

/// Find every top-level occurrence of `op` in `[start, end)`, skipping
/// nested parens/matrices/strings/continuations the same way
/// `findend_expression` does.
fn find_splits(buf: &Buffer, start: usize, end: usize, op: &str) -> ParseResult<Vec<usize>> {
    let mut points = Vec::new();
    let mut i = start;
    while i < end {
        match buf.ch(i) {
            '(' => {
                i = scanner::findend_paren(buf, i)? + 1;
                continue;
            }
            '[' => {
                i = scanner::findend_matrix(buf, i)? + 1;
                continue;
            }
            '\'' if scanner::follows_operand(buf, i) => {
                i += 1;
                continue;
            }
            '\'' => {
                i = scanner::findend_string(buf, i)? + 1;
                continue;
            }
            _ if buf.starts_with(i, "...") => {
                i = scanner::findend_dots(buf, i)? + 1;
                continue;
            }
            _ => {}
        }
        if buf.starts_with(i, op) {
            if op == "+" || op == "-" {
                if is_binary_sign(buf, i) {
                    points.push(i);
                }
                i += 1;
            } else {
                points.push(i);
                i += op.len();
            }
            continue;
        }
        i += 1;
    }
    Ok(points)
}

/// `create_expression(start, end?)`: if `end` is omitted, it is located
/// with [`scanner::findend_expression`].
pub fn create_expression(p: &mut Parser, start: usize, end: Option<usize>) -> ParseResult<(Node, usize)> {
    let end = match end {
        Some(e) => e,
        None => scanner::findend_expression(&p.buf, start)?,
    };
    let (_, end) = trim_span(&p.buf, start, end);
    create_expression_inner(p, start, end, 0)
}

fn create_expression_inner(p: &mut Parser, start: usize, end: usize, min_op: usize) -> ParseResult<(Node, usize)> {
    let line = scanner::line_at(&p.buf, start);

    if p.buf.ch(start) == ':' {
        let node = Node::new(NodeKind::All, start as u32, line, p.buf.slice(start, start + 1));
        return Ok((node, start + 1));
    }

    let (start, end) = trim_span(&p.buf, start, end);
    if start >= end {
        return Err(ParseError::at(ParseErrorKind::UnexpectedCharacter(p.buf.ch(start)), start as u32, line));
    }

    for idx in min_op..LADDER.len() {
        let (op, kind) = LADDER[idx];
        if !p.buf.slice(start, end).contains(op) {
            continue;
        }
        let splits = find_splits(&p.buf, start, end, op)?;
        if splits.is_empty() {
            continue;
        }
        let mut children = Vec::with_capacity(splits.len() + 1);
        let mut seg_start = start;
        for &sp in &splits {
            let (s, e) = trim_span(&p.buf, seg_start, sp);
            let (child, _) = create_expression_inner(p, s, e, idx + 1)?;
            children.push(child);
            seg_start = sp + op.len();
        }
        let (s, e) = trim_span(&p.buf, seg_start, end);
        let (child, _) = create_expression_inner(p, s, e, idx + 1)?;
        children.push(child);

        let mut node = Node::new(kind, start as u32, line, p.buf.slice(start, end));
        node.children = children;
        return Ok((node, end));
    }

    // Single term: unary prefixes, postfix transpose, then leaf dispatch.
    let mut cur = start;
    let mut prefixes: Vec<(NodeKind, usize)> = Vec::new();
    loop {
        match p.buf.ch(cur) {
            '-' => prefixes.push((NodeKind::Neg, cur)),
            '~' => prefixes.push((NodeKind::Not, cur)),
            _ => break,
        }
        cur += 1;
        let (after, _) = scanner::skip_ws_nl(&p.buf, cur);
        cur = after;
    }

    let mut term_end = end;
    let mut postfix = None;
    if term_end > cur && p.buf.ch(term_end - 1) == '\'' {
        if term_end - 1 > cur && p.buf.ch(term_end - 2) == '.' {
            postfix = Some(NodeKind::Transpose);
            term_end -= 2;
        } else {
            postfix = Some(NodeKind::Ctranspose);
            term_end -= 1;
        }
        while term_end > cur && matches!(p.buf.ch(term_end - 1), ' ' | '\t') {
            term_end -= 1;
        }
    }

    let mut node = dispatch_term(p, cur, term_end)?;

    if let Some(pk) = postfix {
        let mut wrapped = Node::new(pk, node.cur, node.line, p.buf.slice(node.cur as usize, end));
        wrapped.push(node);
        node = wrapped;
    }
    for (pk, pstart) in prefixes.into_iter().rev() {
        let mut wrapped = Node::new(pk, pstart as u32, scanner::line_at(&p.buf, pstart), p.buf.slice(pstart, end));
        wrapped.push(node);
        node = wrapped;
    }

    Ok((node, end))
}

/// Term dispatch (spec §4.3.6) over the trimmed span `[start, end)` left
/// after stripping unary prefixes and postfix transpose.
fn dispatch_term(p: &mut Parser, start: usize, end: usize) -> ParseResult<Node> {
    let line = scanner::line_at(&p.buf, start);
    if start >= end {
        return Err(ParseError::at(ParseErrorKind::UnexpectedCharacter(p.buf.ch(start)), start as u32, line));
    }
    let c = p.buf.ch(start);

    if c == '(' {
        let close = scanner::findend_paren(&p.buf, start)?;
        let (inner, _) = create_expression_inner(p, start + 1, close, 0)?;
        let mut node = Node::new(NodeKind::Paren, start as u32, line, p.buf.slice(start, end));
        node.push(inner);
        return Ok(node);
    }

    let slice = p.buf.slice(start, end);
    if slice == "end" {
        return Ok(Node::new(NodeKind::End, start as u32, line, slice));
    }
    if slice == "return" {
        return Ok(Node::new(NodeKind::Return, start as u32, line, slice));
    }
    if slice == "break" {
        return Ok(Node::new(NodeKind::Break, start as u32, line, slice));
    }

    let starts_number = scanner::is_digit(c) || (c == '.' && p.buf.ch(start + 1).is_ascii_digit());
    if starts_number {
        return Ok(lex_number(p, start, end));
    }

    if c == '[' {
        let (node, _) = matrix::create_matrix(p, start)?;
        return Ok(node);
    }

    if c == '{' {
        return Err(ParseError::at(ParseErrorKind::NotImplemented("cell literal"), start as u32, line));
    }

    if c == '\'' && end > start + 1 && p.buf.ch(end - 1) == '\'' {
        return Ok(Node::new(NodeKind::String, start as u32, line, p.buf.slice(start, end))
            .with_name(p.buf.slice(start + 1, end - 1).to_string()));
    }

    if scanner::is_letter(c) {
        let (node, _) = refs::create_variable(p, start, false)?;
        return Ok(node);
    }

    Err(ParseError::at(ParseErrorKind::UnexpectedCharacter(c), start as u32, line))
}

fn lex_number(p: &Parser, start: usize, end: usize) -> Node {
    let line = scanner::line_at(&p.buf, start);
    let mut i = start;
    if p.buf.ch(i) != '.' {
        while i < end && scanner::is_digit(p.buf.ch(i)) {
            i += 1;
        }
    }
    let mut has_frac = false;
    if i < end && p.buf.ch(i) == '.' && scanner::is_digit(p.buf.ch(i + 1)) {
        has_frac = true;
        i += 1;
        while i < end && scanner::is_digit(p.buf.ch(i)) {
            i += 1;
        }
    }
    let mut has_exp = false;
    if i < end && matches!(p.buf.ch(i), 'e' | 'E' | 'd' | 'D') {
        let mut j = i + 1;
        if matches!(p.buf.ch(j), '+' | '-') {
            j += 1;
        }
        if scanner::is_digit(p.buf.ch(j)) {
            has_exp = true;
            i = j;
            while i < end && scanner::is_digit(p.buf.ch(i)) {
                i += 1;
            }
        }
    }
    let mut has_imag = false;
    if i < end && matches!(p.buf.ch(i), 'i' | 'j') {
        has_imag = true;
        i += 1;
    }
    let _ = i;

    let kind = match (has_frac || has_exp, has_imag) {
        (false, false) => NodeKind::Int,
        (true, false) => NodeKind::Float,
        (false, true) => NodeKind::Iint,
        (true, true) => NodeKind::Ifloat,
    };

    let code = p.buf.slice(start, end);
    let mut node = Node::new(kind, start as u32, line, code);
    let normalized: String = code.chars().map(|c| if matches!(c, 'E' | 'D' | 'd') { 'e' } else { c }).collect();
    node.set_attr("value", normalized);
    node
}
