//! Variable / reference builder (spec §4.5 for reads, §4.7 for write
//! targets). Both sides share the same identifier-plus-shape analysis; the
//! `write` flag only changes which node kind is produced for each shape
//! (`Get`/`Set`, `Cget`/`Cset`, `Nget`/`Nset`, `Fget`/`Fset`), since `Var`
//! and `Fvar` are spelled the same on both sides.

use crate::buffer::Buffer;
use crate::error::ParseResult;
use crate::lists;
use crate::node::{Node, NodeKind};
use crate::scanner;
use crate::Parser;

fn scan_ident_end(buf: &Buffer, start: usize) -> usize {
    let mut i = start;
    while scanner::is_ident_char(buf.ch(i)) {
        i += 1;
    }
    i
}

/// Parse a call/index argument list `(...)`, returning the parsed
/// expression nodes and the index of the matching close paren.
pub fn create_list(p: &mut Parser, open: usize) -> ParseResult<(Vec<Node>, usize)> {
    let (_, close) = lists::delimiter_bounds(&p.buf, open)?;
    let rows = lists::iterate_list(&p.buf, open)?;
    let mut nodes = Vec::new();
    for row in rows {
        for (s, e) in row {
            if s == e {
                continue;
            }
            let (node, _) = crate::expr::create_expression(p, s, Some(e))?;
            nodes.push(node);
        }
    }
    Ok((nodes, close))
}

fn build_cell_chain(p: &mut Parser, start: usize, line: u32, name: &str, first_brace: usize, write: bool) -> ParseResult<(Node, usize)> {
    let kind = if write { NodeKind::Cset } else { NodeKind::Cget };
    let mut node = Node::new(kind, start as u32, line, "").with_name(name.to_string());
    let mut cursor = first_brace;
    loop {
        if p.buf.ch(cursor) != '{' {
            break;
        }
        let close = scanner::findend_brace(&p.buf, cursor)?;
        let (inner, _) = crate::expr::create_expression(p, cursor + 1, Some(close))?;
        node.push(inner);
        cursor = close + 1;
        let (k, _) = scanner::skip_ws_nl(&p.buf, cursor);
        if p.buf.ch(k) == '{' {
            cursor = k;
        } else {
            break;
        }
    }
    node.code = p.buf.slice(start, cursor).to_string();
    Ok((node, cursor))
}

/// Parse a variable-like reference starting at `start` (`A[start]` must be
/// a letter). `write` selects the LHS write-variant node kinds.
pub fn create_variable(p: &mut Parser, start: usize, write: bool) -> ParseResult<(Node, usize)> {
    let line = scanner::line_at(&p.buf, start);
    let name_end = scan_ident_end(&p.buf, start);
    let name = p.buf.slice(start, name_end).to_string();
    p.declares.declare(&name);
    let (k, _) = scanner::skip_ws_nl(&p.buf, name_end);

    if p.buf.ch(k) == '{' {
        return build_cell_chain(p, start, line, &name, k, write);
    }

    if p.buf.ch(k) == '(' {
        let (args, close) = create_list(p, k)?;
        let kind = if write { NodeKind::Set } else { NodeKind::Get };
        let mut node = Node::new(kind, start as u32, line, p.buf.slice(start, close + 1)).with_name(name);
        node.children = args;
        return Ok((node, close + 1));
    }

    if p.buf.ch(k) == '.' && p.buf.ch(k + 1) == '(' {
        let open = k + 1;
        let close = scanner::findend_paren(&p.buf, open)?;
        let (inner, _) = crate::expr::create_expression(p, open + 1, Some(close))?;
        let kind = if write { NodeKind::Nset } else { NodeKind::Nget };
        let mut node = Node::new(kind, start as u32, line, p.buf.slice(start, close + 1)).with_name(name);
        node.push(inner);
        return Ok((node, close + 1));
    }

    if p.buf.ch(k) == '.' && scanner::is_letter(p.buf.ch(k + 1)) {
        let field_start = k + 1;
        let field_end = scan_ident_end(&p.buf, field_start);
        let field = p.buf.slice(field_start, field_end).to_string();
        let (k2, _) = scanner::skip_ws_nl(&p.buf, field_end);
        if p.buf.ch(k2) == '(' {
            let close = scanner::findend_paren(&p.buf, k2)?;
            let (inner, _) = crate::expr::create_expression(p, k2 + 1, Some(close))?;
            let kind = if write { NodeKind::Fset } else { NodeKind::Fget };
            let mut node = Node::new(kind, start as u32, line, p.buf.slice(start, close + 1))
                .with_name(name)
                .with_sname(field);
            node.push(inner);
            return Ok((node, close + 1));
        }
        let node = Node::new(NodeKind::Fvar, start as u32, line, p.buf.slice(start, field_end))
            .with_name(name)
            .with_sname(field);
        return Ok((node, field_end));
    }

    let node = Node::new(NodeKind::Var, start as u32, line, p.buf.slice(start, name_end)).with_name(name);
    Ok((node, name_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_variable() {
        let mut p = Parser::for_test("abc");
        let (node, end) = create_variable(&mut p, 0, false).unwrap();
        assert_eq!(node.kind, NodeKind::Var);
        assert_eq!(node.name.as_deref(), Some("abc"));
        assert_eq!(end, 3);
    }

    #[test]
    fn get_subscript() {
        let mut p = Parser::for_test("a(1, 2)");
        let (node, end) = create_variable(&mut p, 0, false).unwrap();
        assert_eq!(node.kind, NodeKind::Get);
        assert_eq!(node.children.len(), 2);
        assert_eq!(end, 7);
    }

    #[test]
    fn set_subscript_write() {
        let mut p = Parser::for_test("a(1) = 5");
        let (node, _) = create_variable(&mut p, 0, true).unwrap();
        assert_eq!(node.kind, NodeKind::Set);
    }

    #[test]
    fn cget_chained_braces() {
        let mut p = Parser::for_test("a{1}{2}");
        let (node, end) = create_variable(&mut p, 0, false).unwrap();
        assert_eq!(node.kind, NodeKind::Cget);
        assert_eq!(node.children.len(), 2);
        assert_eq!(end, 7);
    }

    #[test]
    fn static_field_read() {
        let mut p = Parser::for_test("a.b");
        let (node, _) = create_variable(&mut p, 0, false).unwrap();
        assert_eq!(node.kind, NodeKind::Fvar);
        assert_eq!(node.name.as_deref(), Some("a"));
        assert_eq!(node.sname.as_deref(), Some("b"));
    }

    #[test]
    fn field_call_is_fget() {
        let mut p = Parser::for_test("a.b(1)");
        let (node, _) = create_variable(&mut p, 0, false).unwrap();
        assert_eq!(node.kind, NodeKind::Fget);
    }

    #[test]
    fn dynamic_field_is_nget() {
        let mut p = Parser::for_test("a.(1)");
        let (node, _) = create_variable(&mut p, 0, false).unwrap();
        assert_eq!(node.kind, NodeKind::Nget);
    }
}
