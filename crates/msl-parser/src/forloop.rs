//! `for` builder (spec §4.9): `for [(] var [=] expr [,|;|\n]? body end`.

use crate::error::ParseResult;
use crate::node::{Node, NodeKind};
use crate::refs;
use crate::scanner;
use crate::Parser;

pub fn create_for(p: &mut Parser) -> ParseResult<Node> {
    let start = p.cur;
    let line = p.line;
    let mut cursor = start + 3; // "for"
    let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;
    p.line += lines;

    if p.buf.ch(cursor) == '(' {
        cursor += 1;
        let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
        cursor = c;
        p.line += lines;
    }

    let (var_node, after_var) = refs::create_variable(p, cursor, false)?;
    cursor = after_var;
    let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;
    p.line += lines;
    debug_assert_eq!(p.buf.ch(cursor), '=');
    cursor += 1;
    let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;
    p.line += lines;

    let (range_expr, after_range) = crate::expr::create_expression(p, cursor, None)?;
    cursor = after_range;

    if p.buf.ch(cursor) == ')' {
        cursor += 1;
    }
    while matches!(p.buf.ch(cursor), ' ' | '\t' | ',' | ';' | '\n') {
        if p.buf.ch(cursor) == '\n' {
            p.line += 1;
        }
        cursor += 1;
    }

    p.cur = cursor;
    let block_start = cursor;
    let mut block = Node::new(NodeKind::Block, cursor as u32, p.line, "");
    let block_end = crate::stmt::fill_codeblock(p, &mut block)?;
    block.code = p.buf.slice(block_start, block_end).to_string();
    p.cur = block_end;

    let mut node = Node::new(NodeKind::For, start as u32, line, p.buf.slice(start, block_end));
    node.push(var_node);
    node.push(range_expr);
    node.push(block);
    Ok(node)
}
