//! Function and lambda builders (spec §4.11, §4.12).

use crate::error::ParseResult;
use crate::lists;
use crate::node::{Node, NodeKind, TypeTag};
use crate::refs;
use crate::scanner;
use crate::Parser;

/// `function [returns =] name [(params)]\n body end` (spec §4.11). Reads
/// `p.cur` (must point at the `f` of `function`) and leaves it just past
/// the closing `end`.
pub fn create_function(p: &mut Parser) -> ParseResult<Node> {
    let start = p.cur;
    let line = scanner::line_at(&p.buf, start);
    let mut cursor = start + "function".len();
    let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;
    p.line += lines;

    p.declares.push_scope();

    let mut returns: Vec<Node> = Vec::new();
    if p.buf.ch(cursor) == '[' {
        let close = scanner::findend_matrix(&p.buf, cursor)?;
        let rows = lists::iterate_list(&p.buf, cursor)?;
        for (s, e) in rows.into_iter().flatten() {
            if s == e {
                continue;
            }
            let (node, _) = refs::create_variable(p, s, false)?;
            returns.push(node);
        }
        cursor = close + 1;
        let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
        cursor = c;
        p.line += lines;
        debug_assert_eq!(p.buf.ch(cursor), '=');
        cursor += 1;
        let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
        cursor = c;
        p.line += lines;
    } else if scanner::is_letter(p.buf.ch(cursor)) {
        let save = cursor;
        let mut name_end = cursor;
        while scanner::is_ident_char(p.buf.ch(name_end)) {
            name_end += 1;
        }
        let (k, _) = scanner::skip_ws_nl(&p.buf, name_end);
        if p.buf.ch(k) == '=' && p.buf.ch(k + 1) != '=' {
            let (node, _) = refs::create_variable(p, cursor, false)?;
            returns.push(node);
            cursor = k + 1;
            let (c, lines) = scanner::skip_ws_nl(&p.buf, cursor);
            cursor = c;
            p.line += lines;
        } else {
            cursor = save;
        }
    }

    let name_start = cursor;
    let mut name_end = name_start;
    while scanner::is_ident_char(p.buf.ch(name_end)) {
        name_end += 1;
    }
    let fname = p.buf.slice(name_start, name_end).to_string();
    cursor = name_end;
    let (c, _) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;

    let mut params = Vec::new();
    if p.buf.ch(cursor) == '(' {
        let close = scanner::findend_paren(&p.buf, cursor)?;
        let rows = lists::iterate_list(&p.buf, cursor)?;
        for (s, e) in rows.into_iter().flatten() {
            if s == e {
                continue;
            }
            let (node, _) = refs::create_variable(p, s, false)?;
            params.push(node);
        }
        cursor = close + 1;
    }

    while !p.buf.at_eof(cursor) && p.buf.ch(cursor) != '\n' {
        cursor += 1;
    }
    if !p.buf.at_eof(cursor) {
        cursor += 1;
        p.line += 1;
    }

    p.cur = cursor;
    let block_start = cursor;
    let mut block = Node::new(NodeKind::Block, cursor as u32, p.line, "");
    let block_end = crate::stmt::fill_codeblock(p, &mut block)?;
    block.code = p.buf.slice(block_start, block_end).to_string();
    p.cur = block_end;

    let declared = p.declares.pop_scope();
    let mut declares_node = Node::new(NodeKind::Declares, start as u32, line, "");
    for n in &declared {
        declares_node.push(Node::new(NodeKind::Var, start as u32, line, n.clone()).with_name(n.clone()));
    }

    let mut returns_node = Node::new(NodeKind::Returns, start as u32, line, "");
    returns_node.children = returns;
    let mut params_node = Node::new(NodeKind::Params, start as u32, line, "");
    params_node.children = params;

    let mut func = Node::new(NodeKind::Func, start as u32, line, p.buf.slice(start, block_end)).with_name(fname);
    func.push(declares_node);
    func.push(returns_node);
    func.push(params_node);
    func.push(block);

    let backend = if func.children[1].children.len() <= 1 { "func_return" } else { "func_returns" };
    func.set_backend(backend);
    func.children[0].set_backend(backend);
    func.children[1].set_backend(backend);
    func.children[2].set_backend(backend);

    Ok(func)
}

/// `@(params) expr`, lifted into a synthetic top-level function (spec
/// §4.12). `lhs_name` is the LHS variable name when the lambda is the RHS
/// of a plain `Assign`, used for the generated function name.
pub fn create_lambda(p: &mut Parser, at: usize, lhs_name: Option<&str>) -> ParseResult<(Node, usize)> {
    let line = scanner::line_at(&p.buf, at);
    debug_assert_eq!(p.buf.ch(at), '@');
    let mut cursor = at + 1;
    let (c, _) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;
    debug_assert_eq!(p.buf.ch(cursor), '(');
    let close = scanner::findend_paren(&p.buf, cursor)?;
    let rows = lists::iterate_list(&p.buf, cursor)?;

    p.declares.push_scope();
    let mut params = Vec::new();
    for (s, e) in rows.into_iter().flatten() {
        if s == e {
            continue;
        }
        let (node, _) = refs::create_variable(p, s, false)?;
        params.push(node);
    }
    cursor = close + 1;
    let (c, _) = scanner::skip_ws_nl(&p.buf, cursor);
    cursor = c;

    let (body_expr, end) = crate::expr::create_expression(p, cursor, None)?;

    let seq = p.funcs.len() as u32;
    let gen_name = match lhs_name {
        Some(n) => format!("_{n}_{seq:03}"),
        None => format!("_lambda_{seq:03}"),
    };

    p.declares.declare("_retval");
    let declared = p.declares.pop_scope();

    let mut declares_node = Node::new(NodeKind::Declares, at as u32, line, "");
    for n in &declared {
        declares_node.push(Node::new(NodeKind::Var, at as u32, line, n.clone()).with_name(n.clone()));
    }
    let mut returns_node = Node::new(NodeKind::Returns, at as u32, line, "");
    returns_node.push(Node::new(NodeKind::Var, at as u32, line, "_retval").with_name("_retval"));
    let mut params_node = Node::new(NodeKind::Params, at as u32, line, "");
    params_node.children = params;

    let mut assign_retval = Node::new(NodeKind::Assign, at as u32, line, p.buf.slice(at, end));
    assign_retval.push(Node::new(NodeKind::Var, at as u32, line, "_retval").with_name("_retval"));
    assign_retval.push(body_expr);

    let mut block = Node::new(NodeKind::Block, at as u32, line, p.buf.slice(at, end));
    block.push(assign_retval);

    let mut func = Node::new(NodeKind::Func, at as u32, line, p.buf.slice(at, end)).with_name(gen_name.clone());
    func.push(declares_node);
    func.push(returns_node);
    func.push(params_node);
    func.push(block);
    func.set_backend("func_lambda");
    func.children[0].set_backend("func_lambda");
    func.children[1].set_backend("func_lambda");
    func.children[2].set_backend("func_lambda");

    p.funcs.push(func);

    let mut lambda_ref = Node::new(NodeKind::Lambda, at as u32, line, p.buf.slice(at, end))
        .with_name(gen_name)
        .with_type(TypeTag::Unknown);
    p.declares.declare(lambda_ref.name.clone().unwrap().as_str());
    lambda_ref.set_attr("backend", "func_lambda");
    Ok((lambda_ref, end))
}
