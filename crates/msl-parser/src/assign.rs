//! Assignment builder (spec §4.6): single-target `Assign` and tuple-target
//! `Assigns`, selected by the statement dispatcher on the first character
//! of the LHS (`[` vs. a letter). The `=` position itself is always
//! pre-located with [`scanner::findend_expression`] / a direct bracket
//! lookahead by the caller; here we only re-confirm it with `debug_assert`.

use crate::error::ParseResult;
use crate::func;
use crate::lists;
use crate::node::{Node, NodeKind};
use crate::refs;
use crate::scanner;
use crate::Parser;

/// `letter = expr`. Lambda RHS (`@(params) expr`) is special-cased here
/// rather than in the expression builder, since `@` is not an
/// expression-starter (spec §4.3) and only ever appears as a simple
/// assignment's RHS.
pub fn create_assign(p: &mut Parser, lhs_start: usize) -> ParseResult<(Node, usize)> {
    let line = scanner::line_at(&p.buf, lhs_start);
    let (lhs, after_lhs) = refs::create_variable(p, lhs_start, true)?;
    let (eq_pos, _) = scanner::skip_ws_nl(&p.buf, after_lhs);
    debug_assert_eq!(p.buf.ch(eq_pos), '=');
    let (rhs_start, _) = scanner::skip_ws_nl(&p.buf, eq_pos + 1);

    let lhs_name = if lhs.kind == NodeKind::Var { lhs.name.clone() } else { None };

    let (rhs, end) = if p.buf.ch(rhs_start) == '@' {
        func::create_lambda(p, rhs_start, lhs_name.as_deref())?
    } else {
        crate::expr::create_expression(p, rhs_start, None)?
    };

    let mut node = Node::new(NodeKind::Assign, lhs_start as u32, line, p.buf.slice(lhs_start, end));
    node.push(lhs);
    node.push(rhs);
    Ok((node, end))
}

/// `[a, b, c] = expr`. A single-cell bracket list (`[x] = expr`) collapses
/// to a plain `Assign` rather than a one-element `Assigns` (spec §4.6).
pub fn create_assigns(p: &mut Parser, bracket_start: usize) -> ParseResult<(Node, usize)> {
    let line = scanner::line_at(&p.buf, bracket_start);
    let close = scanner::findend_matrix(&p.buf, bracket_start)?;
    let rows = lists::iterate_list(&p.buf, bracket_start)?;
    let cells: Vec<lists::Span> = rows.into_iter().flatten().filter(|&(s, e)| s != e).collect();

    let mut targets = Vec::with_capacity(cells.len());
    for &(s, _) in &cells {
        let (node, _) = refs::create_variable(p, s, true)?;
        targets.push(node);
    }

    let (eq_pos, _) = scanner::skip_ws_nl(&p.buf, close + 1);
    debug_assert_eq!(p.buf.ch(eq_pos), '=');
    let (rhs_start, _) = scanner::skip_ws_nl(&p.buf, eq_pos + 1);
    let (rhs, end) = crate::expr::create_expression(p, rhs_start, None)?;

    if targets.len() == 1 {
        let mut node = Node::new(NodeKind::Assign, bracket_start as u32, line, p.buf.slice(bracket_start, end));
        node.push(targets.into_iter().next().unwrap());
        node.push(rhs);
        return Ok((node, end));
    }

    let mut node = Node::new(NodeKind::Assigns, bracket_start as u32, line, p.buf.slice(bracket_start, end));
    node.children = targets;
    node.push(rhs);
    Ok((node, end))
}
