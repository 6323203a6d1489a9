//! Statement dispatch (spec §4.8): given a cursor anchored at the start of
//! a block's body, repeatedly classify the first meaningful character and
//! delegate to the matching builder, until a block terminator, `function`
//! boundary, or end of buffer is reached.

use crate::assign;
use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::forloop;
use crate::node::{Node, NodeKind};
use crate::scanner;
use crate::Parser;

fn is_expr_starter(c: char) -> bool {
    scanner::is_letter(c) || scanner::is_digit(c) || matches!(c, '[' | '(' | '~' | '-' | '+' | ':' | '\'')
}

fn wrap_statement(p: &Parser, start: usize, line: u32, end: usize, expr: Node) -> Node {
    let mut stmt = Node::new(NodeKind::Statement, start as u32, line, p.buf.slice(start, end));
    stmt.push(expr);
    stmt
}

/// Runs until a block terminator (`end`) is consumed, or until a
/// `function` keyword boundary or end of buffer is reached without
/// consuming it -- spec §4.8 states the `end`-terminator rule
/// unconditionally, with no top-level carve-out, so the same loop serves
/// both a function/lambda/for body and the top-level program loop
/// (`lib.rs`'s `parse`, which re-enters this function once per top-level
/// chunk between `function` definitions). Returns the cursor position
/// after the block (past `end`, or at the `function`/EOF boundary).
pub fn fill_codeblock(p: &mut Parser, block: &mut Node) -> ParseResult<usize> {
    loop {
        let (c, lines) = scanner::skip_ws_nl(&p.buf, p.cur);
        p.cur = c;
        p.line += lines;

        if p.buf.ch(p.cur) == ';' {
            p.cur += 1;
            continue;
        }

        if p.buf.at_eof(p.cur) {
            return Ok(p.cur);
        }

        if p.buf.ch(p.cur) == '%' {
            let close = scanner::findend_comment(&p.buf, p.cur)?;
            // A line comment's `close` is the terminating `\n` itself, which
            // is not part of the comment's own text; a block comment's
            // `close` is its closing `}`, which is.
            let is_line_comment = p.buf.ch(close) == '\n';
            let code_end = if is_line_comment { close } else { close + 1 };
            let node = Node::new(NodeKind::Comment, p.cur as u32, p.line, p.buf.slice(p.cur, code_end));
            block.push(node);
            if is_line_comment {
                p.line += 1;
            }
            p.cur = close + 1;
            continue;
        }

        if p.buf.starts_with(p.cur, "function") && matches!(p.buf.ch(p.cur + 8), ' ' | '(') {
            return Ok(p.cur);
        }

        if p.buf.starts_with(p.cur, "end") && matches!(p.buf.ch(p.cur + 3), ' ' | ';' | '\n') {
            return Ok(p.cur + 3);
        }

        if p.buf.starts_with(p.cur, "for") && matches!(p.buf.ch(p.cur + 3), ' ' | '(') {
            let node = forloop::create_for(p)?;
            block.push(node);
            continue;
        }

        if p.buf.starts_with(p.cur, "while") && p.buf.ch(p.cur + 5) == ' ' {
            return Err(ParseError::at(ParseErrorKind::NotImplemented("while"), p.cur as u32, p.line));
        }
        if p.buf.starts_with(p.cur, "switch") && p.buf.ch(p.cur + 6) == ' ' {
            return Err(ParseError::at(ParseErrorKind::NotImplemented("switch"), p.cur as u32, p.line));
        }
        if p.buf.starts_with(p.cur, "try") && p.buf.ch(p.cur + 3) == ' ' {
            return Err(ParseError::at(ParseErrorKind::NotImplemented("try"), p.cur as u32, p.line));
        }

        if p.buf.ch(p.cur) == '[' {
            let start = p.cur;
            let line = p.line;
            let close = scanner::findend_matrix(&p.buf, start)?;
            let (k, _) = scanner::skip_ws_nl(&p.buf, close + 1);
            if p.buf.ch(k) == '=' && p.buf.ch(k + 1) != '=' {
                let (node, end) = assign::create_assigns(p, start)?;
                p.cur = end;
                block.push(node);
            } else {
                let (expr, end) = crate::expr::create_expression(p, start, None)?;
                let stmt = wrap_statement(p, start, line, end, expr);
                p.cur = end;
                block.push(stmt);
            }
            continue;
        }

        if is_expr_starter(p.buf.ch(p.cur)) {
            let start = p.cur;
            let line = p.line;
            let term_end = scanner::findend_expression(&p.buf, start)?;
            if p.buf.ch(term_end) == '=' {
                let (node, end) = assign::create_assign(p, start)?;
                p.cur = end;
                block.push(node);
            } else {
                let (expr, end) = crate::expr::create_expression(p, start, None)?;
                let stmt = wrap_statement(p, start, line, end, expr);
                p.cur = end;
                block.push(stmt);
            }
            continue;
        }

        return Err(ParseError::at(ParseErrorKind::UnexpectedCharacter(p.buf.ch(p.cur)), p.cur as u32, p.line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_terminates_at_end_keyword() {
        let mut p = Parser::for_test("a = 1\nend\n");
        let mut block = Node::new(NodeKind::Block, 0, 0, "");
        let end = fill_codeblock(&mut p, &mut block).unwrap();
        assert_eq!(block.children.len(), 1);
        assert_eq!(block.children[0].kind, NodeKind::Assign);
        assert_eq!(p.buf.slice(0, end), "a = 1\nend\n"[..9].to_string());
    }

    #[test]
    fn expression_statement_is_wrapped() {
        let mut p = Parser::for_test("1 + 2\nend\n");
        let mut block = Node::new(NodeKind::Block, 0, 0, "");
        fill_codeblock(&mut p, &mut block).unwrap();
        assert_eq!(block.children[0].kind, NodeKind::Statement);
        assert_eq!(block.children[0].children[0].kind, NodeKind::Plus);
    }

    #[test]
    fn comment_is_recorded() {
        let mut p = Parser::for_test("% hi\na = 1\nend\n");
        let mut block = Node::new(NodeKind::Block, 0, 0, "");
        fill_codeblock(&mut p, &mut block).unwrap();
        assert_eq!(block.children[0].kind, NodeKind::Comment);
        assert_eq!(block.children[1].kind, NodeKind::Assign);
    }

    #[test]
    fn not_implemented_keywords_are_fatal() {
        let mut p = Parser::for_test("while true\nend\n");
        let mut block = Node::new(NodeKind::Block, 0, 0, "");
        let err = fill_codeblock(&mut p, &mut block).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotImplemented("while"));
    }

    #[test]
    fn top_level_stops_at_function_boundary() {
        let mut p = Parser::for_test("a = 1\nfunction f()\nend\n");
        let mut block = Node::new(NodeKind::Block, 0, 0, "");
        let stop = fill_codeblock(&mut p, &mut block).unwrap();
        assert_eq!(block.children.len(), 1);
        assert!(p.buf.starts_with(stop, "function"));
    }

    #[test]
    fn bare_end_terminates_even_at_top_level() {
        let mut p = Parser::for_test("a = 1\nend\nb = 2\n");
        let mut block = Node::new(NodeKind::Block, 0, 0, "");
        let stop = fill_codeblock(&mut p, &mut block).unwrap();
        assert_eq!(block.children.len(), 1);
        assert_eq!(p.buf.slice(stop, stop + 1), "\n");
    }
}
