//! Matrix literal builder (spec §4.4): a `[` at an expression position,
//! split into rows via the list iterators, each cell re-entering the
//! expression builder.

use crate::error::ParseResult;
use crate::lists;
use crate::node::{Node, NodeKind};
use crate::scanner;
use crate::Parser;

pub fn create_matrix(p: &mut Parser, start: usize) -> ParseResult<(Node, usize)> {
    let close = scanner::findend_matrix(&p.buf, start)?;
    let line = scanner::line_at(&p.buf, start);
    let rows = lists::iterate_list(&p.buf, start)?;

    let mut node = Node::new(NodeKind::Matrix, start as u32, line, p.buf.slice(start, close + 1));
    for row in rows {
        if row.is_empty() {
            continue;
        }
        let row_start = row[0].0;
        let row_line = scanner::line_at(&p.buf, row_start);
        let mut vector = Node::new(NodeKind::Vector, row_start as u32, row_line, "");
        let mut last_end = row_start;
        for (s, e) in &row {
            let (cell, _) = crate::expr::create_expression(p, *s, Some(*e))?;
            vector.push(cell);
            last_end = *e;
        }
        vector.code = p.buf.slice(row_start, last_end).to_string();
        node.push(vector);
    }

    Ok((node, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_matrix_three_ints() {
        let mut p = Parser::for_test("[1,2,3]");
        let (node, end) = create_matrix(&mut p, 0).unwrap();
        assert_eq!(node.kind, NodeKind::Matrix);
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].children.len(), 3);
        assert_eq!(end, 7);
    }

    #[test]
    fn space_matrix_same_shape() {
        let mut p = Parser::for_test("[1 2 3]");
        let (node, _) = create_matrix(&mut p, 0).unwrap();
        assert_eq!(node.children[0].children.len(), 3);
        for child in &node.children[0].children {
            assert_eq!(child.kind, NodeKind::Int);
        }
    }

    #[test]
    fn unary_minus_is_new_cell() {
        let mut p = Parser::for_test("[1 -2]");
        let (node, _) = create_matrix(&mut p, 0).unwrap();
        let row = &node.children[0].children;
        assert_eq!(row.len(), 2);
        assert_eq!(row[0].kind, NodeKind::Int);
        assert_eq!(row[1].kind, NodeKind::Neg);
    }

    #[test]
    fn binary_minus_stays_in_one_cell() {
        let mut p = Parser::for_test("[1 - 2]");
        let (node, _) = create_matrix(&mut p, 0).unwrap();
        let row = &node.children[0].children;
        assert_eq!(row.len(), 1);
        assert_eq!(row[0].kind, NodeKind::Minus);
    }

    #[test]
    fn semicolon_separated_rows() {
        let mut p = Parser::for_test("[1,2;3,4]");
        let (node, _) = create_matrix(&mut p, 0).unwrap();
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn empty_matrix_has_no_rows() {
        let mut p = Parser::for_test("[]");
        let (node, end) = create_matrix(&mut p, 0).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(end, 2);
    }
}
