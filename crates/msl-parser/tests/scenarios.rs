//! End-to-end scenarios exercised through the public `parse` entry point,
//! rather than through individual builder functions.

use msl_parser::{parse, Node, NodeKind};

fn main_block(program: &Node) -> &Node {
    let main = program.children[1..]
        .iter()
        .find(|f| f.name.as_deref() == Some("main"))
        .expect("a synthetic main function");
    &main.children[3]
}

fn first_statement_expr(program: &Node) -> &Node {
    &main_block(program).children[0].children[0]
}

#[test]
fn comma_matrix_literal() {
    let program = parse("[1,2,3]", false).unwrap();
    let matrix = first_statement_expr(&program);
    assert_eq!(matrix.kind, NodeKind::Matrix);
    assert_eq!(matrix.children[0].children.len(), 3);
}

#[test]
fn space_matrix_literal_same_shape() {
    let program = parse("[1 2 3]", false).unwrap();
    let matrix = first_statement_expr(&program);
    assert_eq!(matrix.children[0].children.len(), 3);
}

#[test]
fn unary_minus_starts_a_new_cell() {
    let program = parse("[1 -2]", false).unwrap();
    let row = &first_statement_expr(&program).children[0].children;
    assert_eq!(row.len(), 2);
    assert_eq!(row[1].kind, NodeKind::Neg);
}

#[test]
fn spaced_minus_is_binary_within_one_cell() {
    let program = parse("[1 - 2]", false).unwrap();
    let row = &first_statement_expr(&program).children[0].children;
    assert_eq!(row.len(), 1);
    assert_eq!(row[0].kind, NodeKind::Minus);
}

#[test]
fn trailing_quote_on_integer_is_conjugate_transpose() {
    let program = parse("a = 1'", false).unwrap();
    let block = main_block(&program);
    let assign = &block.children[0];
    assert_eq!(assign.kind, NodeKind::Assign);
    assert_eq!(assign.children[1].kind, NodeKind::Ctranspose);
}

#[test]
fn function_with_single_return_and_dot_transpose_rhs() {
    let program = parse("function y = f(x)\n  y = x.'\nend\n", false).unwrap();
    let funcs: Vec<_> = program.children[1..].iter().collect();
    assert_eq!(funcs.len(), 1);
    let f = funcs[0];
    assert_eq!(f.name.as_deref(), Some("f"));
    assert_eq!(f.attr("backend").and_then(|v| v.as_str()), Some("func_return"));
    assert_eq!(f.children[1].children.len(), 1, "exactly one declared return");
    assert_eq!(f.children[2].children[0].name.as_deref(), Some("x"));
    let body = &f.children[3].children[0];
    assert_eq!(body.kind, NodeKind::Assign);
    assert_eq!(body.children[1].kind, NodeKind::Transpose);
}

#[test]
fn lambda_assigned_to_a_variable_is_lifted_to_a_named_function() {
    let program = parse("g = @(x) x+1", false).unwrap();
    let funcs: Vec<_> = program.children[1..].iter().collect();
    assert_eq!(funcs.len(), 2, "one lifted lambda, one synthetic main");

    let lifted = funcs.iter().find(|f| f.name.as_deref() == Some("_g_000")).expect("lifted lambda function");
    assert_eq!(lifted.attr("backend").and_then(|v| v.as_str()), Some("func_lambda"));
    assert_eq!(lifted.children[2].children.len(), 1, "lambda has one parameter");
    let body = &lifted.children[3].children[0];
    assert_eq!(body.kind, NodeKind::Assign);
    assert_eq!(body.children[0].name.as_deref(), Some("_retval"));
    assert_eq!(body.children[1].kind, NodeKind::Plus);

    let block = main_block(&program);
    let assign = &block.children[0];
    assert_eq!(assign.children[0].kind, NodeKind::Var);
    assert_eq!(assign.children[0].name.as_deref(), Some("g"));
    assert_eq!(assign.children[1].kind, NodeKind::Lambda);
    assert_eq!(assign.children[1].name.as_deref(), Some("_g_000"));
}

#[test]
fn dynamic_field_call_assignment_target() {
    let program = parse("a.b(i) = 3", false).unwrap();
    let block = main_block(&program);
    let assign = &block.children[0];
    assert_eq!(assign.kind, NodeKind::Assign);
    assert_eq!(assign.children[0].kind, NodeKind::Fset);
    assert_eq!(assign.children[0].name.as_deref(), Some("a"));
    assert_eq!(assign.children[0].sname.as_deref(), Some("b"));
    assert_eq!(assign.children[1].kind, NodeKind::Int);
}

#[test]
fn program_always_starts_with_two_mandatory_includes() {
    let program = parse("x = 1", false).unwrap();
    assert_eq!(program.children[0].kind, NodeKind::Includes);
    let names: Vec<_> = program.children[0].children.iter().filter_map(|n| n.name.clone()).collect();
    assert_eq!(names, vec!["stdio.h", "stdlib.h"]);
}

#[test]
fn synthetic_main_is_always_last_function() {
    let program = parse("function f()\nend\na = 1\n", false).unwrap();
    let last = program.children.last().unwrap();
    assert_eq!(last.name.as_deref(), Some("main"));
}

#[test]
fn for_loop_over_a_colon_range() {
    let program = parse("for i = 1:10\n  x = i\nend\n", false).unwrap();
    let block = main_block(&program);
    let stmt = &block.children[0];
    assert_eq!(stmt.kind, NodeKind::For);
    assert_eq!(stmt.children[1].kind, NodeKind::Colon);
    assert_eq!(stmt.children[2].children.len(), 1);
}

#[test]
fn declares_sink_sees_every_variable_reference_once_in_first_mention_order() {
    let program = parse("function y = f(x)\n  z = x + 1\n  y = z + x\nend\n", false).unwrap();
    let f = &program.children[1];
    let declared: Vec<_> = f.children[0].children.iter().filter_map(|n| n.name.clone()).collect();
    assert_eq!(declared, vec!["x", "z", "y"]);
}

#[test]
fn unrecognized_top_level_keyword_fails_fatally_with_no_partial_recovery() {
    let err = parse("try\n  a = 1\nend\n", false).unwrap_err();
    assert_eq!(err.kind, msl_parser::ParseErrorKind::NotImplemented("try"));
}

#[test]
fn parse_is_deterministic_across_runs() {
    let src = "function [a, b] = split(v)\n  a = v(1)\n  b = v(2)\nend\nr = @(x) x.^2\nfor i = 1:3\n  disp(i)\nend\n";
    assert_eq!(parse(src, false).unwrap(), parse(src, false).unwrap());
}

#[test]
fn every_node_position_is_non_decreasing_in_source_order() {
    fn check(node: &Node) {
        let mut last = 0u32;
        for child in &node.children {
            assert!(child.cur >= last, "child {:?} at {} precedes prior sibling at {}", child.kind, child.cur, last);
            last = child.cur;
            check(child);
        }
    }
    let program = parse("a = 1\nb = a + 2\nc = [a, b]\n", false).unwrap();
    check(&program);
}
