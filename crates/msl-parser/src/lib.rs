//! A single-pass, recursive-descent parser for a MATLAB/Octave-like
//! scientific matrix language. `parse` is the only entry point: it returns
//! a typed token tree (spec §3) or the first fatal [`ParseError`]
//! encountered -- this parser never attempts recovery (spec §7).
//!
//! The architecture mirrors `snowc`'s compiler-stage layering (scan ->
//! parse -> ...), collapsed into a single crate because this language has
//! no context-free token stream to hand a separate lexer (see
//! `scanner.rs`'s module doc).

pub mod assign;
pub mod buffer;
pub mod declares;
pub mod error;
pub mod expr;
pub mod forloop;
pub mod func;
pub mod lists;
pub mod matrix;
pub mod node;
pub mod refs;
pub mod scanner;
pub mod stmt;

use buffer::Buffer;
use declares::DeclaresStack;
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use node::{Node, NodeKind, TypeTag};

/// Parser state shared by every builder: the padded buffer, the live
/// cursor and line counter, the open declares-sink stack, and the
/// functions collected so far (including lambda-lifted ones, appended the
/// moment they are lifted -- spec §4.12).
pub struct Parser {
    pub(crate) buf: Buffer,
    pub(crate) cur: usize,
    pub(crate) line: u32,
    pub(crate) verbose: bool,
    pub(crate) declares: DeclaresStack,
    pub(crate) funcs: Vec<Node>,
}

impl Parser {
    fn new(text: &str, verbose: bool) -> Self {
        Self {
            buf: Buffer::new(text),
            cur: 0,
            line: 0,
            verbose,
            declares: DeclaresStack::new(),
            funcs: Vec::new(),
        }
    }

    /// Construct a `Parser` for unit tests that exercise a single builder
    /// directly, without going through the full top-level program loop.
    #[cfg(test)]
    pub(crate) fn for_test(text: &str) -> Self {
        Self::new(text, false)
    }

    fn trace(&self, node: &Node) {
        if self.verbose {
            println!("{:4} {:4} {:<10} {:?}", node.cur, node.line, node.kind.label(), node.code);
        }
    }
}

const MANDATORY_INCLUDES: [&str; 2] = ["stdio.h", "stdlib.h"];

/// Parse `text` into a `Program` node (spec §6). When `verbose` is set, a
/// progress trace of every top-level statement and function header is
/// printed to standard output -- used for debugging only, never consulted
/// by the parser itself.
pub fn parse(text: &str, verbose: bool) -> ParseResult<Node> {
    let mut p = Parser::new(text, verbose);

    let mut main_block: Option<Node> = None;
    let mut main_start: usize = 0;

    loop {
        let (c, lines) = scanner::skip_ws_nl(&p.buf, p.cur);
        p.cur = c;
        p.line += lines;

        if p.buf.at_eof(p.cur) {
            break;
        }

        if p.buf.ch(p.cur) == ';' {
            p.cur += 1;
            continue;
        }

        if p.buf.ch(p.cur) == '%' {
            let close = scanner::findend_comment(&p.buf, p.cur)?;
            if p.buf.ch(close) == '\n' {
                p.line += 1;
            }
            p.cur = close + 1;
            continue;
        }

        if p.buf.starts_with(p.cur, "function") && matches!(p.buf.ch(p.cur + 8), ' ' | '(') {
            let func = func::create_function(&mut p)?;
            p.trace(&func);
            p.funcs.push(func);
            continue;
        }

        if main_block.is_none() {
            main_start = p.cur;
            p.declares.push_scope();
            p.declares.declare("argc");
            p.declares.declare("argv");
            p.declares.declare("_retval");
            main_block = Some(Node::new(NodeKind::Block, p.cur as u32, p.line, ""));
        }

        let mut block = main_block.take().unwrap();
        let stop = stmt::fill_codeblock(&mut p, &mut block)?;
        p.cur = stop;
        main_block = Some(block);
    }

    let mut funcs = std::mem::take(&mut p.funcs);

    if let Some(mut block) = main_block {
        block.code = p.buf.slice(main_start, p.cur).to_string();
        let declared = p.declares.pop_scope();
        let line = scanner::line_at(&p.buf, main_start);

        let mut declares_node = Node::new(NodeKind::Declares, main_start as u32, line, "");
        for n in &declared {
            declares_node.push(Node::new(NodeKind::Var, main_start as u32, line, n.clone()).with_name(n.clone()));
        }

        let argc = Node::new(NodeKind::Var, main_start as u32, line, "argc")
            .with_name("argc")
            .with_type(TypeTag::Int);
        let argv = Node::new(NodeKind::Var, main_start as u32, line, "argv")
            .with_name("argv")
            .with_type(TypeTag::Char)
            .with_pointer(2);

        let mut returns_node = Node::new(NodeKind::Returns, main_start as u32, line, "");
        returns_node.push(
            Node::new(NodeKind::Var, main_start as u32, line, "_retval")
                .with_name("_retval")
                .with_type(TypeTag::Int),
        );
        let mut params_node = Node::new(NodeKind::Params, main_start as u32, line, "");
        params_node.push(argc);
        params_node.push(argv);

        let mut main_func = Node::new(NodeKind::Func, main_start as u32, line, block.code.clone()).with_name("main");
        main_func.push(declares_node);
        main_func.push(returns_node);
        main_func.push(params_node);
        main_func.push(block);
        main_func.set_backend("func_return");
        main_func.children[0].set_backend("func_return");
        main_func.children[1].set_backend("func_return");
        main_func.children[2].set_backend("func_return");

        p.trace(&main_func);
        funcs.push(main_func);
    }

    let mut includes = Node::new(NodeKind::Includes, 0, 0, "");
    for name in MANDATORY_INCLUDES {
        includes.push(Node::new(NodeKind::Include, 0, 0, name).with_name(name));
    }

    let mut program = Node::new(NodeKind::Program, 0, 0, text);
    program.push(includes);
    for f in funcs {
        program.push(f);
    }

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funcs_of(program: &Node) -> Vec<&Node> {
        program.children[1..].iter().collect()
    }

    #[test]
    fn program_shape_scenario_1() {
        let program = parse("[1,2,3]", false).unwrap();
        assert_eq!(program.children[0].kind, NodeKind::Includes);
        assert_eq!(program.children[0].children.len(), 2);
        let funcs = funcs_of(&program);
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name.as_deref(), Some("main"));
        let block = &funcs[0].children[3];
        assert_eq!(block.children[0].kind, NodeKind::Statement);
        let matrix = &block.children[0].children[0];
        assert_eq!(matrix.kind, NodeKind::Matrix);
        assert_eq!(matrix.children[0].children.len(), 3);
    }

    #[test]
    fn space_list_matches_comma_list_shape() {
        let comma = parse("[1,2,3]", false).unwrap();
        let space = parse("[1 2 3]", false).unwrap();
        let comma_row = &funcs_of(&comma)[0].children[3].children[0].children[0].children;
        let space_row = &funcs_of(&space)[0].children[3].children[0].children[0].children;
        assert_eq!(comma_row.len(), space_row.len());
        for (a, b) in comma_row.iter().zip(space_row.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.code, b.code);
        }
    }

    #[test]
    fn scenario_unary_vs_binary_minus() {
        let unary = parse("[1 -2]", false).unwrap();
        let row = &funcs_of(&unary)[0].children[3].children[0].children[0].children;
        assert_eq!(row.len(), 2);
        assert_eq!(row[1].kind, NodeKind::Neg);

        let binary = parse("[1 - 2]", false).unwrap();
        let row2 = &funcs_of(&binary)[0].children[3].children[0].children[0].children;
        assert_eq!(row2.len(), 1);
        assert_eq!(row2[0].kind, NodeKind::Minus);
    }

    #[test]
    fn scenario_function_with_dot_transpose() {
        let program = parse("function y = f(x)\n  y = x.'\nend\n", false).unwrap();
        let funcs = funcs_of(&program);
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name.as_deref(), Some("f"));
        assert_eq!(funcs[0].attr("backend").unwrap().as_str(), Some("func_return"));
        let block = &funcs[0].children[3];
        assert_eq!(block.children[0].children[1].kind, NodeKind::Transpose);
    }

    #[test]
    fn scenario_lambda_lift() {
        let program = parse("g = @(x) x+1", false).unwrap();
        let funcs = funcs_of(&program);
        // one lifted lambda func + synthetic main
        assert_eq!(funcs.len(), 2);
        let lambda_func = funcs.iter().find(|f| f.name.as_deref() == Some("_g_000")).unwrap();
        assert_eq!(lambda_func.attr("backend").unwrap().as_str(), Some("func_lambda"));
        let main = funcs.iter().find(|f| f.name.as_deref() == Some("main")).unwrap();
        let block = &main.children[3];
        assert_eq!(block.children[0].kind, NodeKind::Assign);
        assert_eq!(block.children[0].children[1].kind, NodeKind::Lambda);
    }

    #[test]
    fn scenario_field_call_assign() {
        let program = parse("a.b(i) = 3", false).unwrap();
        let funcs = funcs_of(&program);
        let block = &funcs[0].children[3];
        let assign = &block.children[0];
        assert_eq!(assign.kind, NodeKind::Assign);
        assert_eq!(assign.children[0].kind, NodeKind::Fset);
    }

    #[test]
    fn at_most_one_main_function() {
        let program = parse("a = 1\nfunction f()\nend\nb = 2\n", false).unwrap();
        let mains: Vec<_> = funcs_of(&program).into_iter().filter(|f| f.name.as_deref() == Some("main")).collect();
        assert_eq!(mains.len(), 1);
        // both top-level statements land in the single main, despite the
        // function definition appearing between them.
        assert_eq!(mains[0].children[3].children.len(), 2);
    }

    #[test]
    fn declares_completeness() {
        let program = parse("function y = f(x)\n  z = x + 1\n  y = z\nend\n", false).unwrap();
        let f = &funcs_of(&program)[0];
        let declared: Vec<_> = f.children[0].children.iter().filter_map(|n| n.name.clone()).collect();
        assert!(declared.contains(&"x".to_string()));
        assert!(declared.contains(&"z".to_string()));
        assert!(declared.contains(&"y".to_string()));
    }

    #[test]
    fn not_implemented_feature_is_fatal() {
        let err = parse("switch x\nend\n", false).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotImplemented("switch"));
    }

    #[test]
    fn determinism() {
        let src = "function y = f(x)\n  y = x.' + 1\nend\ng = @(x) x*2\n[1 -2 3]\n";
        let a = parse(src, false).unwrap();
        let b = parse(src, false).unwrap();
        assert_eq!(a, b);
    }
}
