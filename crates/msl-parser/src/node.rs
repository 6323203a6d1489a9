//! The node factory: typed constructors for every tag in [`NodeKind`] plus
//! the [`Node`] tree type itself.
//!
//! Nodes are built bottom-up and never deleted or re-parented (spec §3.5),
//! so unlike the teacher's rowan-based CST (`snow-parser/src/cst.rs`,
//! `ast/mod.rs`) there is no green/red tree, no arena, and no parent
//! pointers -- a plain owned `Vec<Node>` of children is enough. `code` and
//! the name fields are owned `String`/`Box<str>` rather than slices
//! borrowed from the source buffer: the buffer the parser scans is an
//! internal, padded copy that does not outlive `parse()`, and a
//! self-referential `Program<'src>` isn't worth the lifetime gymnastics
//! for a handful of extra allocations (see `DESIGN.md`).

use rustc_hash::FxHashMap;
use serde::Serialize;

use msl_common::AttrValue;

/// Every kind of tree element the parser can produce (spec §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Structural
    Program,
    Includes,
    Include,
    Func,
    Declares,
    Returns,
    Params,
    Block,

    // Statements
    Statement,
    Assign,
    Assigns,
    Comment,
    For,
    While,
    Switch,
    Try,
    Return,
    Break,
    End,

    // LHS/RHS reference forms
    Var,
    Get,
    Set,
    Cget,
    Cset,
    Fvar,
    Fget,
    Fset,
    Nget,
    Nset,
    Lambda,

    // Literals
    Int,
    Float,
    Iint,
    Ifloat,
    String,
    Matrix,
    Vector,
    Cell,
    All,

    // Binary operators
    Lor,
    Land,
    Bor,
    Band,
    Ne,
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Colon,
    Plus,
    Minus,
    Elmul,
    Mul,
    Elrdiv,
    Rdiv,
    Elldiv,
    Ldiv,
    Elexp,
    Exp,

    // Unary
    Neg,
    Not,

    // Postfix
    Transpose,
    Ctranspose,

    // Grouping
    Paren,
}

impl NodeKind {
    /// Short tag used by the verbose trace (spec §6: `"%4d %4d <Kind> %r"`).
    pub fn label(self) -> &'static str {
        use NodeKind::*;
        match self {
            Program => "Program",
            Includes => "Includes",
            Include => "Include",
            Func => "Func",
            Declares => "Declares",
            Returns => "Returns",
            Params => "Params",
            Block => "Block",
            Statement => "Statement",
            Assign => "Assign",
            Assigns => "Assigns",
            Comment => "Comment",
            For => "For",
            While => "While",
            Switch => "Switch",
            Try => "Try",
            Return => "Return",
            Break => "Break",
            End => "End",
            Var => "Var",
            Get => "Get",
            Set => "Set",
            Cget => "Cget",
            Cset => "Cset",
            Fvar => "Fvar",
            Fget => "Fget",
            Fset => "Fset",
            Nget => "Nget",
            Nset => "Nset",
            Lambda => "Lambda",
            Int => "Int",
            Float => "Float",
            Iint => "Iint",
            Ifloat => "Ifloat",
            String => "String",
            Matrix => "Matrix",
            Vector => "Vector",
            Cell => "Cell",
            All => "All",
            Lor => "Lor",
            Land => "Land",
            Bor => "Bor",
            Band => "Band",
            Ne => "Ne",
            Eq => "Eq",
            Ge => "Ge",
            Gt => "Gt",
            Le => "Le",
            Lt => "Lt",
            Colon => "Colon",
            Plus => "Plus",
            Minus => "Minus",
            Elmul => "Elmul",
            Mul => "Mul",
            Elrdiv => "Elrdiv",
            Rdiv => "Rdiv",
            Elldiv => "Elldiv",
            Ldiv => "Ldiv",
            Elexp => "Elexp",
            Exp => "Exp",
            Neg => "Neg",
            Not => "Not",
            Transpose => "Transpose",
            Ctranspose => "Ctranspose",
            Paren => "Paren",
        }
    }
}

/// A type tag on declaration-bearing nodes (spec §3.2). Defaults to
/// `Unknown` until a later pass (out of scope here) narrows it; the parser
/// itself only ever assigns `Int` or `Char`, for the synthetic `main`
/// signature it generates (spec §4.10).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum TypeTag {
    #[default]
    Unknown,
    Int,
    Char,
}

/// One element of the token tree.
///
/// Most fields default to "absent": `name`/`sname` are only set on
/// variable-like kinds, `ty`/`pointer_level` only on declaration-bearing
/// nodes, and `attributes` is empty unless a builder explicitly annotates
/// the node (the parser only ever sets `backend`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    /// Byte offset of the first character this node covers, in the
    /// original (unpadded) source text.
    pub cur: u32,
    /// 0-based line of `cur`.
    pub line: u32,
    /// Verbatim source slice.
    pub code: String,
    pub name: Option<String>,
    /// Second name, for static field access (`a.b` -> name "a", sname "b").
    pub sname: Option<String>,
    pub ty: TypeTag,
    pub pointer_level: u32,
    pub attributes: FxHashMap<String, AttrValue>,
}

impl Node {
    pub fn new(kind: NodeKind, cur: u32, line: u32, code: impl Into<String>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            cur,
            line,
            code: code.into(),
            name: None,
            sname: None,
            ty: TypeTag::default(),
            pointer_level: 0,
            attributes: FxHashMap::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sname(mut self, sname: impl Into<String>) -> Self {
        self.sname = Some(sname.into());
        self
    }

    pub fn with_type(mut self, ty: TypeTag) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_pointer(mut self, level: u32) -> Self {
        self.pointer_level = level;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Tag this node (and, for `Func`, its three leading children) with a
    /// `backend` value -- spec §3.4/§4.11/§4.12.
    pub fn set_backend(&mut self, backend: &'static str) {
        self.set_attr("backend", backend);
    }
}
