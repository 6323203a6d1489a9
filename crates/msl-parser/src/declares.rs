//! The declares sink (spec §3.4/§4.5/§4.11): every variable-like reference
//! announces its name to whatever scope is currently open, and the
//! function/program builder drains that scope into a `Declares` node.
//!
//! `Node` has no parent pointer (see `node.rs`), so a reference builder
//! cannot walk up the tree to find "the enclosing function" the way
//! `snow-typeck/src/scope.rs` walks a rowan tree's ancestors. Instead the
//! parser keeps its own stack of open scopes, pushed on function/lambda
//! entry and popped (and drained into a `Declares` node) on exit -- the
//! `Vec<FxHashSet<...>>` stack plays the role `snow-typeck`'s `ScopeStack`
//! plays for a borrowed tree.

use rustc_hash::FxHashSet;

/// One function or lambda body's set of declared names, insertion-ordered
/// so the emitted `Declares` node's children match first-mention order
/// (spec §4.11: "in the order each name was first declared").
#[derive(Debug, Default)]
struct Scope {
    seen: FxHashSet<String>,
    ordered: Vec<String>,
}

impl Scope {
    fn declare(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.ordered.push(name.to_string());
        }
    }
}

/// A stack of open declares-sinks, one per function/lambda body currently
/// being parsed.
#[derive(Debug, Default)]
pub struct DeclaresStack {
    scopes: Vec<Scope>,
}

impl DeclaresStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new declares-sink for a function/lambda body.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the current scope and return its declared names in
    /// first-mention order.
    pub fn pop_scope(&mut self) -> Vec<String> {
        self.scopes.pop().expect("pop_scope with no open scope").ordered
    }

    /// Announce `name` to the innermost open scope. A no-op if no scope is
    /// open (top-level references outside any function do not declare).
    pub fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.declare(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_in_first_mention_order() {
        let mut stack = DeclaresStack::new();
        stack.push_scope();
        stack.declare("b");
        stack.declare("a");
        stack.declare("b");
        assert_eq!(stack.pop_scope(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn nested_scopes_are_independent() {
        let mut stack = DeclaresStack::new();
        stack.push_scope();
        stack.declare("outer");
        stack.push_scope();
        stack.declare("inner");
        assert_eq!(stack.pop_scope(), vec!["inner".to_string()]);
        assert_eq!(stack.pop_scope(), vec!["outer".to_string()]);
    }

    #[test]
    fn declare_without_open_scope_is_ignored() {
        let mut stack = DeclaresStack::new();
        stack.declare("free");
        stack.push_scope();
        assert_eq!(stack.pop_scope(), Vec::<String>::new());
    }
}
