//! # Symbol Table (C2)
//!
//! A block-structured lexical map from identifiers to descriptors, with a
//! parent pointer and shadowing. Tables are arranged into a tree whose root
//! is the process-wide *global* table (`spec.md` §4.2).
//!
//! Descriptors live in the arena (`descriptors::Arena`); a `SymbolTable`
//! stores handles into it, not the descriptors themselves, so the table can
//! be cloned/shared cheaply and so cyclic back-references (function ->
//! enclosing scope -> sibling functions) never need `Rc`/`RefCell`
//! (`spec.md` §9 "Cyclic descriptors").

use std::collections::HashMap;

/// A block-structured scope mapping identifiers to values of type `V`.
///
/// `parent` is `None` only for the root (global) table.
#[derive(Debug, Clone)]
pub struct SymbolTable<V> {
    bindings: HashMap<String, V>,
    parent: Option<Box<SymbolTable<V>>>,
}

impl<V: Clone> SymbolTable<V> {
    /// Creates a fresh root table with no parent.
    pub fn root() -> Self {
        Self {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    /// Creates a child scope parented on `self`, consuming it — used when a
    /// table needs to be "entered" by value. Most callers instead keep a
    /// parent table alive separately and call [`SymbolTable::child_of`].
    pub fn into_child(self) -> Self {
        Self {
            bindings: HashMap::new(),
            parent: Some(Box::new(self)),
        }
    }

    /// Creates a child scope parented on a clone of `parent`.
    pub fn child_of(parent: &SymbolTable<V>) -> Self {
        Self {
            bindings: HashMap::new(),
            parent: Some(Box::new(parent.clone())),
        }
    }

    /// Installs `value` under `name` in the *current* scope only. Shadows
    /// any binding of the same name in an enclosing scope.
    pub fn put(&mut self, name: impl Into<String>, value: V) {
        self.bindings.insert(name.into(), value);
    }

    /// Looks up `name`, walking the parent chain outward from the current
    /// scope. Returns the nearest enclosing binding, or `None` if `name`
    /// is unbound anywhere in the chain.
    pub fn get(&self, name: &str) -> Option<V> {
        if let Some(v) = self.bindings.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Whether `name` is bound in the *current* scope only (does not walk
    /// the parent chain).
    pub fn declares(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// All names bound directly in the current scope, in arbitrary order.
    pub fn declared_symbols(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl<V: Clone> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::root()
    }
}
