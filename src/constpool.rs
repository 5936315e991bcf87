//! # Constant Pool (C5)
//!
//! A deduplicating mapping from source-level literal values to unique
//! labels: string, int, plus the singleton `True`/`False` booleans
//! (`spec.md` §4.4). Keyed by literal *value*, not by source identity, so
//! every occurrence of the same literal anywhere in the program shares one
//! entry (`spec.md` §8, invariant 5).

use crate::label::Label;
use indexmap::IndexMap;

/// A literal value that can live in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i32),
    Str(String),
    Bool(bool),
    /// The `None` literal is never boxed; it is the null address. Included
    /// here only so `ConstantPool::label_for` has a total function from
    /// every literal kind to an optional label.
    None,
}

/// Deduplicating store of boxed `int`, `bool`, `str` singletons.
///
/// Emission order (`spec.md` §4.9) is insertion order, which is why this
/// uses an order-preserving map rather than a `HashMap`: iteration order
/// must be deterministic across runs (`spec.md` §8, invariant 1) and must
/// match "first use wins" interning order.
#[derive(Debug, Default)]
pub struct ConstantPool {
    ints: IndexMap<i32, Label>,
    strings: IndexMap<String, Label>,
    next_id: usize,
    true_label: Label,
    false_label: Label,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            ints: IndexMap::new(),
            strings: IndexMap::new(),
            next_id: 0,
            true_label: Label::raw("const_True"),
            false_label: Label::raw("const_False"),
        }
    }

    /// The precomputed singleton label for the boxed `True` constant.
    pub fn true_label(&self) -> &Label {
        &self.true_label
    }

    /// The precomputed singleton label for the boxed `False` constant.
    pub fn false_label(&self) -> &Label {
        &self.false_label
    }

    /// Interns an integer literal, returning its (possibly pre-existing)
    /// label.
    pub fn intern_int(&mut self, value: i32) -> Label {
        if let Some(label) = self.ints.get(&value) {
            return label.clone();
        }
        let label = self.fresh_label();
        self.ints.insert(value, label.clone());
        label
    }

    /// Interns a string literal by contents, returning its (possibly
    /// pre-existing) label.
    pub fn intern_str(&mut self, value: &str) -> Label {
        if let Some(label) = self.strings.get(value) {
            return label.clone();
        }
        let label = self.fresh_label();
        self.strings.insert(value.to_string(), label.clone());
        label
    }

    fn fresh_label(&mut self) -> Label {
        let label = Label::constant(self.next_id);
        self.next_id += 1;
        label
    }

    /// Resolves any literal to the label it would be emitted under, or
    /// `None` for the `None` literal (a null address per `spec.md` §4.6).
    /// `Bool` resolves to the fixed `True`/`False` singleton labels rather
    /// than interning a fresh entry.
    pub fn label_for(&mut self, literal: &Literal) -> Option<Label> {
        match literal {
            Literal::Int(n) => Some(self.intern_int(*n)),
            Literal::Str(s) => Some(self.intern_str(s)),
            Literal::Bool(true) => Some(self.true_label.clone()),
            Literal::Bool(false) => Some(self.false_label.clone()),
            Literal::None => None,
        }
    }

    /// Interned integers, in insertion (first-use) order.
    pub fn ints_in_order(&self) -> impl Iterator<Item = (&i32, &Label)> {
        self.ints.iter()
    }

    /// Interned strings, in insertion (first-use) order.
    pub fn strings_in_order(&self) -> impl Iterator<Item = (&str, &Label)> {
        self.strings.iter().map(|(k, v)| (k.as_str(), v))
    }
}
