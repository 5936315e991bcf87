//! # Class Descriptor
//!
//! `spec.md` §3 ("Class"), §4.3 (`attribute_index`/`method_index`/`add_method`),
//! §8 invariants 2 and 3 (layout stability under inheritance, override
//! correctness).

use super::FuncId;
use crate::constpool::Literal;
use crate::label::Label;
use crate::types::ValueType;

/// One slot in a class's ordered attribute table.
#[derive(Debug, Clone)]
pub struct AttrSlot {
    pub name: String,
    pub attr_type: ValueType,
    pub initial: Literal,
}

/// One slot in a class's ordered method table: the method's declared name
/// (used for override matching) and the `Func` descriptor that currently
/// occupies this slot.
#[derive(Debug, Clone)]
pub struct MethodSlot {
    pub name: String,
    pub func: FuncId,
}

/// A class descriptor: its integer type tag, its attribute and method
/// tables with inheritance already merged in, and the labels its prototype
/// and dispatch table are emitted under.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    /// Integer type tag. Built-ins occupy consecutive low tags in the
    /// order `object`, `int`, `bool`, `str`, then user classes in source
    /// order (`spec.md` §3). The synthetic list class uses tag `-1`.
    pub tag: i32,
    /// Ordered attribute list, inherited attributes first, exactly as laid
    /// out by the superclass (invariant 2 of `spec.md` §8).
    pub attrs: Vec<AttrSlot>,
    /// Ordered method list, inherited methods first; an override replaces
    /// its superclass's slot in place (invariant 3 of `spec.md` §8).
    pub methods: Vec<MethodSlot>,
    pub prototype_label: Label,
    /// `None` only for the synthetic list class, which has no dispatch
    /// table (`spec.md` §3, §9 "Open questions").
    pub dispatch_table_label: Option<Label>,
}

impl Class {
    /// Creates a class with no attributes or methods yet — the starting
    /// point for both a built-in and a user class before its super-class's
    /// tables are copied in and its own body is walked (`spec.md` §4.5
    /// step 2).
    pub fn new(name: impl Into<String>, tag: i32, has_dispatch_table: bool) -> Self {
        let name = name.into();
        let dispatch_table_label = has_dispatch_table.then(|| Label::dispatch_table(&name));
        Self {
            prototype_label: Label::prototype(&name),
            dispatch_table_label,
            name,
            tag,
            attrs: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Linear scan for an attribute's slot index. `spec.md` §4.3 notes this
    /// list is small enough that linear scan is acceptable.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a.name == name)
    }

    /// Linear scan for a method's slot index.
    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.name == name)
    }

    /// Appends a new attribute. Attributes cannot be overridden (`spec.md`
    /// §3), so this always appends — never replaces.
    pub fn add_attribute(&mut self, attr: AttrSlot) {
        self.attrs.push(attr);
    }

    /// Installs `func` as the implementation of method `name`. If a method
    /// of the same name already occupies a slot (inherited from the
    /// super-class, or declared earlier in this same class), that slot is
    /// replaced in place so the method-table index — and therefore every
    /// subclass's dispatch-table layout — is preserved. Otherwise the
    /// method is appended as a new slot.
    pub fn add_method(&mut self, name: impl Into<String>, func: FuncId) {
        let name = name.into();
        if let Some(slot) = self.methods.iter_mut().find(|m| m.name == name) {
            slot.func = func;
        } else {
            self.methods.push(MethodSlot { name, func });
        }
    }

    /// Object-size word for this class's prototype: header plus one word
    /// per attribute (`spec.md` §4.6, invariant 6 of §8).
    pub fn prototype_size_words(&self, header_words: u32) -> u32 {
        header_words + self.attrs.len() as u32
    }
}

/// Assigns consecutive integer type tags, starting from 0, in the order
/// classes are registered: `object`, `int`, `bool`, `str`, then user
/// classes in source order (`spec.md` §3).
#[derive(Debug, Default)]
pub struct TagAllocator {
    next: i32,
}

impl TagAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_tag(&mut self) -> i32 {
        let tag = self.next;
        self.next += 1;
        tag
    }

    /// The fixed tag of the synthetic list class, which is never drawn
    /// from the monotone counter.
    pub const LIST_TAG: i32 = -1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str, func: usize) -> MethodSlot {
        MethodSlot {
            name: name.to_string(),
            func: FuncId(func),
        }
    }

    #[test]
    fn add_method_appends_when_new() {
        let mut class = Class::new("A", 4, true);
        class.methods.push(slot("__init__", 0));
        class.add_method("f", FuncId(1));
        assert_eq!(class.method_index("f"), Some(1));
    }

    #[test]
    fn add_method_replaces_in_place_when_overriding() {
        let mut parent = Class::new("A", 4, true);
        parent.methods.push(slot("__init__", 0));
        parent.add_method("f", FuncId(1));

        // Simulate a subclass starting from a copy of the parent's tables.
        let mut child = parent.clone();
        child.name = "B".to_string();
        child.add_method("f", FuncId(2));

        assert_eq!(child.method_index("f"), parent.method_index("f"));
        assert_eq!(child.methods[child.method_index("f").unwrap()].func, FuncId(2));
        assert_eq!(parent.methods[parent.method_index("f").unwrap()].func, FuncId(1));
    }

    #[test]
    fn missing_member_reports_absent() {
        let class = Class::new("A", 4, true);
        assert_eq!(class.attribute_index("nope"), None);
        assert_eq!(class.method_index("nope"), None);
    }

    #[test]
    fn list_class_has_no_dispatch_table() {
        let class = Class::new(".list", TagAllocator::LIST_TAG, false);
        assert!(class.dispatch_table_label.is_none());
        assert_eq!(class.tag, -1);
    }

    #[test]
    fn tag_allocator_is_monotone_from_zero() {
        let mut tags = TagAllocator::new();
        assert_eq!(tags.next_tag(), 0);
        assert_eq!(tags.next_tag(), 1);
        assert_eq!(tags.next_tag(), 2);
    }
}
