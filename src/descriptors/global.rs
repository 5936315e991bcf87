//! # Global-Variable Descriptor
//!
//! `spec.md` §3 ("GlobalVar"). Created during declaration analysis,
//! immutable thereafter, emitted once into the data section (`spec.md`
//! §4.6).

use crate::constpool::Literal;
use crate::label::Label;
use crate::types::ValueType;

#[derive(Debug, Clone)]
pub struct GlobalVar {
    pub name: String,
    pub var_type: ValueType,
    pub initial: Literal,
    pub label: Label,
}

impl GlobalVar {
    pub fn new(name: impl Into<String>, var_type: ValueType, initial: Literal) -> Self {
        let name = name.into();
        let label = Label::global(&name);
        Self {
            name,
            var_type,
            initial,
            label,
        }
    }
}
