//! # Function / Stack-Variable Descriptors
//!
//! `spec.md` §3 ("Func", "StackVar"), §4.3 (`Func::var_index`), §8
//! invariant 7 (activation-record arithmetic).

use super::{Binding, DescriptorArena, FuncId};
use crate::constpool::Literal;
use crate::error::{CodegenError, Result};
use crate::label::Label;
use crate::symtab::SymbolTable;
use crate::tree::Stmt;
use crate::types::ValueType;

/// Whether a [`StackVar`] is a formal parameter or a local declared in the
/// function body — both live in the same activation record, just at
/// different offsets (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackVarKind {
    Param,
    Local,
}

/// A parameter or local variable, addressed within its owning function's
/// activation record.
#[derive(Debug, Clone)]
pub struct StackVar {
    pub name: String,
    pub var_type: ValueType,
    /// Locals may be declared with no initializer in some source
    /// languages; parameters never carry one (the caller supplies the
    /// value). `None` here means "zero-initialize", matching the
    /// prototype/global initial-value rule.
    pub initial: Option<Literal>,
    pub owner: FuncId,
    pub kind: StackVarKind,
}

/// A function or method descriptor.
///
/// Invariant (`spec.md` §3): parameters appear before locals in the
/// activation record, with two reserved slots between them for the saved
/// frame pointer and saved return address. The index of name `n` is `i` if
/// it is the `i`-th parameter (0-based), else `|params| + 2 + j` if it is
/// the `j`-th local.
#[derive(Debug, Clone)]
pub struct Func {
    /// Fully qualified name: `f` for a top-level function, `Class.f` for a
    /// method, `outer.inner` for a function nested inside `outer` (dotted
    /// at every nesting level).
    pub fq_name: String,
    pub code_label: Label,
    /// Lexical nesting depth: 0 for top-level functions and methods.
    pub static_depth: u32,
    pub return_type: ValueType,
    /// Ordered by parameter position.
    pub params: Vec<super::StackVarId>,
    /// Ordered by declaration position within the body.
    pub locals: Vec<super::StackVarId>,
    /// The function's own statement body — filled in during analysis,
    /// then frozen.
    pub statements: Vec<Stmt>,
    /// The function's own symbol table, parented on its enclosing scope —
    /// filled in during analysis, then frozen.
    pub symbols: SymbolTable<Binding>,
    /// `None` for top-level functions and methods; `Some` for a function
    /// nested inside another function.
    pub parent: Option<FuncId>,
    /// `Some(resource_name)` for a function whose body is supplied by the
    /// runtime-library binder (`spec.md` §4.9) rather than walked by the
    /// pluggable emitter — `print`, `len`, `input`, `object.__init__`.
    /// `statements` is empty for these; `resource_name` names the bound-in
    /// assembly fragment.
    pub builtin: Option<&'static str>,
}

impl Func {
    /// Two reserved activation-record slots between parameters and locals:
    /// the saved frame pointer and the saved return address.
    pub const RESERVED_SLOTS: usize = 2;

    /// Resolves `name` to its 0-based activation-record slot index,
    /// looking only at this function's own parameters and locals — never
    /// the symbol table. Non-locals and globals must be resolved through
    /// the symbol table instead; asking here about one of those is an
    /// emitter bug (`spec.md` §4.3, §7).
    pub fn var_index(&self, name: &str, arena: &DescriptorArena) -> Result<usize> {
        if let Some(i) = self
            .params
            .iter()
            .position(|id| arena.stack_var(*id).name == name)
        {
            return Ok(i);
        }
        if let Some(j) = self
            .locals
            .iter()
            .position(|id| arena.stack_var(*id).name == name)
        {
            return Ok(self.params.len() + Self::RESERVED_SLOTS + j);
        }
        Err(CodegenError::unknown_name(self.fq_name.clone(), name))
    }
}
