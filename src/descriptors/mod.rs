//! # Descriptor Model (C4)
//!
//! Class / function / global / stack-variable / attribute descriptors with
//! ABI-relevant fields, per `spec.md` §3–§4.3. All descriptors are immutable
//! after analysis except a function's statement list and its own symbol
//! table, both of which are filled in during analysis and then effectively
//! frozen (never mutated again once [`analysis`](crate::analysis) returns).
//!
//! Descriptors reference each other — a function references its enclosing
//! function and its parameters/locals, a class references its attributes
//! and methods — but per the design note in `spec.md` §9 ("Cyclic
//! descriptors"), those references are plain `Copy` indices (`ClassId`,
//! `FuncId`, `GlobalId`, `StackVarId`) into an arena, never pointers or
//! `Rc`/`RefCell`. The arena and the flat lists of classes, functions, and
//! globals are the roots the rest of the compilation walks from.

pub mod class;
pub mod func;
pub mod global;

pub use class::{AttrSlot, Class, MethodSlot};
pub use func::{Func, StackVar, StackVarKind};
pub use global::GlobalVar;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);
    };
}

define_id!(ClassId);
define_id!(FuncId);
define_id!(GlobalId);
define_id!(StackVarId);

/// What a name in a [`crate::symtab::SymbolTable`] can resolve to. This is
/// the "Descriptor (sum type)" of `spec.md` §3, represented as a tagged
/// handle rather than an owned value so every binding is `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Global(GlobalId),
    Stack(StackVarId),
    Func(FuncId),
    Class(ClassId),
}

/// Owns every descriptor created during analysis, indexed by the `Id`
/// newtypes above. One arena per compilation (`spec.md` §5, §9).
#[derive(Debug, Default)]
pub struct DescriptorArena {
    pub classes: Vec<Class>,
    pub funcs: Vec<Func>,
    pub globals: Vec<GlobalVar>,
    pub stack_vars: Vec<StackVar>,
}

impl DescriptorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_class(&mut self, class: Class) -> ClassId {
        let id = ClassId(self.classes.len());
        self.classes.push(class);
        id
    }

    pub fn push_func(&mut self, func: Func) -> FuncId {
        let id = FuncId(self.funcs.len());
        self.funcs.push(func);
        id
    }

    pub fn push_global(&mut self, global: GlobalVar) -> GlobalId {
        let id = GlobalId(self.globals.len());
        self.globals.push(global);
        id
    }

    pub fn push_stack_var(&mut self, var: StackVar) -> StackVarId {
        let id = StackVarId(self.stack_vars.len());
        self.stack_vars.push(var);
        id
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.0]
    }

    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.0]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut Func {
        &mut self.funcs[id.0]
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVar {
        &self.globals[id.0]
    }

    pub fn stack_var(&self, id: StackVarId) -> &StackVar {
        &self.stack_vars[id.0]
    }

    /// Finds a class by name among those already registered. Used when
    /// resolving a super-class reference (`spec.md` §4.5 step 2).
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|c| c.name == name)
            .map(ClassId)
    }
}
