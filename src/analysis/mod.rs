//! # Program Analyzer (C6)
//!
//! Walks an already-parsed, already-type-checked [`tree::Program`] and
//! builds the descriptor model (C4) and symbol tables (C2) that every
//! downstream emitter consumes. `spec.md` §4.5 describes the five-step
//! sequence this module implements: globals first, then top-level classes
//! and functions, then a four-phase recursive function analysis, with
//! built-ins registered before any of it runs.
//!
//! This is not the type-checker — the tree arrives with every expression
//! already annotated with its [`crate::types::ValueType`]. This pass only
//! resolves names to descriptors and lays out activation records and class
//! tables.

use crate::constpool::Literal;
use crate::descriptors::{
    AttrSlot, Binding, Class, ClassId, DescriptorArena, Func, FuncId, GlobalId, StackVar,
    StackVarKind,
};
use crate::descriptors::class::TagAllocator;
use crate::error::{CodegenError, Result};
use crate::label::Label;
use crate::symtab::SymbolTable;
use crate::tree::{ClassMember, Declaration, FuncDef, Param, Program, VarDef};
use crate::types::ValueType;

/// The fully analyzed form of a program: a populated [`DescriptorArena`],
/// the global symbol table, and flat registration-ordered lists of every
/// class/function/global (built-ins first), ready for the data- and
/// text-section emitters (`spec.md` §4.6, §4.7).
#[derive(Debug)]
pub struct AnalyzedProgram {
    pub arena: DescriptorArena,
    pub global_symbols: SymbolTable<Binding>,
    /// Registration order: `object`, `int`, `bool`, `str`, `.list`, then
    /// user classes in source order.
    pub classes: Vec<ClassId>,
    /// Registration order: built-in functions and `object.__init__` first,
    /// then top-level functions, methods, and nested functions in the order
    /// analysis discovers them.
    pub functions: Vec<FuncId>,
    pub globals: Vec<GlobalId>,
    pub top_level_statements: Vec<crate::tree::Stmt>,
}

/// Runs the full analysis sequence of `spec.md` §4.5 over `program`.
pub fn analyze(program: &Program) -> Result<AnalyzedProgram> {
    let timer = crate::debug::PerfTimer::new("analysis");
    let mut a = Analyzer::new();
    a.register_builtins();
    a.run(program)?;
    crate::debug::log_analysis(&format!(
        "registered {} classes, {} functions, {} globals",
        a.classes.len(),
        a.functions.len(),
        a.globals.len()
    ));
    timer.finish();
    Ok(AnalyzedProgram {
        arena: a.arena,
        global_symbols: a.global_symbols,
        classes: a.classes,
        functions: a.functions,
        globals: a.globals,
        top_level_statements: program.statements.clone(),
    })
}

struct Analyzer {
    arena: DescriptorArena,
    global_symbols: SymbolTable<Binding>,
    tags: TagAllocator,
    classes: Vec<ClassId>,
    functions: Vec<FuncId>,
    globals: Vec<GlobalId>,
}

impl Analyzer {
    fn new() -> Self {
        Self {
            arena: DescriptorArena::new(),
            global_symbols: SymbolTable::root(),
            tags: TagAllocator::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Registers `object`, `int`, `bool`, `str`, the synthetic list class,
    /// the built-in functions `print`/`len`/`input`, and `object.__init__`,
    /// in that order, before any user declaration is analyzed (`spec.md`
    /// §4.5 final paragraph).
    fn register_builtins(&mut self) {
        let object_id = self.register_builtin_class("object", true);
        self.register_builtin_class("int", true);
        self.register_builtin_class("bool", true);
        self.register_builtin_class("str", true);
        self.register_builtin_class(".list", false);

        let init_id = self.register_builtin_function(
            "object.__init__",
            &[("self", ValueType::Object)],
            ValueType::None,
            "object_init",
        );
        self.arena.class_mut(object_id).add_method("__init__", init_id);

        self.register_builtin_function(
            "print",
            &[("arg", ValueType::Object)],
            ValueType::None,
            "print",
        );
        self.register_builtin_function("len", &[("arg", ValueType::Object)], ValueType::Int, "len");
        self.register_builtin_function("input", &[], ValueType::Str, "input");
    }

    fn register_builtin_class(&mut self, name: &str, has_dispatch_table: bool) -> ClassId {
        let tag = if has_dispatch_table {
            self.tags.next_tag()
        } else {
            TagAllocator::LIST_TAG
        };
        let class = Class::new(name, tag, has_dispatch_table);
        let id = self.arena.push_class(class);
        self.classes.push(id);
        self.global_symbols.put(name, Binding::Class(id));
        id
    }

    fn register_builtin_function(
        &mut self,
        fq_name: &str,
        params: &[(&str, ValueType)],
        return_type: ValueType,
        resource: &'static str,
    ) -> FuncId {
        let func = Func {
            fq_name: fq_name.to_string(),
            code_label: Label::function(fq_name),
            static_depth: 0,
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            statements: Vec::new(),
            symbols: SymbolTable::child_of(&self.global_symbols),
            parent: None,
            builtin: Some(resource),
        };
        let func_id = self.arena.push_func(func);
        self.functions.push(func_id);

        for (name, ty) in params {
            let var = StackVar {
                name: (*name).to_string(),
                var_type: ty.clone(),
                initial: None,
                owner: func_id,
                kind: StackVarKind::Param,
            };
            let var_id = self.arena.push_stack_var(var);
            self.arena.func_mut(func_id).params.push(var_id);
            self.arena
                .func_mut(func_id)
                .symbols
                .put((*name).to_string(), Binding::Stack(var_id));
        }

        // Top-level builtin functions (not `object.__init__`, which is
        // bound only as a method slot) are also reachable by plain name.
        if !fq_name.contains('.') {
            self.global_symbols.put(fq_name, Binding::Func(func_id));
        }
        func_id
    }

    fn run(&mut self, program: &Program) -> Result<()> {
        // Step 1: globals first.
        for var_def in &program.var_defs {
            self.register_global(var_def);
        }

        // Step 2: top-level classes and functions.
        for class_def in &program.class_defs {
            self.analyze_class(class_def)?;
        }
        for func_def in &program.func_defs {
            let func_id = self.analyze_function(func_def, None, "")?;
            self.global_symbols
                .put(func_def.name.clone(), Binding::Func(func_id));
        }

        Ok(())
    }

    fn register_global(&mut self, var_def: &VarDef) {
        let global = crate::descriptors::GlobalVar::new(
            var_def.name.clone(),
            var_def.var_type.clone(),
            var_def.value.clone(),
        );
        let id = self.arena.push_global(global);
        self.globals.push(id);
        self.global_symbols.put(var_def.name.clone(), Binding::Global(id));
    }

    fn analyze_class(&mut self, class_def: &crate::tree::ClassDef) -> Result<ClassId> {
        let super_id = self.arena.find_class(&class_def.super_name).ok_or_else(|| {
            CodegenError::unknown_superclass(class_def.name.clone(), class_def.super_name.clone())
        })?;

        // Tables start as copies of the super-class's (`spec.md` §4.5 step
        // 2); built locally, then pushed, so method overrides can use
        // `add_method` before the class has an id of its own.
        let mut class = self.arena.class(super_id).clone();
        class.name = class_def.name.clone();
        class.tag = self.tags.next_tag();
        class.prototype_label = Label::prototype(&class_def.name);
        class.dispatch_table_label = Some(Label::dispatch_table(&class_def.name));

        for member in &class_def.members {
            match member {
                ClassMember::Attr(attr_def) => {
                    class.add_attribute(AttrSlot {
                        name: attr_def.name.clone(),
                        attr_type: attr_def.var_type.clone(),
                        initial: attr_def.value.clone(),
                    });
                }
                ClassMember::Method(method_def) => {
                    let func_id =
                        self.analyze_function(method_def, None, &class_def.name)?;
                    class.add_method(method_def.name.clone(), func_id);
                }
            }
        }

        let class_id = self.arena.push_class(class);
        self.classes.push(class_id);
        self.global_symbols
            .put(class_def.name.clone(), Binding::Class(class_id));
        Ok(class_id)
    }

    /// Analyzes one function or method (`spec.md` §4.5 step 3). `parent` is
    /// the enclosing function for a nested function, `None` for a
    /// top-level function or a method. `qualifier` is the containing
    /// class's name for a method, empty for everything else — nested
    /// functions derive their own dotted prefix from `parent`, not from
    /// this argument.
    fn analyze_function(
        &mut self,
        func_def: &FuncDef,
        parent: Option<FuncId>,
        qualifier: &str,
    ) -> Result<FuncId> {
        let depth = match parent {
            Some(parent_id) => self.arena.func(parent_id).static_depth + 1,
            None => 0,
        };

        let fq_name = match parent {
            Some(parent_id) => format!("{}.{}", self.arena.func(parent_id).fq_name, func_def.name),
            None if qualifier.is_empty() => func_def.name.clone(),
            None => format!("{}.{}", qualifier, func_def.name),
        };

        // Step a: fresh table parented on the enclosing scope.
        let enclosing: &SymbolTable<Binding> = match parent {
            Some(parent_id) => &self.arena.func(parent_id).symbols,
            None => &self.global_symbols,
        };
        let symbols = SymbolTable::child_of(enclosing);

        let func = Func {
            fq_name: fq_name.clone(),
            code_label: Label::function(&fq_name),
            static_depth: depth,
            return_type: func_def.return_type.clone(),
            params: Vec::new(),
            locals: Vec::new(),
            statements: Vec::new(),
            symbols,
            parent,
            builtin: None,
        };
        let func_id = self.arena.push_func(func);
        self.functions.push(func_id);

        // Step b: parameters.
        for Param { name, param_type } in &func_def.params {
            self.declare_param(func_id, name, param_type.clone());
        }

        // Step c: local-declaration pass (vars, global, nonlocal).
        for decl in &func_def.declarations {
            match decl {
                Declaration::Var(var_def) => self.declare_local(func_id, var_def),
                Declaration::Global(name) => self.declare_global_capture(func_id, name)?,
                Declaration::Nonlocal(name) => self.validate_nonlocal(func_id, name)?,
                Declaration::Func(_) => {}
            }
        }

        // Step d: nested-function pass, after every local is in place.
        for decl in &func_def.declarations {
            if let Declaration::Func(nested_def) = decl {
                let nested_id = self.analyze_function(nested_def, Some(func_id), "")?;
                self.arena
                    .func_mut(func_id)
                    .symbols
                    .put(nested_def.name.clone(), Binding::Func(nested_id));
            }
        }

        // Step e: attach the body.
        self.arena.func_mut(func_id).statements = func_def.statements.clone();

        Ok(func_id)
    }

    fn declare_param(&mut self, func_id: FuncId, name: &str, var_type: ValueType) {
        let var = StackVar {
            name: name.to_string(),
            var_type,
            initial: None,
            owner: func_id,
            kind: StackVarKind::Param,
        };
        let var_id = self.arena.push_stack_var(var);
        self.arena.func_mut(func_id).params.push(var_id);
        self.arena
            .func_mut(func_id)
            .symbols
            .put(name.to_string(), Binding::Stack(var_id));
    }

    fn declare_local(&mut self, func_id: FuncId, var_def: &VarDef) {
        let var = StackVar {
            name: var_def.name.clone(),
            var_type: var_def.var_type.clone(),
            initial: Some(var_def.value.clone()),
            owner: func_id,
            kind: StackVarKind::Local,
        };
        let var_id = self.arena.push_stack_var(var);
        self.arena.func_mut(func_id).locals.push(var_id);
        self.arena
            .func_mut(func_id)
            .symbols
            .put(var_def.name.clone(), Binding::Stack(var_id));
    }

    /// A `global x` declaration binds `x` in the function's table to the
    /// `GlobalVar` from the enclosing global scope (`spec.md` §4.5 step
    /// 3c) — looked up in the root table, not the lexical parent chain, so
    /// it always names a module-level global regardless of nesting depth.
    fn declare_global_capture(&mut self, func_id: FuncId, name: &str) -> Result<()> {
        match self.global_symbols.get(name) {
            Some(binding @ Binding::Global(_)) => {
                self.arena.func_mut(func_id).symbols.put(name.to_string(), binding);
                Ok(())
            }
            _ => Err(CodegenError::undefined_name(name)),
        }
    }

    /// A `nonlocal x` declaration installs nothing; it only validates that
    /// `x` already resolves to a `StackVar` through the parent chain
    /// (`spec.md` §4.5 step 3c).
    fn validate_nonlocal(&self, func_id: FuncId, name: &str) -> Result<()> {
        let func = self.arena.func(func_id);
        let enclosing = match func.parent {
            Some(parent_id) => &self.arena.func(parent_id).symbols,
            None => &self.global_symbols,
        };
        match enclosing.get(name) {
            Some(Binding::Stack(_)) => Ok(()),
            _ => Err(CodegenError::invalid_nonlocal(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ClassDef, Expr, ExprKind, Stmt};

    fn lit_int(n: i32) -> VarDef {
        VarDef {
            name: "x".to_string(),
            var_type: ValueType::Int,
            value: Literal::Int(n),
        }
    }

    #[test]
    fn builtins_are_registered_in_fixed_order() {
        let program = Program::default();
        let analyzed = analyze(&program).unwrap();
        let names: Vec<&str> = analyzed
            .classes
            .iter()
            .map(|id| analyzed.arena.class(*id).name.as_str())
            .collect();
        assert_eq!(names, vec!["object", "int", "bool", "str", ".list"]);
        assert_eq!(analyzed.arena.class(analyzed.classes[0]).tag, 0);
        assert_eq!(analyzed.arena.class(analyzed.classes[1]).tag, 1);
        assert_eq!(analyzed.arena.class(analyzed.classes[4]).tag, -1);
    }

    #[test]
    fn object_init_is_a_builtin_method() {
        let program = Program::default();
        let analyzed = analyze(&program).unwrap();
        let object_id = analyzed.arena.find_class("object").unwrap();
        let object_class = analyzed.arena.class(object_id);
        let init_idx = object_class.method_index("__init__").unwrap();
        let init_id = object_class.methods[init_idx].func;
        assert_eq!(analyzed.arena.func(init_id).builtin, Some("object_init"));
    }

    #[test]
    fn global_declared_before_function_is_visible_to_global_capture() {
        let mut program = Program::default();
        program.var_defs.push(lit_int(5));
        program.func_defs.push(FuncDef {
            name: "bump".to_string(),
            params: vec![],
            return_type: ValueType::None,
            declarations: vec![Declaration::Global("x".to_string())],
            statements: vec![Stmt::Pass],
        });

        let analyzed = analyze(&program).unwrap();
        let func_id = *analyzed
            .functions
            .iter()
            .find(|id| analyzed.arena.func(**id).fq_name == "bump")
            .unwrap();
        let binding = analyzed.arena.func(func_id).symbols.get("x");
        assert!(matches!(binding, Some(Binding::Global(_))));
    }

    #[test]
    fn undeclared_global_capture_is_an_error() {
        let mut program = Program::default();
        program.func_defs.push(FuncDef {
            name: "bump".to_string(),
            params: vec![],
            return_type: ValueType::None,
            declarations: vec![Declaration::Global("missing".to_string())],
            statements: vec![Stmt::Pass],
        });
        assert!(analyze(&program).is_err());
    }

    #[test]
    fn nonlocal_without_enclosing_local_is_an_error() {
        let mut program = Program::default();
        program.func_defs.push(FuncDef {
            name: "outer".to_string(),
            params: vec![],
            return_type: ValueType::None,
            declarations: vec![Declaration::Func(FuncDef {
                name: "inner".to_string(),
                params: vec![],
                return_type: ValueType::None,
                declarations: vec![Declaration::Nonlocal("missing".to_string())],
                statements: vec![Stmt::Pass],
            })],
            statements: vec![Stmt::Pass],
        });
        assert!(analyze(&program).is_err());
    }

    #[test]
    fn nested_function_sees_enclosing_locals_regardless_of_textual_order() {
        let mut program = Program::default();
        program.func_defs.push(FuncDef {
            name: "outer".to_string(),
            params: vec![],
            return_type: ValueType::None,
            declarations: vec![
                Declaration::Func(FuncDef {
                    name: "inner".to_string(),
                    params: vec![],
                    return_type: ValueType::None,
                    declarations: vec![Declaration::Nonlocal("y".to_string())],
                    statements: vec![Stmt::Pass],
                }),
                Declaration::Var(VarDef {
                    name: "y".to_string(),
                    var_type: ValueType::Int,
                    value: Literal::Int(0),
                }),
            ],
            statements: vec![Stmt::Pass],
        });
        assert!(analyze(&program).is_ok());
    }

    #[test]
    fn subclass_inherits_and_overrides_in_place() {
        let mut program = Program::default();
        program.class_defs.push(ClassDef {
            name: "A".to_string(),
            super_name: "object".to_string(),
            members: vec![ClassMember::Method(FuncDef {
                name: "f".to_string(),
                params: vec![Param {
                    name: "self".to_string(),
                    param_type: ValueType::class("A"),
                }],
                return_type: ValueType::Int,
                declarations: vec![],
                statements: vec![Stmt::Return(Some(Expr::new(
                    ExprKind::IntLiteral(1),
                    ValueType::Int,
                )))],
            })],
        });
        program.class_defs.push(ClassDef {
            name: "B".to_string(),
            super_name: "A".to_string(),
            members: vec![ClassMember::Method(FuncDef {
                name: "f".to_string(),
                params: vec![Param {
                    name: "self".to_string(),
                    param_type: ValueType::class("B"),
                }],
                return_type: ValueType::Int,
                declarations: vec![],
                statements: vec![Stmt::Return(Some(Expr::new(
                    ExprKind::IntLiteral(2),
                    ValueType::Int,
                )))],
            })],
        });

        let analyzed = analyze(&program).unwrap();
        let a_id = analyzed.arena.find_class("A").unwrap();
        let b_id = analyzed.arena.find_class("B").unwrap();
        let a_idx = analyzed.arena.class(a_id).method_index("f").unwrap();
        let b_idx = analyzed.arena.class(b_id).method_index("f").unwrap();
        assert_eq!(a_idx, b_idx);
        assert_ne!(
            analyzed.arena.class(a_id).methods[a_idx].func,
            analyzed.arena.class(b_id).methods[b_idx].func
        );
    }

    #[test]
    fn unknown_superclass_is_an_error() {
        let mut program = Program::default();
        program.class_defs.push(ClassDef {
            name: "A".to_string(),
            super_name: "NoSuchClass".to_string(),
            members: vec![],
        });
        assert!(analyze(&program).is_err());
    }
}
