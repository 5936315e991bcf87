//! # Code Generation Driver (C7 + C8 + C9 + C10)
//!
//! Ties the populated descriptor model to the assembly sink and drives the
//! whole emission pipeline: data section, text section, runtime binding,
//! and the pluggable per-body emitter (`spec.md` §2 data-flow diagram,
//! §4.6–§4.10).

pub mod data_section;
pub mod runtime;
pub mod text_section;

use crate::analysis::AnalyzedProgram;
use crate::config::BackendConfig;
use crate::constpool::ConstantPool;
use crate::descriptors::{ClassId, DescriptorArena, FuncId};
use crate::error::{CodegenError, Result};
use crate::label::LabelCounter;
use crate::sink::AssemblySink;
use crate::tree::Stmt;

/// Everything a `CodeEmitter` or an internal emitter function needs: the
/// descriptor arena, the constant pool, the label minter, the backend
/// configuration, and the assembly sink they all append to. Owned by one
/// struct rather than passed as five separate parameters, per the
/// "Global-ish state" design note (`spec.md` §9) — logically per-compilation
/// state, never a process-wide singleton.
pub struct CodeGenContext {
    pub arena: DescriptorArena,
    pub pool: ConstantPool,
    pub sink: AssemblySink,
    pub labels: LabelCounter,
    pub config: BackendConfig,
}

impl CodeGenContext {
    pub fn new(arena: DescriptorArena, config: BackendConfig) -> Self {
        Self {
            arena,
            pool: ConstantPool::new(),
            sink: AssemblySink::new(),
            labels: LabelCounter::new(),
            config,
        }
    }

    /// Byte offset of attribute slot `index` from an object's base address:
    /// `word_size * (header_words + index)` (`spec.md` §6).
    pub fn attr_offset(&self, index: usize) -> i64 {
        i64::from(self.config.word_size) * (i64::from(BackendConfig::HEADER_WORDS) + index as i64)
    }

    /// Byte offset of method slot `index` into a dispatch table:
    /// `word_size * index` (`spec.md` §6).
    pub fn method_offset(&self, index: usize) -> i64 {
        i64::from(self.config.word_size) * index as i64
    }

    /// Byte offset of attribute `name` on `class_id`, resolved by name
    /// rather than by an already-known index. The `CodeEmitter` consumer
    /// this offset arithmetic exists for (`spec.md` §4.10) names attributes,
    /// not slots, so this is the entry point it actually calls; a missing
    /// attribute is the one case in `Class::attribute_index`'s contract
    /// (`spec.md` §4.3) that a caller outside this crate can hit without it
    /// being a bug in this crate (`spec.md` §7: "caller asserts
    /// non-negative").
    pub fn attr_offset_by_name(&self, class_id: ClassId, name: &str) -> Result<i64> {
        let class = self.arena.class(class_id);
        class
            .attribute_index(name)
            .map(|i| self.attr_offset(i))
            .ok_or_else(|| CodegenError::no_such_attribute(class.name.clone(), name))
    }

    /// Byte offset of method `name` into `class_id`'s dispatch table,
    /// resolved by name. See [`CodeGenContext::attr_offset_by_name`].
    pub fn method_offset_by_name(&self, class_id: ClassId, name: &str) -> Result<i64> {
        let class = self.arena.class(class_id);
        class
            .method_index(name)
            .map(|i| self.method_offset(i))
            .ok_or_else(|| CodegenError::no_such_method(class.name.clone(), name))
    }

    /// Byte offset of the type-tag header word: always 0.
    pub fn header_tag_offset(&self) -> i64 {
        0
    }

    /// Byte offset of the object-size header word.
    pub fn header_size_offset(&self) -> i64 {
        i64::from(self.config.word_size)
    }

    /// Byte offset of the dispatch-table-pointer header word.
    pub fn header_dispatch_offset(&self) -> i64 {
        2 * i64::from(self.config.word_size)
    }
}

/// The abstract surface the core requires from any instruction-selection
/// consumer (`spec.md` §4.10, §9 "Pluggable emitters"). The core never
/// inspects what an implementation emits — it only supplies descriptors,
/// label minting, offset arithmetic, and the sink.
pub trait CodeEmitter {
    /// Emits the body of function `func_id`. Pre-condition: the function's
    /// symbol table, parameters, locals, statements, and code label are
    /// all set. Post-condition: text is appended — including the code
    /// label's own definition — that, entered via a target-ABI-compliant
    /// call, executes the function's statements and returns.
    fn emit_body(&mut self, func_id: FuncId, ctx: &mut CodeGenContext) -> Result<()>;

    /// Emits the program's top-level statement list, appended immediately
    /// after the entry preamble.
    fn emit_top_level(&mut self, statements: &[Stmt], ctx: &mut CodeGenContext) -> Result<()>;

    /// A hook for additional helper routines jumped to from emitted
    /// bodies. Most consumers leave this empty.
    fn emit_custom(&mut self, ctx: &mut CodeGenContext) -> Result<()>;
}

/// A `CodeEmitter` that emits nothing beyond a bare `ret` for every body —
/// enough to satisfy C10's contract with no instruction-selection logic at
/// all. Exists for exercising C7/C8/C9 in isolation; not meant for
/// producing runnable programs.
#[derive(Debug, Default)]
pub struct NullEmitter;

impl CodeEmitter for NullEmitter {
    fn emit_body(&mut self, func_id: FuncId, ctx: &mut CodeGenContext) -> Result<()> {
        let label = ctx.arena.func(func_id).code_label.clone();
        ctx.sink.global_label(&label)?;
        ctx.sink.ret();
        Ok(())
    }

    fn emit_top_level(&mut self, _statements: &[Stmt], _ctx: &mut CodeGenContext) -> Result<()> {
        Ok(())
    }

    fn emit_custom(&mut self, _ctx: &mut CodeGenContext) -> Result<()> {
        Ok(())
    }
}

/// Runs the full C7 → C8 → C9 pipeline over an already-analyzed program,
/// producing the final assembly text (`spec.md` §2 data-flow diagram).
pub fn generate(
    analyzed: AnalyzedProgram,
    config: BackendConfig,
    emitter: &mut dyn CodeEmitter,
) -> Result<String> {
    let mut ctx = CodeGenContext::new(analyzed.arena, config);

    data_section::emit_symbolic_constants(&mut ctx, &analyzed.classes);
    data_section::emit_prototypes(&mut ctx, &analyzed.classes)?;
    data_section::emit_dispatch_tables(&mut ctx, &analyzed.classes)?;
    data_section::emit_globals(&mut ctx, &analyzed.globals)?;

    text_section::emit(
        &mut ctx,
        &analyzed.functions,
        &analyzed.top_level_statements,
        emitter,
    )?;

    Ok(ctx.sink.into_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    #[test]
    fn attr_offset_by_name_matches_index_based_offset() {
        let program = class_with_one_attr_and_method();
        let analyzed = analyze(&program).unwrap();
        let ctx = CodeGenContext::new(analyzed.arena, BackendConfig::rv32());
        let class_id = ctx.arena.find_class("Point").unwrap();
        let by_index = ctx.attr_offset(0);
        let by_name = ctx.attr_offset_by_name(class_id, "x").unwrap();
        assert_eq!(by_index, by_name);
    }

    #[test]
    fn attr_offset_by_name_reports_missing_attribute() {
        let program = class_with_one_attr_and_method();
        let analyzed = analyze(&program).unwrap();
        let ctx = CodeGenContext::new(analyzed.arena, BackendConfig::rv32());
        let class_id = ctx.arena.find_class("Point").unwrap();
        assert!(matches!(
            ctx.attr_offset_by_name(class_id, "nope"),
            Err(CodegenError::NoSuchMember { .. })
        ));
    }

    #[test]
    fn method_offset_by_name_matches_index_based_offset() {
        let program = class_with_one_attr_and_method();
        let analyzed = analyze(&program).unwrap();
        let ctx = CodeGenContext::new(analyzed.arena, BackendConfig::rv32());
        let class_id = ctx.arena.find_class("Point").unwrap();
        let slot = ctx.arena.class(class_id).method_index("reset").unwrap();
        assert_eq!(
            ctx.method_offset_by_name(class_id, "reset").unwrap(),
            ctx.method_offset(slot)
        );
    }

    #[test]
    fn method_offset_by_name_reports_missing_method() {
        let program = class_with_one_attr_and_method();
        let analyzed = analyze(&program).unwrap();
        let ctx = CodeGenContext::new(analyzed.arena, BackendConfig::rv32());
        let class_id = ctx.arena.find_class("Point").unwrap();
        assert!(matches!(
            ctx.method_offset_by_name(class_id, "nope"),
            Err(CodegenError::NoSuchMember { .. })
        ));
    }

    fn class_with_one_attr_and_method() -> crate::tree::Program {
        use crate::constpool::Literal;
        use crate::tree::{ClassDef, ClassMember, FuncDef, Param, Program, Stmt, VarDef};
        use crate::types::ValueType;

        let mut program = Program::default();
        program.class_defs.push(ClassDef {
            name: "Point".to_string(),
            super_name: "object".to_string(),
            members: vec![
                ClassMember::Attr(VarDef {
                    name: "x".to_string(),
                    var_type: ValueType::Int,
                    value: Literal::Int(0),
                }),
                ClassMember::Method(FuncDef {
                    name: "reset".to_string(),
                    params: vec![Param {
                        name: "self".to_string(),
                        param_type: ValueType::class("Point"),
                    }],
                    return_type: ValueType::None,
                    declarations: vec![],
                    statements: vec![Stmt::Pass],
                }),
            ],
        });
        program
    }
}
