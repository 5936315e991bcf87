//! # Data-Section Emitter (C7)
//!
//! Emits prototypes, dispatch tables, global variables, symbolic constants,
//! and — at the very end of compilation — the interned constant pool, all
//! into the `.data` section (`spec.md` §4.6, §4.9).

use super::CodeGenContext;
use crate::config::BackendConfig;
use crate::constpool::Literal;
use crate::descriptors::{ClassId, GlobalId};
use crate::error::Result;
use crate::label::Label;

/// Bytes reserved for the scratch buffer `input()` reads a line into.
const INPUT_BUFFER_BYTES: i64 = 256;

/// Emits the fixed vocabulary of symbolic constants the runtime library and
/// the pluggable emitter rely on (`spec.md` §4.8): syscall numbers, error
/// codes, and the header/attribute offset constants. Also reserves the
/// scratch buffer `input()` uses, since a label is the only way this sink
/// can hand out an address (`.equiv` only carries numeric values).
///
/// Defined once, at the very start of the data section, per `spec.md` §4.8
/// ("defined once in the data section preamble").
pub fn emit_symbolic_constants(ctx: &mut CodeGenContext, classes: &[ClassId]) {
    ctx.sink.start_data_section();

    // Syscall numbers (ecall service codes), arbitrary but fixed for this
    // backend — never observed by any emitter logic, only threaded through
    // to the runtime fragments that issue them.
    ctx.sink.equiv("sbrk", 9);
    ctx.sink.equiv("print_int", 1);
    ctx.sink.equiv("print_string", 4);
    ctx.sink.equiv("read_line", 8);
    ctx.sink.equiv("exit2", 17);

    // Error codes (`spec.md` §3).
    ctx.sink.equiv("error_argument", 1);
    ctx.sink.equiv("error_div_zero", 2);
    ctx.sink.equiv("error_out_of_bounds", 3);
    ctx.sink.equiv("error_none", 4);
    ctx.sink.equiv("error_out_of_memory", 5);
    ctx.sink.equiv("error_not_implemented", 6);

    // Header/attribute offsets (`spec.md` §6, §4.8).
    let word_size = i64::from(ctx.config.word_size);
    ctx.sink.equiv("word_size", word_size);
    ctx.sink.equiv("header_bytes", ctx.attr_offset(0));
    ctx.sink.equiv(".__object_size__", ctx.header_size_offset());
    ctx.sink.equiv(".__dispatch__", ctx.header_dispatch_offset());
    ctx.sink.equiv(".__int__", ctx.attr_offset(0));
    ctx.sink.equiv(".__str__", ctx.attr_offset(1));
    ctx.sink.equiv(".__elts__", ctx.attr_offset(1));

    // Type tags of the three special built-in types, looked up by name so
    // this stays correct even if registration order ever changes.
    for name in ["int", "bool", "str"] {
        if let Some(id) = classes.iter().find(|id| ctx.arena.class(**id).name == name) {
            ctx.sink
                .equiv(&format!("tag_{}", name), i64::from(ctx.arena.class(*id).tag));
        }
    }

    ctx.sink.equiv("input_buffer_size", INPUT_BUFFER_BYTES);
    let buffer_label = Label::raw("$input_buffer");
    ctx.sink.align(2);
    // Label definitions here are unchecked against the sink's duplicate
    // guard deliberately: `local_label` already enforces at-most-once, so
    // a second call to `emit_symbolic_constants` would correctly fail.
    let _ = ctx.sink.local_label(&buffer_label);
    for _ in 0..(INPUT_BUFFER_BYTES / word_size) {
        ctx.sink.word(0);
    }
}

/// Emits one prototype object per registered class, in registration order
/// — built-ins first (`spec.md` §4.6 step 1).
pub fn emit_prototypes(ctx: &mut CodeGenContext, classes: &[ClassId]) -> Result<()> {
    crate::debug::log_data_section(&format!("emitting {} prototypes", classes.len()));
    for &class_id in classes {
        let class = ctx.arena.class(class_id).clone();
        let label = class.prototype_label.clone();
        ctx.sink.global_label(&label)?;
        ctx.sink.word(i64::from(class.tag));
        ctx.sink
            .word(i64::from(class.prototype_size_words(BackendConfig::HEADER_WORDS)));
        ctx.sink
            .word_address(class.dispatch_table_label.as_ref());
        for attr in &class.attrs {
            emit_initial_value(ctx, &attr.attr_type, &attr.initial);
        }
        ctx.sink.align(2);
    }
    Ok(())
}

/// Emits one dispatch table per class that has one, in method-table order
/// (`spec.md` §4.6 step 2).
pub fn emit_dispatch_tables(ctx: &mut CodeGenContext, classes: &[ClassId]) -> Result<()> {
    for &class_id in classes {
        let class = ctx.arena.class(class_id).clone();
        let Some(table_label) = class.dispatch_table_label.clone() else {
            continue;
        };
        ctx.sink.global_label(&table_label)?;
        for slot in &class.methods {
            let code_label = ctx.arena.func(slot.func).code_label.clone();
            ctx.sink.word_address(Some(&code_label));
        }
        ctx.sink.align(2);
    }
    Ok(())
}

/// Emits one global label plus one initial-value word per global variable,
/// in registration order (`spec.md` §4.6 step 3).
pub fn emit_globals(ctx: &mut CodeGenContext, globals: &[GlobalId]) -> Result<()> {
    for &global_id in globals {
        let global = ctx.arena.global(global_id).clone();
        ctx.sink.global_label(&global.label)?;
        emit_initial_value(ctx, &global.var_type, &global.initial);
    }
    Ok(())
}

/// Emits the initial-value word for an attribute or global: the raw
/// numeric encoding for `int`/`bool`, a constant-pool label for `str`, and
/// a null address for `None` of non-special type (`spec.md` §4.6, §9
/// "Initial-value emission for `None` of non-special type").
fn emit_initial_value(ctx: &mut CodeGenContext, ty: &crate::types::ValueType, initial: &Literal) {
    use crate::types::ValueType;
    match (ty, initial) {
        (ValueType::Int, Literal::Int(n)) => {
            ctx.sink.word(i64::from(*n));
        }
        (ValueType::Bool, Literal::Bool(b)) => {
            ctx.sink.word(i64::from(*b));
        }
        _ => {
            let label = ctx.pool.label_for(initial);
            ctx.sink.word_address(label.as_ref());
        }
    }
}

/// Emits the trailing constant pool: `False`/`True` as boxed booleans at
/// their fixed labels, then every interned string, then every interned
/// integer, each in insertion order (`spec.md` §4.9).
pub fn emit_constant_pool(ctx: &mut CodeGenContext) -> Result<()> {
    ctx.sink.start_data_section();
    emit_boxed_bool(ctx, false)?;
    emit_boxed_bool(ctx, true)?;

    let strings: Vec<(String, Label)> = ctx
        .pool
        .strings_in_order()
        .map(|(s, l)| (s.to_string(), l.clone()))
        .collect();
    let (str_tag, str_dispatch) = class_tag_and_dispatch(ctx, "str", 3);
    for (value, label) in strings {
        emit_boxed_string(ctx, &label, &value, str_tag, str_dispatch.as_ref())?;
    }

    let ints: Vec<(i32, Label)> = ctx
        .pool
        .ints_in_order()
        .map(|(n, l)| (*n, l.clone()))
        .collect();
    let (int_tag, int_dispatch) = class_tag_and_dispatch(ctx, "int", 1);
    let header_words = BackendConfig::HEADER_WORDS;
    for (value, label) in ints {
        ctx.sink.global_label(&label)?;
        ctx.sink.word(i64::from(int_tag));
        ctx.sink.word(i64::from(header_words) + 1);
        ctx.sink.word_address(int_dispatch.as_ref());
        ctx.sink.word(i64::from(value));
    }

    Ok(())
}

/// A boxed constant is an ordinary instance of a non-list built-in class
/// (`spec.md` §3), so its header's dispatch-table word must match that
/// class's own prototype — never the zero reserved for the list class
/// (`spec.md` §3 "may be zero for lists").
fn class_tag_and_dispatch(
    ctx: &CodeGenContext,
    class_name: &str,
    default_tag: i32,
) -> (i32, Option<Label>) {
    match ctx.arena.find_class(class_name) {
        Some(id) => {
            let class = ctx.arena.class(id);
            (class.tag, class.dispatch_table_label.clone())
        }
        None => (default_tag, None),
    }
}

fn emit_boxed_bool(ctx: &mut CodeGenContext, value: bool) -> Result<()> {
    let (tag, dispatch) = class_tag_and_dispatch(ctx, "bool", 2);
    let label = if value {
        ctx.pool.true_label().clone()
    } else {
        ctx.pool.false_label().clone()
    };
    ctx.sink.global_label(&label)?;
    ctx.sink.word(i64::from(tag));
    ctx.sink.word(i64::from(BackendConfig::HEADER_WORDS) + 1);
    ctx.sink.word_address(dispatch.as_ref());
    ctx.sink.word(i64::from(value));
    Ok(())
}

fn emit_boxed_string(
    ctx: &mut CodeGenContext,
    label: &Label,
    value: &str,
    tag: i32,
    dispatch: Option<&Label>,
) -> Result<()> {
    let header_words = BackendConfig::HEADER_WORDS;
    let payload_words = (value.len() as u32 + 1).div_ceil(4).max(1);
    ctx.sink.global_label(label)?;
    ctx.sink.word(i64::from(tag));
    ctx.sink
        .word(i64::from(header_words) + 1 + i64::from(payload_words));
    ctx.sink.word_address(dispatch);
    ctx.sink.word(value.chars().count() as i64);
    ctx.sink.asciiz(value);
    ctx.sink.align(2);
    Ok(())
}
