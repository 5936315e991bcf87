//! # Text-Section Driver (C8)
//!
//! Emits `.text`, the `main` entry point and heap preamble, delegates to
//! the pluggable emitter (C10) for top-level statements and every function
//! body, binds in the runtime library (C9), and finally re-enters the data
//! section for the constant pool (`spec.md` §4.7).

use super::runtime;
use super::{data_section, CodeEmitter, CodeGenContext};
use crate::descriptors::FuncId;
use crate::error::Result;
use crate::label::Label;
use crate::tree::Stmt;

/// Callee-saved register holding the heap size, in bytes, while `heap.init`
/// is requesting it from the OS.
const HEAP_SIZE_REGISTER: &str = "s1";

/// Runs the full C8 sequence (`spec.md` §4.7): entry preamble, top-level
/// statements, function bodies, standard runtime routines, custom code,
/// trailing constant pool.
pub fn emit(
    ctx: &mut CodeGenContext,
    functions: &[FuncId],
    top_level: &[Stmt],
    emitter: &mut dyn CodeEmitter,
) -> Result<()> {
    let timer = crate::debug::PerfTimer::new("text section");
    crate::debug::log_text_section(&format!(
        "emitting {} functions, {} top-level statements",
        functions.len(),
        top_level.len()
    ));
    ctx.sink.start_text_section();
    let main_label = Label::raw("main");
    ctx.sink.global_label(&main_label)?;

    ctx.sink.comment("entry preamble: request the heap, clear the caller frame");
    let heap_bytes = ctx.config.heap_bytes() as i64;
    ctx.sink.li(HEAP_SIZE_REGISTER, heap_bytes);
    ctx.sink.mv("a0", HEAP_SIZE_REGISTER);
    ctx.sink.jal(&Label::raw("heap.init"));
    ctx.sink.li("fp", 0);
    ctx.sink.li("ra", 0);

    emitter.emit_top_level(top_level, ctx)?;

    for &func_id in functions {
        match ctx.arena.func(func_id).builtin {
            Some(resource_name) => runtime::bind(ctx, resource_name)?,
            None => emitter.emit_body(func_id, ctx)?,
        }
    }

    runtime::bind_standard_routines(ctx)?;

    emitter.emit_custom(ctx)?;

    // Constants are discovered while emitting bodies and runtime routines
    // (e.g. every `STRING[...]` rewrite interns a string), so this must
    // run last (`spec.md` §4.7 step 8).
    data_section::emit_constant_pool(ctx)?;

    timer.finish();
    Ok(())
}
