//! # Runtime-Library Binder (C9)
//!
//! Reads named assembly fragments from an embedded resource store and
//! rewrites their `STRING["..."]` placeholders against the constant pool
//! before the fragment is dropped into the text section verbatim
//! (`spec.md` §4.8).

use super::CodeGenContext;
use crate::error::{CodegenError, Result};
use std::collections::HashMap;
use std::sync::LazyLock;

/// The four standard routines every compiled program links against,
/// appended verbatim (after placeholder rewriting) near the end of the
/// text section (`spec.md` §4.7 step 7).
pub const STANDARD_ROUTINES: &[&str] = &["alloc", "alloc2", "abort", "heap.init"];

static RESOURCES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("alloc", include_str!("../../runtime/alloc.s"));
    m.insert("alloc2", include_str!("../../runtime/alloc2.s"));
    m.insert("abort", include_str!("../../runtime/abort.s"));
    m.insert("heap.init", include_str!("../../runtime/heap_init.s"));
    m.insert("print", include_str!("../../runtime/print.s"));
    m.insert("len", include_str!("../../runtime/len.s"));
    m.insert("input", include_str!("../../runtime/input.s"));
    m.insert("object_init", include_str!("../../runtime/object_init.s"));
    m
});

/// Looks up a named fragment in the resource store. A missing resource is
/// fatal (`spec.md` §6, §7).
fn resource(name: &str) -> Result<&'static str> {
    RESOURCES
        .get(name)
        .copied()
        .ok_or_else(|| CodegenError::missing_resource(name))
}

/// Binds and appends the named fragment: rewrites every `STRING["..."]`
/// placeholder against `ctx.pool`, then appends the result verbatim.
pub fn bind(ctx: &mut CodeGenContext, name: &str) -> Result<()> {
    crate::debug::log_runtime(&format!("binding resource '{}'", name));
    let fragment = resource(name)?;
    let rewritten = rewrite_placeholders(ctx, fragment);
    ctx.sink.append_raw(&rewritten);
    Ok(())
}

/// Appends the four standard runtime routines, in a fixed order, each
/// after placeholder rewriting (`spec.md` §4.7 step 7).
pub fn bind_standard_routines(ctx: &mut CodeGenContext) -> Result<()> {
    for name in STANDARD_ROUTINES {
        bind(ctx, name)?;
    }
    Ok(())
}

/// Rewrites every `STRING["..."]` occurrence in `fragment` with the label
/// of the corresponding interned string, interning it if this is the first
/// occurrence. The replacement is length-preserving: the label is
/// right-padded with spaces to the exact width of the placeholder it
/// replaced, so hand-written column alignment survives (`spec.md` §4.8,
/// scenario S6).
fn rewrite_placeholders(ctx: &mut CodeGenContext, fragment: &str) -> String {
    const OPEN: &str = "STRING[\"";
    const CLOSE: &str = "\"]";

    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    loop {
        match rest.find(OPEN) {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => {
                out.push_str(&rest[..start]);
                let after_open = &rest[start + OPEN.len()..];
                match after_open.find(CLOSE) {
                    None => {
                        // Unterminated placeholder: not our problem to fix up,
                        // emit the rest verbatim.
                        out.push_str(&rest[start..]);
                        break;
                    }
                    Some(content_len) => {
                        let content = &after_open[..content_len];
                        let placeholder_width =
                            OPEN.len() + content.chars().count() + CLOSE.len();
                        let label = ctx.pool.intern_str(content);
                        out.push_str(&pad_to_width(label.as_str(), placeholder_width));
                        rest = &after_open[content_len + CLOSE.len()..];
                    }
                }
            }
        }
    }
    out
}

fn pad_to_width(label: &str, width: usize) -> String {
    let mut padded = label.to_string();
    let label_width = label.chars().count();
    if label_width < width {
        padded.extend(std::iter::repeat_n(' ', width - label_width));
    }
    padded
}
