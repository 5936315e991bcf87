//! # Assembly Sink (C1)
//!
//! An append-only buffer of RISC-V assembly text plus the formatting
//! primitives every emitter in this crate builds on: directives, data
//! literals, and instruction mnemonics. The sink performs no semantic
//! checking of operands — an invalid instruction sequence is an upstream
//! bug, not something this layer can catch (`spec.md` §4.1).

use crate::label::Label;
use std::collections::HashSet;
use std::fmt::Write as _;

/// Appendable buffer of RISC-V assembly text.
///
/// Every method appends to the end of the buffer; there is no random-access
/// mutation, matching the "text output is append-only" invariant of
/// `spec.md` §4.1. Label uniqueness is enforced at the point of definition.
#[derive(Debug, Default)]
pub struct AssemblySink {
    text: String,
    defined_labels: HashSet<String>,
}

impl AssemblySink {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            defined_labels: HashSet::new(),
        }
    }

    /// The accumulated assembly text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Borrowed view of the accumulated text (used by tests).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Appends raw text verbatim, with no added newline. Used for dropping
    /// runtime-library fragments in whole (`spec.md` §4.8) and for any text
    /// an upstream emitter has already formatted itself.
    pub fn append_raw(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Appends a single-line comment. No `#` is emitted when `text` is
    /// empty, so callers can pass an optional comment without branching
    /// (`spec.md` §4.1 "tolerate null").
    pub fn comment(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            let _ = writeln!(self.text, "    # {}", text);
        }
        self
    }

    /// `.equiv @name, value` — defines a symbolic constant.
    pub fn equiv(&mut self, name: &str, value: i64) -> &mut Self {
        let _ = writeln!(self.text, ".equiv @{}, {}", name, value);
        self
    }

    /// `.data`
    pub fn start_data_section(&mut self) -> &mut Self {
        self.text.push_str(".data\n");
        self
    }

    /// `.text`
    pub fn start_text_section(&mut self) -> &mut Self {
        self.text.push_str(".text\n");
        self
    }

    /// Emits a global label definition, e.g. `.globl main` followed by
    /// `main:`. Fails if the label has already been defined once
    /// (`spec.md` §4.1, invariant 4 of §8).
    pub fn global_label(&mut self, label: &Label) -> crate::error::Result<&mut Self> {
        self.define_label_checked(label)?;
        let _ = writeln!(self.text, ".globl {}", label);
        let _ = writeln!(self.text, "{}:", label);
        Ok(self)
    }

    /// Emits a label definition without a `.globl` directive (used for
    /// internal/local labels such as `label_<n>`). Still enforces the
    /// at-most-once invariant.
    pub fn local_label(&mut self, label: &Label) -> crate::error::Result<&mut Self> {
        self.define_label_checked(label)?;
        let _ = writeln!(self.text, "{}:", label);
        Ok(self)
    }

    fn define_label_checked(&mut self, label: &Label) -> crate::error::Result<()> {
        if !self.defined_labels.insert(label.as_str().to_string()) {
            return Err(crate::error::CodegenError::DuplicateLabel(
                label.as_str().to_string(),
            ));
        }
        Ok(())
    }

    /// `.word <n>` — one word literal per call.
    pub fn word(&mut self, value: i64) -> &mut Self {
        let _ = writeln!(self.text, "    .word {}", value);
        self
    }

    /// `.word <label>` or `.word 0` when `label` is `None` (a null address,
    /// per `spec.md` §4.6's initial-value rule for `None`).
    pub fn word_address(&mut self, label: Option<&Label>) -> &mut Self {
        match label {
            Some(l) => {
                let _ = writeln!(self.text, "    .word {}", l);
            }
            None => {
                let _ = writeln!(self.text, "    .word 0");
            }
        }
        self
    }

    /// `.align <pow2>`
    pub fn align(&mut self, pow2: u32) -> &mut Self {
        let _ = writeln!(self.text, "    .align {}", pow2);
        self
    }

    /// Emits a null-terminated ASCII string literal with standard escaping.
    pub fn asciiz(&mut self, s: &str) -> &mut Self {
        let mut escaped = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                '\t' => escaped.push_str("\\t"),
                other => escaped.push(other),
            }
        }
        let _ = writeln!(self.text, "    .asciiz \"{}\"", escaped);
        self
    }

    // ---- Instruction helpers -------------------------------------------
    //
    // All take already-formatted operand strings ("a0", "16(sp)", a `Label`'s
    // Display impl, ...). The sink does not validate register names or
    // offsets; that is the caller's responsibility (§4.1).

    fn emit1(&mut self, mnemonic: &str, a: &str) -> &mut Self {
        let _ = writeln!(self.text, "    {} {}", mnemonic, a);
        self
    }

    fn emit2(&mut self, mnemonic: &str, a: &str, b: &str) -> &mut Self {
        let _ = writeln!(self.text, "    {} {}, {}", mnemonic, a, b);
        self
    }

    fn emit3(&mut self, mnemonic: &str, a: &str, b: &str, c: &str) -> &mut Self {
        let _ = writeln!(self.text, "    {} {}, {}, {}", mnemonic, a, b, c);
        self
    }

    pub fn li(&mut self, rd: &str, imm: i64) -> &mut Self {
        let _ = writeln!(self.text, "    li {}, {}", rd, imm);
        self
    }

    pub fn la(&mut self, rd: &str, label: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    la {}, {}", rd, label);
        self
    }

    pub fn lui(&mut self, rd: &str, imm: i64) -> &mut Self {
        let _ = writeln!(self.text, "    lui {}, {}", rd, imm);
        self
    }

    pub fn mv(&mut self, rd: &str, rs: &str) -> &mut Self {
        self.emit2("mv", rd, rs)
    }

    pub fn add(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("add", rd, rs1, rs2)
    }

    pub fn addi(&mut self, rd: &str, rs1: &str, imm: i64) -> &mut Self {
        let _ = writeln!(self.text, "    addi {}, {}, {}", rd, rs1, imm);
        self
    }

    pub fn sub(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("sub", rd, rs1, rs2)
    }

    pub fn mul(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("mul", rd, rs1, rs2)
    }

    pub fn div(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("div", rd, rs1, rs2)
    }

    pub fn rem(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("rem", rd, rs1, rs2)
    }

    pub fn and(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("and", rd, rs1, rs2)
    }

    pub fn or(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("or", rd, rs1, rs2)
    }

    pub fn xor(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("xor", rd, rs1, rs2)
    }

    pub fn sll(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("sll", rd, rs1, rs2)
    }

    pub fn srl(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("srl", rd, rs1, rs2)
    }

    pub fn sra(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("sra", rd, rs1, rs2)
    }

    pub fn seqz(&mut self, rd: &str, rs: &str) -> &mut Self {
        self.emit2("seqz", rd, rs)
    }

    pub fn snez(&mut self, rd: &str, rs: &str) -> &mut Self {
        self.emit2("snez", rd, rs)
    }

    pub fn slt(&mut self, rd: &str, rs1: &str, rs2: &str) -> &mut Self {
        self.emit3("slt", rd, rs1, rs2)
    }

    pub fn lw(&mut self, rd: &str, mem: &str) -> &mut Self {
        self.emit2("lw", rd, mem)
    }

    pub fn sw(&mut self, rs: &str, mem: &str) -> &mut Self {
        self.emit2("sw", rs, mem)
    }

    pub fn lb(&mut self, rd: &str, mem: &str) -> &mut Self {
        self.emit2("lb", rd, mem)
    }

    pub fn lbu(&mut self, rd: &str, mem: &str) -> &mut Self {
        self.emit2("lbu", rd, mem)
    }

    pub fn sb(&mut self, rs: &str, mem: &str) -> &mut Self {
        self.emit2("sb", rs, mem)
    }

    pub fn beq(&mut self, rs1: &str, rs2: &str, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    beq {}, {}, {}", rs1, rs2, target);
        self
    }

    pub fn bne(&mut self, rs1: &str, rs2: &str, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    bne {}, {}, {}", rs1, rs2, target);
        self
    }

    pub fn blt(&mut self, rs1: &str, rs2: &str, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    blt {}, {}, {}", rs1, rs2, target);
        self
    }

    pub fn bge(&mut self, rs1: &str, rs2: &str, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    bge {}, {}, {}", rs1, rs2, target);
        self
    }

    pub fn beqz(&mut self, rs: &str, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    beqz {}, {}", rs, target);
        self
    }

    pub fn bnez(&mut self, rs: &str, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    bnez {}, {}", rs, target);
        self
    }

    pub fn j(&mut self, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    j {}", target);
        self
    }

    pub fn jal(&mut self, target: &Label) -> &mut Self {
        let _ = writeln!(self.text, "    jal {}", target);
        self
    }

    pub fn jalr(&mut self, rd: &str, rs: &str, imm: i64) -> &mut Self {
        let _ = writeln!(self.text, "    jalr {}, {}, {}", rd, rs, imm);
        self
    }

    pub fn ret(&mut self) -> &mut Self {
        self.text.push_str("    ret\n");
        self
    }

    pub fn ecall(&mut self) -> &mut Self {
        self.text.push_str("    ecall\n");
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.text.push_str("    nop\n");
        self
    }
}
