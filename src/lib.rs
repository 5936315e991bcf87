//! # Class-Based RISC-V Code-Generation Framework
//!
//! The code-generation back half of a compiler for a statically typed
//! subset of a class-based dynamic language: given an already-parsed,
//! already-type-checked program tree, this crate lays out objects,
//! activation records, and the constant pool, and emits RISC-V assembly
//! text for them. Lexing, parsing, and type inference are out of scope —
//! see [`tree`] for the shape of the tree this crate consumes.

pub mod analysis;
pub mod codegen;
pub mod config;
pub mod constpool;
pub mod debug;
pub mod descriptors;
pub mod error;
pub mod label;
pub mod sink;
pub mod symtab;
pub mod tree;
pub mod types;

pub use analysis::{analyze, AnalyzedProgram};
pub use codegen::{generate, CodeEmitter, CodeGenContext, NullEmitter};
pub use config::BackendConfig;
pub use error::{CodegenError, Result};
