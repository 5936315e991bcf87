//! # Code-Generation Error Definitions
//!
//! Centralizes the failure modes the framework can produce. Per the input
//! contract, the tree handed to this crate has already been parsed and
//! semantically validated, so almost everything here is a defect in the
//! framework or in a `CodeEmitter` implementation rather than a user-facing
//! diagnostic — see `spec.md` §7.

use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A named runtime-library fragment was not found in the resource store.
    #[error("missing runtime resource fragment: {name}")]
    MissingResource { name: String },

    /// `Func::var_index` was asked about a name that is neither a parameter
    /// nor a local of that function. Indicates an emitter bug: non-locals
    /// must be resolved through the symbol table instead.
    #[error("'{name}' is not a parameter or local of function '{function}'")]
    UnknownName { function: String, name: String },

    /// A super-class reference did not resolve to a registered `Class`.
    /// Semantic analysis is assumed to have ruled this out already.
    #[error("super-class '{name}' not found while analyzing class '{class}'")]
    UnknownSuperclass { class: String, name: String },

    /// A name referenced by the tree has no binding in any enclosing scope.
    #[error("undefined name: {name}")]
    UndefinedName { name: String },

    /// A `nonlocal` declaration referenced a name that does not resolve to a
    /// `StackVar` through the parent chain.
    #[error("'nonlocal {name}' does not resolve to an enclosing local")]
    InvalidNonlocal { name: String },

    /// A label was about to be emitted as a definition a second time.
    #[error("label '{0}' defined more than once")]
    DuplicateLabel(String),

    /// Raised when a caller asks for the offset of an attribute or method
    /// that is absent from a class's tables.
    #[error("class '{class}' has no {kind} named '{name}'")]
    NoSuchMember {
        class: String,
        kind: &'static str,
        name: String,
    },
}

impl CodegenError {
    pub fn missing_resource(name: impl Into<String>) -> Self {
        Self::MissingResource { name: name.into() }
    }

    pub fn unknown_name(function: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownName {
            function: function.into(),
            name: name.into(),
        }
    }

    pub fn unknown_superclass(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownSuperclass {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn undefined_name(name: impl Into<String>) -> Self {
        Self::UndefinedName { name: name.into() }
    }

    pub fn invalid_nonlocal(name: impl Into<String>) -> Self {
        Self::InvalidNonlocal { name: name.into() }
    }

    pub fn no_such_attribute(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NoSuchMember {
            class: class.into(),
            kind: "attribute",
            name: name.into(),
        }
    }

    pub fn no_such_method(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NoSuchMember {
            class: class.into(),
            kind: "method",
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;
