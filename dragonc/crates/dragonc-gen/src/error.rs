//! Error types for code generation.
//!
//! These are the semantic errors: the program parsed, but names or
//! operand shapes violate the language rules. They carry no position -
//! the AST does not track spans.

use thiserror::Error;

/// A semantic error detected while generating code.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodeGenError {
    /// A variable was referenced but no enclosing scope declares it.
    #[error("variable not declared: {name}")]
    UndeclaredVariable { name: String },

    /// A variable was declared twice in the same scope.
    #[error("variable already declared: {name}")]
    Redeclaration { name: String },

    /// Increment/decrement applied to something that is not a variable.
    #[error("lvalue required as increment/decrement operand")]
    LvalueRequired,
}

/// Result type alias for code generation operations
pub type Result<T> = std::result::Result<T, CodeGenError>;
