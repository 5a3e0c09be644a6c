//! Error types for the parser.

use thiserror::Error;

use dragonc_lex::LexError;
use dragonc_util::Span;

/// A syntax error. Fatal to the compilation that produced it.
///
/// Every variant carries a human-readable expectation; variants anchored
/// to a token carry its position. Lexical errors surfacing through the
/// parser's pull loop convert via `From`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The lexer failed while the parser was refilling its lookahead.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The head of the token stream does not match the grammar.
    #[error("unexpected token {found} (expected {expected})")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    /// The token stream ended mid-construct.
    #[error("unexpected end of file (expected {expected})")]
    UnexpectedEof { expected: String },

    /// The left-hand side of an assignment is not a variable.
    #[error("expected lvalue on left-hand side of assignment")]
    ExpectedLvalue { span: Span },
}

impl ParseError {
    /// The position the error is anchored to, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Lex(e) => Some(e.span()),
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
            ParseError::ExpectedLvalue { span } => Some(*span),
        }
    }
}
