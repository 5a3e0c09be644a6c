//! dragonc-lex - Lexical Analyzer (Lexer/Tokenizer)
//!
//! ============================================================================
//! LEXICAL ANALYSIS
//! ============================================================================
//!
//! Lexical analysis is the first phase of compilation. It transforms a stream
//! of characters into a stream of tokens.
//!
//! ```text
//! Source: "int main() { return 2; }"
//!
//! Lexemes:  "int", "main", "(", ")", "{", "return", "2", ";", "}"
//! Tokens:   [Int] [Ident("main")] [LParen] [RParen] [LBrace]
//!           [Return] [Constant(2)] [Semicolon] [RBrace]
//!           ↑ whitespace skipped, never tokenized
//! ```
//!
//! TOKEN CATEGORIES:
//! -----------------
//! 1. KEYWORDS - reserved words (`int`, `return`, `if`, `else`, ...).
//!    Recognized by scanning an identifier first, then consulting the
//!    keyword table; a keyword can never be an identifier.
//! 2. IDENTIFIERS - `[A-Za-z][A-Za-z0-9_]*`
//! 3. CONSTANTS - decimal integer literals `[0-9]+`. The sign of a
//!    negated literal is a separate unary operator token.
//! 4. OPERATORS - one to three characters. Multi-character operators are
//!    disambiguated by lookahead on the next character(s): `<` starts
//!    `<`, `<=`, `<<` or `<<=`.
//! 5. PUNCTUATION - `{ } ( ) ; , ? :`
//!
//! DESIGN:
//! -------
//! The lexer is a pull stream: each call to [`Lexer::next_token`] skips
//! whitespace, snapshots the token start position, reads one character
//! and dispatches on it. It returns `Ok(None)` at end of input and a
//! [`LexError`] naming the offending character for anything it cannot
//! classify. The parser sits in front of it with a small FIFO lookahead
//! buffer; there are no callbacks and no intermediate token vector.
//!
//! Every token carries its [`TokenKind`], the original source slice, and
//! a [`Span`](dragonc_util::Span) used only in diagnostics. Tokens
//! borrow from the source text and live only until the parser consumes
//! them.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use token::{keyword_from_ident, Token, TokenKind};
