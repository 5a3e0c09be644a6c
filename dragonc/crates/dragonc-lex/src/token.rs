//! Token definitions for the C subset.
//!
//! A token is a tagged value: its [`TokenKind`] (with kind-specific
//! payload for identifiers and constants), the original source slice it
//! was scanned from, and its position.

use std::fmt;

use dragonc_util::Span;

/// The kind of a token, including kind-specific payload.
///
/// Identifier tokens carry their name; decimal constants carry the
/// parsed (unsigned, wrapping) value. All other kinds are payload-free.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    // Keywords
    Int,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,

    // Identifiers and literals
    Ident(&'a str),
    Constant(u64),

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Question,
    Colon,

    // Operators
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Tilde,
    Bang,
    BangEq,
    Eq,
    EqEq,
    Lt,
    LtEq,
    Shl,
    ShlEq,
    Gt,
    GtEq,
    Shr,
    ShrEq,
    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Int => "`int`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::For => "`for`",
            TokenKind::While => "`while`",
            TokenKind::Do => "`do`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Constant(_) => "integer constant",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Question => "`?`",
            TokenKind::Colon => "`:`",
            TokenKind::Plus => "`+`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::Minus => "`-`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::Star => "`*`",
            TokenKind::StarEq => "`*=`",
            TokenKind::Slash => "`/`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::Percent => "`%`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::Tilde => "`~`",
            TokenKind::Bang => "`!`",
            TokenKind::BangEq => "`!=`",
            TokenKind::Eq => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Shl => "`<<`",
            TokenKind::ShlEq => "`<<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Shr => "`>>`",
            TokenKind::ShrEq => "`>>=`",
            TokenKind::Amp => "`&`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::AmpEq => "`&=`",
            TokenKind::Pipe => "`|`",
            TokenKind::PipePipe => "`||`",
            TokenKind::PipeEq => "`|=`",
            TokenKind::Caret => "`^`",
            TokenKind::CaretEq => "`^=`",
        };
        f.write_str(s)
    }
}

/// Looks up the keyword table after an identifier has been scanned.
///
/// Returns the keyword kind when the scanned text is reserved, `None`
/// when it is an ordinary identifier.
pub fn keyword_from_ident(text: &str) -> Option<TokenKind<'static>> {
    let kind = match text {
        "int" => TokenKind::Int,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        _ => return None,
    };
    Some(kind)
}

/// A single token: kind, original source text, and position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// What the token is, with payload for identifiers and constants.
    pub kind: TokenKind<'a>,

    /// The raw source slice the token was scanned from.
    pub text: &'a str,

    /// Where the token starts, for diagnostics.
    pub span: Span,
}

impl<'a> Token<'a> {
    /// Creates a new token.
    pub fn new(kind: TokenKind<'a>, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }
}
