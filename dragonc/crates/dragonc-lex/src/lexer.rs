//! Core lexer implementation.
//!
//! This module contains the main [`Lexer`] struct and its dispatch loop.

use thiserror::Error;

use dragonc_util::Span;

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// A lexical error. Fatal to the compilation that produced it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LexError {
    /// A byte the lexer cannot begin any token with.
    #[error("unexpected character '{ch}'")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Where it was found.
        span: Span,
    },
}

impl LexError {
    /// The position the error is anchored to.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
        }
    }
}

/// Lexer for the compiled C subset.
///
/// The lexer transforms source text into a stream of tokens on demand.
/// Each call to [`Lexer::next_token`] produces the next token,
/// `Ok(None)` at end of input, or a [`LexError`] on an unrecognizable
/// character.
///
/// # Example
///
/// ```
/// use dragonc_lex::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new("return 2;");
/// assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Return);
/// assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Constant(2));
/// ```
pub struct Lexer<'a> {
    /// Character cursor for source traversal.
    cursor: Cursor<'a>,

    /// Starting byte offset of the current token.
    token_start: usize,

    /// Line number where the current token starts (1-based).
    token_start_line: u32,

    /// Column number where the current token starts (1-based).
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Returns the next token from the source code.
    ///
    /// Skips whitespace, snapshots the token start position, then
    /// dispatches on the first character. Multi-character operators are
    /// disambiguated with one character of lookahead; `<<=` and `>>=`
    /// need a second.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, LexError> {
        self.cursor.skip_whitespace();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let kind = match self.cursor.current_char() {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '?' => self.single(TokenKind::Question),
            ':' => self.single(TokenKind::Colon),
            '~' => self.single(TokenKind::Tilde),
            '+' => self.lex_plus(),
            '-' => self.lex_minus(),
            '*' => self.lex_star(),
            '/' => self.lex_slash(),
            '%' => self.lex_percent(),
            '=' => self.lex_equals(),
            '!' => self.lex_bang(),
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '&' => self.lex_ampersand(),
            '|' => self.lex_pipe(),
            '^' => self.lex_caret(),
            c if c.is_ascii_alphabetic() => self.lex_identifier(),
            c if c.is_ascii_digit() => self.lex_constant(),
            c => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    span: self.token_span(),
                })
            }
        };

        Ok(Some(Token::new(
            kind,
            self.cursor.slice_from(self.token_start),
            self.token_span(),
        )))
    }

    /// Consumes one character and returns the given kind.
    fn single(&mut self, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.cursor.advance();
        kind
    }

    fn lex_plus(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('+') {
            TokenKind::PlusPlus
        } else if self.cursor.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn lex_minus(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('-') {
            TokenKind::MinusMinus
        } else if self.cursor.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    fn lex_star(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::StarEq
        } else {
            TokenKind::Star
        }
    }

    fn lex_slash(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        }
    }

    fn lex_percent(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    fn lex_equals(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::EqEq
        } else {
            TokenKind::Eq
        }
    }

    fn lex_bang(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::BangEq
        } else {
            TokenKind::Bang
        }
    }

    fn lex_less(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::LtEq
        } else if self.cursor.match_char('<') {
            if self.cursor.match_char('=') {
                TokenKind::ShlEq
            } else {
                TokenKind::Shl
            }
        } else {
            TokenKind::Lt
        }
    }

    fn lex_greater(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::GtEq
        } else if self.cursor.match_char('>') {
            if self.cursor.match_char('=') {
                TokenKind::ShrEq
            } else {
                TokenKind::Shr
            }
        } else {
            TokenKind::Gt
        }
    }

    fn lex_ampersand(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            TokenKind::AmpAmp
        } else if self.cursor.match_char('=') {
            TokenKind::AmpEq
        } else {
            TokenKind::Amp
        }
    }

    fn lex_pipe(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            TokenKind::PipePipe
        } else if self.cursor.match_char('=') {
            TokenKind::PipeEq
        } else {
            TokenKind::Pipe
        }
    }

    fn lex_caret(&mut self) -> TokenKind<'a> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::CaretEq
        } else {
            TokenKind::Caret
        }
    }

    /// Scans an identifier, then consults the keyword table.
    ///
    /// The first character is alphabetic; continuations admit digits and
    /// `_` as well.
    fn lex_identifier(&mut self) -> TokenKind<'a> {
        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_alphanumeric() || c == '_' {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        keyword_from_ident(text).unwrap_or(TokenKind::Ident(text))
    }

    /// Scans a decimal constant.
    ///
    /// The value accumulates with wrapping arithmetic; compile-time
    /// overflow is not checked.
    fn lex_constant(&mut self) -> TokenKind<'a> {
        let mut value: u64 = 0;
        while let Some(digit) = self.cursor.current_char().to_digit(10) {
            value = value.wrapping_mul(10).wrapping_add(u64::from(digit));
            self.cursor.advance();
        }
        TokenKind::Constant(value)
    }

    fn token_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Lexes the whole source, panicking on lexical errors.
    fn lex_all(source: &str) -> Vec<Token<'_>> {
        Lexer::new(source)
            .collect::<Result<Vec<_>, _>>()
            .expect("lexical error")
    }

    fn kinds<'a>(source: &'a str) -> Vec<TokenKind<'a>> {
        lex_all(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_source() {
        assert!(lex_all("").is_empty());
        assert!(lex_all("  \t\n ").is_empty());
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("(){};,?:"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::Question,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn test_single_char_operators() {
        assert_eq!(
            kinds("+ - * / % ~ ! = < > & | ^"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Tilde,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Caret,
            ]
        );
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(
            kinds("++ -- += -= *= /= %= && &= || |= ^= == != <= >="),
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::AmpAmp,
                TokenKind::AmpEq,
                TokenKind::PipePipe,
                TokenKind::PipeEq,
                TokenKind::CaretEq,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
            ]
        );
    }

    #[test]
    fn test_shift_operators_need_two_lookahead() {
        assert_eq!(
            kinds("<< <<= >> >>="),
            vec![
                TokenKind::Shl,
                TokenKind::ShlEq,
                TokenKind::Shr,
                TokenKind::ShrEq,
            ]
        );
    }

    #[test]
    fn test_adjacent_operators_split_greedily() {
        // `<<<` is `<<` then `<`, never `<` `<<`.
        assert_eq!(kinds("<<<"), vec![TokenKind::Shl, TokenKind::Lt]);
        assert_eq!(kinds("==="), vec![TokenKind::EqEq, TokenKind::Eq]);
        assert_eq!(
            kinds("+++"),
            vec![TokenKind::PlusPlus, TokenKind::Plus]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("int return if else for while do break continue"),
            vec![
                TokenKind::Int,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::For,
                TokenKind::While,
                TokenKind::Do,
                TokenKind::Break,
                TokenKind::Continue,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("main x0 retval snake_case"),
            vec![
                TokenKind::Ident("main"),
                TokenKind::Ident("x0"),
                TokenKind::Ident("retval"),
                TokenKind::Ident("snake_case"),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(kinds("integer"), vec![TokenKind::Ident("integer")]);
        assert_eq!(kinds("returned"), vec![TokenKind::Ident("returned")]);
    }

    #[test]
    fn test_constants() {
        assert_eq!(kinds("0"), vec![TokenKind::Constant(0)]);
        assert_eq!(kinds("42"), vec![TokenKind::Constant(42)]);
        assert_eq!(kinds("007"), vec![TokenKind::Constant(7)]);
    }

    #[test]
    fn test_negative_literal_is_two_tokens() {
        assert_eq!(
            kinds("-5"),
            vec![TokenKind::Minus, TokenKind::Constant(5)]
        );
    }

    #[test]
    fn test_token_text_and_span() {
        let tokens = lex_all("int main");
        assert_eq!(tokens[0].text, "int");
        assert_eq!(tokens[0].span.start, 0);
        assert_eq!(tokens[0].span.end, 3);
        assert_eq!(tokens[1].text, "main");
        assert_eq!(tokens[1].span.start, 4);
        assert_eq!(tokens[1].span.column, 5);
    }

    #[test]
    fn test_positions_across_lines() {
        let tokens = lex_all("int\n  x;");
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.column, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.column, 4);
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("int a = $1;")
            .collect::<Result<Vec<_>, _>>()
            .unwrap_err();
        match err {
            LexError::UnexpectedChar { ch, span } => {
                assert_eq!(ch, '$');
                assert_eq!(span.line, 1);
                assert_eq!(span.column, 9);
            }
        }
        assert_eq!(err.to_string(), "unexpected character '$'");
    }

    #[test]
    fn test_whole_function() {
        assert_eq!(
            kinds("int main() { return 2; }"),
            vec![
                TokenKind::Int,
                TokenKind::Ident("main"),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Constant(2),
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
    }

    /// Strategy over lexemes that survive a round trip when separated by
    /// whitespace.
    fn lexeme() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("int"),
            Just("return"),
            Just("if"),
            Just("else"),
            Just("main"),
            Just("a"),
            Just("value_2"),
            Just("0"),
            Just("17"),
            Just("("),
            Just(")"),
            Just("{"),
            Just("}"),
            Just(";"),
            Just(","),
            Just("?"),
            Just(":"),
            Just("+"),
            Just("++"),
            Just("+="),
            Just("-"),
            Just("--"),
            Just("<"),
            Just("<="),
            Just("<<"),
            Just("<<="),
            Just(">>"),
            Just(">>="),
            Just("&&"),
            Just("||"),
            Just("=="),
            Just("!="),
            Just("^="),
        ]
    }

    proptest! {
        /// Whitespace layout never changes the token stream.
        #[test]
        fn whitespace_layout_is_irrelevant(lexemes in proptest::collection::vec(lexeme(), 0..32)) {
            let spaced = lexemes.join(" ");
            let ragged = lexemes.join("\n\t  ");
            prop_assert_eq!(kinds(&spaced), kinds(&ragged));
        }

        /// Lexing the same source twice yields identical streams.
        #[test]
        fn lexing_is_deterministic(lexemes in proptest::collection::vec(lexeme(), 0..32)) {
            let source = lexemes.join(" ");
            prop_assert_eq!(lex_all(&source), lex_all(&source));
        }
    }
}
