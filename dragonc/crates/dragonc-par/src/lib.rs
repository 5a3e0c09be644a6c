//! dragonc-par - Parser (Syntactic Analyzer)
//!
//! ============================================================================
//! PARSING
//! ============================================================================
//!
//! Parsing analyzes the token stream to determine its grammatical
//! structure. The output is an Abstract Syntax Tree (AST): concrete
//! syntax (parentheses, semicolons) is gone, semantic structure remains.
//!
//! This is a predictive recursive-descent parser: one method per
//! non-terminal, no backtracking, no recovery - the first error aborts
//! the compilation with a position and an expectation.
//!
//! TOKEN SUPPLY:
//! -------------
//! The parser pulls tokens on demand from the lexer through a small FIFO
//! lookahead buffer. `peek(n)` (1-based) refills the buffer up to `n`
//! tokens without consuming; `advance` pops one. No token vector is ever
//! materialized.
//!
//! GRAMMAR (precedence low → high; left-associative unless noted):
//! ---------------------------------------------------------------
//! ```text
//! program      := function EOF
//! function     := "int" IDENT "(" ")" "{" statement* "}"
//! statement    := return_stmt | declare_stmt | if_stmt | block | exp_stmt
//! return_stmt  := "return" exp ";"
//! declare_stmt := "int" IDENT ( "=" exp )? ";"
//! if_stmt      := "if" "(" exp ")" statement ( "else" statement )?
//! block        := "{" statement* "}"
//! exp_stmt     := exp ";"
//!
//! exp          := assign ( "," assign )*
//! assign       := conditional ( ASSIGN_OP assign )?          -- right-assoc
//! conditional  := logical_or ( "?" exp ":" conditional )?    -- right-assoc
//! logical_or   := logical_and ( "||" logical_and )*
//! logical_and  := bitwise_or  ( "&&" bitwise_or  )*
//! bitwise_or   := bitwise_xor ( "|"  bitwise_xor )*
//! bitwise_xor  := bitwise_and ( "^"  bitwise_and )*
//! bitwise_and  := equality    ( "&"  equality    )*
//! equality     := relational  ( ("=="|"!=") relational )*
//! relational   := shift       ( ("<"|"<="|">"|">=") shift )*
//! shift        := additive    ( ("<<"|">>") additive )*
//! additive     := term        ( ("+"|"-") term )*
//! term         := unary       ( ("*"|"/"|"%") unary )*
//! unary        := ("-"|"~"|"!"|"++"|"--") unary | postfix
//! postfix      := primary ( "++" | "--" )*
//! primary      := "(" exp ")" | CONSTANT | IDENT
//! ```
//!
//! Left recursion in the binary levels is expressed as iteration, which
//! also yields left associativity. Assignment and the ternary recurse on
//! their own level for right associativity.
//!
//! LVALUE RULE:
//! ------------
//! After reducing `conditional`, an assignment operator is only legal if
//! the reduced expression is a variable; anything else is the
//! "expected lvalue" parse error. Increment/decrement targets are checked
//! later by the code generator, which owns the remaining semantic rules.

pub mod ast;
mod error;

use std::collections::VecDeque;

use dragonc_lex::{Lexer, Token, TokenKind};

pub use ast::{
    AssignExpr, AssignOp, BinOp, BinaryExpr, CommaExpr, ConditionalExpr, DeclareStmt, Expr,
    Function, IfStmt, PostfixExpr, PostfixOp, Program, Stmt, UnOp, UnaryExpr,
};
pub use error::ParseError;

/// Recursive-descent parser over a pull-stream of tokens.
///
/// # Example
///
/// ```
/// use dragonc_par::Parser;
///
/// let program = Parser::new("int main() { return 2; }").parse().unwrap();
/// assert_eq!(program.function.name, "main");
/// ```
pub struct Parser<'a> {
    /// Token source, pulled on demand.
    lexer: Lexer<'a>,

    /// FIFO lookahead buffer in front of the lexer.
    buffer: VecDeque<Token<'a>>,
}

impl<'a> Parser<'a> {
    /// Creates a parser for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            buffer: VecDeque::new(),
        }
    }

    /// Parses a complete program.
    ///
    /// After the single function, any remaining token is an error.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let function = self.parse_function()?;
        if let Some(tok) = self.advance()? {
            return Err(ParseError::UnexpectedToken {
                found: tok.kind.to_string(),
                expected: "end of file".to_string(),
                span: tok.span,
            });
        }
        Ok(Program { function })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        self.expect(TokenKind::Int)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.look(TokenKind::RBrace)? {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Function { name, body })
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek(1)?.map(|t| t.kind) {
            Some(TokenKind::Return) => self.parse_return_stmt(),
            Some(TokenKind::Int) => self.parse_declare_stmt(),
            Some(TokenKind::If) => self.parse_if_stmt(),
            Some(TokenKind::LBrace) => self.parse_block(),
            _ => self.parse_exp_stmt(),
        }
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Return)?;
        let exp = self.parse_exp()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return(exp))
    }

    fn parse_declare_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Int)?;
        let name = self.expect_ident()?;
        let init = if self.match_token(TokenKind::Eq)?.is_some() {
            Some(self.parse_exp()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Declare(DeclareStmt { name, init }))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_exp()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(TokenKind::Else)?.is_some() {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
        }))
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.look(TokenKind::RBrace)? {
            stmts.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Block(stmts))
    }

    fn parse_exp_stmt(&mut self) -> Result<Stmt, ParseError> {
        let exp = self.parse_exp()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Expr(exp))
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Parses a full expression, including the comma operator.
    pub fn parse_exp(&mut self) -> Result<Expr, ParseError> {
        let mut exp = self.parse_assign()?;
        while self.match_token(TokenKind::Comma)?.is_some() {
            let right = self.parse_assign()?;
            exp = Expr::Comma(CommaExpr {
                left: Box::new(exp),
                right: Box::new(right),
            });
        }
        Ok(exp)
    }

    fn parse_assign(&mut self) -> Result<Expr, ParseError> {
        let exp = self.parse_conditional()?;

        let op_tok = match self.peek(1)? {
            Some(tok) if AssignOp::from_token(tok.kind).is_some() => tok,
            _ => return Ok(exp),
        };
        self.advance()?;

        let target = match exp {
            Expr::Var(name) => name,
            _ => {
                return Err(ParseError::ExpectedLvalue { span: op_tok.span });
            }
        };
        let op = match AssignOp::from_token(op_tok.kind) {
            Some(op) => op,
            None => unreachable!("peek already classified the token"),
        };

        // Right-associative: a = b = c is a = (b = c).
        let value = self.parse_assign()?;
        Ok(Expr::Assign(AssignExpr {
            target,
            op,
            value: Box::new(value),
        }))
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_logical_or()?;
        if self.match_token(TokenKind::Question)?.is_none() {
            return Ok(cond);
        }
        let then_expr = self.parse_exp()?;
        self.expect(TokenKind::Colon)?;
        // Right-associative: a ? b : c ? d : e nests in the else arm.
        let else_expr = self.parse_conditional()?;
        Ok(Expr::Conditional(ConditionalExpr {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }))
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_logical_and, &[TokenKind::PipePipe])
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_bitwise_or, &[TokenKind::AmpAmp])
    }

    fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_bitwise_xor, &[TokenKind::Pipe])
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_bitwise_and, &[TokenKind::Caret])
    }

    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_equality, &[TokenKind::Amp])
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_relational,
            &[TokenKind::EqEq, TokenKind::BangEq],
        )
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_shift,
            &[
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
            ],
        )
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_additive, &[TokenKind::Shl, TokenKind::Shr])
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_term, &[TokenKind::Plus, TokenKind::Minus])
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_unary,
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
        )
    }

    /// One left-associative binary precedence level.
    ///
    /// Parses `next ( OP next )*` for the given operator tokens, folding
    /// to the left as it iterates.
    fn parse_binary_level(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, ParseError>,
        ops: &[TokenKind<'a>],
    ) -> Result<Expr, ParseError> {
        let mut exp = next(self)?;
        loop {
            let op = match self.peek(1)? {
                Some(tok) if ops.contains(&tok.kind) => match BinOp::from_token(tok.kind) {
                    Some(op) => op,
                    None => unreachable!("operator table lists only binary tokens"),
                },
                _ => break,
            };
            self.advance()?;
            let right = next(self)?;
            exp = Expr::Binary(BinaryExpr {
                op,
                left: Box::new(exp),
                right: Box::new(right),
            });
        }
        Ok(exp)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek(1)? {
            Some(tok) => match UnOp::from_token(tok.kind) {
                Some(op) => op,
                None => return self.parse_postfix(),
            },
            None => return self.parse_postfix(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
        }))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut exp = self.parse_primary()?;
        loop {
            let op = match self.peek(1)?.map(|t| t.kind) {
                Some(TokenKind::PlusPlus) => PostfixOp::Inc,
                Some(TokenKind::MinusMinus) => PostfixOp::Dec,
                _ => break,
            };
            self.advance()?;
            exp = Expr::Postfix(PostfixExpr {
                op,
                operand: Box::new(exp),
            });
        }
        Ok(exp)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance_required("expression")?;
        match tok.kind {
            TokenKind::LParen => {
                let exp = self.parse_exp()?;
                self.expect(TokenKind::RParen)?;
                Ok(exp)
            }
            TokenKind::Constant(value) => Ok(Expr::Constant(value as i64)),
            TokenKind::Ident(name) => Ok(Expr::Var(name.to_string())),
            _ => Err(ParseError::UnexpectedToken {
                found: tok.kind.to_string(),
                expected: "expression".to_string(),
                span: tok.span,
            }),
        }
    }

    // =========================================================================
    // TOKEN SUPPLY
    // =========================================================================

    /// Returns the n-th token ahead without consuming it (1-based).
    ///
    /// Refills the lookahead buffer from the lexer on demand; `None`
    /// means the stream ends before the requested token.
    fn peek(&mut self, n: usize) -> Result<Option<Token<'a>>, ParseError> {
        while self.buffer.len() < n {
            match self.lexer.next_token()? {
                Some(tok) => self.buffer.push_back(tok),
                None => return Ok(None),
            }
        }
        Ok(self.buffer.get(n - 1).copied())
    }

    /// Consumes and returns the next token, `None` at end of input.
    fn advance(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if let Some(tok) = self.buffer.pop_front() {
            return Ok(Some(tok));
        }
        Ok(self.lexer.next_token()?)
    }

    /// Consumes the next token, failing with the given expectation at
    /// end of input.
    fn advance_required(&mut self, expected: &str) -> Result<Token<'a>, ParseError> {
        self.advance()?.ok_or_else(|| ParseError::UnexpectedEof {
            expected: expected.to_string(),
        })
    }

    /// Consumes the next token iff it has exactly the given kind.
    fn expect(&mut self, kind: TokenKind<'a>) -> Result<Token<'a>, ParseError> {
        let tok = self.advance_required(&kind.to_string())?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(ParseError::UnexpectedToken {
                found: tok.kind.to_string(),
                expected: kind.to_string(),
                span: tok.span,
            })
        }
    }

    /// Consumes the next token, which must be an identifier, and returns
    /// its name.
    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let tok = self.advance_required("identifier")?;
        match tok.kind {
            TokenKind::Ident(name) => Ok(name.to_string()),
            _ => Err(ParseError::UnexpectedToken {
                found: tok.kind.to_string(),
                expected: "identifier".to_string(),
                span: tok.span,
            }),
        }
    }

    /// Returns true if the next token has the given kind.
    fn look(&mut self, kind: TokenKind<'a>) -> Result<bool, ParseError> {
        Ok(self.peek(1)?.is_some_and(|t| t.kind == kind))
    }

    /// Consumes and returns the next token iff it has the given kind.
    fn match_token(&mut self, kind: TokenKind<'a>) -> Result<Option<Token<'a>>, ParseError> {
        if self.look(kind)? {
            self.advance()
        } else {
            Ok(None)
        }
    }
}
