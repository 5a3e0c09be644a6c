//! dragonc-par - AST Node Definitions
//!
//! This module contains all AST node definitions produced by the parser.
//!
//! The AST is a strict tree of immutable nodes. Two sum types anchor it,
//! [`Expr`] and [`Stmt`]; a [`Program`] is a single zero-parameter
//! function returning `int`. Nodes are never mutated after construction
//! and live for the duration of one compilation.
//!
//! The token→operator-kind mappings live here as exhaustive matches so
//! the compiler's exhaustiveness checking guards against missed kinds.

use dragonc_lex::TokenKind;

/// AST root - a program is a single function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub function: Function,
}

/// Function definition
///
/// Always zero parameters and return type `int` in this subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub body: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `return exp;`
    Return(Expr),

    /// `int name;` or `int name = exp;`
    Declare(DeclareStmt),

    /// An expression evaluated for its side effects: `exp;`
    Expr(Expr),

    /// `if (cond) stmt` with optional `else stmt`
    If(IfStmt),

    /// `{ stmt* }` - introduces a lexical scope
    Block(Vec<Stmt>),
}

/// Local variable declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareStmt {
    pub name: String,
    pub init: Option<Expr>,
}

/// Conditional statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal
    Constant(i64),

    /// Variable reference
    Var(String),

    /// Prefix operator application
    Unary(UnaryExpr),

    /// Binary operator application
    Binary(BinaryExpr),

    /// Simple or compound assignment
    Assign(AssignExpr),

    /// Postfix increment/decrement
    Postfix(PostfixExpr),

    /// Comma operator: evaluate left, discard, evaluate right
    Comma(CommaExpr),

    /// Ternary conditional `cond ? then : else`
    Conditional(ConditionalExpr),
}

/// Unary expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
}

/// Binary expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// Assignment expression
///
/// The target is a variable name: the parser enforces the lvalue rule
/// before building this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignExpr {
    pub target: String,
    pub op: AssignOp,
    pub value: Box<Expr>,
}

/// Postfix increment/decrement expression
///
/// The operand is kept as a full expression; the code generator enforces
/// the lvalue rule when it walks the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostfixExpr {
    pub op: PostfixOp,
    pub operand: Box<Expr>,
}

/// Comma expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommaExpr {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// Ternary conditional expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExpr {
    pub cond: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
}

/// Unary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// `-` arithmetic negation
    Neg,
    /// `~` bitwise complement
    BitNot,
    /// `!` logical negation
    Not,
    /// `++` prefix increment (requires an lvalue operand)
    PreInc,
    /// `--` prefix decrement (requires an lvalue operand)
    PreDec,
}

impl UnOp {
    /// Maps a token to its unary operator kind.
    pub fn from_token(kind: TokenKind<'_>) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Tilde => Some(UnOp::BitNot),
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::PlusPlus => Some(UnOp::PreInc),
            TokenKind::MinusMinus => Some(UnOp::PreDec),
            _ => None,
        }
    }
}

/// Binary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    /// `&&` - short-circuit
    And,
    /// `||` - short-circuit
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    /// Maps a token to its binary operator kind.
    pub fn from_token(kind: TokenKind<'_>) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::LtEq => Some(BinOp::Le),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::GtEq => Some(BinOp::Ge),
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::Ne),
            TokenKind::AmpAmp => Some(BinOp::And),
            TokenKind::PipePipe => Some(BinOp::Or),
            TokenKind::Amp => Some(BinOp::BitAnd),
            TokenKind::Pipe => Some(BinOp::BitOr),
            TokenKind::Caret => Some(BinOp::BitXor),
            TokenKind::Shl => Some(BinOp::Shl),
            TokenKind::Shr => Some(BinOp::Shr),
            _ => None,
        }
    }
}

/// Assignment operator kinds
///
/// Compound assignments are not desugared into binary operations; the
/// code generator emits specialized sequences for each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Simple,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    /// Maps a token to its assignment operator kind.
    pub fn from_token(kind: TokenKind<'_>) -> Option<Self> {
        match kind {
            TokenKind::Eq => Some(AssignOp::Simple),
            TokenKind::PlusEq => Some(AssignOp::Add),
            TokenKind::MinusEq => Some(AssignOp::Sub),
            TokenKind::StarEq => Some(AssignOp::Mul),
            TokenKind::SlashEq => Some(AssignOp::Div),
            TokenKind::PercentEq => Some(AssignOp::Mod),
            TokenKind::ShlEq => Some(AssignOp::Shl),
            TokenKind::ShrEq => Some(AssignOp::Shr),
            TokenKind::AmpEq => Some(AssignOp::BitAnd),
            TokenKind::PipeEq => Some(AssignOp::BitOr),
            TokenKind::CaretEq => Some(AssignOp::BitXor),
            _ => None,
        }
    }
}

/// Postfix operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
}
