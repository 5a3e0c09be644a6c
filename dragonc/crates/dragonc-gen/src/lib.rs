//! dragonc-gen - x86-64 Code Generator
//!
//! ============================================================================
//! CODE GENERATION
//! ============================================================================
//!
//! The generator walks the completed AST once and writes AT&T-syntax
//! x86-64 assembly to a text sink. There is no IR, no register
//! allocation, no optimization: a fixed register discipline and the
//! machine stack carry everything.
//!
//! EVALUATION DISCIPLINE:
//! ----------------------
//! Every expression leaves its value in `%rax`. A binary operator
//! evaluates its left operand, pushes `%rax`, evaluates the right
//! operand, pops the left value into `%rdi`, and combines:
//!
//! ```text
//!   <left>            ; %rax = left
//!   pushq %rax
//!   <right>           ; %rax = right
//!   popq %rdi         ; %rdi = left
//!   addq %rdi, %rax   ; (or the operator's sequence)
//! ```
//!
//! Operators whose operand order matters (subtraction, division,
//! modulo, shifts, comparisons) swap or rearrange after the pop. The
//! short-circuit operators `&&` and `||` do not use the push/pop scheme
//! at all: they branch around the right operand with fresh labels.
//!
//! STORAGE:
//! --------
//! Locals live in 8-byte stack slots addressed relative to `%rbp`.
//! `int x = e;` evaluates `e` and pushes `%rax`; the scope stack records
//! the slot's offset. Leaving a block gives its slots back with one
//! `addq` to `%rsp`, so sibling blocks reuse them. See [`ScopeStack`].
//!
//! State is per-compilation: the label counter and scope stack live in
//! the [`Codegen`] instance, never at process scope, so identical input
//! always produces byte-identical assembly.

mod error;
mod scope;

use dragonc_par::{
    AssignExpr, AssignOp, BinOp, BinaryExpr, ConditionalExpr, Expr, Function, IfStmt, PostfixExpr,
    PostfixOp, Program, Stmt, UnOp, UnaryExpr,
};

pub use error::{CodeGenError, Result};
pub use scope::{ScopeStack, SLOT_SIZE};

/// x86-64 assembly generator.
///
/// One instance per compilation; [`Codegen::generate`] consumes it and
/// returns the assembly text ready for the external assembler.
///
/// # Example
///
/// ```
/// use dragonc_gen::Codegen;
/// use dragonc_par::Parser;
///
/// let program = Parser::new("int main() { return 2; }").parse().unwrap();
/// let asm = Codegen::new().generate(&program).unwrap();
/// assert!(asm.contains("movq $2, %rax"));
/// ```
pub struct Codegen {
    /// Accumulated assembly text.
    out: String,

    /// Monotonic counter making emitted labels unique.
    label_counter: u32,

    /// Name → stack slot mapping, one frame per lexical block.
    scopes: ScopeStack,
}

impl Codegen {
    /// Creates a generator with fresh state.
    pub fn new() -> Self {
        Self {
            out: String::new(),
            label_counter: 0,
            scopes: ScopeStack::new(),
        }
    }

    /// Generates assembly for a whole program.
    pub fn generate(mut self, program: &Program) -> Result<String> {
        self.generate_function(&program.function)?;
        Ok(self.out)
    }

    fn generate_function(&mut self, function: &Function) -> Result<()> {
        self.emit(format!(".globl {}", function.name));
        self.emit_label(&function.name);
        self.emit("pushq %rbp");
        self.emit("movq %rsp, %rbp");

        self.scopes.enter();
        for stmt in &function.body {
            self.generate_stmt(stmt)?;
        }
        self.scopes.exit();

        // Implicit `return 0` for control flow that reaches the end.
        self.emit("movq $0, %rax");
        self.emit_epilogue();
        Ok(())
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn generate_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Return(exp) => {
                self.generate_expr(exp)?;
                self.emit_epilogue();
            }
            Stmt::Declare(decl) => {
                if self.scopes.declared_in_current(&decl.name) {
                    return Err(CodeGenError::Redeclaration {
                        name: decl.name.clone(),
                    });
                }
                match &decl.init {
                    Some(init) => self.generate_expr(init)?,
                    None => self.emit("movq $0, %rax"),
                }
                self.emit("pushq %rax");
                self.scopes.declare(&decl.name)?;
            }
            Stmt::Expr(exp) => {
                self.generate_expr(exp)?;
            }
            Stmt::If(if_stmt) => {
                self.generate_if(if_stmt)?;
            }
            Stmt::Block(stmts) => {
                self.scopes.enter();
                for stmt in stmts {
                    self.generate_stmt(stmt)?;
                }
                let slots = self.scopes.exit();
                if slots > 0 {
                    self.emit(format!("addq ${}, %rsp", slots as i64 * SLOT_SIZE));
                }
            }
        }
        Ok(())
    }

    fn generate_if(&mut self, if_stmt: &IfStmt) -> Result<()> {
        self.generate_expr(&if_stmt.cond)?;
        self.emit("cmpq $0, %rax");
        match &if_stmt.else_branch {
            Some(else_branch) => {
                let false_label = self.fresh_label("false");
                self.emit(format!("je {false_label}"));
                self.generate_stmt(&if_stmt.then_branch)?;
                let end_label = self.fresh_label("end");
                self.emit(format!("jmp {end_label}"));
                self.emit_label(&false_label);
                self.generate_stmt(else_branch)?;
                self.emit_label(&end_label);
            }
            None => {
                let end_label = self.fresh_label("end");
                self.emit(format!("je {end_label}"));
                self.generate_stmt(&if_stmt.then_branch)?;
                self.emit_label(&end_label);
            }
        }
        Ok(())
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn generate_expr(&mut self, exp: &Expr) -> Result<()> {
        match exp {
            Expr::Constant(value) => {
                self.emit(format!("movq ${value}, %rax"));
            }
            Expr::Var(name) => {
                let offset = self.scopes.resolve(name)?;
                self.emit(format!("movq {offset}(%rbp), %rax"));
            }
            Expr::Unary(unary) => self.generate_unary(unary)?,
            Expr::Binary(binary) => self.generate_binary(binary)?,
            Expr::Assign(assign) => self.generate_assign(assign)?,
            Expr::Postfix(postfix) => self.generate_postfix(postfix)?,
            Expr::Comma(comma) => {
                // Left value is discarded by being overwritten.
                self.generate_expr(&comma.left)?;
                self.generate_expr(&comma.right)?;
            }
            Expr::Conditional(cond) => self.generate_conditional(cond)?,
        }
        Ok(())
    }

    fn generate_unary(&mut self, unary: &UnaryExpr) -> Result<()> {
        match unary.op {
            UnOp::Neg => {
                self.generate_expr(&unary.operand)?;
                self.emit("neg %rax");
            }
            UnOp::BitNot => {
                self.generate_expr(&unary.operand)?;
                self.emit("not %rax");
            }
            UnOp::Not => {
                self.generate_expr(&unary.operand)?;
                self.emit("cmpq $0, %rax");
                self.emit("sete %al");
                self.emit("movzbq %al, %rax");
            }
            UnOp::PreInc => self.generate_prefix_step(&unary.operand, "addq")?,
            UnOp::PreDec => self.generate_prefix_step(&unary.operand, "subq")?,
        }
        Ok(())
    }

    /// Prefix `++`/`--`: bump the slot, leaving the new value in `%rax`.
    fn generate_prefix_step(&mut self, operand: &Expr, op: &str) -> Result<()> {
        let offset = self.lvalue_offset(operand)?;
        self.emit(format!("movq {offset}(%rbp), %rax"));
        self.emit(format!("{op} $1, %rax"));
        self.emit(format!("movq %rax, {offset}(%rbp)"));
        Ok(())
    }

    /// Postfix `++`/`--`: bump the slot through a scratch register so
    /// `%rax` keeps the pre-update value.
    fn generate_postfix(&mut self, postfix: &PostfixExpr) -> Result<()> {
        let offset = self.lvalue_offset(&postfix.operand)?;
        let op = match postfix.op {
            PostfixOp::Inc => "addq",
            PostfixOp::Dec => "subq",
        };
        self.emit(format!("movq {offset}(%rbp), %rax"));
        self.emit("movq %rax, %rdi");
        self.emit(format!("{op} $1, %rdi"));
        self.emit(format!("movq %rdi, {offset}(%rbp)"));
        Ok(())
    }

    /// Resolves an increment/decrement target to its stack slot,
    /// enforcing the lvalue rule.
    fn lvalue_offset(&self, operand: &Expr) -> Result<i64> {
        match operand {
            Expr::Var(name) => self.scopes.resolve(name),
            _ => Err(CodeGenError::LvalueRequired),
        }
    }

    fn generate_binary(&mut self, binary: &BinaryExpr) -> Result<()> {
        match binary.op {
            BinOp::And => return self.generate_logical_and(binary),
            BinOp::Or => return self.generate_logical_or(binary),
            _ => {}
        }

        self.generate_expr(&binary.left)?;
        self.emit("pushq %rax");
        self.generate_expr(&binary.right)?;
        self.emit("popq %rdi");

        // %rdi holds the left operand, %rax the right.
        match binary.op {
            BinOp::Add => self.emit("addq %rdi, %rax"),
            BinOp::Sub => {
                self.emit("subq %rax, %rdi");
                self.emit("movq %rdi, %rax");
            }
            BinOp::Mul => self.emit("imulq %rdi, %rax"),
            BinOp::Div => {
                self.emit("xchg %rax, %rdi");
                self.emit("cqto");
                self.emit("idivq %rdi");
            }
            BinOp::Mod => {
                self.emit("xchg %rax, %rdi");
                self.emit("cqto");
                self.emit("idivq %rdi");
                self.emit("movq %rdx, %rax");
            }
            BinOp::BitAnd => self.emit("andq %rdi, %rax"),
            BinOp::BitOr => self.emit("orq %rdi, %rax"),
            BinOp::BitXor => self.emit("xorq %rdi, %rax"),
            BinOp::Shl => self.generate_shift("salq"),
            BinOp::Shr => self.generate_shift("sarq"),
            BinOp::Eq => self.generate_comparison("sete"),
            BinOp::Ne => self.generate_comparison("setne"),
            BinOp::Lt => self.generate_comparison("setl"),
            BinOp::Le => self.generate_comparison("setle"),
            BinOp::Gt => self.generate_comparison("setg"),
            BinOp::Ge => self.generate_comparison("setge"),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
        Ok(())
    }

    /// Shift: the shifted value is the left operand, the count the
    /// right, so swap before moving the count into `%cl`.
    fn generate_shift(&mut self, op: &str) {
        self.emit("xchg %rax, %rdi");
        self.emit("movq %rdi, %rcx");
        self.emit(format!("{op} %cl, %rax"));
    }

    /// Comparison: `cmpq %rax, %rdi` sets flags for left − right.
    fn generate_comparison(&mut self, set: &str) {
        self.emit("cmpq %rax, %rdi");
        self.emit(format!("{set} %al"));
        self.emit("movzbq %al, %rax");
    }

    /// `&&`: skip the right operand entirely when the left is zero.
    fn generate_logical_and(&mut self, binary: &BinaryExpr) -> Result<()> {
        self.generate_expr(&binary.left)?;
        self.emit("cmpq $0, %rax");
        let false_label = self.fresh_label("false");
        self.emit(format!("je {false_label}"));
        self.generate_expr(&binary.right)?;
        self.emit("cmpq $0, %rax");
        self.emit("setne %al");
        self.emit("movzbq %al, %rax");
        self.emit_label(&false_label);
        Ok(())
    }

    /// `||`: skip the right operand when the left is nonzero; the
    /// normalization after the label squashes either value to 0/1.
    fn generate_logical_or(&mut self, binary: &BinaryExpr) -> Result<()> {
        self.generate_expr(&binary.left)?;
        self.emit("cmpq $0, %rax");
        let true_label = self.fresh_label("true");
        self.emit(format!("jne {true_label}"));
        self.generate_expr(&binary.right)?;
        self.emit_label(&true_label);
        self.emit("cmpq $0, %rax");
        self.emit("setne %al");
        self.emit("movzbq %al, %rax");
        Ok(())
    }

    fn generate_assign(&mut self, assign: &AssignExpr) -> Result<()> {
        self.generate_expr(&assign.value)?;
        let offset = self.scopes.resolve(&assign.target)?;

        match assign.op {
            AssignOp::Simple => {
                self.emit(format!("movq %rax, {offset}(%rbp)"));
            }
            AssignOp::Add => self.generate_compound(offset, "addq %rax, %rdi"),
            AssignOp::Sub => self.generate_compound(offset, "subq %rax, %rdi"),
            AssignOp::Mul => self.generate_compound(offset, "imulq %rax, %rdi"),
            AssignOp::Div => {
                self.emit(format!("movq {offset}(%rbp), %rdi"));
                self.emit("xchg %rax, %rdi");
                self.emit("cqto");
                self.emit("idivq %rdi");
                self.emit(format!("movq %rax, {offset}(%rbp)"));
            }
            AssignOp::Mod => {
                self.emit(format!("movq {offset}(%rbp), %rdi"));
                self.emit("xchg %rax, %rdi");
                self.emit("cqto");
                self.emit("idivq %rdi");
                self.emit(format!("movq %rdx, {offset}(%rbp)"));
                self.emit("movq %rdx, %rax");
            }
            AssignOp::Shl => self.generate_compound_shift(offset, "salq"),
            AssignOp::Shr => self.generate_compound_shift(offset, "sarq"),
            AssignOp::BitAnd => self.generate_compound(offset, "andq %rax, %rdi"),
            AssignOp::BitOr => self.generate_compound(offset, "orq %rax, %rdi"),
            AssignOp::BitXor => self.generate_compound(offset, "xorq %rax, %rdi"),
        }
        Ok(())
    }

    /// Compound assignment body: load the slot into `%rdi`, combine with
    /// the value in `%rax`, store, and leave the result in `%rax` so the
    /// assignment has a value like any other expression.
    fn generate_compound(&mut self, offset: i64, combine: &str) {
        self.emit(format!("movq {offset}(%rbp), %rdi"));
        self.emit(combine);
        self.emit(format!("movq %rdi, {offset}(%rbp)"));
        self.emit("movq %rdi, %rax");
    }

    fn generate_compound_shift(&mut self, offset: i64, op: &str) {
        self.emit(format!("movq {offset}(%rbp), %rdi"));
        self.emit("movq %rax, %rcx");
        self.emit(format!("{op} %cl, %rdi"));
        self.emit(format!("movq %rdi, {offset}(%rbp)"));
        self.emit("movq %rdi, %rax");
    }

    fn generate_conditional(&mut self, cond: &ConditionalExpr) -> Result<()> {
        self.generate_expr(&cond.cond)?;
        self.emit("cmpq $0, %rax");
        let false_label = self.fresh_label("false");
        self.emit(format!("je {false_label}"));
        self.generate_expr(&cond.then_expr)?;
        let end_label = self.fresh_label("end");
        self.emit(format!("jmp {end_label}"));
        self.emit_label(&false_label);
        self.generate_expr(&cond.else_expr)?;
        self.emit_label(&end_label);
        Ok(())
    }

    // =========================================================================
    // EMISSION
    // =========================================================================

    /// Appends one indented instruction line.
    fn emit(&mut self, instr: impl AsRef<str>) {
        self.out.push_str("    ");
        self.out.push_str(instr.as_ref());
        self.out.push('\n');
    }

    /// Appends a label definition at column zero.
    fn emit_label(&mut self, label: &str) {
        self.out.push_str(label);
        self.out.push_str(":\n");
    }

    /// Function epilogue, shared by explicit returns and fall-through.
    fn emit_epilogue(&mut self) {
        self.emit("movq %rbp, %rsp");
        self.emit("popq %rbp");
        self.emit("ret");
    }

    /// Returns a fresh `.L<stem><n>` label, unique within this
    /// compilation.
    fn fresh_label(&mut self, stem: &str) -> String {
        let label = format!(".L{stem}{}", self.label_counter);
        self.label_counter += 1;
        label
    }
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}
