//! Statement AST nodes.
//!
//! Provides nodes for all statement types including:
//! - Expression statements and declarations
//! - Control flow (if, while, do-while, for)
//! - Jump statements (return, break, continue, throw)
//! - Exception handling (try / catch / finally)
//! - Blocks

use ecma_core::Span;

use crate::ast::Ident;
use crate::ast::expr::{Expr, FunctionExpr};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement (expr;)
    Expr(ExprStmt<'ast>),
    /// `var`, `let` or `const` declaration
    VarDecl(VarDeclStmt<'ast>),
    /// Function declaration
    Function(&'ast FunctionExpr<'ast>),
    Return(ReturnStmt<'ast>),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Throw(ThrowStmt<'ast>),
    Block(Block<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    Try(&'ast TryStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Function(s) => s.span,
            Self::Return(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
            Self::Throw(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::DoWhile(s) => s.span,
            Self::For(s) => s.span,
            Self::Try(s) => s.span,
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression (None for the empty statement `;`)
    pub expr: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// Which keyword introduced a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }

    /// `let` and `const` bind in the enclosing block rather than the function.
    pub fn is_block_scoped(&self) -> bool {
        !matches!(self, DeclKind::Var)
    }
}

/// A variable declaration statement.
///
/// Examples:
/// - `var x;`
/// - `let x = 5, y = 10;`
/// - `const LIMIT = 3;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    pub kind: DeclKind,
    pub vars: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

/// A single variable declarator within a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    pub name: Ident<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// A block of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_stmt: &'ast Stmt<'ast>,
    pub else_stmt: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    pub body: &'ast Stmt<'ast>,
    pub condition: &'ast Expr<'ast>,
    pub span: Span,
}

/// A C-style `for (init; condition; update)` loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    pub init: Option<ForInit<'ast>>,
    pub condition: Option<&'ast Expr<'ast>>,
    pub update: Option<&'ast Expr<'ast>>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// The initializer clause of a `for` loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForInit<'ast> {
    VarDecl(VarDeclStmt<'ast>),
    Expr(&'ast Expr<'ast>),
}

/// A `try` statement. At least one of `catch` and `finally` is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    pub block: Block<'ast>,
    pub catch: Option<CatchClause<'ast>>,
    pub finally: Option<Block<'ast>>,
    pub span: Span,
}

/// `catch (e) { ... }`, or `catch { ... }` with no binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchClause<'ast> {
    pub param: Option<Ident<'ast>>,
    pub body: Block<'ast>,
    pub span: Span,
}
