//! Abstract Syntax Tree (AST) for guest scripts.
//!
//! This module provides:
//! - AST node definitions for the supported language subset
//! - The parser that turns tokens into AST
//!
//! Every node lives in a `bumpalo` arena and borrows from it, so a whole
//! tree is released at once when the arena is dropped.

pub mod ops;

mod parser;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub use ecma_core::{ParseError, ParseErrorKind, ParseErrors};

pub use expr::*;
pub use ops::*;
pub use parser::{MAX_NESTING_DEPTH, Parser};
pub use stmt::*;

use ecma_core::Span;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    #[inline]
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A parsed script.
///
/// The script borrows from an arena allocator. All AST nodes are allocated
/// in the arena and remain valid for the lifetime of the arena.
#[derive(Debug, Clone, Copy)]
pub struct Script<'ast> {
    stmts: &'ast [Stmt<'ast>],
    span: Span,
}

impl<'ast> Script<'ast> {
    pub(crate) fn new(stmts: &'ast [Stmt<'ast>], span: Span) -> Self {
        Self { stmts, span }
    }

    /// Get the top-level statements in this script.
    pub fn stmts(&self) -> &'ast [Stmt<'ast>] {
        self.stmts
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
