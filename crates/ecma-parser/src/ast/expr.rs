//! Expression AST nodes.
//!
//! # Expression Precedence
//!
//! The parser uses Pratt parsing with the following precedence levels:
//! 1. Assignment (=, +=, etc.) - right associative
//! 2. Conditional (?:) - right associative
//! 3. Logical OR (||)
//! 4. Logical AND (&&)
//! 5. Bitwise OR (|)
//! 6. Bitwise XOR (^)
//! 7. Bitwise AND (&)
//! 8. Equality (==, !=, ===, !==)
//! 9. Relational (<, <=, >, >=, instanceof, in)
//! 10. Bitwise shift (<<, >>, >>>)
//! 11. Additive (+, -)
//! 12. Multiplicative (*, /, %)
//! 13. Prefix unary (-, +, !, ~, typeof, void, ++, --)
//! 14. Postfix (call, index, member, ++, --)
//!
//! Arrow functions and the comma operator sit outside the table: arrows are
//! only recognized where an assignment expression may start, and sequences
//! only where a full expression is allowed.

use ecma_core::Span;

use crate::ast::stmt::Block;
use crate::ast::{AssignOp, BinaryOp, Ident, PostfixOp, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    Ident(Ident<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Postfix(&'ast PostfixExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    /// `test ? then : else`
    Conditional(&'ast ConditionalExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    /// `object.name`
    Member(&'ast MemberExpr<'ast>),
    /// `object[index]`
    Index(&'ast IndexExpr<'ast>),
    /// `{ key: value, ... }`
    Object(&'ast ObjectExpr<'ast>),
    /// Function expression or arrow function
    Function(&'ast FunctionExpr<'ast>),
    /// `a, b, c`
    Sequence(&'ast SequenceExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Postfix(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Conditional(e) => e.span,
            Self::Call(e) => e.span,
            Self::New(e) => e.span,
            Self::Member(e) => e.span,
            Self::Index(e) => e.span,
            Self::Object(e) => e.span,
            Self::Function(e) => e.span,
            Self::Sequence(e) => e.span,
        }
    }

    /// Whether the expression may be the target of an assignment or update.
    pub fn is_assignment_target(&self) -> bool {
        matches!(self, Self::Ident(_) | Self::Member(_) | Self::Index(_))
    }

    /// Whether evaluating the expression can have an effect beyond its value.
    ///
    /// Calls, `new`, assignments and updates count. A function expression
    /// is pure; it only creates a value.
    pub fn has_side_effects(&self) -> bool {
        match self {
            Self::Literal(_) | Self::Ident(_) | Self::Function(_) => false,
            Self::Call(_) | Self::New(_) | Self::Assign(_) | Self::Postfix(_) => true,
            Self::Unary(e) => e.op.is_update() || e.operand.has_side_effects(),
            Self::Binary(e) => e.left.has_side_effects() || e.right.has_side_effects(),
            Self::Conditional(e) => {
                e.test.has_side_effects()
                    || e.then_expr.has_side_effects()
                    || e.else_expr.has_side_effects()
            }
            Self::Member(e) => e.object.has_side_effects(),
            Self::Index(e) => e.object.has_side_effects() || e.index.has_side_effects(),
            Self::Object(e) => e.properties.iter().any(|p| p.value.has_side_effects()),
            Self::Sequence(e) => e.exprs.iter().any(|x| x.has_side_effects()),
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Number(f64),
    /// String literal with escapes already resolved
    String(&'ast str),
    Bool(bool),
    Null,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// A postfix `++` or `--`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostfixExpr<'ast> {
    pub operand: &'ast Expr<'ast>,
    pub op: PostfixOp,
    pub span: Span,
}

/// An assignment, simple or compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub op: AssignOp,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalExpr<'ast> {
    pub test: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// A `new` expression. `new F` without parentheses has no arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub property: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

/// An object literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectExpr<'ast> {
    pub properties: &'ast [Property<'ast>],
    pub span: Span,
}

/// One `key: value` entry of an object literal.
///
/// Identifier, string and numeric keys are all normalized to their string
/// form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'ast> {
    pub key: &'ast str,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// A function expression, function declaration or arrow function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionExpr<'ast> {
    pub name: Option<Ident<'ast>>,
    pub params: &'ast [Ident<'ast>],
    pub body: FunctionBody<'ast>,
    pub is_arrow: bool,
    pub span: Span,
}

impl<'ast> FunctionExpr<'ast> {
    /// The name used in stack traces and `name` properties.
    pub fn display_name(&self) -> &'ast str {
        self.name.map_or("", |n| n.name)
    }
}

/// The body of a function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FunctionBody<'ast> {
    Block(Block<'ast>),
    /// Concise arrow body, `x => x + 1`
    Expr(&'ast Expr<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceExpr<'ast> {
    pub exprs: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}
