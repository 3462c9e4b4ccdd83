//! Expression parsing using Pratt parsing (precedence climbing).
//!
//! This module implements expression parsing with proper operator precedence
//! and associativity using the Pratt parsing algorithm. Arrow functions are
//! recognized by scanning ahead, before the Pratt loop starts.

use bumpalo::collections::Vec as BVec;

use ecma_core::runtime::number_to_string;
use ecma_core::{ParseError, ParseErrorKind, Span};

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::stmt::Block;
use crate::ast::{AssignOp, BinaryOp, Ident, PostfixOp, UnaryOp};
use crate::lexer::TokenKind;

/// Binding power of `?:`.
const CONDITIONAL_BP: u8 = 3;

impl<'ast> Parser<'ast> {
    /// Parse a full expression, including the comma operator.
    pub fn parse_expression(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let first = self.parse_assignment()?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }

        let mut exprs = BVec::new_in(self.arena);
        exprs.push(first);
        while self.eat(TokenKind::Comma).is_some() {
            exprs.push(self.parse_assignment()?);
        }

        let span = first.span().merge(exprs[exprs.len() - 1].span());
        Ok(self.arena.alloc(Expr::Sequence(self.arena.alloc(SequenceExpr {
            exprs: self.arena.alloc_slice_copy(&exprs),
            span,
        }))))
    }

    /// Parse an assignment expression: anything but a bare sequence.
    pub fn parse_assignment(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        if self.is_arrow_start() {
            return self.parse_arrow();
        }
        self.parse_expr(0)
    }

    /// Parse an expression with a minimum binding power.
    ///
    /// This is the core of the Pratt parser. It handles operator precedence
    /// by only consuming operators with sufficient binding power.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        self.nested(|p| p.parse_operator_chain(min_bp))
    }

    /// Pratt loop. Each operator folded into `lhs` deepens the tree by one.
    fn parse_operator_chain(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let token = *self.peek();

            // Postfix ++/-- may not follow a line break.
            if let Some(postfix_op) = PostfixOp::from_token(token.kind) {
                if PostfixOp::binding_power() < min_bp || token.newline_before {
                    break;
                }
                if !lhs.is_assignment_target() {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidAssignment,
                        token.span,
                        "Invalid increment operand.",
                    ));
                }
                self.advance();
                self.deepen()?;
                let span = lhs.span().merge(token.span);
                lhs = self.arena.alloc(Expr::Postfix(self.arena.alloc(PostfixExpr {
                    operand: lhs,
                    op: postfix_op,
                    span,
                })));
                continue;
            }

            match token.kind {
                TokenKind::Dot | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    if PostfixOp::binding_power() < min_bp {
                        break;
                    }
                    self.deepen()?;
                    lhs = match token.kind {
                        TokenKind::Dot => self.parse_member_access(lhs)?,
                        TokenKind::LeftParen => self.parse_call(lhs)?,
                        _ => self.parse_index(lhs)?,
                    };
                    continue;
                }
                TokenKind::Question => {
                    if CONDITIONAL_BP < min_bp {
                        break;
                    }
                    self.deepen()?;
                    lhs = self.parse_conditional(lhs)?;
                    continue;
                }
                _ => {}
            }

            if let Some(assign_op) = AssignOp::from_token(token.kind) {
                let (l_bp, _) = AssignOp::binding_power();
                if l_bp < min_bp {
                    break;
                }
                if !lhs.is_assignment_target() {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidAssignment,
                        lhs.span(),
                        "Invalid assignment left-hand side.",
                    ));
                }

                self.advance();
                self.deepen()?;
                let rhs = self.parse_assignment()?;
                let span = lhs.span().merge(rhs.span());
                lhs = self.arena.alloc(Expr::Assign(self.arena.alloc(AssignExpr {
                    target: lhs,
                    op: assign_op,
                    value: rhs,
                    span,
                })));
                continue;
            }

            if let Some(bin_op) = BinaryOp::from_token(token.kind) {
                let (l_bp, r_bp) = bin_op.binding_power();
                if l_bp < min_bp {
                    break;
                }

                self.advance();
                self.deepen()?;
                let rhs = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(rhs.span());
                lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                    left: lhs,
                    op: bin_op,
                    right: rhs,
                    span,
                })));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Parse a prefix expression (the start of an expression).
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        let Some(op) = UnaryOp::from_token(token.kind) else {
            return self.parse_primary();
        };

        self.advance();
        let operand = self.parse_expr(UnaryOp::binding_power())?;
        if op.is_update() && !operand.is_assignment_target() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAssignment,
                operand.span(),
                "Invalid increment operand.",
            ));
        }

        let span = token.span.merge(operand.span());
        Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span }))))
    }

    /// Literals, identifiers, parenthesized expressions, function and object
    /// literals, and `new`.
    fn parse_primary(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        let literal = match token.kind {
            TokenKind::Number => LiteralKind::Number(parse_number(token.lexeme)),
            TokenKind::String => LiteralKind::String(self.arena.alloc_str(&unescape(token.lexeme))),
            TokenKind::True => LiteralKind::Bool(true),
            TokenKind::False => LiteralKind::Bool(false),
            TokenKind::Null => LiteralKind::Null,

            kind if self.is_identifier(kind) => {
                self.advance();
                return Ok(self.arena.alloc(Expr::Ident(Ident::new(token.lexeme, token.span))));
            }

            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "missing ) in parenthetical")?;
                return Ok(expr);
            }

            TokenKind::Function => {
                let function = self.parse_function(false)?;
                return Ok(self.arena.alloc(Expr::Function(function)));
            }

            TokenKind::LeftBrace => return self.parse_object(),
            TokenKind::New => return self.parse_new(),
            TokenKind::Eof => return Err(ParseError::unexpected_eof(token.span)),

            _ => return Err(ParseError::syntax_error(token.span)),
        };

        self.advance();
        Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
            kind: literal,
            span: token.span,
        })))
    }

    // =========================================
    // Postfix forms
    // =========================================

    fn parse_member_access(
        &mut self,
        object: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.advance(); // '.'
        let name = *self.peek();
        if name.kind != TokenKind::Identifier && !name.kind.is_keyword() {
            return Err(ParseError::missing(name.span, "missing name after . operator"));
        }
        self.advance();

        Ok(self.arena.alloc(Expr::Member(self.arena.alloc(MemberExpr {
            object,
            property: Ident::new(name.lexeme, name.span),
            span: object.span().merge(name.span),
        }))))
    }

    fn parse_call(&mut self, callee: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        let (args, end_span) = self.parse_arguments()?;
        Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            callee,
            args,
            span: callee.span().merge(end_span),
        }))))
    }

    fn parse_index(&mut self, object: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.advance(); // '['
        let index = self.parse_expression()?;
        let end_span = self.expect(TokenKind::RightBracket, "missing ] in index expression")?.span;

        Ok(self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
            object,
            index,
            span: object.span().merge(end_span),
        }))))
    }

    /// Parse `( args )`, returning the arguments and the closing paren span.
    fn parse_arguments(&mut self) -> Result<(&'ast [&'ast Expr<'ast>], Span), ParseError> {
        self.advance(); // '('
        let mut args = BVec::new_in(self.arena);

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_assignment()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let end_span = self.expect(TokenKind::RightParen, "missing ) after argument list")?.span;
        Ok((self.arena.alloc_slice_copy(&args), end_span))
    }

    fn parse_conditional(
        &mut self,
        test: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.advance(); // '?'
        let then_expr = self.parse_assignment()?;
        self.expect(TokenKind::Colon, "missing : in conditional expression")?;
        let else_expr = self.parse_assignment()?;

        Ok(self.arena.alloc(Expr::Conditional(self.arena.alloc(ConditionalExpr {
            test,
            then_expr,
            else_expr,
            span: test.span().merge(else_expr.span()),
        }))))
    }

    /// Parse `new Callee(args)`; the argument list is optional.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        self.nested(Self::parse_new_callee)
    }

    fn parse_new_callee(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start_span = self.advance().span;

        let mut callee = if self.check(TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        // Member accesses bind tighter than the argument list of `new`.
        loop {
            callee = match self.peek().kind {
                TokenKind::Dot => {
                    self.deepen()?;
                    self.parse_member_access(callee)?
                }
                TokenKind::LeftBracket => {
                    self.deepen()?;
                    self.parse_index(callee)?
                }
                _ => break,
            };
        }

        let (args, end_span) = if self.check(TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            (&[][..], callee.span())
        };

        Ok(self.arena.alloc(Expr::New(self.arena.alloc(NewExpr {
            callee,
            args,
            span: start_span.merge(end_span),
        }))))
    }

    // =========================================
    // Object literals
    // =========================================

    fn parse_object(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start_span = self.advance().span;
        let mut properties = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) {
            let key_token = *self.peek();
            let key: &'ast str = match key_token.kind {
                TokenKind::Identifier => key_token.lexeme,
                kind if kind.is_keyword() => key_token.lexeme,
                TokenKind::String => &*self.arena.alloc_str(&unescape(key_token.lexeme)),
                TokenKind::Number => {
                    let number = parse_number(key_token.lexeme);
                    &*self.arena.alloc_str(&number_to_string(number))
                }
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken,
                        key_token.span,
                        "invalid property id",
                    ));
                }
            };
            self.advance();
            self.expect(TokenKind::Colon, "missing : after property id")?;
            let value = self.parse_assignment()?;
            properties.push(Property {
                key,
                value,
                span: key_token.span.merge(value.span()),
            });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let end_span = self.expect(TokenKind::RightBrace, "missing } after property list")?.span;
        Ok(self.arena.alloc(Expr::Object(self.arena.alloc(ObjectExpr {
            properties: self.arena.alloc_slice_copy(&properties),
            span: start_span.merge(end_span),
        }))))
    }

    // =========================================
    // Functions
    // =========================================

    /// Parse `function name?(params) { body }`.
    ///
    /// Declarations must be named; expressions may be anonymous.
    pub(super) fn parse_function(
        &mut self,
        is_declaration: bool,
    ) -> Result<&'ast FunctionExpr<'ast>, ParseError> {
        let start_span = self.advance().span; // 'function'

        let name = if self.is_identifier(self.peek().kind) {
            let token = self.advance();
            Some(Ident::new(token.lexeme, token.span))
        } else if is_declaration {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedIdentifier,
                self.peek().span,
                "missing name after function keyword",
            ));
        } else {
            None
        };

        let params = self.parse_params()?;
        let body = self.in_function_body(|p| p.parse_function_block())?;

        Ok(self.arena.alloc(FunctionExpr {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            span: start_span.merge(body.span),
        }))
    }

    fn parse_params(&mut self) -> Result<&'ast [Ident<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen, "missing ( before function parameters.")?;
        let mut params = BVec::new_in(self.arena);

        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.expect_identifier("missing formal parameter")?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "missing ) after formal parameters")?;
        Ok(self.arena.alloc_slice_copy(&params))
    }

    fn parse_function_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let start_span = self
            .expect(TokenKind::LeftBrace, "missing '{' before function body")?
            .span;
        let stmts = self.parse_statement_list();
        let end_span = self.expect(TokenKind::RightBrace, "missing } after function body")?.span;
        Ok(Block {
            stmts,
            span: start_span.merge(end_span),
        })
    }

    /// Whether the upcoming tokens are `ident =>` or `( ... ) =>`.
    fn is_arrow_start(&self) -> bool {
        let token = self.peek();
        if self.is_identifier(token.kind) {
            return self.peek_nth(1).kind == TokenKind::Arrow;
        }
        if token.kind != TokenKind::LeftParen {
            return false;
        }

        // A parameter list holds only identifiers and commas.
        let mut n = 1;
        loop {
            let kind = self.peek_nth(n).kind;
            match kind {
                TokenKind::RightParen => return self.peek_nth(n + 1).kind == TokenKind::Arrow,
                TokenKind::Comma => {}
                _ if self.is_identifier(kind) => {}
                _ => return false,
            }
            n += 1;
        }
    }

    /// Parse `x => body` or `(a, b) => body`.
    fn parse_arrow(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start_span = self.peek().span;

        let params = if self.check(TokenKind::LeftParen) {
            self.parse_params()?
        } else {
            let param = self.expect_identifier("missing formal parameter")?;
            self.arena.alloc_slice_copy(&[param])
        };

        let arrow = self.expect(TokenKind::Arrow, "syntax error")?;
        if !self.version.supports_arrow_functions() {
            let kind = ParseErrorKind::UnsupportedSyntax;
            return Err(ParseError::new(kind, arrow.span, "syntax error"));
        }

        let body = if self.check(TokenKind::LeftBrace) {
            FunctionBody::Block(self.in_function_body(|p| p.parse_function_block())?)
        } else {
            FunctionBody::Expr(self.in_function_body(|p| p.parse_assignment())?)
        };
        let end_span = match body {
            FunctionBody::Block(block) => block.span,
            FunctionBody::Expr(expr) => expr.span(),
        };

        let function = self.arena.alloc(FunctionExpr {
            name: None,
            params,
            body,
            is_arrow: true,
            span: start_span.merge(end_span),
        });
        Ok(self.arena.alloc(Expr::Function(function)))
    }
}

/// Numeric value of a number token.
fn parse_number(lexeme: &str) -> f64 {
    match lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        Some(hex) => hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(0.0, |acc, digit| acc * 16.0 + f64::from(digit)),
        None => lexeme.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Resolve the escapes of a quoted string token, dropping the quotes.
fn unescape(lexeme: &str) -> String {
    let body = lexeme.get(1..lexeme.len().saturating_sub(1)).unwrap_or_default();
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' | 'u' => {
                let width = if escaped == 'x' { 2 } else { 4 };
                let digits: String = chars.clone().take(width).collect();
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|_| digits.len() == width)
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => out.push(escaped),
                }
            }
            // Line continuation
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    out
}
