//! Statement parsing functions.
//!
//! Implements parsing of declarations, control flow, loops, jumps, blocks
//! and `try` statements, with automatic semicolon insertion.

use bumpalo::collections::Vec as BVec;

use ecma_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

const THROW_LINE_BREAK: &str =
    "Line terminator is not allowed between the throw keyword and the throw expression.";

impl<'ast> Parser<'ast> {
    /// Parse a statement.
    ///
    /// This is the main entry point for statement parsing and dispatches
    /// to specific statement parsers based on the current token.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        self.nested(Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::Var => self.parse_var_stmt(DeclKind::Var),
            TokenKind::Let if self.version.supports_block_scope() => {
                self.parse_var_stmt(DeclKind::Let)
            }
            TokenKind::Const => {
                if !self.version.supports_block_scope() {
                    let kind = ParseErrorKind::UnsupportedSyntax;
                    return Err(ParseError::new(kind, token.span, "syntax error"));
                }
                self.parse_var_stmt(DeclKind::Const)
            }
            TokenKind::Function => Ok(Stmt::Function(self.parse_function(true)?)),

            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Try => self.parse_try(),

            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::Throw => self.parse_throw(),

            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block("syntax error")?)),

            TokenKind::Semicolon => {
                let span = self.advance().span;
                Ok(Stmt::Expr(ExprStmt { expr: None, span }))
            }

            _ => self.parse_expr_stmt(),
        }
    }

    /// Parse an expression statement.
    pub fn parse_expr_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_expression()?;
        let end_span = self.consume_semicolon()?;

        Ok(Stmt::Expr(ExprStmt {
            expr: Some(expr),
            span: expr.span().merge(end_span),
        }))
    }

    fn parse_var_stmt(&mut self, kind: DeclKind) -> Result<Stmt<'ast>, ParseError> {
        let decl = self.parse_var_decl(kind)?;
        let end_span = self.consume_semicolon()?;
        Ok(Stmt::VarDecl(VarDeclStmt {
            span: decl.span.merge(end_span),
            ..decl
        }))
    }

    /// Parse a declaration without its terminating semicolon.
    ///
    /// Grammar: `('var' | 'let' | 'const') IDENT ('=' ASSIGN)? (',' IDENT ('=' ASSIGN)?)*`
    fn parse_var_decl(&mut self, kind: DeclKind) -> Result<VarDeclStmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        let mut vars = BVec::new_in(self.arena);

        loop {
            let name = self.expect_identifier("missing variable name")?;
            let init = if self.eat(TokenKind::Equal).is_some() {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let span = init.map_or(name.span, |e| name.span.merge(e.span()));
            vars.push(VarDeclarator { name, init, span });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let end_span = vars.last().map_or(start_span, |v| v.span);
        Ok(VarDeclStmt {
            kind,
            vars: self.arena.alloc_slice_copy(&vars),
            span: start_span.merge(end_span),
        })
    }

    // =========================================
    // Blocks
    // =========================================

    /// Parse a block statement.
    ///
    /// Grammar: `'{' STATEMENT* '}'`. `open_message` reports a missing `{`.
    pub fn parse_block(&mut self, open_message: &str) -> Result<Block<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::LeftBrace, open_message)?.span;
        let stmts = self.parse_statement_list();
        let end_span = self.expect(TokenKind::RightBrace, "missing } in compound statement")?.span;

        Ok(Block {
            stmts,
            span: start_span.merge(end_span),
        })
    }

    /// Parse statements up to a `}` or the end of input, recovering from
    /// errors at statement boundaries.
    pub(super) fn parse_statement_list(&mut self) -> &'ast [Stmt<'ast>] {
        let mut stmts = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        self.arena.alloc_slice_copy(&stmts)
    }

    // =========================================
    // Control flow
    // =========================================

    /// Parse `'(' EXPR ')'` around a condition.
    fn parse_condition(&mut self) -> Result<&'ast crate::ast::Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen, "missing ( before condition")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "missing ) after condition")?;
        Ok(condition)
    }

    /// Grammar: `'if' '(' EXPR ')' STATEMENT ('else' STATEMENT)?`
    pub fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        let condition = self.parse_condition()?;

        let then_stmt: &'ast Stmt<'ast> = self.arena.alloc(self.parse_statement()?);
        let else_stmt: Option<&'ast Stmt<'ast>> = if self.eat(TokenKind::Else).is_some() {
            Some(self.arena.alloc(self.parse_statement()?))
        } else {
            None
        };

        let end_span = else_stmt.unwrap_or(then_stmt).span();
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: start_span.merge(end_span),
        })))
    }

    /// Grammar: `'while' '(' EXPR ')' STATEMENT`
    pub fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        let condition = self.parse_condition()?;
        let body: &'ast Stmt<'ast> = self.arena.alloc(self.in_loop_body(|p| p.parse_statement())?);

        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: start_span.merge(body.span()),
        })))
    }

    /// Grammar: `'do' STATEMENT 'while' '(' EXPR ')' ';'?`
    pub fn parse_do_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        let body: &'ast Stmt<'ast> = self.arena.alloc(self.in_loop_body(|p| p.parse_statement())?);

        self.expect(TokenKind::While, "missing while after do-loop body")?;
        self.expect(TokenKind::LeftParen, "missing ( before condition")?;
        let condition = self.parse_expression()?;
        let mut end_span = self.expect(TokenKind::RightParen, "missing ) after condition")?.span;
        // The semicolon after a do-while is always optional.
        if let Some(semi) = self.eat(TokenKind::Semicolon) {
            end_span = semi.span;
        }

        Ok(Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            condition,
            span: start_span.merge(end_span),
        })))
    }

    /// Grammar: `'for' '(' INIT? ';' EXPR? ';' EXPR? ')' STATEMENT`
    pub fn parse_for(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        self.expect(TokenKind::LeftParen, "missing ( after for")?;

        let init = match self.peek().kind {
            TokenKind::Semicolon => None,
            TokenKind::Var => Some(ForInit::VarDecl(self.parse_var_decl(DeclKind::Var)?)),
            TokenKind::Let if self.version.supports_block_scope() => {
                Some(ForInit::VarDecl(self.parse_var_decl(DeclKind::Let)?))
            }
            TokenKind::Const if self.version.supports_block_scope() => {
                Some(ForInit::VarDecl(self.parse_var_decl(DeclKind::Const)?))
            }
            _ => Some(ForInit::Expr(self.parse_expression()?)),
        };
        self.expect(TokenKind::Semicolon, "missing ; after for-loop initializer")?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "missing ; after for-loop condition")?;

        let update = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RightParen, "missing ) after for-loop control")?;

        let body: &'ast Stmt<'ast> = self.arena.alloc(self.in_loop_body(|p| p.parse_statement())?);

        Ok(Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            update,
            body,
            span: start_span.merge(body.span()),
        })))
    }

    // =========================================
    // Jumps
    // =========================================

    /// Grammar: `'return' EXPR? ';'`. A line break ends a bare `return`.
    pub fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        if self.function_depth == 0 {
            let kind = ParseErrorKind::InvalidReturn;
            return Err(ParseError::new(kind, start_span, "invalid return"));
        }

        let next = *self.peek();
        let ends_here = matches!(
            next.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) || next.newline_before;
        let value = if ends_here { None } else { Some(self.parse_expression()?) };

        let end_span = self.consume_semicolon()?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start_span.merge(end_span),
        }))
    }

    pub fn parse_break(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        if self.loop_depth == 0 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidJump,
                start_span,
                "unlabelled break must be inside loop or switch",
            ));
        }
        let end_span = self.consume_semicolon()?;
        Ok(Stmt::Break(BreakStmt {
            span: start_span.merge(end_span),
        }))
    }

    pub fn parse_continue(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        if self.loop_depth == 0 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidJump,
                start_span,
                "continue must be inside loop",
            ));
        }
        let end_span = self.consume_semicolon()?;
        Ok(Stmt::Continue(ContinueStmt {
            span: start_span.merge(end_span),
        }))
    }

    /// Grammar: `'throw' EXPR ';'`, with no line break after `throw`.
    pub fn parse_throw(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        if self.peek().newline_before {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                self.peek().span,
                THROW_LINE_BREAK,
            ));
        }

        let value = self.parse_expression()?;
        let end_span = self.consume_semicolon()?;
        Ok(Stmt::Throw(ThrowStmt {
            value,
            span: start_span.merge(end_span),
        }))
    }

    // =========================================
    // Exception handling
    // =========================================

    /// Grammar: `'try' BLOCK ('catch' ('(' IDENT ')')? BLOCK)? ('finally' BLOCK)?`
    pub fn parse_try(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.advance().span;
        let block = self.parse_block("missing { before try block")?;

        let catch = match self.eat(TokenKind::Catch) {
            Some(catch_token) => {
                let param = if self.eat(TokenKind::LeftParen).is_some() {
                    let param = self.expect_identifier("invalid catch block condition")?;
                    self.expect(TokenKind::RightParen, "missing ) after catch-block condition")?;
                    Some(param)
                } else {
                    None
                };
                let body = self.parse_block("missing '{' before catch-block body")?;
                Some(CatchClause {
                    param,
                    body,
                    span: catch_token.span.merge(body.span),
                })
            }
            None => None,
        };

        let finally = if self.eat(TokenKind::Finally).is_some() {
            Some(self.parse_block("missing { before finally block")?)
        } else {
            None
        };

        let end_span = match (finally, catch) {
            (Some(block), _) => block.span,
            (None, Some(clause)) => clause.span,
            (None, None) => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedToken,
                    self.peek().span,
                    "'try' without 'catch' or 'finally'",
                ));
            }
        };

        Ok(Stmt::Try(self.arena.alloc(TryStmt {
            block,
            catch,
            finally,
            span: start_span.merge(end_span),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Parser};
    use bumpalo::Bump;
    use ecma_core::LanguageVersion;

    fn parse_one<'ast>(source: &str, arena: &'ast Bump) -> Stmt<'ast> {
        let script = Parser::parse(source, arena).unwrap();
        assert_eq!(script.stmts().len(), 1, "{source}");
        script.stmts()[0]
    }

    fn first_message(source: &str) -> String {
        let arena = Bump::new();
        let errors = Parser::parse(source, &arena).unwrap_err();
        errors.first().map(|e| e.message.clone()).unwrap_or_default()
    }

    #[test]
    fn parse_empty_stmt() {
        let arena = Bump::new();
        match parse_one(";", &arena) {
            Stmt::Expr(expr_stmt) => assert!(expr_stmt.expr.is_none()),
            _ => panic!("Expected empty expression statement"),
        }
    }

    #[test]
    fn parse_declarations() {
        let arena = Bump::new();
        match parse_one("let x = 1, y;", &arena) {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.kind, DeclKind::Let);
                assert_eq!(decl.vars.len(), 2);
                assert!(decl.vars[1].init.is_none());
            }
            _ => panic!("Expected declaration"),
        }
        let stmt = parse_one("const c = 3", &arena);
        assert!(matches!(stmt, Stmt::VarDecl(d) if d.kind == DeclKind::Const));
    }

    #[test]
    fn let_is_an_identifier_before_1_7() {
        let arena = Bump::new();
        let (script, errors) = Parser::parse_versioned("let = 5;", &arena, LanguageVersion::V1_6);
        assert!(errors.is_empty());
        assert!(matches!(script.stmts()[0], Stmt::Expr(_)));

        let (_, errors) = Parser::parse_versioned("const c = 1;", &arena, LanguageVersion::V1_6);
        assert_eq!(errors.first().map(|e| e.kind), Some(ParseErrorKind::UnsupportedSyntax));
    }

    #[test]
    fn automatic_semicolons() {
        let arena = Bump::new();
        let script = Parser::parse("var a = 1\nvar b = 2\na = b", &arena).unwrap();
        assert_eq!(script.stmts().len(), 3);
        assert_eq!(first_message("var a = 1 var b = 2"), "missing ; before statement");
    }

    #[test]
    fn restricted_return() {
        let arena = Bump::new();
        let script = Parser::parse("function f() { return\n1 }", &arena).unwrap();
        match script.stmts()[0] {
            Stmt::Function(f) => match f.body {
                crate::ast::FunctionBody::Block(block) => {
                    assert!(matches!(block.stmts[0], Stmt::Return(r) if r.value.is_none()));
                    assert_eq!(block.stmts.len(), 2);
                }
                _ => panic!("Expected block body"),
            },
            _ => panic!("Expected function"),
        }
    }

    #[test]
    fn postfix_after_line_break_starts_new_statement() {
        let arena = Bump::new();
        let script = Parser::parse("a\n++b", &arena).unwrap();
        assert_eq!(script.stmts().len(), 2);
    }

    #[test]
    fn throw_requires_expression_on_same_line() {
        assert_eq!(
            first_message("throw\n1;"),
            "Line terminator is not allowed between the throw keyword and the throw expression."
        );
    }

    #[test]
    fn parse_try_forms() {
        let arena = Bump::new();
        match parse_one("try { a(); } catch (e) { b(); } finally { c(); }", &arena) {
            Stmt::Try(t) => {
                assert_eq!(t.catch.and_then(|c| c.param).map(|p| p.name), Some("e"));
                assert!(t.finally.is_some());
            }
            _ => panic!("Expected try statement"),
        }
        match parse_one("try { } catch { }", &arena) {
            Stmt::Try(t) => assert!(t.catch.is_some_and(|c| c.param.is_none())),
            _ => panic!("Expected try statement"),
        }
        let stmt = parse_one("try { } finally { }", &arena);
        assert!(matches!(stmt, Stmt::Try(t) if t.catch.is_none()));
        assert_eq!(first_message("try { } x();"), "'try' without 'catch' or 'finally'");
    }

    #[test]
    fn parse_loops() {
        let arena = Bump::new();
        match parse_one("for (var i = 0; i < 10; i++) { if (i) break; else continue; }", &arena) {
            Stmt::For(f) => {
                assert!(matches!(f.init, Some(ForInit::VarDecl(_))));
                assert!(f.condition.is_some() && f.update.is_some());
            }
            _ => panic!("Expected for loop"),
        }
        assert!(matches!(parse_one("for (;;) {}", &arena), Stmt::For(f) if f.init.is_none()));
        assert!(matches!(parse_one("do x++; while (x < 3)", &arena), Stmt::DoWhile(_)));
        assert!(matches!(parse_one("while (a) a--;", &arena), Stmt::While(_)));
    }

    #[test]
    fn jumps_are_checked_against_context() {
        assert_eq!(first_message("return 1;"), "invalid return");
        assert_eq!(first_message("break;"), "unlabelled break must be inside loop or switch");
        assert_eq!(first_message("continue;"), "continue must be inside loop");
        // A function body does not inherit the enclosing loop.
        assert_eq!(
            first_message("for (;;) { var f = function() { break; }; }"),
            "unlabelled break must be inside loop or switch"
        );
        assert_eq!(first_message("for (;;) a => { continue; };"), "continue must be inside loop");
    }

    #[test]
    fn function_statement_requires_name() {
        assert_eq!(first_message("function("), "missing name after function keyword");
        assert_eq!(first_message("function f("), "missing formal parameter");
        assert_eq!(first_message("function f) {}"), "missing ( before function parameters.");
    }

    #[test]
    fn control_flow_messages() {
        assert_eq!(first_message("if x) {}"), "missing ( before condition");
        assert_eq!(first_message("if (x {}"), "missing ) after condition");
        assert_eq!(first_message("for x"), "missing ( after for");
        assert_eq!(first_message("for (i = 0 i < 1;) {}"), "missing ; after for-loop initializer");
        assert_eq!(first_message("for (;; i++ {}"), "missing ) after for-loop control");
        assert_eq!(first_message("do {} until (x);"), "missing while after do-loop body");
        assert_eq!(first_message("{ var a = 1;"), "missing } in compound statement");
        assert_eq!(first_message("var 1;"), "missing variable name");
    }

    #[test]
    fn deeply_nested_blocks_report_one_error() {
        let source = format!("{}{}", "{".repeat(20_000), "}".repeat(20_000));
        let arena = Bump::new();
        let errors = Parser::parse(&source, &arena).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(|e| e.kind), Some(ParseErrorKind::TooDeep));
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let arena = Bump::new();
        let source = format!("{}x;{}", "if (a) {".repeat(40), "}".repeat(40));
        assert!(Parser::parse(&source, &arena).is_ok());
    }

    #[test]
    fn function_expression_statement_value() {
        let arena = Bump::new();
        match parse_one("f = function named(a, b) { return a; };", &arena) {
            Stmt::Expr(ExprStmt { expr: Some(Expr::Assign(assign)), .. }) => match assign.value {
                Expr::Function(f) => {
                    assert_eq!(f.display_name(), "named");
                    assert_eq!(f.params.len(), 2);
                }
                _ => panic!("Expected function expression"),
            },
            _ => panic!("Expected assignment"),
        }
    }
}
