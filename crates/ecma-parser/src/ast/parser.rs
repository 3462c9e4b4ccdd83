//! Parser state and token-level helpers.
//!
//! The whole source is tokenized up front. Lexical errors are recorded as
//! parse errors right away and their `Error` tokens dropped, so the grammar
//! code never sees them.

use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;

use ecma_core::{
    COMPILE_STACK_BUDGET, LanguageVersion, ParseError, ParseErrorKind, ParseErrors, Span,
    StackGuard,
};

use crate::ast::expr::Expr;
use crate::ast::{Ident, Script};
use crate::lexer::{Lexer, Token, TokenKind};

/// Deepest syntax tree the parser builds.
///
/// Every nested statement or expression and every link of an operator,
/// member or call chain counts as one level, so later passes over the tree
/// can recurse without a guard of their own.
pub const MAX_NESTING_DEPTH: u32 = 1000;

/// Recursive-descent parser over a token buffer.
///
/// Statement and expression grammar live in `stmt_parser` and `expr_parser`;
/// this type owns the cursor, the error list and the context flags that
/// decide whether `return`, `break` and `continue` are allowed.
pub struct Parser<'ast> {
    tokens: Vec<Token<'ast>>,
    pos: usize,
    pub(super) arena: &'ast Bump,
    pub(super) errors: Vec<ParseError>,
    pub(super) version: LanguageVersion,
    /// Number of enclosing function bodies.
    pub(super) function_depth: u32,
    /// Number of enclosing loops within the current function.
    pub(super) loop_depth: u32,
    /// Depth of the syntax tree under construction.
    nesting: u32,
    stack: StackGuard,
    /// Set once nesting overflowed; the rest of the input is skipped.
    abandoned: bool,
}

impl<'ast> Parser<'ast> {
    /// Create a parser at the default language version.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        Self::with_version(source, arena, LanguageVersion::default())
    }

    pub fn with_version(source: &str, arena: &'ast Bump, version: LanguageVersion) -> Self {
        let (lexed, lex_errors) = Lexer::new(source, arena).tokenize();

        let mut tokens = Vec::with_capacity(lexed.len());
        let mut carry_newline = false;
        for mut token in lexed {
            if token.kind == TokenKind::Error {
                carry_newline |= token.newline_before;
                continue;
            }
            token.newline_before |= carry_newline;
            carry_newline = false;
            tokens.push(token);
        }

        Self {
            tokens,
            pos: 0,
            arena,
            errors: lex_errors.into_iter().map(ParseError::from).collect(),
            version,
            function_depth: 0,
            loop_depth: 0,
            nesting: 0,
            stack: StackGuard::anchor(COMPILE_STACK_BUDGET),
            abandoned: false,
        }
    }

    /// Parse a complete script, failing if any error was found.
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Script<'ast>, ParseErrors> {
        let (script, errors) = Self::parse_lenient(source, arena);
        if errors.is_empty() { Ok(script) } else { Err(errors) }
    }

    /// Parse a script, recovering from errors.
    ///
    /// Returns whatever statements parsed cleanly along with every error, in
    /// source order.
    pub fn parse_lenient(source: &str, arena: &'ast Bump) -> (Script<'ast>, ParseErrors) {
        Self::parse_versioned(source, arena, LanguageVersion::default())
    }

    /// [`parse_lenient`](Self::parse_lenient) at an explicit language version.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_versioned(
        source: &str,
        arena: &'ast Bump,
        version: LanguageVersion,
    ) -> (Script<'ast>, ParseErrors) {
        let mut parser = Self::with_version(source, arena, version);
        let script = parser.parse_script();
        (script, parser.finish())
    }

    /// Parse a single expression that must span the whole source.
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<&'ast Expr<'ast>, ParseErrors> {
        let mut parser = Self::new(source, arena);
        match parser.parse_expression() {
            Ok(expr) if parser.is_eof() && parser.errors.is_empty() => return Ok(expr),
            Ok(_) => {
                let error = ParseError::syntax_error(parser.peek().span);
                parser.errors.push(error);
            }
            Err(error) => parser.errors.push(error),
        }
        Err(parser.finish())
    }

    /// Parse top-level statements until end of input.
    fn parse_script(&mut self) -> Script<'ast> {
        let start_span = self.peek().span;
        let mut stmts = BVec::new_in(self.arena);

        while !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                    // A stray `}` closes nothing at the top level.
                    if self.check(TokenKind::RightBrace) {
                        self.advance();
                    }
                }
            }
        }

        let span = start_span.merge(self.peek().span);
        Script::new(self.arena.alloc_slice_copy(&stmts), span)
    }

    /// Errors sorted by position; the sort is stable.
    ///
    /// After a nesting overflow, the errors of the constructs left open by
    /// skipping to the end are dropped.
    fn finish(&mut self) -> ParseErrors {
        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| (e.span.line, e.span.col));
        if self.abandoned {
            if let Some(at) = errors.iter().position(|e| e.kind == ParseErrorKind::TooDeep) {
                errors.truncate(at + 1);
            }
        }
        errors.into_iter().collect()
    }

    // =========================================
    // Token cursor
    // =========================================

    /// The current token. At the end of input this is the `Eof` token.
    #[inline]
    pub(super) fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// The token `n` positions ahead of the current one.
    pub(super) fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Consume the current token. Never moves past `Eof`.
    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    #[inline]
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) { Some(self.advance()) } else { None }
    }

    /// Consume a token of `kind` or fail with `message` at the current token.
    pub(super) fn expect(
        &mut self,
        kind: TokenKind,
        message: &str,
    ) -> Result<Token<'ast>, ParseError> {
        self.eat(kind)
            .ok_or_else(|| ParseError::missing(self.peek().span, message))
    }

    #[inline]
    pub(super) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    // =========================================
    // Identifiers
    // =========================================

    /// Whether a token of `kind` names a binding here.
    ///
    /// `let` is an ordinary identifier before block scoping was introduced.
    pub(super) fn is_identifier(&self, kind: TokenKind) -> bool {
        kind == TokenKind::Identifier
            || (kind == TokenKind::Let && !self.version.supports_block_scope())
    }

    pub(super) fn expect_identifier(&mut self, message: &str) -> Result<Ident<'ast>, ParseError> {
        if self.is_identifier(self.peek().kind) {
            let token = self.advance();
            Ok(Ident::new(token.lexeme, token.span))
        } else {
            Err(ParseError::missing(self.peek().span, message))
        }
    }

    // =========================================
    // Statement boundaries
    // =========================================

    /// Finish a statement: a `;`, or an inserted one before `}`, end of
    /// input or a line break.
    pub(super) fn consume_semicolon(&mut self) -> Result<Span, ParseError> {
        if let Some(token) = self.eat(TokenKind::Semicolon) {
            return Ok(token.span);
        }
        let next = self.peek();
        if next.kind == TokenKind::RightBrace
            || next.kind == TokenKind::Eof
            || next.newline_before
        {
            return Ok(Span::point(next.span.line, next.span.col));
        }
        Err(ParseError::new(
            ParseErrorKind::MissingSemicolon,
            next.span,
            "missing ; before statement",
        ))
    }

    /// Skip tokens after an error until a likely statement boundary.
    ///
    /// Stops after a `;`, or before a `}`, end of input or a keyword that
    /// starts a statement.
    pub(super) fn synchronize(&mut self) {
        while !self.is_eof() && !self.check(TokenKind::RightBrace) {
            let token = self.advance();
            if token.kind == TokenKind::Semicolon || self.peek().kind.starts_statement() {
                return;
            }
        }
    }

    /// Run `f` as the body of a function: `return` becomes legal and loops
    /// of the enclosing function no longer count for `break` / `continue`.
    pub(super) fn in_function_body<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let result = f(self);
        self.function_depth -= 1;
        self.loop_depth = saved_loops;
        result
    }

    /// Run `f` one level deeper in the syntax tree.
    ///
    /// Levels taken with [`deepen`](Self::deepen) inside `f` are released
    /// when `f` returns.
    pub(super) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.nesting;
        let result = self.deepen().and_then(|()| f(self));
        self.nesting = saved;
        result
    }

    /// Take one more level of nesting, failing past the depth limit or once
    /// the native stack budget is spent.
    pub(super) fn deepen(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING_DEPTH || self.stack.is_exhausted() {
            let error = ParseError::too_deep(self.peek().span);
            self.abandoned = true;
            self.pos = self.tokens.len() - 1;
            return Err(error);
        }
        Ok(())
    }

    /// Run `f` as the body of a loop.
    pub(super) fn in_loop_body<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_tokens_are_dropped_but_keep_line_breaks() {
        let arena = Bump::new();
        let parser = Parser::new("a\n# b", &arena);
        let kinds: Vec<_> = parser.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
        assert!(parser.tokens[1].newline_before);
        assert_eq!(parser.errors.len(), 1);
    }

    #[test]
    fn advance_stops_at_eof() {
        let arena = Bump::new();
        let mut parser = Parser::new("x", &arena);
        assert_eq!(parser.advance().kind, TokenKind::Identifier);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert!(parser.is_eof());
    }

    #[test]
    fn let_is_identifier_before_1_7() {
        let arena = Bump::new();
        let old = Parser::with_version("let", &arena, LanguageVersion::V1_6);
        assert!(old.is_identifier(TokenKind::Let));
        let new = Parser::with_version("let", &arena, LanguageVersion::V1_7);
        assert!(!new.is_identifier(TokenKind::Let));
    }

    #[test]
    fn nesting_is_released_after_each_level() {
        let arena = Bump::new();
        let mut parser = Parser::new("x", &arena);
        for _ in 0..MAX_NESTING_DEPTH {
            parser.nested(|p| p.deepen()).unwrap();
        }
        assert_eq!(parser.nesting, 0);
    }

    #[test]
    fn nesting_past_the_limit_is_an_error() {
        let arena = Bump::new();
        let mut parser = Parser::new("x", &arena);
        let error = parser
            .nested(|p| {
                for _ in 0..MAX_NESTING_DEPTH {
                    p.deepen()?;
                }
                Ok(())
            })
            .unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::TooDeep);
        assert_eq!(error.message, "too deep recursion while parsing");
        assert_eq!(parser.nesting, 0);
    }

    #[test]
    fn semicolon_insertion() {
        let arena = Bump::new();
        let mut parser = Parser::new("a\nb c", &arena);
        parser.advance();
        assert!(parser.consume_semicolon().is_ok());
        parser.advance();
        let error = parser.consume_semicolon().unwrap_err();
        assert_eq!(error.message, "missing ; before statement");
        assert_eq!(error.span.col, 3);
    }
}
