//! Main lexer implementation.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, dispatching
//! on the first character of each token. Lexemes are copied into the arena so
//! the source string can be dropped once lexing completes.
//!
//! Line terminators are not tokens. Instead every token records whether one
//! was skipped before it, which is all the parser needs for automatic
//! semicolon insertion and the restricted productions.

use bumpalo::Bump;

use ecma_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start, is_line_terminator};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for guest source code.
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token lexemes are allocated (persists).
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    /// Set when trivia skipped before the current token held a line break.
    pending_newline: bool,
    /// Accumulated errors, one per `Error` token produced.
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            pending_newline: false,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        self.pending_newline = false;
        let mut token = self.scan_token();
        token.newline_before = self.pending_newline;
        token
    }

    /// Lex the whole source, including the trailing `Eof` token.
    pub fn tokenize(mut self) -> (Vec<Token<'ast>>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            tokens.push(token);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        (tokens, self.errors)
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        if let Err(error) = self.skip_trivia() {
            return self.make_error(error);
        }

        let Some(first) = self.cursor.peek() else {
            return self.make_eof();
        };

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        match first {
            '"' | '\'' => self.scan_string(first, start_line, start_col, start_offset),

            c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),

            // Number starting with dot (e.g., .5)
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start_line, start_col, start_offset)
            }

            c if is_ident_start(c) => self.scan_identifier(start_line, start_col, start_offset),

            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    /// Skip whitespace, comments and a leading BOM, noting line breaks.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        if self.cursor.offset() == 0 {
            self.cursor.eat('\u{FEFF}');
        }

        while let Some(c) = self.cursor.peek() {
            if is_line_terminator(c) {
                self.pending_newline = true;
                self.cursor.advance();
            } else if c.is_whitespace() {
                self.cursor.advance();
            } else if self.cursor.check_str("//") {
                self.cursor.eat_while(|c| !is_line_terminator(c));
            } else if self.cursor.check_str("/*") {
                self.skip_block_comment()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();
        self.cursor.advance();
        self.cursor.advance();

        loop {
            match self.cursor.advance() {
                None => {
                    let len = self.cursor.offset() - start_offset;
                    return Err(LexError::UnterminatedComment {
                        span: Span::new(start_line, start_col, len),
                    });
                }
                Some('*') if self.cursor.eat('/') => return Ok(()),
                Some(c) if is_line_terminator(c) => self.pending_newline = true,
                Some(_) => {}
            }
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    /// Copies the lexeme into the arena.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let len = self.cursor.offset() - start_offset;
        let span = Span::new(start_line, start_col, len);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    /// Create an error token and record the error.
    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    /// Scan a string literal. The lexeme keeps its quotes and escapes.
    fn scan_string(
        &mut self,
        quote: char,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.advance();

        loop {
            match self.cursor.peek() {
                None => break,
                Some(c) if is_line_terminator(c) => break,
                Some('\\') => {
                    self.cursor.advance();
                    // A backslash before a line break continues the literal.
                    if self.cursor.check_str("\r\n") {
                        self.cursor.advance();
                    }
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::String, start_line, start_col, start_offset);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }

        let len = self.cursor.offset() - start_offset;
        self.make_error(LexError::UnterminatedString {
            span: Span::new(start_line, start_col, len),
        })
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        if self.cursor.check_str("0x") || self.cursor.check_str("0X") {
            self.cursor.advance();
            self.cursor.advance();
            if self.cursor.eat_while(|c| c.is_ascii_hexdigit()).is_empty() {
                let detail = "missing hexadecimal digits after 0x";
                return self.number_error(detail, start_line, start_col, start_offset);
            }
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit());

            if self.cursor.peek() == Some('.') {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }

            if let Some('e' | 'E') = self.cursor.peek() {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                    let detail = "missing exponent";
                    return self.number_error(detail, start_line, start_col, start_offset);
                }
            }
        }

        // `3in` or `0x1g` are not two tokens.
        if self.cursor.check(is_ident_start) {
            self.cursor.eat_while(is_ident_continue);
            let detail = "identifier starts immediately after numeric literal";
            return self.number_error(detail, start_line, start_col, start_offset);
        }

        self.make_token(TokenKind::Number, start_line, start_col, start_offset)
    }

    fn number_error(
        &mut self,
        detail: &str,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let len = self.cursor.offset() - start_offset;
        self.make_error(LexError::InvalidNumber {
            span: Span::new(start_line, start_col, len),
            detail: detail.to_string(),
        })
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    fn scan_identifier(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    /// Scan an operator or punctuation token.
    ///
    /// Uses tuple matching on (first_char, peek) to minimize repeated peek() calls.
    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (';', _) => TokenKind::Semicolon,
            (',', _) => TokenKind::Comma,
            ('.', _) => TokenKind::Dot,
            ('?', _) => TokenKind::Question,
            (':', _) => TokenKind::Colon,
            ('~', _) => TokenKind::Tilde,
            ('^', _) => TokenKind::Caret,

            ('+', Some('+')) => self.consume(TokenKind::PlusPlus),
            ('+', Some('=')) => self.consume(TokenKind::PlusEqual),
            ('+', _) => TokenKind::Plus,

            ('-', Some('-')) => self.consume(TokenKind::MinusMinus),
            ('-', Some('=')) => self.consume(TokenKind::MinusEqual),
            ('-', _) => TokenKind::Minus,

            ('*', Some('=')) => self.consume(TokenKind::StarEqual),
            ('*', _) => TokenKind::Star,

            ('/', Some('=')) => self.consume(TokenKind::SlashEqual),
            ('/', _) => TokenKind::Slash,

            ('%', Some('=')) => self.consume(TokenKind::PercentEqual),
            ('%', _) => TokenKind::Percent,

            ('=', Some('>')) => self.consume(TokenKind::Arrow),
            ('=', Some('=')) => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    TokenKind::EqualEqualEqual
                } else {
                    TokenKind::EqualEqual
                }
            }
            ('=', _) => TokenKind::Equal,

            ('!', Some('=')) => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    TokenKind::BangEqualEqual
                } else {
                    TokenKind::BangEqual
                }
            }
            ('!', _) => TokenKind::Bang,

            ('<', Some('=')) => self.consume(TokenKind::LessEqual),
            ('<', Some('<')) => self.consume(TokenKind::LessLess),
            ('<', _) => TokenKind::Less,

            ('>', Some('=')) => self.consume(TokenKind::GreaterEqual),
            ('>', Some('>')) => {
                self.cursor.advance();
                if self.cursor.eat('>') {
                    TokenKind::GreaterGreaterGreater
                } else {
                    TokenKind::GreaterGreater
                }
            }
            ('>', _) => TokenKind::Greater,

            ('&', Some('&')) => self.consume(TokenKind::AmpAmp),
            ('&', _) => TokenKind::Amp,

            ('|', Some('|')) => self.consume(TokenKind::PipePipe),
            ('|', _) => TokenKind::Pipe,

            _ => {
                let len = self.cursor.offset() - start_offset;
                return self.make_error(LexError::IllegalCharacter {
                    ch: c,
                    span: Span::new(start_line, start_col, len),
                });
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }

    /// Consume the lookahead character that completes a two-character operator.
    #[inline]
    fn consume(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }
}

/// Iterate tokens up to, not including, `Eof`.
impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
