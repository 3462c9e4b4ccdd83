//! Error types for the phases that run before guest code does.
//!
//! Guest-visible failures are [`NativeException`](crate::NativeException)s.
//! The types here describe what goes wrong while lexing, parsing and wiring up
//! a reporter chain; parse errors are turned into diagnostic records and fed
//! through the chain by the compile entry point.
//!
//! ```text
//! LexError        - tokenization errors, folded into ParseError
//! ParseError      - syntax errors (with ParseErrorKind)
//! ParseErrors     - every syntax error of one compilation unit
//! ChainError      - malformed reporter chains
//! ```

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A character that cannot start any token.
    #[error("illegal character '{ch}' at {span}")]
    IllegalCharacter { ch: char, span: Span },

    /// A string literal ran into a line end or the end of input.
    #[error("unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    /// A block comment was not closed.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    /// A numeric literal could not be parsed.
    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::IllegalCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }

    /// The guest-facing wording of this error.
    pub fn message(&self) -> String {
        match self {
            LexError::IllegalCharacter { .. } => "illegal character".to_string(),
            LexError::UnterminatedString { .. } => "unterminated string literal".to_string(),
            LexError::UnterminatedComment { .. } => "unterminated comment".to_string(),
            LexError::InvalidNumber { detail, .. } => detail.clone(),
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Message of a [`ParseErrorKind::TooDeep`] error.
pub const TOO_DEEP_NESTING: &str = "too deep recursion while parsing";

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Lexical error surfaced through the parser.
    Lexical,
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of input.
    UnexpectedEof,
    /// An expression was expected.
    ExpectedExpression,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// Missing statement terminator.
    MissingSemicolon,
    /// Invalid assignment target.
    InvalidAssignment,
    /// `break` or `continue` outside a loop.
    InvalidJump,
    /// `return` outside a function.
    InvalidReturn,
    /// Syntax not enabled at the selected language version.
    UnsupportedSyntax,
    /// Nesting deeper than the parser will follow.
    TooDeep,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::Lexical => "lexical error",
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::MissingSemicolon => "missing semicolon",
            ParseErrorKind::InvalidAssignment => "invalid assignment",
            ParseErrorKind::InvalidJump => "invalid jump",
            ParseErrorKind::InvalidReturn => "invalid return",
            ParseErrorKind::UnsupportedSyntax => "unsupported syntax",
            ParseErrorKind::TooDeep => "nesting too deep",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and the message shown to guest code.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// The message carried into the diagnostic record.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// `missing X before/after Y` style error for an absent token.
    pub fn missing(span: Span, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::ExpectedToken, span, message)
    }

    /// The catch-all `syntax error`.
    pub fn syntax_error(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedToken, span, "syntax error")
    }

    /// Input ended in the middle of a construct.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    /// Nesting exceeded the parser's depth or stack budget.
    pub fn too_deep(span: Span) -> Self {
        Self::new(ParseErrorKind::TooDeep, span, TOO_DEEP_NESTING)
    }

    /// Whether this error came from the lexer.
    pub fn is_lexical(&self) -> bool {
        self.kind == ParseErrorKind::Lexical
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self::new(ParseErrorKind::Lexical, error.span(), error.message())
    }
}

/// A collection of parse errors.
///
/// The parser recovers at statement boundaries, so one compilation unit can
/// produce several errors; they are reported in source order.
#[derive(Debug, Clone, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The first error, if any.
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// Convert to a Result, returning Ok(()) if empty or Err with the first error.
    pub fn into_result(self) -> Result<(), ParseError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<ParseError> for ParseErrors {
    fn from_iter<I: IntoIterator<Item = ParseError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Reporter Chain Errors
// ============================================================================

/// Errors raised while linking reporter chain nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Linking the node would make the chain revisit a reporter.
    #[error("reporter chain would contain a cycle")]
    Cycle,

    /// The chain is longer than any sensible nesting of `eval` calls.
    #[error("reporter chain exceeds {limit} nodes")]
    TooDeep { limit: usize },
}

impl ChainError {
    /// Returns true if this is a cycle error.
    pub fn is_cycle(&self) -> bool {
        matches!(self, ChainError::Cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_becomes_parse_error() {
        let lex = LexError::UnterminatedString {
            span: Span::new(2, 9, 1),
        };
        let parse: ParseError = lex.into();
        assert!(parse.is_lexical());
        assert_eq!(parse.span, Span::new(2, 9, 1));
        assert_eq!(parse.message, "unterminated string literal");
    }

    #[test]
    fn parse_error_display() {
        let error = ParseError::missing(Span::new(1, 10, 1), "missing ; before statement");
        assert_eq!(
            error.to_string(),
            "expected token at 1:10: missing ; before statement"
        );
    }

    #[test]
    fn parse_errors_collection() {
        let mut errors = ParseErrors::new();
        assert!(errors.is_empty());
        errors.push(ParseError::syntax_error(Span::new(1, 1, 1)));
        errors.push(ParseError::unexpected_eof(Span::new(3, 1, 0)));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().map(|e| e.span.line), Some(1));
        assert_eq!(errors.to_string().lines().count(), 2);
        assert_eq!(errors.into_result().map_err(|e| e.message), Err("syntax error".to_string()));
    }

    #[test]
    fn chain_error_predicates() {
        assert!(ChainError::Cycle.is_cycle());
        assert!(!ChainError::TooDeep { limit: 4 }.is_cycle());
    }
}
