//! The immutable diagnostic record shared by every error path.
//!
//! A [`DiagnosticRecord`] is created at the point where a problem is detected
//! (parser, static checks, interpreter frame) and handed to the active
//! [`ErrorReporter`](crate::ErrorReporter). It is never mutated afterwards; if
//! an exception is built from it, the exception owns the record.

use std::fmt;

use crate::span::{Span, line_text};

/// Message and source location of one error or warning occurrence.
///
/// # Examples
///
/// ```
/// use ecma_core::DiagnosticRecord;
///
/// let message = "missing ; before statement";
/// let record = DiagnosticRecord::new(message, Some("main.js"), 3, Some("var a = 1 2"), 10);
/// assert_eq!(record.line(), 3);
/// assert_eq!(record.to_string(), "main.js:3:11: missing ; before statement");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticRecord {
    message: String,
    source_uri: Option<String>,
    line: u32,
    line_text: Option<String>,
    line_offset: u32,
}

impl DiagnosticRecord {
    /// Create a record with every field given explicitly.
    pub fn new(
        message: impl Into<String>,
        source_uri: Option<&str>,
        line: u32,
        line_text: Option<&str>,
        line_offset: u32,
    ) -> Self {
        Self {
            message: message.into(),
            source_uri: source_uri.map(str::to_owned),
            line,
            line_text: line_text.map(str::to_owned),
            line_offset,
        }
    }

    /// Create a record with no location (line 0, no source, no line text).
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Create a record for a span in `source`, looking up the line text.
    pub fn at_span(
        message: impl Into<String>,
        source_uri: Option<&str>,
        source: &str,
        span: Span,
    ) -> Self {
        Self::new(
            message,
            source_uri,
            span.line,
            line_text(source, span.line),
            span.line_offset(),
        )
    }

    /// A new record with the same location and a different message.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Originating resource, absent for dynamically generated code.
    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    /// 1-based line, or 0 when unknown.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The literal source line, when it could be retrieved.
    pub fn line_text(&self) -> Option<&str> {
        self.line_text.as_deref()
    }

    /// 0-based column within [`line_text`](Self::line_text).
    pub fn line_offset(&self) -> u32 {
        self.line_offset
    }

    /// Whether a line number is attached.
    pub fn has_location(&self) -> bool {
        self.line > 0
    }

    /// Render the record with its source line and a caret under the column.
    ///
    /// Absent fields are simply left out, so a record with no location renders
    /// as its message alone.
    pub fn render(&self) -> String {
        let mut output = self.to_string();
        if let Some(text) = &self.line_text {
            output.push('\n');
            output.push_str(&format!("{:>4} | {}\n", self.line, text));
            let indent = " ".repeat(self.line_offset as usize);
            output.push_str(&format!("     | {}^", indent));
        }
        output
    }
}

impl fmt::Display for DiagnosticRecord {
    /// `uri:line:col: message`, dropping whatever location parts are missing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source_uri, self.line) {
            (Some(uri), 0) => write!(f, "{}: {}", uri, self.message),
            (Some(uri), line) => {
                write!(f, "{}:{}:{}: {}", uri, line, self.line_offset + 1, self.message)
            }
            (None, 0) => write!(f, "{}", self.message),
            (None, line) => write!(f, "{}:{}: {}", line, self.line_offset + 1, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_read_back_exactly() {
        let record = DiagnosticRecord::new("m", Some("u"), 3, Some("t"), 1);
        assert_eq!(record.message(), "m");
        assert_eq!(record.source_uri(), Some("u"));
        assert_eq!(record.line(), 3);
        assert_eq!(record.line_text(), Some("t"));
        assert_eq!(record.line_offset(), 1);
    }

    #[test]
    fn message_only_has_no_location() {
        let record = DiagnosticRecord::message_only("boom");
        assert!(!record.has_location());
        assert_eq!(record.source_uri(), None);
        assert_eq!(record.line_text(), None);
        assert_eq!(record.to_string(), "boom");
        assert_eq!(record.render(), "boom");
    }

    #[test]
    fn at_span_looks_up_line_text() {
        let source = "var x = 1;\nx(;\n";
        let span = Span::new(2, 3, 1);
        let record = DiagnosticRecord::at_span("syntax error", Some("a.js"), source, span);
        assert_eq!(record.line(), 2);
        assert_eq!(record.line_text(), Some("x(;"));
        assert_eq!(record.line_offset(), 2);
    }

    #[test]
    fn with_message_keeps_location() {
        let record = DiagnosticRecord::new("TypeError: bad", Some("a.js"), 4, None, 0);
        let stripped = record.with_message("bad");
        assert_eq!(stripped.message(), "bad");
        assert_eq!(stripped.line(), 4);
        assert_eq!(stripped.source_uri(), Some("a.js"));
        assert_eq!(record.message(), "TypeError: bad");
    }

    #[test]
    fn display_variants() {
        assert_eq!(
            DiagnosticRecord::new("oops", Some("f.js"), 0, None, 0).to_string(),
            "f.js: oops"
        );
        assert_eq!(
            DiagnosticRecord::new("oops", None, 2, None, 4).to_string(),
            "2:5: oops"
        );
    }

    #[test]
    fn render_points_at_column() {
        let record = DiagnosticRecord::new("syntax error", Some("f.js"), 7, Some("a = ;"), 4);
        assert_eq!(
            record.render(),
            "f.js:7:5: syntax error\n   7 | a = ;\n     |     ^"
        );
    }
}
