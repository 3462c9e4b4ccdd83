use std::collections::VecDeque;
use std::fmt;

use crate::diagnostic::DiagnosticRecord;

/// A reported diagnostic together with the channel it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Whether the record came through `warning` or `error`.
    pub severity: Severity,
    /// The record as it was reported.
    pub record: DiagnosticRecord,
}

/// Which reporter operation a diagnostic was delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Advisory; never changes control flow.
    Warning,
    /// Potentially fatal; the reporter chain decides whether it throws.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// An ordered collection of diagnostics.
///
/// Hosts that want to inspect everything a compilation reported install a
/// collecting reporter backed by this type.
///
/// # Examples
///
/// ```
/// use ecma_core::{Diagnostic, DiagnosticRecord, Diagnostics, Severity};
///
/// let mut diagnostics = Diagnostics::new();
/// diagnostics.push(Diagnostic {
///     severity: Severity::Warning,
///     record: DiagnosticRecord::message_only("Code has no side effects"),
/// });
/// assert_eq!(diagnostics.warning_count(), 1);
/// assert!(!diagnostics.has_errors());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    diagnostics: VecDeque<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    /// Creates a new, empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic to the collection.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.has_errors = true;
        }
        self.diagnostics.push_back(diagnostic);
    }

    /// Returns `true` if any error diagnostics were recorded.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Returns `true` if any warning diagnostics were recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    /// Returns `true` if the collection contains no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Removes all diagnostics from the collection.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.has_errors = false;
    }

    /// Iterates over all diagnostics in the order they were reported.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Iterates over error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Iterates over warning diagnostics only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Total number of diagnostics.
    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Writes every diagnostic to `writer`, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the writer fails.
    pub fn emit<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(writer, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    /// `uri:line:col: severity: message`, dropping missing location parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = &self.record;
        match (record.source_uri(), record.line()) {
            (Some(uri), 0) => write!(f, "{}: {}: {}", uri, self.severity, record.message()),
            (Some(uri), line) => write!(
                f,
                "{}:{}:{}: {}: {}",
                uri,
                line,
                record.line_offset() + 1,
                self.severity,
                record.message()
            ),
            (None, 0) => write!(f, "{}: {}", self.severity, record.message()),
            (None, line) => write!(
                f,
                "{}:{}: {}: {}",
                line,
                record.line_offset() + 1,
                self.severity,
                record.message()
            ),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(severity: Severity, message: &str) -> Diagnostic {
        Diagnostic {
            severity,
            record: DiagnosticRecord::new(message, Some("main.js"), 2, None, 4),
        }
    }

    #[test]
    fn counts_by_severity() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.push(diag(Severity::Warning, "w1"));
        diagnostics.push(diag(Severity::Error, "e1"));
        diagnostics.push(diag(Severity::Warning, "w2"));

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 2);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());

        let order: Vec<_> = diagnostics.iter().map(|d| d.record.message()).collect();
        assert_eq!(order, ["w1", "e1", "w2"]);
    }

    #[test]
    fn clear_resets_error_flag() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(diag(Severity::Error, "e1"));
        diagnostics.clear();
        assert!(diagnostics.is_empty());
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn display_and_emit() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(diag(Severity::Error, "syntax error"));
        assert_eq!(diagnostics.to_string(), "main.js:2:5: error: syntax error\n");

        let mut out = Vec::new();
        diagnostics.emit(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "main.js:2:5: error: syntax error\n");
    }

    #[test]
    fn display_without_location() {
        let d = Diagnostic {
            severity: Severity::Warning,
            record: DiagnosticRecord::message_only("careful"),
        };
        assert_eq!(d.to_string(), "warning: careful");
    }
}
