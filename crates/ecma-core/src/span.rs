//! Source location tracking for diagnostics.
//!
//! Provides [`Span`] to track where tokens, syntax errors and runtime faults
//! occur in script source.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Lines and columns are 1-indexed the way they are shown to users. A span
/// with `line == 0` means the location is unknown (for example a fault raised
/// by the host with no script position attached).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed, 0 when unknown).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether the span points at a known source position.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.line > 0
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// 0-based column within the line, as carried by diagnostic records.
    #[inline]
    pub fn line_offset(&self) -> u32 {
        self.col.saturating_sub(1)
    }

    /// Merge two spans into one that starts at the first span and extends to cover both.
    ///
    /// Multi-line merges keep the first position and sum the lengths; only the
    /// start position is ever reported.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span {
                line: self.line,
                col: start_col,
                len: end_col - start_col,
            }
        } else {
            Span {
                line: self.line,
                col: self.col,
                len: self.len + other.len,
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Return the text of a 1-indexed line, without its terminator.
///
/// Returns `None` for line 0 or a line past the end of `source`.
pub fn line_text(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line as usize - 1)
}
