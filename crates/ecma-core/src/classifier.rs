//! Mapping of eval-mode compile errors onto native error kinds.

use crate::diagnostic::DiagnosticRecord;
use crate::error_kind::NativeErrorKind;
use crate::exception::{ErrorCategory, NativeException};

/// Separator between a kind name and the message proper.
pub const DELIMITER: &str = ": ";

/// Split a leading `"TypeError: "` off `message`.
///
/// Compile errors default to `SyntaxError`. A message that starts with the
/// `TypeError` constructor name followed by [`DELIMITER`] is a `TypeError`, and
/// that prefix is removed once. The test is purely textual: a syntax error
/// whose text happens to begin with the same characters is classified as a
/// `TypeError` too.
///
/// ```
/// use ecma_core::NativeErrorKind;
/// use ecma_core::classifier::split_kind_prefix;
///
/// assert_eq!(
///     split_kind_prefix("TypeError: redeclaration of const x."),
///     (NativeErrorKind::TypeError, "redeclaration of const x.")
/// );
/// assert_eq!(
///     split_kind_prefix("missing ) after formal parameters"),
///     (NativeErrorKind::SyntaxError, "missing ) after formal parameters")
/// );
/// ```
pub fn split_kind_prefix(message: &str) -> (NativeErrorKind, &str) {
    let kind_name = NativeErrorKind::TypeError.name();
    message
        .strip_prefix(kind_name)
        .and_then(|rest| rest.strip_prefix(DELIMITER))
        .map_or((NativeErrorKind::SyntaxError, message), |rest| {
            (NativeErrorKind::TypeError, rest)
        })
}

/// Build the exception an eval-mode compile error turns into.
pub fn classify_eval_error(record: &DiagnosticRecord) -> NativeException {
    let (kind, message) = split_kind_prefix(record.message());
    let record = if message.len() == record.message().len() {
        record.clone()
    } else {
        record.with_message(message)
    };
    construct_error(kind, record)
}

/// A compile-error exception of `kind`, with an error object payload.
pub fn construct_error(kind: NativeErrorKind, record: DiagnosticRecord) -> NativeException {
    NativeException::native(kind, record, ErrorCategory::CompileError)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> DiagnosticRecord {
        DiagnosticRecord::new(message, Some("main.js#3(eval)"), 1, Some("function("), 9)
    }

    #[test]
    fn syntax_error_by_default() {
        let exception = classify_eval_error(&record("missing name after function keyword"));
        assert_eq!(exception.kind(), NativeErrorKind::SyntaxError);
        assert_eq!(exception.message(), "missing name after function keyword");
        assert_eq!(exception.source_uri(), Some("main.js#3(eval)"));
        assert_eq!(exception.line_offset(), 9);
    }

    #[test]
    fn type_error_prefix_stripped_once() {
        let exception = classify_eval_error(&record("TypeError: TypeError: nested"));
        assert_eq!(exception.kind(), NativeErrorKind::TypeError);
        assert_eq!(exception.message(), "TypeError: nested");
    }

    #[test]
    fn prefix_must_match_exactly() {
        assert_eq!(split_kind_prefix("TypeError:x").0, NativeErrorKind::SyntaxError);
        assert_eq!(split_kind_prefix("typeError: x").0, NativeErrorKind::SyntaxError);
        assert_eq!(split_kind_prefix(" TypeError: x").0, NativeErrorKind::SyntaxError);
        assert_eq!(split_kind_prefix("TypeError: "), (NativeErrorKind::TypeError, ""));
    }

    #[test]
    fn other_kind_names_are_not_special() {
        let exception = classify_eval_error(&record("RangeError: nope"));
        assert_eq!(exception.kind(), NativeErrorKind::SyntaxError);
        assert_eq!(exception.message(), "RangeError: nope");
    }

    #[test]
    fn syntax_error_that_looks_like_type_error_is_misclassified() {
        let exception = classify_eval_error(&record("TypeError: is not valid here"));
        assert_eq!(exception.kind(), NativeErrorKind::TypeError);
        assert_eq!(exception.category(), ErrorCategory::CompileError);
    }
}
