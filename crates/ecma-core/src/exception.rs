//! The single exception representation that crosses frames, `eval` layers
//! and the host boundary.

use std::fmt;

use crate::diagnostic::DiagnosticRecord;
use crate::error_kind::NativeErrorKind;
use crate::runtime::{ObjectRef, Value};

/// Where an exception came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Advisory diagnostics. Never carried by an exception that unwinds; kept
    /// so hosts can classify everything a reporter sees with one type.
    Warning,
    /// Syntax and static-check errors from compiling a script or `eval` code.
    CompileError,
    /// Faults detected while executing guest code.
    RuntimeError,
    /// A guest `throw` statement.
    UserThrow,
    /// Conditions raised by the host: stack exhaustion, cancellation.
    HostFault,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Warning => "warning",
            ErrorCategory::CompileError => "compile error",
            ErrorCategory::RuntimeError => "runtime error",
            ErrorCategory::UserThrow => "user throw",
            ErrorCategory::HostFault => "host fault",
        };
        f.write_str(name)
    }
}

/// A thrown guest exception.
///
/// The kind is fixed at construction. The record describes the point the
/// exception was first raised and survives re-throws and `eval` layers.
#[derive(Debug, Clone)]
pub struct NativeException {
    kind: NativeErrorKind,
    category: ErrorCategory,
    record: DiagnosticRecord,
    payload: Value,
    catchable: bool,
}

impl NativeException {
    /// The generic exception: kind `Error`, carrying `record` unchanged.
    pub fn generic(record: DiagnosticRecord) -> Self {
        Self::native(NativeErrorKind::Error, record, ErrorCategory::RuntimeError)
    }

    /// A native-origin exception whose payload is a fresh error object.
    pub fn native(
        kind: NativeErrorKind,
        record: DiagnosticRecord,
        category: ErrorCategory,
    ) -> Self {
        let payload = Value::Object(ObjectRef::new_error(kind, &record));
        Self {
            kind,
            category,
            record,
            payload,
            catchable: true,
        }
    }

    /// The exception raised by `throw value` at `site`.
    ///
    /// Native error objects keep their own kind and creation record. Any other
    /// value is thrown as kind `Error`, located at `site` and described by its
    /// string conversion.
    pub fn thrown(value: Value, site: &DiagnosticRecord) -> Self {
        let (kind, record) = match value.as_object() {
            Some(obj) => match (obj.error_kind(), obj.error_origin()) {
                (Some(kind), Some(origin)) => (kind, origin),
                (Some(kind), None) => (kind, site.with_message(value.to_js_string().as_ref())),
                _ => (NativeErrorKind::Error, site.with_message(value.to_js_string().as_ref())),
            },
            None => (NativeErrorKind::Error, site.with_message(value.to_js_string().as_ref())),
        };
        Self {
            kind,
            category: ErrorCategory::UserThrow,
            record,
            payload: value,
            catchable: true,
        }
    }

    /// Re-raise `value` with the record of an exception already in flight.
    pub fn rethrown(value: Value, previous: &NativeException) -> Self {
        Self {
            kind: previous.kind,
            category: previous.category,
            record: previous.record.clone(),
            payload: value,
            catchable: true,
        }
    }

    /// A fault raised by the host, such as stack exhaustion.
    pub fn host_fault(kind: NativeErrorKind, record: DiagnosticRecord) -> Self {
        Self::native(kind, record, ErrorCategory::HostFault)
    }

    /// The cancellation exception. Guest `catch` clauses never bind it.
    pub fn interrupted(record: DiagnosticRecord) -> Self {
        Self {
            catchable: false,
            ..Self::native(NativeErrorKind::InternalError, record, ErrorCategory::HostFault)
        }
    }

    /// Same exception, recategorized.
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn kind(&self) -> NativeErrorKind {
        self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// The record this exception was raised with.
    pub fn record(&self) -> &DiagnosticRecord {
        &self.record
    }

    pub fn message(&self) -> &str {
        self.record.message()
    }

    pub fn source_uri(&self) -> Option<&str> {
        self.record.source_uri()
    }

    pub fn line(&self) -> u32 {
        self.record.line()
    }

    pub fn line_text(&self) -> Option<&str> {
        self.record.line_text()
    }

    pub fn line_offset(&self) -> u32 {
        self.record.line_offset()
    }

    /// The value a guest `catch` clause binds.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// Whether guest `catch` clauses may bind this exception.
    pub fn is_catchable(&self) -> bool {
        self.catchable
    }

    /// Whether the guest threw a value that is not a native error object.
    pub fn is_user_value(&self) -> bool {
        self.category == ErrorCategory::UserThrow && self.payload.error_kind().is_none()
    }
}

impl fmt::Display for NativeException {
    /// `Kind: message`, or just the message for a thrown non-error value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_user_value() {
            f.write_str(self.record.message())
        } else {
            write!(f, "{}: {}", self.kind, self.record.message())
        }
    }
}

impl std::error::Error for NativeException {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DiagnosticRecord {
        DiagnosticRecord::new("m", Some("u"), 3, Some("t"), 1)
    }

    #[test]
    fn generic_reads_back_record() {
        let exception = NativeException::generic(record());
        assert_eq!(exception.kind(), NativeErrorKind::Error);
        assert_eq!(exception.message(), "m");
        assert_eq!(exception.source_uri(), Some("u"));
        assert_eq!(exception.line(), 3);
        assert_eq!(exception.line_text(), Some("t"));
        assert_eq!(exception.line_offset(), 1);
        assert_eq!(exception.record(), &record());
        assert!(exception.is_catchable());
        assert_eq!(exception.to_string(), "Error: m");
    }

    #[test]
    fn native_payload_is_error_object() {
        let category = ErrorCategory::RuntimeError;
        let exception = NativeException::native(NativeErrorKind::TypeError, record(), category);
        assert_eq!(exception.payload().error_kind(), Some(NativeErrorKind::TypeError));
        let obj = exception.payload().as_object().cloned();
        assert_eq!(
            obj.and_then(|o| o.get("lineNumber")).map(|v| v.to_number()),
            Some(3.0)
        );
    }

    #[test]
    fn thrown_primitive_is_verbatim() {
        let exception = NativeException::thrown(Value::Number(42.0), &record());
        assert_eq!(exception.kind(), NativeErrorKind::Error);
        assert_eq!(exception.category(), ErrorCategory::UserThrow);
        assert!(exception.payload().strict_equals(&Value::Number(42.0)));
        assert_eq!(exception.message(), "42");
        assert_eq!(exception.line(), 3);
        assert_eq!(exception.to_string(), "42");
    }

    #[test]
    fn thrown_error_object_keeps_origin() {
        let origin = DiagnosticRecord::new("bad type", Some("lib.js"), 9, None, 0);
        let obj = ObjectRef::new_error(NativeErrorKind::TypeError, &origin);
        let exception = NativeException::thrown(Value::Object(obj), &record());
        assert_eq!(exception.kind(), NativeErrorKind::TypeError);
        assert_eq!(exception.record(), &origin);
        assert_eq!(exception.to_string(), "TypeError: bad type");
    }

    #[test]
    fn interrupted_is_uncatchable() {
        let exception = NativeException::interrupted(DiagnosticRecord::message_only("interrupted"));
        assert_eq!(exception.kind(), NativeErrorKind::InternalError);
        assert_eq!(exception.category(), ErrorCategory::HostFault);
        assert!(!exception.is_catchable());
    }

    #[test]
    fn rethrown_keeps_record() {
        let first = NativeException::thrown(Value::string("x"), &record());
        let again = NativeException::rethrown(first.payload().clone(), &first);
        assert_eq!(again.record(), first.record());
        assert_eq!(again.kind(), first.kind());
    }
}
