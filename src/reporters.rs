//! Host reporters for [`Engine::set_error_reporter`](crate::Engine::set_error_reporter).
//!
//! Both absorb compile errors, so a compilation with errors runs to the end
//! and then fails once with `"Compilation produced N syntax errors."`.

use std::sync::{Mutex, PoisonError};

use ecma_core::{
    Diagnostic, DiagnosticRecord, Diagnostics, ErrorReporter, NativeException, Severity,
};

/// Writes diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    escalate_warnings: bool,
}

impl LoggingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log warnings at error level.
    pub fn escalating_warnings(mut self) -> Self {
        self.escalate_warnings = true;
        self
    }
}

impl ErrorReporter for LoggingReporter {
    fn warning(&self, record: &DiagnosticRecord) {
        let level = if self.escalate_warnings {
            log::Level::Error
        } else {
            log::Level::Warn
        };
        log::log!(level, "{}", record.render());
    }

    fn error(&self, record: &DiagnosticRecord) -> Result<(), NativeException> {
        log::error!("{}", record.render());
        Ok(())
    }

    fn runtime_error(&self, record: &DiagnosticRecord) -> NativeException {
        NativeException::generic(record.clone())
    }
}

/// Accumulates every diagnostic it receives.
///
/// ```
/// use std::sync::Arc;
/// use ecma::{CollectingReporter, Engine, EngineConfig};
///
/// let collector = Arc::new(CollectingReporter::new());
/// let mut engine = Engine::new(EngineConfig::default()).unwrap();
/// engine.set_error_reporter(collector.clone()).unwrap();
///
/// let error = engine.evaluate("var = 1;\nvar = 2;", Some("bad.js")).unwrap_err();
/// assert_eq!(error.exception().unwrap().message(), "Compilation produced 2 syntax errors.");
/// assert_eq!(collector.diagnostics().error_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Diagnostics>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything collected so far.
    pub fn diagnostics(&self) -> Diagnostics {
        self.lock().clone()
    }

    /// Drain the collected diagnostics.
    pub fn take(&self) -> Diagnostics {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Diagnostics> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, severity: Severity, record: &DiagnosticRecord) {
        self.lock().push(Diagnostic {
            severity,
            record: record.clone(),
        });
    }
}

impl ErrorReporter for CollectingReporter {
    fn warning(&self, record: &DiagnosticRecord) {
        self.push(Severity::Warning, record);
    }

    fn error(&self, record: &DiagnosticRecord) -> Result<(), NativeException> {
        self.push(Severity::Error, record);
        Ok(())
    }

    fn runtime_error(&self, record: &DiagnosticRecord) -> NativeException {
        NativeException::generic(record.clone())
    }
}
