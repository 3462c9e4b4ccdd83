//! Core types for the ECMAScript guest engine.
//!
//! This crate holds everything the other layers share:
//! - Source locations ([`Span`]) and the immutable [`DiagnosticRecord`]
//! - The reporter chain ([`ErrorReporter`], [`DefaultReporter`])
//! - The native error taxonomy and the eval-mode [`classifier`]
//! - [`NativeException`], the one exception type that crosses frames
//! - Unwinding rules for `try` / `catch` / `finally` and the bounded
//!   [`CallStack`], with a native [`StackGuard`]
//! - The guest value model in [`runtime`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ecma_core::{DefaultReporter, DiagnosticRecord, ErrorReporter, NativeErrorKind};
//!
//! let outer: Arc<dyn ErrorReporter> = Arc::new(DefaultReporter::new());
//! let eval_reporter = DefaultReporter::for_eval(outer).unwrap();
//!
//! let uri = Some("main.js#1(eval)");
//! let record = DiagnosticRecord::new("syntax error", uri, 1, Some("function("), 8);
//! let exception = eval_reporter.error(&record).unwrap_err();
//! assert_eq!(exception.kind(), NativeErrorKind::SyntaxError);
//! ```

pub mod call_stack;
pub mod classifier;
pub mod diagnostic;
pub mod diagnostics;
pub mod error;
pub mod error_kind;
pub mod exception;
pub mod features;
pub mod interrupt;
pub mod reporter;
pub mod runtime;
pub mod span;
pub mod stack_guard;
pub mod unwind;
pub mod version;

pub use call_stack::{CallStack, Frame, TOO_MUCH_RECURSION};
pub use diagnostic::DiagnosticRecord;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ChainError, LexError, ParseError, ParseErrorKind, ParseErrors, TOO_DEEP_NESTING};
pub use error_kind::NativeErrorKind;
pub use exception::{ErrorCategory, NativeException};
pub use features::ContextFeatures;
pub use interrupt::InterruptHandle;
pub use reporter::{DefaultReporter, ErrorReporter};
pub use runtime::Value;
pub use span::Span;
pub use stack_guard::{COMPILE_STACK_BUDGET, INTERPRETER_STACK_BUDGET, StackGuard};
pub use unwind::{Abrupt, FrameState, run_try};
pub use version::LanguageVersion;
