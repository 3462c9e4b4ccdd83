//! An embeddable ECMAScript engine.
//!
//! Guest problems are described by [`DiagnosticRecord`]s and delivered to a
//! chain of [`ErrorReporter`]s. The chain decides whether a diagnostic is
//! ignored, logged or thrown; thrown problems become [`NativeException`]s that
//! guest `try` / `catch` can handle, and the ones nothing catches come back
//! to the host as [`ScriptError::Uncaught`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ecma::prelude::*;
//!
//! let collector = Arc::new(CollectingReporter::new());
//! let config = EngineConfig::default().with_features(ContextFeatures::STRICT_WARNINGS);
//! let mut engine = Engine::new(config)?;
//! engine.set_error_reporter(collector.clone())?;
//!
//! // A syntax error in eval code is a catchable SyntaxError.
//! let value = engine.evaluate(
//!     "try { eval('function ('); } catch (e) { e instanceof SyntaxError; }",
//!     Some("main.js"),
//! )?;
//! assert!(value.truthy());
//! # Ok::<(), ScriptError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod reporters;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ConfigError, ScriptError, ScriptResult};
pub use reporters::{CollectingReporter, LoggingReporter};

pub use ecma_core::{
    ChainError, ContextFeatures, DefaultReporter, Diagnostic, DiagnosticRecord, Diagnostics,
    ErrorCategory, ErrorReporter, InterruptHandle, LanguageVersion, NativeErrorKind,
    NativeException, Severity, Value,
};

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::Engine;
    pub use crate::error::{ConfigError, ScriptError, ScriptResult};
    pub use crate::reporters::{CollectingReporter, LoggingReporter};
    pub use ecma_core::{
        ContextFeatures, DiagnosticRecord, ErrorReporter, InterruptHandle, LanguageVersion,
        NativeErrorKind, NativeException, Value,
    };
}
