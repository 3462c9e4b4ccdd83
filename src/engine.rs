//! The embedding entry point.

use std::sync::Arc;

use bumpalo::Bump;

use ecma_core::{DefaultReporter, ErrorReporter, InterruptHandle, Value, reporter};
use ecma_interp::Interpreter;

use crate::config::EngineConfig;
use crate::error::ScriptResult;

/// An embeddable script engine.
///
/// Each call to [`evaluate`](Engine::evaluate) runs in a fresh global
/// environment. Diagnostics go to the engine's reporter node: without a host
/// reporter it ignores warnings and throws the generic `Error` for every
/// compile error.
///
/// # Example
///
/// ```
/// use ecma::{Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::default()).unwrap();
/// let value = engine
///     .evaluate("try { throw 'A'; } catch (e) { e + 'B'; }", Some("main.js"))
///     .unwrap();
/// assert_eq!(value.to_js_string().as_ref(), "AB");
/// ```
pub struct Engine {
    config: EngineConfig,
    reporter: Arc<dyn ErrorReporter>,
    interrupt: InterruptHandle,
}

impl Engine {
    pub fn new(config: EngineConfig) -> ScriptResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reporter: reporter::shared(),
            interrupt: InterruptHandle::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install `host` as the upstream of the engine's reporter node.
    ///
    /// Replaces any previously installed host reporter. Fails if following
    /// `host`'s own upstream links would not terminate.
    pub fn set_error_reporter(&mut self, host: Arc<dyn ErrorReporter>) -> ScriptResult<()> {
        let node = DefaultReporter::with_upstream(host)?;
        self.reporter = Arc::new(node);
        Ok(())
    }

    /// Go back to the shared reporter with no upstream.
    pub fn clear_error_reporter(&mut self) {
        self.reporter = reporter::shared();
    }

    /// A handle that cancels evaluations of this engine, from any thread.
    ///
    /// A request made while nothing is running cancels the next evaluation
    /// at its first check.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Compile and run `source`.
    ///
    /// Returns the completion value of the script: the value of the last
    /// expression statement executed at top level.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn evaluate(&self, source: &str, source_uri: Option<&str>) -> ScriptResult<Value> {
        log::debug!("evaluate {} ({} bytes)", source_uri.unwrap_or("<anonymous>"), source.len());

        let arena = Bump::new();
        let mut interpreter = Interpreter::new(
            &arena,
            self.config.into(),
            self.reporter.clone(),
            self.interrupt.clone(),
        );
        let result = interpreter.run_script(source, source_uri);

        match &result {
            Ok(value) => log::debug!("evaluate finished with {}", value.to_js_string()),
            Err(exception) => log::debug!("evaluate failed: {}", exception),
        }
        result.map_err(Into::into)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("interrupted", &self.interrupt.is_interrupted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, ScriptError};
    use ecma_core::NativeErrorKind;

    #[test]
    fn rejects_invalid_config() {
        let error = Engine::new(EngineConfig::new().with_max_call_depth(0)).unwrap_err();
        assert!(matches!(error, ScriptError::Config(ConfigError::ZeroCallDepth)));
    }

    #[test]
    fn compile_error_without_host_is_generic() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let error = engine.evaluate("var x = ;", Some("main.js")).unwrap_err();
        let exception = error.exception().unwrap();
        assert_eq!(exception.kind(), NativeErrorKind::Error);
        assert_eq!(exception.source_uri(), Some("main.js"));
        assert_eq!(exception.line(), 1);
    }

    #[test]
    fn evaluations_do_not_share_globals() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        engine.evaluate("var leaked = 1;", None).unwrap();
        let error = engine.evaluate("leaked", None).unwrap_err();
        assert_eq!(error.kind(), Some(NativeErrorKind::ReferenceError));
    }

    #[test]
    fn pending_interrupt_cancels_next_evaluation() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        engine.interrupt_handle().interrupt();
        let error = engine.evaluate("while (true) {}", None).unwrap_err();
        let exception = error.exception().unwrap();
        assert!(!exception.is_catchable());
        assert!(engine.evaluate("1", None).is_ok());
    }
}
