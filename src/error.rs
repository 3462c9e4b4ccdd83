//! Host-facing error types.

use thiserror::Error;

use ecma_core::{ChainError, NativeErrorKind, NativeException};

/// An engine configuration that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No guest call could ever be made.
    #[error("max_call_depth must be at least 1")]
    ZeroCallDepth,
}

/// Everything [`Engine`](crate::Engine) operations can fail with.
///
/// Guest failures arrive as [`ScriptError::Uncaught`], wrapping the exception
/// that unwound past the outermost frame. The other variants are host
/// mistakes detected before any guest code runs.
///
/// ```
/// use ecma::{Engine, EngineConfig, NativeErrorKind};
///
/// let engine = Engine::new(EngineConfig::default()).unwrap();
/// let error = engine.evaluate("null.p", Some("main.js")).unwrap_err();
/// assert!(error.is_uncaught());
/// assert_eq!(error.kind(), Some(NativeErrorKind::TypeError));
/// ```
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    /// An exception no guest `catch` handled.
    #[error("uncaught {0}")]
    Uncaught(Box<NativeException>),

    /// The engine configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host reporter could not be linked into the chain.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl From<NativeException> for ScriptError {
    fn from(exception: NativeException) -> Self {
        ScriptError::Uncaught(Box::new(exception))
    }
}

impl ScriptError {
    pub fn is_uncaught(&self) -> bool {
        matches!(self, ScriptError::Uncaught(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, ScriptError::Config(_))
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, ScriptError::Chain(_))
    }

    /// The uncaught exception, if this is a guest failure.
    pub fn exception(&self) -> Option<&NativeException> {
        match self {
            ScriptError::Uncaught(exception) => Some(exception),
            _ => None,
        }
    }

    /// Native kind of the uncaught exception.
    pub fn kind(&self) -> Option<NativeErrorKind> {
        self.exception().map(NativeException::kind)
    }
}

/// Result alias for engine operations.
pub type ScriptResult<T> = Result<T, ScriptError>;
