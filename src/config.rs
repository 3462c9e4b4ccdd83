//! Engine configuration.

use ecma_core::{ContextFeatures, LanguageVersion};
use ecma_interp::{CompileOptions, DEFAULT_MAX_CALL_DEPTH, InterpOptions};

use crate::error::ConfigError;

/// Settings applied to every evaluation of an [`Engine`](crate::Engine).
///
/// ```
/// use ecma::{ContextFeatures, EngineConfig, LanguageVersion};
///
/// let config = EngineConfig::new()
///     .with_language_version(LanguageVersion::V1_7)
///     .with_features(ContextFeatures::STRICT_WARNINGS)
///     .with_max_call_depth(64);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub language_version: LanguageVersion,
    pub features: ContextFeatures,
    /// Nested guest calls allowed before a `RangeError`.
    pub max_call_depth: usize,
    /// Expose `assertEquals`, `assertTrue` and `assertThrows` to guest code.
    pub install_assertions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language_version: LanguageVersion::default(),
            features: ContextFeatures::empty(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            install_assertions: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language_version(mut self, version: LanguageVersion) -> Self {
        self.language_version = version;
        self
    }

    pub fn with_features(mut self, features: ContextFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_assertions(mut self, install: bool) -> Self {
        self.install_assertions = install;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::ZeroCallDepth);
        }
        Ok(())
    }
}

impl From<EngineConfig> for InterpOptions {
    fn from(config: EngineConfig) -> Self {
        InterpOptions {
            compile: CompileOptions {
                version: config.language_version,
                features: config.features,
            },
            max_call_depth: config.max_call_depth,
            install_assertions: config.install_assertions,
        }
    }
}
