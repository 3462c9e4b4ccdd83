//! The reporter chain.
//!
//! Every warning and error found while compiling or running guest code is
//! handed to an [`ErrorReporter`]. The engine's own node is a
//! [`DefaultReporter`]; hosts can install a custom reporter as its upstream,
//! and every `eval` call compiles with a fresh eval-mode node chained to the
//! reporter of its caller.
//!
//! ```text
//! eval-mode node ──> enclosing node ──> host reporter
//! ```
//!
//! Reporter nodes are immutable once built, so one chain can be shared by
//! nested evaluations without synchronization.

use std::sync::Arc;

use lazy_static::lazy_static;
use rustc_hash::FxHashSet;

use crate::classifier;
use crate::diagnostic::DiagnosticRecord;
use crate::error::ChainError;
use crate::exception::NativeException;

/// Longest upstream chain accepted when linking a node.
pub const MAX_CHAIN_DEPTH: usize = 1024;

/// A sink for diagnostics.
///
/// "Throwing" is expressed by returning the exception: `error` returns
/// `Err` when compilation must stop, and `runtime_error` hands back the
/// exception the caller is about to raise.
pub trait ErrorReporter: Send + Sync {
    /// Advisory diagnostic. Must not change control flow.
    fn warning(&self, record: &DiagnosticRecord);

    /// Potentially fatal diagnostic. `Ok(())` means the reporter absorbed it.
    fn error(&self, record: &DiagnosticRecord) -> Result<(), NativeException>;

    /// Build the exception for a runtime fault described by `record`.
    fn runtime_error(&self, record: &DiagnosticRecord) -> NativeException;

    /// The next reporter in the chain, if any.
    fn upstream(&self) -> Option<Arc<dyn ErrorReporter>> {
        None
    }
}

/// The engine's reporter node.
///
/// Without an upstream it ignores warnings and turns errors into the generic
/// exception. In eval mode every error is classified and thrown, whatever the
/// upstream would have done with it.
#[derive(Clone, Default)]
pub struct DefaultReporter {
    eval_mode: bool,
    upstream: Option<Arc<dyn ErrorReporter>>,
}

impl DefaultReporter {
    /// A node with no upstream, outside eval mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// A node delegating to `upstream`.
    pub fn with_upstream(upstream: Arc<dyn ErrorReporter>) -> Result<Self, ChainError> {
        validate_chain(&upstream)?;
        Ok(Self {
            eval_mode: false,
            upstream: Some(upstream),
        })
    }

    /// The node used to compile `eval` code, chained to the caller's reporter.
    pub fn for_eval(upstream: Arc<dyn ErrorReporter>) -> Result<Self, ChainError> {
        validate_chain(&upstream)?;
        Ok(Self {
            eval_mode: true,
            upstream: Some(upstream),
        })
    }

    pub fn is_eval_mode(&self) -> bool {
        self.eval_mode
    }
}

impl ErrorReporter for DefaultReporter {
    fn warning(&self, record: &DiagnosticRecord) {
        if let Some(upstream) = &self.upstream {
            upstream.warning(record);
        }
    }

    fn error(&self, record: &DiagnosticRecord) -> Result<(), NativeException> {
        if self.eval_mode {
            return Err(classifier::classify_eval_error(record));
        }
        match &self.upstream {
            Some(upstream) => upstream.error(record),
            None => Err(self.runtime_error(record)),
        }
    }

    fn runtime_error(&self, record: &DiagnosticRecord) -> NativeException {
        match &self.upstream {
            Some(upstream) => upstream.runtime_error(record),
            None => NativeException::generic(record.clone()),
        }
    }

    fn upstream(&self) -> Option<Arc<dyn ErrorReporter>> {
        self.upstream.clone()
    }
}

impl std::fmt::Debug for DefaultReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultReporter")
            .field("eval_mode", &self.eval_mode)
            .field("has_upstream", &self.upstream.is_some())
            .finish()
    }
}

/// Check that following upstream links from `head` terminates.
pub fn validate_chain(head: &Arc<dyn ErrorReporter>) -> Result<(), ChainError> {
    let mut seen = FxHashSet::default();
    let mut current = Some(head.clone());
    while let Some(node) = current {
        if !seen.insert(Arc::as_ptr(&node) as *const () as usize) {
            return Err(ChainError::Cycle);
        }
        if seen.len() > MAX_CHAIN_DEPTH {
            return Err(ChainError::TooDeep {
                limit: MAX_CHAIN_DEPTH,
            });
        }
        current = node.upstream();
    }
    Ok(())
}

lazy_static! {
    static ref SHARED: Arc<dyn ErrorReporter> = Arc::new(DefaultReporter::new());
}

/// The process-wide default reporter: no upstream, not in eval mode.
pub fn shared() -> Arc<dyn ErrorReporter> {
    SHARED.clone()
}
