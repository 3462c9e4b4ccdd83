//! Bounded stack of active guest frames.

use std::fmt;
use std::rc::Rc;

use crate::diagnostic::DiagnosticRecord;
use crate::error_kind::NativeErrorKind;
use crate::exception::NativeException;
use crate::stack_guard::StackGuard;
use crate::unwind::FrameState;

/// Message of the fault raised when the depth limit is exceeded.
pub const TOO_MUCH_RECURSION: &str = "Too much recursion";

/// One active function, script or `eval` activation.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: Rc<str>,
    pub source_uri: Option<Rc<str>>,
    pub state: FrameState,
}

/// The frames of one evaluation, innermost last.
///
/// Two limits apply: the number of guest frames, and the native stack used
/// since [`anchor`](CallStack::anchor) was called. Whichever is hit first
/// raises the same `RangeError`.
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
    max_depth: usize,
    native: Option<StackGuard>,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
            native: None,
        }
    }

    /// Start measuring native stack use against `budget` from the caller's
    /// position. Does nothing while frames are active, so nested entries
    /// keep the outermost anchor.
    pub fn anchor(&mut self, budget: usize) {
        if self.frames.is_empty() {
            self.native = Some(StackGuard::anchor(budget));
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Enter a frame.
    ///
    /// Fails with a `RangeError` host fault located by `site` when the stack
    /// is already at its limit.
    pub fn push(
        &mut self,
        name: &str,
        source_uri: Option<&str>,
        site: impl FnOnce() -> DiagnosticRecord,
    ) -> Result<(), NativeException> {
        if self.frames.len() >= self.max_depth {
            log::debug!("call depth limit {} reached", self.max_depth);
            return Err(too_much_recursion(site));
        }
        self.check_native(site)?;
        self.frames.push(Frame {
            name: Rc::from(name),
            source_uri: source_uri.map(Rc::from),
            state: FrameState::Running,
        });
        Ok(())
    }

    /// Fail with the depth-limit fault once the native budget is spent.
    ///
    /// Called on every step of recursive evaluation, not only on calls.
    pub fn check_native(
        &self,
        site: impl FnOnce() -> DiagnosticRecord,
    ) -> Result<(), NativeException> {
        match self.native {
            Some(guard) if guard.is_exhausted() => {
                log::debug!("native stack budget of {} bytes spent", guard.budget());
                Err(too_much_recursion(site))
            }
            _ => Ok(()),
        }
    }

    /// Leave the innermost frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Source of the innermost frame that has one.
    pub fn current_source(&self) -> Option<Rc<str>> {
        self.frames.iter().rev().find_map(|f| f.source_uri.clone())
    }

    /// Record a state transition of the innermost frame.
    pub fn set_state(&mut self, state: FrameState) {
        if let Some(frame) = self.frames.last_mut() {
            log::trace!("frame {}: {} -> {}", frame.name, frame.state, state);
            frame.state = state;
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

fn too_much_recursion(site: impl FnOnce() -> DiagnosticRecord) -> NativeException {
    let record = site().with_message(TOO_MUCH_RECURSION);
    NativeException::host_fault(NativeErrorKind::RangeError, record)
}

impl fmt::Display for CallStack {
    /// One `at name (source)` line per frame, innermost first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames.iter().rev() {
            match &frame.source_uri {
                Some(uri) => writeln!(f, "\tat {} ({})", frame.name, uri)?,
                None => writeln!(f, "\tat {}", frame.name)?,
            }
        }
        Ok(())
    }
}
