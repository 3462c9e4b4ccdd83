//! `try` / `catch` / `finally` completion rules.
//!
//! Exceptions travel on the `Err` side of `Result`; normal and abrupt
//! completions (return, break, continue) travel on the `Ok` side. This module
//! decides which completion survives a `try` statement.

use std::fmt;

use crate::exception::NativeException;

/// Where a frame is in its lifecycle.
#[derive(Debug, Clone, Default)]
pub enum FrameState {
    #[default]
    Running,
    /// An exception is propagating through the frame.
    Unwinding(NativeException),
    /// A `catch` clause in the frame bound the exception.
    Handled,
    /// The frame completed, normally or with `return`.
    Returned,
}

impl FrameState {
    pub fn is_unwinding(&self) -> bool {
        matches!(self, FrameState::Unwinding(_))
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::Running => f.write_str("running"),
            FrameState::Unwinding(e) => write!(f, "unwinding ({})", e.kind()),
            FrameState::Handled => f.write_str("handled"),
            FrameState::Returned => f.write_str("returned"),
        }
    }
}

/// Completions that may cut a statement list short.
pub trait Abrupt {
    /// `true` for return, break and continue.
    fn is_abrupt(&self) -> bool;
}

/// Run a `try` statement.
///
/// - `handler` runs only for catchable exceptions raised by `body`.
/// - `finalizer` always runs. If it throws or completes abruptly, its
///   completion replaces whatever was pending, so the last throw wins.
/// - An uncatchable exception pending when `finalizer` runs is kept unless
///   the finalizer raises another uncatchable one.
pub fn run_try<C, T, B, H, F>(
    cx: &mut C,
    body: B,
    handler: Option<H>,
    finalizer: Option<F>,
) -> Result<T, NativeException>
where
    T: Abrupt,
    B: FnOnce(&mut C) -> Result<T, NativeException>,
    H: FnOnce(&mut C, NativeException) -> Result<T, NativeException>,
    F: FnOnce(&mut C) -> Result<T, NativeException>,
{
    let mut result = body(cx);

    if let Some(handler) = handler {
        result = match result {
            Err(e) if e.is_catchable() => {
                log::trace!("catch binds {}", e);
                handler(cx, e)
            }
            other => other,
        };
    }

    let Some(finalizer) = finalizer else {
        return result;
    };
    let finished = finalizer(cx);

    match result {
        Err(pending) if !pending.is_catchable() => match finished {
            Err(e) if !e.is_catchable() => Err(e),
            _ => Err(pending),
        },
        pending => match finished {
            Err(e) => {
                if let Err(previous) = &pending {
                    log::trace!("finally replaces {} with {}", previous, e);
                }
                Err(e)
            }
            Ok(completion) if completion.is_abrupt() => Ok(completion),
            Ok(_) => pending,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticRecord;
    use crate::error_kind::NativeErrorKind;
    use crate::runtime::Value;

    #[derive(Debug, Clone, PartialEq)]
    enum Flow {
        Normal,
        Return(f64),
    }

    impl Abrupt for Flow {
        fn is_abrupt(&self) -> bool {
            !matches!(self, Flow::Normal)
        }
    }

    type Handler = fn(&mut Vec<&'static str>, NativeException) -> Result<Flow, NativeException>;
    type Finalizer = fn(&mut Vec<&'static str>) -> Result<Flow, NativeException>;

    fn throw(value: &str) -> NativeException {
        NativeException::thrown(Value::string(value), &DiagnosticRecord::message_only(value))
    }

    fn interrupt() -> NativeException {
        NativeException::interrupted(DiagnosticRecord::message_only("interrupted"))
    }

    #[test]
    fn catch_binds_thrown_value() {
        let mut log = Vec::new();
        let result = run_try(
            &mut log,
            |_| Err(throw("A")),
            Some(|log: &mut Vec<_>, e: NativeException| {
                log.push("catch");
                assert_eq!(e.payload().to_js_string().as_ref(), "A");
                Ok(Flow::Normal)
            }),
            None::<Finalizer>,
        );
        assert_eq!(result.unwrap(), Flow::Normal);
        assert_eq!(log, ["catch"]);
    }

    #[test]
    fn finally_throw_replaces_pending_exception() {
        let mut log = Vec::new();
        let result = run_try(
            &mut log,
            |_| Err::<Flow, _>(throw("A")),
            None::<Handler>,
            Some(|_: &mut Vec<_>| Err(throw("B"))),
        );
        assert_eq!(result.unwrap_err().message(), "B");
    }

    #[test]
    fn finally_return_discards_exception() {
        let result = run_try(
            &mut (),
            |_| Err::<Flow, _>(throw("A")),
            None::<fn(&mut (), NativeException) -> Result<Flow, NativeException>>,
            Some(|_: &mut ()| Ok(Flow::Return(1.0))),
        );
        assert_eq!(result.unwrap(), Flow::Return(1.0));
    }

    #[test]
    fn normal_finally_keeps_pending_completion() {
        let result = run_try(
            &mut (),
            |_| Ok(Flow::Return(7.0)),
            None::<fn(&mut (), NativeException) -> Result<Flow, NativeException>>,
            Some(|_: &mut ()| Ok(Flow::Normal)),
        );
        assert_eq!(result.unwrap(), Flow::Return(7.0));

        let result = run_try(
            &mut (),
            |_| Err::<Flow, _>(throw("A")),
            None::<fn(&mut (), NativeException) -> Result<Flow, NativeException>>,
            Some(|_: &mut ()| Ok(Flow::Normal)),
        );
        assert_eq!(result.unwrap_err().message(), "A");
    }

    #[test]
    fn uncatchable_skips_catch_but_runs_finally() {
        let mut log = Vec::new();
        let result = run_try(
            &mut log,
            |_| Err::<Flow, _>(interrupt()),
            Some(|log: &mut Vec<_>, _: NativeException| {
                log.push("catch");
                Ok(Flow::Normal)
            }),
            Some(|log: &mut Vec<_>| {
                log.push("finally");
                Ok(Flow::Return(0.0))
            }),
        );
        let error = result.unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::InternalError);
        assert_eq!(log, ["finally"]);
    }

    #[test]
    fn catch_throw_then_finally_throw() {
        let result = run_try(
            &mut (),
            |_| Err::<Flow, _>(throw("A")),
            Some(|_: &mut (), _: NativeException| Err(throw("C"))),
            Some(|_: &mut ()| Err(throw("B"))),
        );
        assert_eq!(result.unwrap_err().message(), "B");
    }

    #[test]
    fn frame_state_display() {
        assert_eq!(FrameState::default().to_string(), "running");
        assert!(FrameState::Unwinding(throw("x")).is_unwinding());
        assert_eq!(FrameState::Unwinding(throw("x")).to_string(), "unwinding (Error)");
    }
}
