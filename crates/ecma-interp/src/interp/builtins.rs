//! Host builtins and the global bindings installed in every environment.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use ecma_core::runtime::{BuiltinId, Callable, EnvRef, Mutability, ObjectRef};
use ecma_core::{NativeErrorKind, NativeException, Span, Value};

use super::{EvalResult, Interpreter, UnitRef};

/// Host functions callable from guest code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Builtin {
    Eval = 0,
    String = 1,
    IsNaN = 2,
    AssertEquals = 16,
    AssertTrue = 17,
    AssertThrows = 18,
}

impl Builtin {
    pub const CORE: [Builtin; 3] = [Builtin::Eval, Builtin::String, Builtin::IsNaN];

    /// Helpers used by test fixtures.
    pub const ASSERTIONS: [Builtin; 3] =
        [Builtin::AssertEquals, Builtin::AssertTrue, Builtin::AssertThrows];

    /// The global name the builtin is bound to.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Eval => "eval",
            Builtin::String => "String",
            Builtin::IsNaN => "isNaN",
            Builtin::AssertEquals => "assertEquals",
            Builtin::AssertTrue => "assertTrue",
            Builtin::AssertThrows => "assertThrows",
        }
    }

    fn function_object(self) -> ObjectRef {
        ObjectRef::new_function(self.name(), Callable::Builtin(BuiltinId(self.into())))
    }
}

/// Populate a fresh global environment.
pub(super) fn install_globals(global: &EnvRef, install_assertions: bool) {
    global.declare("undefined", Value::Undefined, Mutability::Const);
    global.declare("NaN", Value::Number(f64::NAN), Mutability::Const);
    global.declare("Infinity", Value::Number(f64::INFINITY), Mutability::Const);

    for kind in NativeErrorKind::CONSTRUCTIBLE {
        let ctor = ObjectRef::new_function(kind.name(), Callable::ErrorConstructor(kind));
        global.declare(kind.name(), Value::Object(ctor), Mutability::Function);
    }

    let assertions: &[Builtin] = if install_assertions { &Builtin::ASSERTIONS } else { &[] };
    for builtin in Builtin::CORE.iter().chain(assertions) {
        let function = Value::Object(builtin.function_object());
        global.declare(builtin.name(), function, Mutability::Function);
    }
}

impl<'ast> Interpreter<'ast> {
    pub(super) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Value],
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();

        match builtin {
            Builtin::Eval => self.eval_code(args.first(), env, unit, span),
            Builtin::String => Ok(match args.first() {
                Some(value) => Value::String(value.to_js_string()),
                None => Value::string(""),
            }),
            Builtin::IsNaN => Ok(Value::Bool(arg(0).to_number().is_nan())),
            Builtin::AssertEquals => {
                let (expected, actual) = (arg(0), arg(1));
                if expected.same_value(&actual) {
                    return Ok(Value::Undefined);
                }
                let detail = format!("expected {} but got {}", quoted(&expected), quoted(&actual));
                Err(assertion_failed(unit, span, args.get(2), detail))
            }
            Builtin::AssertTrue => {
                if arg(0).truthy() {
                    return Ok(Value::Undefined);
                }
                let detail = format!("expected true but got {}", quoted(&arg(0)));
                Err(assertion_failed(unit, span, args.get(1), detail))
            }
            Builtin::AssertThrows => self.assert_throws(&arg(0), &arg(1), env, unit, span),
        }
    }

    /// `assertThrows(fn, Ctor)`: call `fn` and require a catchable exception,
    /// an instance of `Ctor` when given. Returns the caught value.
    fn assert_throws(
        &mut self,
        func: &Value,
        ctor: &Value,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        let Some(function) = func.as_object().filter(|obj| obj.is_callable()) else {
            let message = "assertThrows expects a function";
            return Err(unit.fault(span, NativeErrorKind::TypeError, message));
        };

        let exception = match self.call_function(function, Vec::new(), env, unit, span) {
            Ok(_) => {
                let detail = "expected an exception".to_string();
                return Err(assertion_failed(unit, span, None, detail));
            }
            Err(e) if !e.is_catchable() => return Err(e),
            Err(e) => e,
        };

        if !ctor.is_undefined() && !self.instance_of(exception.payload(), ctor, unit, span)? {
            let expected = ctor
                .as_object()
                .and_then(|c| c.get("name"))
                .map_or_else(|| "?".to_string(), |n| n.to_js_string().to_string());
            let detail = format!("expected {} but got {}", expected, exception);
            return Err(assertion_failed(unit, span, None, detail));
        }
        Ok(exception.into_payload())
    }
}

/// Assertion failures are host-detected runtime errors, built by the chain.
fn assertion_failed(
    unit: &UnitRef<'_>,
    span: Span,
    label: Option<&Value>,
    detail: String,
) -> NativeException {
    let message = match label {
        Some(label) if !label.is_undefined() => format!("{}: {}", label.to_js_string(), detail),
        _ => detail,
    };
    unit.reporter.runtime_error(&unit.record(span, message))
}

fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_js_string().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::tests::{run, run_ok};

    #[test]
    fn builtin_ids_round_trip() {
        for builtin in Builtin::CORE.iter().chain(&Builtin::ASSERTIONS) {
            let raw: u16 = (*builtin).into();
            assert_eq!(Builtin::try_from(raw).ok(), Some(*builtin));
        }
        assert!(Builtin::try_from(999).is_err());
    }

    #[test]
    fn globals_are_installed() {
        assert!(run_ok("typeof undefined == 'undefined' && isNaN(NaN) && !isNaN(1)").truthy());
        assert_eq!(run_ok("String(12) + String()").to_js_string().as_ref(), "12");
        assert!(run_ok("typeof URIError == 'function' && typeof EvalError == 'function'").truthy());
        assert!(run_ok("typeof InternalError").to_js_string().as_ref() == "undefined");
    }

    #[test]
    fn assert_equals_failure_is_generic_error() {
        let error = run("assertEquals(1, 2, 'sum');").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::Error);
        assert_eq!(error.message(), "sum: expected 1 but got 2");
        assert!(run("assertEquals('a', 'a'); assertEquals(NaN, NaN);").is_ok());
    }

    #[test]
    fn assert_throws_checks_kind() {
        let source = "assertThrows(function() { null.x; }, TypeError) instanceof TypeError";
        assert!(run_ok(source).truthy());
        assert_eq!(run_ok("assertThrows(function() { throw 5; })").to_number(), 5.0);

        let error = run("assertThrows(function() { undefinedName; }, TypeError);").unwrap_err();
        assert_eq!(
            error.message(),
            "expected TypeError but got ReferenceError: undefinedName is not defined"
        );
        let error = run("assertThrows(function() {});").unwrap_err();
        assert_eq!(error.message(), "expected an exception");
    }

    #[test]
    fn assertions_are_opt_in() {
        let error =
            crate::interp::tests::run_with("assertTrue(true);", Default::default()).unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::ReferenceError);
    }
}
