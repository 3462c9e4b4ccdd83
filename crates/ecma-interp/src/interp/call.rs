//! Function calls and `new`.

use ecma_core::runtime::{
    Callable, EnvRef, Environment, FunctionId, Mutability, ObjectRef, ScopeKind,
};
use ecma_core::{FrameState, NativeErrorKind, NativeException, Span, Value};
use ecma_parser::ast::{CallExpr, Expr, FunctionBody, NewExpr};

use super::builtins::Builtin;
use super::{Completion, EvalResult, Interpreter, UnitRef};

impl<'ast> Interpreter<'ast> {
    pub(super) fn eval_call(
        &mut self,
        call: &'ast CallExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        let callee = self.eval_expr(call.callee, env, unit)?;
        let args = self.eval_args(call.args, env, unit)?;

        let Some(function) = callee.as_object().filter(|obj| obj.is_callable()) else {
            return Err(unit.fault(
                call.span,
                NativeErrorKind::TypeError,
                format!("{} is not a function", describe_callee(call.callee)),
            ));
        };
        self.call_function(function, args, env, unit, call.span)
    }

    pub(super) fn eval_new(
        &mut self,
        new_expr: &'ast NewExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        let callee = self.eval_expr(new_expr.callee, env, unit)?;
        let args = self.eval_args(new_expr.args, env, unit)?;

        let target = callee
            .as_object()
            .and_then(|obj| obj.callable().map(|callable| (obj, callable)))
            .filter(|(_, callable)| callable.is_constructor());
        let Some((ctor, callable)) = target else {
            return Err(unit.fault(
                new_expr.span,
                NativeErrorKind::TypeError,
                format!("{} is not a constructor", describe_callee(new_expr.callee)),
            ));
        };

        match callable {
            Callable::ErrorConstructor(kind) => {
                Ok(construct_error(kind, &args, unit, new_expr.span))
            }
            Callable::Script { id, env: closure, .. } => {
                let instance = ObjectRef::new_ordinary();
                instance.set_constructed_by(ctor);
                let result = self.call_script(id, &closure, args, unit, new_expr.span)?;
                Ok(match result {
                    Value::Object(_) => result,
                    _ => Value::Object(instance),
                })
            }
            Callable::Builtin(_) => Ok(Value::Undefined),
        }
    }

    fn eval_args(
        &mut self,
        args: &'ast [&'ast Expr<'ast>],
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> Result<Vec<Value>, NativeException> {
        args.iter().map(|arg| self.eval_expr(arg, env, unit)).collect()
    }

    /// Invoke a function object. `env` is the caller's environment, used by
    /// builtins with direct semantics such as `eval`.
    pub(super) fn call_function(
        &mut self,
        function: &ObjectRef,
        args: Vec<Value>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        match function.callable() {
            Some(Callable::Script { id, env: closure, .. }) => {
                self.call_script(id, &closure, args, unit, span)
            }
            Some(Callable::Builtin(id)) => {
                let builtin = Builtin::try_from(id.0).map_err(|e| {
                    unit.reporter.runtime_error(&unit.record(span, e.to_string()))
                })?;
                self.call_builtin(builtin, &args, env, unit, span)
            }
            Some(Callable::ErrorConstructor(kind)) => Ok(construct_error(kind, &args, unit, span)),
            None => Err(unit.fault(span, NativeErrorKind::TypeError, "not a function")),
        }
    }

    /// Run a script function in a new frame.
    ///
    /// `unit` and `span` locate the call site, which is where a depth-limit
    /// fault or an interrupt is reported.
    pub(super) fn call_script(
        &mut self,
        id: FunctionId,
        closure: &EnvRef,
        args: Vec<Value>,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        self.check_interrupt(unit, span)?;
        let Some(entry) = self.functions.get(id.0 as usize).cloned() else {
            return Err(unit.reporter.runtime_error(&unit.record(span, "unknown function")));
        };
        let func = entry.func;

        self.stack
            .push(func.display_name(), entry.unit.uri.as_deref(), || unit.record(span, ""))?;

        let fn_env = Environment::child(closure, ScopeKind::Function);
        let mut args = args.into_iter();
        for param in func.params {
            fn_env.declare(param.name, args.next().unwrap_or_default(), Mutability::Function);
        }

        let saved_value = std::mem::take(&mut self.last_value);
        let result = match func.body {
            FunctionBody::Block(block) => {
                self.run_body(block.stmts, &fn_env, &entry.unit).map(|c| match c {
                    Completion::Return(value) => value,
                    _ => Value::Undefined,
                })
            }
            FunctionBody::Expr(expr) => self.eval_expr(expr, &fn_env, &entry.unit),
        };
        self.last_value = saved_value;

        if let Err(e) = &result {
            self.stack.set_state(FrameState::Unwinding(e.clone()));
        }
        self.stack.pop();
        result
    }
}

/// A native error object built by calling an error constructor at `span`.
pub(super) fn construct_error(
    kind: NativeErrorKind,
    args: &[Value],
    unit: &UnitRef<'_>,
    span: Span,
) -> Value {
    let message = match args.first() {
        Some(value) if !value.is_undefined() => value.to_js_string().to_string(),
        _ => String::new(),
    };
    Value::Object(ObjectRef::new_error(kind, &unit.record(span, message)))
}

/// Source-like name of a callee for error messages.
fn describe_callee(expr: &Expr<'_>) -> String {
    match expr {
        Expr::Ident(ident) => ident.name.to_string(),
        Expr::Member(member) => {
            format!("{}.{}", describe_callee(member.object), member.property.name)
        }
        Expr::Index(index) => format!("{}[...]", describe_callee(index.object)),
        Expr::Function(func) => format!("function {}", func.display_name()),
        _ => "expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use ecma_core::{ErrorCategory, NativeErrorKind, TOO_MUCH_RECURSION};

    use crate::interp::InterpOptions;
    use crate::interp::tests::{run, run_ok, run_with};

    #[test]
    fn closures_capture_environment() {
        let source = "
            function counter() { var n = 0; return function() { n++; return n; }; }
            var c = counter();
            c(); c();
            c();
        ";
        assert_eq!(run_ok(source).to_number(), 3.0);
    }

    #[test]
    fn missing_arguments_are_undefined() {
        assert!(run_ok("function f(a, b) { return b; } f(1);").is_undefined());
        assert_eq!(run_ok("function f(a) { return a; } f(1, 2, 3);").to_number(), 1.0);
    }

    #[test]
    fn arrow_functions() {
        assert_eq!(run_ok("var add = (a, b) => a + b; add(2, 3);").to_number(), 5.0);
        assert_eq!(run_ok("var f = x => { return x * 2; }; f(4);").to_number(), 8.0);
        assert_eq!(run_ok("var k = () => 7; k();").to_number(), 7.0);
    }

    #[test]
    fn calling_non_function_is_type_error() {
        let error = run("var o = { a: 1 };\no.a();").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::TypeError);
        assert_eq!(error.message(), "o.a is not a function");
        assert_eq!(error.line(), 2);

        let error = run("undefinedFn();").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::ReferenceError);
    }

    #[test]
    fn new_requires_constructor() {
        let error = run("var arrow = () => 1; new arrow();").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::TypeError);
        assert_eq!(error.message(), "arrow is not a constructor");

        let error = run("new String('x');").unwrap_err();
        assert_eq!(error.message(), "String is not a constructor");
    }

    #[test]
    fn constructor_result() {
        let source = "function P() {} var p = new P(); typeof p == 'object' && p instanceof P";
        assert!(run_ok(source).truthy());
        assert_eq!(run_ok("function Q() { return { v: 9 }; } new Q().v;").to_number(), 9.0);
    }

    #[test]
    fn error_constructors_with_and_without_new() {
        assert_eq!(run_ok("new RangeError('r').name").to_js_string().as_ref(), "RangeError");
        assert_eq!(run_ok("TypeError('t').message").to_js_string().as_ref(), "t");
        assert_eq!(run_ok("String(new Error('e'))").to_js_string().as_ref(), "Error: e");
        assert_eq!(run_ok("new Error().message").to_js_string().as_ref(), "");
        assert_eq!(run_ok("var e = new SyntaxError('s');\ne.lineNumber").to_number(), 1.0);
    }

    #[test]
    fn runaway_recursion_is_catchable_range_error() {
        let options = InterpOptions {
            max_call_depth: 24,
            ..InterpOptions::default()
        };
        let source = "
            function down(n) { return down(n + 1); }
            var caught;
            try { down(0); } catch (e) { caught = e; }
            caught instanceof RangeError ? caught.message : 'no';
        ";
        let value = run_with(source, options).unwrap();
        assert_eq!(value.to_js_string().as_ref(), TOO_MUCH_RECURSION);

        let error = run_with("function f() { f(); }\nf();", options).unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::RangeError);
        assert_eq!(error.category(), ErrorCategory::HostFault);
        assert_eq!(error.line(), 1);
    }

    #[test]
    fn default_depth_recursion_fits_a_default_thread() {
        let handle = std::thread::spawn(|| {
            let source = "
                function d(n) { return d(n + 1); }
                var c;
                try { d(0); } catch (e) { c = e.name + ': ' + e.message; }
                c;
            ";
            run_with(source, InterpOptions::default())
                .map(|v| v.to_js_string().to_string())
                .map_err(|e| e.to_string())
        });
        let caught = handle.join().unwrap().unwrap();
        assert_eq!(caught, format!("RangeError: {}", TOO_MUCH_RECURSION));
    }

    #[test]
    fn deep_expression_tree_never_overflows() {
        let handle = std::thread::spawn(|| {
            let source = vec!["1"; 400].join(" + ");
            match run(&source) {
                Ok(value) => Ok(value.to_number()),
                Err(e) => Err((e.kind(), e.message().to_string())),
            }
        });
        match handle.join().unwrap() {
            Ok(sum) => assert_eq!(sum, 400.0),
            Err((kind, message)) => {
                assert_eq!(kind, NativeErrorKind::RangeError);
                assert_eq!(message, TOO_MUCH_RECURSION);
            }
        }
    }
}
