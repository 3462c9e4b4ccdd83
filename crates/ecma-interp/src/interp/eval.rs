//! Direct `eval`.
//!
//! Each call compiles its argument with a fresh eval-mode reporter node
//! chained to the caller's reporter. Compile errors in the code therefore
//! always throw, as `SyntaxError` or `TypeError`, and carry the generated
//! source name of the call site. Once compiled, the code runs with the
//! caller's reporter, so runtime diagnostics are classified the same inside
//! and outside `eval`.

use std::rc::Rc;
use std::sync::Arc;

use ecma_core::runtime::{EnvRef, Environment, ScopeKind};
use ecma_core::{DefaultReporter, ErrorReporter, Span, Value};

use super::{EvalResult, Interpreter, SourceUnit, UnitRef};
use crate::compile::compile;

/// Name of the code compiled by an `eval` call at `caller_line` of
/// `caller_uri`, e.g. `main.js#12(eval)`.
pub fn eval_source_name(caller_uri: Option<&str>, caller_line: u32) -> String {
    format!("{}#{}(eval)", caller_uri.unwrap_or("<anonymous>"), caller_line)
}

impl<'ast> Interpreter<'ast> {
    /// Evaluate `code` in `env`, the environment of the caller.
    ///
    /// Non-string arguments are returned unchanged.
    pub(super) fn eval_code(
        &mut self,
        code: Option<&Value>,
        env: &EnvRef,
        caller: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        let source = match code {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Ok(other.clone()),
            None => return Ok(Value::Undefined),
        };

        let name = eval_source_name(caller.uri.as_deref(), span.line);
        log::debug!("eval at {}", name);

        let compile_reporter: Arc<dyn ErrorReporter> =
            match DefaultReporter::for_eval(caller.reporter.clone()) {
                Ok(node) => Arc::new(node),
                Err(e) => {
                    let record = caller.record(span, e.to_string());
                    return Err(caller.reporter.runtime_error(&record));
                }
            };

        let text: &'ast str = self.arena.alloc_str(&source);
        let options = self.options.compile;
        let script = compile(text, Some(&name), options, &*compile_reporter, self.arena)?;
        let unit = Rc::new(SourceUnit {
            uri: Some(Rc::from(name.as_str())),
            text,
            reporter: caller.reporter.clone(),
        });

        self.stack.push("<eval>", Some(&name), || caller.record(span, ""))?;
        let saved_value = std::mem::take(&mut self.last_value);
        let eval_env = Environment::child(env, ScopeKind::Block);
        let result = self.run_body(script.stmts(), &eval_env, &unit);
        let value = std::mem::replace(&mut self.last_value, saved_value);
        self.stack.pop();

        result.map(|_| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecma_core::{ContextFeatures, ErrorCategory, NativeErrorKind};

    use crate::compile::CompileOptions;
    use crate::interp::InterpOptions;
    use crate::interp::tests::{run, run_ok, run_with};

    #[test]
    fn source_names() {
        assert_eq!(eval_source_name(Some("main.js"), 3), "main.js#3(eval)");
        assert_eq!(eval_source_name(None, 1), "<anonymous>#1(eval)");
    }

    #[test]
    fn eval_returns_completion_value() {
        assert_eq!(run_ok("eval('1 + 2')").to_number(), 3.0);
        assert!(run_ok("eval('var unused = 1;')").is_undefined());
        assert_eq!(run_ok("eval(7)").to_number(), 7.0);
    }

    #[test]
    fn eval_uses_caller_scope() {
        let local = "function f() { var local = 4; return eval('local * 2'); } f();";
        assert_eq!(run_ok(local).to_number(), 8.0);
        assert_eq!(run_ok("eval('var hoisted = 5;'); hoisted;").to_number(), 5.0);
        let inner = "function g() { eval('var inner = 1;'); return typeof inner; }
                     g() + typeof inner;";
        assert_eq!(run_ok(inner).to_js_string().as_ref(), "numberundefined");
    }

    #[test]
    fn eval_syntax_error_reaches_host() {
        let error = run("var x = 1;\nx = eval('function(');").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::SyntaxError);
        assert_eq!(error.category(), ErrorCategory::CompileError);
        assert_eq!(error.message(), "missing name after function keyword");
        assert_eq!(error.source_uri(), Some("test.js#2(eval)"));
        assert_eq!(error.line(), 1);
        assert_eq!(error.line_text(), Some("function("));
    }

    #[test]
    fn eval_syntax_error_is_catchable() {
        let source = "
            var r;
            try { eval('var = 1'); }
            catch (e) { r = e instanceof SyntaxError ? e.message : 'wrong'; }
            r;
        ";
        assert_eq!(run_ok(source).to_js_string().as_ref(), "missing variable name");
    }

    #[test]
    fn eval_redeclaration_is_type_error() {
        let source = "
            var kind;
            try { eval('const a = 1; const a = 2;'); }
            catch (e) { kind = e.name + ': ' + e.message; }
            kind;
        ";
        assert_eq!(run_ok(source).to_js_string().as_ref(), "TypeError: redeclaration of const a.");
    }

    #[test]
    fn runtime_error_in_eval_keeps_eval_location() {
        let error = run("\n\neval('1;\\nmissing();');").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::ReferenceError);
        assert_eq!(error.source_uri(), Some("test.js#3(eval)"));
        assert_eq!(error.line(), 2);
    }

    #[test]
    fn nested_eval_names_chain() {
        let error = run("eval(\"eval('(')\")").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::SyntaxError);
        assert_eq!(error.source_uri(), Some("test.js#1(eval)#1(eval)"));
    }

    #[test]
    fn escalated_runtime_warning_has_same_kind_inside_eval() {
        let features = ContextFeatures::STRICT_WARNINGS
            | ContextFeatures::UNDEFINED_PROPERTY_WARNINGS
            | ContextFeatures::WARNINGS_AS_ERRORS;
        let options = InterpOptions {
            compile: CompileOptions {
                features,
                ..CompileOptions::default()
            },
            ..InterpOptions::default()
        };
        let caught = |read: &str| {
            let source = format!(
                "var o = {{}}; var r;
                 try {{ {} }} catch (e) {{ r = e.name + '|' + e.message; }}
                 r;",
                read
            );
            run_with(&source, options).unwrap().to_js_string().to_string()
        };

        let expected = "Error|reference to undefined property \"missing\"";
        assert_eq!(caught("o.missing;"), expected);
        assert_eq!(caught("eval('o.missing;');"), expected);
    }

    #[test]
    fn deeply_nested_eval_code_is_catchable_syntax_error() {
        let parens = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
        let source = format!("var c; try {{ eval('{}'); }} catch (e) {{ c = e.name; }} c;", parens);
        assert_eq!(run_ok(&source).to_js_string().as_ref(), "SyntaxError");
    }

    #[test]
    fn exception_from_eval_code_propagates_unchanged() {
        let error = run("eval('throw new URIError(\"bad\")');").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::URIError);
        assert_eq!(error.message(), "bad");
        assert_eq!(error.source_uri(), Some("test.js#1(eval)"));
    }
}
