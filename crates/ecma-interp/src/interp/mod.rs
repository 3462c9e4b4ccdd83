//! Tree-walking interpreter.
//!
//! Exceptions travel on the `Err` side of every `exec_*` / `eval_*` result;
//! return, break and continue travel as [`Completion`] values on the `Ok`
//! side. `try` statements are resolved by [`ecma_core::run_try`].
//!
//! Every runtime fault is built from a [`DiagnosticRecord`] located at the
//! offending node of the [`SourceUnit`] being executed. Script and `eval`
//! code are separate units: each keeps its own text, generated name and
//! reporter chain node.

mod builtins;
mod call;
mod eval;
mod expr;
mod stmt;

use std::rc::Rc;
use std::sync::Arc;

use bumpalo::Bump;
use rustc_hash::FxHashMap;

use ecma_core::runtime::{EnvRef, Environment, FunctionId, Mutability};
use ecma_core::{
    Abrupt, CallStack, DiagnosticRecord, ErrorCategory, ErrorReporter, INTERPRETER_STACK_BUDGET,
    InterruptHandle, NativeErrorKind, NativeException, Span, Value,
};
use ecma_parser::ast::{DeclKind, ForInit, FunctionExpr, Stmt};

use crate::compile::{CompileOptions, compile};

pub use builtins::Builtin;
pub use eval::eval_source_name;

/// Default limit on nested guest calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Message of the exception raised when an evaluation is cancelled.
pub const INTERRUPTED: &str = "Script execution was interrupted";

/// Settings for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpOptions {
    pub compile: CompileOptions,
    pub max_call_depth: usize,
    /// Install `assertEquals`, `assertTrue` and `assertThrows`.
    pub install_assertions: bool,
}

impl Default for InterpOptions {
    fn default() -> Self {
        Self {
            compile: CompileOptions::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            install_assertions: false,
        }
    }
}

/// How a statement finished, when it did not throw.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal,
    Return(Value),
    Break,
    Continue,
}

impl Abrupt for Completion {
    fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal)
    }
}

pub(crate) type ExecResult = Result<Completion, NativeException>;
pub(crate) type EvalResult = Result<Value, NativeException>;

/// Source text being executed, with the reporter it answers to.
pub struct SourceUnit<'ast> {
    pub uri: Option<Rc<str>>,
    pub text: &'ast str,
    pub reporter: Arc<dyn ErrorReporter>,
}

pub(crate) type UnitRef<'ast> = Rc<SourceUnit<'ast>>;

impl SourceUnit<'_> {
    /// A record for `span` in this unit.
    pub fn record(&self, span: Span, message: impl Into<String>) -> DiagnosticRecord {
        DiagnosticRecord::at_span(message, self.uri.as_deref(), self.text, span)
    }

    /// A catchable native fault of `kind` located at `span`.
    pub fn fault(
        &self,
        span: Span,
        kind: NativeErrorKind,
        message: impl Into<String>,
    ) -> NativeException {
        NativeException::native(kind, self.record(span, message), ErrorCategory::RuntimeError)
    }
}

#[derive(Clone)]
struct FunctionEntry<'ast> {
    func: &'ast FunctionExpr<'ast>,
    unit: UnitRef<'ast>,
}

/// Executes scripts against one global environment.
///
/// All code, including code compiled by `eval`, is allocated in `arena`, so
/// function objects stay valid for as long as the interpreter lives.
pub struct Interpreter<'ast> {
    arena: &'ast Bump,
    options: InterpOptions,
    reporter: Arc<dyn ErrorReporter>,
    global: EnvRef,
    functions: Vec<FunctionEntry<'ast>>,
    function_ids: FxHashMap<usize, FunctionId>,
    stack: CallStack,
    interrupt: InterruptHandle,
    /// Exceptions bound by the `catch` clauses currently executing.
    handled: Vec<NativeException>,
    /// Value of the most recent expression statement.
    last_value: Value,
}

impl<'ast> Interpreter<'ast> {
    pub fn new(
        arena: &'ast Bump,
        options: InterpOptions,
        reporter: Arc<dyn ErrorReporter>,
        interrupt: InterruptHandle,
    ) -> Self {
        let global = Environment::new_global();
        builtins::install_globals(&global, options.install_assertions);
        Self {
            arena,
            options,
            reporter,
            global,
            functions: Vec::new(),
            function_ids: FxHashMap::default(),
            stack: CallStack::new(options.max_call_depth),
            interrupt,
            handled: Vec::new(),
            last_value: Value::Undefined,
        }
    }

    pub fn global(&self) -> &EnvRef {
        &self.global
    }

    pub fn options(&self) -> &InterpOptions {
        &self.options
    }

    /// Compile and run `source` as a top-level script.
    ///
    /// Returns the value of the last expression statement executed at the
    /// top level, or the exception nothing caught.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run_script(&mut self, source: &str, source_uri: Option<&str>) -> EvalResult {
        let text: &'ast str = self.arena.alloc_str(source);
        let script = {
            #[cfg(feature = "profiling")]
            profiling::scope!("compile");
            compile(text, source_uri, self.options.compile, &*self.reporter, self.arena)?
        };

        let unit = Rc::new(SourceUnit {
            uri: source_uri.map(Rc::from),
            text,
            reporter: self.reporter.clone(),
        });

        self.stack.anchor(INTERPRETER_STACK_BUDGET);
        self.stack.push("<script>", source_uri, DiagnosticRecord::default)?;
        self.last_value = Value::Undefined;
        let global = self.global.clone();
        let result = {
            #[cfg(feature = "profiling")]
            profiling::scope!("execute");
            self.run_body(script.stmts(), &global, &unit)
        };
        self.stack.pop();

        match result {
            Ok(_) => Ok(std::mem::take(&mut self.last_value)),
            Err(exception) => {
                log::debug!("uncaught {} at {}", exception, exception.record());
                Err(exception)
            }
        }
    }

    /// Hoist declarations of a script, function or `eval` body and run it.
    fn run_body(
        &mut self,
        stmts: &'ast [Stmt<'ast>],
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        hoist_vars(stmts, env);
        self.hoist_functions(stmts, env, unit);
        self.exec_stmts(stmts, env, unit)
    }

    /// Bind the function declarations of one statement list.
    fn hoist_functions(&mut self, stmts: &'ast [Stmt<'ast>], env: &EnvRef, unit: &UnitRef<'ast>) {
        for stmt in stmts {
            if let Stmt::Function(func) = stmt {
                let value = self.instantiate(func, env, unit, false);
                env.declare(func.display_name(), value, Mutability::Function);
            }
        }
    }

    /// Raise the cancellation exception if an interrupt is pending.
    ///
    /// The request is consumed, so `finally` blocks run normally while the
    /// exception unwinds.
    fn check_interrupt(&self, unit: &UnitRef<'ast>, span: Span) -> Result<(), NativeException> {
        if self.interrupt.reset() {
            log::debug!("evaluation interrupted at line {}", span.line);
            return Err(NativeException::interrupted(unit.record(span, INTERRUPTED)));
        }
        Ok(())
    }

    /// Id of the function table entry for `func`, registering it once.
    fn function_id(&mut self, func: &'ast FunctionExpr<'ast>, unit: &UnitRef<'ast>) -> FunctionId {
        let key = func as *const FunctionExpr<'ast> as usize;
        if let Some(&id) = self.function_ids.get(&key) {
            return id;
        }
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FunctionEntry {
            func,
            unit: unit.clone(),
        });
        self.function_ids.insert(key, id);
        id
    }
}

/// Declare every `var` of `stmts`, outside nested functions, in the
/// function scope of `env`.
fn hoist_vars(stmts: &[Stmt<'_>], env: &EnvRef) {
    let var_env = env.function_scope();
    let mut names = Vec::new();
    collect_var_names(stmts, &mut names);
    for name in names {
        if !var_env.has_own(name) {
            var_env.declare(name, Value::Undefined, Mutability::Var);
        }
    }
}

fn collect_var_names<'ast>(stmts: &[Stmt<'ast>], names: &mut Vec<&'ast str>) {
    for stmt in stmts {
        collect_stmt_var_names(stmt, names);
    }
}

fn collect_stmt_var_names<'ast>(stmt: &Stmt<'ast>, names: &mut Vec<&'ast str>) {
    match stmt {
        Stmt::VarDecl(decl) if decl.kind == DeclKind::Var => {
            names.extend(decl.vars.iter().map(|v| v.name.name));
        }
        Stmt::Block(block) => collect_var_names(block.stmts, names),
        Stmt::If(s) => {
            collect_stmt_var_names(s.then_stmt, names);
            if let Some(else_stmt) = s.else_stmt {
                collect_stmt_var_names(else_stmt, names);
            }
        }
        Stmt::While(s) => collect_stmt_var_names(s.body, names),
        Stmt::DoWhile(s) => collect_stmt_var_names(s.body, names),
        Stmt::For(s) => {
            if let Some(ForInit::VarDecl(decl)) = &s.init {
                if decl.kind == DeclKind::Var {
                    names.extend(decl.vars.iter().map(|v| v.name.name));
                }
            }
            collect_stmt_var_names(s.body, names);
        }
        Stmt::Try(s) => {
            collect_var_names(s.block.stmts, names);
            if let Some(catch) = &s.catch {
                collect_var_names(catch.body.stmts, names);
            }
            if let Some(finally) = &s.finally {
                collect_var_names(finally.stmts, names);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecma_core::{DefaultReporter, LanguageVersion};

    pub(crate) fn run(source: &str) -> EvalResult {
        run_with(source, InterpOptions {
            install_assertions: true,
            ..InterpOptions::default()
        })
    }

    pub(crate) fn run_with(source: &str, options: InterpOptions) -> EvalResult {
        let arena = Bump::new();
        let reporter: Arc<dyn ErrorReporter> = Arc::new(DefaultReporter::new());
        let mut interp = Interpreter::new(&arena, options, reporter, InterruptHandle::new());
        interp.run_script(source, Some("test.js"))
    }

    pub(crate) fn run_ok(source: &str) -> Value {
        match run(source) {
            Ok(value) => value,
            Err(e) => panic!("unexpected exception {} at {}", e, e.record()),
        }
    }

    #[test]
    fn script_value_is_last_expression() {
        assert_eq!(run_ok("var a = 2; a * 21;").to_number(), 42.0);
        assert!(run_ok("var a = 1;").is_undefined());
    }

    #[test]
    fn function_calls_do_not_change_script_value() {
        assert_eq!(run_ok("function f() { 99; return 1; } 5; var x = f();").to_number(), 5.0);
    }

    #[test]
    fn hoisting() {
        assert_eq!(run_ok("f(); function f() { return 3; } f();").to_number(), 3.0);
        assert!(run_ok("x; var x = 1;").is_undefined());
        assert_eq!(run_ok("function g(a) { var a; return a; } g(7);").to_number(), 7.0);
    }

    #[test]
    fn vars_hoist_out_of_blocks() {
        assert_eq!(run_ok("{ if (true) { var inner = 4; } } inner;").to_number(), 4.0);
    }

    #[test]
    fn versions_gate_syntax() {
        let options = InterpOptions {
            compile: CompileOptions {
                version: LanguageVersion::V1_7,
                ..CompileOptions::default()
            },
            ..InterpOptions::default()
        };
        let error = run_with("var f = x => x;", options).unwrap_err();
        assert_eq!(error.message(), "syntax error");
        assert_eq!(run_with("let y = 1; y;", options).unwrap().to_number(), 1.0);
    }

    #[test]
    fn pre_raised_interrupt_stops_script() {
        let arena = Bump::new();
        let interrupt = InterruptHandle::new();
        let mut interp = Interpreter::new(
            &arena,
            InterpOptions::default(),
            Arc::new(DefaultReporter::new()),
            interrupt.clone(),
        );
        interrupt.interrupt();
        let error = interp
            .run_script("var n = 0; try { while (true) { n++; } } catch (e) { n = -1; }", None)
            .unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::InternalError);
        assert!(!error.is_catchable());
        assert_eq!(interp.global().lookup("n").map(|v| v.to_number()), Some(0.0));
        assert!(!interrupt.is_interrupted());
    }
}
