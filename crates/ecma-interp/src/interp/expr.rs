//! Expression evaluation and operators.

use std::rc::Rc;

use ecma_core::runtime::{
    AssignError, Callable, EnvRef, Environment, Mutability, ObjectRef, ScopeKind,
};
use ecma_core::{NativeErrorKind, NativeException, Span, Value};
use ecma_parser::ast::{
    AssignExpr, BinaryExpr, BinaryOp, Expr, FunctionExpr, LiteralKind, ObjectExpr, UnaryExpr,
    UnaryOp,
};

use super::{EvalResult, Interpreter, UnitRef};
use crate::compile::report_warning;

/// Something an assignment or update can store into.
enum Place<'ast> {
    Binding(&'ast str),
    Property { base: Value, key: Rc<str> },
}

impl<'ast> Interpreter<'ast> {
    /// Evaluate an expression.
    pub(super) fn eval_expr(
        &mut self,
        expr: &'ast Expr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        self.stack.check_native(|| unit.record(expr.span(), ""))?;
        match expr {
            Expr::Literal(lit) => Ok(match lit.kind {
                LiteralKind::Number(n) => Value::Number(n),
                LiteralKind::String(s) => Value::string(s),
                LiteralKind::Bool(b) => Value::Bool(b),
                LiteralKind::Null => Value::Null,
            }),
            Expr::Ident(ident) => env
                .lookup(ident.name)
                .ok_or_else(|| not_defined(unit, ident.span, ident.name)),
            Expr::Binary(binary) => self.eval_binary(binary, env, unit),
            Expr::Unary(unary) => self.eval_unary(unary, env, unit),
            Expr::Postfix(postfix) => {
                let place = self.resolve_place(postfix.operand, env, unit)?;
                let old = self.read_place(&place, env, unit, postfix.span)?.to_number();
                let updated = Value::Number(old + postfix.op.delta());
                self.write_place(&place, updated, env, unit, postfix.span)?;
                Ok(Value::Number(old))
            }
            Expr::Assign(assign) => self.eval_assign(assign, env, unit),
            Expr::Conditional(cond) => {
                if self.eval_expr(cond.test, env, unit)?.truthy() {
                    self.eval_expr(cond.then_expr, env, unit)
                } else {
                    self.eval_expr(cond.else_expr, env, unit)
                }
            }
            Expr::Call(call) => self.eval_call(call, env, unit),
            Expr::New(new_expr) => self.eval_new(new_expr, env, unit),
            Expr::Member(member) => {
                let base = self.eval_expr(member.object, env, unit)?;
                self.get_property(&base, member.property.name, unit, member.span)
            }
            Expr::Index(index) => {
                let base = self.eval_expr(index.object, env, unit)?;
                let key = self.eval_expr(index.index, env, unit)?.to_js_string();
                self.get_property(&base, &key, unit, index.span)
            }
            Expr::Object(object) => self.eval_object(object, env, unit),
            Expr::Function(func) => Ok(self.instantiate(func, env, unit, true)),
            Expr::Sequence(seq) => {
                let mut value = Value::Undefined;
                for expr in seq.exprs {
                    value = self.eval_expr(expr, env, unit)?;
                }
                Ok(value)
            }
        }
    }

    fn eval_object(
        &mut self,
        object: &'ast ObjectExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        let obj = ObjectRef::new_ordinary();
        for property in object.properties {
            let value = self.eval_expr(property.value, env, unit)?;
            obj.set(property.key, value);
        }
        Ok(Value::Object(obj))
    }

    // =========================================
    // Operators
    // =========================================

    fn eval_unary(
        &mut self,
        unary: &'ast UnaryExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        match unary.op {
            UnaryOp::PreInc | UnaryOp::PreDec => {
                let delta = if unary.op == UnaryOp::PreInc { 1.0 } else { -1.0 };
                let place = self.resolve_place(unary.operand, env, unit)?;
                let new = self.read_place(&place, env, unit, unary.span)?.to_number() + delta;
                self.write_place(&place, Value::Number(new), env, unit, unary.span)?;
                Ok(Value::Number(new))
            }
            // `typeof` of an undeclared name is not an error.
            UnaryOp::Typeof => {
                let value = match unary.operand {
                    Expr::Ident(ident) => env.lookup(ident.name).unwrap_or_default(),
                    operand => self.eval_expr(operand, env, unit)?,
                };
                Ok(Value::string(value.type_of()))
            }
            op => {
                let value = self.eval_expr(unary.operand, env, unit)?;
                Ok(match op {
                    UnaryOp::Neg => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                    UnaryOp::LogicalNot => Value::Bool(!value.truthy()),
                    UnaryOp::BitwiseNot => Value::Number(f64::from(!to_int32(value.to_number()))),
                    _ => Value::Undefined,
                })
            }
        }
    }

    fn eval_binary(
        &mut self,
        binary: &'ast BinaryExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        let left = self.eval_expr(binary.left, env, unit)?;
        match binary.op {
            BinaryOp::LogicalAnd if !left.truthy() => return Ok(left),
            BinaryOp::LogicalOr if left.truthy() => return Ok(left),
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                return self.eval_expr(binary.right, env, unit);
            }
            _ => {}
        }
        let right = self.eval_expr(binary.right, env, unit)?;

        match binary.op {
            BinaryOp::Instanceof => {
                self.instance_of(&left, &right, unit, binary.span).map(Value::Bool)
            }
            BinaryOp::In => match right.as_object() {
                Some(obj) => Ok(Value::Bool(obj.has(&left.to_js_string()))),
                None => Err(unit.fault(
                    binary.span,
                    NativeErrorKind::TypeError,
                    format!("invalid 'in' operand {}", right.to_js_string()),
                )),
            },
            op => Ok(binary_operation(op, &left, &right)),
        }
    }

    /// `left instanceof right`.
    pub(super) fn instance_of(
        &self,
        left: &Value,
        right: &Value,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> Result<bool, NativeException> {
        let Some(ctor) = right.as_object().filter(|obj| obj.is_callable()) else {
            return Err(unit.fault(
                span,
                NativeErrorKind::TypeError,
                format!("invalid 'instanceof' operand {}", right.to_js_string()),
            ));
        };
        let Some(obj) = left.as_object() else {
            return Ok(false);
        };
        match ctor.callable() {
            Some(Callable::ErrorConstructor(kind)) => {
                Ok(obj.error_kind().is_some_and(|own| own.is_instance_of(kind)))
            }
            _ => Ok(obj.was_constructed_by(ctor)),
        }
    }

    fn eval_assign(
        &mut self,
        assign: &'ast AssignExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> EvalResult {
        let place = self.resolve_place(assign.target, env, unit)?;
        let value = match assign.op.binary_op() {
            None => self.eval_expr(assign.value, env, unit)?,
            Some(op) => {
                let current = self.read_place(&place, env, unit, assign.span)?;
                let operand = self.eval_expr(assign.value, env, unit)?;
                binary_operation(op, &current, &operand)
            }
        };
        self.write_place(&place, value.clone(), env, unit, assign.span)?;
        Ok(value)
    }

    // =========================================
    // Places and properties
    // =========================================

    fn resolve_place(
        &mut self,
        target: &'ast Expr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> Result<Place<'ast>, NativeException> {
        match target {
            Expr::Ident(ident) => Ok(Place::Binding(ident.name)),
            Expr::Member(member) => Ok(Place::Property {
                base: self.eval_expr(member.object, env, unit)?,
                key: Rc::from(member.property.name),
            }),
            Expr::Index(index) => {
                let base = self.eval_expr(index.object, env, unit)?;
                let key = self.eval_expr(index.index, env, unit)?.to_js_string();
                Ok(Place::Property { base, key })
            }
            other => Err(unit.fault(
                other.span(),
                NativeErrorKind::ReferenceError,
                "Invalid assignment left-hand side.",
            )),
        }
    }

    fn read_place(
        &mut self,
        place: &Place<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        match place {
            Place::Binding(name) => env.lookup(name).ok_or_else(|| not_defined(unit, span, name)),
            Place::Property { base, key } => self.get_property(base, key, unit, span),
        }
    }

    fn write_place(
        &mut self,
        place: &Place<'ast>,
        value: Value,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> Result<(), NativeException> {
        match place {
            Place::Binding(name) => self.assign_binding(name, value, env, unit, span),
            Place::Property { base, key } => set_property(base, key, value, unit, span),
        }
    }

    /// Store into an existing binding. Assigning an undeclared name creates a
    /// global variable.
    pub(super) fn assign_binding(
        &mut self,
        name: &str,
        value: Value,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> Result<(), NativeException> {
        match env.assign(name, value.clone()) {
            Ok(()) => Ok(()),
            Err(AssignError::NotDefined) => {
                self.global.declare(name, value, Mutability::Var);
                Ok(())
            }
            Err(AssignError::Const) => Err(unit.fault(
                span,
                NativeErrorKind::TypeError,
                format!("invalid assignment to const {}", name),
            )),
        }
    }

    /// Read `base[key]`.
    pub(super) fn get_property(
        &self,
        base: &Value,
        key: &str,
        unit: &UnitRef<'ast>,
        span: Span,
    ) -> EvalResult {
        match base {
            Value::Object(obj) => match obj.get(key) {
                Some(value) => Ok(value),
                None => {
                    let features = self.options.compile.features;
                    if features.undefined_property_warnings() {
                        let message = format!("reference to undefined property \"{}\"", key);
                        let record = unit.record(span, message);
                        report_warning(&*unit.reporter, features, &record)?;
                    }
                    Ok(Value::Undefined)
                }
            },
            Value::String(s) if key == "length" => Ok(Value::Number(s.chars().count() as f64)),
            Value::Undefined | Value::Null => Err(unit.fault(
                span,
                NativeErrorKind::TypeError,
                format!("Cannot read property \"{}\" from {}", key, base.to_js_string()),
            )),
            _ => Ok(Value::Undefined),
        }
    }

    /// Instantiate a function expression or declaration as a closure over
    /// `env`. A named function expression can refer to itself by name.
    pub(super) fn instantiate(
        &mut self,
        func: &'ast FunctionExpr<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
        bind_own_name: bool,
    ) -> Value {
        let id = self.function_id(func, unit);
        let name = func.display_name();
        let self_named = bind_own_name && func.name.is_some();
        let closure_env = if self_named {
            Environment::child(env, ScopeKind::Block)
        } else {
            env.clone()
        };

        let obj = ObjectRef::new_function(
            name,
            Callable::Script {
                id,
                env: closure_env.clone(),
                arrow: func.is_arrow,
            },
        );
        if self_named {
            closure_env.declare(name, Value::Object(obj.clone()), Mutability::Function);
        }
        Value::Object(obj)
    }
}

fn not_defined(unit: &UnitRef<'_>, span: Span, name: &str) -> NativeException {
    unit.fault(span, NativeErrorKind::ReferenceError, format!("{} is not defined", name))
}

/// Write `base[key] = value`. Writes to primitives are ignored.
fn set_property(
    base: &Value,
    key: &str,
    value: Value,
    unit: &UnitRef<'_>,
    span: Span,
) -> Result<(), NativeException> {
    match base {
        Value::Object(obj) => {
            obj.set(key, value);
            Ok(())
        }
        Value::Undefined | Value::Null => Err(unit.fault(
            span,
            NativeErrorKind::TypeError,
            format!(
                "Cannot set property \"{}\" of {} to \"{}\"",
                key,
                base.to_js_string(),
                value.to_js_string()
            ),
        )),
        _ => Ok(()),
    }
}

/// Operators that never throw.
fn binary_operation(op: BinaryOp, left: &Value, right: &Value) -> Value {
    use BinaryOp::*;

    let number = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_number(), right.to_number()));
    let int32 = |f: fn(i32, i32) -> i32| {
        Value::Number(f64::from(f(to_int32(left.to_number()), to_int32(right.to_number()))))
    };

    match op {
        Add => {
            let concat = |v: &Value| matches!(v, Value::String(_) | Value::Object(_));
            if concat(left) || concat(right) {
                let mut s = left.to_js_string().to_string();
                s.push_str(&right.to_js_string());
                Value::String(Rc::from(s))
            } else {
                number(|a, b| a + b)
            }
        }
        Sub => number(|a, b| a - b),
        Mul => number(|a, b| a * b),
        Div => number(|a, b| a / b),
        Mod => number(|a, b| a % b),

        Equal => Value::Bool(left.loose_equals(right)),
        NotEqual => Value::Bool(!left.loose_equals(right)),
        StrictEqual => Value::Bool(left.strict_equals(right)),
        StrictNotEqual => Value::Bool(!left.strict_equals(right)),

        Less => compare(left, right, |o| o.is_lt()),
        LessEqual => compare(left, right, |o| o.is_le()),
        Greater => compare(left, right, |o| o.is_gt()),
        GreaterEqual => compare(left, right, |o| o.is_ge()),

        BitwiseAnd => int32(|a, b| a & b),
        BitwiseOr => int32(|a, b| a | b),
        BitwiseXor => int32(|a, b| a ^ b),
        ShiftLeft => int32(|a, b| a.wrapping_shl(b as u32 & 31)),
        ShiftRight => int32(|a, b| a.wrapping_shr(b as u32 & 31)),
        ShiftRightUnsigned => {
            let shift = to_int32(right.to_number()) as u32 & 31;
            Value::Number(f64::from(to_uint32(left.to_number()) >> shift))
        }

        // Handled by the evaluator before reaching here.
        LogicalAnd | LogicalOr | Instanceof | In => Value::Undefined,
    }
}

/// Relational comparison; strings compare by code units, anything else
/// numerically with `NaN` comparing false.
fn compare(left: &Value, right: &Value, test: fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    };
    Value::Bool(ordering.is_some_and(test))
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::tests::{run, run_ok};

    fn text(source: &str) -> String {
        run_ok(source).to_js_string().to_string()
    }

    #[test]
    fn arithmetic_and_concatenation() {
        assert_eq!(run_ok("1 + 2 * 3 - 4 / 2").to_number(), 5.0);
        assert_eq!(text("'a' + 1 + 2"), "a12");
        assert_eq!(text("1 + 2 + 'a'"), "3a");
        assert_eq!(run_ok("7 % 4").to_number(), 3.0);
        assert!(run_ok("'x' * 2").to_number().is_nan());
    }

    #[test]
    fn bitwise_and_shifts() {
        assert_eq!(run_ok("5 & 3").to_number(), 1.0);
        assert_eq!(run_ok("5 | 3").to_number(), 7.0);
        assert_eq!(run_ok("~0").to_number(), -1.0);
        assert_eq!(run_ok("1 << 33").to_number(), 2.0);
        assert_eq!(run_ok("-8 >> 1").to_number(), -4.0);
        assert_eq!(run_ok("-1 >>> 28").to_number(), 15.0);
    }

    #[test]
    fn int32_conversion() {
        assert_eq!(to_int32(4_294_967_297.0), 1);
        assert_eq!(to_int32(-1.5), -1);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_uint32(-1.0), u32::MAX);
    }

    #[test]
    fn comparisons() {
        assert!(run_ok("1 < 2 && 'b' > 'a' && 2 >= 2").truthy());
        assert!(!run_ok("'a' < 1").truthy());
        assert!(run_ok("'10' < '9'").truthy());
        assert!(!run_ok("10 < 9").truthy());
        assert!(!run_ok("NaN < 1 || NaN >= 1").truthy());
        assert!(run_ok("null == undefined && 1 === 1 && '1' == 1 && '1' !== 1").truthy());
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(run_ok("var n = 0; false && n++; true || n++; n;").to_number(), 0.0);
        assert_eq!(text("0 || 'fallback'"), "fallback");
        assert_eq!(text("'a' && 'b'"), "b");
    }

    #[test]
    fn typeof_operator() {
        assert_eq!(text("typeof undeclared"), "undefined");
        assert_eq!(text("typeof function() {}"), "function");
        assert_eq!(text("typeof {}"), "object");
        assert_eq!(text("typeof null"), "object");
        assert_eq!(text("typeof 'x'"), "string");
        assert_eq!(text("typeof void 0"), "undefined");
    }

    #[test]
    fn updates_and_compound_assignment() {
        assert_eq!(text("var i = 1; var a = i++; var b = ++i; a + ',' + b + ',' + i"), "1,3,3");
        assert_eq!(run_ok("var o = { n: 2 }; o.n *= 5; o['n'] -= 1; o.n").to_number(), 9.0);
        assert_eq!(run_ok("var s = 'a'; s += 'b'; s.length").to_number(), 2.0);
    }

    #[test]
    fn undeclared_assignment_creates_global() {
        assert_eq!(run_ok("function f() { leaked = 3; } f(); leaked;").to_number(), 3.0);
    }

    #[test]
    fn reference_error_for_unknown_name() {
        let error = run("var a = 1;\nb + a;").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::ReferenceError);
        assert_eq!(error.message(), "b is not defined");
        assert_eq!(error.line(), 2);
        assert_eq!(error.line_offset(), 0);
    }

    #[test]
    fn const_assignment_is_type_error() {
        let error = run("const c = 1;\nc = 2;").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::TypeError);
        assert_eq!(error.message(), "invalid assignment to const c");
    }

    #[test]
    fn property_access_on_undefined() {
        let error = run("var u;\nu.name;").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::TypeError);
        assert_eq!(error.message(), "Cannot read property \"name\" from undefined");

        let error = run("null.x = 1;").unwrap_err();
        assert_eq!(error.message(), "Cannot set property \"x\" of null to \"1\"");
    }

    #[test]
    fn in_and_instanceof() {
        assert!(run_ok("'a' in { a: 1 }").truthy());
        assert!(run_ok("new TypeError('t') instanceof Error").truthy());
        assert!(!run_ok("new TypeError('t') instanceof RangeError").truthy());
        assert!(run_ok("function F() {} new F() instanceof F").truthy());
        assert!(!run_ok("({}) instanceof F; function F() {}").truthy());

        let error = run("1 instanceof 2").unwrap_err();
        assert_eq!(error.kind(), NativeErrorKind::TypeError);
        let error = run("'a' in 'abc'").unwrap_err();
        assert_eq!(error.message(), "invalid 'in' operand abc");
    }

    #[test]
    fn named_function_expression_sees_itself() {
        let source = "var fact = function f(n) { return n <= 1 ? 1 : n * f(n - 1); }; fact(5);";
        assert_eq!(run_ok(source).to_number(), 120.0);
    }
}
