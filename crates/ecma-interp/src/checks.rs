//! Static checks run on a parsed script before it executes.
//!
//! - `let` / `const` redeclarations in one scope. These are errors whose
//!   message carries the `TypeError: ` prefix, so an eval-mode reporter turns
//!   them into catchable `TypeError`s.
//! - Expression statements with no side effects inside function bodies,
//!   reported as strict-mode warnings. Top-level expression statements
//!   produce the script's result value and are never flagged.
//!
//! The walk stops with an error once it outgrows its native stack budget.

use rustc_hash::FxHashMap;

use ecma_core::{
    COMPILE_STACK_BUDGET, ContextFeatures, Severity, Span, StackGuard, TOO_DEEP_NESTING,
};
use ecma_parser::ast::{
    Block, DeclKind, Expr, ForInit, FunctionBody, FunctionExpr, Script, Stmt, VarDeclStmt,
};

/// Warning text for an expression statement that does nothing.
pub const NO_SIDE_EFFECTS: &str = "Code has no side effects";

/// One problem found by [`check_script`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Finding {
    fn error(span: Span, message: String) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message,
        }
    }
}

/// Run every static check over `script`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn check_script(script: &Script<'_>, features: ContextFeatures) -> Vec<Finding> {
    let mut checker = Checker {
        features,
        scopes: vec![Scope::default()],
        function_depth: 0,
        findings: Vec::new(),
        stack: StackGuard::anchor(COMPILE_STACK_BUDGET),
        too_deep: false,
    };
    checker.check_stmts(script.stmts());
    checker.findings
}

#[derive(Default)]
struct Scope<'ast> {
    names: FxHashMap<&'ast str, DeclKind>,
    /// Function and global scopes receive `var` declarations.
    is_function: bool,
}

struct Checker<'ast> {
    features: ContextFeatures,
    scopes: Vec<Scope<'ast>>,
    function_depth: u32,
    findings: Vec<Finding>,
    stack: StackGuard,
    too_deep: bool,
}

impl<'ast> Checker<'ast> {
    fn check_stmts(&mut self, stmts: &'ast [Stmt<'ast>]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    /// Whether the walk must stop here. Reported once.
    fn out_of_stack(&mut self, span: Span) -> bool {
        if self.too_deep {
            return true;
        }
        if self.stack.is_exhausted() {
            self.too_deep = true;
            self.findings.push(Finding::error(span, TOO_DEEP_NESTING.to_string()));
        }
        self.too_deep
    }

    fn check_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        if self.out_of_stack(stmt.span()) {
            return;
        }
        match stmt {
            Stmt::Expr(expr_stmt) => {
                if let Some(expr) = expr_stmt.expr {
                    if self.function_depth > 0
                        && self.features.strict_warnings()
                        && !expr.has_side_effects()
                    {
                        self.findings.push(Finding {
                            severity: Severity::Warning,
                            span: expr_stmt.span,
                            message: NO_SIDE_EFFECTS.to_string(),
                        });
                    }
                    self.check_expr(expr);
                }
            }
            Stmt::VarDecl(decl) => self.check_decl(decl),
            Stmt::Function(func) => {
                if let Some(name) = func.name {
                    self.declare(name.name, DeclKind::Var, name.span);
                }
                self.check_function(func);
            }
            Stmt::Return(ret) => {
                if let Some(value) = ret.value {
                    self.check_expr(value);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Throw(throw) => self.check_expr(throw.value),
            Stmt::Block(block) => self.check_block(block),
            Stmt::If(if_stmt) => {
                self.check_expr(if_stmt.condition);
                self.check_stmt(if_stmt.then_stmt);
                if let Some(else_stmt) = if_stmt.else_stmt {
                    self.check_stmt(else_stmt);
                }
            }
            Stmt::While(while_stmt) => {
                self.check_expr(while_stmt.condition);
                self.check_stmt(while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.check_stmt(do_while.body);
                self.check_expr(do_while.condition);
            }
            Stmt::For(for_stmt) => {
                self.scopes.push(Scope::default());
                match &for_stmt.init {
                    Some(ForInit::VarDecl(decl)) => self.check_decl(decl),
                    Some(ForInit::Expr(expr)) => self.check_expr(expr),
                    None => {}
                }
                for expr in [for_stmt.condition, for_stmt.update].into_iter().flatten() {
                    self.check_expr(expr);
                }
                self.check_stmt(for_stmt.body);
                self.scopes.pop();
            }
            Stmt::Try(try_stmt) => {
                self.check_block(&try_stmt.block);
                if let Some(catch) = &try_stmt.catch {
                    self.scopes.push(Scope::default());
                    if let Some(param) = catch.param {
                        self.declare(param.name, DeclKind::Let, param.span);
                    }
                    self.check_stmts(catch.body.stmts);
                    self.scopes.pop();
                }
                if let Some(finally) = &try_stmt.finally {
                    self.check_block(finally);
                }
            }
        }
    }

    fn check_block(&mut self, block: &'ast Block<'ast>) {
        self.scopes.push(Scope::default());
        self.check_stmts(block.stmts);
        self.scopes.pop();
    }

    fn check_decl(&mut self, decl: &'ast VarDeclStmt<'ast>) {
        for var in decl.vars {
            if let Some(init) = var.init {
                self.check_expr(init);
            }
            self.declare(var.name.name, decl.kind, var.name.span);
        }
    }

    fn check_function(&mut self, func: &'ast FunctionExpr<'ast>) {
        self.scopes.push(Scope {
            is_function: true,
            ..Scope::default()
        });
        for param in func.params {
            self.declare(param.name, DeclKind::Var, param.span);
        }
        self.function_depth += 1;
        match func.body {
            FunctionBody::Block(block) => self.check_stmts(block.stmts),
            FunctionBody::Expr(expr) => self.check_expr(expr),
        }
        self.function_depth -= 1;
        self.scopes.pop();
    }

    /// Descend into expressions only to reach nested function bodies.
    fn check_expr(&mut self, expr: &'ast Expr<'ast>) {
        if self.out_of_stack(expr.span()) {
            return;
        }
        match expr {
            Expr::Literal(_) | Expr::Ident(_) => {}
            Expr::Function(func) => self.check_function(func),
            Expr::Binary(e) => {
                self.check_expr(e.left);
                self.check_expr(e.right);
            }
            Expr::Unary(e) => self.check_expr(e.operand),
            Expr::Postfix(e) => self.check_expr(e.operand),
            Expr::Assign(e) => {
                self.check_expr(e.target);
                self.check_expr(e.value);
            }
            Expr::Conditional(e) => {
                self.check_expr(e.test);
                self.check_expr(e.then_expr);
                self.check_expr(e.else_expr);
            }
            Expr::Call(e) => {
                self.check_expr(e.callee);
                e.args.iter().for_each(|arg| self.check_expr(arg));
            }
            Expr::New(e) => {
                self.check_expr(e.callee);
                e.args.iter().for_each(|arg| self.check_expr(arg));
            }
            Expr::Member(e) => self.check_expr(e.object),
            Expr::Index(e) => {
                self.check_expr(e.object);
                self.check_expr(e.index);
            }
            Expr::Object(e) => e.properties.iter().for_each(|p| self.check_expr(p.value)),
            Expr::Sequence(e) => e.exprs.iter().for_each(|x| self.check_expr(x)),
        }
    }

    /// Record a declaration, reporting a clash with a lexical binding.
    fn declare(&mut self, name: &'ast str, kind: DeclKind, span: Span) {
        let index = if kind.is_block_scoped() {
            self.scopes.len() - 1
        } else {
            self.scopes.iter().rposition(|s| s.is_function).unwrap_or(0)
        };

        if let Some(&existing) = self.scopes[index].names.get(name) {
            if existing.is_block_scoped() || kind.is_block_scoped() {
                let message = if existing == DeclKind::Const || kind == DeclKind::Const {
                    format!("TypeError: redeclaration of const {}.", name)
                } else {
                    format!("TypeError: redeclaration of variable {}.", name)
                };
                self.findings.push(Finding::error(span, message));
                return;
            }
        }
        self.scopes[index].names.insert(name, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use ecma_parser::Parser;

    fn findings(source: &str, features: ContextFeatures) -> Vec<Finding> {
        let arena = Bump::new();
        let script = Parser::parse(source, &arena).unwrap();
        check_script(&script, features)
    }

    fn messages(source: &str) -> Vec<String> {
        findings(source, ContextFeatures::default())
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    #[test]
    fn const_redeclaration_is_type_error() {
        assert_eq!(messages("const x = 1; var x = 2;"), ["TypeError: redeclaration of const x."]);
        assert_eq!(messages("let y; const y = 1;"), ["TypeError: redeclaration of const y."]);
        assert_eq!(messages("let z; let z;"), ["TypeError: redeclaration of variable z."]);
    }

    #[test]
    fn var_redeclaration_is_allowed() {
        assert!(messages("var a = 1; var a = 2; function a() {}").is_empty());
    }

    #[test]
    fn block_scopes_are_separate() {
        assert!(messages("let a = 1; { let a = 2; }").is_empty());
        assert!(messages("const f = 1; function g() { const f = 2; }").is_empty());
        assert_eq!(
            messages("function g(p) { let p; }"),
            ["TypeError: redeclaration of variable p."]
        );
    }

    #[test]
    fn var_in_block_clashes_with_function_level_let() {
        assert_eq!(messages("let v; { var v; }"), ["TypeError: redeclaration of variable v."]);
    }

    #[test]
    fn finding_points_at_second_declaration() {
        let found = findings("const x = 1;\nvar x;", ContextFeatures::default());
        assert_eq!(found[0].span.line, 2);
        assert_eq!(found[0].severity, Severity::Error);
    }

    #[test]
    fn spent_stack_budget_stops_the_walk_with_one_error() {
        let arena = Bump::new();
        let script = Parser::parse("let a; let a; function f() { g(); }", &arena).unwrap();
        let mut checker = Checker {
            features: ContextFeatures::default(),
            scopes: vec![Scope::default()],
            function_depth: 0,
            findings: Vec::new(),
            stack: StackGuard::anchor(0),
            too_deep: false,
        };
        checker.check_stmts(script.stmts());
        assert_eq!(checker.findings.len(), 1);
        assert_eq!(checker.findings[0].severity, Severity::Error);
        assert_eq!(checker.findings[0].message, TOO_DEEP_NESTING);
        assert_eq!(checker.findings[0].span.line, 1);
    }

    #[test]
    fn side_effect_warning_only_in_strict_functions() {
        let source = "1 + 2;\nfunction f(a) { a; a(); }";
        assert!(findings(source, ContextFeatures::default()).is_empty());

        let strict = findings(source, ContextFeatures::STRICT_WARNINGS);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].severity, Severity::Warning);
        assert_eq!(strict[0].message, NO_SIDE_EFFECTS);
        assert_eq!(strict[0].span.line, 2);
    }
}
