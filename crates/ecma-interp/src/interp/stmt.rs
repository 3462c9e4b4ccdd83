//! Statement execution.

use ecma_core::runtime::{EnvRef, Environment, Mutability, ScopeKind};
use ecma_core::{FrameState, NativeException, Value, run_try};
use ecma_parser::ast::{
    Block, CatchClause, DeclKind, DoWhileStmt, ForInit, ForStmt, IfStmt, Stmt, TryStmt, VarDeclStmt,
    WhileStmt,
};

use super::{Completion, ExecResult, Interpreter, UnitRef};

/// What a loop does after its body completed.
enum LoopControl {
    Next,
    Exit(Completion),
}

fn loop_control(completion: Completion) -> LoopControl {
    match completion {
        Completion::Normal | Completion::Continue => LoopControl::Next,
        Completion::Break => LoopControl::Exit(Completion::Normal),
        other => LoopControl::Exit(other),
    }
}

impl<'ast> Interpreter<'ast> {
    pub(super) fn exec_stmts(
        &mut self,
        stmts: &'ast [Stmt<'ast>],
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        for stmt in stmts {
            let completion = self.exec_stmt(stmt, env, unit)?;
            if !matches!(completion, Completion::Normal) {
                return Ok(completion);
            }
        }
        Ok(Completion::Normal)
    }

    /// Execute a statement.
    pub(super) fn exec_stmt(
        &mut self,
        stmt: &'ast Stmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        self.stack.check_native(|| unit.record(stmt.span(), ""))?;
        match stmt {
            Stmt::Expr(expr_stmt) => {
                if let Some(expr) = expr_stmt.expr {
                    self.last_value = self.eval_expr(expr, env, unit)?;
                }
                Ok(Completion::Normal)
            }
            Stmt::VarDecl(decl) => {
                self.exec_var_decl(decl, env, unit)?;
                Ok(Completion::Normal)
            }
            // Bound when the enclosing statement list was entered.
            Stmt::Function(_) => Ok(Completion::Normal),
            Stmt::Return(ret) => {
                let value = match ret.value {
                    Some(expr) => self.eval_expr(expr, env, unit)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Stmt::Break(_) => Ok(Completion::Break),
            Stmt::Continue(_) => Ok(Completion::Continue),
            Stmt::Throw(throw) => {
                let value = self.eval_expr(throw.value, env, unit)?;
                Err(self.throw_value(value, unit, throw.span))
            }
            Stmt::Block(block) => self.exec_block(block, env, unit),
            Stmt::If(if_stmt) => self.exec_if(if_stmt, env, unit),
            Stmt::While(while_stmt) => self.exec_while(while_stmt, env, unit),
            Stmt::DoWhile(do_while) => self.exec_do_while(do_while, env, unit),
            Stmt::For(for_stmt) => self.exec_for(for_stmt, env, unit),
            Stmt::Try(try_stmt) => self.exec_try(try_stmt, env, unit),
        }
    }

    fn exec_var_decl(
        &mut self,
        decl: &'ast VarDeclStmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> Result<(), NativeException> {
        for var in decl.vars {
            match decl.kind {
                DeclKind::Var => {
                    // Already hoisted; only an initializer does anything.
                    if let Some(init) = var.init {
                        let value = self.eval_expr(init, env, unit)?;
                        self.assign_binding(var.name.name, value, env, unit, var.span)?;
                    }
                }
                DeclKind::Let | DeclKind::Const => {
                    let value = match var.init {
                        Some(init) => self.eval_expr(init, env, unit)?,
                        None => Value::Undefined,
                    };
                    let mutability = if decl.kind == DeclKind::Const {
                        Mutability::Const
                    } else {
                        Mutability::Let
                    };
                    env.declare(var.name.name, value, mutability);
                }
            }
        }
        Ok(())
    }

    pub(super) fn exec_block(
        &mut self,
        block: &'ast Block<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        let block_env = Environment::child(env, ScopeKind::Block);
        self.hoist_functions(block.stmts, &block_env, unit);
        self.exec_stmts(block.stmts, &block_env, unit)
    }

    fn exec_if(
        &mut self,
        stmt: &'ast IfStmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        if self.eval_expr(stmt.condition, env, unit)?.truthy() {
            self.exec_stmt(stmt.then_stmt, env, unit)
        } else if let Some(else_stmt) = stmt.else_stmt {
            self.exec_stmt(else_stmt, env, unit)
        } else {
            Ok(Completion::Normal)
        }
    }

    // =========================================
    // Loops
    // =========================================

    fn exec_while(
        &mut self,
        stmt: &'ast WhileStmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        loop {
            self.check_interrupt(unit, stmt.span)?;
            if !self.eval_expr(stmt.condition, env, unit)?.truthy() {
                return Ok(Completion::Normal);
            }
            let body = self.exec_stmt(stmt.body, env, unit)?;
            if let LoopControl::Exit(completion) = loop_control(body) {
                return Ok(completion);
            }
        }
    }

    fn exec_do_while(
        &mut self,
        stmt: &'ast DoWhileStmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        loop {
            self.check_interrupt(unit, stmt.span)?;
            let body = self.exec_stmt(stmt.body, env, unit)?;
            if let LoopControl::Exit(completion) = loop_control(body) {
                return Ok(completion);
            }
            if !self.eval_expr(stmt.condition, env, unit)?.truthy() {
                return Ok(Completion::Normal);
            }
        }
    }

    fn exec_for(
        &mut self,
        stmt: &'ast ForStmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        let loop_env = Environment::child(env, ScopeKind::Block);
        match &stmt.init {
            Some(ForInit::VarDecl(decl)) => self.exec_var_decl(decl, &loop_env, unit)?,
            Some(ForInit::Expr(expr)) => {
                self.eval_expr(expr, &loop_env, unit)?;
            }
            None => {}
        }

        loop {
            self.check_interrupt(unit, stmt.span)?;
            if let Some(condition) = stmt.condition {
                if !self.eval_expr(condition, &loop_env, unit)?.truthy() {
                    return Ok(Completion::Normal);
                }
            }
            let body = self.exec_stmt(stmt.body, &loop_env, unit)?;
            if let LoopControl::Exit(completion) = loop_control(body) {
                return Ok(completion);
            }
            if let Some(update) = stmt.update {
                self.eval_expr(update, &loop_env, unit)?;
            }
        }
    }

    // =========================================
    // Exceptions
    // =========================================

    fn exec_try(
        &mut self,
        stmt: &'ast TryStmt<'ast>,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        let handler = stmt.catch.as_ref().map(|clause| {
            move |interp: &mut Self, e: NativeException| interp.exec_catch(clause, e, env, unit)
        });
        let finalizer = stmt
            .finally
            .as_ref()
            .map(|block| move |interp: &mut Self| interp.exec_block(block, env, unit));

        let body = |interp: &mut Self| interp.exec_block(&stmt.block, env, unit);
        run_try(self, body, handler, finalizer)
    }

    fn exec_catch(
        &mut self,
        clause: &'ast CatchClause<'ast>,
        exception: NativeException,
        env: &EnvRef,
        unit: &UnitRef<'ast>,
    ) -> ExecResult {
        self.stack.set_state(FrameState::Handled);
        let catch_env = Environment::child(env, ScopeKind::Block);
        if let Some(param) = clause.param {
            catch_env.declare(param.name, exception.payload().clone(), Mutability::Let);
        }

        self.handled.push(exception);
        let result = self.exec_block(&clause.body, &catch_env, unit);
        self.handled.pop();
        self.stack.set_state(FrameState::Running);
        result
    }

    /// The exception raised by `throw value`.
    ///
    /// Throwing the object bound by an enclosing `catch` re-raises that
    /// exception with its original record. Primitives carry no identity, so
    /// throwing an equal primitive is a new throw.
    pub(super) fn throw_value(
        &self,
        value: Value,
        unit: &UnitRef<'ast>,
        span: ecma_core::Span,
    ) -> NativeException {
        let previous = value.as_object().and_then(|thrown| {
            self.handled
                .iter()
                .rev()
                .find(|e| e.payload().as_object().is_some_and(|caught| caught.ptr_eq(thrown)))
        });
        if let Some(previous) = previous {
            log::trace!("rethrow of {}", previous);
            return NativeException::rethrown(value, previous);
        }
        NativeException::thrown(value, &unit.record(span, ""))
    }
}
