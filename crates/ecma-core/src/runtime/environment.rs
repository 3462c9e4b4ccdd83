//! Lexical environments.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::value::Value;

/// How a binding was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Var,
    Let,
    Const,
    /// Function declarations and parameters.
    Function,
}

/// What kind of construct created a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

/// Why an assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    NotDefined,
    Const,
}

/// One scope in the environment chain.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<FxHashMap<Rc<str>, Binding>>,
    parent: Option<EnvRef>,
    kind: ScopeKind,
}

pub type EnvRef = Rc<Environment>;

impl Environment {
    pub fn new_global() -> EnvRef {
        Rc::new(Self {
            bindings: RefCell::new(FxHashMap::default()),
            parent: None,
            kind: ScopeKind::Global,
        })
    }

    /// A child scope of `parent`.
    pub fn child(parent: &EnvRef, kind: ScopeKind) -> EnvRef {
        Rc::new(Self {
            bindings: RefCell::new(FxHashMap::default()),
            parent: Some(parent.clone()),
            kind,
        })
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&EnvRef> {
        self.parent.as_ref()
    }

    /// Create or overwrite a binding in this scope.
    ///
    /// Re-declaring a `var` that already exists keeps its current value, so
    /// hoisting followed by the declaration statement does not reset it.
    pub fn declare(&self, name: &str, value: Value, mutability: Mutability) {
        let mut bindings = self.bindings.borrow_mut();
        if mutability == Mutability::Var {
            if let Some(existing) = bindings.get(name) {
                if existing.mutability == Mutability::Var && value.is_undefined() {
                    return;
                }
            }
        }
        bindings.insert(Rc::from(name), Binding { value, mutability });
    }

    /// Whether `name` is bound directly in this scope.
    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Resolve `name` through the chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.bindings.borrow().get(name) {
            return Some(binding.value.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Assign to an existing binding found through the chain.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        {
            let mut bindings = self.bindings.borrow_mut();
            if let Some(binding) = bindings.get_mut(name) {
                if binding.mutability == Mutability::Const {
                    return Err(AssignError::Const);
                }
                binding.value = value;
                return Ok(());
            }
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(AssignError::NotDefined),
        }
    }

    /// The nearest enclosing scope that `var` declarations land in.
    pub fn function_scope(self: &Rc<Self>) -> EnvRef {
        let mut env = self.clone();
        while env.kind == ScopeKind::Block {
            match env.parent.clone() {
                Some(parent) => env = parent,
                None => break,
            }
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parents() {
        let global = Environment::new_global();
        global.declare("a", Value::Number(1.0), Mutability::Var);
        let block = Environment::child(&global, ScopeKind::Block);
        block.declare("b", Value::Number(2.0), Mutability::Let);

        assert_eq!(block.lookup("a").map(|v| v.to_number()), Some(1.0));
        assert_eq!(block.lookup("b").map(|v| v.to_number()), Some(2.0));
        assert!(global.lookup("b").is_none());
    }

    #[test]
    fn assign_respects_const() {
        let global = Environment::new_global();
        global.declare("c", Value::Number(1.0), Mutability::Const);
        assert_eq!(global.assign("c", Value::Null), Err(AssignError::Const));
        assert_eq!(global.assign("missing", Value::Null), Err(AssignError::NotDefined));
    }

    #[test]
    fn var_redeclaration_keeps_value() {
        let global = Environment::new_global();
        global.declare("x", Value::Number(5.0), Mutability::Var);
        global.declare("x", Value::Undefined, Mutability::Var);
        assert_eq!(global.lookup("x").map(|v| v.to_number()), Some(5.0));
    }

    #[test]
    fn function_scope_skips_blocks() {
        let global = Environment::new_global();
        let func = Environment::child(&global, ScopeKind::Function);
        let block = Environment::child(&func, ScopeKind::Block);
        let inner = Environment::child(&block, ScopeKind::Block);
        assert!(Rc::ptr_eq(&inner.function_scope(), &func));
        assert!(Rc::ptr_eq(&global.function_scope(), &global));
    }
}
