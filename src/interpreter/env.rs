//! Chained runtime environment.
//!
//! Each block, function body, and catch clause pushes one child scope;
//! resolution and assignment walk the parent chain. Environments are shared
//! (`Rc<RefCell<_>>`) because closures capture the scope they were defined in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

pub(crate) type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub(crate) struct Environment {
    values: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub(crate) fn root() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub(crate) fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Bind in this scope, shadowing any outer binding of the same name.
    pub(crate) fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Walk the chain outward and return the nearest binding.
    pub(crate) fn get(env: &EnvRef, name: &str) -> Option<Value> {
        let mut current = Some(Rc::clone(env));
        while let Some(scope) = current {
            let scope = scope.borrow();
            if let Some(value) = scope.values.get(name) {
                return Some(value.clone());
            }
            current = scope.parent.clone();
        }
        None
    }

    /// Overwrite the nearest binding. Returns false when no scope in the
    /// chain defines the name.
    pub(crate) fn assign(env: &EnvRef, name: &str, value: Value) -> bool {
        let mut current = Some(Rc::clone(env));
        while let Some(scope) = current {
            let mut scope = scope.borrow_mut();
            if let Some(slot) = scope.values.get_mut(name) {
                *slot = value;
                return true;
            }
            current = scope.parent.clone();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scopes_shadow_and_unwind() {
        let root = Environment::root();
        root.borrow_mut().define("x", Value::Int(10));

        let inner = Environment::child(&root);
        inner.borrow_mut().define("x", Value::Int(15));
        assert_eq!(Environment::get(&inner, "x"), Some(Value::Int(15)));
        assert_eq!(Environment::get(&root, "x"), Some(Value::Int(10)));
    }

    #[test]
    fn assignment_targets_the_nearest_defining_scope() {
        let root = Environment::root();
        root.borrow_mut().define("x", Value::Int(1));
        let inner = Environment::child(&root);

        assert!(Environment::assign(&inner, "x", Value::Int(2)));
        assert_eq!(Environment::get(&root, "x"), Some(Value::Int(2)));
        assert!(!Environment::assign(&inner, "missing", Value::Khaali));
    }
}
