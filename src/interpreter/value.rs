//! Runtime value model: a tagged union inspected by every operator.
//!
//! Aggregates and objects are reference values (`Rc`), so lists, dicts, and
//! instances observe shared mutation; scalars copy.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expression, Statement};
use crate::builtins::Builtin;

use super::env::EnvRef;

/// A user function or method: declared parameters, body, and the environment
/// in effect at its definition (lexical closure).
#[derive(Debug)]
pub(crate) struct FunctionValue {
    pub(crate) name: String,
    pub(crate) params: Vec<String>,
    pub(crate) body: Vec<Statement>,
    pub(crate) env: EnvRef,
}

/// A `lambda(params) -> expr` closure.
#[derive(Debug)]
pub(crate) struct LambdaValue {
    pub(crate) params: Vec<String>,
    pub(crate) body: Expression,
    pub(crate) env: EnvRef,
}

#[derive(Debug)]
pub(crate) struct ClassValue {
    pub(crate) name: String,
    pub(crate) parent: Option<Rc<ClassValue>>,
    pub(crate) methods: HashMap<String, Rc<FunctionValue>>,
}

impl ClassValue {
    /// Walk the class chain parent-ward; returns the method together with the
    /// class that defines it (needed to resolve `upar` from inside the body).
    pub(crate) fn resolve_method(
        class: &Rc<ClassValue>,
        name: &str,
    ) -> Option<(Rc<FunctionValue>, Rc<ClassValue>)> {
        let mut current = Some(Rc::clone(class));
        while let Some(class) = current {
            if let Some(method) = class.methods.get(name) {
                return Some((Rc::clone(method), Rc::clone(&class)));
            }
            current = class.parent.clone();
        }
        None
    }
}

/// Fields are created on first assignment.
#[derive(Debug)]
pub(crate) struct InstanceValue {
    pub(crate) class: Rc<ClassValue>,
    pub(crate) fields: RefCell<HashMap<String, Value>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Khaali,
    List(Rc<RefCell<Vec<Value>>>),
    /// Insertion-ordered association list; keys compare by value.
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    Builtin(Builtin),
    Function(Rc<FunctionValue>),
    Lambda(Rc<LambdaValue>),
    Class(Rc<ClassValue>),
    Instance(Rc<InstanceValue>),
    BoundMethod {
        instance: Rc<InstanceValue>,
        method: Rc<FunctionValue>,
        defined_on: Rc<ClassValue>,
    },
}

impl Value {
    pub(crate) fn list(values: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(values)))
    }

    pub(crate) fn dict(pairs: Vec<(Value, Value)>) -> Self {
        Value::Dict(Rc::new(RefCell::new(pairs)))
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Khaali => "none",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Builtin(_) | Value::Function(_) => "function",
            Value::Lambda(_) => "lambda",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::BoundMethod { .. } => "method",
        }
    }

    /// Standard truthiness: 0, "", empty list/dict, khaali, and jhoot are
    /// falsy; everything else is truthy.
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::Bool(value) => *value,
            Value::Khaali => false,
            Value::List(values) => !values.borrow().is_empty(),
            Value::Dict(pairs) => !pairs.borrow().is_empty(),
            Value::Builtin(_)
            | Value::Function(_)
            | Value::Lambda(_)
            | Value::Class(_)
            | Value::Instance(_)
            | Value::BoundMethod { .. } => true,
        }
    }

    pub(crate) fn to_output(&self) -> String {
        match self {
            Value::Int(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Str(value) => value.clone(),
            Value::Bool(value) => if *value { "sach" } else { "jhoot" }.to_string(),
            Value::Khaali => "khaali".to_string(),
            Value::List(values) => {
                let rendered = values
                    .borrow()
                    .iter()
                    .map(Value::to_output)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{rendered}]")
            }
            Value::Dict(pairs) => {
                let rendered = pairs
                    .borrow()
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.to_output(), value.to_output()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{rendered}}}")
            }
            Value::Builtin(builtin) => format!("<builtin {}>", builtin.name()),
            Value::Function(function) => format!("<kaam {}>", function.name),
            Value::Lambda(_) => "<lambda>".to_string(),
            Value::Class(class) => format!("<class {}>", class.name),
            Value::Instance(instance) => format!("<{} instance>", instance.class.name),
            Value::BoundMethod { method, .. } => format!("<method {}>", method.name),
        }
    }

    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

/// Structural equality for `==`/`!=`. Numbers compare across Int/Float;
/// aggregates compare element-wise; functions, classes, and instances compare
/// by identity. Values of unrelated types are simply unequal.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Khaali, Value::Khaali) => true,
        (Value::List(a), Value::List(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let a = a.borrow();
            let b = b.borrow();
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Dict(a), Value::Dict(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let a = a.borrow();
            let b = b.borrow();
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    b.iter()
                        .any(|(other_key, other_value)| {
                            values_equal(key, other_key) && values_equal(value, other_value)
                        })
                })
        }
        (Value::Builtin(a), Value::Builtin(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_emptiness() {
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Khaali.is_truthy());
        assert!(!Value::list(vec![]).is_truthy());
        assert!(Value::list(vec![Value::Int(1)]).is_truthy());
        assert!(!Value::dict(vec![]).is_truthy());
    }

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert!(values_equal(&Value::Int(3), &Value::Float(3.0)));
        assert!(!values_equal(&Value::Int(3), &Value::Float(3.5)));
        assert!(!values_equal(&Value::Int(3), &Value::Str("3".to_string())));
    }

    #[test]
    fn lists_compare_element_wise() {
        let a = Value::list(vec![Value::Int(1), Value::Str("x".to_string())]);
        let b = Value::list(vec![Value::Int(1), Value::Str("x".to_string())]);
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn output_renders_source_level_spellings() {
        assert_eq!(Value::Bool(true).to_output(), "sach");
        assert_eq!(Value::Khaali.to_output(), "khaali");
        assert_eq!(
            Value::list(vec![Value::Int(1), Value::Int(2)]).to_output(),
            "[1, 2]"
        );
    }
}
