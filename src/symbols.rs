//! Compile-time symbol table: a stack of hash maps, one per lexical scope.
//!
//! Resolution walks outward through enclosing scopes; shadowing across scopes
//! is legal, re-declaration inside one scope is the analyzer's job to reject.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Class,
}

/// Coarse inferred type tags. These are not full types; `Any` means the
/// analysis abstains and downstream checks are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Number,
    Str,
    Bool,
    List,
    Dict,
    Func,
    Class,
    None,
    Any,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Number => "number",
            TypeTag::Str => "string",
            TypeTag::Bool => "bool",
            TypeTag::List => "list",
            TypeTag::Dict => "dict",
            TypeTag::Func => "function",
            TypeTag::Class => "class",
            TypeTag::None => "none",
            TypeTag::Any => "any",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub inferred_type: TypeTag,
    /// Source line of the first declaration.
    pub line: usize,
    /// For functions: declared parameter count, `None` when variadic (arity
    /// checking is bypassed). `None` for every other kind.
    pub param_count: Option<usize>,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, inferred_type: TypeTag, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            inferred_type,
            line,
            param_count: None,
        }
    }

    pub fn parameter(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            inferred_type: TypeTag::Any,
            line,
            param_count: None,
        }
    }

    pub fn function(name: impl Into<String>, param_count: Option<usize>, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
            inferred_type: TypeTag::Func,
            line,
            param_count,
        }
    }

    pub fn class(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Class,
            inferred_type: TypeTag::Class,
            line,
            param_count: None,
        }
    }
}

/// Scope stack. The bottom entry is the global scope and is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Panics when called on the global scope; enter/exit must stay balanced
    /// along every visitor path.
    pub fn exit_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot exit the global scope");
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Add to the innermost scope, replacing any same-name entry there.
    pub fn define(&mut self, symbol: Symbol) {
        let scope = self
            .scopes
            .last_mut()
            .expect("symbol table always has a global scope");
        scope.insert(symbol.name.clone(), symbol);
    }

    /// Look up through this scope and all enclosing ones.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Look up in the innermost scope only. Used to tell re-declaration apart
    /// from legitimate shadowing.
    pub fn resolve_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .last()
            .expect("symbol table always has a global scope")
            .get(name)
    }

    /// Every name visible from the current scope, for "did you mean?"
    /// suggestions.
    pub fn visible_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for scope in self.scopes.iter().rev() {
            names.extend(scope.keys().cloned());
        }
        names
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_parent_scopes() {
        let mut table = SymbolTable::new();
        table.define(Symbol::variable("x", TypeTag::Number, 1));
        table.enter_scope();
        table.define(Symbol::parameter("y", 3));

        assert_eq!(table.resolve("x").map(|s| s.kind), Some(SymbolKind::Variable));
        assert_eq!(
            table.resolve("y").map(|s| s.kind),
            Some(SymbolKind::Parameter)
        );
        assert!(table.resolve("z").is_none());
    }

    #[test]
    fn resolve_local_ignores_outer_scopes() {
        let mut table = SymbolTable::new();
        table.define(Symbol::variable("x", TypeTag::Number, 1));
        table.enter_scope();

        assert!(table.resolve_local("x").is_none());
        assert!(table.resolve("x").is_some());

        table.define(Symbol::variable("x", TypeTag::Str, 2));
        assert_eq!(
            table.resolve_local("x").map(|s| s.inferred_type),
            Some(TypeTag::Str)
        );

        table.exit_scope();
        assert_eq!(
            table.resolve("x").map(|s| s.inferred_type),
            Some(TypeTag::Number)
        );
    }

    #[test]
    #[should_panic(expected = "cannot exit the global scope")]
    fn exiting_the_global_scope_panics() {
        SymbolTable::new().exit_scope();
    }
}
