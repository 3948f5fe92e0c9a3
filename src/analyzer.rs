//! Semantic analysis: scope resolution, arity checks, statement-context
//! checks, and best-effort type inference over the AST.
//!
//! The walk never aborts: every finding is recorded and the full list is
//! returned, so one run reports everything. The interpreter only runs when
//! this list comes back empty.

use thiserror::Error;

use crate::ast::{
    BinaryOperator, Expression, FunctionDef, Program, Statement, UnaryOperator,
};
use crate::builtins::Builtin;
use crate::symbols::{Symbol, SymbolKind, SymbolTable, TypeTag};

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    #[error("Undefined name '{name}'{}", suggestion_suffix(.suggestions))]
    UndefinedName {
        name: String,
        suggestions: Vec<String>,
        line: usize,
    },
    #[error("'{name}' is already defined in this scope (first defined on line {original_line})")]
    Redefinition {
        name: String,
        original_line: usize,
        line: usize,
    },
    #[error("Operator '{op}' is not valid for {left} and {right}")]
    InvalidOperation {
        op: &'static str,
        left: TypeTag,
        right: TypeTag,
        line: usize,
    },
    #[error("Unary operator '{op}' is not valid for {operand}")]
    InvalidUnary {
        op: &'static str,
        operand: TypeTag,
        line: usize,
    },
    #[error("Function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        line: usize,
    },
    #[error("Parent of class '{class_name}' must be a class, but '{parent}' is not")]
    ParentNotClass {
        class_name: String,
        parent: String,
        line: usize,
    },
    #[error("'ruk' (break) used outside a loop")]
    BreakOutsideLoop { line: usize },
    #[error("'age_badho' (continue) used outside a loop")]
    ContinueOutsideLoop { line: usize },
    #[error("'wapas' (return) used outside a function")]
    ReturnOutsideFunction { line: usize },
    #[error("'yeh' (this) used outside a class method")]
    ThisOutsideClass { line: usize },
    #[error("'upar' (super) used outside a class method")]
    SuperOutsideClass { line: usize },
}

impl SemanticError {
    pub fn line(&self) -> usize {
        match self {
            SemanticError::UndefinedName { line, .. }
            | SemanticError::Redefinition { line, .. }
            | SemanticError::InvalidOperation { line, .. }
            | SemanticError::InvalidUnary { line, .. }
            | SemanticError::ArityMismatch { line, .. }
            | SemanticError::ParentNotClass { line, .. }
            | SemanticError::BreakOutsideLoop { line }
            | SemanticError::ContinueOutsideLoop { line }
            | SemanticError::ReturnOutsideFunction { line }
            | SemanticError::ThisOutsideClass { line }
            | SemanticError::SuperOutsideClass { line } => *line,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            SemanticError::UndefinedName { .. } => "UndefinedNameError",
            SemanticError::Redefinition { .. } => "RedefinitionError",
            SemanticError::InvalidOperation { .. } | SemanticError::InvalidUnary { .. } => {
                "TypeCheckError"
            }
            _ => "SemanticError",
        }
    }

    pub(crate) fn hindi_message(&self) -> String {
        match self {
            SemanticError::UndefinedName { name, .. } => format!("अपरिभाषित नाम '{name}'"),
            SemanticError::Redefinition { name, original_line, .. } => format!(
                "'{name}' इस दायरे में पहले से परिभाषित है (पंक्ति {original_line} पर)"
            ),
            SemanticError::InvalidOperation { op, left, right, .. } => {
                format!("'{op}' {left} और {right} के लिए मान्य नहीं है")
            }
            SemanticError::InvalidUnary { op, operand, .. } => {
                format!("'{op}' {operand} के लिए मान्य नहीं है")
            }
            SemanticError::ArityMismatch { name, expected, found, .. } => format!(
                "फंक्शन '{name}' को {expected} तर्क(ों) की ज़रूरत है, मिले {found}"
            ),
            SemanticError::ParentNotClass { parent, .. } => {
                format!("'{parent}' एक क्लास नहीं है")
            }
            SemanticError::BreakOutsideLoop { .. } => {
                "'ruk' (ब्रेक) लूप के बाहर उपयोग किया गया".to_string()
            }
            SemanticError::ContinueOutsideLoop { .. } => {
                "'age_badho' लूप के बाहर उपयोग किया गया".to_string()
            }
            SemanticError::ReturnOutsideFunction { .. } => {
                "'wapas' (रिटर्न) फंक्शन के बाहर उपयोग किया गया".to_string()
            }
            SemanticError::ThisOutsideClass { .. } => {
                "'yeh' क्लास मेथड के बाहर उपयोग किया गया".to_string()
            }
            SemanticError::SuperOutsideClass { .. } => {
                "'upar' क्लास मेथड के बाहर उपयोग किया गया".to_string()
            }
        }
    }
}

pub struct SemanticAnalyzer {
    errors: Vec<SemanticError>,
    scope: SymbolTable,
    loop_depth: usize,
    function_depth: usize,
    class_depth: usize,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            scope: SymbolTable::new(),
            loop_depth: 0,
            function_depth: 0,
            class_depth: 0,
        }
    }

    /// Run the full pass and return every error found. State is reset first,
    /// so repeated calls on the same tree return the same list.
    pub fn analyze(&mut self, program: &Program) -> Vec<SemanticError> {
        self.errors.clear();
        self.scope = SymbolTable::new();
        self.loop_depth = 0;
        self.function_depth = 0;
        self.class_depth = 0;
        self.register_builtins();

        for statement in &program.statements {
            self.visit_statement(statement);
        }
        self.errors.clone()
    }

    fn register_builtins(&mut self) {
        for builtin in Builtin::ALL {
            self.scope
                .define(Symbol::function(builtin.name(), builtin.arity(), 0));
        }
    }

    fn error(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VarDecl { name, value, line } => {
                let value_type = self.visit_expression(value);
                if let Some(existing) = self.scope.resolve_local(name) {
                    let original_line = existing.line;
                    self.error(SemanticError::Redefinition {
                        name: name.clone(),
                        original_line,
                        line: *line,
                    });
                } else {
                    self.scope.define(Symbol::variable(name, value_type, *line));
                }
            }
            Statement::Assign { name, value, line } => {
                let value_type = self.visit_expression(value);
                // Assignment to an unseen name declares it; re-assignment is
                // always legal and refreshes nothing (tags are first-write).
                if self.scope.resolve(name).is_none() {
                    self.scope.define(Symbol::variable(name, value_type, *line));
                }
            }
            Statement::IndexAssign {
                target,
                index,
                value,
                ..
            } => {
                self.visit_expression(target);
                self.visit_expression(index);
                self.visit_expression(value);
            }
            Statement::PropertyAssign { target, value, .. } => {
                self.visit_expression(target);
                self.visit_expression(value);
            }
            Statement::If {
                condition,
                then_body,
                elif_branches,
                else_body,
                ..
            } => {
                self.visit_expression(condition);
                self.visit_scoped_block(then_body);
                for (elif_condition, elif_body) in elif_branches {
                    self.visit_expression(elif_condition);
                    self.visit_scoped_block(elif_body);
                }
                if let Some(else_body) = else_body {
                    self.visit_scoped_block(else_body);
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                self.visit_expression(condition);
                self.loop_depth += 1;
                self.visit_scoped_block(body);
                self.loop_depth -= 1;
            }
            Statement::ForEach {
                variable,
                iterable,
                body,
                line,
            } => {
                self.visit_expression(iterable);
                self.loop_depth += 1;
                self.scope.enter_scope();
                self.scope
                    .define(Symbol::variable(variable, TypeTag::Any, *line));
                for statement in body {
                    self.visit_statement(statement);
                }
                self.scope.exit_scope();
                self.loop_depth -= 1;
            }
            Statement::Break { line } => {
                if self.loop_depth == 0 {
                    self.error(SemanticError::BreakOutsideLoop { line: *line });
                }
            }
            Statement::Continue { line } => {
                if self.loop_depth == 0 {
                    self.error(SemanticError::ContinueOutsideLoop { line: *line });
                }
            }
            Statement::FunctionDef(def) => {
                self.visit_function_def(def);
            }
            Statement::Return { value, line } => {
                if self.function_depth == 0 {
                    self.error(SemanticError::ReturnOutsideFunction { line: *line });
                }
                if let Some(value) = value {
                    self.visit_expression(value);
                }
            }
            Statement::ClassDef {
                name,
                parent,
                methods,
                line,
            } => {
                if let Some(existing) = self.scope.resolve_local(name) {
                    let original_line = existing.line;
                    self.error(SemanticError::Redefinition {
                        name: name.clone(),
                        original_line,
                        line: *line,
                    });
                } else {
                    self.scope.define(Symbol::class(name, *line));
                }

                if let Some(parent) = parent {
                    match self.scope.resolve(parent) {
                        None => {
                            let suggestions = self.similar_names(parent);
                            self.error(SemanticError::UndefinedName {
                                name: parent.clone(),
                                suggestions,
                                line: *line,
                            });
                        }
                        Some(symbol) if symbol.kind != SymbolKind::Class => {
                            self.error(SemanticError::ParentNotClass {
                                class_name: name.clone(),
                                parent: parent.clone(),
                                line: *line,
                            });
                        }
                        Some(_) => {}
                    }
                }

                self.class_depth += 1;
                self.scope.enter_scope();
                for method in methods {
                    self.visit_function_def(method);
                }
                self.scope.exit_scope();
                self.class_depth -= 1;
            }
            Statement::Try {
                body,
                catch_var,
                catch_body,
                finally_body,
                line,
            } => {
                self.visit_scoped_block(body);
                self.scope.enter_scope();
                self.scope
                    .define(Symbol::variable(catch_var, TypeTag::Any, *line));
                for statement in catch_body {
                    self.visit_statement(statement);
                }
                self.scope.exit_scope();
                if let Some(finally_body) = finally_body {
                    self.visit_scoped_block(finally_body);
                }
            }
            Statement::Throw { value, .. } => {
                self.visit_expression(value);
            }
            Statement::Print { args, .. } => {
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            Statement::Input { variable, line, .. } => {
                // poocho always produces a string.
                if self.scope.resolve_local(variable).is_none() {
                    self.scope
                        .define(Symbol::variable(variable, TypeTag::Str, *line));
                }
            }
            Statement::Import { .. } => {
                // Module resolution is deferred; nothing to check statically.
            }
            Statement::Block { body, .. } => {
                self.visit_scoped_block(body);
            }
            Statement::Expr(expr) => {
                self.visit_expression(expr);
            }
        }
    }

    fn visit_scoped_block(&mut self, body: &[Statement]) {
        self.scope.enter_scope();
        for statement in body {
            self.visit_statement(statement);
        }
        self.scope.exit_scope();
    }

    fn visit_function_def(&mut self, def: &FunctionDef) {
        if let Some(existing) = self.scope.resolve_local(&def.name) {
            let original_line = existing.line;
            self.error(SemanticError::Redefinition {
                name: def.name.clone(),
                original_line,
                line: def.line,
            });
        } else {
            self.scope
                .define(Symbol::function(&def.name, Some(def.params.len()), def.line));
        }

        self.function_depth += 1;
        self.scope.enter_scope();
        for param in &def.params {
            self.scope.define(Symbol::parameter(param, def.line));
        }
        for statement in &def.body {
            self.visit_statement(statement);
        }
        self.scope.exit_scope();
        self.function_depth -= 1;
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn visit_expression(&mut self, expr: &Expression) -> TypeTag {
        match expr {
            Expression::Number { .. } => TypeTag::Number,
            Expression::Str { .. } => TypeTag::Str,
            Expression::Boolean { .. } => TypeTag::Bool,
            Expression::Khaali { .. } => TypeTag::None,
            Expression::List { elements, .. } => {
                for element in elements {
                    self.visit_expression(element);
                }
                TypeTag::List
            }
            Expression::Dict { pairs, .. } => {
                for (key, value) in pairs {
                    self.visit_expression(key);
                    self.visit_expression(value);
                }
                TypeTag::Dict
            }
            Expression::Variable { name, line } => match self.scope.resolve(name) {
                Some(symbol) => symbol.inferred_type,
                None => {
                    let suggestions = self.similar_names(name);
                    self.error(SemanticError::UndefinedName {
                        name: name.clone(),
                        suggestions,
                        line: *line,
                    });
                    TypeTag::Any
                }
            },
            Expression::BinaryOp {
                op,
                left,
                right,
                line,
            } => {
                let left_type = self.visit_expression(left);
                let right_type = self.visit_expression(right);
                self.check_binary(*op, left_type, right_type, *line)
            }
            Expression::UnaryOp { op, operand, line } => {
                let operand_type = self.visit_expression(operand);
                self.check_unary(*op, operand_type, *line)
            }
            Expression::Parenthesized { inner, .. } => self.visit_expression(inner),
            Expression::Call { callee, args, line } => {
                self.visit_callee(callee, args.len(), *line);
                for arg in args {
                    self.visit_expression(arg);
                }
                TypeTag::Any
            }
            Expression::Lambda { params, body, line } => {
                self.function_depth += 1;
                self.scope.enter_scope();
                for param in params {
                    self.scope.define(Symbol::parameter(param, *line));
                }
                self.visit_expression(body);
                self.scope.exit_scope();
                self.function_depth -= 1;
                TypeTag::Func
            }
            Expression::NewObject {
                class_name,
                args,
                line,
            } => {
                if self.scope.resolve(class_name).is_none() {
                    let suggestions = self.similar_names(class_name);
                    self.error(SemanticError::UndefinedName {
                        name: class_name.clone(),
                        suggestions,
                        line: *line,
                    });
                }
                for arg in args {
                    self.visit_expression(arg);
                }
                TypeTag::Any
            }
            Expression::MethodCall { target, args, .. } => {
                self.visit_expression(target);
                for arg in args {
                    self.visit_expression(arg);
                }
                TypeTag::Any
            }
            Expression::PropertyAccess { target, .. } => {
                self.visit_expression(target);
                TypeTag::Any
            }
            Expression::Yeh { line } => {
                if self.class_depth == 0 {
                    self.error(SemanticError::ThisOutsideClass { line: *line });
                }
                TypeTag::Any
            }
            Expression::Super { args, line } => {
                if self.class_depth == 0 {
                    self.error(SemanticError::SuperOutsideClass { line: *line });
                }
                for arg in args {
                    self.visit_expression(arg);
                }
                TypeTag::Any
            }
            Expression::Index { target, index, .. } => {
                self.visit_expression(target);
                self.visit_expression(index);
                TypeTag::Any
            }
        }
    }

    /// Resolve a call target. Named callees get existence and (for functions
    /// with a known parameter count) arity checks; computed callees are left
    /// to the runtime.
    fn visit_callee(&mut self, callee: &Expression, arg_count: usize, line: usize) {
        let Expression::Variable { name, .. } = callee else {
            self.visit_expression(callee);
            return;
        };
        match self.scope.resolve(name) {
            None => {
                let suggestions = self.similar_names(name);
                self.error(SemanticError::UndefinedName {
                    name: name.clone(),
                    suggestions,
                    line,
                });
            }
            Some(symbol) => {
                if symbol.kind == SymbolKind::Function
                    && let Some(expected) = symbol.param_count
                    && expected != arg_count
                {
                    let name = name.clone();
                    self.error(SemanticError::ArityMismatch {
                        name,
                        expected,
                        found: arg_count,
                        line,
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Type rules
    // ------------------------------------------------------------------

    /// Best-effort binary type check. `Any` on either side turns the check
    /// off; the result tag is still inferred as precisely as possible.
    fn check_binary(
        &mut self,
        op: BinaryOperator,
        left: TypeTag,
        right: TypeTag,
        line: usize,
    ) -> TypeTag {
        let dynamic = left == TypeTag::Any || right == TypeTag::Any;

        if !dynamic {
            let valid = if op.is_arithmetic() {
                (left == TypeTag::Number && right == TypeTag::Number)
                    || (op == BinaryOperator::Add
                        && ((left == TypeTag::Str && right == TypeTag::Str)
                            || (left == TypeTag::List && right == TypeTag::List)))
            } else if op.is_comparison() {
                left == TypeTag::Number && right == TypeTag::Number
            } else {
                // Equality between any pair, and aur/ya on anything truthy.
                true
            };
            if !valid {
                self.error(SemanticError::InvalidOperation {
                    op: op.symbol(),
                    left,
                    right,
                    line,
                });
            }
        }

        if op.is_comparison() || op.is_equality() {
            return TypeTag::Bool;
        }
        if matches!(op, BinaryOperator::And | BinaryOperator::Or) {
            return TypeTag::Bool;
        }
        if left == TypeTag::Number && right == TypeTag::Number {
            return TypeTag::Number;
        }
        if op == BinaryOperator::Add {
            if left == TypeTag::Str && right == TypeTag::Str {
                return TypeTag::Str;
            }
            if left == TypeTag::List && right == TypeTag::List {
                return TypeTag::List;
            }
        }
        TypeTag::Any
    }

    fn check_unary(&mut self, op: UnaryOperator, operand: TypeTag, line: usize) -> TypeTag {
        if operand != TypeTag::Any {
            let valid = match op {
                UnaryOperator::Neg => operand == TypeTag::Number,
                UnaryOperator::Nahi => operand == TypeTag::Bool,
            };
            if !valid {
                self.error(SemanticError::InvalidUnary {
                    op: op.symbol(),
                    operand,
                    line,
                });
            }
        }
        match op {
            UnaryOperator::Neg => TypeTag::Number,
            UnaryOperator::Nahi => TypeTag::Bool,
        }
    }

    // ------------------------------------------------------------------
    // Suggestions
    // ------------------------------------------------------------------

    /// Up to three visible names close to `name` by edit distance.
    fn similar_names(&self, name: &str) -> Vec<String> {
        let mut candidates: Vec<(usize, String)> = Vec::new();
        for candidate in self.scope.visible_names() {
            if candidate == name {
                continue;
            }
            let distance = edit_distance(name, &candidate);
            let longest = name.chars().count().max(candidate.chars().count());
            if longest == 0 {
                continue;
            }
            // Similarity cutoff comparable to difflib's default of 0.6.
            if (distance as f64) / (longest as f64) <= 0.4 {
                candidates.push((distance, candidate));
            }
        }
        candidates.sort();
        candidates.dedup();
        candidates
            .into_iter()
            .take(3)
            .map(|(_, candidate)| candidate)
            .collect()
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Levenshtein distance over characters.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;

    fn analyze(source: &str) -> Vec<SemanticError> {
        let tokens = tokenize(source).expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        SemanticAnalyzer::new().analyze(&program)
    }

    #[test]
    fn clean_program_has_no_errors() {
        let errors = analyze(indoc! {"
            maan x = 10
            kaam add(a, b) { wapas a + b }
            likho(add(x, 5))
        "});
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn undefined_variable_is_reported_with_suggestions() {
        let errors = analyze("maan naam = 1\nlikho(nam)");
        assert_eq!(errors.len(), 1);
        let SemanticError::UndefinedName { name, suggestions, .. } = &errors[0] else {
            panic!("expected undefined name, got {:?}", errors[0]);
        };
        assert_eq!(name, "nam");
        assert!(suggestions.contains(&"naam".to_string()));
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error_but_shadowing_is_not() {
        let errors = analyze("maan x = 1\nmaan x = 2");
        assert!(matches!(errors[0], SemanticError::Redefinition { original_line: 1, line: 2, .. }));

        let errors = analyze("maan x = 1\n{ maan x = x + 5 }");
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn arity_mismatch_on_known_function() {
        let errors = analyze("kaam add(a, b) { wapas a + b }\nadd(1)");
        assert!(matches!(
            errors[0],
            SemanticError::ArityMismatch { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn variadic_likho_bypasses_arity_checking() {
        assert_eq!(analyze("likho(1, 2, 3, 4, 5)"), vec![]);
    }

    #[test]
    fn break_and_continue_need_a_loop() {
        let errors = analyze("ruk");
        assert!(matches!(errors[0], SemanticError::BreakOutsideLoop { .. }));
        let errors = analyze("age_badho");
        assert!(matches!(errors[0], SemanticError::ContinueOutsideLoop { .. }));
        assert_eq!(analyze("jab_tak jhoot { ruk }"), vec![]);
    }

    #[test]
    fn return_needs_a_function() {
        let errors = analyze("wapas 5");
        assert!(matches!(
            errors[0],
            SemanticError::ReturnOutsideFunction { .. }
        ));
    }

    #[test]
    fn yeh_needs_a_class_method() {
        let errors = analyze("kaam f() { likho(yeh) }");
        assert!(matches!(errors[0], SemanticError::ThisOutsideClass { .. }));
        assert_eq!(
            analyze("class A { kaam get() { wapas yeh } }"),
            vec![]
        );
    }

    #[test]
    fn string_minus_number_is_a_type_error() {
        let errors = analyze("maan x = \"hello\" - 5");
        assert!(matches!(
            errors[0],
            SemanticError::InvalidOperation { op: "-", left: TypeTag::Str, right: TypeTag::Number, .. }
        ));
    }

    #[test]
    fn string_concatenation_and_equality_are_fine() {
        assert_eq!(analyze("maan x = \"a\" + \"b\"\nmaan y = x == \"ab\""), vec![]);
    }

    #[test]
    fn comparison_of_mixed_types_is_a_type_error() {
        let errors = analyze("maan x = \"a\" < 5");
        assert!(matches!(errors[0], SemanticError::InvalidOperation { .. }));
    }

    #[test]
    fn unary_rules() {
        assert!(matches!(
            analyze("maan x = -\"oops\"")[0],
            SemanticError::InvalidUnary { op: "-", .. }
        ));
        assert!(matches!(
            analyze("maan x = nahi 5")[0],
            SemanticError::InvalidUnary { op: "nahi", .. }
        ));
        assert_eq!(analyze("maan x = nahi sach"), vec![]);
    }

    #[test]
    fn any_turns_off_checks() {
        // Parameters are Any, so no complaint even for suspicious operands.
        assert_eq!(analyze("kaam f(a) { wapas a - \"x\" }"), vec![]);
    }

    #[test]
    fn unknown_parent_class_is_reported() {
        let errors = analyze("class B extends A { }");
        assert!(matches!(errors[0], SemanticError::UndefinedName { .. }));
    }

    #[test]
    fn parent_must_be_a_class() {
        let errors = analyze("maan A = 1\nclass B extends A { }");
        assert!(matches!(errors[0], SemanticError::ParentNotClass { .. }));
    }

    #[test]
    fn catch_variable_is_bound_inside_catch_block() {
        assert_eq!(
            analyze("koshish { uchalo \"x\" } pakad e { likho(e) }"),
            vec![]
        );
    }

    #[test]
    fn for_each_binds_its_loop_variable_in_a_fresh_scope() {
        assert_eq!(analyze("har n mein [1, 2] { likho(n) }"), vec![]);
        let errors = analyze("har n mein [1, 2] { }\nlikho(n)");
        assert!(matches!(errors[0], SemanticError::UndefinedName { .. }));
    }

    #[test]
    fn analysis_is_idempotent() {
        let tokens = tokenize("maan x = \"a\" - 1\nlikho(y)").expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        let mut analyzer = SemanticAnalyzer::new();
        let first = analyzer.analyze(&program);
        let second = analyzer.analyze(&program);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn errors_do_not_stop_the_walk() {
        let errors = analyze(indoc! {"
            likho(a)
            likho(b)
            ruk
        "});
        assert_eq!(errors.len(), 3);
    }
}
