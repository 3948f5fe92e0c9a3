//! Shared syntax tree produced by the parser.
//!
//! Every node carries the 1-indexed source line of the construct so later
//! phases can report positions without re-lexing. `Display` renders canonical
//! source text that re-parses to a structurally equal tree.

use std::fmt;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::Less => "<",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::And => "aur",
            BinaryOperator::Or => "ya",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Greater
                | BinaryOperator::Less
                | BinaryOperator::GreaterEqual
                | BinaryOperator::LessEqual
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOperator::Equal | BinaryOperator::NotEqual)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Mul
                | BinaryOperator::Div
                | BinaryOperator::Mod
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Neg,
    Nahi,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Nahi => "nahi",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number {
        value: Number,
        line: usize,
    },
    Str {
        value: String,
        line: usize,
    },
    Boolean {
        value: bool,
        line: usize,
    },
    Khaali {
        line: usize,
    },
    List {
        elements: Vec<Expression>,
        line: usize,
    },
    Dict {
        pairs: Vec<(Expression, Expression)>,
        line: usize,
    },
    Variable {
        name: String,
        line: usize,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        line: usize,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
        line: usize,
    },
    Parenthesized {
        inner: Box<Expression>,
        line: usize,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        line: usize,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expression>,
        line: usize,
    },
    NewObject {
        class_name: String,
        args: Vec<Expression>,
        line: usize,
    },
    MethodCall {
        target: Box<Expression>,
        method: String,
        args: Vec<Expression>,
        line: usize,
    },
    PropertyAccess {
        target: Box<Expression>,
        property: String,
        line: usize,
    },
    Yeh {
        line: usize,
    },
    Super {
        args: Vec<Expression>,
        line: usize,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
        line: usize,
    },
}

impl Expression {
    pub fn line(&self) -> usize {
        match self {
            Expression::Number { line, .. }
            | Expression::Str { line, .. }
            | Expression::Boolean { line, .. }
            | Expression::Khaali { line }
            | Expression::List { line, .. }
            | Expression::Dict { line, .. }
            | Expression::Variable { line, .. }
            | Expression::BinaryOp { line, .. }
            | Expression::UnaryOp { line, .. }
            | Expression::Parenthesized { line, .. }
            | Expression::Call { line, .. }
            | Expression::Lambda { line, .. }
            | Expression::NewObject { line, .. }
            | Expression::MethodCall { line, .. }
            | Expression::PropertyAccess { line, .. }
            | Expression::Yeh { line }
            | Expression::Super { line, .. }
            | Expression::Index { line, .. } => *line,
        }
    }
}

/// Named function or method definition.
#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub line: usize,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    VarDecl {
        name: String,
        value: Expression,
        line: usize,
    },
    Assign {
        name: String,
        value: Expression,
        line: usize,
    },
    IndexAssign {
        target: Expression,
        index: Expression,
        value: Expression,
        line: usize,
    },
    PropertyAssign {
        target: Expression,
        property: String,
        value: Expression,
        line: usize,
    },
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        elif_branches: Vec<(Expression, Vec<Statement>)>,
        else_body: Option<Vec<Statement>>,
        line: usize,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        line: usize,
    },
    ForEach {
        variable: String,
        iterable: Expression,
        body: Vec<Statement>,
        line: usize,
    },
    Break {
        line: usize,
    },
    Continue {
        line: usize,
    },
    FunctionDef(FunctionDef),
    Return {
        value: Option<Expression>,
        line: usize,
    },
    ClassDef {
        name: String,
        parent: Option<String>,
        methods: Vec<FunctionDef>,
        line: usize,
    },
    Try {
        body: Vec<Statement>,
        catch_var: String,
        catch_body: Vec<Statement>,
        finally_body: Option<Vec<Statement>>,
        line: usize,
    },
    Throw {
        value: Expression,
        line: usize,
    },
    Print {
        args: Vec<Expression>,
        newline: bool,
        line: usize,
    },
    Input {
        variable: String,
        prompt: Option<String>,
        line: usize,
    },
    Import {
        module: String,
        line: usize,
    },
    Block {
        body: Vec<Statement>,
        line: usize,
    },
    Expr(Expression),
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::VarDecl { line, .. }
            | Statement::Assign { line, .. }
            | Statement::IndexAssign { line, .. }
            | Statement::PropertyAssign { line, .. }
            | Statement::If { line, .. }
            | Statement::While { line, .. }
            | Statement::ForEach { line, .. }
            | Statement::Break { line }
            | Statement::Continue { line }
            | Statement::Return { line, .. }
            | Statement::ClassDef { line, .. }
            | Statement::Try { line, .. }
            | Statement::Throw { line, .. }
            | Statement::Print { line, .. }
            | Statement::Input { line, .. }
            | Statement::Import { line, .. }
            | Statement::Block { line, .. } => *line,
            Statement::FunctionDef(def) => def.line,
            Statement::Expr(expr) => expr.line(),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

// Canonical pretty-printer. The output re-parses to a structurally equal tree
// (line numbers aside), which is what the round-trip tests rely on.

fn write_indent(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        write!(f, "    ")?;
    }
    Ok(())
}

fn write_comma_separated(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_block(f: &mut fmt::Formatter<'_>, body: &[Statement], indent: usize) -> fmt::Result {
    writeln!(f, "{{")?;
    for statement in body {
        statement.fmt_indented(f, indent + 1)?;
    }
    write_indent(f, indent)?;
    write!(f, "}}")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number { value, .. } => write!(f, "{value}"),
            Expression::Str { value, .. } => write!(f, "\"{value}\""),
            Expression::Boolean { value, .. } => {
                write!(f, "{}", if *value { "sach" } else { "jhoot" })
            }
            Expression::Khaali { .. } => write!(f, "khaali"),
            Expression::List { elements, .. } => {
                write!(f, "[")?;
                write_comma_separated(f, elements)?;
                write!(f, "]")
            }
            Expression::Dict { pairs, .. } => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expression::Variable { name, .. } => write!(f, "{name}"),
            Expression::BinaryOp {
                op, left, right, ..
            } => write!(f, "{left} {} {right}", op.symbol()),
            Expression::UnaryOp { op, operand, .. } => match op {
                UnaryOperator::Neg => write!(f, "-{operand}"),
                UnaryOperator::Nahi => write!(f, "nahi {operand}"),
            },
            Expression::Parenthesized { inner, .. } => write!(f, "({inner})"),
            Expression::Call { callee, args, .. } => {
                write!(f, "{callee}(")?;
                write_comma_separated(f, args)?;
                write!(f, ")")
            }
            Expression::Lambda { params, body, .. } => {
                write!(f, "lambda({}) -> {body}", params.join(", "))
            }
            Expression::NewObject {
                class_name, args, ..
            } => {
                write!(f, "naya {class_name}(")?;
                write_comma_separated(f, args)?;
                write!(f, ")")
            }
            Expression::MethodCall {
                target,
                method,
                args,
                ..
            } => {
                write!(f, "{target}.{method}(")?;
                write_comma_separated(f, args)?;
                write!(f, ")")
            }
            Expression::PropertyAccess {
                target, property, ..
            } => write!(f, "{target}.{property}"),
            Expression::Yeh { .. } => write!(f, "yeh"),
            Expression::Super { args, .. } => {
                write!(f, "upar(")?;
                write_comma_separated(f, args)?;
                write!(f, ")")
            }
            Expression::Index { target, index, .. } => write!(f, "{target}[{index}]"),
        }
    }
}

impl FunctionDef {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write_indent(f, indent)?;
        write!(f, "kaam {}({}) ", self.name, self.params.join(", "))?;
        write_block(f, &self.body, indent)?;
        writeln!(f)
    }
}

impl Statement {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Statement::FunctionDef(def) => return def.fmt_indented(f, indent),
            Statement::Expr(expr) => {
                write_indent(f, indent)?;
                return writeln!(f, "{expr}");
            }
            _ => {}
        }

        write_indent(f, indent)?;
        match self {
            Statement::VarDecl { name, value, .. } => write!(f, "maan {name} = {value}")?,
            Statement::Assign { name, value, .. } => write!(f, "{name} = {value}")?,
            Statement::IndexAssign {
                target,
                index,
                value,
                ..
            } => write!(f, "{target}[{index}] = {value}")?,
            Statement::PropertyAssign {
                target,
                property,
                value,
                ..
            } => write!(f, "{target}.{property} = {value}")?,
            Statement::If {
                condition,
                then_body,
                elif_branches,
                else_body,
                ..
            } => {
                write!(f, "agar {condition} ")?;
                write_block(f, then_body, indent)?;
                for (elif_condition, elif_body) in elif_branches {
                    write!(f, " warna_agar {elif_condition} ")?;
                    write_block(f, elif_body, indent)?;
                }
                if let Some(else_body) = else_body {
                    write!(f, " warna ")?;
                    write_block(f, else_body, indent)?;
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                write!(f, "jab_tak {condition} ")?;
                write_block(f, body, indent)?;
            }
            Statement::ForEach {
                variable,
                iterable,
                body,
                ..
            } => {
                write!(f, "har {variable} mein {iterable} ")?;
                write_block(f, body, indent)?;
            }
            Statement::Break { .. } => write!(f, "ruk")?,
            Statement::Continue { .. } => write!(f, "age_badho")?,
            Statement::Return { value, .. } => match value {
                Some(value) => write!(f, "wapas {value}")?,
                None => write!(f, "wapas")?,
            },
            Statement::ClassDef {
                name,
                parent,
                methods,
                ..
            } => {
                match parent {
                    Some(parent) => write!(f, "class {name} extends {parent} ")?,
                    None => write!(f, "class {name} ")?,
                }
                writeln!(f, "{{")?;
                for method in methods {
                    method.fmt_indented(f, indent + 1)?;
                }
                write_indent(f, indent)?;
                write!(f, "}}")?;
            }
            Statement::Try {
                body,
                catch_var,
                catch_body,
                finally_body,
                ..
            } => {
                write!(f, "koshish ")?;
                write_block(f, body, indent)?;
                write!(f, " pakad {catch_var} ")?;
                write_block(f, catch_body, indent)?;
                if let Some(finally_body) = finally_body {
                    write!(f, " aakhir ")?;
                    write_block(f, finally_body, indent)?;
                }
            }
            Statement::Throw { value, .. } => write!(f, "uchalo {value}")?,
            Statement::Print { args, newline, .. } => {
                let name = if *newline { "likho" } else { "likho_online" };
                write!(f, "{name}(")?;
                write_comma_separated(f, args)?;
                write!(f, ")")?;
            }
            Statement::Input {
                variable, prompt, ..
            } => match prompt {
                Some(prompt) => write!(f, "poocho {variable} \"{prompt}\"")?,
                None => write!(f, "poocho {variable}")?,
            },
            Statement::Import { module, .. } => write!(f, "lao {module}")?,
            Statement::Block { body, .. } => write_block(f, body, indent)?,
            Statement::FunctionDef(_) | Statement::Expr(_) => unreachable!(),
        }
        writeln!(f)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            statement.fmt_indented(f, 0)?;
        }
        Ok(())
    }
}
