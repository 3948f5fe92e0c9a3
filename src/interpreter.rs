//! Tree-walking interpreter.
//!
//! Executes the AST directly over a chained runtime environment. Statement
//! execution yields a [`Flow`] marker (normal, break, continue, return) while
//! thrown values and runtime errors travel on the error channel as
//! [`Unwind`], so user-level control flow is never conflated with host
//! errors. A `koshish`/`pakad` catches both thrown values and runtime
//! errors; everything else halts the program at the first failure.

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{
    BinaryOperator, Expression, FunctionDef, Number, Program, Statement, UnaryOperator,
};
use crate::builtins::Builtin;

mod env;
mod value;

use env::{EnvRef, Environment};
use value::{ClassValue, FunctionValue, InstanceValue, LambdaValue, Value, values_equal};

pub const MAX_RECURSION_DEPTH: usize = 1000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{message}")]
    TypeError { message: String, line: usize },
    #[error("Undefined name '{name}'")]
    NameError { name: String, line: usize },
    #[error("Division by zero")]
    DivisionByZero { line: usize },
    #[error("{message}")]
    IndexError { message: String, line: usize },
    #[error("Unknown attribute '{attribute}' for {type_name}")]
    AttributeError {
        attribute: String,
        type_name: String,
        line: usize,
    },
    #[error("Maximum recursion depth exceeded")]
    RecursionError { line: usize },
    #[error("Input failed: {message}")]
    FileIOError { message: String, line: usize },
    #[error("Cannot import module '{module}'")]
    ImportError { module: String, line: usize },
    #[error("Uncaught exception: {value}")]
    UserException { value: String, line: usize },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::TypeError { line, .. }
            | RuntimeError::NameError { line, .. }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::IndexError { line, .. }
            | RuntimeError::AttributeError { line, .. }
            | RuntimeError::RecursionError { line }
            | RuntimeError::FileIOError { line, .. }
            | RuntimeError::ImportError { line, .. }
            | RuntimeError::UserException { line, .. } => *line,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            RuntimeError::TypeError { .. } => "TypeError",
            RuntimeError::NameError { .. } => "NameError",
            RuntimeError::DivisionByZero { .. } => "DivisionByZeroError",
            RuntimeError::IndexError { .. } => "IndexError",
            RuntimeError::AttributeError { .. } => "AttributeError",
            RuntimeError::RecursionError { .. } => "RecursionError",
            RuntimeError::FileIOError { .. } => "FileIOError",
            RuntimeError::ImportError { .. } => "ImportError",
            RuntimeError::UserException { .. } => "UserException",
        }
    }

    pub(crate) fn hindi_message(&self) -> String {
        match self {
            RuntimeError::TypeError { message, .. } => format!("प्रकार त्रुटि: {message}"),
            RuntimeError::NameError { name, .. } => format!("अपरिभाषित नाम '{name}'"),
            RuntimeError::DivisionByZero { .. } => "शून्य से भाग".to_string(),
            RuntimeError::IndexError { message, .. } => format!("सूचकांक त्रुटि: {message}"),
            RuntimeError::AttributeError { attribute, .. } => {
                format!("अज्ञात गुण '{attribute}'")
            }
            RuntimeError::RecursionError { .. } => "अधिकतम पुनरावर्तन सीमा पार".to_string(),
            RuntimeError::FileIOError { message, .. } => format!("इनपुट विफल: {message}"),
            RuntimeError::ImportError { module, .. } => {
                format!("मॉड्यूल '{module}' आयात नहीं हो सका")
            }
            RuntimeError::UserException { value, .. } => {
                format!("बिना पकड़ा अपवाद: {value}")
            }
        }
    }

    fn type_error(message: impl Into<String>, line: usize) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            line,
        }
    }

    fn index_error(message: impl Into<String>, line: usize) -> Self {
        RuntimeError::IndexError {
            message: message.into(),
            line,
        }
    }
}

/// Statement-level control-flow marker. Break and continue are absorbed by
/// the nearest enclosing loop, return by the nearest call frame.
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Non-local exits that cross expression boundaries: a thrown user value
/// (absorbed by the nearest `pakad`) or a hard runtime error.
enum Unwind {
    Error(RuntimeError),
    Throw { value: Value, line: usize },
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

type ExecResult = Result<Flow, Unwind>;
type EvalResult = Result<Value, Unwind>;

/// Line-structured stdout buffer; `likho_online` appends to the open partial
/// line, `likho` completes it.
#[derive(Debug, Default)]
struct OutputBuffer {
    completed: Vec<String>,
    partial: String,
}

impl OutputBuffer {
    fn print_line(&mut self, text: &str) {
        self.partial.push_str(text);
        self.completed.push(std::mem::take(&mut self.partial));
    }

    fn print_inline(&mut self, text: &str) {
        self.partial.push_str(text);
    }

    fn take(&mut self) -> String {
        let mut rendered = String::new();
        for line in self.completed.drain(..) {
            rendered.push_str(&line);
            rendered.push('\n');
        }
        rendered.push_str(&self.partial);
        self.partial.clear();
        rendered
    }
}

#[derive(Clone)]
struct MethodContext {
    instance: Rc<InstanceValue>,
    /// Class the executing method was found on; `upar` resolves against its
    /// parent, which may differ from the instance's own class.
    defined_on: Rc<ClassValue>,
}

pub struct Interpreter {
    globals: EnvRef,
    output: OutputBuffer,
    input: Box<dyn BufRead>,
    call_depth: usize,
    method_stack: Vec<MethodContext>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_input(Box::new(io::BufReader::new(io::stdin())))
    }

    /// Use a caller-provided reader for `poocho` input (tests, REPL hosts).
    pub fn with_input(input: Box<dyn BufRead>) -> Self {
        let globals = Environment::root();
        {
            let mut scope = globals.borrow_mut();
            for builtin in Builtin::ALL {
                scope.define(builtin.name(), Value::Builtin(builtin));
            }
        }
        Self {
            globals,
            output: OutputBuffer::default(),
            input,
            call_depth: 0,
            method_stack: Vec::new(),
        }
    }

    /// Run a whole program against the root environment. Side effects land in
    /// the output buffer; the first uncaught failure halts execution.
    pub fn execute(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let globals = Rc::clone(&self.globals);
        for statement in &program.statements {
            match self.exec_statement(statement, &globals) {
                Ok(_) => {}
                Err(Unwind::Error(error)) => return Err(error),
                Err(Unwind::Throw { value, line }) => {
                    return Err(RuntimeError::UserException {
                        value: value.to_output(),
                        line,
                    });
                }
            }
        }
        Ok(())
    }

    /// Drain everything printed so far, exactly as it would appear on stdout.
    pub fn take_output(&mut self) -> String {
        self.output.take()
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn exec_statements_in(&mut self, statements: &[Statement], env: &EnvRef) -> ExecResult {
        for statement in statements {
            match self.exec_statement(statement, env)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_statement(&mut self, statement: &Statement, env: &EnvRef) -> ExecResult {
        match statement {
            Statement::VarDecl { name, value, .. } => {
                let value = self.eval_expression(value, env)?;
                env.borrow_mut().define(name.clone(), value);
                Ok(Flow::Normal)
            }
            Statement::Assign { name, value, .. } => {
                let value = self.eval_expression(value, env)?;
                if !Environment::assign(env, name, value.clone()) {
                    env.borrow_mut().define(name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            Statement::IndexAssign {
                target,
                index,
                value,
                line,
            } => {
                let target = self.eval_expression(target, env)?;
                let index = self.eval_expression(index, env)?;
                let value = self.eval_expression(value, env)?;
                self.store_index(&target, index, value, *line)?;
                Ok(Flow::Normal)
            }
            Statement::PropertyAssign {
                target,
                property,
                value,
                line,
            } => {
                let target = self.eval_expression(target, env)?;
                let value = self.eval_expression(value, env)?;
                let Value::Instance(instance) = &target else {
                    return Err(RuntimeError::type_error(
                        format!(
                            "cannot assign property '{property}' on {}",
                            target.type_name()
                        ),
                        *line,
                    )
                    .into());
                };
                instance.fields.borrow_mut().insert(property.clone(), value);
                Ok(Flow::Normal)
            }
            Statement::If {
                condition,
                then_body,
                elif_branches,
                else_body,
                ..
            } => {
                if self.eval_expression(condition, env)?.is_truthy() {
                    let branch_env = Environment::child(env);
                    return self.exec_statements_in(then_body, &branch_env);
                }
                for (elif_condition, elif_body) in elif_branches {
                    if self.eval_expression(elif_condition, env)?.is_truthy() {
                        let branch_env = Environment::child(env);
                        return self.exec_statements_in(elif_body, &branch_env);
                    }
                }
                if let Some(else_body) = else_body {
                    let branch_env = Environment::child(env);
                    return self.exec_statements_in(else_body, &branch_env);
                }
                Ok(Flow::Normal)
            }
            Statement::While {
                condition, body, ..
            } => {
                while self.eval_expression(condition, env)?.is_truthy() {
                    let body_env = Environment::child(env);
                    match self.exec_statements_in(body, &body_env)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::ForEach {
                variable,
                iterable,
                body,
                line,
            } => {
                let iterable = self.eval_expression(iterable, env)?;
                let items: Vec<Value> = match &iterable {
                    Value::List(values) => values.borrow().clone(),
                    Value::Str(text) => text
                        .chars()
                        .map(|c| Value::Str(c.to_string()))
                        .collect(),
                    Value::Dict(pairs) => {
                        pairs.borrow().iter().map(|(key, _)| key.clone()).collect()
                    }
                    other => {
                        return Err(RuntimeError::type_error(
                            format!("cannot iterate over {}", other.type_name()),
                            *line,
                        )
                        .into());
                    }
                };
                for item in items {
                    let body_env = Environment::child(env);
                    body_env.borrow_mut().define(variable.clone(), item);
                    match self.exec_statements_in(body, &body_env)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::Break { .. } => Ok(Flow::Break),
            Statement::Continue { .. } => Ok(Flow::Continue),
            Statement::FunctionDef(def) => {
                let function = self.make_function(def, env);
                env.borrow_mut().define(def.name.clone(), function);
                Ok(Flow::Normal)
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.eval_expression(value, env)?,
                    None => Value::Khaali,
                };
                Ok(Flow::Return(value))
            }
            Statement::ClassDef {
                name,
                parent,
                methods,
                line,
            } => {
                let parent = match parent {
                    Some(parent_name) => match Environment::get(env, parent_name) {
                        Some(Value::Class(parent_class)) => Some(parent_class),
                        Some(other) => {
                            return Err(RuntimeError::type_error(
                                format!(
                                    "'{parent_name}' is not a class, it is a {}",
                                    other.type_name()
                                ),
                                *line,
                            )
                            .into());
                        }
                        None => {
                            return Err(RuntimeError::NameError {
                                name: parent_name.clone(),
                                line: *line,
                            }
                            .into());
                        }
                    },
                    None => None,
                };
                let mut method_table = HashMap::new();
                for method in methods {
                    method_table.insert(
                        method.name.clone(),
                        Rc::new(FunctionValue {
                            name: method.name.clone(),
                            params: method.params.clone(),
                            body: method.body.clone(),
                            env: Rc::clone(env),
                        }),
                    );
                }
                let class = Value::Class(Rc::new(ClassValue {
                    name: name.clone(),
                    parent,
                    methods: method_table,
                }));
                env.borrow_mut().define(name.clone(), class);
                Ok(Flow::Normal)
            }
            Statement::Try {
                body,
                catch_var,
                catch_body,
                finally_body,
                ..
            } => {
                let try_env = Environment::child(env);
                let mut outcome = self.exec_statements_in(body, &try_env);

                // pakad absorbs thrown values and runtime errors alike; a
                // runtime error binds as its message text.
                outcome = match outcome {
                    Err(Unwind::Throw { value, .. }) => {
                        let catch_env = Environment::child(env);
                        catch_env.borrow_mut().define(catch_var.clone(), value);
                        self.exec_statements_in(catch_body, &catch_env)
                    }
                    Err(Unwind::Error(error)) => {
                        let catch_env = Environment::child(env);
                        catch_env
                            .borrow_mut()
                            .define(catch_var.clone(), Value::Str(error.to_string()));
                        self.exec_statements_in(catch_body, &catch_env)
                    }
                    other => other,
                };

                if let Some(finally_body) = finally_body {
                    let finally_env = Environment::child(env);
                    match self.exec_statements_in(finally_body, &finally_env)? {
                        Flow::Normal => {}
                        // The finally block's own signal supersedes the
                        // pending one.
                        flow => return Ok(flow),
                    }
                }
                outcome
            }
            Statement::Throw { value, line } => {
                let value = self.eval_expression(value, env)?;
                Err(Unwind::Throw { value, line: *line })
            }
            Statement::Print { args, newline, .. } => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.eval_expression(arg, env)?.to_output());
                }
                let text = rendered.join(" ");
                if *newline {
                    self.output.print_line(&text);
                } else {
                    self.output.print_inline(&text);
                }
                Ok(Flow::Normal)
            }
            Statement::Input {
                variable,
                prompt,
                line,
            } => {
                if let Some(prompt) = prompt {
                    self.output.print_inline(prompt);
                }
                let text = self.read_input_line(*line)?;
                env.borrow_mut().define(variable.clone(), Value::Str(text));
                Ok(Flow::Normal)
            }
            Statement::Import { .. } => {
                // Module resolution is deferred; importing is a no-op.
                Ok(Flow::Normal)
            }
            Statement::Block { body, .. } => {
                let block_env = Environment::child(env);
                self.exec_statements_in(body, &block_env)
            }
            Statement::Expr(expr) => {
                self.eval_expression(expr, env)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn make_function(&self, def: &FunctionDef, env: &EnvRef) -> Value {
        Value::Function(Rc::new(FunctionValue {
            name: def.name.clone(),
            params: def.params.clone(),
            body: def.body.clone(),
            env: Rc::clone(env),
        }))
    }

    fn read_input_line(&mut self, line: usize) -> Result<String, Unwind> {
        let mut buffer = String::new();
        match self.input.read_line(&mut buffer) {
            Ok(0) => Err(RuntimeError::FileIOError {
                message: "end of input".to_string(),
                line,
            }
            .into()),
            Ok(_) => {
                while buffer.ends_with('\n') || buffer.ends_with('\r') {
                    buffer.pop();
                }
                Ok(buffer)
            }
            Err(error) => Err(RuntimeError::FileIOError {
                message: error.to_string(),
                line,
            }
            .into()),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn eval_expression(&mut self, expr: &Expression, env: &EnvRef) -> EvalResult {
        match expr {
            Expression::Number { value, .. } => Ok(match value {
                Number::Int(value) => Value::Int(*value),
                Number::Float(value) => Value::Float(*value),
            }),
            Expression::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expression::Boolean { value, .. } => Ok(Value::Bool(*value)),
            Expression::Khaali { .. } => Ok(Value::Khaali),
            Expression::List { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expression(element, env)?);
                }
                Ok(Value::list(values))
            }
            Expression::Dict { pairs, line } => {
                let mut entries: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = self.eval_expression(key, env)?;
                    self.check_dict_key(&key, *line)?;
                    let value = self.eval_expression(value, env)?;
                    match entries.iter_mut().find(|(existing, _)| values_equal(existing, &key)) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(Value::dict(entries))
            }
            Expression::Variable { name, line } => {
                Environment::get(env, name).ok_or_else(|| {
                    RuntimeError::NameError {
                        name: name.clone(),
                        line: *line,
                    }
                    .into()
                })
            }
            Expression::BinaryOp {
                op, left, right, line,
            } => match op {
                BinaryOperator::And => {
                    let left = self.eval_expression(left, env)?;
                    if !left.is_truthy() {
                        Ok(left)
                    } else {
                        self.eval_expression(right, env)
                    }
                }
                BinaryOperator::Or => {
                    let left = self.eval_expression(left, env)?;
                    if left.is_truthy() {
                        Ok(left)
                    } else {
                        self.eval_expression(right, env)
                    }
                }
                _ => {
                    let left = self.eval_expression(left, env)?;
                    let right = self.eval_expression(right, env)?;
                    Ok(binary_op(*op, &left, &right, *line)?)
                }
            },
            Expression::UnaryOp { op, operand, line } => {
                let operand = self.eval_expression(operand, env)?;
                match op {
                    UnaryOperator::Neg => match operand {
                        Value::Int(value) => Ok(Value::Int(-value)),
                        Value::Float(value) => Ok(Value::Float(-value)),
                        other => Err(RuntimeError::type_error(
                            format!("unary '-' expects a number, got {}", other.type_name()),
                            *line,
                        )
                        .into()),
                    },
                    UnaryOperator::Nahi => Ok(Value::Bool(!operand.is_truthy())),
                }
            }
            Expression::Parenthesized { inner, .. } => self.eval_expression(inner, env),
            Expression::Call { callee, args, line } => {
                let callee = self.eval_callee(callee, env)?;
                let args = self.eval_args(args, env)?;
                self.call_value(callee, args, *line)
            }
            Expression::Lambda { params, body, .. } => Ok(Value::Lambda(Rc::new(LambdaValue {
                params: params.clone(),
                body: (**body).clone(),
                env: Rc::clone(env),
            }))),
            Expression::NewObject {
                class_name,
                args,
                line,
            } => {
                let class = match Environment::get(env, class_name) {
                    Some(Value::Class(class)) => class,
                    Some(other) => {
                        return Err(RuntimeError::type_error(
                            format!(
                                "'{class_name}' is not a class, it is a {}",
                                other.type_name()
                            ),
                            *line,
                        )
                        .into());
                    }
                    None => {
                        return Err(RuntimeError::NameError {
                            name: class_name.clone(),
                            line: *line,
                        }
                        .into());
                    }
                };
                let args = self.eval_args(args, env)?;
                self.instantiate(&class, args, *line)
            }
            Expression::MethodCall {
                target,
                method,
                args,
                line,
            } => {
                let target = self.eval_expression(target, env)?;
                let args = self.eval_args(args, env)?;
                let Value::Instance(instance) = &target else {
                    return Err(RuntimeError::type_error(
                        format!("cannot call method '{method}' on {}", target.type_name()),
                        *line,
                    )
                    .into());
                };
                // Fields shadow methods, matching property access.
                let field = instance.fields.borrow().get(method).cloned();
                if let Some(field) = field {
                    return self.call_value(field, args, *line);
                }
                match ClassValue::resolve_method(&instance.class, method) {
                    Some((function, defined_on)) => self.call_function(
                        &function,
                        Some(MethodContext {
                            instance: Rc::clone(instance),
                            defined_on,
                        }),
                        args,
                        *line,
                    ),
                    None => Err(RuntimeError::AttributeError {
                        attribute: method.clone(),
                        type_name: instance.class.name.clone(),
                        line: *line,
                    }
                    .into()),
                }
            }
            Expression::PropertyAccess {
                target,
                property,
                line,
            } => {
                let target = self.eval_expression(target, env)?;
                let Value::Instance(instance) = &target else {
                    return Err(RuntimeError::AttributeError {
                        attribute: property.clone(),
                        type_name: target.type_name().to_string(),
                        line: *line,
                    }
                    .into());
                };
                if let Some(value) = instance.fields.borrow().get(property).cloned() {
                    return Ok(value);
                }
                match ClassValue::resolve_method(&instance.class, property) {
                    Some((method, defined_on)) => Ok(Value::BoundMethod {
                        instance: Rc::clone(instance),
                        method,
                        defined_on,
                    }),
                    None => Err(RuntimeError::AttributeError {
                        attribute: property.clone(),
                        type_name: instance.class.name.clone(),
                        line: *line,
                    }
                    .into()),
                }
            }
            // `yeh` is bound in every method call frame, so plain environment
            // lookup also covers lambdas that capture it lexically.
            Expression::Yeh { line } => Environment::get(env, "yeh").ok_or_else(|| {
                RuntimeError::type_error("'yeh' used outside a method", *line).into()
            }),
            Expression::Super { args, line } => {
                let context = match self.method_stack.last() {
                    Some(context) => context.clone(),
                    None => {
                        return Err(RuntimeError::type_error(
                            "'upar' used outside a method",
                            *line,
                        )
                        .into());
                    }
                };
                let Some(parent) = context.defined_on.parent.clone() else {
                    return Err(RuntimeError::AttributeError {
                        attribute: "__init__".to_string(),
                        type_name: format!("{} (no parent class)", context.defined_on.name),
                        line: *line,
                    }
                    .into());
                };
                let args = self.eval_args(args, env)?;
                match ClassValue::resolve_method(&parent, "__init__") {
                    Some((init, defined_on)) => self.call_function(
                        &init,
                        Some(MethodContext {
                            instance: context.instance,
                            defined_on,
                        }),
                        args,
                        *line,
                    ),
                    None => Err(RuntimeError::AttributeError {
                        attribute: "__init__".to_string(),
                        type_name: parent.name.clone(),
                        line: *line,
                    }
                    .into()),
                }
            }
            Expression::Index {
                target,
                index,
                line,
            } => {
                let target = self.eval_expression(target, env)?;
                let index = self.eval_expression(index, env)?;
                self.load_index(&target, &index, *line)
            }
        }
    }

    fn eval_callee(&mut self, callee: &Expression, env: &EnvRef) -> EvalResult {
        if let Expression::Variable { name, line } = callee {
            return Environment::get(env, name).ok_or_else(|| {
                RuntimeError::NameError {
                    name: name.clone(),
                    line: *line,
                }
                .into()
            });
        }
        self.eval_expression(callee, env)
    }

    fn eval_args(&mut self, args: &[Expression], env: &EnvRef) -> Result<Vec<Value>, Unwind> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expression(arg, env)?);
        }
        Ok(values)
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn call_value(&mut self, callee: Value, args: Vec<Value>, line: usize) -> EvalResult {
        match callee {
            Value::Builtin(builtin) => self.call_builtin(builtin, args, line),
            Value::Function(function) => self.call_function(&function, None, args, line),
            Value::Lambda(lambda) => self.call_lambda(&lambda, args, line),
            Value::BoundMethod {
                instance,
                method,
                defined_on,
            } => self.call_function(
                &method,
                Some(MethodContext {
                    instance,
                    defined_on,
                }),
                args,
                line,
            ),
            other => Err(RuntimeError::type_error(
                format!("{} is not callable", other.type_name()),
                line,
            )
            .into()),
        }
    }

    fn call_function(
        &mut self,
        function: &Rc<FunctionValue>,
        context: Option<MethodContext>,
        args: Vec<Value>,
        line: usize,
    ) -> EvalResult {
        if args.len() != function.params.len() {
            return Err(RuntimeError::type_error(
                format!(
                    "Function '{}' expects {} argument(s), got {}",
                    function.name,
                    function.params.len(),
                    args.len()
                ),
                line,
            )
            .into());
        }
        if self.call_depth >= MAX_RECURSION_DEPTH {
            return Err(RuntimeError::RecursionError { line }.into());
        }

        let call_env = Environment::child(&function.env);
        {
            let mut scope = call_env.borrow_mut();
            for (param, value) in function.params.iter().zip(args) {
                scope.define(param.clone(), value);
            }
            if let Some(context) = &context {
                scope.define("yeh", Value::Instance(Rc::clone(&context.instance)));
            }
        }

        self.call_depth += 1;
        let in_method = context.is_some();
        if let Some(context) = context {
            self.method_stack.push(context);
        }
        let outcome = self.exec_statements_in(&function.body, &call_env);
        if in_method {
            self.method_stack.pop();
        }
        self.call_depth -= 1;

        match outcome? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::Khaali),
        }
    }

    fn call_lambda(&mut self, lambda: &Rc<LambdaValue>, args: Vec<Value>, line: usize) -> EvalResult {
        if args.len() != lambda.params.len() {
            return Err(RuntimeError::type_error(
                format!(
                    "Lambda expects {} argument(s), got {}",
                    lambda.params.len(),
                    args.len()
                ),
                line,
            )
            .into());
        }
        if self.call_depth >= MAX_RECURSION_DEPTH {
            return Err(RuntimeError::RecursionError { line }.into());
        }

        let call_env = Environment::child(&lambda.env);
        {
            let mut scope = call_env.borrow_mut();
            for (param, value) in lambda.params.iter().zip(args) {
                scope.define(param.clone(), value);
            }
        }

        self.call_depth += 1;
        let result = self.eval_expression(&lambda.body, &call_env);
        self.call_depth -= 1;
        result
    }

    fn instantiate(&mut self, class: &Rc<ClassValue>, args: Vec<Value>, line: usize) -> EvalResult {
        let instance = Rc::new(InstanceValue {
            class: Rc::clone(class),
            fields: std::cell::RefCell::new(HashMap::new()),
        });
        match ClassValue::resolve_method(class, "__init__") {
            Some((init, defined_on)) => {
                self.call_function(
                    &init,
                    Some(MethodContext {
                        instance: Rc::clone(&instance),
                        defined_on,
                    }),
                    args,
                    line,
                )?;
            }
            None => {
                if !args.is_empty() {
                    return Err(RuntimeError::type_error(
                        format!(
                            "Class '{}' takes no constructor arguments, got {}",
                            class.name,
                            args.len()
                        ),
                        line,
                    )
                    .into());
                }
            }
        }
        Ok(Value::Instance(instance))
    }

    // ------------------------------------------------------------------
    // Indexing
    // ------------------------------------------------------------------

    fn check_dict_key(&self, key: &Value, line: usize) -> Result<(), Unwind> {
        match key {
            Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Bool(_) | Value::Khaali => {
                Ok(())
            }
            other => Err(RuntimeError::type_error(
                format!("{} cannot be a dict key", other.type_name()),
                line,
            )
            .into()),
        }
    }

    fn load_index(&self, target: &Value, index: &Value, line: usize) -> EvalResult {
        match target {
            Value::List(values) => {
                let values = values.borrow();
                let position = list_position(index, values.len(), line)?;
                Ok(values[position].clone())
            }
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                let position = list_position(index, chars.len(), line)?;
                Ok(Value::Str(chars[position].to_string()))
            }
            Value::Dict(pairs) => {
                let pairs = pairs.borrow();
                for (key, value) in pairs.iter() {
                    if values_equal(key, index) {
                        return Ok(value.clone());
                    }
                }
                Err(RuntimeError::index_error(
                    format!("key not found: {}", index.to_output()),
                    line,
                )
                .into())
            }
            other => Err(RuntimeError::type_error(
                format!("{} is not indexable", other.type_name()),
                line,
            )
            .into()),
        }
    }

    fn store_index(
        &self,
        target: &Value,
        index: Value,
        value: Value,
        line: usize,
    ) -> Result<(), Unwind> {
        match target {
            Value::List(values) => {
                let mut values = values.borrow_mut();
                let position = list_position(&index, values.len(), line)?;
                values[position] = value;
                Ok(())
            }
            Value::Dict(pairs) => {
                self.check_dict_key(&index, line)?;
                let mut pairs = pairs.borrow_mut();
                for (key, slot) in pairs.iter_mut() {
                    if values_equal(key, &index) {
                        *slot = value;
                        return Ok(());
                    }
                }
                pairs.push((index, value));
                Ok(())
            }
            other => Err(RuntimeError::type_error(
                format!("{} does not support index assignment", other.type_name()),
                line,
            )
            .into()),
        }
    }

    // ------------------------------------------------------------------
    // Builtins
    // ------------------------------------------------------------------

    fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>, line: usize) -> EvalResult {
        if let Some(expected) = builtin.arity()
            && args.len() != expected
        {
            return Err(RuntimeError::type_error(
                format!(
                    "Function '{}' expects {} argument(s), got {}",
                    builtin.name(),
                    expected,
                    args.len()
                ),
                line,
            )
            .into());
        }

        match builtin {
            Builtin::Likho => {
                let rendered = args
                    .iter()
                    .map(Value::to_output)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.output.print_line(&rendered);
                Ok(Value::Khaali)
            }
            Builtin::Poocho => {
                let prompt = args[0].to_output();
                self.output.print_inline(&prompt);
                Ok(Value::Str(self.read_input_line(line)?))
            }
            Builtin::Str => Ok(Value::Str(args[0].to_output())),
            Builtin::Int => match &args[0] {
                Value::Int(value) => Ok(Value::Int(*value)),
                Value::Float(value) => Ok(Value::Int(*value as i64)),
                Value::Bool(value) => Ok(Value::Int(i64::from(*value))),
                Value::Str(text) => text.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                    RuntimeError::type_error(format!("cannot convert '{text}' to int"), line)
                        .into()
                }),
                other => Err(RuntimeError::type_error(
                    format!("cannot convert {} to int", other.type_name()),
                    line,
                )
                .into()),
            },
            Builtin::Float => match &args[0] {
                Value::Int(value) => Ok(Value::Float(*value as f64)),
                Value::Float(value) => Ok(Value::Float(*value)),
                Value::Bool(value) => Ok(Value::Float(f64::from(u8::from(*value)))),
                Value::Str(text) => text.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    RuntimeError::type_error(format!("cannot convert '{text}' to float"), line)
                        .into()
                }),
                other => Err(RuntimeError::type_error(
                    format!("cannot convert {} to float", other.type_name()),
                    line,
                )
                .into()),
            },
            Builtin::Bool => Ok(Value::Bool(args[0].is_truthy())),
            Builtin::Type => Ok(Value::Str(args[0].type_name().to_string())),
            Builtin::Length => match &args[0] {
                Value::List(values) => Ok(Value::Int(values.borrow().len() as i64)),
                Value::Dict(pairs) => Ok(Value::Int(pairs.borrow().len() as i64)),
                Value::Str(text) => Ok(Value::Int(text.chars().count() as i64)),
                other => Err(RuntimeError::type_error(
                    format!("length() expects a list, dict, or string, got {}", other.type_name()),
                    line,
                )
                .into()),
            },
            Builtin::Append => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("append", &args[0], line));
                };
                values.borrow_mut().push(args[1].clone());
                Ok(Value::Khaali)
            }
            Builtin::Pop => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("pop", &args[0], line));
                };
                let mut values = values.borrow_mut();
                let position = list_position(&args[1], values.len(), line)?;
                Ok(values.remove(position))
            }
            Builtin::Insert => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("insert", &args[0], line));
                };
                let mut values = values.borrow_mut();
                let position = insert_position(&args[1], values.len(), line)?;
                values.insert(position, args[2].clone());
                Ok(Value::Khaali)
            }
            Builtin::Sort => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("sort", &args[0], line));
                };
                let mut values = values.borrow_mut();
                if values.iter().all(|value| value.as_number().is_some()) {
                    values.sort_by(|a, b| {
                        let a = a.as_number().expect("checked numeric");
                        let b = b.as_number().expect("checked numeric");
                        a.total_cmp(&b)
                    });
                } else if values.iter().all(|value| matches!(value, Value::Str(_))) {
                    values.sort_by_key(|value| value.to_output());
                } else {
                    return Err(RuntimeError::type_error(
                        "sort() expects a list of numbers or a list of strings",
                        line,
                    )
                    .into());
                }
                Ok(Value::Khaali)
            }
            Builtin::Reverse => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("reverse", &args[0], line));
                };
                values.borrow_mut().reverse();
                Ok(Value::Khaali)
            }
            Builtin::Sum => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("sum", &args[0], line));
                };
                let values = values.borrow();
                let mut int_total: i64 = 0;
                let mut float_total: f64 = 0.0;
                let mut saw_float = false;
                for value in values.iter() {
                    match value {
                        Value::Int(value) => {
                            int_total += value;
                            float_total += *value as f64;
                        }
                        Value::Float(value) => {
                            saw_float = true;
                            float_total += value;
                        }
                        other => {
                            return Err(RuntimeError::type_error(
                                format!("sum() expects numbers, got {}", other.type_name()),
                                line,
                            )
                            .into());
                        }
                    }
                }
                if saw_float {
                    Ok(Value::Float(float_total))
                } else {
                    Ok(Value::Int(int_total))
                }
            }
            Builtin::Min | Builtin::Max => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list(builtin.name(), &args[0], line));
                };
                let values = values.borrow();
                if values.is_empty() {
                    return Err(RuntimeError::type_error(
                        format!("{}() of an empty list", builtin.name()),
                        line,
                    )
                    .into());
                }
                if !values.iter().all(|value| value.as_number().is_some()) {
                    return Err(RuntimeError::type_error(
                        format!("{}() expects a list of numbers", builtin.name()),
                        line,
                    )
                    .into());
                }
                let mut best = values[0].clone();
                for value in values.iter().skip(1) {
                    let current = value.as_number().expect("checked numeric");
                    let best_number = best.as_number().expect("checked numeric");
                    let better = if builtin == Builtin::Min {
                        current < best_number
                    } else {
                        current > best_number
                    };
                    if better {
                        best = value.clone();
                    }
                }
                Ok(best)
            }
            Builtin::Range => match &args[0] {
                Value::Int(count) => {
                    let values = (0..*count).map(Value::Int).collect();
                    Ok(Value::list(values))
                }
                other => Err(RuntimeError::type_error(
                    format!("range() expects an integer, got {}", other.type_name()),
                    line,
                )
                .into()),
            },
            Builtin::Upper | Builtin::Lower => {
                let Value::Str(text) = &args[0] else {
                    return Err(expected_string(builtin.name(), &args[0], line));
                };
                let transformed = if builtin == Builtin::Upper {
                    text.to_uppercase()
                } else {
                    text.to_lowercase()
                };
                Ok(Value::Str(transformed))
            }
            Builtin::Split => {
                let Value::Str(text) = &args[0] else {
                    return Err(expected_string("split", &args[0], line));
                };
                let Value::Str(separator) = &args[1] else {
                    return Err(expected_string("split", &args[1], line));
                };
                if separator.is_empty() {
                    return Err(
                        RuntimeError::type_error("split() separator must not be empty", line)
                            .into(),
                    );
                }
                let parts = text
                    .split(separator.as_str())
                    .map(|part| Value::Str(part.to_string()))
                    .collect();
                Ok(Value::list(parts))
            }
            Builtin::Join => {
                let Value::List(values) = &args[0] else {
                    return Err(expected_list("join", &args[0], line));
                };
                let Value::Str(separator) = &args[1] else {
                    return Err(expected_string("join", &args[1], line));
                };
                let joined = values
                    .borrow()
                    .iter()
                    .map(Value::to_output)
                    .collect::<Vec<_>>()
                    .join(separator);
                Ok(Value::Str(joined))
            }
            Builtin::Replace => {
                let (Value::Str(text), Value::Str(from), Value::Str(to)) =
                    (&args[0], &args[1], &args[2])
                else {
                    return Err(RuntimeError::type_error(
                        "replace() expects three strings",
                        line,
                    )
                    .into());
                };
                Ok(Value::Str(text.replace(from.as_str(), to)))
            }
            Builtin::Abs => match &args[0] {
                Value::Int(value) => Ok(Value::Int(value.abs())),
                Value::Float(value) => Ok(Value::Float(value.abs())),
                other => Err(RuntimeError::type_error(
                    format!("abs() expects a number, got {}", other.type_name()),
                    line,
                )
                .into()),
            },
            Builtin::Round => {
                let Value::Int(digits) = &args[1] else {
                    return Err(RuntimeError::type_error(
                        "round() digits must be an integer",
                        line,
                    )
                    .into());
                };
                match &args[0] {
                    Value::Int(value) => Ok(Value::Int(*value)),
                    Value::Float(value) => {
                        let factor = 10f64.powi(*digits as i32);
                        Ok(Value::Float((value * factor).round() / factor))
                    }
                    other => Err(RuntimeError::type_error(
                        format!("round() expects a number, got {}", other.type_name()),
                        line,
                    )
                    .into()),
                }
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn expected_list(name: &str, got: &Value, line: usize) -> Unwind {
    RuntimeError::type_error(
        format!("{name}() expects a list, got {}", got.type_name()),
        line,
    )
    .into()
}

fn expected_string(name: &str, got: &Value, line: usize) -> Unwind {
    RuntimeError::type_error(
        format!("{name}() expects a string, got {}", got.type_name()),
        line,
    )
    .into()
}

/// Validate an integer index against `len`; negative indices are rejected.
fn list_position(index: &Value, len: usize, line: usize) -> Result<usize, RuntimeError> {
    let Value::Int(index) = index else {
        return Err(RuntimeError::type_error(
            format!("index must be an integer, got {}", index.type_name()),
            line,
        ));
    };
    if *index < 0 {
        return Err(RuntimeError::index_error(
            format!("index must be non-negative, got {index}"),
            line,
        ));
    }
    let position = *index as usize;
    if position >= len {
        return Err(RuntimeError::index_error(
            format!("index {position} out of bounds for length {len}"),
            line,
        ));
    }
    Ok(position)
}

/// Like [`list_position`] but `len` itself is a legal target (append point).
fn insert_position(index: &Value, len: usize, line: usize) -> Result<usize, RuntimeError> {
    let Value::Int(index) = index else {
        return Err(RuntimeError::type_error(
            format!("index must be an integer, got {}", index.type_name()),
            line,
        ));
    };
    if *index < 0 {
        return Err(RuntimeError::index_error(
            format!("index must be non-negative, got {index}"),
            line,
        ));
    }
    let position = (*index as usize).min(len);
    Ok(position)
}

/// Runtime binary operator semantics. Mirrors the analyzer's rules over the
/// actual value tags; integer arithmetic stays integral, any float operand
/// promotes the result.
fn binary_op(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    line: usize,
) -> Result<Value, RuntimeError> {
    if op.is_equality() {
        let equal = values_equal(left, right);
        return Ok(Value::Bool(if op == BinaryOperator::Equal {
            equal
        } else {
            !equal
        }));
    }

    if op == BinaryOperator::Add {
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => return Ok(Value::Str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                let mut combined = a.borrow().clone();
                combined.extend(b.borrow().iter().cloned());
                return Ok(Value::list(combined));
            }
            _ => {}
        }
    }

    if op.is_comparison() {
        let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
            return Err(RuntimeError::type_error(
                format!(
                    "cannot compare {} and {} with '{}'",
                    left.type_name(),
                    right.type_name(),
                    op.symbol()
                ),
                line,
            ));
        };
        let result = match op {
            BinaryOperator::Greater => a > b,
            BinaryOperator::Less => a < b,
            BinaryOperator::GreaterEqual => a >= b,
            BinaryOperator::LessEqual => a <= b,
            _ => unreachable!("comparison operators are exhaustive"),
        };
        return Ok(Value::Bool(result));
    }

    // Remaining cases are arithmetic over numbers.
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b, line),
        _ => {
            let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
                return Err(RuntimeError::type_error(
                    format!(
                        "unsupported operand types for '{}': {} and {}",
                        op.symbol(),
                        left.type_name(),
                        right.type_name()
                    ),
                    line,
                ));
            };
            float_arithmetic(op, a, b, line)
        }
    }
}

fn int_arithmetic(op: BinaryOperator, a: i64, b: i64, line: usize) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            a / b
        }
        BinaryOperator::Mod => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            a % b
        }
        _ => unreachable!("arithmetic operators are exhaustive"),
    };
    Ok(Value::Int(result))
}

fn float_arithmetic(
    op: BinaryOperator,
    a: f64,
    b: f64,
    line: usize,
) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            a / b
        }
        BinaryOperator::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            a % b
        }
        _ => unreachable!("arithmetic operators are exhaustive"),
    };
    Ok(Value::Float(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;
    use std::io::Cursor;

    fn run(source: &str) -> String {
        let tokens = tokenize(source).expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        let mut interpreter = Interpreter::new();
        interpreter.execute(&program).expect("execution failed");
        interpreter.take_output()
    }

    fn run_err(source: &str) -> RuntimeError {
        let tokens = tokenize(source).expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        let mut interpreter = Interpreter::new();
        interpreter
            .execute(&program)
            .expect_err("expected runtime error")
    }

    #[test]
    fn prints_concatenated_strings() {
        assert_eq!(
            run("maan naam = \"Duniya\"\nlikho(\"Namaste, \" + naam + \"!\")"),
            "Namaste, Duniya!\n"
        );
    }

    #[test]
    fn block_scopes_shadow_and_restore() {
        let output = run(indoc! {"
            maan x = 10
            { maan x = x + 5  likho(x) }
            likho(x)
        "});
        assert_eq!(output, "15\n10\n");
    }

    #[test]
    fn integer_division_stays_integral_and_floats_promote() {
        assert_eq!(run("likho(7 / 2)"), "3\n");
        assert_eq!(run("likho(7.0 / 2)"), "3.5\n");
        assert_eq!(run("likho(7 % 3)"), "1\n");
    }

    #[test]
    fn division_by_zero_is_an_error_not_a_nan() {
        assert!(matches!(
            run_err("likho(1 / 0)"),
            RuntimeError::DivisionByZero { line: 1 }
        ));
        assert!(matches!(
            run_err("likho(1.5 / 0)"),
            RuntimeError::DivisionByZero { .. }
        ));
    }

    #[test]
    fn while_loop_with_break_and_continue() {
        let output = run(indoc! {"
            maan i = 0
            maan total = 0
            jab_tak sach {
                i = i + 1
                agar i > 5 { ruk }
                agar i % 2 == 0 { age_badho }
                total = total + i
            }
            likho(total)
        "});
        assert_eq!(output, "9\n");
    }

    #[test]
    fn break_exits_only_the_innermost_loop() {
        let output = run(indoc! {"
            maan lines = 0
            har i mein [1, 2] {
                har j mein [1, 2, 3] {
                    agar j == 2 { ruk }
                    lines = lines + 1
                }
            }
            likho(lines)
        "});
        assert_eq!(output, "2\n");
    }

    #[test]
    fn closures_capture_their_defining_scope() {
        let output = run(indoc! {"
            kaam make_adder(n) { wapas lambda(x) -> x + n }
            maan add5 = make_adder(5)
            likho(add5(3))
        "});
        assert_eq!(output, "8\n");
    }

    #[test]
    fn closure_reads_defining_scope_not_calling_scope() {
        let output = run(indoc! {"
            maan n = 100
            kaam make() { maan n = 1 wapas lambda(x) -> x + n }
            maan f = make()
            likho(f(0))
        "});
        assert_eq!(output, "1\n");
    }

    #[test]
    fn inheritance_and_super_constructor() {
        let output = run(indoc! {"
            class A { kaam __init__(n) { yeh.n = n } kaam who() { likho(\"A:\" + str(yeh.n)) } }
            class B extends A { kaam __init__(n) { upar(n) } }
            maan b = naya B(7)
            b.who()
        "});
        assert_eq!(output, "A:7\n");
    }

    #[test]
    fn method_resolution_walks_the_class_chain() {
        let output = run(indoc! {"
            class A { kaam hello() { wapas \"A\" } }
            class B extends A { }
            likho(naya B().hello())
        "});
        assert_eq!(output, "A\n");
    }

    #[test]
    fn fields_are_created_on_first_assignment() {
        let output = run(indoc! {"
            class P { }
            maan p = naya P()
            p.naam = \"Meera\"
            likho(p.naam)
        "});
        assert_eq!(output, "Meera\n");
    }

    #[test]
    fn try_catch_finally_ordering() {
        let output = run(indoc! {r#"
            koshish { uchalo "boom" } pakad e { likho("caught:" + e) } aakhir { likho("fin") }
        "#});
        assert_eq!(output, "caught:boom\nfin\n");
    }

    #[test]
    fn finally_runs_on_the_normal_path_too() {
        let output = run("koshish { likho(\"ok\") } pakad e { likho(\"no\") } aakhir { likho(\"fin\") }");
        assert_eq!(output, "ok\nfin\n");
    }

    #[test]
    fn runtime_errors_are_catchable_by_pakad() {
        let output = run(indoc! {"
            koshish { likho(1 / 0) } pakad e { likho(\"caught\") }
            likho(\"after\")
        "});
        assert_eq!(output, "caught\nafter\n");
    }

    #[test]
    fn uncaught_throw_halts_with_user_exception() {
        assert!(matches!(
            run_err("uchalo \"bhago\""),
            RuntimeError::UserException { .. }
        ));
    }

    #[test]
    fn finally_runs_before_return_resumes() {
        let output = run(indoc! {"
            kaam f() {
                koshish { wapas 1 } pakad e { likho(\"no\") } aakhir { likho(\"fin\") }
            }
            likho(f())
        "});
        assert_eq!(output, "fin\n1\n");
    }

    #[test]
    fn recursion_guard_trips_past_the_limit() {
        assert!(matches!(
            run_err("kaam f() { wapas f() }\nf()"),
            RuntimeError::RecursionError { .. }
        ));
    }

    #[test]
    fn deep_but_bounded_recursion_still_works() {
        let output = run(indoc! {"
            kaam count(n) { agar n == 0 { wapas 0 } wapas 1 + count(n - 1) }
            likho(count(500))
        "});
        assert_eq!(output, "500\n");
    }

    #[test]
    fn logical_operators_short_circuit() {
        let output = run(indoc! {"
            kaam boom() { uchalo \"nahi chalega\" }
            likho(jhoot aur boom())
            likho(sach ya boom())
        "});
        assert_eq!(output, "jhoot\nsach\n");
    }

    #[test]
    fn for_each_over_list_string_and_dict_keys() {
        assert_eq!(run("har x mein [1, 2, 3] { likho_online(x) }"), "123");
        assert_eq!(run("har c mein \"ab\" { likho(c) }"), "a\nb\n");
        assert_eq!(
            run("har k mein {\"a\": 1, \"b\": 2} { likho_online(k) }"),
            "ab"
        );
    }

    #[test]
    fn list_and_dict_indexing() {
        assert_eq!(run("maan xs = [1, 2, 3]\nxs[1] = 20\nlikho(xs[1] + xs[2])"), "23\n");
        assert_eq!(
            run("maan d = {\"k\": 1}\nd[\"j\"] = 2\nlikho(d[\"k\"] + d[\"j\"])"),
            "3\n"
        );
    }

    #[test]
    fn index_errors() {
        assert!(matches!(
            run_err("maan xs = [1]\nlikho(xs[5])"),
            RuntimeError::IndexError { line: 2, .. }
        ));
        assert!(matches!(
            run_err("maan d = {}\nlikho(d[\"missing\"])"),
            RuntimeError::IndexError { .. }
        ));
        assert!(matches!(
            run_err("maan xs = [1]\nlikho(xs[-1])"),
            RuntimeError::IndexError { .. }
        ));
    }

    #[test]
    fn builtin_collection_functions() {
        let output = run(indoc! {"
            maan xs = [3, 1, 2]
            sort(xs)
            likho(xs)
            reverse(xs)
            likho(xs)
            append(xs, 9)
            likho(length(xs), sum(xs), min(xs), max(xs))
            likho(pop(xs, 0))
            insert(xs, 0, 7)
            likho(xs)
        "});
        assert_eq!(
            output,
            "[1, 2, 3]\n[3, 2, 1]\n4 15 1 9\n3\n[7, 2, 1, 9]\n"
        );
    }

    #[test]
    fn builtin_string_functions() {
        let output = run(indoc! {r#"
            likho(upper("ab"), lower("CD"))
            likho(split("a,b,c", ","))
            likho(join([1, 2], "-"))
            likho(replace("maan", "aa", "ee"))
        "#});
        assert_eq!(output, "AB cd\n[a, b, c]\n1-2\nmeen\n");
    }

    #[test]
    fn builtin_conversions_and_math() {
        let output = run(indoc! {"
            likho(int(\"42\") + 1)
            likho(float(3) / 2)
            likho(str(5) + \"!\")
            likho(bool(0), bool(\"x\"))
            likho(type(5), type(\"a\"), type([1]))
            likho(abs(-4), round(3.567, 2))
            likho(range(4))
        "});
        assert_eq!(
            output,
            "43\n1.5\n5!\njhoot sach\nnumber string list\n4 3.57\n[0, 1, 2, 3]\n"
        );
    }

    #[test]
    fn poocho_reads_from_the_provided_input() {
        let tokens = tokenize("poocho naam \"Naam? \"\nlikho(\"Namaste, \" + naam)")
            .expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        let mut interpreter = Interpreter::with_input(Box::new(Cursor::new("Meera\n")));
        interpreter.execute(&program).expect("execution failed");
        assert_eq!(interpreter.take_output(), "Naam? Namaste, Meera\n");
    }

    #[test]
    fn undefined_name_is_a_name_error() {
        assert!(matches!(
            run_err("likho(ajnabi)"),
            RuntimeError::NameError { line: 1, .. }
        ));
    }

    #[test]
    fn calling_a_non_callable_is_a_type_error() {
        assert!(matches!(
            run_err("maan x = 5\nx()"),
            RuntimeError::TypeError { .. }
        ));
    }

    #[test]
    fn wrong_arity_at_runtime_is_a_type_error() {
        assert!(matches!(
            run_err("kaam f(a) { wapas a }\nf(1, 2)"),
            RuntimeError::TypeError { .. }
        ));
    }

    #[test]
    fn string_times_number_is_a_type_error() {
        assert!(matches!(
            run_err("likho(\"ab\" * 2)"),
            RuntimeError::TypeError { .. }
        ));
    }

    #[test]
    fn import_is_a_no_op() {
        assert_eq!(run("lao ganit\nlikho(\"done\")"), "done\n");
    }

    #[test]
    fn likho_online_stays_on_one_line() {
        assert_eq!(run("likho_online(\"a\")\nlikho_online(\"b\")\nlikho(\"c\")"), "abc\n");
    }

    #[test]
    fn executing_twice_produces_the_same_output() {
        let tokens = tokenize("likho(1 + 2)").expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        let mut interpreter = Interpreter::new();
        interpreter.execute(&program).expect("first run failed");
        let first = interpreter.take_output();
        interpreter.execute(&program).expect("second run failed");
        assert_eq!(first, interpreter.take_output());
    }
}
