//! AST → three-address code lowering.
//!
//! Every expression lowers to instructions that leave the result in a fresh
//! temp, evaluated left to right; statements lower to instructions with no
//! result. The listing is diagnostic only and is never executed.

use crate::ast::{
    BinaryOperator, Expression, FunctionDef, Number, Program, Statement,
};
use crate::ir::{Instr, IrProgram, Label, Operand, Temp};

pub struct IrGenerator {
    program: IrProgram,
    next_temp: u32,
    next_label: u32,
    next_lambda: u32,
    /// (continue target, break target) for each enclosing loop.
    loop_stack: Vec<(Label, Label)>,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self {
            program: IrProgram::new(),
            next_temp: 0,
            next_label: 0,
            next_lambda: 0,
            loop_stack: Vec::new(),
        }
    }

    pub fn generate(mut self, program: &Program) -> IrProgram {
        for statement in &program.statements {
            self.lower_statement(statement);
        }
        self.program
    }

    fn emit(&mut self, instr: Instr) {
        self.program.push(instr);
    }

    fn fresh_temp(&mut self) -> Temp {
        let temp = Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    fn fresh_label(&mut self, hint: &str) -> Label {
        let label = Label(format!("{hint}{}", self.next_label));
        self.next_label += 1;
        label
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn lower_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VarDecl { name, value, .. } | Statement::Assign { name, value, .. } => {
                let value = self.lower_expression(value);
                self.emit(Instr::Copy {
                    dest: Operand::Name(name.clone()),
                    src: value,
                });
            }
            Statement::IndexAssign {
                target,
                index,
                value,
                ..
            } => {
                let object = self.lower_expression(target);
                let index = self.lower_expression(index);
                let value = self.lower_expression(value);
                self.emit(Instr::IndexStore {
                    object,
                    index,
                    value,
                });
            }
            Statement::PropertyAssign {
                target,
                property,
                value,
                ..
            } => {
                let object = self.lower_expression(target);
                let value = self.lower_expression(value);
                self.emit(Instr::FieldStore {
                    object,
                    field: property.clone(),
                    value,
                });
            }
            Statement::If {
                condition,
                then_body,
                elif_branches,
                else_body,
                ..
            } => self.lower_if(condition, then_body, elif_branches, else_body.as_deref()),
            Statement::While {
                condition, body, ..
            } => self.lower_while(condition, body),
            Statement::ForEach {
                variable,
                iterable,
                body,
                ..
            } => self.lower_for_each(variable, iterable, body),
            Statement::Break { .. } => {
                if let Some((_, break_label)) = self.loop_stack.last() {
                    let target = break_label.clone();
                    self.emit(Instr::Jump { target });
                }
            }
            Statement::Continue { .. } => {
                if let Some((continue_label, _)) = self.loop_stack.last() {
                    let target = continue_label.clone();
                    self.emit(Instr::Jump { target });
                }
            }
            Statement::FunctionDef(def) => self.lower_function_def(def),
            Statement::Return { value, .. } => {
                let value = value.as_ref().map(|value| self.lower_expression(value));
                self.emit(Instr::Return { value });
            }
            Statement::ClassDef { name, methods, .. } => {
                // Method bodies are emitted out of line; execution jumps over
                // the whole class block.
                let class_label = self.fresh_label(&format!("class_{name}_"));
                let end_label = self.fresh_label(&format!("class_{name}_end_"));
                self.emit(Instr::Jump {
                    target: end_label.clone(),
                });
                self.emit(Instr::Label(class_label));
                for method in methods {
                    self.lower_function_def(method);
                }
                self.emit(Instr::Label(end_label));
            }
            Statement::Try {
                body,
                catch_var,
                catch_body,
                finally_body,
                ..
            } => self.lower_try(body, catch_var, catch_body, finally_body.as_deref()),
            Statement::Throw { value, .. } => {
                let value = self.lower_expression(value);
                self.emit(Instr::Throw { value });
            }
            Statement::Print { args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| self.lower_expression(arg))
                    .collect::<Vec<_>>();
                self.emit(Instr::Print { args });
            }
            Statement::Input {
                variable, prompt, ..
            } => {
                let prompt = prompt.clone().map(Operand::Str);
                self.emit(Instr::Input {
                    variable: variable.clone(),
                    prompt,
                });
            }
            Statement::Import { module, .. } => {
                let temp = self.fresh_temp();
                self.emit(Instr::Assign {
                    result: temp,
                    value: Operand::Str(module.clone()),
                });
                self.emit(Instr::Param {
                    value: Operand::Temp(temp),
                });
                self.emit(Instr::Call {
                    result: None,
                    name: "__import__".to_string(),
                    arg_count: 1,
                });
            }
            Statement::Block { body, .. } => {
                for statement in body {
                    self.lower_statement(statement);
                }
            }
            Statement::Expr(expr) => {
                self.lower_expression(expr);
            }
        }
    }

    fn lower_if(
        &mut self,
        condition: &Expression,
        then_body: &[Statement],
        elif_branches: &[(Expression, Vec<Statement>)],
        else_body: Option<&[Statement]>,
    ) {
        let then_label = self.fresh_label("then_");
        let end_label = self.fresh_label("if_end_");
        let elif_labels = elif_branches
            .iter()
            .map(|_| self.fresh_label("elif_"))
            .collect::<Vec<_>>();
        let else_label = else_body.map(|_| self.fresh_label("else_"));

        let first_false = elif_labels
            .first()
            .or(else_label.as_ref())
            .unwrap_or(&end_label)
            .clone();

        let condition = self.lower_expression(condition);
        self.emit(Instr::CondJump {
            condition,
            true_label: then_label.clone(),
            false_label: first_false,
        });

        self.emit(Instr::Label(then_label));
        for statement in then_body {
            self.lower_statement(statement);
        }
        self.emit(Instr::Jump {
            target: end_label.clone(),
        });

        for (index, (elif_condition, elif_body)) in elif_branches.iter().enumerate() {
            self.emit(Instr::Label(elif_labels[index].clone()));
            let condition = self.lower_expression(elif_condition);
            let next_false = elif_labels
                .get(index + 1)
                .or(else_label.as_ref())
                .unwrap_or(&end_label)
                .clone();
            let body_label = self.fresh_label("elif_body_");
            self.emit(Instr::CondJump {
                condition,
                true_label: body_label.clone(),
                false_label: next_false,
            });
            self.emit(Instr::Label(body_label));
            for statement in elif_body {
                self.lower_statement(statement);
            }
            self.emit(Instr::Jump {
                target: end_label.clone(),
            });
        }

        if let (Some(else_label), Some(else_body)) = (else_label, else_body) {
            self.emit(Instr::Label(else_label));
            for statement in else_body {
                self.lower_statement(statement);
            }
        }

        self.emit(Instr::Label(end_label));
    }

    fn lower_while(&mut self, condition: &Expression, body: &[Statement]) {
        let loop_start = self.fresh_label("while_start_");
        let loop_body = self.fresh_label("while_body_");
        let loop_end = self.fresh_label("while_end_");

        self.loop_stack.push((loop_start.clone(), loop_end.clone()));

        self.emit(Instr::Label(loop_start.clone()));
        let condition = self.lower_expression(condition);
        self.emit(Instr::CondJump {
            condition,
            true_label: loop_body.clone(),
            false_label: loop_end.clone(),
        });
        self.emit(Instr::Label(loop_body));
        for statement in body {
            self.lower_statement(statement);
        }
        self.emit(Instr::Jump { target: loop_start });
        self.emit(Instr::Label(loop_end));

        self.loop_stack.pop();
    }

    /// `har x mein xs { … }` lowers through an index counter:
    /// `idx = 0; while idx < length(xs) { x = xs[idx]; …; idx = idx + 1 }`.
    /// `age_badho` jumps to the increment so the loop still advances.
    fn lower_for_each(&mut self, variable: &str, iterable: &Expression, body: &[Statement]) {
        let loop_start = self.fresh_label("for_start_");
        let loop_body = self.fresh_label("for_body_");
        let loop_inc = self.fresh_label("for_inc_");
        let loop_end = self.fresh_label("for_end_");

        let iterable = self.lower_expression(iterable);
        let index = self.fresh_temp();
        self.emit(Instr::Assign {
            result: index,
            value: Operand::Int(0),
        });

        self.loop_stack.push((loop_inc.clone(), loop_end.clone()));

        self.emit(Instr::Label(loop_start.clone()));
        let length = self.fresh_temp();
        self.emit(Instr::Param {
            value: iterable.clone(),
        });
        self.emit(Instr::Call {
            result: Some(length),
            name: "length".to_string(),
            arg_count: 1,
        });
        let condition = self.fresh_temp();
        self.emit(Instr::BinOp {
            result: condition,
            op: BinaryOperator::Less,
            left: Operand::Temp(index),
            right: Operand::Temp(length),
        });
        self.emit(Instr::CondJump {
            condition: Operand::Temp(condition),
            true_label: loop_body.clone(),
            false_label: loop_end.clone(),
        });

        self.emit(Instr::Label(loop_body));
        let element = self.fresh_temp();
        self.emit(Instr::IndexLoad {
            result: element,
            object: iterable,
            index: Operand::Temp(index),
        });
        self.emit(Instr::Copy {
            dest: Operand::Name(variable.to_string()),
            src: Operand::Temp(element),
        });
        for statement in body {
            self.lower_statement(statement);
        }

        self.emit(Instr::Label(loop_inc));
        let bumped = self.fresh_temp();
        self.emit(Instr::BinOp {
            result: bumped,
            op: BinaryOperator::Add,
            left: Operand::Temp(index),
            right: Operand::Int(1),
        });
        self.emit(Instr::Copy {
            dest: Operand::Temp(index),
            src: Operand::Temp(bumped),
        });
        self.emit(Instr::Jump { target: loop_start });
        self.emit(Instr::Label(loop_end));

        self.loop_stack.pop();
    }

    fn lower_function_def(&mut self, def: &FunctionDef) {
        self.emit(Instr::FuncLabel {
            name: def.name.clone(),
        });
        // Parameters arrive through the calling convention as named variables.
        for statement in &def.body {
            self.lower_statement(statement);
        }
        self.emit(Instr::Return { value: None });
    }

    fn lower_try(
        &mut self,
        body: &[Statement],
        catch_var: &str,
        catch_body: &[Statement],
        finally_body: Option<&[Statement]>,
    ) {
        let catch_label = self.fresh_label("catch_");
        let finally_label = finally_body.map(|_| self.fresh_label("finally_"));
        let end_label = self.fresh_label("try_end_");
        let after_catch = finally_label.clone().unwrap_or_else(|| end_label.clone());

        self.emit(Instr::TryBegin {
            catch_label: catch_label.clone(),
            finally_label: finally_label.clone(),
        });
        for statement in body {
            self.lower_statement(statement);
        }
        self.emit(Instr::TryEnd);
        self.emit(Instr::Jump {
            target: after_catch.clone(),
        });

        self.emit(Instr::Label(catch_label));
        self.emit(Instr::CatchBegin {
            variable: catch_var.to_string(),
        });
        for statement in catch_body {
            self.lower_statement(statement);
        }
        self.emit(Instr::Jump {
            target: after_catch,
        });

        if let (Some(finally_label), Some(finally_body)) = (finally_label, finally_body) {
            self.emit(Instr::Label(finally_label));
            for statement in finally_body {
                self.lower_statement(statement);
            }
        }

        self.emit(Instr::Label(end_label));
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn lower_expression(&mut self, expr: &Expression) -> Operand {
        match expr {
            Expression::Number { value, .. } => {
                let literal = match value {
                    Number::Int(value) => Operand::Int(*value),
                    Number::Float(value) => Operand::Float(*value),
                };
                self.load_literal(literal)
            }
            Expression::Str { value, .. } => self.load_literal(Operand::Str(value.clone())),
            Expression::Boolean { value, .. } => self.load_literal(Operand::Bool(*value)),
            Expression::Khaali { .. } => self.load_literal(Operand::Khaali),
            Expression::List { elements, .. } => {
                let element_temps = elements
                    .iter()
                    .map(|element| self.lower_expression(element))
                    .collect::<Vec<_>>();
                for value in element_temps {
                    self.emit(Instr::Param { value });
                }
                let result = self.fresh_temp();
                self.emit(Instr::Call {
                    result: Some(result),
                    name: "__list__".to_string(),
                    arg_count: elements.len(),
                });
                Operand::Temp(result)
            }
            Expression::Dict { pairs, .. } => {
                for (key, value) in pairs {
                    let key = self.lower_expression(key);
                    let value = self.lower_expression(value);
                    self.emit(Instr::Param { value: key });
                    self.emit(Instr::Param { value });
                }
                let result = self.fresh_temp();
                self.emit(Instr::Call {
                    result: Some(result),
                    name: "__dict__".to_string(),
                    arg_count: pairs.len() * 2,
                });
                Operand::Temp(result)
            }
            Expression::Variable { name, .. } => {
                let result = self.fresh_temp();
                self.emit(Instr::Copy {
                    dest: Operand::Temp(result),
                    src: Operand::Name(name.clone()),
                });
                Operand::Temp(result)
            }
            Expression::BinaryOp {
                op, left, right, ..
            } => {
                let left = self.lower_expression(left);
                let right = self.lower_expression(right);
                let result = self.fresh_temp();
                self.emit(Instr::BinOp {
                    result,
                    op: *op,
                    left,
                    right,
                });
                Operand::Temp(result)
            }
            Expression::UnaryOp { op, operand, .. } => {
                let operand = self.lower_expression(operand);
                let result = self.fresh_temp();
                self.emit(Instr::UnaryOp {
                    result,
                    op: *op,
                    operand,
                });
                Operand::Temp(result)
            }
            Expression::Parenthesized { inner, .. } => self.lower_expression(inner),
            Expression::Call { callee, args, .. } => {
                let name = match callee.as_ref() {
                    Expression::Variable { name, .. } => name.clone(),
                    other => {
                        // Computed callee: evaluate it into a temp and call
                        // through that temp's name.
                        self.lower_expression(other).to_string()
                    }
                };
                for arg in args {
                    let value = self.lower_expression(arg);
                    self.emit(Instr::Param { value });
                }
                let result = self.fresh_temp();
                self.emit(Instr::Call {
                    result: Some(result),
                    name,
                    arg_count: args.len(),
                });
                Operand::Temp(result)
            }
            Expression::Lambda { body, .. } => {
                // Anonymous functions become auto-named blocks jumped over at
                // definition time; the closure value is the block's name.
                let name = format!("__lambda_{}__", self.next_lambda);
                self.next_lambda += 1;
                let end_label = self.fresh_label("lambda_end_");
                self.emit(Instr::Jump {
                    target: end_label.clone(),
                });
                self.emit(Instr::FuncLabel { name: name.clone() });
                let body = self.lower_expression(body);
                self.emit(Instr::Return { value: Some(body) });
                self.emit(Instr::Label(end_label));
                let result = self.fresh_temp();
                self.emit(Instr::Assign {
                    result,
                    value: Operand::Name(name),
                });
                Operand::Temp(result)
            }
            Expression::NewObject {
                class_name, args, ..
            } => {
                let result = self.fresh_temp();
                self.emit(Instr::NewObj {
                    result,
                    class_name: class_name.clone(),
                });
                for arg in args {
                    let value = self.lower_expression(arg);
                    self.emit(Instr::Param { value });
                }
                let init_result = self.fresh_temp();
                self.emit(Instr::Call {
                    result: Some(init_result),
                    name: format!("{class_name}.__init__"),
                    arg_count: args.len(),
                });
                Operand::Temp(result)
            }
            Expression::MethodCall {
                target,
                method,
                args,
                ..
            } => {
                let object = self.lower_expression(target);
                // The receiver travels as an implicit leading parameter.
                self.emit(Instr::Param { value: object });
                for arg in args {
                    let value = self.lower_expression(arg);
                    self.emit(Instr::Param { value });
                }
                let result = self.fresh_temp();
                self.emit(Instr::Call {
                    result: Some(result),
                    name: method.clone(),
                    arg_count: args.len() + 1,
                });
                Operand::Temp(result)
            }
            Expression::PropertyAccess {
                target, property, ..
            } => {
                let object = self.lower_expression(target);
                let result = self.fresh_temp();
                self.emit(Instr::FieldLoad {
                    result,
                    object,
                    field: property.clone(),
                });
                Operand::Temp(result)
            }
            Expression::Yeh { .. } => {
                let result = self.fresh_temp();
                self.emit(Instr::Copy {
                    dest: Operand::Temp(result),
                    src: Operand::Name("__self__".to_string()),
                });
                Operand::Temp(result)
            }
            Expression::Super { args, .. } => {
                for arg in args {
                    let value = self.lower_expression(arg);
                    self.emit(Instr::Param { value });
                }
                let result = self.fresh_temp();
                self.emit(Instr::Call {
                    result: Some(result),
                    name: "__super__.__init__".to_string(),
                    arg_count: args.len(),
                });
                Operand::Temp(result)
            }
            Expression::Index { target, index, .. } => {
                let object = self.lower_expression(target);
                let index = self.lower_expression(index);
                let result = self.fresh_temp();
                self.emit(Instr::IndexLoad {
                    result,
                    object,
                    index,
                });
                Operand::Temp(result)
            }
        }
    }

    fn load_literal(&mut self, value: Operand) -> Operand {
        let result = self.fresh_temp();
        self.emit(Instr::Assign { result, value });
        Operand::Temp(result)
    }
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;
    use std::collections::HashSet;

    fn lower(source: &str) -> IrProgram {
        let tokens = tokenize(source).expect("tokenize failed");
        let program = parse_tokens(tokens).expect("parse failed");
        IrGenerator::new().generate(&program)
    }

    #[test]
    fn lowers_arithmetic_declaration() {
        let ir = lower("maan x = 3 + 4");
        assert_eq!(
            ir.dump(),
            indoc! {"
                t0 = 3
                t1 = 4
                t2 = t0 + t1
                x = t2"
            }
        );
    }

    #[test]
    fn lowers_while_loop_with_labels() {
        let ir = lower("maan i = 0\njab_tak i < 10 { maan i = i + 1 }");
        let dump = ir.dump();
        assert!(dump.contains("while_start_0:"));
        assert!(dump.contains("IF t3 GOTO while_body_1 ELSE while_end_2"));
        assert!(dump.contains("GOTO while_start_0"));
    }

    #[test]
    fn break_and_continue_jump_to_loop_labels() {
        let ir = lower("jab_tak sach { ruk }");
        let dump = ir.dump();
        assert!(dump.contains("GOTO while_end_2"));

        let ir = lower("jab_tak sach { age_badho }");
        let dump = ir.dump();
        // Once for continue, once for the loop back-edge.
        assert_eq!(dump.matches("GOTO while_start_0").count(), 2);
    }

    #[test]
    fn function_calls_push_params_left_to_right() {
        let ir = lower("kaam add(a, b) { wapas a + b }\nmaan s = add(1, 2)");
        let dump = ir.dump();
        assert!(dump.contains("FUNC add:"));
        let param_positions = dump
            .lines()
            .enumerate()
            .filter(|(_, line)| line.starts_with("PARAM"))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        assert_eq!(param_positions.len(), 2);
        assert!(dump.contains("CALL add 2"));
    }

    #[test]
    fn for_each_lowers_to_index_counter_loop() {
        let ir = lower("har x mein [1, 2] { likho(x) }");
        let dump = ir.dump();
        assert!(dump.contains("CALL __list__ 2"));
        assert!(dump.contains("CALL length 1"));
        assert!(dump.contains("for_start_0:"));
        assert!(dump.contains("for_inc_2:"));
        // Element load and write-back to the loop variable.
        assert!(dump.contains("x = "));
    }

    #[test]
    fn try_lowering_brackets_the_protected_region() {
        let ir = lower("koshish { uchalo \"x\" } pakad e { likho(e) } aakhir { likho(1) }");
        let dump = ir.dump();
        assert!(dump.contains("TRY_BEGIN catch=catch_0 finally=finally_1"));
        assert!(dump.contains("TRY_END"));
        assert!(dump.contains("CATCH AS e"));
        assert!(dump.contains("finally_1:"));
        assert!(dump.contains("try_end_2:"));
    }

    #[test]
    fn temps_are_unique_within_a_program() {
        let ir = lower(indoc! {"
            maan x = 1 + 2 * 3
            kaam f(a) { wapas a }
            likho(f(x), [1, 2], {\"k\": 1})
        "});
        let mut seen = HashSet::new();
        for instr in &ir.instructions {
            let result = match instr {
                Instr::Assign { result, .. }
                | Instr::BinOp { result, .. }
                | Instr::UnaryOp { result, .. }
                | Instr::NewObj { result, .. }
                | Instr::FieldLoad { result, .. }
                | Instr::IndexLoad { result, .. } => Some(*result),
                Instr::Call { result, .. } => *result,
                _ => None,
            };
            if let Some(result) = result {
                assert!(seen.insert(result), "temp {result} allocated twice");
            }
        }
        assert!(!seen.is_empty());
    }

    #[test]
    fn lambda_lowering_jumps_over_the_body() {
        let ir = lower("maan f = lambda(x) -> x + 1");
        let dump = ir.dump();
        assert!(dump.contains("FUNC __lambda_0__:"));
        assert!(dump.contains("GOTO lambda_end_0"));
        assert!(dump.contains("f = "));
    }
}
