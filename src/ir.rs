//! Three-address code instruction set.
//!
//! The IR is a flat, append-only listing produced from the AST for diagnostic
//! dumps. Each instruction has at most one operator and up to three operands.
//! Temps are `t0, t1, …` and unique within one program; labels are generated
//! per construct from a hint plus a global counter.

use std::fmt;

use crate::ast::{BinaryOperator, UnaryOperator};

/// Compiler-generated temporary, rendered `t0`, `t1`, …
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp(pub u32);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Jump target, e.g. `while_start_0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that can appear in an operand position.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Temp(Temp),
    /// A source-level variable or function name.
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Khaali,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(temp) => write!(f, "{temp}"),
            Operand::Name(name) => write!(f, "{name}"),
            Operand::Int(value) => write!(f, "{value}"),
            Operand::Float(value) => write!(f, "{value}"),
            Operand::Str(value) => write!(f, "{value:?}"),
            Operand::Bool(value) => write!(f, "{}", if *value { "sach" } else { "jhoot" }),
            Operand::Khaali => write!(f, "khaali"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// `t0 = 3` — load a literal into a temp.
    Assign { result: Temp, value: Operand },
    /// `x = t2` or `t4 = x` — copy between a named variable and a temp.
    Copy { dest: Operand, src: Operand },
    /// `t2 = t0 + t1`
    BinOp {
        result: Temp,
        op: BinaryOperator,
        left: Operand,
        right: Operand,
    },
    /// `t1 = - t0`
    UnaryOp {
        result: Temp,
        op: UnaryOperator,
        operand: Operand,
    },
    Label(Label),
    /// `GOTO L`
    Jump { target: Label },
    /// `IF t0 GOTO a ELSE b`
    CondJump {
        condition: Operand,
        true_label: Label,
        false_label: Label,
    },
    /// `FUNC add:`
    FuncLabel { name: String },
    /// `PARAM t0` — push one argument before a call.
    Param { value: Operand },
    /// `t3 = CALL add 2`
    Call {
        result: Option<Temp>,
        name: String,
        arg_count: usize,
    },
    Return { value: Option<Operand> },
    /// `t5 = NEW Person`
    NewObj { result: Temp, class_name: String },
    FieldLoad {
        result: Temp,
        object: Operand,
        field: String,
    },
    FieldStore {
        object: Operand,
        field: String,
        value: Operand,
    },
    IndexLoad {
        result: Temp,
        object: Operand,
        index: Operand,
    },
    IndexStore {
        object: Operand,
        index: Operand,
        value: Operand,
    },
    Print { args: Vec<Operand> },
    Input {
        variable: String,
        prompt: Option<Operand>,
    },
    Throw { value: Operand },
    TryBegin {
        catch_label: Label,
        finally_label: Option<Label>,
    },
    TryEnd,
    CatchBegin { variable: String },
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Assign { result, value } => write!(f, "{result} = {value}"),
            Instr::Copy { dest, src } => write!(f, "{dest} = {src}"),
            Instr::BinOp {
                result,
                op,
                left,
                right,
            } => write!(f, "{result} = {left} {} {right}", op.symbol()),
            Instr::UnaryOp {
                result,
                op,
                operand,
            } => write!(f, "{result} = {} {operand}", op.symbol()),
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Jump { target } => write!(f, "GOTO {target}"),
            Instr::CondJump {
                condition,
                true_label,
                false_label,
            } => write!(f, "IF {condition} GOTO {true_label} ELSE {false_label}"),
            Instr::FuncLabel { name } => write!(f, "FUNC {name}:"),
            Instr::Param { value } => write!(f, "PARAM {value}"),
            Instr::Call {
                result,
                name,
                arg_count,
            } => match result {
                Some(result) => write!(f, "{result} = CALL {name} {arg_count}"),
                None => write!(f, "CALL {name} {arg_count}"),
            },
            Instr::Return { value } => match value {
                Some(value) => write!(f, "RETURN {value}"),
                None => write!(f, "RETURN"),
            },
            Instr::NewObj { result, class_name } => write!(f, "{result} = NEW {class_name}"),
            Instr::FieldLoad {
                result,
                object,
                field,
            } => write!(f, "{result} = {object}.{field}"),
            Instr::FieldStore {
                object,
                field,
                value,
            } => write!(f, "{object}.{field} = {value}"),
            Instr::IndexLoad {
                result,
                object,
                index,
            } => write!(f, "{result} = {object}[{index}]"),
            Instr::IndexStore {
                object,
                index,
                value,
            } => write!(f, "{object}[{index}] = {value}"),
            Instr::Print { args } => {
                write!(f, "PRINT ")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                Ok(())
            }
            Instr::Input { variable, prompt } => match prompt {
                Some(prompt) => write!(f, "INPUT {variable} {prompt}"),
                None => write!(f, "INPUT {variable}"),
            },
            Instr::Throw { value } => write!(f, "THROW {value}"),
            Instr::TryBegin {
                catch_label,
                finally_label,
            } => match finally_label {
                Some(finally_label) => {
                    write!(f, "TRY_BEGIN catch={catch_label} finally={finally_label}")
                }
                None => write!(f, "TRY_BEGIN catch={catch_label}"),
            },
            Instr::TryEnd => write!(f, "TRY_END"),
            Instr::CatchBegin { variable } => write!(f, "CATCH AS {variable}"),
        }
    }
}

/// The flat instruction listing for one program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IrProgram {
    pub instructions: Vec<Instr>,
}

impl IrProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: Instr) {
        self.instructions.push(instr);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Human-readable listing, one instruction per line.
    pub fn dump(&self) -> String {
        self.instructions
            .iter()
            .map(Instr::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_render_in_listing_form() {
        assert_eq!(
            Instr::BinOp {
                result: Temp(2),
                op: BinaryOperator::Add,
                left: Operand::Temp(Temp(0)),
                right: Operand::Temp(Temp(1)),
            }
            .to_string(),
            "t2 = t0 + t1"
        );
        assert_eq!(
            Instr::CondJump {
                condition: Operand::Temp(Temp(3)),
                true_label: Label("while_body_1".to_string()),
                false_label: Label("while_end_2".to_string()),
            }
            .to_string(),
            "IF t3 GOTO while_body_1 ELSE while_end_2"
        );
        assert_eq!(
            Instr::Call {
                result: Some(Temp(5)),
                name: "add".to_string(),
                arg_count: 2,
            }
            .to_string(),
            "t5 = CALL add 2"
        );
        assert_eq!(Instr::FuncLabel { name: "add".to_string() }.to_string(), "FUNC add:");
    }
}
