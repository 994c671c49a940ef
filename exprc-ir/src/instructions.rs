//! IR Instructions
//!
//! Defines the three-address instruction set and its tuple wire format.
//! Every instruction encodes to `[opcode, operand, ...]`, where the opcode
//! is `<op>_<type>` for typed instructions and one of `jump`, `cbranch`,
//! `extern_func`, `call_func` otherwise.

use exprc_common::{BlockId, Constant, ScalarType};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use crate::ops::{CompareOp, IrBinaryOp, IrUnaryOp};

/// Jump target: a block before linking, an instruction index after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Block(BlockId),
    Address(usize),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Block(id) => write!(f, "@block{id}"),
            Label::Address(addr) => write!(f, "{addr}"),
        }
    }
}

/// A single element of an encoded instruction tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(v) => write!(f, "{v}"),
            Operand::Float(v) => write!(f, "{}", exprc_common::format_float(*v)),
            Operand::Bool(v) => write!(f, "{v}"),
            Operand::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Errors raised while decoding an instruction tuple
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty instruction tuple")]
    Empty,

    #[error("instruction tuple must start with an opcode string")]
    MissingOpcode,

    #[error("'{opcode}' expects {expected} operands, found {found}")]
    WrongArity {
        opcode: String,
        expected: String,
        found: usize,
    },

    #[error("'{opcode}' operand {position} must be {expected}")]
    BadOperand {
        opcode: String,
        position: usize,
        expected: &'static str,
    },
}

/// IR Instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// alloc_T name
    Alloc { ty: ScalarType, name: String },

    /// literal_T value target
    Literal {
        ty: ScalarType,
        value: Constant,
        target: String,
    },

    /// load_T name target
    Load {
        ty: ScalarType,
        name: String,
        target: String,
    },

    /// store_T source name
    Store {
        ty: ScalarType,
        source: String,
        name: String,
    },

    /// add_T/sub_T/mul_T/div_T left right target
    Binary {
        op: IrBinaryOp,
        ty: ScalarType,
        left: String,
        right: String,
        target: String,
    },

    /// uadd_T/usub_T/lnot_T source target
    Unary {
        op: IrUnaryOp,
        ty: ScalarType,
        source: String,
        target: String,
    },

    /// cmp_T subop left right target
    Compare {
        op: CompareOp,
        ty: ScalarType,
        left: String,
        right: String,
        target: String,
    },

    /// print_T source
    Print { ty: ScalarType, source: String },

    /// jump target
    Jump(Label),

    /// cbranch testvar trueTarget falseTarget
    CBranch {
        test: String,
        if_true: Label,
        if_false: Label,
    },

    /// extern_func name returnTypeName paramTypeName*
    ExternFunc {
        name: String,
        return_type: ScalarType,
        param_types: Vec<ScalarType>,
    },

    /// call_func funcname arg* target
    CallFunc {
        function: String,
        args: Vec<String>,
        target: String,
    },

    /// An opcode this instruction set does not know, kept verbatim
    Unknown {
        opcode: String,
        operands: Vec<Operand>,
    },
}

impl Instruction {
    /// The opcode string, e.g. `add_int`, `cmp_float`, `jump`
    pub fn opcode(&self) -> String {
        match self {
            Instruction::Alloc { ty, .. } => format!("alloc_{ty}"),
            Instruction::Literal { ty, .. } => format!("literal_{ty}"),
            Instruction::Load { ty, .. } => format!("load_{ty}"),
            Instruction::Store { ty, .. } => format!("store_{ty}"),
            Instruction::Binary { op, ty, .. } => format!("{op}_{ty}"),
            Instruction::Unary { op, ty, .. } => format!("{op}_{ty}"),
            Instruction::Compare { ty, .. } => format!("cmp_{ty}"),
            Instruction::Print { ty, .. } => format!("print_{ty}"),
            Instruction::Jump(_) => "jump".to_string(),
            Instruction::CBranch { .. } => "cbranch".to_string(),
            Instruction::ExternFunc { .. } => "extern_func".to_string(),
            Instruction::CallFunc { .. } => "call_func".to_string(),
            Instruction::Unknown { opcode, .. } => opcode.clone(),
        }
    }

    /// The temporary this instruction writes, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            Instruction::Literal { target, .. }
            | Instruction::Load { target, .. }
            | Instruction::Binary { target, .. }
            | Instruction::Unary { target, .. }
            | Instruction::Compare { target, .. }
            | Instruction::CallFunc { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Jump targets carried by this instruction
    pub fn labels(&self) -> Vec<Label> {
        match self {
            Instruction::Jump(label) => vec![*label],
            Instruction::CBranch { if_true, if_false, .. } => vec![*if_true, *if_false],
            _ => Vec::new(),
        }
    }

    pub fn labels_mut(&mut self) -> Vec<&mut Label> {
        match self {
            Instruction::Jump(label) => vec![label],
            Instruction::CBranch { if_true, if_false, .. } => vec![if_true, if_false],
            _ => Vec::new(),
        }
    }

    /// Encode as `[opcode, operands...]`
    pub fn to_tuple(&self) -> Vec<Operand> {
        fn text(s: &str) -> Operand {
            Operand::Text(s.to_string())
        }

        let mut tuple = vec![Operand::Text(self.opcode())];
        match self {
            Instruction::Alloc { name, .. } => tuple.push(text(name)),
            Instruction::Literal { value, target, .. } => {
                tuple.push(constant_operand(value));
                tuple.push(text(target));
            }
            Instruction::Load { name, target, .. } => {
                tuple.extend([text(name), text(target)]);
            }
            Instruction::Store { source, name, .. } => {
                tuple.extend([text(source), text(name)]);
            }
            Instruction::Binary { left, right, target, .. } => {
                tuple.extend([text(left), text(right), text(target)]);
            }
            Instruction::Unary { source, target, .. } => {
                tuple.extend([text(source), text(target)]);
            }
            Instruction::Compare { op, left, right, target, .. } => {
                tuple.extend([text(op.name()), text(left), text(right), text(target)]);
            }
            Instruction::Print { source, .. } => tuple.push(text(source)),
            Instruction::Jump(label) => tuple.push(label_operand(label)),
            Instruction::CBranch { test, if_true, if_false } => {
                tuple.extend([text(test), label_operand(if_true), label_operand(if_false)]);
            }
            Instruction::ExternFunc { name, return_type, param_types } => {
                tuple.push(text(name));
                tuple.push(text(return_type.name()));
                tuple.extend(param_types.iter().map(|ty| text(ty.name())));
            }
            Instruction::CallFunc { function, args, target } => {
                tuple.push(text(function));
                tuple.extend(args.iter().map(|a| text(a)));
                tuple.push(text(target));
            }
            Instruction::Unknown { operands, .. } => tuple.extend(operands.iter().cloned()),
        }
        tuple
    }

    /// Decode an `[opcode, operands...]` tuple.
    ///
    /// Opcodes outside the instruction set decode to `Instruction::Unknown`;
    /// a known opcode with malformed operands is an error.
    pub fn from_tuple(tuple: Vec<Operand>) -> Result<Self, DecodeError> {
        let mut iter = tuple.into_iter();
        let opcode = match iter.next() {
            Some(Operand::Text(opcode)) => opcode,
            Some(_) => return Err(DecodeError::MissingOpcode),
            None => return Err(DecodeError::Empty),
        };
        let args: Vec<Operand> = iter.collect();
        let ops = Operands { opcode: &opcode, args: &args };

        match opcode.as_str() {
            "jump" => {
                ops.arity(1)?;
                return Ok(Instruction::Jump(ops.label(0)?));
            }
            "cbranch" => {
                ops.arity(3)?;
                return Ok(Instruction::CBranch {
                    test: ops.text(0)?,
                    if_true: ops.label(1)?,
                    if_false: ops.label(2)?,
                });
            }
            "extern_func" => {
                ops.at_least(2)?;
                let param_types = (2..args.len())
                    .map(|i| ops.scalar_type(i))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Instruction::ExternFunc {
                    name: ops.text(0)?,
                    return_type: ops.scalar_type(1)?,
                    param_types,
                });
            }
            "call_func" => {
                ops.at_least(2)?;
                let last = args.len() - 1;
                let call_args = (1..last).map(|i| ops.text(i)).collect::<Result<Vec<_>, _>>()?;
                return Ok(Instruction::CallFunc {
                    function: ops.text(0)?,
                    args: call_args,
                    target: ops.text(last)?,
                });
            }
            _ => {}
        }

        let typed = opcode
            .rsplit_once('_')
            .and_then(|(op, ty)| ScalarType::from_name(ty).map(|ty| (op, ty)));
        let Some((op, ty)) = typed else {
            return Ok(Instruction::Unknown { opcode, operands: args });
        };

        let instr = match op {
            "alloc" => {
                ops.arity(1)?;
                Instruction::Alloc { ty, name: ops.text(0)? }
            }
            "literal" => {
                ops.arity(2)?;
                Instruction::Literal { ty, value: ops.constant(0, ty)?, target: ops.text(1)? }
            }
            "load" => {
                ops.arity(2)?;
                Instruction::Load { ty, name: ops.text(0)?, target: ops.text(1)? }
            }
            "store" => {
                ops.arity(2)?;
                Instruction::Store { ty, source: ops.text(0)?, name: ops.text(1)? }
            }
            "print" => {
                ops.arity(1)?;
                Instruction::Print { ty, source: ops.text(0)? }
            }
            "cmp" => {
                ops.arity(4)?;
                let sub = ops.text(0)?;
                let Some(cmp) = CompareOp::from_name(&sub) else {
                    return Err(ops.bad(0, "a comparison subop"));
                };
                Instruction::Compare {
                    op: cmp,
                    ty,
                    left: ops.text(1)?,
                    right: ops.text(2)?,
                    target: ops.text(3)?,
                }
            }
            other => {
                if let Some(bin) = IrBinaryOp::from_name(other) {
                    ops.arity(3)?;
                    Instruction::Binary {
                        op: bin,
                        ty,
                        left: ops.text(0)?,
                        right: ops.text(1)?,
                        target: ops.text(2)?,
                    }
                } else if let Some(un) = IrUnaryOp::from_name(other) {
                    ops.arity(2)?;
                    Instruction::Unary { op: un, ty, source: ops.text(0)?, target: ops.text(1)? }
                } else {
                    return Ok(Instruction::Unknown { opcode, operands: args });
                }
            }
        };
        Ok(instr)
    }
}

fn constant_operand(value: &Constant) -> Operand {
    match value {
        Constant::Int(v) => Operand::Int(*v),
        Constant::Float(v) => Operand::Float(*v),
        Constant::String(s) => Operand::Text(s.clone()),
        Constant::Bool(b) => Operand::Bool(*b),
    }
}

fn label_operand(label: &Label) -> Operand {
    match label {
        Label::Address(addr) => Operand::Int(*addr as i64),
        Label::Block(_) => Operand::Text(label.to_string()),
    }
}

/// Positional operand accessors used while decoding one tuple
struct Operands<'a> {
    opcode: &'a str,
    args: &'a [Operand],
}

impl Operands<'_> {
    fn bad(&self, position: usize, expected: &'static str) -> DecodeError {
        DecodeError::BadOperand {
            opcode: self.opcode.to_string(),
            position,
            expected,
        }
    }

    fn arity(&self, expected: usize) -> Result<(), DecodeError> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(DecodeError::WrongArity {
                opcode: self.opcode.to_string(),
                expected: expected.to_string(),
                found: self.args.len(),
            })
        }
    }

    fn at_least(&self, minimum: usize) -> Result<(), DecodeError> {
        if self.args.len() >= minimum {
            Ok(())
        } else {
            Err(DecodeError::WrongArity {
                opcode: self.opcode.to_string(),
                expected: format!("at least {minimum}"),
                found: self.args.len(),
            })
        }
    }

    fn text(&self, position: usize) -> Result<String, DecodeError> {
        match self.args.get(position) {
            Some(Operand::Text(s)) => Ok(s.clone()),
            _ => Err(self.bad(position, "a name")),
        }
    }

    fn scalar_type(&self, position: usize) -> Result<ScalarType, DecodeError> {
        match self.args.get(position) {
            Some(Operand::Text(s)) => {
                ScalarType::from_name(s).ok_or_else(|| self.bad(position, "a type name"))
            }
            _ => Err(self.bad(position, "a type name")),
        }
    }

    fn label(&self, position: usize) -> Result<Label, DecodeError> {
        match self.args.get(position) {
            Some(Operand::Int(addr)) if *addr >= 0 => Ok(Label::Address(*addr as usize)),
            Some(Operand::Text(s)) => s
                .strip_prefix("@block")
                .and_then(|id| id.parse::<BlockId>().ok())
                .map(Label::Block)
                .ok_or_else(|| self.bad(position, "a jump target")),
            _ => Err(self.bad(position, "a jump target")),
        }
    }

    fn constant(&self, position: usize, ty: ScalarType) -> Result<Constant, DecodeError> {
        match (ty, self.args.get(position)) {
            (ScalarType::Int, Some(Operand::Int(v))) => Ok(Constant::Int(*v)),
            (ScalarType::Float, Some(Operand::Float(v))) => Ok(Constant::Float(*v)),
            (ScalarType::Float, Some(Operand::Int(v))) => Ok(Constant::Float(*v as f64)),
            (ScalarType::String, Some(Operand::Text(s))) => Ok(Constant::String(s.clone())),
            (ScalarType::Bool, Some(Operand::Bool(b))) => Ok(Constant::Bool(*b)),
            _ => Err(self.bad(position, "a literal of the opcode's type")),
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_tuple().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tuple = Vec::<Operand>::deserialize(deserializer)?;
        Instruction::from_tuple(tuple).map_err(D::Error::custom)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Instruction::Literal { ty, value, target } = self {
            return write!(f, "literal_{ty} {value} {target}");
        }
        let tuple = self.to_tuple();
        for (i, operand) in tuple.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{operand}")?;
        }
        Ok(())
    }
}
