//! IR Operations
//!
//! Defines the arithmetic, unary and comparison operations available in the
//! IR. Arithmetic and unary operations become part of the opcode name
//! (`add_int`); comparison operations travel as a data operand of the single
//! `cmp_<type>` opcode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary arithmetic operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl IrBinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            IrBinaryOp::Add => "add",
            IrBinaryOp::Sub => "sub",
            IrBinaryOp::Mul => "mul",
            IrBinaryOp::Div => "div",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(IrBinaryOp::Add),
            "sub" => Some(IrBinaryOp::Sub),
            "mul" => Some(IrBinaryOp::Mul),
            "div" => Some(IrBinaryOp::Div),
            _ => None,
        }
    }
}

impl fmt::Display for IrBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unary operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrUnaryOp {
    UAdd, // +x
    USub, // -x
    LNot, // !x
}

impl IrUnaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            IrUnaryOp::UAdd => "uadd",
            IrUnaryOp::USub => "usub",
            IrUnaryOp::LNot => "lnot",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uadd" => Some(IrUnaryOp::UAdd),
            "usub" => Some(IrUnaryOp::USub),
            "lnot" => Some(IrUnaryOp::LNot),
            _ => None,
        }
    }
}

impl fmt::Display for IrUnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Relational and logical operations (always produce a bool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    LAnd,
    LOr,
}

impl CompareOp {
    pub fn name(&self) -> &'static str {
        match self {
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::LAnd => "land",
            CompareOp::LOr => "lor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lt" => Some(CompareOp::Lt),
            "le" => Some(CompareOp::Le),
            "gt" => Some(CompareOp::Gt),
            "ge" => Some(CompareOp::Ge),
            "eq" => Some(CompareOp::Eq),
            "ne" => Some(CompareOp::Ne),
            "land" => Some(CompareOp::LAnd),
            "lor" => Some(CompareOp::LOr),
            _ => None,
        }
    }

    /// Logical connectives operate on booleans only
    pub fn is_logical(&self) -> bool {
        matches!(self, CompareOp::LAnd | CompareOp::LOr)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
