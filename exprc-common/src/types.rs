//! Common types used throughout the compiler
//!
//! This module defines the scalar type system of the Expr language and the
//! literal constants that flow from the syntax tree into the IR.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic block identifier (index into the block arena)
pub type BlockId = u32;

/// Scalar types of the Expr language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Int,
    Float,
    String,
    Bool,
}

impl ScalarType {
    /// All scalar types, in declaration order
    pub const ALL: [ScalarType; 4] = [
        ScalarType::Int,
        ScalarType::Float,
        ScalarType::String,
        ScalarType::Bool,
    ];

    /// Stable type name used in opcodes and temporary names
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::String => "string",
            ScalarType::Bool => "bool",
        }
    }

    /// Look a type up by its stable name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ScalarType::Int),
            "float" => Some(ScalarType::Float),
            "string" => Some(ScalarType::String),
            "bool" => Some(ScalarType::Bool),
            _ => None,
        }
    }

    /// The value a freshly allocated variable of this type holds
    pub fn zero_value(&self) -> Constant {
        match self {
            ScalarType::Int => Constant::Int(0),
            ScalarType::Float => Constant::Float(0.0),
            ScalarType::String => Constant::String(String::new()),
            ScalarType::Bool => Constant::Bool(false),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A literal value carried by the syntax tree and by `literal_*` instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constant {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Constant {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Constant::Int(_) => ScalarType::Int,
            Constant::Float(_) => ScalarType::Float,
            Constant::String(_) => ScalarType::String,
            Constant::Bool(_) => ScalarType::Bool,
        }
    }
}

/// Format a float so that integral values keep one fractional digit (`3.0`)
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Float(v) => write!(f, "{}", format_float(*v)),
            Constant::String(s) => write!(f, "{s:?}"),
            Constant::Bool(b) => write!(f, "{b}"),
        }
    }
}
