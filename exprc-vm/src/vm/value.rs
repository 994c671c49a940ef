//! Runtime values held in the variable store

use crate::capability::NativeFunction;
use exprc_common::{format_float, Constant, ScalarType};
use std::fmt;

/// An extern function bound by `extern_func`, with its declared signature
#[derive(Debug, Clone)]
pub struct BoundFunction {
    pub name: String,
    pub namespace: &'static str,
    pub function: NativeFunction,
    pub return_type: ScalarType,
    pub param_types: Vec<ScalarType>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Function(BoundFunction),
}

impl Value {
    /// Scalar type of the value; `None` for bound functions
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Int(_) => Some(ScalarType::Int),
            Value::Float(_) => Some(ScalarType::Float),
            Value::String(_) => Some(ScalarType::String),
            Value::Bool(_) => Some(ScalarType::Bool),
            Value::Function(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.scalar_type() {
            Some(ty) => ty.name(),
            None => "func",
        }
    }

    /// Truth value of a `Value::Bool`; only called after a bool-typed read
    pub fn as_bool(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        match constant {
            Constant::Int(v) => Value::Int(v),
            Constant::Float(v) => Value::Float(v),
            Constant::String(s) => Value::String(s),
            Constant::Bool(b) => Value::Bool(b),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => {
                a.name == b.name && a.namespace == b.namespace
            }
            _ => false,
        }
    }
}

/// The text `print_<type>` writes
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::String(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Function(func) => write!(f, "<extern {}.{}>", func.namespace, func.name),
        }
    }
}
