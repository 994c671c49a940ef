//! Operation families
//!
//! One handler per family (arithmetic, unary, compare). The handlers are
//! parameterized by the instruction's type tag; operands have already been
//! read with that type.

use super::value::Value;
use crate::error::VmError;
use exprc_common::ScalarType;
use exprc_ir::{CompareOp, IrBinaryOp, IrUnaryOp};
use std::cmp::Ordering;

pub(crate) fn binary(op: IrBinaryOp, ty: ScalarType, left: &Value, right: &Value) -> Result<Value, VmError> {
    let value = match (op, left, right) {
        (IrBinaryOp::Add, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(*b)),
        (IrBinaryOp::Sub, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(*b)),
        (IrBinaryOp::Mul, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_mul(*b)),
        (IrBinaryOp::Div, Value::Int(a), Value::Int(b)) => Value::Int(floor_div(*a, *b)?),

        (IrBinaryOp::Add, Value::Float(a), Value::Float(b)) => Value::Float(a + b),
        (IrBinaryOp::Sub, Value::Float(a), Value::Float(b)) => Value::Float(a - b),
        (IrBinaryOp::Mul, Value::Float(a), Value::Float(b)) => Value::Float(a * b),
        (IrBinaryOp::Div, Value::Float(a), Value::Float(b)) => Value::Float(a / b),

        (IrBinaryOp::Add, Value::String(a), Value::String(b)) => Value::String(format!("{a}{b}")),

        _ => return Err(unsupported(&format!("{op}_{ty}"), left, Some(right))),
    };
    Ok(value)
}

/// Integer division rounding toward negative infinity
pub(crate) fn floor_div(a: i64, b: i64) -> Result<i64, VmError> {
    if b == 0 {
        return Err(VmError::DivisionByZero);
    }
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

pub(crate) fn unary(op: IrUnaryOp, ty: ScalarType, source: &Value) -> Result<Value, VmError> {
    let value = match (op, source) {
        (IrUnaryOp::UAdd, Value::Int(_) | Value::Float(_)) => source.clone(),
        (IrUnaryOp::USub, Value::Int(v)) => Value::Int(v.wrapping_neg()),
        (IrUnaryOp::USub, Value::Float(v)) => Value::Float(-v),
        (IrUnaryOp::LNot, Value::Bool(b)) => Value::Bool(!b),
        _ => return Err(unsupported(&format!("{op}_{ty}"), source, None)),
    };
    Ok(value)
}

/// `cmp_<type>`: ordering and equality on like-typed scalars, non
/// short-circuit `land`/`lor` on bools
pub(crate) fn compare(op: CompareOp, ty: ScalarType, left: &Value, right: &Value) -> Result<bool, VmError> {
    if op.is_logical() {
        return match (op, left, right) {
            (CompareOp::LAnd, Value::Bool(a), Value::Bool(b)) => Ok(*a && *b),
            (CompareOp::LOr, Value::Bool(a), Value::Bool(b)) => Ok(*a || *b),
            _ => Err(unsupported(&format!("cmp_{ty} {op}"), left, Some(right))),
        };
    }

    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => return Err(unsupported(&format!("cmp_{ty} {op}"), left, Some(right))),
    };

    // Unordered floats (NaN) only satisfy `ne`
    let Some(ordering) = ordering else {
        return Ok(op == CompareOp::Ne);
    };
    Ok(match op {
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne | CompareOp::LAnd | CompareOp::LOr => ordering != Ordering::Equal,
    })
}

/// Convert an extern result or argument to the declared type.
/// Only int and float convert into each other.
pub(crate) fn coerce(name: &str, value: Value, ty: ScalarType) -> Result<Value, VmError> {
    match (value, ty) {
        (Value::Int(v), ScalarType::Float) => Ok(Value::Float(v as f64)),
        (Value::Float(v), ScalarType::Int) => Ok(Value::Int(v as i64)),
        (value, ty) if value.scalar_type() == Some(ty) => Ok(value),
        (value, ty) => Err(VmError::TypeMismatch {
            name: name.to_string(),
            expected: ty.name().to_string(),
            found: value.type_name().to_string(),
        }),
    }
}

fn unsupported(opcode: &str, left: &Value, right: Option<&Value>) -> VmError {
    let operands = match right {
        Some(right) => format!("{} and {}", left.type_name(), right.type_name()),
        None => left.type_name().to_string(),
    };
    VmError::Unsupported {
        opcode: opcode.to_string(),
        operands,
    }
}
