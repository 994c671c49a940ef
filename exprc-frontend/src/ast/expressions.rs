//! Expression AST nodes for Expr
//!
//! Every expression carries the scalar type resolved by the type checker.
//! The constructors below build already-decorated nodes.

use super::ops::{BinaryOp, RelationalOp, UnaryOp};
use exprc_common::{Constant, ScalarType};
use serde::{Deserialize, Serialize};

/// AST Expression nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    #[serde(default, rename = "type")]
    pub expr_type: Option<ScalarType>, // Filled during type checking
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Literal(Constant),

    /// Arithmetic on two operands of the same type
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Comparison or logical connective
    Relational {
        op: RelationalOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// Read of a named location
    Load(String),

    /// Parenthesized expression
    Group(Box<Expression>),

    /// Call of an extern function
    Call {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, expr_type: ScalarType) -> Self {
        Self { kind, expr_type: Some(expr_type) }
    }

    /// A node without a resolved type
    pub fn untyped(kind: ExpressionKind) -> Self {
        Self { kind, expr_type: None }
    }

    pub fn literal(value: Constant) -> Self {
        let ty = value.scalar_type();
        Self::new(ExpressionKind::Literal(value), ty)
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Constant::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::literal(Constant::Float(value))
    }

    pub fn string(value: &str) -> Self {
        Self::literal(Constant::String(value.to_string()))
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Constant::Bool(value))
    }

    /// Arithmetic node; its type is the type of the left operand
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        let ty = left.expr_type;
        Self {
            kind: ExpressionKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            expr_type: ty,
        }
    }

    pub fn relational(op: RelationalOp, left: Expression, right: Expression) -> Self {
        Self::new(
            ExpressionKind::Relational { op, left: Box::new(left), right: Box::new(right) },
            ScalarType::Bool,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        let ty = operand.expr_type;
        Self {
            kind: ExpressionKind::Unary { op, operand: Box::new(operand) },
            expr_type: ty,
        }
    }

    pub fn load(name: &str, ty: ScalarType) -> Self {
        Self::new(ExpressionKind::Load(name.to_string()), ty)
    }

    pub fn group(inner: Expression) -> Self {
        let ty = inner.expr_type;
        Self {
            kind: ExpressionKind::Group(Box::new(inner)),
            expr_type: ty,
        }
    }

    pub fn call(name: &str, args: Vec<Expression>, return_type: ScalarType) -> Self {
        Self::new(ExpressionKind::Call { name: name.to_string(), args }, return_type)
    }
}
