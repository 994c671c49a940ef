//! Expression code generation

use super::{CodeGenerator, CodegenError};
use crate::ast::{BinaryOp, Expression, ExpressionKind, RelationalOp, UnaryOp};
use exprc_ir::{CompareOp, IrBinaryOp, IrUnaryOp};

impl CodeGenerator {
    /// Generate IR for an expression and return the temporary holding it
    pub(super) fn generate_expression(&mut self, expr: &Expression) -> Result<String, CodegenError> {
        match &expr.kind {
            ExpressionKind::Literal(value) => {
                let ty = self.type_of(expr, "literal")?;
                if value.scalar_type() != ty {
                    return Err(CodegenError::LiteralMismatch {
                        declared: ty,
                        found: value.scalar_type(),
                        line: self.line,
                    });
                }
                Ok(self.builder.build_literal(value.clone()))
            }

            ExpressionKind::Binary { op, left, right } => {
                self.type_of(expr, "arithmetic expression")?;
                let ty = self.type_of(left, "arithmetic operand")?;
                let lhs = self.generate_expression(left)?;
                let rhs = self.generate_expression(right)?;
                Ok(self.builder.build_binary(convert_binary_op(*op), ty, &lhs, &rhs))
            }

            ExpressionKind::Relational { op, left, right } => {
                self.type_of(expr, "comparison")?;
                let ty = self.type_of(left, "comparison operand")?;
                let lhs = self.generate_expression(left)?;
                let rhs = self.generate_expression(right)?;
                Ok(self.builder.build_compare(convert_relational_op(*op), ty, &lhs, &rhs))
            }

            ExpressionKind::Unary { op, operand } => {
                self.type_of(expr, "unary expression")?;
                let ty = self.type_of(operand, "unary operand")?;
                let source = self.generate_expression(operand)?;
                Ok(self.builder.build_unary(convert_unary_op(*op), ty, &source))
            }

            ExpressionKind::Load(name) => {
                let ty = self.type_of(expr, "location")?;
                Ok(self.builder.build_load(ty, name))
            }

            // Grouping forwards its child's temporary
            ExpressionKind::Group(inner) => {
                self.type_of(expr, "grouped expression")?;
                self.generate_expression(inner)
            }

            ExpressionKind::Call { name, args } => {
                let return_type = self.type_of(expr, "function call")?;
                let mut temps = Vec::with_capacity(args.len());
                for arg in args {
                    temps.push(self.generate_expression(arg)?);
                }
                Ok(self.builder.build_call(name, temps, return_type))
            }
        }
    }
}

fn convert_binary_op(op: BinaryOp) -> IrBinaryOp {
    match op {
        BinaryOp::Add => IrBinaryOp::Add,
        BinaryOp::Sub => IrBinaryOp::Sub,
        BinaryOp::Mul => IrBinaryOp::Mul,
        BinaryOp::Div => IrBinaryOp::Div,
    }
}

fn convert_relational_op(op: RelationalOp) -> CompareOp {
    match op {
        RelationalOp::Less => CompareOp::Lt,
        RelationalOp::LessEqual => CompareOp::Le,
        RelationalOp::Greater => CompareOp::Gt,
        RelationalOp::GreaterEqual => CompareOp::Ge,
        RelationalOp::Equal => CompareOp::Eq,
        RelationalOp::NotEqual => CompareOp::Ne,
        RelationalOp::LogicalAnd => CompareOp::LAnd,
        RelationalOp::LogicalOr => CompareOp::LOr,
    }
}

fn convert_unary_op(op: UnaryOp) -> IrUnaryOp {
    match op {
        UnaryOp::Plus => IrUnaryOp::UAdd,
        UnaryOp::Minus => IrUnaryOp::USub,
        UnaryOp::Not => IrUnaryOp::LNot,
    }
}
