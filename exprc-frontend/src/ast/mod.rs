//! Abstract Syntax Tree definitions for Expr
//!
//! The tree arrives from the parser and type checker already decorated:
//! every expression carries its resolved scalar type.

pub mod ops;
pub mod expressions;
pub mod statements;

pub use ops::{BinaryOp, RelationalOp, UnaryOp};
pub use expressions::{Expression, ExpressionKind};
pub use statements::{FuncPrototype, ParamDecl, Program, Statement, StatementKind};

#[cfg(test)]
mod tests {
    use super::*;
    use exprc_common::ScalarType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constructors_propagate_types() {
        let sum = Expression::binary(BinaryOp::Add, Expression::float(1.0), Expression::float(2.0));
        assert_eq!(sum.expr_type, Some(ScalarType::Float));

        let cmp = Expression::relational(RelationalOp::Less, Expression::int(1), Expression::int(2));
        assert_eq!(cmp.expr_type, Some(ScalarType::Bool));

        let neg = Expression::unary(UnaryOp::Minus, Expression::group(Expression::int(3)));
        assert_eq!(neg.expr_type, Some(ScalarType::Int));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "statements": [
                {"kind": {"VarDecl": {"name": "a", "decl_type": "int",
                    "value": {"kind": {"Literal": {"int": 5}}, "type": "int"}}}, "line": 1},
                {"kind": {"Print": {"kind": {"Binary": {"op": "+",
                    "left": {"kind": {"Load": "a"}, "type": "int"},
                    "right": {"kind": {"Literal": {"int": 1}}, "type": "int"}}}, "type": "int"}}}
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(
            program,
            Program::new(vec![
                Statement::var_decl("a", ScalarType::Int, Some(Expression::int(5))).at_line(1),
                Statement::print(Expression::binary(
                    BinaryOp::Add,
                    Expression::load("a", ScalarType::Int),
                    Expression::int(1),
                )),
            ])
        );
    }

    #[test]
    fn test_missing_type_deserializes_as_none() {
        let expr: Expression = serde_json::from_str(r#"{"kind": {"Load": "x"}}"#).unwrap();
        assert_eq!(expr.expr_type, None);
    }
}
