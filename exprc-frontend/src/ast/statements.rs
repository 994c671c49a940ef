//! Statement AST nodes for Expr

use super::expressions::Expression;
use exprc_common::ScalarType;
use serde::{Deserialize, Serialize};

/// A whole Expr program: a sequence of top-level statements
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// AST Statement nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `const name [type] = value;`
    ConstDecl {
        name: String,
        #[serde(default)]
        decl_type: Option<ScalarType>,
        value: Expression,
    },

    /// `var name type [= value];`
    VarDecl {
        name: String,
        #[serde(default)]
        decl_type: Option<ScalarType>,
        #[serde(default)]
        value: Option<Expression>,
    },

    /// `location = value;`
    Assign {
        location: String,
        value: Expression,
    },

    Print(Expression),

    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        #[serde(default)]
        else_branch: Option<Vec<Statement>>,
    },

    While {
        condition: Expression,
        body: Vec<Statement>,
    },

    /// `extern func name(params) type;`
    Extern(FuncPrototype),

    /// Expression evaluated for its effect (a call)
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncPrototype {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    pub return_type: ScalarType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ScalarType,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self { kind, line: 0 }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn const_decl(name: &str, value: Expression) -> Self {
        let decl_type = value.expr_type;
        Self::new(StatementKind::ConstDecl { name: name.to_string(), decl_type, value })
    }

    pub fn var_decl(name: &str, decl_type: ScalarType, value: Option<Expression>) -> Self {
        Self::new(StatementKind::VarDecl {
            name: name.to_string(),
            decl_type: Some(decl_type),
            value,
        })
    }

    pub fn assign(location: &str, value: Expression) -> Self {
        Self::new(StatementKind::Assign { location: location.to_string(), value })
    }

    pub fn print(expr: Expression) -> Self {
        Self::new(StatementKind::Print(expr))
    }

    pub fn if_else(
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    ) -> Self {
        Self::new(StatementKind::If { condition, then_branch, else_branch })
    }

    pub fn while_loop(condition: Expression, body: Vec<Statement>) -> Self {
        Self::new(StatementKind::While { condition, body })
    }

    pub fn extern_func(name: &str, params: &[(&str, ScalarType)], return_type: ScalarType) -> Self {
        let params = params
            .iter()
            .map(|(name, ty)| ParamDecl { name: name.to_string(), ty: *ty })
            .collect();
        Self::new(StatementKind::Extern(FuncPrototype {
            name: name.to_string(),
            params,
            return_type,
        }))
    }

    pub fn expression(expr: Expression) -> Self {
        Self::new(StatementKind::Expression(expr))
    }
}
