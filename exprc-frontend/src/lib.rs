//! Expr Compiler - Frontend
//!
//! This crate provides the frontend components for the Expr compiler:
//! - AST: the decorated syntax tree handed over by the type checker
//! - Codegen: lowering of that tree into the block graph

pub mod ast;
pub mod codegen;

pub use ast::{
    BinaryOp, Expression, ExpressionKind, FuncPrototype, ParamDecl, Program, RelationalOp,
    Statement, StatementKind, UnaryOp,
};
pub use codegen::{CodeGenerator, CodegenError};

use exprc_common::CompilerError;
use exprc_ir::{BlockGraph, Linker};
use std::path::Path;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Lower a decorated program into its block graph
    pub fn generate(program: &Program) -> Result<BlockGraph, CompilerError> {
        Ok(CodeGenerator::new().generate(program)?)
    }

    /// Lower and link a decorated program into a flat instruction sequence
    pub fn compile(program: &Program) -> Result<exprc_ir::Program, CompilerError> {
        let graph = Self::generate(program)?;
        Ok(Linker::new().link(&graph)?)
    }

    /// Read a decorated program from its JSON form
    pub fn parse_json(source: &str) -> Result<Program, CompilerError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load_file(path: &Path) -> Result<Program, CompilerError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse_json(&source)
    }
}
