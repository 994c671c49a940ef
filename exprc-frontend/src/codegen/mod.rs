//! Code generation from the decorated AST to the block graph
//!
//! The generator walks the tree depth first. Each expression visit returns
//! the name of the temporary holding its value; statements append to the
//! builder's current block and open new blocks for `if` and `while`.

mod errors;
mod expressions;
mod statements;

pub use errors::CodegenError;

use crate::ast::{Expression, Program};
use exprc_common::ScalarType;
use exprc_ir::{BlockGraph, IrBuilder};
use log::debug;

pub struct CodeGenerator {
    builder: IrBuilder,
    /// Line of the statement being lowered, for diagnostics
    line: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            builder: IrBuilder::new(),
            line: 0,
        }
    }

    /// Lower a whole program into a block graph rooted at block 0
    pub fn generate(mut self, program: &Program) -> Result<BlockGraph, CodegenError> {
        for stmt in &program.statements {
            self.generate_statement(stmt)?;
        }
        let graph = self.builder.finish();
        debug!("generated {} blocks", graph.len());
        Ok(graph)
    }

    fn type_of(&self, expr: &Expression, construct: &str) -> Result<ScalarType, CodegenError> {
        expr.expr_type.ok_or_else(|| CodegenError::MissingType {
            construct: construct.to_string(),
            line: self.line,
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
