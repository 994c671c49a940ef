//! Statement code generation

use super::{CodeGenerator, CodegenError};
use crate::ast::{Expression, FuncPrototype, Statement, StatementKind};
use exprc_common::ScalarType;
use exprc_ir::BlockKind;
use log::trace;

impl CodeGenerator {
    /// Generate IR for a statement
    pub(super) fn generate_statement(&mut self, stmt: &Statement) -> Result<(), CodegenError> {
        self.line = stmt.line;
        match &stmt.kind {
            StatementKind::ConstDecl { name, decl_type, value } => {
                let ty = match decl_type {
                    Some(ty) => *ty,
                    None => self.type_of(value, "const declaration")?,
                };
                self.builder.build_alloc(ty, name);
                let temp = self.generate_expression(value)?;
                self.builder.build_store(ty, &temp, name);
            }

            StatementKind::VarDecl { name, decl_type, value } => {
                let ty = match (decl_type, value) {
                    (Some(ty), _) => *ty,
                    (None, Some(value)) => self.type_of(value, "var declaration")?,
                    (None, None) => {
                        return Err(CodegenError::MissingType {
                            construct: format!("var '{name}'"),
                            line: self.line,
                        })
                    }
                };
                self.builder.build_alloc(ty, name);
                if let Some(value) = value {
                    let temp = self.generate_expression(value)?;
                    self.builder.build_store(ty, &temp, name);
                }
            }

            StatementKind::Assign { location, value } => {
                let ty = self.type_of(value, "assigned value")?;
                let temp = self.generate_expression(value)?;
                self.builder.build_store(ty, &temp, location);
            }

            StatementKind::Print(expr) => {
                let ty = self.type_of(expr, "printed expression")?;
                let temp = self.generate_expression(expr)?;
                self.builder.build_print(ty, &temp);
            }

            StatementKind::If { condition, then_branch, else_branch } => {
                self.generate_if_statement(condition, then_branch, else_branch.as_deref())?;
            }

            StatementKind::While { condition, body } => {
                self.generate_while_loop(condition, body)?;
            }

            StatementKind::Extern(prototype) => self.generate_extern(prototype),

            StatementKind::Expression(expr) => {
                self.generate_expression(expr)?;
            }
        }
        Ok(())
    }

    fn generate_block(&mut self, statements: &[Statement]) -> Result<(), CodegenError> {
        for stmt in statements {
            self.generate_statement(stmt)?;
        }
        Ok(())
    }

    fn generate_if_statement(
        &mut self,
        condition: &Expression,
        then_branch: &[Statement],
        else_branch: Option<&[Statement]>,
    ) -> Result<(), CodegenError> {
        let cond_block = self.builder.new_block();
        let current = self.builder.current_block();
        self.builder.set_next(current, cond_block)?;

        // The test is evaluated inside the conditional block itself
        self.builder.switch_block(cond_block)?;
        self.type_of(condition, "if condition")?;
        let test = self.generate_expression(condition)?;

        let then_block = self.builder.new_block();
        self.builder.switch_block(then_block)?;
        self.generate_block(then_branch)?;

        let else_block = match else_branch {
            Some(statements) => {
                let block = self.builder.new_block();
                self.builder.switch_block(block)?;
                self.generate_block(statements)?;
                Some(block)
            }
            None => None,
        };

        self.builder.set_kind(
            cond_block,
            BlockKind::Conditional {
                test,
                if_branch: then_block,
                else_branch: else_block,
            },
        )?;

        let merge_block = self.builder.new_block();
        self.builder.set_next(cond_block, merge_block)?;
        self.builder.switch_block(merge_block)?;
        trace!("if at line {}: cond {cond_block}, merge {merge_block}", self.line);
        Ok(())
    }

    fn generate_while_loop(&mut self, condition: &Expression, body: &[Statement]) -> Result<(), CodegenError> {
        let loop_block = self.builder.new_block();
        let current = self.builder.current_block();
        self.builder.set_next(current, loop_block)?;

        self.builder.switch_block(loop_block)?;
        self.type_of(condition, "while condition")?;
        let test = self.generate_expression(condition)?;

        let body_block = self.builder.new_block();
        self.builder.switch_block(body_block)?;
        self.generate_block(body)?;
        self.builder.set_kind(loop_block, BlockKind::Loop { test, body: body_block })?;

        let exit_block = self.builder.new_block();
        self.builder.set_next(loop_block, exit_block)?;
        self.builder.switch_block(exit_block)?;
        trace!("while at line {}: header {loop_block}, exit {exit_block}", self.line);
        Ok(())
    }

    fn generate_extern(&mut self, prototype: &FuncPrototype) {
        let param_types: Vec<ScalarType> = prototype.params.iter().map(|p| p.ty).collect();
        self.builder.build_extern(&prototype.name, prototype.return_type, param_types);
    }
}
