//! IR Builder
//!
//! Provides utilities for constructing the block graph programmatically:
//! per-type temporary versioning, block creation and switching, and one
//! `build_*` method per instruction form. Every `build_*` method appends to
//! the current block.

use exprc_common::{BlockId, Constant, ScalarType};
use log::trace;
use std::collections::HashMap;
use thiserror::Error;
use crate::blocks::{BasicBlock, BlockGraph, BlockKind};
use crate::instructions::Instruction;
use crate::ops::{CompareOp, IrBinaryOp, IrUnaryOp};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("block {0} was not allocated by this builder")]
    UnknownBlock(BlockId),
}

/// Builder for constructing IR
pub struct IrBuilder {
    graph: BlockGraph,
    current_block: BlockId,
    versions: HashMap<ScalarType, u32>,
}

impl IrBuilder {
    pub fn new() -> Self {
        let graph = BlockGraph::new();
        let current_block = graph.start();
        Self {
            graph,
            current_block,
            versions: HashMap::new(),
        }
    }

    /// Create a new temporary of the given type: `__<type>_<n>`
    pub fn new_temp(&mut self, ty: ScalarType) -> String {
        let version = self.versions.entry(ty).or_insert(0);
        let name = format!("__{}_{}", ty.name(), version);
        *version += 1;
        name
    }

    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    /// Allocate a fresh straight block without switching to it
    pub fn new_block(&mut self) -> BlockId {
        let id = self.graph.add_block();
        trace!("created block {id}");
        id
    }

    /// Make `block` the target of subsequent instructions
    pub fn switch_block(&mut self, block: BlockId) -> Result<(), BuildError> {
        self.check(block)?;
        self.current_block = block;
        Ok(())
    }

    pub fn set_next(&mut self, from: BlockId, to: BlockId) -> Result<(), BuildError> {
        self.check(to)?;
        self.block_mut(from)?.next_block = Some(to);
        Ok(())
    }

    /// Every block the new kind branches to must already exist
    pub fn set_kind(&mut self, block: BlockId, kind: BlockKind) -> Result<(), BuildError> {
        match &kind {
            BlockKind::Straight => {}
            BlockKind::Conditional { if_branch, else_branch, .. } => {
                self.check(*if_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check(*else_branch)?;
                }
            }
            BlockKind::Loop { body, .. } => self.check(*body)?,
        }
        self.block_mut(block)?.kind = kind;
        Ok(())
    }

    pub fn add_instruction(&mut self, instr: Instruction) {
        let block = self.current_block;
        match self.graph.block_mut(block) {
            Some(block) => block.add_instruction(instr),
            // current_block only changes through switch_block, which checks it
            None => unreachable!("current block {block} is not in the graph"),
        }
    }

    pub fn build_alloc(&mut self, ty: ScalarType, name: &str) {
        self.add_instruction(Instruction::Alloc { ty, name: name.to_string() });
    }

    pub fn build_literal(&mut self, value: Constant) -> String {
        let ty = value.scalar_type();
        let target = self.new_temp(ty);
        self.add_instruction(Instruction::Literal { ty, value, target: target.clone() });
        target
    }

    pub fn build_load(&mut self, ty: ScalarType, name: &str) -> String {
        let target = self.new_temp(ty);
        self.add_instruction(Instruction::Load {
            ty,
            name: name.to_string(),
            target: target.clone(),
        });
        target
    }

    pub fn build_store(&mut self, ty: ScalarType, source: &str, name: &str) {
        self.add_instruction(Instruction::Store {
            ty,
            source: source.to_string(),
            name: name.to_string(),
        });
    }

    pub fn build_binary(&mut self, op: IrBinaryOp, ty: ScalarType, left: &str, right: &str) -> String {
        let target = self.new_temp(ty);
        self.add_instruction(Instruction::Binary {
            op,
            ty,
            left: left.to_string(),
            right: right.to_string(),
            target: target.clone(),
        });
        target
    }

    pub fn build_unary(&mut self, op: IrUnaryOp, ty: ScalarType, source: &str) -> String {
        let target = self.new_temp(ty);
        self.add_instruction(Instruction::Unary {
            op,
            ty,
            source: source.to_string(),
            target: target.clone(),
        });
        target
    }

    /// Emit `cmp_<ty> op left right target`; the result is always a bool
    pub fn build_compare(&mut self, op: CompareOp, ty: ScalarType, left: &str, right: &str) -> String {
        let target = self.new_temp(ScalarType::Bool);
        self.add_instruction(Instruction::Compare {
            op,
            ty,
            left: left.to_string(),
            right: right.to_string(),
            target: target.clone(),
        });
        target
    }

    pub fn build_print(&mut self, ty: ScalarType, source: &str) {
        self.add_instruction(Instruction::Print { ty, source: source.to_string() });
    }

    pub fn build_extern(&mut self, name: &str, return_type: ScalarType, param_types: Vec<ScalarType>) {
        self.add_instruction(Instruction::ExternFunc {
            name: name.to_string(),
            return_type,
            param_types,
        });
    }

    pub fn build_call(&mut self, function: &str, args: Vec<String>, return_type: ScalarType) -> String {
        let target = self.new_temp(return_type);
        self.add_instruction(Instruction::CallFunc {
            function: function.to_string(),
            args,
            target: target.clone(),
        });
        target
    }

    /// Finish construction and hand out the graph
    pub fn finish(self) -> BlockGraph {
        self.graph
    }

    fn check(&self, id: BlockId) -> Result<(), BuildError> {
        match self.graph.block(id) {
            Some(_) => Ok(()),
            None => Err(BuildError::UnknownBlock(id)),
        }
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut BasicBlock, BuildError> {
        self.graph.block_mut(id).ok_or(BuildError::UnknownBlock(id))
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
