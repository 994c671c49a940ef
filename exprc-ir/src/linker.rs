//! Linker
//!
//! Flattens a block graph into a single instruction sequence. Linking runs
//! in two phases: the graph is walked and every `jump`/`cbranch` is emitted
//! with block labels (their positions are remembered), then every remembered
//! instruction is patched with the recorded start index of its target block.

use exprc_common::{BlockId, CompilerError};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use thiserror::Error;
use crate::blocks::{BlockGraph, BlockKind};
use crate::instructions::{Instruction, Label};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("block {0} does not exist in the graph")]
    UnknownBlock(BlockId),

    #[error("block {0} is reached twice by the traversal")]
    BlockRevisited(BlockId),

    #[error("{kind} block {block} has no successor block")]
    MissingSuccessor { block: BlockId, kind: &'static str },

    #[error("instruction {address} jumps to block {block}, which was never laid out")]
    UnresolvedTarget { address: usize, block: BlockId },
}

impl From<LinkError> for CompilerError {
    fn from(err: LinkError) -> Self {
        CompilerError::link_error(err.to_string())
    }
}

/// A linked program: the flat instruction sequence and nothing else
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, address: usize) -> Option<&Instruction> {
        self.instructions.get(address)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// One `address : instruction` line per instruction
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (address, instr) in self.instructions.iter().enumerate() {
            let _ = writeln!(out, "{address} : {instr}");
        }
        out
    }
}

pub struct Linker {
    code: Vec<Instruction>,
    block_starts: HashMap<BlockId, usize>,
    pending: Vec<usize>,
    visited: HashSet<BlockId>,
}

impl Linker {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            block_starts: HashMap::new(),
            pending: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Lay out `graph` from its start block and resolve every jump target.
    /// The graph is only borrowed, so the same graph can be linked again.
    pub fn link(&mut self, graph: &BlockGraph) -> Result<Program, LinkError> {
        self.code.clear();
        self.block_starts.clear();
        self.pending.clear();
        self.visited.clear();

        self.link_chain(graph, graph.start())?;
        self.patch()?;

        debug!(
            "linked {} blocks into {} instructions",
            self.block_starts.len(),
            self.code.len()
        );
        Ok(Program::new(std::mem::take(&mut self.code)))
    }

    /// Start index of `block` in the most recent link, if it was laid out
    pub fn block_start(&self, block: BlockId) -> Option<usize> {
        self.block_starts.get(&block).copied()
    }

    /// Lay out `first` and every block reachable along its `next_block` chain
    fn link_chain(&mut self, graph: &BlockGraph, first: BlockId) -> Result<(), LinkError> {
        let mut current = Some(first);
        while let Some(id) = current {
            let block = graph.block(id).ok_or(LinkError::UnknownBlock(id))?;
            if !self.visited.insert(id) {
                return Err(LinkError::BlockRevisited(id));
            }

            let start = self.code.len();
            self.block_starts.insert(id, start);
            trace!("block {id} ({}) starts at {start}", block.kind.name());
            self.code.extend(block.instructions.iter().cloned());

            match &block.kind {
                BlockKind::Straight => {
                    if let Some(next) = block.next_block {
                        self.emit_jump(next);
                    }
                }
                BlockKind::Conditional { test, if_branch, else_branch } => {
                    let merge = block.next_block.ok_or(LinkError::MissingSuccessor {
                        block: id,
                        kind: "conditional",
                    })?;
                    self.emit_cbranch(test, *if_branch, else_branch.unwrap_or(merge));
                    self.link_chain(graph, *if_branch)?;
                    self.emit_jump(merge);
                    if let Some(else_branch) = else_branch {
                        self.link_chain(graph, *else_branch)?;
                        self.emit_jump(merge);
                    }
                }
                BlockKind::Loop { test, body } => {
                    let exit = block.next_block.ok_or(LinkError::MissingSuccessor {
                        block: id,
                        kind: "loop",
                    })?;
                    self.emit_cbranch(test, *body, exit);
                    self.link_chain(graph, *body)?;
                    // back edge
                    self.emit_jump(id);
                }
            }

            current = block.next_block;
        }
        Ok(())
    }

    fn emit_jump(&mut self, target: BlockId) {
        self.pending.push(self.code.len());
        self.code.push(Instruction::Jump(Label::Block(target)));
    }

    fn emit_cbranch(&mut self, test: &str, if_true: BlockId, if_false: BlockId) {
        self.pending.push(self.code.len());
        self.code.push(Instruction::CBranch {
            test: test.to_string(),
            if_true: Label::Block(if_true),
            if_false: Label::Block(if_false),
        });
    }

    /// Replace every block label with the start index of its block
    fn patch(&mut self) -> Result<(), LinkError> {
        for &address in &self.pending {
            let Some(instr) = self.code.get_mut(address) else {
                continue;
            };
            for label in instr.labels_mut() {
                if let Label::Block(block) = *label {
                    let start = self
                        .block_starts
                        .get(&block)
                        .ok_or(LinkError::UnresolvedTarget { address, block })?;
                    *label = Label::Address(*start);
                }
            }
        }
        Ok(())
    }
}

impl Default for Linker {
    fn default() -> Self {
        Self::new()
    }
}
