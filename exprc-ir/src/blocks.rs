//! Basic Block Management
//!
//! Basic blocks live in an arena (`BlockGraph`) and refer to each other by
//! `BlockId`. This includes the loop back edge: a loop body does not hold a
//! reference to its header, the linker emits the closing jump by id.

use exprc_common::BlockId;
use std::collections::HashSet;
use std::fmt::Write as _;
use crate::instructions::Instruction;

/// The three block variants of the control-flow graph
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Straight-line code; control continues at `next_block`
    Straight,

    /// Branches on `test`; both arms rejoin at the block's `next_block`
    Conditional {
        test: String,
        if_branch: BlockId,
        else_branch: Option<BlockId>,
    },

    /// Re-evaluates `test` before every iteration of `body`; exits to the
    /// block's `next_block`
    Loop { test: String, body: BlockId },
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Straight => "straight",
            BlockKind::Conditional { .. } => "conditional",
            BlockKind::Loop { .. } => "loop",
        }
    }
}

/// Basic Block - a sequence of instructions with a single entry and exit
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    pub instructions: Vec<Instruction>,
    pub next_block: Option<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            kind: BlockKind::Straight,
            instructions: Vec::new(),
            next_block: None,
        }
    }

    pub fn add_instruction(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Arena of basic blocks rooted at a start block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGraph {
    blocks: Vec<BasicBlock>,
    start: BlockId,
}

impl BlockGraph {
    /// Create a graph holding only an empty start block
    pub fn new() -> Self {
        Self {
            blocks: vec![BasicBlock::new(0)],
            start: 0,
        }
    }

    /// Allocate a fresh, empty straight block
    pub fn add_block(&mut self) -> BlockId {
        let id = self.blocks.len() as BlockId;
        self.blocks.push(BasicBlock::new(id));
        id
    }

    pub fn start(&self) -> BlockId {
        self.start
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id as usize)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    /// Render the graph block by block, in the order the linker lays it out
    pub fn display(&self) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();
        self.display_chain(self.start, &mut visited, &mut out);
        out
    }

    fn display_chain(&self, first: BlockId, visited: &mut HashSet<BlockId>, out: &mut String) {
        let mut current = Some(first);
        while let Some(id) = current {
            let Some(block) = self.block(id) else {
                let _ = writeln!(out, "block {id}: <missing>");
                return;
            };
            if !visited.insert(id) {
                return;
            }

            let _ = write!(out, "block {id} ({})", block.kind.name());
            match &block.kind {
                BlockKind::Straight => {}
                BlockKind::Conditional { test, if_branch, else_branch } => {
                    let _ = write!(out, " test={test} then={if_branch}");
                    if let Some(else_branch) = else_branch {
                        let _ = write!(out, " else={else_branch}");
                    }
                }
                BlockKind::Loop { test, body } => {
                    let _ = write!(out, " test={test} body={body}");
                }
            }
            if let Some(next) = block.next_block {
                let _ = write!(out, " next={next}");
            }
            out.push('\n');
            for instr in &block.instructions {
                let _ = writeln!(out, "    {instr}");
            }

            match &block.kind {
                BlockKind::Straight => {}
                BlockKind::Conditional { if_branch, else_branch, .. } => {
                    self.display_chain(*if_branch, visited, out);
                    if let Some(else_branch) = else_branch {
                        self.display_chain(*else_branch, visited, out);
                    }
                }
                BlockKind::Loop { body, .. } => self.display_chain(*body, visited, out),
            }
            current = block.next_block;
        }
    }
}

impl Default for BlockGraph {
    fn default() -> Self {
        Self::new()
    }
}
