//! Intermediate Representation for the Expr language
//!
//! Three-address instructions grouped into a graph of basic blocks, and the
//! linker that flattens the graph into an addressable program.
//!
//! ## Architecture
//!
//! - `ops` - Arithmetic, unary and comparison operations
//! - `instructions` - Instruction set and its tuple wire format
//! - `blocks` - Basic blocks and the block arena
//! - `builder` - IR construction utilities
//! - `linker` - Layout and jump resolution

pub use self::ops::{CompareOp, IrBinaryOp, IrUnaryOp};
pub use self::instructions::{DecodeError, Instruction, Label, Operand};
pub use self::blocks::{BasicBlock, BlockGraph, BlockKind};
pub use self::builder::{BuildError, IrBuilder};
pub use self::linker::{LinkError, Linker, Program};

mod ops;
mod instructions;
mod blocks;
mod builder;
mod linker;
