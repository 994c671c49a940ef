//! Expr Compiler - Common Types and Utilities
//!
//! This crate contains shared types and error definitions used across all
//! components of the Expr compiler: the scalar type system, literal
//! constants and the top-level error type.

pub mod error;
pub mod types;

pub use error::CompilerError;
pub use types::*;
