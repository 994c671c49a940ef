//! Code generation error types

use exprc_common::{CompilerError, ScalarType};
use exprc_ir::BuildError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("{construct} at line {line} has no resolved type")]
    MissingType { construct: String, line: usize },

    #[error("literal at line {line} is typed {declared} but holds a {found} value")]
    LiteralMismatch {
        declared: ScalarType,
        found: ScalarType,
        line: usize,
    },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl From<CodegenError> for CompilerError {
    fn from(err: CodegenError) -> Self {
        CompilerError::codegen_error(err.to_string())
    }
}
