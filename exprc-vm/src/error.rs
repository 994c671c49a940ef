//! Runtime error types

use exprc_common::{BlockId, CompilerError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("interpreter has not been started")]
    NotStarted,

    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("store to unallocated variable '{0}'")]
    UnallocatedVariable(String),

    #[error("'{name}' holds a {found} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("extern function '{0}' not found in any capability namespace")]
    ExternNotFound(String),

    #[error("unknown capability namespace '{0}'")]
    UnknownCapability(String),

    #[error("'{function}' expects {expected} arguments, found {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' is not a bound extern function")]
    NotCallable(String),

    #[error("extern function '{function}' failed: {message}")]
    ExternCallFailed { function: String, message: String },

    #[error("no handler for opcode '{opcode}' at {pc}")]
    UnknownOpcode { opcode: String, pc: usize },

    #[error("wrong PC {pc}: program has {len} instructions")]
    PcOutOfRange { pc: usize, len: usize },

    #[error("jump to unlinked block {0}")]
    UnresolvedLabel(BlockId),

    #[error("integer division by zero")]
    DivisionByZero,

    #[error("'{opcode}' is not supported on {operands}")]
    Unsupported { opcode: String, operands: String },

    #[error("step limit of {0} instructions exceeded")]
    StepLimitExceeded(u64),

    #[error("output error: {0}")]
    Io(String),
}

impl From<VmError> for CompilerError {
    fn from(err: VmError) -> Self {
        CompilerError::runtime_error(err.to_string())
    }
}
