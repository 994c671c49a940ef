use crate::error::VmError;

/// Interpreter execution states
#[derive(Debug, Clone, PartialEq)]
pub enum VMState {
    Setup,
    Running,
    Halted,
    Error(VmError),
}
