//! Expr Compiler - Interpreter
//!
//! Executes linked three-address programs. Extern functions are resolved
//! through an injected list of capability namespaces.

pub mod capability;
pub mod config;
pub mod vm;
mod error;

pub use capability::{capability_by_name, default_capabilities, Capability, NativeCall, NativeFunction};
pub use config::{UnknownOpcodePolicy, VmConfig};
pub use error::VmError;
pub use vm::{BoundFunction, Interpreter, Store, VMState, Value};

use exprc_ir::Program;

/// Run `program` to completion, printing to stdout
pub fn run_program(program: &Program, capabilities: Vec<Box<dyn Capability>>) -> Result<(), VmError> {
    Interpreter::new(program, capabilities).run()
}
