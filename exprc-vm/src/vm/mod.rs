/// VM module - interpreter for linked Expr programs

mod state;
mod value;
mod store;
mod operations;
mod execution;

pub use state::VMState;
pub use value::{BoundFunction, Value};
pub use store::Store;

use crate::capability::Capability;
use crate::config::VmConfig;
use crate::error::VmError;
use exprc_ir::Program;
use log::{debug, trace};
use std::io::{self, Write};

/// Fetch/decode/execute interpreter over a flat instruction sequence
pub struct Interpreter<'p, W: Write> {
    program: &'p Program,

    // Index of the next instruction to fetch
    pc: usize,

    store: Store,
    state: VMState,
    capabilities: Vec<Box<dyn Capability>>,
    config: VmConfig,

    // Per-address execution counters
    hits: Vec<u64>,
    steps: u64,

    out: W,
}

impl<'p> Interpreter<'p, io::Stdout> {
    /// Interpreter printing to stdout
    pub fn new(program: &'p Program, capabilities: Vec<Box<dyn Capability>>) -> Self {
        Self::with_output(program, capabilities, io::stdout())
    }
}

impl<'p, W: Write> Interpreter<'p, W> {
    pub fn with_output(program: &'p Program, capabilities: Vec<Box<dyn Capability>>, out: W) -> Self {
        Self {
            program,
            pc: 0,
            store: Store::new(),
            state: VMState::Setup,
            capabilities,
            config: VmConfig::default(),
            hits: vec![0; program.len()],
            steps: 0,
            out,
        }
    }

    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    /// Discard the store and counters and get ready to run from address 0
    pub fn reset(&mut self) {
        self.pc = 0;
        self.store.clear();
        self.hits = vec![0; self.program.len()];
        self.steps = 0;
        self.state = VMState::Running;
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<(), VmError> {
        match &self.state {
            VMState::Running => {}
            VMState::Halted => return Ok(()),
            VMState::Error(e) => return Err(e.clone()),
            VMState::Setup => return Err(VmError::NotStarted),
        }

        let program = self.program;
        let pc = self.pc;
        if pc == program.len() {
            debug!("halted after {} steps", self.steps);
            self.state = VMState::Halted;
            return Ok(());
        }
        let Some(instr) = program.get(pc) else {
            return Err(self.fail(VmError::PcOutOfRange { pc, len: program.len() }));
        };

        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(self.fail(VmError::StepLimitExceeded(limit)));
            }
        }

        trace!("{pc:4} : {instr}");
        self.hits[pc] += 1;
        self.steps += 1;
        self.pc += 1;

        match self.execute_instruction(instr) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run from the current state until the program halts or faults
    pub fn run(&mut self) -> Result<(), VmError> {
        if matches!(self.state, VMState::Setup) {
            self.reset();
        }
        while matches!(self.state, VMState::Running) {
            self.step()?;
        }
        self.out.flush().map_err(|e| VmError::Io(e.to_string()))?;
        match &self.state {
            VMState::Error(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }

    fn fail(&mut self, err: VmError) -> VmError {
        debug!("fault at pc {}: {err}", self.pc);
        self.state = VMState::Error(err.clone());
        err
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn state(&self) -> &VMState {
        &self.state
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// How many times the instruction at `address` has been executed
    pub fn hit_count(&self, address: usize) -> u64 {
        self.hits.get(address).copied().unwrap_or(0)
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
