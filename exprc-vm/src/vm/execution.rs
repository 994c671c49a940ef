use super::operations::{binary, coerce, compare, unary};
use super::value::{BoundFunction, Value};
use super::Interpreter;
use crate::config::UnknownOpcodePolicy;
use crate::error::VmError;
use exprc_common::ScalarType;
use exprc_ir::{Instruction, Label};
use log::{debug, warn};
use std::io::Write;

impl<W: Write> Interpreter<'_, W> {
    /// Execute one decoded instruction. `self.pc` already points past it.
    pub(super) fn execute_instruction(&mut self, instr: &Instruction) -> Result<(), VmError> {
        match instr {
            Instruction::Alloc { ty, name } => self.store.alloc(name, *ty),

            Instruction::Literal { ty, value, target } => {
                let value = coerce(target, Value::from(value.clone()), *ty)?;
                self.store.set(target, value);
            }

            Instruction::Load { ty, name, target } => {
                let value = self.store.read_typed(name, *ty)?.clone();
                self.store.set(target, value);
            }

            Instruction::Store { ty, source, name } => {
                let value = self.store.read_typed(source, *ty)?.clone();
                if !self.store.is_allocated(name) {
                    return Err(VmError::UnallocatedVariable(name.clone()));
                }
                // the cell keeps the type it was allocated with
                self.store.read_typed(name, *ty)?;
                self.store.assign(name, value)?;
            }

            Instruction::Binary { op, ty, left, right, target } => {
                let lhs = self.store.read_typed(left, *ty)?;
                let rhs = self.store.read_typed(right, *ty)?;
                let result = binary(*op, *ty, lhs, rhs)?;
                self.store.set(target, result);
            }

            Instruction::Unary { op, ty, source, target } => {
                let value = self.store.read_typed(source, *ty)?;
                let result = unary(*op, *ty, value)?;
                self.store.set(target, result);
            }

            Instruction::Compare { op, ty, left, right, target } => {
                let lhs = self.store.read_typed(left, *ty)?;
                let rhs = self.store.read_typed(right, *ty)?;
                let result = compare(*op, *ty, lhs, rhs)?;
                self.store.set(target, Value::Bool(result));
            }

            Instruction::Print { ty, source } => {
                let value = self.store.read_typed(source, *ty)?;
                writeln!(self.out, "{value}").map_err(|e| VmError::Io(e.to_string()))?;
            }

            Instruction::Jump(label) => {
                self.pc = resolve(label)?;
            }

            Instruction::CBranch { test, if_true, if_false } => {
                let taken = self.store.read_typed(test, ScalarType::Bool)?.as_bool();
                self.pc = if taken { resolve(if_true)? } else { resolve(if_false)? };
            }

            Instruction::ExternFunc { name, return_type, param_types } => {
                self.bind_extern(name, *return_type, param_types)?;
            }

            Instruction::CallFunc { function, args, target } => {
                let result = self.call_extern(function, args)?;
                self.store.set(target, result);
            }

            Instruction::Unknown { opcode, .. } => {
                let pc = self.pc - 1;
                match self.config.unknown_opcode {
                    UnknownOpcodePolicy::Fatal => {
                        return Err(VmError::UnknownOpcode { opcode: opcode.clone(), pc });
                    }
                    UnknownOpcodePolicy::Warn => {
                        warn!("no handler for opcode '{opcode}' at {pc}, skipping");
                    }
                }
            }
        }
        Ok(())
    }

    /// Search the capabilities in order and bind the first match under `name`
    fn bind_extern(
        &mut self,
        name: &str,
        return_type: ScalarType,
        param_types: &[ScalarType],
    ) -> Result<(), VmError> {
        let found = self
            .capabilities
            .iter()
            .find_map(|cap| cap.lookup(name).map(|function| (cap.namespace(), function)));
        let Some((namespace, function)) = found else {
            return Err(VmError::ExternNotFound(name.to_string()));
        };

        if function.arity != param_types.len() {
            return Err(VmError::ArityMismatch {
                function: name.to_string(),
                expected: function.arity,
                found: param_types.len(),
            });
        }

        debug!("bound extern '{name}' from namespace '{namespace}'");
        self.store.set(
            name,
            Value::Function(BoundFunction {
                name: name.to_string(),
                namespace,
                function,
                return_type,
                param_types: param_types.to_vec(),
            }),
        );
        Ok(())
    }

    fn call_extern(&mut self, function: &str, args: &[String]) -> Result<Value, VmError> {
        let bound = match self.store.read(function)? {
            Value::Function(bound) => bound.clone(),
            _ => return Err(VmError::NotCallable(function.to_string())),
        };
        if args.len() != bound.param_types.len() {
            return Err(VmError::ArityMismatch {
                function: function.to_string(),
                expected: bound.param_types.len(),
                found: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, ty) in args.iter().zip(&bound.param_types) {
            let value = self.store.read(arg)?.clone();
            values.push(coerce(arg, value, *ty)?);
        }

        let result = bound.function.invoke(&values).map_err(|message| VmError::ExternCallFailed {
            function: function.to_string(),
            message,
        })?;
        coerce(function, result, bound.return_type)
    }
}

fn resolve(label: &Label) -> Result<usize, VmError> {
    match label {
        Label::Address(address) => Ok(*address),
        Label::Block(block) => Err(VmError::UnresolvedLabel(*block)),
    }
}
