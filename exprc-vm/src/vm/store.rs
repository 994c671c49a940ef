//! Flat variable store
//!
//! Named cells for declared variables, temporaries and bound extern
//! functions share one namespace. Declared variables are tracked separately
//! so that `store_<type>` can refuse writes to names that were never
//! allocated.

use super::value::Value;
use crate::error::VmError;
use exprc_common::ScalarType;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct Store {
    cells: HashMap<String, Value>,
    allocated: HashSet<String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.allocated.clear();
    }

    /// Declare `name` and set it to the type's zero value
    pub fn alloc(&mut self, name: &str, ty: ScalarType) {
        self.allocated.insert(name.to_string());
        self.cells.insert(name.to_string(), Value::from(ty.zero_value()));
    }

    /// Write a temporary or a binding
    pub fn set(&mut self, name: &str, value: Value) {
        self.cells.insert(name.to_string(), value);
    }

    /// Write a declared variable
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), VmError> {
        if !self.allocated.contains(name) {
            return Err(VmError::UnallocatedVariable(name.to_string()));
        }
        self.cells.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.get(name)
    }

    pub fn read(&self, name: &str) -> Result<&Value, VmError> {
        self.cells
            .get(name)
            .ok_or_else(|| VmError::UnboundVariable(name.to_string()))
    }

    /// Read `name`, requiring a value of type `ty`
    pub fn read_typed(&self, name: &str, ty: ScalarType) -> Result<&Value, VmError> {
        let value = self.read(name)?;
        if value.scalar_type() == Some(ty) {
            Ok(value)
        } else {
            Err(VmError::TypeMismatch {
                name: name.to_string(),
                expected: ty.name().to_string(),
                found: value.type_name().to_string(),
            })
        }
    }

    pub fn is_allocated(&self, name: &str) -> bool {
        self.allocated.contains(name)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_sets_zero_value() {
        let mut store = Store::new();
        store.alloc("s", ScalarType::String);
        store.alloc("b", ScalarType::Bool);
        assert_eq!(store.get("s"), Some(&Value::String(String::new())));
        assert_eq!(store.get("b"), Some(&Value::Bool(false)));
        assert!(store.is_allocated("s"));
    }

    #[test]
    fn test_assign_requires_alloc() {
        let mut store = Store::new();
        assert_eq!(
            store.assign("x", Value::Int(1)),
            Err(VmError::UnallocatedVariable("x".to_string()))
        );
        store.alloc("x", ScalarType::Int);
        store.assign("x", Value::Int(1)).unwrap();
        assert_eq!(store.read("x"), Ok(&Value::Int(1)));
    }

    #[test]
    fn test_typed_reads() {
        let mut store = Store::new();
        store.set("__float_0", Value::Float(1.5));
        assert!(store.read_typed("__float_0", ScalarType::Float).is_ok());
        assert_eq!(
            store.read_typed("__float_0", ScalarType::Int),
            Err(VmError::TypeMismatch {
                name: "__float_0".to_string(),
                expected: "int".to_string(),
                found: "float".to_string(),
            })
        );
        assert_eq!(store.read("nope"), Err(VmError::UnboundVariable("nope".to_string())));
    }
}
