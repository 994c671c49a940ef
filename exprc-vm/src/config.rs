use crate::capability::{capability_by_name, Capability};
use crate::error::VmError;
use exprc_common::CompilerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the interpreter does with an opcode it has no handler for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOpcodePolicy {
    /// Abort the run
    #[default]
    Fatal,
    /// Log a warning, skip the instruction and continue
    Warn,
}

/// Interpreter settings, readable from a JSON file. Missing fields take
/// their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    pub unknown_opcode: UnknownOpcodePolicy,

    /// Maximum number of executed instructions; unlimited when absent
    pub step_limit: Option<u64>,

    /// Capability namespaces, searched in this order
    pub capabilities: Vec<String>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            unknown_opcode: UnknownOpcodePolicy::Fatal,
            step_limit: None,
            capabilities: vec!["math".to_string(), "os".to_string()],
        }
    }
}

impl VmConfig {
    pub fn from_json(contents: &str) -> Result<Self, CompilerError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Load settings from disk
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), CompilerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Instantiate the configured capability namespaces
    pub fn build_capabilities(&self) -> Result<Vec<Box<dyn Capability>>, VmError> {
        self.capabilities
            .iter()
            .map(|name| capability_by_name(name).ok_or_else(|| VmError::UnknownCapability(name.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = VmConfig::from_json(r#"{"unknown_opcode": "warn"}"#).unwrap();
        assert_eq!(config.unknown_opcode, UnknownOpcodePolicy::Warn);
        assert_eq!(config.step_limit, None);
        assert_eq!(config.capabilities, vec!["math", "os"]);
    }

    #[test]
    fn test_bad_policy_is_rejected() {
        let err = VmConfig::from_json(r#"{"unknown_opcode": "ignore"}"#).unwrap_err();
        assert!(matches!(err, CompilerError::Serialization { .. }));
    }

    #[test]
    fn test_build_capabilities() {
        let config = VmConfig {
            capabilities: vec!["os".to_string()],
            ..VmConfig::default()
        };
        let caps = config.build_capabilities().unwrap();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].namespace(), "os");

        let config = VmConfig {
            capabilities: vec!["net".to_string()],
            ..VmConfig::default()
        };
        assert_eq!(
            config.build_capabilities().err(),
            Some(VmError::UnknownCapability("net".to_string()))
        );
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("exprc-vm-config-{}.json", std::process::id()));
        let config = VmConfig {
            unknown_opcode: UnknownOpcodePolicy::Warn,
            step_limit: Some(500),
            capabilities: vec!["math".to_string()],
        };
        config.save(&path).unwrap();
        let loaded = VmConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
