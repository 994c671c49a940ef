//! Error handling for the Expr compiler
//!
//! Each pipeline phase defines its own precise error enum; all of them fold
//! into `CompilerError` at the crate boundaries so that the driver deals with
//! a single type.

use thiserror::Error;

/// Main compiler error type that encompasses all phases of the pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Code generation error: {message}")]
    Codegen { message: String },

    #[error("Link error: {message}")]
    Link { message: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create a codegen error
    pub fn codegen_error(message: impl Into<String>) -> Self {
        CompilerError::Codegen { message: message.into() }
    }

    /// Create a link error
    pub fn link_error(message: impl Into<String>) -> Self {
        CompilerError::Link { message: message.into() }
    }

    /// Create a runtime error
    pub fn runtime_error(message: impl Into<String>) -> Self {
        CompilerError::Runtime { message: message.into() }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CompilerError {
    fn from(err: serde_json::Error) -> Self {
        CompilerError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}
