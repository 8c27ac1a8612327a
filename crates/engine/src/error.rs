//! Error types for the interpreter bridge
//!
//! This module provides standalone error types for the stu-engine crate,
//! allowing it to be used independently of the stu-astgen driver.

use thiserror::Error;

/// Errors that can occur while driving the external interpreter
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error (invalid engine command, bad inputs)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Bridge transport failed (spawn, pipe, or protocol fault)
    #[error("Bridge operation failed in {operation}: {message}")]
    Bridge {
        /// Name of the bridge operation that failed
        operation: &'static str,
        /// Error message from the transport layer
        message: String,
    },

    /// The interpreter reported an error of its own
    #[error("Interpreter reported {code}: {message}")]
    Interpreter {
        /// Error code from the interpreter side
        code: String,
        /// Error message from the interpreter, hint folded in when present
        message: String,
    },
}

impl EngineError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a bridge transport error
    #[must_use]
    pub fn bridge(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Bridge {
            operation,
            message: message.into(),
        }
    }

    /// Create an interpreter-reported error
    #[must_use]
    pub fn interpreter(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interpreter {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result type for interpreter bridge operations
pub type Result<T> = std::result::Result<T, EngineError>;
