//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Invalid user input
    InvalidInput(String),

    /// The job ended with its error flag set
    DerivationFailed { message: String, hint: String },

    /// The job was still running at the deadline and has been terminated
    TimedOut { seconds: u64 },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::DerivationFailed { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::TimedOut { seconds } => {
                write!(f, "Derivation did not finish within {}s and was terminated", seconds)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    pub fn out_of_memory(memory_kib: u32) -> Self {
        CliError::DerivationFailed {
            message: format!(
                "Derivation failed: could not allocate {} KiB for the Argon2 memory matrix",
                memory_kib
            ),
            hint: "Hint: lower --memory-kib or free up memory and retry.".to_string(),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::DerivationFailed { .. } => exit_codes::DERIVATION_FAILED,
            CliError::TimedOut { .. } => exit_codes::TIMED_OUT,
        }
    }
}
