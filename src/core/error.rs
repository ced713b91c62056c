/*!
# Unified Error Type

This module provides the unified error enum used across the retime crate.
Validation failures are surfaced at the boundary where they occur; an
infeasible target clock period is *not* an error (the feasibility oracles
return `None` for it), so there is no error variant for infeasibility.
*/

use std::error::Error;
use std::fmt;

/// Unified error type for all retime operations.
#[derive(Debug)]
pub enum RetimeError {
    /// Malformed circuit construction input: length mismatch, negative
    /// delay or register count, no registered edge, or a zero-weight cycle.
    InvalidInput(String),

    /// Invalid parameter passed to a collaborator (generator, renderer).
    InvalidArgument(String),

    /// Invariant violation inside the library; indicates a bug or a caller
    /// that bypassed validation.
    Internal(String),

    /// I/O error while writing a rendered circuit.
    Io(String),
}

impl RetimeError {
    /// Creates an invalid-input error with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RetimeError::InvalidInput(message.into())
    }

    /// Creates an invalid-argument error with the given message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RetimeError::InvalidArgument(message.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        RetimeError::Internal(message.into())
    }
}

impl fmt::Display for RetimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RetimeError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            RetimeError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            RetimeError::Internal(msg) => write!(f, "Internal error: {}", msg),
            RetimeError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for RetimeError {}

impl From<std::io::Error> for RetimeError {
    fn from(e: std::io::Error) -> Self {
        RetimeError::Io(e.to_string())
    }
}
