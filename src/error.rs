//! Error types for the projection model
//!
//! Validation problems abort a run, an undefined ROI is recovered by the
//! caller, and output failures are fatal for the run but leave the computed
//! projection untouched.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// The main error type for model operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// An assumption failed validation (negative amount, zero horizon, bad field)
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A ratio has a zero denominator (e.g. ROI with no CapEx)
    #[error("Division undefined: {what}")]
    DivisionUndefined { what: &'static str },

    /// A worksheet or chart image could not be written or read back
    #[error("Output failure at {}: {reason}", path.display())]
    OutputWrite { path: PathBuf, reason: String },
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A sum or product left the representable decimal range
    pub fn overflow(field: impl Into<String>) -> Self {
        Self::invalid(field, "amount overflow")
    }

    pub fn output(path: &Path, reason: impl ToString) -> Self {
        Self::OutputWrite {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Whether the run can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DivisionUndefined { .. })
    }
}
