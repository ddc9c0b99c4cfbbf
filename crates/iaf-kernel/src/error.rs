//! Error types for the neuron kernel

use thiserror::Error;

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors that can occur while configuring or driving a neuron kernel
#[derive(Error, Debug)]
pub enum KernelError {
    /// A model constant or the simulation resolution is out of range.
    /// The neuron cannot run until this is fixed.
    #[error("Invalid configuration of {parameter}: {value} (expected {constraint})")]
    Configuration {
        /// Parameter name
        parameter: String,
        /// Offending value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Per-neuron input slices do not line up with the kernels of a batch
    #[error("Input length mismatch: expected {expected} entries, got {actual}")]
    InputLength {
        /// Number of kernels in the batch
        expected: usize,
        /// Length of the offending input slice
        actual: usize,
    },

    /// Parameter file could not be parsed
    #[error("Invalid parameter file: {reason}")]
    ConfigFile {
        /// Parser message
        reason: String,
    },

    /// Parameter file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KernelError {
    /// Create a configuration error
    pub fn configuration(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a parameter file error
    pub fn config_file(reason: impl Into<String>) -> Self {
        Self::ConfigFile {
            reason: reason.into(),
        }
    }

    /// Whether this error came from an out-of-range model constant
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Reject values that are not strictly positive and finite
pub(crate) fn require_positive(parameter: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(KernelError::configuration(parameter, value.to_string(), "> 0.0 and finite"))
    }
}
