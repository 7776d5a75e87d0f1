//! Error handling logic

use std::fmt;

/// Error types for circuit construction, simulation and training.
///
/// All failures in this crate are synchronous validation errors on
/// malformed input or an internal invariant violation; there is no retry
/// or partial-recovery path, since every operation is deterministic aside
/// from explicit, caller-visible mutation of owned state (register,
/// parameters, optimizer moments).
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum QcbmError {
    /// A circuit-level configuration is invalid, e.g. a layer count below
    /// one or an entangler pair referencing a qubit outside `[1, n]`.
    Configuration {
        /// Configuration failure message
        message: String,
    },

    /// Blocks of differing qubit counts were composed, or a layer entry
    /// is not local to its assigned qubit.
    ShapeMismatch {
        /// ShapeMismatch failure message
        message: String,
    },

    /// A raw parameter vector was dispatched whose length differs from
    /// the circuit's expected parameter count.
    ParameterCount {
        /// Number of rotation parameters the block tree expects
        expected: usize,
        /// Number of values the caller supplied
        found: usize,
    },

    /// A numeric quantity left its valid domain, e.g. a non-positive
    /// kernel bandwidth or a NaN/Inf amplitude in a probability vector.
    Numerical {
        /// Numerical failure message
        message: String,
    },
}

impl fmt::Display for QcbmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QcbmError::Configuration { message } => write!(f, "Configuration Error: {}", message),
            QcbmError::ShapeMismatch { message } => write!(f, "Shape Mismatch: {}", message),
            QcbmError::ParameterCount { expected, found } => write!(
                f,
                "Parameter Count Mismatch: circuit expects {} parameters, got {}",
                expected, found
            ),
            QcbmError::Numerical { message } => write!(f, "Numerical Error: {}", message),
        }
    }
}

// Implement the standard Error trait to allow for easy integration with Rust error handling.
impl std::error::Error for QcbmError {}
