// src/core/register.rs

use crate::core::QcbmError;
use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// The simulated quantum state: a complex vector of length `2^n` over the
/// computational basis of an `n`-qubit register.
///
/// Qubits are numbered `1..=n`; qubit `q` corresponds to bit position
/// `q - 1` of a basis index (little endian, so basis index 1 is qubit 1
/// in state one and all others in state zero).
///
/// A register is exclusively owned by its caller and threaded through
/// `simulation::apply`; every apply of a unitary block preserves the
/// Euclidean norm of the vector.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct Register {
    /// Basis amplitudes, indexed by computational basis integer.
    amplitudes: Vec<Complex<f64>>,
    /// Number of qubits (N); `amplitudes.len() == 2^N`.
    nqubits: usize,
}

impl Register {
    /// Creates the all-zero register `|0...0>` on `nqubits` qubits.
    pub fn zero(nqubits: usize) -> Result<Self, QcbmError> {
        if nqubits == 0 {
            return Err(QcbmError::Configuration {
                message: "Cannot create a register with zero qubits".to_string(),
            });
        }
        let dim = 1usize
            .checked_shl(nqubits as u32)
            .ok_or_else(|| QcbmError::Configuration {
                message: format!(
                    "Qubit count {} too large, state vector dimension overflows usize",
                    nqubits
                ),
            })?;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Ok(Self { amplitudes, nqubits })
    }

    /// Creates the computational basis register `|index>`.
    pub(crate) fn basis(nqubits: usize, index: usize) -> Result<Self, QcbmError> {
        let mut reg = Self::zero(nqubits)?;
        if index >= reg.dim() {
            return Err(QcbmError::ShapeMismatch {
                message: format!(
                    "Basis index {} out of range for {} qubits (dim {})",
                    index,
                    nqubits,
                    reg.dim()
                ),
            });
        }
        reg.amplitudes[0] = Complex::zero();
        reg.amplitudes[index] = Complex::new(1.0, 0.0);
        Ok(reg)
    }

    /// Number of qubits represented by this register.
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// Dimension of the state vector (`2^n`).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Read-only access to the basis amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    /// Mutable access for the simulation engine.
    pub(crate) fn amplitudes_mut(&mut self) -> &mut Vec<Complex<f64>> {
        &mut self.amplitudes
    }

    /// Squared-magnitude distribution over basis outcomes.
    ///
    /// For a normalized register this sums to 1 and is the Born-rule
    /// measurement distribution of the state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Euclidean norm of the state vector.
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|c| c.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Register[{} qubits: ", self.nqubits)?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
