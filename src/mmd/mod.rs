// src/mmd/mod.rs

//! Kernel machinery for the Maximum Mean Discrepancy (MMD) loss.
//!
//! The kernel is a fixed similarity matrix over the `2^n` basis outcomes,
//! built once per training run; the loss and gradient reduce to the
//! bilinear form [`RbfMmd::expect`] over probability vectors.

use crate::core::QcbmError;
use std::fmt;

/// A radial-basis-function kernel over the integer basis `0..2^n - 1`,
/// with the dense similarity matrix precomputed.
///
/// `matrix[i][j] = exp(-(i - j)^2 * gamma)` with `gamma = 1 / (2 * sigma)`.
/// Note the bandwidth transform is `1/(2σ)`, not the conventional
/// squared-exponential `1/(2σ²)`; this reproduces the upstream trainer's
/// numeric behavior and is kept deliberately.
#[derive(Debug, Clone, PartialEq)]
pub struct RbfMmd {
    sigma: f64,
    dim: usize,
    /// Row-major `dim x dim` similarity matrix.
    matrix: Vec<f64>,
}

impl RbfMmd {
    /// Builds the kernel for an `nqubits` register.
    ///
    /// Fails with [`QcbmError::Numerical`] when `sigma <= 0` (degenerate
    /// bandwidth) or when the qubit count is zero.
    pub fn new(nqubits: usize, sigma: f64) -> Result<Self, QcbmError> {
        if nqubits == 0 {
            return Err(QcbmError::Numerical {
                message: "kernel needs at least one qubit".to_string(),
            });
        }
        if !(sigma > 0.0) {
            return Err(QcbmError::Numerical {
                message: format!("kernel bandwidth must be positive, got {}", sigma),
            });
        }
        let dim = 1usize << nqubits;
        let gamma = 1.0 / (2.0 * sigma);
        let mut matrix = vec![0.0; dim * dim];
        for i in 0..dim {
            for j in 0..dim {
                let d = i as f64 - j as f64;
                matrix[i * dim + j] = (-d * d * gamma).exp();
            }
        }
        Ok(Self { sigma, dim, matrix })
    }

    /// Kernel bandwidth.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Basis dimension (`2^n`).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Similarity entry for basis outcomes `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i * self.dim + j]
    }

    /// The bilinear form `p^T K q`.
    ///
    /// Neither argument needs to be normalized; the loss passes the
    /// difference vector `probabilities - target` through here.
    pub fn expect(&self, p: &[f64], q: &[f64]) -> Result<f64, QcbmError> {
        if p.len() != self.dim || q.len() != self.dim {
            return Err(QcbmError::ShapeMismatch {
                message: format!(
                    "kernel expects vectors of length {}, got {} and {}",
                    self.dim,
                    p.len(),
                    q.len()
                ),
            });
        }
        let mut total = 0.0;
        for (i, pi) in p.iter().enumerate() {
            if *pi == 0.0 {
                continue;
            }
            let row = &self.matrix[i * self.dim..(i + 1) * self.dim];
            let mut acc = 0.0;
            for (k, qj) in row.iter().zip(q.iter()) {
                acc += k * qj;
            }
            total += pi * acc;
        }
        Ok(total)
    }

    /// The squared discrepancy `delta^T K delta` with
    /// `delta = p - q`, the scalar the training loop minimizes.
    pub fn squared_discrepancy(&self, p: &[f64], q: &[f64]) -> Result<f64, QcbmError> {
        if p.len() != q.len() {
            return Err(QcbmError::ShapeMismatch {
                message: format!(
                    "cannot compare distributions of lengths {} and {}",
                    p.len(),
                    q.len()
                ),
            });
        }
        let delta: Vec<f64> = p.iter().zip(q.iter()).map(|(a, b)| a - b).collect();
        self.expect(&delta, &delta)
    }
}

impl fmt::Display for RbfMmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RbfMmd[dim {}, sigma {}]", self.dim, self.sigma)
    }
}
