// src/core/matrix.rs

//! Dense complex matrices for block unitaries.
//!
//! Single-qubit gates stay as fixed 2x2 arrays; composite blocks (cached
//! entanglers, kron-strategy layers) need a square matrix of runtime
//! dimension `2^n`, stored row-major over a flat vector.

use num_complex::Complex;
use num_traits::Zero;

/// A 2x2 complex matrix, the unitary of a single-qubit gate.
pub(crate) type Mat2 = [[Complex<f64>; 2]; 2];

/// A dense square complex matrix of dimension `2^n`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    dim: usize,
    data: Vec<Complex<f64>>,
}

impl DenseMatrix {
    /// The 1x1 identity, the seed value for Kronecker folds.
    pub(crate) fn scalar_identity() -> Self {
        Self {
            dim: 1,
            data: vec![Complex::new(1.0, 0.0)],
        }
    }

    /// An all-zero matrix of the given dimension.
    pub(crate) fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![Complex::zero(); dim * dim],
        }
    }

    /// Matrix dimension (rows == columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex<f64> {
        self.data[row * self.dim + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: Complex<f64>) {
        self.data[row * self.dim + col] = value;
    }

    /// Kronecker product `self ⊗ m`, growing the dimension by a factor
    /// of two. Folding gates from the highest qubit down to qubit 1 with
    /// this makes qubit 1 the fastest-varying (least significant) index,
    /// matching the register's bit convention.
    pub(crate) fn kron2(&self, m: &Mat2) -> Self {
        let dim = self.dim * 2;
        let mut out = Self::zeros(dim);
        for r in 0..self.dim {
            for c in 0..self.dim {
                let a = self.get(r, c);
                if a.is_zero() {
                    continue;
                }
                for (br, row) in m.iter().enumerate() {
                    for (bc, b) in row.iter().enumerate() {
                        out.set(r * 2 + br, c * 2 + bc, a * b);
                    }
                }
            }
        }
        out
    }

    /// Dense matrix-vector product `self * v` into a fresh vector.
    pub(crate) fn matvec(&self, v: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let mut out = vec![Complex::zero(); self.dim];
        for (r, slot) in out.iter_mut().enumerate() {
            let row = &self.data[r * self.dim..(r + 1) * self.dim];
            let mut acc = Complex::zero();
            for (a, x) in row.iter().zip(v.iter()) {
                acc += a * x;
            }
            *slot = acc;
        }
        out
    }
}
