// src/simulation/engine.rs

//! Gate-application kernels over the dense state vector.
//!
//! Single-qubit and controlled gates contract a 2x2 unitary against the
//! register in place by iterating basis-index pairs that differ only in
//! the target bit (O(2^n) per gate). Composite dense operators (cached
//! entanglers, kron-strategy layers) go through one full matrix-vector
//! product instead.

use crate::blocks::{Block, LayerStrategy};
use crate::core::matrix::{DenseMatrix, Mat2};
use crate::core::{QcbmError, Register};
use num_complex::Complex;
use num_traits::Zero;

/// Applies a block tree to the register, in place.
pub(crate) fn apply_block(register: &mut Register, block: &Block) -> Result<(), QcbmError> {
    if block.nqubits() != register.nqubits() {
        return Err(QcbmError::ShapeMismatch {
            message: format!(
                "block acts on {} qubits but register has {}",
                block.nqubits(),
                register.nqubits()
            ),
        });
    }
    match block {
        Block::Gate { target, gate, .. } => {
            apply_single_qubit(register, *target, &gate.matrix());
            Ok(())
        }
        Block::Chain { blocks, .. } => {
            // Listed order; gates do not commute.
            for sub in blocks {
                apply_block(register, sub)?;
            }
            Ok(())
        }
        Block::Layer { nqubits, gates, strategy } => match strategy {
            LayerStrategy::Roll => {
                for sub in gates {
                    apply_block(register, sub)?;
                }
                Ok(())
            }
            LayerStrategy::Kron => {
                let op = layer_unitary(*nqubits, gates)?;
                apply_dense(register, &op)
            }
        },
        Block::Control { controls, target, gate, .. } => {
            apply_controlled(register, controls, *target, &gate.matrix());
            Ok(())
        }
        Block::Cached(cached) => {
            let matrix = cached.matrix_or_build(block_unitary)?;
            apply_dense(register, matrix)
        }
    }
}

/// Applies a 2x2 unitary to one qubit of the register.
///
/// Iterates over pairs of basis states differing only at the target bit
/// position and mixes each amplitude pair in place; the pairs are
/// disjoint, so no scratch vector is needed.
fn apply_single_qubit(register: &mut Register, target: usize, matrix: &Mat2) {
    let k = target - 1; // bit position, qubit 1 = least significant
    let k_mask = 1usize << k;
    let lower_mask = k_mask - 1;
    let dim = register.dim();
    let amps = register.amplitudes_mut();

    for i in 0..dim / 2 {
        // Spread the compact index i into a full index with a 0 at bit k.
        let i0 = ((i >> k) << (k + 1)) | (i & lower_mask);
        let i1 = i0 | k_mask;

        let psi_0 = amps[i0]; // amplitude for |...target=0...>
        let psi_1 = amps[i1]; // amplitude for |...target=1...>

        amps[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
        amps[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
    }
}

/// Applies a 2x2 unitary to the target qubit, restricted to the subspace
/// where every control qubit reads one; identity elsewhere.
fn apply_controlled(register: &mut Register, controls: &[usize], target: usize, matrix: &Mat2) {
    let k = target - 1;
    let k_mask = 1usize << k;
    let lower_mask = k_mask - 1;
    let control_mask = controls
        .iter()
        .fold(0usize, |mask, &c| mask | (1usize << (c - 1)));
    let dim = register.dim();
    let amps = register.amplitudes_mut();

    for i in 0..dim / 2 {
        let i0 = ((i >> k) << (k + 1)) | (i & lower_mask);
        if i0 & control_mask != control_mask {
            continue; // some control reads zero; leave the pair alone
        }
        let i1 = i0 | k_mask;

        let psi_0 = amps[i0];
        let psi_1 = amps[i1];

        amps[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
        amps[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
    }
}

/// Applies a dense `2^n x 2^n` operator with one matrix-vector product.
fn apply_dense(register: &mut Register, matrix: &DenseMatrix) -> Result<(), QcbmError> {
    if matrix.dim() != register.dim() {
        return Err(QcbmError::ShapeMismatch {
            message: format!(
                "dense operator dimension {} does not match register dimension {}",
                matrix.dim(),
                register.dim()
            ),
        });
    }
    let out = matrix.matvec(register.amplitudes());
    *register.amplitudes_mut() = out;
    Ok(())
}

/// The full tensor-product operator of a layer: the per-qubit 2x2
/// unitaries folded with Kronecker products from the highest qubit down,
/// so qubit 1 ends up as the fastest-varying index.
fn layer_unitary(nqubits: usize, gates: &[Block]) -> Result<DenseMatrix, QcbmError> {
    let mut op = DenseMatrix::scalar_identity();
    for q in (1..=nqubits).rev() {
        let local = local_unitary(&gates[q - 1], q)?;
        op = op.kron2(&local);
    }
    Ok(op)
}

/// The combined 2x2 unitary of a block that is local to `qubit`:
/// a gate's matrix, or the ordered product of a chain of them.
fn local_unitary(block: &Block, qubit: usize) -> Result<Mat2, QcbmError> {
    match block {
        Block::Gate { target, gate, .. } if *target == qubit => Ok(gate.matrix()),
        Block::Chain { blocks, .. } => {
            let mut acc = identity2();
            for sub in blocks {
                // Applying a after b means multiplying a's matrix on the left.
                acc = matmul2(&local_unitary(sub, qubit)?, &acc);
            }
            Ok(acc)
        }
        _ => Err(QcbmError::ShapeMismatch {
            message: format!("block {} is not local to qubit {}", block, qubit),
        }),
    }
}

/// The dense unitary of an arbitrary block, built column by column:
/// column `c` is the block applied to the basis register `|c>`.
pub(crate) fn block_unitary(block: &Block) -> Result<DenseMatrix, QcbmError> {
    let nqubits = block.nqubits();
    let dim = 1usize << nqubits;
    let mut out = DenseMatrix::zeros(dim);
    for col in 0..dim {
        let mut reg = Register::basis(nqubits, col)?;
        apply_block(&mut reg, block)?;
        for (row, amp) in reg.amplitudes().iter().enumerate() {
            out.set(row, col, *amp);
        }
    }
    Ok(out)
}

fn identity2() -> Mat2 {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(1.0, 0.0)],
    ]
}

/// 2x2 matrix product `a * b`.
fn matmul2(a: &Mat2, b: &Mat2) -> Mat2 {
    let mut out = [[Complex::zero(); 2]; 2];
    for (r, out_row) in out.iter_mut().enumerate() {
        for (c, slot) in out_row.iter_mut().enumerate() {
            *slot = a[r][0] * b[0][c] + a[r][1] * b[1][c];
        }
    }
    out
}
