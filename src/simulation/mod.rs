// src/simulation/mod.rs

//! Applies a [`Block`] tree to a [`Register`], producing a new state
//! deterministically.
//!
//! Apply is referentially transparent: identical (register, block) pairs
//! always yield identical output, with no internal randomness. The
//! register is exclusively owned by the caller and mutated in place.

pub(crate) mod engine;

use crate::blocks::Block;
use crate::core::{QcbmError, Register};
use crate::validation;

/// Applies `block` to `register` in place.
///
/// Fails with [`QcbmError::ShapeMismatch`] if the block's qubit count
/// differs from the register's. Unitarity of every primitive gate
/// guarantees the register norm stays 1.
pub fn apply(register: &mut Register, block: &Block) -> Result<(), QcbmError> {
    engine::apply_block(register, block)
}

/// Applies `block` to the all-zero register and returns the result.
pub fn run(block: &Block) -> Result<Register, QcbmError> {
    let mut register = Register::zero(block.nqubits())?;
    engine::apply_block(&mut register, block)?;
    Ok(register)
}

/// The Born-rule measurement distribution of `block` applied to the
/// all-zero register: squared magnitudes of the final state vector.
///
/// Surfaces [`QcbmError::Numerical`] if any entry is NaN or infinite
/// rather than letting a poisoned distribution propagate into training.
pub fn probabilities(block: &Block) -> Result<Vec<f64>, QcbmError> {
    let register = run(block)?;
    let probs = register.probabilities();
    validation::check_distribution(&probs)?;
    Ok(probs)
}
