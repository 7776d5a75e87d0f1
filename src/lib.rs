// src/lib.rs

//! `qcbm` - training quantum circuit Born machines
//!
//! A Born machine is a parameterized quantum circuit whose output-state
//! measurement probabilities define a trainable distribution. This crate
//! provides the composable block algebra describing the circuit, a dense
//! state-vector simulator, the kernel MMD loss, parameter-shift
//! gradients, an Adam optimizer, and the training loop tying them
//! together.
//!
//! Train a two-qubit machine toward a discretized Gaussian:
//!
//! ```
//! use qcbm::{Qcbm, TrainingConfig, gaussian_target, ring_pairs, train};
//!
//! # fn main() -> Result<(), qcbm::QcbmError> {
//! let mut circuit = Qcbm::build(2, 2, &ring_pairs(2))?;
//! let target = gaussian_target(2, 1.5, 1.0)?;
//!
//! let config = TrainingConfig {
//!     iterations: 5,
//!     seed: Some(42),
//!     ..TrainingConfig::default()
//! };
//! let history = train(&mut circuit, &target, &config)?;
//! assert_eq!(history.len(), 5);
//!
//! // The trained parameters and distribution stay readable afterwards.
//! let probs = circuit.probabilities()?;
//! assert_eq!(probs.len(), 4);
//! assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! The block algebra also stands on its own for plain simulation:
//!
//! ```
//! use qcbm::blocks::{Axis, Block, Gate};
//! use qcbm::{Register, simulation};
//!
//! # fn main() -> Result<(), qcbm::QcbmError> {
//! // A Bell-like chain: Rx(pi/2) on qubit 1, then CNOT(1 -> 2).
//! let circuit = Block::chain(2, vec![
//!     Block::rotation(2, 1, Axis::X, std::f64::consts::FRAC_PI_2)?,
//!     Block::control(2, vec![1], 2, Gate::Pauli(Axis::X))?,
//! ])?;
//!
//! let mut register = Register::zero(2)?;
//! simulation::apply(&mut register, &circuit)?;
//! assert!((register.norm() - 1.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod blocks;
pub mod simulation;
pub mod circuits;
pub mod mmd;
pub mod optim;
pub mod training;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use crate::core::{QcbmError, Register};
pub use blocks::{Axis, Block, Gate, LayerStrategy};
pub use circuits::{LayerKind, Qcbm, RotationLayerTemplate, ring_pairs};
pub use mmd::RbfMmd;
pub use optim::{Adam, AdamConfig};
pub use training::{TrainingConfig, gaussian_target, gradient, loss, train};
pub use validation::{check_distribution, check_normalization};
