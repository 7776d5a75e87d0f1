// src/training/mod.rs

//! Trains a Born machine circuit against a target distribution.
//!
//! The loss is the kernel MMD between the circuit's output distribution
//! and the target; gradients come from the parameter-shift rule (two
//! extra simulation passes per rotation parameter, at angle ± π/2); the
//! Adam optimizer consumes them. Everything is single-threaded and
//! deterministic given a seed.

use crate::circuits::Qcbm;
use crate::core::QcbmError;
use crate::mmd::RbfMmd;
use crate::optim::{Adam, AdamConfig};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Options for one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    /// Optimizer hyperparameters.
    pub optimizer: AdamConfig,
    /// Kernel bandwidth for the MMD loss.
    pub kernel_sigma: f64,
    /// Number of optimization iterations.
    pub iterations: usize,
    /// Seed for the uniform `[0, 2π)` parameter initialization; `None`
    /// seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            optimizer: AdamConfig::default(),
            kernel_sigma: 0.25,
            iterations: 100,
            seed: None,
        }
    }
}

/// The MMD loss of the circuit against `target`:
/// `delta^T K delta` with `delta = probabilities - target`.
///
/// The target must sum to 1; that is the caller's contract and is not
/// validated here.
pub fn loss(circuit: &Qcbm, kernel: &RbfMmd, target: &[f64]) -> Result<f64, QcbmError> {
    let probs = circuit.probabilities()?;
    kernel.squared_discrepancy(&probs, target)
}

/// The loss gradient with respect to every rotation parameter, by the
/// parameter-shift rule, indexed identically to [`Qcbm::parameters`].
///
/// For each parameter the circuit is evaluated at angle θ ± π/2; the
/// entry is
/// `(K(p, p+) - K(p, p-)) - (K(t, p+) - K(t, p-))`
/// with `p` the unshifted distribution (computed once) and `t` the
/// target. The original angles are restored bit-identically before the
/// next parameter is touched and re-dispatched before returning, so the
/// circuit leaves this function exactly as it entered.
///
/// Cost: two simulation passes per parameter; this dominates training.
pub fn gradient(circuit: &mut Qcbm, kernel: &RbfMmd, target: &[f64]) -> Result<Vec<f64>, QcbmError> {
    let base = circuit.parameters();
    let prob = circuit.probabilities()?;

    let mut shifted = base.clone();
    let mut grad = vec![0.0; base.len()];

    for i in 0..base.len() {
        shifted[i] = base[i] + FRAC_PI_2;
        circuit.dispatch(&shifted)?;
        let prob_pos = circuit.probabilities()?;

        shifted[i] = base[i] - FRAC_PI_2;
        circuit.dispatch(&shifted)?;
        let prob_neg = circuit.probabilities()?;

        shifted[i] = base[i];

        grad[i] = (kernel.expect(&prob, &prob_pos)? - kernel.expect(&prob, &prob_neg)?)
            - (kernel.expect(target, &prob_pos)? - kernel.expect(target, &prob_neg)?);
    }

    circuit.dispatch(&base)?;
    Ok(grad)
}

/// Runs the full training loop, returning the loss history.
///
/// Initializes the circuit's parameters uniformly at random in
/// `[0, 2π)`, builds one kernel for the circuit's qubit count, then per
/// iteration: compute the gradient, record the loss of the *pre-update*
/// parameters, apply the Adam step, and dispatch the updated parameters
/// back into the circuit.
///
/// With `iterations == 0` the circuit is left completely untouched and
/// the history is empty. The trained parameters and output distribution
/// are readable from `circuit` afterwards.
pub fn train(
    circuit: &mut Qcbm,
    target: &[f64],
    config: &TrainingConfig,
) -> Result<Vec<f64>, QcbmError> {
    if config.iterations == 0 {
        return Ok(Vec::new());
    }

    let dim = 1usize << circuit.nqubits();
    if target.len() != dim {
        return Err(QcbmError::ShapeMismatch {
            message: format!(
                "target distribution has length {}, circuit basis has {}",
                target.len(),
                dim
            ),
        });
    }

    let kernel = RbfMmd::new(circuit.nqubits(), config.kernel_sigma)?;

    let mut rng: StdRng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut params: Vec<f64> = (0..circuit.parameter_count())
        .map(|_| rng.random::<f64>() * TAU)
        .collect();
    circuit.dispatch(&params)?;

    let mut optimizer = Adam::new(config.optimizer, params.len());
    let mut history = Vec::with_capacity(config.iterations);

    for _ in 0..config.iterations {
        let grad = gradient(circuit, &kernel, target)?;
        // Record the loss of the parameters the gradient was taken at,
        // before the update.
        history.push(loss(circuit, &kernel, target)?);
        optimizer.step(&mut params, &grad)?;
        circuit.dispatch(&params)?;
    }

    Ok(history)
}

/// A discretized Gaussian density over the basis integers `0..2^n - 1`,
/// normalized to sum to 1. The illustrative target distribution for a
/// Born machine demo.
pub fn gaussian_target(nqubits: usize, mu: f64, sigma: f64) -> Result<Vec<f64>, QcbmError> {
    if !(sigma > 0.0) {
        return Err(QcbmError::Numerical {
            message: format!("target density width must be positive, got {}", sigma),
        });
    }
    let dim = 1usize << nqubits;
    let mut density: Vec<f64> = (0..dim)
        .map(|x| {
            let z = (x as f64 - mu) / sigma;
            (-0.5 * z * z).exp()
        })
        .collect();
    let total: f64 = density.iter().sum();
    for p in &mut density {
        *p /= total;
    }
    Ok(density)
}
