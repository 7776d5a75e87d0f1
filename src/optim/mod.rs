// src/optim/mod.rs

//! Adam optimizer for the rotation-angle parameter vector.

use crate::core::QcbmError;

/// Adam hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    /// Step size.
    pub learning_rate: f64,
    /// Gradient norm clip threshold; 0 disables clipping.
    pub grad_clip: f64,
    /// Exponential decay rate for the first moment.
    pub beta1: f64,
    /// Exponential decay rate for the second moment.
    pub beta2: f64,
    /// Denominator fuzz to avoid division by zero.
    pub eps: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            grad_clip: 0.0,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }
}

/// Adam state: bias-corrected moving averages of the gradient and the
/// squared gradient.
///
/// Construction takes the parameter-vector length up front, so the
/// moment buffers are allocated (as zeros) from the start; there is no
/// uninitialized-until-first-step state.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    t: usize,
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Adam {
    /// Creates the optimizer for a parameter vector of length `nparams`.
    pub fn new(config: AdamConfig, nparams: usize) -> Self {
        Self {
            config,
            t: 0,
            m: vec![0.0; nparams],
            v: vec![0.0; nparams],
        }
    }

    /// Number of update steps taken so far.
    pub fn step_count(&self) -> usize {
        self.t
    }

    /// Applies one Adam update to `params` in place.
    ///
    /// When `grad_clip > 0` and the gradient's Euclidean norm exceeds it,
    /// the gradient is rescaled to that norm first. Deterministic; no
    /// internal randomness.
    ///
    /// Fails with [`QcbmError::ParameterCount`] if `params` or `grad`
    /// disagree with the length given at construction.
    pub fn step(&mut self, params: &mut [f64], grad: &[f64]) -> Result<(), QcbmError> {
        let n = self.m.len();
        if params.len() != n {
            return Err(QcbmError::ParameterCount {
                expected: n,
                found: params.len(),
            });
        }
        if grad.len() != n {
            return Err(QcbmError::ParameterCount {
                expected: n,
                found: grad.len(),
            });
        }

        let mut scale = 1.0;
        if self.config.grad_clip > 0.0 {
            let norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
            if norm > self.config.grad_clip {
                scale = self.config.grad_clip / norm;
            }
        }

        self.t += 1;
        let bc1 = 1.0 - self.config.beta1.powi(self.t as i32);
        let bc2 = 1.0 - self.config.beta2.powi(self.t as i32);

        for i in 0..n {
            let g = grad[i] * scale;
            self.m[i] = self.config.beta1 * self.m[i] + (1.0 - self.config.beta1) * g;
            self.v[i] = self.config.beta2 * self.v[i] + (1.0 - self.config.beta2) * g * g;
            let m_hat = self.m[i] / bc1;
            let v_hat = self.v[i] / bc2;
            params[i] -= self.config.learning_rate * m_hat / (v_hat.sqrt() + self.config.eps);
        }
        Ok(())
    }
}
