// src/validation/mod.rs

//! Provides functions to validate registers and probability vectors.

use crate::core::{QcbmError, Register};

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks that the register is normalized (sum of squared amplitudes ≈ 1).
///
/// # Arguments
/// * `register` - The register to check.
/// * `tolerance` - Allowed deviation from 1.0; defaults to 1e-9.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QcbmError::Numerical)` otherwise.
pub fn check_normalization(register: &Register, tolerance: Option<f64>) -> Result<(), QcbmError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = register
        .amplitudes()
        .iter()
        .map(|c| c.norm_sqr())
        .sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(QcbmError::Numerical {
            message: format!(
                "Register normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks that every entry of a probability vector is finite.
///
/// Exponent overflow or a degenerate kernel can poison a distribution
/// with NaN/Inf; this surfaces that as a typed error instead of letting
/// it propagate silently through the loss and gradient.
pub fn check_distribution(probabilities: &[f64]) -> Result<(), QcbmError> {
    for (i, p) in probabilities.iter().enumerate() {
        if !p.is_finite() {
            return Err(QcbmError::Numerical {
                message: format!("probability vector entry {} is not finite ({})", i, p),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_register_is_normalized() -> Result<(), QcbmError> {
        let register = Register::zero(3)?;
        check_normalization(&register, None)
    }

    #[test]
    fn non_finite_distribution_is_rejected() {
        assert!(check_distribution(&[0.5, 0.5]).is_ok());
        let err = check_distribution(&[0.5, f64::NAN]).unwrap_err();
        assert!(matches!(err, QcbmError::Numerical { .. }));
        let err = check_distribution(&[f64::INFINITY, 0.0]).unwrap_err();
        assert!(matches!(err, QcbmError::Numerical { .. }));
    }
}
