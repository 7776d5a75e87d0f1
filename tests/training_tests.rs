// tests/training_tests.rs

use qcbm::{
    AdamConfig, Qcbm, QcbmError, RbfMmd, TrainingConfig, gaussian_target, gradient, loss,
    ring_pairs, train,
};

#[test]
fn parameter_shift_matches_finite_differences() -> Result<(), QcbmError> {
    // Central finite differences on a small circuit, several fixed
    // parameter points; loose tolerance per the analytic agreement of
    // the two-shot rule with the exact derivative.
    const EPS: f64 = 1e-4;
    const TOLERANCE: f64 = 1e-3;

    let mut circuit = Qcbm::build(2, 2, &ring_pairs(2))?;
    let kernel = RbfMmd::new(2, 0.25)?;
    let target = gaussian_target(2, 1.5, 1.0)?;
    let count = circuit.parameter_count();

    for trial in 0..3u32 {
        // Deterministic pseudo-random angles, different per trial.
        let theta: Vec<f64> = (0..count)
            .map(|i| ((i as f64 + 1.3) * (trial as f64 + 0.7) * 2.39).sin() * 3.0)
            .collect();
        circuit.dispatch(&theta)?;
        let grad = gradient(&mut circuit, &kernel, &target)?;

        for i in 0..count {
            let mut plus = theta.clone();
            plus[i] += EPS;
            circuit.dispatch(&plus)?;
            let loss_plus = loss(&circuit, &kernel, &target)?;

            let mut minus = theta.clone();
            minus[i] -= EPS;
            circuit.dispatch(&minus)?;
            let loss_minus = loss(&circuit, &kernel, &target)?;

            let numeric = (loss_plus - loss_minus) / (2.0 * EPS);
            assert!(
                (grad[i] - numeric).abs() < TOLERANCE,
                "trial {}, parameter {}: shift rule {} vs finite difference {}",
                trial,
                i,
                grad[i],
                numeric
            );
        }
    }
    Ok(())
}

#[test]
fn training_reduces_the_loss() -> Result<(), QcbmError> {
    let mut circuit = Qcbm::build(2, 2, &ring_pairs(2))?;
    let target = gaussian_target(2, 1.5, 1.0)?;
    let config = TrainingConfig {
        optimizer: AdamConfig {
            learning_rate: 0.1,
            ..AdamConfig::default()
        },
        kernel_sigma: 0.25,
        iterations: 30,
        seed: Some(7),
    };

    let history = train(&mut circuit, &target, &config)?;
    assert_eq!(history.len(), 30);
    assert!(history.iter().all(|l| l.is_finite() && *l >= -1e-12));
    assert!(
        history[history.len() - 1] < history[0],
        "loss should improve: first {}, last {}",
        history[0],
        history[history.len() - 1]
    );
    Ok(())
}

#[test]
fn seeded_training_is_deterministic() -> Result<(), QcbmError> {
    let target = gaussian_target(2, 1.5, 1.0)?;
    let config = |iterations: usize| TrainingConfig {
        iterations,
        seed: Some(99),
        kernel_sigma: 0.25,
        optimizer: AdamConfig::default(),
    };

    let mut one = Qcbm::build(2, 2, &ring_pairs(2))?;
    let short = train(&mut one, &target, &config(1))?;

    let mut two = Qcbm::build(2, 2, &ring_pairs(2))?;
    let long = train(&mut two, &target, &config(3))?;

    // The recorded loss is the pre-update loss, so the first entry only
    // depends on the seeded initialization and must coincide.
    assert_eq!(short.len(), 1);
    assert_eq!(long.len(), 3);
    assert_eq!(short[0], long[0]);
    Ok(())
}

#[test]
fn trained_circuit_exposes_its_distribution() -> Result<(), QcbmError> {
    let mut circuit = Qcbm::build(2, 1, &ring_pairs(2))?;
    let target = gaussian_target(2, 1.5, 1.0)?;
    let config = TrainingConfig {
        iterations: 3,
        seed: Some(1),
        ..TrainingConfig::default()
    };
    train(&mut circuit, &target, &config)?;

    let params = circuit.parameters();
    assert_eq!(params.len(), circuit.parameter_count());
    assert!(params.iter().all(|p| p.is_finite()));

    let probs = circuit.probabilities()?;
    assert_eq!(probs.len(), 4);
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn gradient_has_one_entry_per_parameter() -> Result<(), QcbmError> {
    let mut circuit = Qcbm::build(3, 2, &ring_pairs(3))?;
    let kernel = RbfMmd::new(3, 0.5)?;
    let target = gaussian_target(3, 3.5, 1.5)?;
    let grad = gradient(&mut circuit, &kernel, &target)?;
    assert_eq!(grad.len(), circuit.parameter_count());
    Ok(())
}
