// tests/simulation_tests.rs

// Import necessary types from the qcbm crate
use qcbm::blocks::{Axis, Block, Gate, LayerStrategy};
use qcbm::{QcbmError, Register, check_normalization, ring_pairs, simulation};

use std::f64::consts::FRAC_PI_2;

const TEST_TOLERANCE: f64 = 1e-9;

// Helper: assert two real vectors agree component-wise
fn assert_vec_approx_equal(actual: &[f64], expected: &[f64], context: &str) {
    assert_eq!(actual.len(), expected.len(), "length mismatch - {}", context);
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() < TEST_TOLERANCE,
            "mismatch at index {} - actual: {}, expected: {}, context: {}",
            i,
            a,
            e,
            context
        );
    }
}

#[test]
fn norm_is_preserved_across_block_shapes() -> Result<(), QcbmError> {
    // A tree exercising every variant: rotations, chain, layer (both
    // strategies), control, cache.
    let layer_roll = Block::layer(
        3,
        vec![
            Block::rotation(3, 1, Axis::X, 0.4)?,
            Block::rotation(3, 2, Axis::Y, -1.3)?,
            Block::rotation(3, 3, Axis::Z, 2.2)?,
        ],
        LayerStrategy::Roll,
    )?;
    let layer_kron = Block::layer(
        3,
        vec![
            Block::rotation(3, 1, Axis::Z, 0.9)?,
            Block::rotation(3, 2, Axis::X, 0.2)?,
            Block::rotation(3, 3, Axis::Y, -0.6)?,
        ],
        LayerStrategy::Kron,
    )?;
    let entangler = Block::cached(Block::chain(
        3,
        vec![
            Block::control(3, vec![1], 2, Gate::Pauli(Axis::X))?,
            Block::control(3, vec![2], 3, Gate::Pauli(Axis::X))?,
        ],
    )?)?;

    let circuit = Block::chain(3, vec![layer_roll, entangler, layer_kron])?;
    let register = simulation::run(&circuit)?;
    check_normalization(&register, Some(TEST_TOLERANCE))?;
    Ok(())
}

#[test]
fn roll_and_kron_agree_on_identical_input() -> Result<(), QcbmError> {
    let angles = [0.7, -0.4, 1.9, 0.05];
    let layer = |strategy: LayerStrategy| -> Result<Block, QcbmError> {
        let gates = (1..=4)
            .map(|q| Block::rotation(4, q, Axis::Y, angles[q - 1]))
            .collect::<Result<Vec<_>, _>>()?;
        Block::layer(4, gates, strategy)
    };

    let mut roll_reg = Register::zero(4)?;
    let mut kron_reg = Register::zero(4)?;
    simulation::apply(&mut roll_reg, &layer(LayerStrategy::Roll)?)?;
    simulation::apply(&mut kron_reg, &layer(LayerStrategy::Kron)?)?;

    for (i, (a, b)) in roll_reg
        .amplitudes()
        .iter()
        .zip(kron_reg.amplitudes().iter())
        .enumerate()
    {
        assert!(
            (a - b).norm() < TEST_TOLERANCE,
            "strategies disagree at index {}: {} vs {}",
            i,
            a,
            b
        );
    }
    Ok(())
}

#[test]
fn bell_pair_probabilities() -> Result<(), QcbmError> {
    // Rx(pi/2) on qubit 1 then CNOT(1 -> 2) gives equal weight on |00>
    // and |11>.
    let circuit = Block::chain(
        2,
        vec![
            Block::rotation(2, 1, Axis::X, FRAC_PI_2)?,
            Block::control(2, vec![1], 2, Gate::Pauli(Axis::X))?,
        ],
    )?;
    let probs = simulation::probabilities(&circuit)?;
    assert_vec_approx_equal(&probs, &[0.5, 0.0, 0.0, 0.5], "Bell pair distribution");
    Ok(())
}

#[test]
fn multi_control_requires_all_controls_set() -> Result<(), QcbmError> {
    // Toffoli-like gate: X on qubit 3 controlled on qubits 1 and 2.
    let toffoli = Block::control(3, vec![1, 2], 3, Gate::Pauli(Axis::X))?;

    // Only one control set: target untouched, state |01 0> stays.
    let one_control = Block::chain(3, vec![Block::pauli(3, 1, Axis::X)?, toffoli.clone()])?;
    let probs = simulation::probabilities(&one_control)?;
    assert!((probs[0b001] - 1.0).abs() < TEST_TOLERANCE);

    // Both controls set: target flips, |111> comes out.
    let both_controls = Block::chain(
        3,
        vec![
            Block::pauli(3, 1, Axis::X)?,
            Block::pauli(3, 2, Axis::X)?,
            toffoli,
        ],
    )?;
    let probs = simulation::probabilities(&both_controls)?;
    assert!((probs[0b111] - 1.0).abs() < TEST_TOLERANCE);
    Ok(())
}

#[test]
fn qcbm_distribution_sums_to_one() -> Result<(), QcbmError> {
    let mut circuit = qcbm::Qcbm::build(3, 2, &ring_pairs(3))?;
    let values: Vec<f64> = (0..circuit.parameter_count())
        .map(|i| (i as f64) * 0.37)
        .collect();
    circuit.dispatch(&values)?;

    let probs = circuit.probabilities()?;
    assert_eq!(probs.len(), 8);
    let total: f64 = probs.iter().sum();
    assert!((total - 1.0).abs() < TEST_TOLERANCE, "sum was {}", total);
    Ok(())
}

#[test]
fn apply_is_referentially_transparent() -> Result<(), QcbmError> {
    let circuit = Block::chain(
        2,
        vec![
            Block::rotation(2, 1, Axis::Y, 0.83)?,
            Block::control(2, vec![1], 2, Gate::Pauli(Axis::X))?,
            Block::rotation(2, 2, Axis::Z, -0.41)?,
        ],
    )?;
    let first = simulation::run(&circuit)?;
    let second = simulation::run(&circuit)?;
    assert_eq!(first, second, "identical inputs must yield identical output");
    Ok(())
}
