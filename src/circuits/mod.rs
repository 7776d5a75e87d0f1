// src/circuits/mod.rs

//! Assembles the alternating-layer Born machine circuit from block
//! algebra primitives.
//!
//! The circuit interleaves trainable per-qubit rotation layers with a
//! fixed (parameter-free) entangler of controlled-X gates:
//!
//! ```text
//! {Rx, Rz}  [entangler  {Rz, Rx, Rz}] x (nlayer - 1)  entangler  {Rz, Rx}
//! ```
//!
//! Each entangler instance is wrapped in a cache so its dense unitary is
//! computed once per training run. Rotation parameters are addressed by
//! depth-first construction order; that ordering is a contract relied on
//! by the gradient engine and by external parameter dispatch.

use crate::blocks::{Axis, Block, Gate, LayerStrategy};
use crate::core::QcbmError;
use crate::simulation;
use std::fmt;

/// Position of a rotation layer within the circuit, selecting its
/// per-qubit axis sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Opening layer: `{Rx, Rz}` per qubit.
    First,
    /// Interior layer between entanglers: `{Rz, Rx, Rz}` per qubit.
    Mid,
    /// Closing layer: `{Rz, Rx}` per qubit.
    Last,
}

impl LayerKind {
    /// The rotation axes each qubit receives, in chain order.
    pub fn axes(&self) -> &'static [Axis] {
        match self {
            LayerKind::First => &[Axis::X, Axis::Z],
            LayerKind::Mid => &[Axis::Z, Axis::X, Axis::Z],
            LayerKind::Last => &[Axis::Z, Axis::X],
        }
    }
}

/// A qubit-count-agnostic description of a rotation layer, finalized
/// into a concrete [`Block`] with [`RotationLayerTemplate::build`].
///
/// This is the two-phase form of a "give me a layer for n qubits"
/// factory: the template carries no qubit count, and `build(n)` performs
/// all shape validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationLayerTemplate {
    kind: LayerKind,
    strategy: LayerStrategy,
}

impl RotationLayerTemplate {
    /// A template for the given layer kind, evaluated with the given
    /// strategy. All angles start at zero; training dispatches real
    /// values later.
    pub fn new(kind: LayerKind, strategy: LayerStrategy) -> Self {
        Self { kind, strategy }
    }

    /// Finalizes the template for a concrete qubit count.
    ///
    /// Fails with [`QcbmError::Configuration`] for a zero qubit count.
    pub fn build(&self, nqubits: usize) -> Result<Block, QcbmError> {
        let gates = (1..=nqubits)
            .map(|q| {
                let rotations = self
                    .kind
                    .axes()
                    .iter()
                    .map(|&axis| Block::rotation(nqubits, q, axis, 0.0))
                    .collect::<Result<Vec<_>, _>>()?;
                Block::chain(nqubits, rotations)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Block::layer(nqubits, gates, self.strategy)
    }
}

/// A quantum circuit Born machine: the built block tree plus its
/// configuration.
///
/// The block tree owns the current rotation angles; [`Qcbm::parameters`]
/// and [`Qcbm::dispatch`] move them in and out as a flat vector in
/// canonical depth-first order.
#[derive(Debug, Clone)]
pub struct Qcbm {
    block: Block,
    nqubits: usize,
    nlayers: usize,
    entangler_pairs: Vec<(usize, usize)>,
}

impl Qcbm {
    /// Builds the alternating-layer circuit.
    ///
    /// # Arguments
    /// * `nqubits` - Register width; qubits are numbered `1..=nqubits`.
    /// * `nlayers` - Number of trainable layer groups; must be at least 1.
    /// * `entangler_pairs` - Ordered `(control, target)` pairs, each
    ///   applied as a controlled-X in sequence.
    ///
    /// # Errors
    /// [`QcbmError::Configuration`] when `nlayers < 1`, a pair index lies
    /// outside `[1, nqubits]`, or a pair has `control == target`.
    pub fn build(
        nqubits: usize,
        nlayers: usize,
        entangler_pairs: &[(usize, usize)],
    ) -> Result<Self, QcbmError> {
        if nqubits == 0 {
            return Err(QcbmError::Configuration {
                message: "circuit needs at least one qubit".to_string(),
            });
        }
        if nlayers < 1 {
            return Err(QcbmError::Configuration {
                message: format!("layer count must be at least 1, got {}", nlayers),
            });
        }
        for &(control, target) in entangler_pairs {
            for qubit in [control, target] {
                if qubit < 1 || qubit > nqubits {
                    return Err(QcbmError::Configuration {
                        message: format!(
                            "entangler pair ({}, {}) references qubit {} outside [1, {}]",
                            control, target, qubit, nqubits
                        ),
                    });
                }
            }
            if control == target {
                return Err(QcbmError::Configuration {
                    message: format!("entangler pair ({}, {}) controls its own target", control, target),
                });
            }
        }

        let strategy = LayerStrategy::Roll;
        let mut blocks = Vec::with_capacity(2 * nlayers + 1);
        blocks.push(RotationLayerTemplate::new(LayerKind::First, strategy).build(nqubits)?);
        for _ in 1..nlayers {
            blocks.push(entangler(nqubits, entangler_pairs)?);
            blocks.push(RotationLayerTemplate::new(LayerKind::Mid, strategy).build(nqubits)?);
        }
        blocks.push(entangler(nqubits, entangler_pairs)?);
        blocks.push(RotationLayerTemplate::new(LayerKind::Last, strategy).build(nqubits)?);

        Ok(Self {
            block: Block::chain(nqubits, blocks)?,
            nqubits,
            nlayers,
            entangler_pairs: entangler_pairs.to_vec(),
        })
    }

    /// Register width of the circuit.
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// Number of trainable layer groups.
    pub fn nlayers(&self) -> usize {
        self.nlayers
    }

    /// The `(control, target)` pairs of the entangler.
    pub fn entangler_pairs(&self) -> &[(usize, usize)] {
        &self.entangler_pairs
    }

    /// The underlying block tree.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Number of rotation parameters: `nqubits * (3 * nlayers + 1)`.
    pub fn parameter_count(&self) -> usize {
        self.block.parameter_count()
    }

    /// Current rotation angles in canonical depth-first order.
    pub fn parameters(&self) -> Vec<f64> {
        self.block.parameters()
    }

    /// Writes a flat parameter vector into the rotation gates.
    ///
    /// Fails with [`QcbmError::ParameterCount`] on a length mismatch,
    /// leaving the circuit untouched.
    pub fn dispatch(&mut self, params: &[f64]) -> Result<(), QcbmError> {
        self.block.dispatch(params)
    }

    /// The circuit's output distribution: squared amplitudes of the state
    /// obtained by applying the block tree to the all-zero register.
    pub fn probabilities(&self) -> Result<Vec<f64>, QcbmError> {
        simulation::probabilities(&self.block)
    }
}

impl fmt::Display for Qcbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Qcbm[{} qubits, {} layers, {} pairs, {} parameters]",
            self.nqubits,
            self.nlayers,
            self.entangler_pairs.len(),
            self.parameter_count()
        )
    }
}

/// A cached chain of controlled-X gates over the given pairs, applied in
/// listed order. Parameter-free, so the cache can never be invalidated
/// by a dispatch.
fn entangler(nqubits: usize, pairs: &[(usize, usize)]) -> Result<Block, QcbmError> {
    let gates = pairs
        .iter()
        .map(|&(control, target)| Block::control(nqubits, vec![control], target, Gate::Pauli(Axis::X)))
        .collect::<Result<Vec<_>, _>>()?;
    Block::cached(Block::chain(nqubits, gates)?)
}

/// Ring topology: `(1, 2), (2, 3), ..., (n, 1)`, the usual entangler
/// layout for a Born machine on `n` qubits.
pub fn ring_pairs(nqubits: usize) -> Vec<(usize, usize)> {
    (1..=nqubits)
        .map(|q| (q, if q == nqubits { 1 } else { q + 1 }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_count_follows_layer_structure() -> Result<(), QcbmError> {
        // n * (3 * nlayers + 1): first 2n, (nlayers - 1) mid layers of 3n,
        // last 2n.
        let circuit = Qcbm::build(3, 4, &ring_pairs(3))?;
        assert_eq!(circuit.parameter_count(), 3 * (3 * 4 + 1));

        let shallow = Qcbm::build(2, 1, &[(1, 2)])?;
        assert_eq!(shallow.parameter_count(), 2 * 4);
        Ok(())
    }

    #[test]
    fn build_validates_configuration() {
        let err = Qcbm::build(2, 0, &[(1, 2)]).unwrap_err();
        assert!(matches!(err, QcbmError::Configuration { .. }));

        let err = Qcbm::build(2, 1, &[(1, 3)]).unwrap_err();
        assert!(matches!(err, QcbmError::Configuration { .. }));

        let err = Qcbm::build(2, 1, &[(0, 2)]).unwrap_err();
        assert!(matches!(err, QcbmError::Configuration { .. }));

        let err = Qcbm::build(2, 1, &[(2, 2)]).unwrap_err();
        assert!(matches!(err, QcbmError::Configuration { .. }));
    }

    #[test]
    fn dispatch_round_trips_through_the_tree() -> Result<(), QcbmError> {
        let mut circuit = Qcbm::build(2, 2, &ring_pairs(2))?;
        let count = circuit.parameter_count();
        let values: Vec<f64> = (0..count).map(|i| i as f64 * 0.01).collect();
        circuit.dispatch(&values)?;
        assert_eq!(circuit.parameters(), values);

        let err = circuit.dispatch(&values[..count - 1]).unwrap_err();
        assert!(matches!(err, QcbmError::ParameterCount { .. }));
        Ok(())
    }

    #[test]
    fn fresh_circuit_outputs_the_zero_state() -> Result<(), QcbmError> {
        // All angles start at zero, so every layer is the identity and
        // the entangler sees |0...0>, which it fixes.
        let circuit = Qcbm::build(2, 2, &ring_pairs(2))?;
        let probs = circuit.probabilities()?;
        assert!((probs[0] - 1.0).abs() < 1e-9);
        assert!(probs[1..].iter().all(|p| p.abs() < 1e-9));
        Ok(())
    }

    #[test]
    fn layer_template_matches_kind() -> Result<(), QcbmError> {
        let first = RotationLayerTemplate::new(LayerKind::First, LayerStrategy::Roll).build(3)?;
        assert_eq!(first.parameter_count(), 6);
        let mid = RotationLayerTemplate::new(LayerKind::Mid, LayerStrategy::Kron).build(3)?;
        assert_eq!(mid.parameter_count(), 9);

        let err = RotationLayerTemplate::new(LayerKind::Last, LayerStrategy::Roll)
            .build(0)
            .unwrap_err();
        assert!(matches!(err, QcbmError::Configuration { .. }));
        Ok(())
    }
}
