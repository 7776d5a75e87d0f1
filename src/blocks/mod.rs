// src/blocks/mod.rs

//! Defines the composable block algebra describing quantum operators.
//!
//! A [`Block`] is a typed tree: rotation-gate leaves, sequential chains,
//! per-qubit layers, controlled gates and memoizing cache wrappers. The
//! tree is a pure description; applying it to a [`crate::Register`] is the
//! job of the [`crate::simulation`] engine.
//!
//! Every rotation leaf carries a mutable angle. The ordered list of all
//! rotation angles, read off in depth-first construction order, is the
//! block's parameter vector; [`Block::parameters`] and [`Block::dispatch`]
//! convert between the tree and that flat vector. The gradient engine and
//! the optimizer rely on this ordering being stable.

use crate::core::matrix::Mat2;
use crate::core::{DenseMatrix, QcbmError};
use num_complex::Complex;
use num_traits::Zero;
use std::cell::{Cell, OnceCell};
use std::fmt;

/// A Pauli axis, selecting both the Pauli matrix and the rotation
/// generator `exp(-i θ σ/2)` around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Pauli X
    X,
    /// Pauli Y
    Y,
    /// Pauli Z
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Z => write!(f, "Z"),
        }
    }
}

/// A primitive single-qubit unitary.
///
/// `Pauli` and `Rotation` are kept distinct: the controlled-X of the
/// entangler must be exactly X, not `Rx(π)` (which differs by a global
/// phase that becomes relative under control).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// A bare Pauli matrix. Parameter-free.
    Pauli(Axis),
    /// The rotation `exp(-i θ σ/2)` about the given axis; the angle is a
    /// trainable parameter.
    Rotation(Axis, f64),
}

impl Gate {
    /// The 2x2 unitary of this gate.
    pub(crate) fn matrix(&self) -> Mat2 {
        let zero = Complex::zero();
        let one = Complex::new(1.0, 0.0);
        let i = Complex::i();
        match self {
            Gate::Pauli(Axis::X) => [[zero, one], [one, zero]],
            Gate::Pauli(Axis::Y) => [[zero, -i], [i, zero]],
            Gate::Pauli(Axis::Z) => [[one, zero], [zero, -one]],
            Gate::Rotation(axis, theta) => {
                let half = theta / 2.0;
                let (sin, cos) = half.sin_cos();
                let c = Complex::new(cos, 0.0);
                match axis {
                    Axis::X => [[c, -i * sin], [-i * sin, c]],
                    Axis::Y => [[c, Complex::new(-sin, 0.0)], [Complex::new(sin, 0.0), c]],
                    Axis::Z => [
                        [Complex::new(cos, -sin), zero],
                        [zero, Complex::new(cos, sin)],
                    ],
                }
            }
        }
    }

    fn is_parameterized(&self) -> bool {
        matches!(self, Gate::Rotation(_, _))
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Pauli(axis) => write!(f, "{}", axis),
            Gate::Rotation(axis, theta) => write!(f, "R{}({:.4})", axis, theta),
        }
    }
}

/// Evaluation strategy for a [`Block::Layer`].
///
/// Both strategies produce numerically identical output (within 1e-9);
/// they differ only in how the work is organized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerStrategy {
    /// Contract one qubit's 2x2 gate at a time across the state vector.
    Roll,
    /// Form the full tensor-product operator once, then apply it with a
    /// single dense matrix-vector product.
    Kron,
}

/// A node in the operator tree.
///
/// Composite variants validate on construction that every sub-block
/// shares the composite's qubit count; use the constructor functions
/// ([`Block::rotation`], [`Block::chain`], [`Block::layer`],
/// [`Block::control`], [`Block::cached`]) rather than building variants
/// by hand.
#[derive(Debug, Clone)]
pub enum Block {
    /// A primitive gate acting on one target qubit of an n-qubit register.
    Gate {
        /// Qubit count of the register this block acts on.
        nqubits: usize,
        /// Target qubit, numbered from 1.
        target: usize,
        /// The single-qubit unitary applied to the target.
        gate: Gate,
    },
    /// Sub-blocks applied in listed order (order matters; gates do not
    /// commute in general).
    Chain {
        /// Qubit count shared by every sub-block.
        nqubits: usize,
        /// Ordered sub-blocks.
        blocks: Vec<Block>,
    },
    /// One sub-block per qubit, each local to its qubit, applied
    /// independently.
    Layer {
        /// Qubit count; also the number of entries in `gates`.
        nqubits: usize,
        /// `gates[q]` is the sub-block assigned to qubit `q + 1`.
        gates: Vec<Block>,
        /// How the layer is evaluated.
        strategy: LayerStrategy,
    },
    /// A gate on the target qubit, applied only on the subspace where
    /// every control qubit reads one.
    Control {
        /// Qubit count of the register this block acts on.
        nqubits: usize,
        /// Control qubits, numbered from 1; distinct from the target.
        controls: Vec<usize>,
        /// Target qubit, numbered from 1.
        target: usize,
        /// The single-qubit unitary applied to the target.
        gate: Gate,
    },
    /// A parameter-free sub-circuit whose dense unitary is computed once
    /// and reused on every apply.
    Cached(CachedBlock),
}

impl Block {
    /// A rotation gate `exp(-i θ σ/2)` on `target` within an `nqubits`
    /// register. This is the parameter leaf of the algebra.
    pub fn rotation(nqubits: usize, target: usize, axis: Axis, angle: f64) -> Result<Self, QcbmError> {
        Self::gate(nqubits, target, Gate::Rotation(axis, angle))
    }

    /// A bare Pauli gate on `target` within an `nqubits` register.
    pub fn pauli(nqubits: usize, target: usize, axis: Axis) -> Result<Self, QcbmError> {
        Self::gate(nqubits, target, Gate::Pauli(axis))
    }

    /// A primitive gate block; validates the target lies in `[1, nqubits]`.
    pub fn gate(nqubits: usize, target: usize, gate: Gate) -> Result<Self, QcbmError> {
        check_qubit(nqubits, target, "gate target")?;
        Ok(Block::Gate { nqubits, target, gate })
    }

    /// A sequential chain. Fails with [`QcbmError::ShapeMismatch`] if any
    /// sub-block's qubit count differs from `nqubits`.
    pub fn chain(nqubits: usize, blocks: Vec<Block>) -> Result<Self, QcbmError> {
        check_width(nqubits)?;
        for (i, block) in blocks.iter().enumerate() {
            if block.nqubits() != nqubits {
                return Err(QcbmError::ShapeMismatch {
                    message: format!(
                        "chain over {} qubits, but sub-block {} acts on {} qubits",
                        nqubits,
                        i,
                        block.nqubits()
                    ),
                });
            }
        }
        Ok(Block::Chain { nqubits, blocks })
    }

    /// A per-qubit layer: exactly one sub-block per qubit, `gates[q]`
    /// assigned to qubit `q + 1`. Each entry must share the layer's qubit
    /// count and touch only its own qubit (rotation leaves or chains of
    /// them), so the kron strategy is well defined.
    pub fn layer(nqubits: usize, gates: Vec<Block>, strategy: LayerStrategy) -> Result<Self, QcbmError> {
        check_width(nqubits)?;
        if gates.len() != nqubits {
            return Err(QcbmError::ShapeMismatch {
                message: format!(
                    "layer over {} qubits needs one sub-block per qubit, got {}",
                    nqubits,
                    gates.len()
                ),
            });
        }
        for (q, block) in gates.iter().enumerate() {
            if block.nqubits() != nqubits {
                return Err(QcbmError::ShapeMismatch {
                    message: format!(
                        "layer over {} qubits, but entry for qubit {} acts on {} qubits",
                        nqubits,
                        q + 1,
                        block.nqubits()
                    ),
                });
            }
            if !block.touches_only(q + 1) {
                return Err(QcbmError::ShapeMismatch {
                    message: format!(
                        "layer entry for qubit {} is not local to that qubit",
                        q + 1
                    ),
                });
            }
        }
        Ok(Block::Layer { nqubits, gates, strategy })
    }

    /// A controlled gate: `gate` acts on `target` on the subspace where
    /// all `controls` read one, identity elsewhere.
    pub fn control(
        nqubits: usize,
        controls: Vec<usize>,
        target: usize,
        gate: Gate,
    ) -> Result<Self, QcbmError> {
        check_qubit(nqubits, target, "control target")?;
        if controls.is_empty() {
            return Err(QcbmError::ShapeMismatch {
                message: "controlled gate needs at least one control qubit".to_string(),
            });
        }
        for &c in &controls {
            check_qubit(nqubits, c, "control qubit")?;
            if c == target {
                return Err(QcbmError::ShapeMismatch {
                    message: format!("control qubit {} coincides with the target", c),
                });
            }
        }
        Ok(Block::Control { nqubits, controls, target, gate })
    }

    /// Wraps a parameter-free block in a memoizing cache. The wrapped
    /// block's dense unitary is computed on first apply and reused for
    /// the rest of the run.
    ///
    /// Fails with [`QcbmError::Configuration`] if the wrapped block has
    /// rotation parameters: a dispatch into a cached sub-circuit would
    /// silently invalidate the memoized matrix, so it is ruled out at
    /// construction.
    pub fn cached(block: Block) -> Result<Self, QcbmError> {
        if block.parameter_count() > 0 {
            return Err(QcbmError::Configuration {
                message: format!(
                    "cannot cache a block with {} rotation parameters",
                    block.parameter_count()
                ),
            });
        }
        Ok(Block::Cached(CachedBlock::new(block)))
    }

    /// Qubit count of the register this block acts on.
    pub fn nqubits(&self) -> usize {
        match self {
            Block::Gate { nqubits, .. }
            | Block::Chain { nqubits, .. }
            | Block::Layer { nqubits, .. }
            | Block::Control { nqubits, .. } => *nqubits,
            Block::Cached(cached) => cached.inner().nqubits(),
        }
    }

    /// Number of rotation parameters in this subtree.
    pub fn parameter_count(&self) -> usize {
        match self {
            Block::Gate { gate, .. } | Block::Control { gate, .. } => {
                usize::from(gate.is_parameterized())
            }
            Block::Chain { blocks, .. } => blocks.iter().map(Block::parameter_count).sum(),
            Block::Layer { gates, .. } => gates.iter().map(Block::parameter_count).sum(),
            Block::Cached(_) => 0, // cached blocks are parameter-free by construction
        }
    }

    /// The rotation angles of this subtree in depth-first order.
    pub fn parameters(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.parameter_count());
        self.collect_parameters(&mut out);
        out
    }

    fn collect_parameters(&self, out: &mut Vec<f64>) {
        match self {
            Block::Gate { gate, .. } | Block::Control { gate, .. } => {
                if let Gate::Rotation(_, angle) = gate {
                    out.push(*angle);
                }
            }
            Block::Chain { blocks, .. } => {
                for block in blocks {
                    block.collect_parameters(out);
                }
            }
            Block::Layer { gates, .. } => {
                for block in gates {
                    block.collect_parameters(out);
                }
            }
            Block::Cached(_) => {}
        }
    }

    /// Writes a flat parameter vector back into the rotation leaves, in
    /// the same depth-first order as [`Block::parameters`].
    ///
    /// Fails with [`QcbmError::ParameterCount`] if the vector length does
    /// not match [`Block::parameter_count`]; the tree is untouched in
    /// that case.
    pub fn dispatch(&mut self, params: &[f64]) -> Result<(), QcbmError> {
        let expected = self.parameter_count();
        if params.len() != expected {
            return Err(QcbmError::ParameterCount {
                expected,
                found: params.len(),
            });
        }
        let mut cursor = params;
        self.dispatch_cursor(&mut cursor);
        Ok(())
    }

    fn dispatch_cursor(&mut self, cursor: &mut &[f64]) {
        match self {
            Block::Gate { gate, .. } | Block::Control { gate, .. } => {
                if let Gate::Rotation(_, angle) = gate {
                    *angle = cursor[0];
                    *cursor = &cursor[1..];
                }
            }
            Block::Chain { blocks, .. } => {
                for block in blocks {
                    block.dispatch_cursor(cursor);
                }
            }
            Block::Layer { gates, .. } => {
                for block in gates {
                    block.dispatch_cursor(cursor);
                }
            }
            Block::Cached(_) => {}
        }
    }

    /// Whether every gate in this subtree targets exactly `qubit`.
    /// Layer entries must satisfy this so the layer factors as a tensor
    /// product of single-qubit operators.
    fn touches_only(&self, qubit: usize) -> bool {
        match self {
            Block::Gate { target, .. } => *target == qubit,
            Block::Chain { blocks, .. } => blocks.iter().all(|b| b.touches_only(qubit)),
            // Layers, controls and caches span qubits; they never factor
            // into a single-qubit slot.
            Block::Layer { .. } | Block::Control { .. } | Block::Cached(_) => false,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Gate { target, gate, .. } => write!(f, "{} @ q{}", gate, target),
            Block::Chain { nqubits, blocks } => {
                write!(f, "chain[{}q, {} blocks]", nqubits, blocks.len())
            }
            Block::Layer { nqubits, strategy, .. } => {
                write!(f, "layer[{}q, {:?}]", nqubits, strategy)
            }
            Block::Control { controls, target, gate, .. } => {
                write!(f, "C{:?}-{} @ q{}", controls, gate, target)
            }
            Block::Cached(cached) => write!(f, "cached({})", cached.inner()),
        }
    }
}

/// A parameter-free block together with its memoized dense unitary.
///
/// The cache exclusively owns the matrix: it is computed at most once
/// (on first apply) and immutable thereafter. Because [`Block::cached`]
/// rejects parameterized blocks, no dispatch can ever invalidate it.
#[derive(Debug, Clone)]
pub struct CachedBlock {
    inner: Box<Block>,
    matrix: OnceCell<DenseMatrix>,
    builds: Cell<usize>,
}

impl CachedBlock {
    fn new(inner: Block) -> Self {
        Self {
            inner: Box::new(inner),
            matrix: OnceCell::new(),
            builds: Cell::new(0),
        }
    }

    /// The wrapped block.
    pub fn inner(&self) -> &Block {
        &self.inner
    }

    /// How many times the dense unitary has been computed so far: 0
    /// before the first apply, 1 ever after.
    pub fn build_count(&self) -> usize {
        self.builds.get()
    }

    /// The memoized unitary, computing it with `build` on first use.
    pub(crate) fn matrix_or_build(
        &self,
        build: impl FnOnce(&Block) -> Result<DenseMatrix, QcbmError>,
    ) -> Result<&DenseMatrix, QcbmError> {
        if let Some(matrix) = self.matrix.get() {
            return Ok(matrix);
        }
        let matrix = build(&self.inner)?;
        self.builds.set(self.builds.get() + 1);
        Ok(self.matrix.get_or_init(|| matrix))
    }
}

fn check_width(nqubits: usize) -> Result<(), QcbmError> {
    if nqubits == 0 {
        // Same kind as Register::zero and Qcbm::build: a zero qubit
        // count is a configuration problem, not a shape clash.
        Err(QcbmError::Configuration {
            message: "block qubit count must be at least 1".to_string(),
        })
    } else {
        Ok(())
    }
}

fn check_qubit(nqubits: usize, qubit: usize, role: &str) -> Result<(), QcbmError> {
    check_width(nqubits)?;
    if qubit < 1 || qubit > nqubits {
        return Err(QcbmError::ShapeMismatch {
            message: format!(
                "{} {} out of range [1, {}]",
                role, qubit, nqubits
            ),
        });
    }
    Ok(())
}
