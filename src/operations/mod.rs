// src/operations/mod.rs

//! Defines the operations applicable to qubits in a `QuantumContext`.

use crate::core::{Matrix, QubitId};
use num_complex::Complex;
use num_traits::{One, Zero};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// Fixed single-qubit transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Leaves the qubit untouched.
    Identity,
    /// Maps `|0>` to `(|0> + |1>)/√2`: the superposition-inducing gate.
    Hadamard,
    /// Swaps `|0>` and `|1>`.
    PauliX,
    /// Flips the phase of `|1>`.
    PauliZ,
    /// Multiplies `|1>` by `e^(iθ)`.
    Phase(f64),
}

impl Gate {
    /// The 2x2 matrix of this gate in the `{|0>, |1>}` basis.
    pub fn matrix(&self) -> [[Complex<f64>; 2]; 2] {
        match self {
            Gate::Identity => [
                [Complex::one(), Complex::zero()],
                [Complex::zero(), Complex::one()],
            ],
            Gate::Hadamard => [
                [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(FRAC_1_SQRT_2, 0.0)],
                [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(-FRAC_1_SQRT_2, 0.0)],
            ],
            Gate::PauliX => [
                [Complex::zero(), Complex::one()],
                [Complex::one(), Complex::zero()],
            ],
            Gate::PauliZ => [
                [Complex::one(), Complex::zero()],
                [Complex::zero(), Complex::new(-1.0, 0.0)],
            ],
            Gate::Phase(theta) => [
                [Complex::one(), Complex::zero()],
                [Complex::zero(), Complex::new(theta.cos(), theta.sin())],
            ],
        }
    }

    /// Short symbol used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::Identity => "I",
            Gate::Hadamard => "H",
            Gate::PauliX => "X",
            Gate::PauliZ => "Z",
            Gate::Phase(_) => "P",
        }
    }
}

/// A single step of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Apply a fixed single-qubit gate to each target independently.
    Gate {
        /// Gate to apply.
        gate: Gate,
        /// Qubits receiving the gate.
        targets: Vec<QubitId>,
    },
    /// Apply `gate` to `target` when `control` is `|1>`.
    Controlled {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
        /// Gate applied on the control's `|1>` subspace.
        gate: Gate,
    },
    /// Apply an arbitrary unitary to the ordered target subset.
    /// `targets[0]` is the most significant bit of the matrix basis.
    Unitary {
        /// The `2^k x 2^k` unitary.
        matrix: Matrix,
        /// The `k` target qubits.
        targets: Vec<QubitId>,
    },
    /// Measure the targets, collapsing them.
    Measure {
        /// Qubits to measure.
        targets: Vec<QubitId>,
    },
}

impl Operation {
    /// Returns every qubit touched by this operation.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Gate { targets, .. } => targets.clone(),
            Operation::Controlled { control, target, .. } => vec![*control, *target],
            Operation::Unitary { targets, .. } => targets.clone(),
            Operation::Measure { targets } => targets.clone(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |qs: &[QubitId]| qs.iter().map(|q| q.to_string()).collect::<Vec<_>>().join(", ");
        match self {
            Operation::Gate { gate, targets } => write!(f, "{}({})", gate.symbol(), join(targets)),
            Operation::Controlled { control, target, gate } => {
                write!(f, "C{}({} -> {})", gate.symbol(), control, target)
            }
            Operation::Unitary { matrix, targets } => {
                write!(f, "U{}({})", matrix.dim(), join(targets))
            }
            Operation::Measure { targets } => write!(f, "M({})", join(targets)),
        }
    }
}
