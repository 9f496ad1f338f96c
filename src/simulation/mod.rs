// src/simulation/mod.rs

//! The qubit simulation context consumed by the encoder, decoder and tunnel.
//!
//! A `QuantumContext` owns one global state vector and an arena of qubits.
//! Qubits are referred to by `QubitId`; once a qubit is measured it is
//! collapsed and any further gate on it is rejected. A collapsed qubit can
//! then be released, which removes it from the state vector so that a
//! long-lived context does not grow without bound. Every measuring call
//! takes the random source as an argument.

mod results;
pub(crate) mod engine;

pub use results::{MeasurementCounts, SimulationResult};

use crate::circuits::Circuit;
use crate::core::{ChronoError, Matrix, Outcome, QubitId, Register, Result, StateVector};
use crate::operations::{Gate, Operation};
use crate::validation::require_integer_log2;
use engine::SimulationEngine;
use num_complex::Complex;
use num_traits::{One, Zero};
use rand::Rng;
use std::collections::HashSet;

const UNITARY_TOLERANCE: f64 = 1e-9;

/// Simulation context owning every qubit it allocates.
#[derive(Debug, Clone)]
pub struct QuantumContext {
    engine: SimulationEngine,
}

impl Default for QuantumContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumContext {
    /// Creates a context holding no qubits.
    pub fn new() -> Self {
        Self { engine: SimulationEngine::new() }
    }

    /// Number of qubits allocated so far, released ones included.
    pub fn num_qubits(&self) -> usize {
        self.engine.num_qubits()
    }

    /// The joint state of every qubit not yet released.
    pub fn state(&self) -> &StateVector {
        self.engine.state()
    }

    /// Allocates one qubit in `|0>`.
    pub fn zero(&mut self) -> Result<QubitId> {
        let first = self.engine.allocate(1)?;
        Ok(QubitId(first))
    }

    /// Allocates `n` qubits in `|0...0>`.
    pub fn zero_with(&mut self, n: usize) -> Result<Register> {
        let first = self.engine.allocate(n)?;
        tracing::trace!(first, n, "allocated qubits");
        Ok(Register::new((first..first + n).map(QubitId).collect()))
    }

    /// Allocates `log2(dim)` qubits, enough to span `dim` basis states.
    /// Fails with `NoIntegerLogarithm` unless `dim` is a power of two.
    pub fn zero_log2(&mut self, dim: usize) -> Result<Register> {
        let n = require_integer_log2(dim)?;
        self.zero_with(n as usize)
    }

    /// Returns `true` once the qubit has been measured.
    pub fn is_collapsed(&self, qubit: QubitId) -> bool {
        self.engine.is_collapsed(qubit.index())
    }

    /// Returns `true` once the qubit has been released.
    pub fn is_released(&self, qubit: QubitId) -> bool {
        self.engine.is_released(qubit.index())
    }

    /// Removes measured qubits from the state vector. Their ids stay
    /// reserved; any later use fails with `QubitReleased`.
    ///
    /// # Errors
    /// * `InvalidOperation` if a target has not been measured.
    pub fn release(&mut self, targets: &[QubitId]) -> Result<()> {
        let indices = self.known_indices(targets)?;
        if let Some(q) = targets.iter().find(|q| !self.is_collapsed(**q)) {
            return Err(ChronoError::InvalidOperation {
                message: format!("Qubit {} must be measured before it is released", q),
            });
        }
        for idx in indices {
            self.engine.release(idx)?;
        }
        tracing::trace!(released = targets.len(), dim = self.state().dim(), "released qubits");
        Ok(())
    }

    /// Applies H to every target.
    pub fn h(&mut self, targets: &[QubitId]) -> Result<()> {
        self.apply_gate(Gate::Hadamard, targets)
    }

    /// Applies X to every target.
    pub fn x(&mut self, targets: &[QubitId]) -> Result<()> {
        self.apply_gate(Gate::PauliX, targets)
    }

    /// Applies Z to every target.
    pub fn z(&mut self, targets: &[QubitId]) -> Result<()> {
        self.apply_gate(Gate::PauliZ, targets)
    }

    /// Applies a fixed single-qubit gate to each target independently.
    pub fn apply_gate(&mut self, gate: Gate, targets: &[QubitId]) -> Result<()> {
        let indices = self.live_indices(targets)?;
        let matrix = gate.matrix();
        for idx in indices {
            self.engine.apply_single_qubit_gate(idx, &matrix)?;
        }
        Ok(())
    }

    /// Applies `gate` to `target` on the `|1>` subspace of `control`.
    pub fn controlled(&mut self, control: QubitId, target: QubitId, gate: Gate) -> Result<()> {
        let u = gate.matrix();
        let (zero, one): (Complex<f64>, Complex<f64>) = (Complex::zero(), Complex::one());
        // Basis order: |control, target> -> |00>, |01>, |10>, |11>
        let controlled_u = Matrix::from_rows(vec![
            vec![one, zero, zero, zero],
            vec![zero, one, zero, zero],
            vec![zero, zero, u[0][0], u[0][1]],
            vec![zero, zero, u[1][0], u[1][1]],
        ])?;
        self.apply(&controlled_u, &[control, target])
    }

    /// Controlled-X.
    pub fn cnot(&mut self, control: QubitId, target: QubitId) -> Result<()> {
        self.controlled(control, target, Gate::PauliX)
    }

    /// Applies an arbitrary unitary to the ordered targets; `targets[0]` is
    /// the most significant bit of the matrix basis.
    pub fn apply(&mut self, matrix: &Matrix, targets: &[QubitId]) -> Result<()> {
        let indices = self.live_indices(targets)?;
        if matrix.dim() != 1 << indices.len() {
            return Err(ChronoError::DimensionMismatch { expected: 1 << indices.len(), actual: matrix.dim() });
        }
        if !matrix.is_unitary(UNITARY_TOLERANCE) {
            return Err(ChronoError::InvalidOperation { message: "Matrix is not unitary".to_string() });
        }
        self.engine.apply_unitary(matrix, &indices)
    }

    /// Measures the targets, collapsing them. Returns one bit per target in
    /// target order.
    pub fn measure<R: Rng + ?Sized>(&mut self, targets: &[QubitId], rng: &mut R) -> Result<Vec<Outcome>> {
        let index = self.measure_index(targets, rng)?;
        let n = targets.len();
        Ok((0..n).map(|j| Outcome::Collapsed(((index >> (n - 1 - j)) & 1) as u8)).collect())
    }

    /// Measures the targets and returns the outcome as a basis index over
    /// them, first target most significant.
    pub fn measure_index<R: Rng + ?Sized>(&mut self, targets: &[QubitId], rng: &mut R) -> Result<usize> {
        let indices = self.live_indices(targets)?;
        let index = self.engine.measure(&indices, rng)?;
        tracing::trace!(index, qubits = targets.len(), "measured");
        Ok(index)
    }

    /// Marginal outcome probabilities of the ordered targets.
    pub fn probabilities(&self, targets: &[QubitId]) -> Result<Vec<f64>> {
        let indices = self.known_indices(targets)?;
        self.engine.probabilities(&indices)
    }

    /// Amplitudes of the ordered targets. Only defined while the targets are
    /// in a product state with the rest of the context; otherwise fails with
    /// `Incoherence`. Inspecting amplitudes does not disturb the state.
    pub fn amplitudes(&self, targets: &[QubitId]) -> Result<Vec<Complex<f64>>> {
        let indices = self.known_indices(targets)?;
        self.engine.factor_amplitudes(&indices)
    }

    /// Runs every operation of `circuit` in order and records the
    /// measurement outcomes.
    pub fn run<R: Rng + ?Sized>(&mut self, circuit: &Circuit, rng: &mut R) -> Result<SimulationResult> {
        let mut result = SimulationResult::new();
        for op in circuit.operations() {
            tracing::trace!(%op, "applying");
            match op {
                Operation::Gate { gate, targets } => self.apply_gate(*gate, targets)?,
                Operation::Controlled { control, target, gate } => self.controlled(*control, *target, *gate)?,
                Operation::Unitary { matrix, targets } => self.apply(matrix, targets)?,
                Operation::Measure { targets } => {
                    let outcomes = self.measure(targets, rng)?;
                    for (qubit, outcome) in targets.iter().zip(outcomes) {
                        result.record_outcome(*qubit, outcome);
                    }
                }
            }
        }
        Ok(result)
    }

    fn known_indices(&self, targets: &[QubitId]) -> Result<Vec<usize>> {
        let mut seen = HashSet::with_capacity(targets.len());
        targets
            .iter()
            .map(|q| {
                if q.index() >= self.num_qubits() {
                    Err(ChronoError::UnknownQubit { qubit: *q })
                } else if self.is_released(*q) {
                    Err(ChronoError::QubitReleased { qubit: *q })
                } else if !seen.insert(*q) {
                    Err(ChronoError::InvalidOperation { message: format!("Qubit {} targeted more than once", q) })
                } else {
                    Ok(q.index())
                }
            })
            .collect()
    }

    fn live_indices(&self, targets: &[QubitId]) -> Result<Vec<usize>> {
        let indices = self.known_indices(targets)?;
        if let Some(q) = targets.iter().find(|q| self.is_collapsed(**q)) {
            return Err(ChronoError::QubitCollapsed { qubit: *q });
        }
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    /// Asserts that two complex state vectors are approximately equal component-wise.
    fn assert_complex_vec_approx_equal(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i, actual[i], expected[i], context
            );
        }
    }

    #[test]
    fn hadamard_creates_equal_superposition() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let q = ctx.zero()?;
        ctx.h(&[q])?;
        let amp = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert_complex_vec_approx_equal(ctx.state().vector(), &[amp, amp], "H|0>");
        Ok(())
    }

    #[test]
    fn cnot_builds_bell_pair() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(2)?;
        let (q0, q1) = (reg.qubits()[0], reg.qubits()[1]);
        ctx.h(&[q0])?;
        ctx.cnot(q0, q1)?;

        let amp = Complex::new(FRAC_1_SQRT_2, 0.0);
        let expected = [amp, Complex::zero(), Complex::zero(), amp];
        assert_complex_vec_approx_equal(ctx.state().vector(), &expected, "Bell |Φ+>");
        assert!(matches!(ctx.amplitudes(&[q0]), Err(ChronoError::Incoherence { .. })));
        Ok(())
    }

    #[test]
    fn measurement_collapses_and_blocks_further_gates() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = QuantumContext::new();
        let q = ctx.zero()?;
        ctx.h(&[q])?;
        let outcome = ctx.measure(&[q], &mut rng)?[0];

        let probs = ctx.probabilities(&[q])?;
        assert!((probs[outcome.value() as usize] - 1.0).abs() < TEST_TOLERANCE);
        assert!(ctx.is_collapsed(q));
        assert_eq!(ctx.h(&[q]), Err(ChronoError::QubitCollapsed { qubit: q }));
        Ok(())
    }

    #[test]
    fn measuring_a_basis_state_is_deterministic() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(3)?;
        ctx.x(&[reg.qubits()[0], reg.qubits()[2]])?;
        assert_eq!(ctx.measure_index(reg.qubits(), &mut rng)?, 0b101);
        Ok(())
    }

    #[test]
    fn apply_rejects_bad_matrices_and_targets() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(2)?;
        let q0 = reg.qubits()[0];

        let not_unitary = Matrix::from_rows(vec![
            vec![Complex::one(), Complex::one()],
            vec![Complex::zero(), Complex::one()],
        ])?;
        assert!(matches!(ctx.apply(&not_unitary, &[q0]), Err(ChronoError::InvalidOperation { .. })));
        assert_eq!(
            ctx.apply(&Matrix::identity(2), reg.qubits()),
            Err(ChronoError::DimensionMismatch { expected: 4, actual: 2 })
        );
        assert_eq!(ctx.h(&[QubitId(9)]), Err(ChronoError::UnknownQubit { qubit: QubitId(9) }));
        assert!(matches!(ctx.cnot(q0, q0), Err(ChronoError::InvalidOperation { .. })));
        Ok(())
    }

    #[test]
    fn apply_uses_target_order() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(2)?;
        let (q0, q1) = (reg.qubits()[0], reg.qubits()[1]);
        // Prepares |1> on the first listed target.
        let flip_first = Matrix::state_preparation(&[0.0, 0.0, 1.0, 0.0])?;
        ctx.apply(&flip_first, &[q1, q0])?;
        assert!((ctx.probabilities(&[q0, q1])?[0b01] - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn engine_state_can_be_injected() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(2)?;
        let (c00, c11) = (Complex::new(0.6, 0.0), Complex::new(0.8, 0.0));
        ctx.engine.set_state(StateVector::new(vec![c00, Complex::zero(), Complex::zero(), c11]))?;

        let probs = ctx.probabilities(reg.qubits())?;
        assert!((probs[0] - 0.36).abs() < TEST_TOLERANCE);
        assert!((probs[3] - 0.64).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn run_records_outcomes() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(2)?;
        let (q0, q1) = (reg.qubits()[0], reg.qubits()[1]);
        let circuit = crate::CircuitBuilder::new().x(&[q0]).cnot(q0, q1).measure(&[q0, q1]).build();

        let result = ctx.run(&circuit, &mut rng)?;
        assert_eq!(result.get_outcome(&q0), Some(&Outcome::Collapsed(1)));
        assert_eq!(result.get_outcome(&q1), Some(&Outcome::Collapsed(1)));
        assert_eq!(result.index_of(reg.qubits()), Some(0b11));
        Ok(())
    }

    #[test]
    fn released_qubits_leave_the_state_vector() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(6);
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(3)?;
        let (q0, q1, q2) = (reg.qubits()[0], reg.qubits()[1], reg.qubits()[2]);
        ctx.h(&[q2])?;

        assert!(matches!(ctx.release(&[q0]), Err(ChronoError::InvalidOperation { .. })));
        ctx.measure(&[q0, q1], &mut rng)?;
        ctx.release(&[q0, q1])?;

        assert_eq!(ctx.state().dim(), 2);
        assert_eq!(ctx.num_qubits(), 3);
        assert!(ctx.is_released(q0) && ctx.is_collapsed(q0));
        assert_eq!(ctx.h(&[q0]), Err(ChronoError::QubitReleased { qubit: q0 }));
        assert_eq!(ctx.probabilities(&[q1]), Err(ChronoError::QubitReleased { qubit: q1 }));
        assert!((ctx.probabilities(&[q2])?[1] - 0.5).abs() < TEST_TOLERANCE);

        let fresh = ctx.zero()?;
        assert_eq!(fresh, QubitId(3));
        assert_eq!(ctx.state().dim(), 4);
        Ok(())
    }
}
