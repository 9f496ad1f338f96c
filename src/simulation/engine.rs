// src/simulation/engine.rs
use crate::core::{ChronoError, Matrix, Result, StateVector};
use crate::core::constants::chrono_constants::AMPLITUDE_TOLERANCE;
use crate::validation::check_normalization;
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};

/// Largest deviation from an exact product state still read as unentangled.
const PRODUCT_TOLERANCE: f64 = 1e-9;

/// Lifecycle of a qubit in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QubitStatus {
    Live,
    Collapsed,
    /// Measured and removed from the state vector.
    Released,
}

/// Owns the global state vector and evolves it.
/// Qubits are addressed by arena index (0..N-1). Only qubits listed in
/// `held` take part in the state vector; the first of them is the most
/// significant bit of the basis index. (Internal visibility)
#[derive(Debug, Clone)]
pub(crate) struct SimulationEngine {
    global_state: StateVector,
    held: Vec<usize>,
    status: Vec<QubitStatus>,
}

impl SimulationEngine {
    /// An engine holding zero qubits.
    pub(crate) fn new() -> Self {
        Self {
            global_state: StateVector::vacuum(),
            held: Vec::new(),
            status: Vec::new(),
        }
    }

    /// Number of qubits ever allocated, released ones included.
    pub(crate) fn num_qubits(&self) -> usize {
        self.status.len()
    }

    pub(crate) fn state(&self) -> &StateVector {
        &self.global_state
    }

    /// `true` once the qubit has been measured, released or not.
    pub(crate) fn is_collapsed(&self, idx: usize) -> bool {
        self.status.get(idx).is_some_and(|s| *s != QubitStatus::Live)
    }

    pub(crate) fn is_released(&self, idx: usize) -> bool {
        self.status.get(idx) == Some(&QubitStatus::Released)
    }

    // Add a crate-visible method to set the state directly for testing
    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.dim() != self.global_state.dim() {
            return Err(ChronoError::DimensionMismatch { expected: self.global_state.dim(), actual: state.dim() });
        }
        self.global_state = state;
        Ok(())
    }

    /// Appends `count` qubits in `|0>` and returns the index of the first one.
    /// The new qubits become the least significant bits, so every existing
    /// amplitude moves from index `k` to `k << count`.
    pub(crate) fn allocate(&mut self, count: usize) -> Result<usize> {
        let first = self.num_qubits();
        let width = self.held.len() + count;
        let dim = u32::try_from(width).ok().and_then(|w| 1usize.checked_shl(w)).ok_or_else(|| {
            ChronoError::SimulationError {
                message: format!("{} held qubits overflow the state vector dimension", width),
            }
        })?;

        let mut new_vec: Vec<Complex<f64>> = vec![Complex::zero(); dim];
        for (k, amp) in self.global_state.vector().iter().enumerate() {
            new_vec[k << count] = *amp;
        }
        self.global_state = StateVector::new(new_vec);
        self.held.extend(first..first + count);
        self.status.extend(std::iter::repeat_n(QubitStatus::Live, count));
        Ok(first)
    }

    fn bit_position(&self, idx: usize) -> Result<usize> {
        self.held
            .iter()
            .position(|q| *q == idx)
            .map(|p| self.held.len() - 1 - p)
            .ok_or_else(|| ChronoError::SimulationError {
                message: format!("Qubit index {} is not held in the state vector", idx),
            })
    }

    fn bit_positions(&self, targets: &[usize]) -> Result<Vec<usize>> {
        targets.iter().map(|t| self.bit_position(*t)).collect()
    }

    /// Applies a 2x2 matrix to a single qubit.
    pub(crate) fn apply_single_qubit_gate(&mut self, target_idx: usize, matrix: &[[Complex<f64>; 2]; 2]) -> Result<()> {
        let k = self.bit_position(target_idx)?;
        let k_mask = 1usize << k;

        let dim = self.global_state.dim();
        let mut new_vec: Vec<Complex<f64>> = vec![Complex::zero(); dim];
        let psi = self.global_state.vector();

        // Pairs of basis states differing only at the target bit.
        for i in 0..dim / 2 {
            let i0 = insert_zero_bit(i, k);
            let i1 = i0 | k_mask;
            new_vec[i0] = matrix[0][0] * psi[i0] + matrix[0][1] * psi[i1];
            new_vec[i1] = matrix[1][0] * psi[i0] + matrix[1][1] * psi[i1];
        }

        self.global_state = StateVector::new(new_vec);
        self.validate_state()
    }

    /// Applies `matrix` to the ordered `targets`. `targets[0]` is the most
    /// significant bit of the matrix basis index.
    pub(crate) fn apply_unitary(&mut self, matrix: &Matrix, targets: &[usize]) -> Result<()> {
        let k = targets.len();
        if matrix.dim() != 1 << k {
            return Err(ChronoError::DimensionMismatch { expected: 1 << k, actual: matrix.dim() });
        }
        let positions = self.bit_positions(targets)?;
        let target_mask: usize = positions.iter().map(|p| 1usize << p).sum();

        let dim = self.global_state.dim();
        let sub_dim = matrix.dim();
        let mut new_vec = self.global_state.vector().to_vec();
        let mut indices = vec![0usize; sub_dim];
        let mut slice: Vec<Complex<f64>> = vec![Complex::zero(); sub_dim];

        for base in (0..dim).filter(|b| b & target_mask == 0) {
            for (sub, index) in indices.iter_mut().enumerate() {
                *index = base | scatter_bits(sub, &positions);
            }
            for (amp, index) in slice.iter_mut().zip(&indices) {
                *amp = self.global_state.vector()[*index];
            }
            let transformed = matrix.apply_to(&slice)?;
            for (index, amp) in indices.iter().zip(transformed) {
                new_vec[*index] = amp;
            }
        }

        self.global_state = StateVector::new(new_vec);
        self.validate_state()
    }

    /// Marginal probability of every outcome of the ordered `targets`.
    pub(crate) fn probabilities(&self, targets: &[usize]) -> Result<Vec<f64>> {
        let positions = self.bit_positions(targets)?;
        let mut probs = vec![0.0; 1 << targets.len()];
        for (k, amp) in self.global_state.vector().iter().enumerate() {
            probs[gather_bits(k, &positions)] += amp.norm_sqr();
        }
        Ok(probs)
    }

    /// Amplitudes of the ordered `targets`, provided they are in a product
    /// state with every other held qubit. The global phase is fixed so that
    /// the largest amplitude is real and positive.
    pub(crate) fn factor_amplitudes(&self, targets: &[usize]) -> Result<Vec<Complex<f64>>> {
        let positions = self.bit_positions(targets)?;
        let target_mask: usize = positions.iter().map(|p| 1usize << p).sum();
        let sub_dim = 1usize << targets.len();
        let psi = self.global_state.vector();
        let bases: Vec<usize> = (0..psi.len()).filter(|b| b & target_mask == 0).collect();

        // Pick the configuration of the remaining qubits carrying the most weight.
        let (best_base, _) = bases
            .iter()
            .map(|b| {
                let weight: f64 = (0..sub_dim).map(|sub| psi[b | scatter_bits(sub, &positions)].norm_sqr()).sum();
                (*b, weight)
            })
            .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        let mut slice: Vec<Complex<f64>> = (0..sub_dim)
            .map(|sub| psi[best_base | scatter_bits(sub, &positions)])
            .collect();
        let norm = slice.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        if norm < AMPLITUDE_TOLERANCE {
            return Err(ChronoError::Incoherence { message: "Targets carry no amplitude".to_string() });
        }
        let pivot = slice
            .iter()
            .copied()
            .fold(Complex::zero(), |best: Complex<f64>, c| if c.norm_sqr() > best.norm_sqr() { c } else { best });
        let phase = pivot.conj() / pivot.norm();
        for amp in slice.iter_mut() {
            *amp = *amp * phase / norm;
        }

        // Product state: every other slice is a complex multiple of this one.
        for base in bases {
            let row: Vec<Complex<f64>> = (0..sub_dim).map(|sub| psi[base | scatter_bits(sub, &positions)]).collect();
            let coefficient: Complex<f64> = slice.iter().zip(&row).map(|(s, r)| s.conj() * r).sum();
            if slice.iter().zip(&row).any(|(s, r)| (r - coefficient * s).norm() > PRODUCT_TOLERANCE) {
                return Err(ChronoError::Incoherence {
                    message: "Targets are entangled with the rest of the context".to_string(),
                });
            }
        }
        Ok(slice)
    }

    /// Samples an outcome of the ordered `targets` with Born-rule
    /// probabilities, collapses the state onto it and renormalizes.
    /// Returns the outcome as a basis index over the targets.
    pub(crate) fn measure<R: Rng + ?Sized>(&mut self, targets: &[usize], rng: &mut R) -> Result<usize> {
        let probs = self.probabilities(targets)?;
        let total: f64 = probs.iter().sum();
        if total < AMPLITUDE_TOLERANCE {
            return Err(ChronoError::Incoherence { message: "Cannot measure a state with zero norm".to_string() });
        }

        let sample: f64 = StandardUniform.sample(rng);
        let p_sample = sample * total;
        let mut cumulative = 0.0;
        // Fallback for p_sample landing on the upper edge through rounding.
        let mut chosen = probs.iter().rposition(|p| *p > AMPLITUDE_TOLERANCE).unwrap_or(0);
        for (outcome, p) in probs.iter().enumerate() {
            cumulative += p;
            if p_sample < cumulative && *p > AMPLITUDE_TOLERANCE {
                chosen = outcome;
                break;
            }
        }

        let positions = self.bit_positions(targets)?;
        let scale = probs[chosen].sqrt();
        let new_vec: Vec<Complex<f64>> = self
            .global_state
            .vector()
            .iter()
            .enumerate()
            .map(|(k, amp)| if gather_bits(k, &positions) == chosen { *amp / scale } else { Complex::zero() })
            .collect();
        self.global_state = StateVector::new(new_vec);
        for t in targets {
            self.status[*t] = QubitStatus::Collapsed;
        }
        Ok(chosen)
    }

    /// Drops a measured qubit from the state vector, halving its dimension.
    /// A collapsed qubit sits in a basis state, so the rest of the state is
    /// left unchanged.
    pub(crate) fn release(&mut self, target: usize) -> Result<()> {
        if self.status.get(target) != Some(&QubitStatus::Collapsed) {
            return Err(ChronoError::InvalidOperation {
                message: format!("Qubit index {} is not collapsed and cannot be released", target),
            });
        }
        let pos = self.bit_position(target)?;
        let probs = self.probabilities(&[target])?;
        let bit = if probs[1] > probs[0] { 1usize << pos } else { 0 };

        let psi = self.global_state.vector();
        let new_vec: Vec<Complex<f64>> = (0..psi.len() / 2).map(|i| psi[insert_zero_bit(i, pos) | bit]).collect();
        self.global_state = StateVector::new(new_vec);
        self.held.retain(|q| *q != target);
        self.status[target] = QubitStatus::Released;
        self.validate_state()
    }

    fn validate_state(&self) -> Result<()> {
        check_normalization(&self.global_state, None)
    }
}

/// Inserts a zero bit at `pos`, shifting the higher bits of `index` up by one.
fn insert_zero_bit(index: usize, pos: usize) -> usize {
    let lower_mask = (1usize << pos) - 1;
    ((index & !lower_mask) << 1) | (index & lower_mask)
}

/// Spreads the bits of `sub` onto `positions`; bit `len-1-j` of `sub` goes to `positions[j]`.
fn scatter_bits(sub: usize, positions: &[usize]) -> usize {
    let k = positions.len();
    positions
        .iter()
        .enumerate()
        .map(|(j, pos)| ((sub >> (k - 1 - j)) & 1) << pos)
        .sum()
}

/// Inverse of `scatter_bits`: reads the bits at `positions` into a compact index.
fn gather_bits(index: usize, positions: &[usize]) -> usize {
    positions.iter().fold(0, |acc, pos| (acc << 1) | ((index >> pos) & 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Gate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn scatter_and_gather_are_inverse() {
        let positions = [4, 0, 2];
        for sub in 0..8 {
            assert_eq!(gather_bits(scatter_bits(sub, &positions), &positions), sub);
        }
        assert_eq!(scatter_bits(0b100, &positions), 1 << 4);
    }

    #[test]
    fn allocate_shifts_existing_amplitudes() -> Result<()> {
        let mut engine = SimulationEngine::new();
        engine.allocate(1)?;
        engine.apply_single_qubit_gate(0, &Gate::PauliX.matrix())?;
        engine.allocate(2)?;
        // q0 = 1, q1 = q2 = 0 -> |100>
        assert_eq!(engine.state().dim(), 8);
        assert!((engine.state().vector()[4].re - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn hadamard_on_low_order_qubits_keeps_marginals() -> Result<()> {
        let mut engine = SimulationEngine::new();
        engine.allocate(3)?;
        engine.apply_single_qubit_gate(2, &Gate::Hadamard.matrix())?;
        assert!((engine.state().norm_sqr() - 1.0).abs() < 1e-12);
        assert!((engine.probabilities(&[0])?[0] - 1.0).abs() < 1e-12);
        assert!((engine.probabilities(&[1])?[0] - 1.0).abs() < 1e-12);
        let last = engine.probabilities(&[2])?;
        assert!((last[0] - 0.5).abs() < 1e-12 && (last[1] - 0.5).abs() < 1e-12);

        let mut wide = SimulationEngine::new();
        wide.allocate(10)?;
        for idx in 0..10 {
            wide.apply_single_qubit_gate(idx, &Gate::Hadamard.matrix())?;
        }
        for idx in 0..10 {
            assert!((wide.probabilities(&[idx])?[0] - 0.5).abs() < 1e-12, "qubit {}", idx);
        }
        Ok(())
    }

    #[test]
    fn phase_entanglement_blocks_factoring() -> Result<()> {
        let mut engine = SimulationEngine::new();
        engine.allocate(2)?;
        engine.apply_single_qubit_gate(0, &Gate::Hadamard.matrix())?;
        engine.apply_single_qubit_gate(1, &Gate::Hadamard.matrix())?;
        // A relative phase on one qubit alone keeps the state a product.
        engine.apply_single_qubit_gate(1, &Gate::PauliZ.matrix())?;
        assert_eq!(engine.factor_amplitudes(&[0])?.len(), 2);
        engine.apply_single_qubit_gate(1, &Gate::PauliZ.matrix())?;

        let (one, zero): (Complex<f64>, Complex<f64>) = (Complex::new(1.0, 0.0), Complex::zero());
        let cz = Matrix::from_rows(vec![
            vec![one, zero, zero, zero],
            vec![zero, one, zero, zero],
            vec![zero, zero, one, zero],
            vec![zero, zero, zero, -one],
        ])?;
        engine.apply_unitary(&cz, &[0, 1])?;
        // Marginals are still uniform, only the phases tie the qubits together.
        assert!((engine.probabilities(&[0])?[0] - 0.5).abs() < 1e-12);
        assert!(matches!(engine.factor_amplitudes(&[0]), Err(ChronoError::Incoherence { .. })));
        assert!(matches!(engine.factor_amplitudes(&[1]), Err(ChronoError::Incoherence { .. })));
        Ok(())
    }

    #[test]
    fn release_drops_a_measured_qubit() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(3);
        let mut engine = SimulationEngine::new();
        engine.allocate(3)?;
        engine.apply_single_qubit_gate(1, &Gate::PauliX.matrix())?;
        engine.apply_single_qubit_gate(2, &Gate::Hadamard.matrix())?;

        assert!(engine.release(1).is_err());
        assert_eq!(engine.measure(&[1], &mut rng)?, 1);
        engine.release(1)?;

        assert_eq!(engine.state().dim(), 4);
        assert!(engine.is_released(1) && engine.is_collapsed(1));
        assert!((engine.probabilities(&[0])?[0] - 1.0).abs() < 1e-12);
        let last = engine.probabilities(&[2])?;
        assert!((last[0] - 0.5).abs() < 1e-12);
        assert!(matches!(engine.probabilities(&[1]), Err(ChronoError::SimulationError { .. })));

        // Fresh qubits still land after the held ones.
        assert_eq!(engine.allocate(1)?, 3);
        assert_eq!(engine.state().dim(), 8);
        Ok(())
    }
}
