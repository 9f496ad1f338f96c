// src/core/state.rs

use num_complex::Complex;
use std::fmt;

/// Joint state of every qubit a context still holds, as a vector of
/// `2^N` complex amplitudes.
///
/// Basis ordering: held qubits in allocation order, the earliest one being
/// the most significant bit, so `|a b ... z>` maps to index
/// `a·2^(N-1) + b·2^(N-2) + ... + z`. Released qubits no longer take part.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    /// Creates a state from raw amplitudes. Normalization is checked by the
    /// caller (see `validation::check_normalization`).
    pub(crate) fn new(amplitudes: Vec<Complex<f64>>) -> Self {
        Self { amplitudes }
    }

    /// The empty product state: a single amplitude of 1 over zero qubits.
    pub(crate) fn vacuum() -> Self {
        Self { amplitudes: vec![Complex::new(1.0, 0.0)] }
    }

    /// Provides read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    /// Gets the number of basis states represented.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Number of qubits described by the state (`log2(dim)`).
    pub fn num_qubits(&self) -> usize {
        self.amplitudes.len().trailing_zeros() as usize
    }

    /// Sum of squared amplitude magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

/// Classical outcome of measuring a single qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The qubit collapsed to `|0>` or `|1>`.
    Collapsed(u8),
}

impl Outcome {
    /// Helper to extract the bit value.
    pub fn value(&self) -> u8 {
        match self {
            Outcome::Collapsed(bit) => *bit,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Collapsed(bit) => write!(f, "|{}>", bit),
        }
    }
}
