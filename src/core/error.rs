//! Error handling logic

use std::fmt;

/// Index of a qubit inside a `QuantumContext` arena.
/// Ids are handed out sequentially by the context that owns the qubit and
/// are only meaningful within that context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl QubitId {
    /// Position of the qubit in the context's arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Failures raised while encoding, simulating or decoding messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChronoError {
    /// The message is longer than the configured maximum length.
    #[error("Invalid message length: {length} characters exceeds maximum of {max}")]
    InvalidLength {
        /// Length of the rejected message, in characters.
        length: usize,
        /// Configured maximum length.
        max: usize,
    },

    /// The configured length has no integer base-2 logarithm.
    #[error("Length {length} is not a power of two")]
    NoIntegerLogarithm {
        /// Rejected length.
        length: usize,
    },

    /// No integer `i` satisfies `i * i == target` within the search bound.
    #[error("No integer square root exists for {target}")]
    NoIntegerSquareRoot {
        /// Value whose square root was requested.
        target: u64,
    },

    /// The qubit was already measured and can no longer be transformed.
    #[error("Qubit {qubit} is collapsed")]
    QubitCollapsed {
        /// The measured qubit.
        qubit: QubitId,
    },

    /// The qubit was measured and then released from the state vector.
    #[error("Qubit {qubit} was released")]
    QubitReleased {
        /// The released qubit.
        qubit: QubitId,
    },

    /// The qubit id was not allocated by this context.
    #[error("Qubit {qubit} is not part of this context")]
    UnknownQubit {
        /// The unknown qubit.
        qubit: QubitId,
    },

    /// An operation is inconsistent with the current state or its own arguments.
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// A state or amplitude vector is not normalized.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },

    /// Vector or matrix dimensions do not match the targeted qubits.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension required by the targets.
        expected: usize,
        /// Dimension supplied.
        actual: usize,
    },

    /// Amplitudes could not be mapped back to text.
    #[error("Decoding failure: {message}")]
    DecodingFailure {
        /// DecodingFailure failure message
        message: String,
    },

    /// General error encountered during the simulation process itself.
    #[error("Simulation Process Error: {message}")]
    SimulationError {
        /// SimulationError failure message
        message: String,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ChronoError>;
