// src/core/register.rs

use super::error::QubitId;
use std::fmt;

/// An ordered group of qubits allocated together by a `QuantumContext`.
///
/// The register holds arena indices only; the qubits themselves live in the
/// context that created the register, and every operation goes through it.
/// `qubits()[0]` is the most significant bit of the register's basis index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Register {
    qubits: Vec<QubitId>,
}

impl Register {
    pub(crate) fn new(qubits: Vec<QubitId>) -> Self {
        Self { qubits }
    }

    /// The qubits, most significant first.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Qubit at position `i`, if any.
    pub fn get(&self, i: usize) -> Option<QubitId> {
        self.qubits.get(i).copied()
    }

    /// Number of qubits.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// Returns `true` if the register holds no qubits.
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }

    /// Number of basis states spanned by the register (`2^len`).
    pub fn dim(&self) -> usize {
        1 << self.qubits.len()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Register[")?;
        for (i, q) in self.qubits.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { ", " } else { "" }, q)?;
        }
        write!(f, "]")
    }
}
