// src/messaging/config.rs

use crate::core::{ChronoError, Result};
use crate::core::constants::chrono_constants::{
    DEFAULT_SHOTS, MESSAGE_LENGTH, MIN_MESSAGE_LENGTH, NORM_TOLERANCE, REDUNDANCY_FACTOR, SHORT_MESSAGE_LENGTH, TUNNEL_ATTEMPTS,
};
use crate::validation::require_integer_log2;

/// Settings shared by the encoder, decoder and tunnel.
///
/// The maximum message length doubles as the amplitude vector dimension,
/// so it must be a power of two; the register then holds `log2(max_length)`
/// qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageConfig {
    max_length: usize,
    num_qubits: usize,
    shots: usize,
    redundancy: usize,
    norm_tolerance: f64,
    tunnel_attempts: usize,
}

impl MessageConfig {
    /// Configuration for messages of at most `max_length` characters.
    ///
    /// # Errors
    /// * `NoIntegerLogarithm` unless `max_length` is a power of two.
    /// * `InvalidOperation` for a length of 1, which leaves no qubit to prepare.
    pub fn new(max_length: usize) -> Result<Self> {
        let num_qubits = require_integer_log2(max_length)? as usize;
        if max_length < MIN_MESSAGE_LENGTH {
            return Err(ChronoError::InvalidOperation {
                message: format!("Message length must be at least {}, got {}", MIN_MESSAGE_LENGTH, max_length),
            });
        }
        Ok(Self {
            max_length,
            num_qubits,
            shots: DEFAULT_SHOTS,
            redundancy: REDUNDANCY_FACTOR,
            norm_tolerance: NORM_TOLERANCE,
            tunnel_attempts: TUNNEL_ATTEMPTS,
        })
    }

    /// The 16-character variant.
    pub fn short() -> Self {
        Self { max_length: SHORT_MESSAGE_LENGTH, num_qubits: 4, ..Self::default() }
    }

    /// Number of shots used by sampled decoding.
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots.max(1);
        self
    }

    /// Number of sampled decodings combined by `Decoder::decode_redundant`.
    pub fn with_redundancy(mut self, redundancy: usize) -> Self {
        self.redundancy = redundancy.max(1);
        self
    }

    /// Allowed deviation of a squared norm from 1.0.
    pub fn with_norm_tolerance(mut self, tolerance: f64) -> Self {
        self.norm_tolerance = tolerance;
        self
    }

    /// Number of direction qubits in a time tunnel.
    pub fn with_tunnel_attempts(mut self, attempts: usize) -> Self {
        self.tunnel_attempts = attempts;
        self
    }

    /// Maximum message length in characters, also the amplitude vector size.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Qubits in an encoded register, `log2(max_length)`.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Measurements per sampled decoding.
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Sampled decodings per redundant decoding.
    pub fn redundancy(&self) -> usize {
        self.redundancy
    }

    /// Allowed deviation of a squared norm from 1.0.
    pub fn norm_tolerance(&self) -> f64 {
        self.norm_tolerance
    }

    /// Direction qubits per time tunnel.
    pub fn tunnel_attempts(&self) -> usize {
        self.tunnel_attempts
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            max_length: MESSAGE_LENGTH,
            num_qubits: 5,
            shots: DEFAULT_SHOTS,
            redundancy: REDUNDANCY_FACTOR,
            norm_tolerance: NORM_TOLERANCE,
            tunnel_attempts: TUNNEL_ATTEMPTS,
        }
    }
}
