// src/messaging/encoder.rs

use super::config::MessageConfig;
use crate::core::{CODE_SCALE, ChronoError, Matrix, PAD_CHAR, Register, Result};
use crate::simulation::QuantumContext;
use crate::validation::check_amplitudes;
use std::fmt;

/// A message right-padded with spaces to the configured length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    padded: String,
}

impl Message {
    /// Pads `text` to exactly `max_length` characters.
    /// Fails with `InvalidLength` when `text` is longer than that.
    pub fn new(text: &str, max_length: usize) -> Result<Self> {
        let length = text.chars().count();
        if length > max_length {
            return Err(ChronoError::InvalidLength { length, max: max_length });
        }
        let mut padded = String::with_capacity(text.len() + max_length - length);
        padded.push_str(text);
        padded.extend(std::iter::repeat_n(PAD_CHAR, max_length - length));
        Ok(Self { text: text.to_string(), padded })
    }

    /// The message as given.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message padded to the fixed length.
    pub fn padded(&self) -> &str {
        &self.padded
    }

    /// Code point of each padded character.
    pub fn codes(&self) -> Vec<u32> {
        self.padded.chars().map(u32::from).collect()
    }
}

/// The numeric form of a padded message.
///
/// Keeps every stage of the mapping: character codes, codes scaled by 255,
/// the L2 norm of the scaled vector and the unit-norm amplitudes. The norm is
/// the classical key a decoder needs to turn amplitudes back into codes.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeVector {
    codes: Vec<u32>,
    scaled: Vec<f64>,
    norm: f64,
    amplitudes: Vec<f64>,
}

impl AmplitudeVector {
    /// Maps each character to `code / 255`, then divides by the L2 norm.
    pub fn from_message(message: &Message) -> Result<Self> {
        Self::from_codes(message.codes())
    }

    /// Builds the vector from raw character codes.
    pub fn from_codes(codes: Vec<u32>) -> Result<Self> {
        let scaled: Vec<f64> = codes.iter().map(|c| *c as f64 / CODE_SCALE).collect();
        let norm = scaled.iter().map(|s| s * s).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(ChronoError::Incoherence {
                message: "An all-zero code vector has no normalized form".to_string(),
            });
        }
        let amplitudes = scaled.iter().map(|s| s / norm).collect();
        Ok(Self { codes, scaled, norm, amplitudes })
    }

    /// Code point of each padded character.
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Codes divided by 255.
    pub fn scaled(&self) -> &[f64] {
        &self.scaled
    }

    /// L2 norm of the scaled vector.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Unit-norm amplitudes, one per character position.
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Squared amplitudes: the measurement distribution over positions.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a * a).collect()
    }

    /// Position with the largest amplitude (first on ties).
    pub fn dominant_index(&self) -> usize {
        self.amplitudes
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, a)| if *a > best.1 { (i, *a) } else { best })
            .0
    }

    /// Number of positions, the padded message length.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// `true` only for a vector with no positions.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }
}

impl fmt::Display for AmplitudeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitudes[")?;
        for (i, a) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, a)?;
        }
        write!(f, "] (norm {:.4})", self.norm)
    }
}

/// A register prepared in the state described by its amplitude vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMessage {
    register: Register,
    amplitudes: AmplitudeVector,
}

impl EncodedMessage {
    /// Qubits holding the message.
    pub fn register(&self) -> &Register {
        &self.register
    }

    /// Classical description of the prepared state, norm included.
    pub fn amplitudes(&self) -> &AmplitudeVector {
        &self.amplitudes
    }
}

/// Turns text into prepared qubit registers.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: MessageConfig,
}

impl Encoder {
    /// Encoder producing registers sized by `config`.
    pub fn new(config: MessageConfig) -> Self {
        Self { config }
    }

    /// Settings this encoder was built with.
    pub fn config(&self) -> &MessageConfig {
        &self.config
    }

    /// Encodes `text` into a fresh register of `ctx`.
    ///
    /// Validates the length before anything is allocated, pads, maps the
    /// characters to a unit-norm amplitude vector and prepares a
    /// `log2(max_length)`-qubit register in that state.
    ///
    /// # Errors
    /// * `InvalidLength` if `text` has more than `max_length` characters.
    pub fn encode(&self, ctx: &mut QuantumContext, text: &str) -> Result<EncodedMessage> {
        let message = Message::new(text, self.config.max_length())?;
        tracing::debug!(padded = ?message.padded(), "fixed-length message");

        let amplitudes = AmplitudeVector::from_message(&message)?;
        tracing::debug!(codes = ?amplitudes.codes(), "character codes");
        tracing::debug!(%amplitudes, "amplitude vector");

        let register = self.prepare(ctx, &amplitudes)?;
        Ok(EncodedMessage { register, amplitudes })
    }

    /// Allocates a register in `ctx` and prepares it in the state `amplitudes`.
    pub fn prepare(&self, ctx: &mut QuantumContext, amplitudes: &AmplitudeVector) -> Result<Register> {
        if amplitudes.len() != self.config.max_length() {
            return Err(ChronoError::DimensionMismatch { expected: self.config.max_length(), actual: amplitudes.len() });
        }
        check_amplitudes(amplitudes.amplitudes(), Some(self.config.norm_tolerance()))?;

        let preparation = Matrix::state_preparation(amplitudes.amplitudes())?;
        let register = ctx.zero_log2(amplitudes.len())?;
        ctx.apply(&preparation, register.qubits())?;
        tracing::trace!(%register, "register prepared");
        Ok(register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_padded_to_fixed_length() -> Result<()> {
        let message = Message::new("Hello, world!", 16)?;
        assert_eq!(message.padded(), "Hello, world!   ");
        assert_eq!(message.codes().len(), 16);
        assert_eq!(message.codes()[0], 'H' as u32);
        Ok(())
    }

    #[test]
    fn length_counts_characters_not_bytes() -> Result<()> {
        let message = Message::new("ÿÿÿÿ", 4)?;
        assert_eq!(message.padded().chars().count(), 4);
        assert_eq!(Message::new("abcde", 4), Err(ChronoError::InvalidLength { length: 5, max: 4 }));
        Ok(())
    }

    #[test]
    fn amplitude_vector_keeps_every_stage() -> Result<()> {
        let vector = AmplitudeVector::from_codes(vec![255, 0, 0, 0])?;
        assert_eq!(vector.scaled(), &[1.0, 0.0, 0.0, 0.0]);
        assert!((vector.norm() - 1.0).abs() < 1e-12);
        assert_eq!(vector.dominant_index(), 0);

        let vector = AmplitudeVector::from_codes(vec![30, 40])?;
        assert!((vector.amplitudes()[0] - 0.6).abs() < 1e-12);
        assert!((vector.amplitudes()[1] - 0.8).abs() < 1e-12);
        assert_eq!(vector.dominant_index(), 1);
        Ok(())
    }

    #[test]
    fn all_zero_codes_cannot_be_normalized() {
        assert!(matches!(AmplitudeVector::from_codes(vec![0, 0]), Err(ChronoError::Incoherence { .. })));
    }

    #[test]
    fn prepare_checks_dimension() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let encoder = Encoder::new(MessageConfig::short());
        let vector = AmplitudeVector::from_codes(vec![72, 105])?;
        assert_eq!(
            encoder.prepare(&mut ctx, &vector),
            Err(ChronoError::DimensionMismatch { expected: 16, actual: 2 })
        );
        assert_eq!(ctx.num_qubits(), 0);
        Ok(())
    }
}
