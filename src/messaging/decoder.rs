// src/messaging/decoder.rs

use super::config::MessageConfig;
use super::encoder::{EncodedMessage, Encoder};
use crate::circuits::CircuitBuilder;
use crate::core::{CODE_SCALE, ChronoError, PAD_CHAR, Result};
use crate::simulation::{MeasurementCounts, QuantumContext};
use rand::Rng;

/// Imaginary parts above this mean the register was not prepared by an `Encoder`.
const IMAGINARY_TOLERANCE: f64 = 1e-9;

/// Text recovered from a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    text: String,
    padded: String,
    measured_index: Option<usize>,
}

impl DecodedMessage {
    /// Recovered text without the right padding.
    ///
    /// Padding and trailing spaces are indistinguishable, so a message that
    /// ended in spaces comes back without them. `padded` keeps them.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Recovered fixed-length text.
    pub fn padded(&self) -> &str {
        &self.padded
    }

    /// Position the register collapsed to when it was measured.
    pub fn measured_index(&self) -> Option<usize> {
        self.measured_index
    }

    /// Share of `original`'s characters recovered in place, see [`accuracy`].
    pub fn accuracy(&self, original: &str) -> f64 {
        accuracy(original, &self.text)
    }
}

/// Character-level transmission accuracy in `[0, 1]`.
///
/// Counts positions where both strings hold the same character, and divides
/// by the longer length so that missing or extra characters count as errors.
/// Two empty strings match perfectly.
pub fn accuracy(original: &str, decoded: &str) -> f64 {
    let (original_len, decoded_len) = (original.chars().count(), decoded.chars().count());
    let longest = original_len.max(decoded_len);
    if longest == 0 {
        return 1.0;
    }
    let matches = original.chars().zip(decoded.chars()).filter(|(a, b)| a == b).count();
    matches as f64 / longest as f64
}

/// Turns prepared registers back into text.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: MessageConfig,
}

impl Decoder {
    /// Decoder for registers built with the same `config` as the encoder.
    pub fn new(config: MessageConfig) -> Self {
        Self { config }
    }

    /// Settings this decoder was built with.
    pub fn config(&self) -> &MessageConfig {
        &self.config
    }

    /// Measures the register once. The register collapses to position `i`
    /// with probability `amplitude_i²` and cannot be read again afterwards.
    pub fn measure<R: Rng + ?Sized>(&self, ctx: &mut QuantumContext, encoded: &EncodedMessage, rng: &mut R) -> Result<usize> {
        let index = ctx.measure_index(encoded.register().qubits(), rng)?;
        tracing::debug!(index, "register collapsed");
        Ok(index)
    }

    /// Reads the register's amplitudes from the simulation without
    /// disturbing it.
    ///
    /// # Errors
    /// * `QubitCollapsed` once the register has been measured.
    pub fn read_amplitudes(&self, ctx: &QuantumContext, encoded: &EncodedMessage) -> Result<Vec<f64>> {
        let qubits = encoded.register().qubits();
        if let Some(q) = qubits.iter().find(|q| ctx.is_collapsed(**q)) {
            return Err(ChronoError::QubitCollapsed { qubit: *q });
        }
        ctx.amplitudes(qubits)?
            .into_iter()
            .map(|c| {
                if c.im.abs() > IMAGINARY_TOLERANCE {
                    Err(ChronoError::DecodingFailure { message: format!("Amplitude {} is not real", c) })
                } else {
                    Ok(c.re)
                }
            })
            .collect()
    }

    /// Inverts the encoding: `code_i = round(amplitude_i · norm · 255)`.
    /// Returns the padded string.
    pub fn invert(&self, amplitudes: &[f64], norm: f64) -> Result<String> {
        if amplitudes.len() != self.config.max_length() {
            return Err(ChronoError::DimensionMismatch { expected: self.config.max_length(), actual: amplitudes.len() });
        }
        amplitudes
            .iter()
            .map(|a| {
                let code = (a * norm * CODE_SCALE).round();
                if !(0.0..=u32::MAX as f64).contains(&code) {
                    return Err(ChronoError::DecodingFailure { message: format!("Code {} is out of range", code) });
                }
                char::from_u32(code as u32).ok_or_else(|| ChronoError::DecodingFailure {
                    message: format!("Code {} is not a valid character", code),
                })
            })
            .collect()
    }

    /// Reads the amplitudes, inverts them, then measures the register and
    /// releases it from `ctx`.
    pub fn decode<R: Rng + ?Sized>(&self, ctx: &mut QuantumContext, encoded: &EncodedMessage, rng: &mut R) -> Result<DecodedMessage> {
        let amplitudes = self.read_amplitudes(ctx, encoded)?;
        let padded = self.invert(&amplitudes, encoded.amplitudes().norm())?;
        let measured_index = self.measure(ctx, encoded, rng)?;
        ctx.release(encoded.register().qubits())?;
        Ok(decoded(padded, Some(measured_index)))
    }

    /// Estimates the amplitudes from repeated measurements.
    ///
    /// A register is prepared once in a scratch context; each shot measures a
    /// fresh copy of it. Returns `sqrt(count / shots)` per position along with
    /// the raw counts.
    pub fn estimate_amplitudes<R: Rng + ?Sized>(&self, encoded: &EncodedMessage, rng: &mut R) -> Result<(Vec<f64>, MeasurementCounts)> {
        let mut template = QuantumContext::new();
        let register = Encoder::new(self.config.clone()).prepare(&mut template, encoded.amplitudes())?;
        let circuit = CircuitBuilder::new().measure(register.qubits()).build();

        let mut counts = MeasurementCounts::new(register.dim());
        for _ in 0..self.config.shots() {
            let mut shot = template.clone();
            let result = shot.run(&circuit, rng)?;
            let index = result.index_of(register.qubits()).ok_or_else(|| ChronoError::SimulationError {
                message: "Measurement circuit left qubits unmeasured".to_string(),
            })?;
            counts.record(index);
        }
        tracing::debug!(shots = counts.shots(), most_frequent = ?counts.most_frequent(), "sampled register");

        let estimates = counts.frequencies().into_iter().map(f64::sqrt).collect();
        Ok((estimates, counts))
    }

    /// Decodes from sampled amplitudes. Exact only when the shot count is
    /// large enough for every code to round correctly.
    pub fn decode_sampled<R: Rng + ?Sized>(&self, encoded: &EncodedMessage, rng: &mut R) -> Result<DecodedMessage> {
        let (estimates, counts) = self.estimate_amplitudes(encoded, rng)?;
        let padded = self.invert(&estimates, encoded.amplitudes().norm())?;
        Ok(decoded(padded, counts.most_frequent()))
    }

    /// Repeats `decode_sampled` `redundancy` times and keeps, position by
    /// position, the character most rounds agree on. Ties go to the earliest
    /// round.
    pub fn decode_redundant<R: Rng + ?Sized>(&self, encoded: &EncodedMessage, rng: &mut R) -> Result<DecodedMessage> {
        let rounds = (0..self.config.redundancy())
            .map(|_| self.decode_sampled(encoded, rng))
            .collect::<Result<Vec<_>>>()?;
        let columns: Vec<Vec<char>> = rounds.iter().map(|r| r.padded.chars().collect()).collect();

        let padded: String = (0..self.config.max_length())
            .filter_map(|i| majority(columns.iter().filter_map(|column| column.get(i).copied())))
            .collect();
        let measured_index = majority(rounds.iter().filter_map(|r| r.measured_index));
        tracing::debug!(rounds = rounds.len(), "majority vote");
        Ok(decoded(padded, measured_index))
    }
}

/// Most frequent item; the first one seen wins a tie.
fn majority<T: PartialEq + Copy>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut tally: Vec<(T, usize)> = Vec::new();
    for item in items {
        match tally.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => tally.push((item, 1)),
        }
    }
    tally
        .into_iter()
        .fold(None, |best: Option<(T, usize)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        })
        .map(|(item, _)| item)
}

fn decoded(padded: String, measured_index: Option<usize>) -> DecodedMessage {
    let text = padded.trim_end_matches(PAD_CHAR).to_string();
    tracing::debug!(text = ?text, "decoded message");
    DecodedMessage { text, padded, measured_index }
}
