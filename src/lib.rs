// src/lib.rs

//! `chronochat` - Amplitude encoding of short text messages over simulated qubits
//!
//! A message is padded to a fixed power-of-two length, mapped to a unit-norm
//! vector of character codes and loaded into the amplitudes of a qubit
//! register. Decoding inverts the mapping. The crate carries its own small
//! state-vector simulator, and a "time tunnel" of independent direction
//! qubits.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod messaging;
pub mod transport;

// Re-export the most common types for easier top-level use
pub use crate::core::{ChronoError, Matrix, Outcome, QubitId, Register, Result, StateVector};
pub use operations::{Gate, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{MeasurementCounts, QuantumContext, SimulationResult};
pub use messaging::{AmplitudeVector, DecodedMessage, Decoder, EncodedMessage, Encoder, Message, MessageConfig};
pub use transport::{Direction, TimeTunnel};
pub use validation::{
    check_amplitudes,
    check_normalization,
    integer_log2,
    integer_sqrt,
};

// Example 1: Time-arrow qubit
// Superpose a single qubit and measure it with a seeded random source.
/// ```
/// use chronochat::{QuantumContext, Outcome, ChronoError};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(2024);
/// let mut ctx = QuantumContext::new();
///
/// let time_arrow = ctx.zero().unwrap();
/// ctx.h(&[time_arrow]).unwrap();
///
/// match ctx.measure(&[time_arrow], &mut rng) {
///     Ok(outcomes) => {
///         println!("Measured {}", outcomes[0]);
///         assert!(matches!(outcomes[0], Outcome::Collapsed(0) | Outcome::Collapsed(1)));
///         // The qubit is now classical.
///         assert_eq!(ctx.h(&[time_arrow]), Err(ChronoError::QubitCollapsed { qubit: time_arrow }));
///     }
///     Err(e) => panic!("measurement failed: {}", e),
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Over-long messages
// The length check runs before any qubit is allocated.
/// ```
/// use chronochat::{ChronoError, Encoder, MessageConfig, QuantumContext};
///
/// let mut ctx = QuantumContext::new();
/// let encoder = Encoder::new(MessageConfig::default());
/// let too_long = "x".repeat(33);
///
/// assert_eq!(
///     encoder.encode(&mut ctx, &too_long).unwrap_err(),
///     ChronoError::InvalidLength { length: 33, max: 32 }
/// );
/// assert_eq!(ctx.num_qubits(), 0);
/// ```
#[doc(hidden)]
const _: () = ();
