// src/messaging/mod.rs

//! Amplitude encoding of short text messages.
//!
//! A message of at most `L` characters is right-padded to `L`, each
//! character becomes `code / 255`, and the vector is scaled to unit L2 norm.
//! The result is loaded into a `log2(L)`-qubit register, so that measuring
//! the register lands on position `i` with probability `amplitude_i²`.
//!
//! ```
//! use chronochat::messaging::{Decoder, Encoder, MessageConfig};
//! use chronochat::QuantumContext;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut ctx = QuantumContext::new();
//! let encoder = Encoder::new(MessageConfig::short());
//! let decoder = Decoder::new(MessageConfig::short());
//!
//! let encoded = encoder.encode(&mut ctx, "Hello, world!").unwrap();
//! assert_eq!(encoded.register().len(), 4);
//!
//! let decoded = decoder.decode(&mut ctx, &encoded, &mut rng).unwrap();
//! assert_eq!(decoded.text(), "Hello, world!");
//! assert_eq!(decoded.padded(), "Hello, world!   ");
//! ```

mod config;
mod decoder;
mod encoder;

pub use config::MessageConfig;
pub use decoder::{DecodedMessage, Decoder, accuracy};
pub use encoder::{AmplitudeVector, EncodedMessage, Encoder, Message};
