// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod matrix;
pub mod register;
pub mod state;

// Re-export public types for convenient access via `chronochat::core::TypeName`
pub use error::{ChronoError, QubitId, Result};
pub use matrix::Matrix;
pub use register::Register;
pub use state::{Outcome, StateVector};

pub mod constants;
pub use constants::chrono_constants::{CODE_SCALE, MESSAGE_LENGTH, PAD_CHAR, SHORT_MESSAGE_LENGTH, TUNNEL_ATTEMPTS};
