//! Constants shared by the encoder, decoder and transport.

/// Message-level constants.
pub mod chrono_constants {
    /// Maximum message length of the short variant.
    pub const SHORT_MESSAGE_LENGTH: usize = 16;
    /// Maximum message length of the long variant, used by default.
    pub const MESSAGE_LENGTH: usize = 32;
    /// Divisor applied to character codes before normalization.
    pub const CODE_SCALE: f64 = 255.0;
    /// Smallest configurable message length; one position gives a 0-qubit register.
    pub const MIN_MESSAGE_LENGTH: usize = 2;
    /// Character used to right-pad messages.
    pub const PAD_CHAR: char = ' ';
    /// Number of independent direction qubits in a time tunnel.
    pub const TUNNEL_ATTEMPTS: usize = 10;
    /// Shots used by sampled decoding unless configured otherwise.
    pub const DEFAULT_SHOTS: usize = 20_000;
    /// Independent sampled decodings combined by majority vote.
    pub const REDUNDANCY_FACTOR: usize = 3;
    /// Allowed deviation of a squared norm from 1.0.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Amplitudes with squared magnitude below this are treated as zero.
    pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;
}
