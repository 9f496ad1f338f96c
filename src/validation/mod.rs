// src/validation/mod.rs

//! Normalization checks and the integer helpers used to validate
//! configured message lengths.

use crate::core::{ChronoError, Result, StateVector};
use crate::core::constants::chrono_constants::NORM_TOLERANCE;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0 (e.g., 1e-9). Defaults are available.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(ChronoError::Incoherence)` if normalization fails.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(ChronoError::Incoherence {
            message: format!("State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})", norm_sq, effective_tolerance),
        })
    } else {
        Ok(())
    }
}

/// Same check as [`check_normalization`] for a real amplitude vector.
pub fn check_amplitudes(amplitudes: &[f64], tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sq: f64 = amplitudes.iter().map(|a| a * a).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(ChronoError::Incoherence {
            message: format!("Amplitude vector normalization failed. Sum(a_i^2) = {} (Deviation > {})", norm_sq, effective_tolerance),
        })
    } else {
        Ok(())
    }
}

/// Returns `k` such that `2^k == n`, or `None` when `n` is not a power of two.
pub fn integer_log2(n: usize) -> Option<u32> {
    if n.is_power_of_two() { Some(n.trailing_zeros()) } else { None }
}

/// Returns `i` with `i * i == target` for some `i <= bound`, or `None`.
pub fn integer_sqrt(target: u64, bound: u64) -> Option<u64> {
    (0..=bound)
        .take_while(|i| i.checked_mul(*i).is_some_and(|sq| sq <= target))
        .find(|i| i * i == target)
}

/// [`integer_log2`] for callers that treat a missing logarithm as a hard failure.
pub fn require_integer_log2(n: usize) -> Result<u32> {
    integer_log2(n).ok_or(ChronoError::NoIntegerLogarithm { length: n })
}

/// [`integer_sqrt`] for callers that treat a missing root as a hard failure.
pub fn require_integer_sqrt(target: u64, bound: u64) -> Result<u64> {
    integer_sqrt(target, bound).ok_or(ChronoError::NoIntegerSquareRoot { target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn normalization_accepts_unit_vectors() {
        let half = Complex::new(0.5, 0.0);
        let state = StateVector::new(vec![half, half, half, Complex::new(0.0, -0.5)]);
        assert!(check_normalization(&state, None).is_ok());
        assert!(check_amplitudes(&[0.6, 0.8], None).is_ok());
    }

    #[test]
    fn normalization_rejects_scaled_codes() {
        // Dividing codes by 255 alone does not give a unit vector.
        let scaled: Vec<f64> = "Hi".chars().map(|c| c as u32 as f64 / 255.0).collect();
        assert!(matches!(check_amplitudes(&scaled, None), Err(ChronoError::Incoherence { .. })));
    }

    #[test]
    fn integer_log2_of_message_lengths() {
        assert_eq!(integer_log2(16), Some(4));
        assert_eq!(integer_log2(32), Some(5));
        assert_eq!(integer_log2(1), Some(0));
        assert_eq!(integer_log2(0), None);
        assert_eq!(integer_log2(24), None);
        assert_eq!(require_integer_log2(33), Err(ChronoError::NoIntegerLogarithm { length: 33 }));
    }

    #[test]
    fn integer_sqrt_within_bound() {
        assert_eq!(integer_sqrt(16, 16), Some(4));
        assert_eq!(integer_sqrt(0, 3), Some(0));
        assert_eq!(integer_sqrt(32, 32), None);
        // Root exists but lies beyond the bound.
        assert_eq!(integer_sqrt(49, 5), None);
        assert_eq!(require_integer_sqrt(32, 32), Err(ChronoError::NoIntegerSquareRoot { target: 32 }));
    }
}
