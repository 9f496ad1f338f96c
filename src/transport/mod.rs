// src/transport/mod.rs

//! The time tunnel: a row of independent single-qubit superpositions.
//!
//! Each candidate qubit models one attempt at choosing a direction in time,
//! `C_past|0> + C_future|1>`. The candidates are never entangled, so opening
//! the tunnel is a sequence of fair coin flips; it succeeds when at least one
//! attempt collapses towards the past.

use crate::core::{ChronoError, Outcome, Register, Result};
use crate::simulation::QuantumContext;
use rand::Rng;
use std::fmt;

/// Direction a candidate collapsed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Outcome `|0>`.
    Past,
    /// Outcome `|1>`.
    Future,
}

impl From<Outcome> for Direction {
    fn from(outcome: Outcome) -> Self {
        if outcome.value() == 0 { Direction::Past } else { Direction::Future }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Past => write!(f, "past"),
            Direction::Future => write!(f, "future"),
        }
    }
}

/// A set of direction candidates living in a `QuantumContext`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTunnel {
    candidates: Register,
    directions: Vec<Direction>,
    is_measured: bool,
    is_successful: bool,
}

impl TimeTunnel {
    /// Allocates `attempts` qubits in `ctx` and puts each one into an equal
    /// superposition of past and future.
    pub fn create(ctx: &mut QuantumContext, attempts: usize) -> Result<Self> {
        if attempts == 0 {
            return Err(ChronoError::InvalidOperation { message: "A time tunnel needs at least one attempt".to_string() });
        }
        let candidates = ctx.zero_with(attempts)?;
        ctx.h(candidates.qubits())?;
        tracing::debug!(attempts, "time tunnel created");
        Ok(Self {
            candidates,
            directions: Vec::new(),
            is_measured: false,
            is_successful: false,
        })
    }

    /// Measures every candidate once and returns the first attempt that
    /// collapsed to the past, if any. The measured candidates are released
    /// from `ctx`.
    ///
    /// # Errors
    /// * `InvalidOperation` if the tunnel was already opened.
    pub fn open<R: Rng + ?Sized>(&mut self, ctx: &mut QuantumContext, rng: &mut R) -> Result<Option<usize>> {
        if self.is_measured {
            return Err(ChronoError::InvalidOperation { message: "The time tunnel was already opened".to_string() });
        }
        let outcomes = ctx.measure(self.candidates.qubits(), rng)?;
        ctx.release(self.candidates.qubits())?;
        self.directions = outcomes.into_iter().map(Direction::from).collect();
        self.is_measured = true;

        let first_past = self.directions.iter().position(|d| *d == Direction::Past);
        self.is_successful = first_past.is_some();
        tracing::debug!(successful = self.is_successful, attempt = ?first_past, "time tunnel opened");
        Ok(first_past)
    }

    /// The direction qubits, one per attempt. Released once the tunnel is opened.
    pub fn candidates(&self) -> &Register {
        &self.candidates
    }

    /// Collapsed directions, empty until the tunnel is opened.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// `true` once `open` has run.
    pub fn is_measured(&self) -> bool {
        self.is_measured
    }

    /// `true` if some attempt collapsed to the past.
    pub fn is_successful(&self) -> bool {
        self.is_successful
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn candidates_start_in_equal_superposition() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let tunnel = TimeTunnel::create(&mut ctx, 3)?;
        for q in tunnel.candidates().qubits() {
            let probs = ctx.probabilities(&[*q])?;
            assert!((probs[0] - 0.5).abs() < 1e-9);
        }
        assert!(!tunnel.is_measured());
        assert!(tunnel.directions().is_empty());
        Ok(())
    }

    #[test]
    fn opening_twice_is_rejected() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = QuantumContext::new();
        let mut tunnel = TimeTunnel::create(&mut ctx, 4)?;

        let first_past = tunnel.open(&mut ctx, &mut rng)?;
        assert!(tunnel.is_measured());
        assert_eq!(tunnel.directions().len(), 4);
        assert_eq!(ctx.state().dim(), 1);
        assert!(tunnel.candidates().qubits().iter().all(|q| ctx.is_released(*q)));
        assert_eq!(tunnel.is_successful(), first_past.is_some());
        if let Some(i) = first_past {
            assert_eq!(tunnel.directions()[i], Direction::Past);
            assert!(tunnel.directions()[..i].iter().all(|d| *d == Direction::Future));
        }
        assert!(matches!(tunnel.open(&mut ctx, &mut rng), Err(ChronoError::InvalidOperation { .. })));
        Ok(())
    }

    #[test]
    fn ten_candidates_are_each_fair() -> Result<()> {
        let mut ctx = QuantumContext::new();
        let tunnel = TimeTunnel::create(&mut ctx, 10)?;
        assert!((ctx.state().norm_sqr() - 1.0).abs() < 1e-9);
        for q in tunnel.candidates().qubits() {
            let probs = ctx.probabilities(&[*q])?;
            assert!((probs[0] - 0.5).abs() < 1e-9, "candidate {} has P(past) = {}", q, probs[0]);
        }
        Ok(())
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut ctx = QuantumContext::new();
        assert!(TimeTunnel::create(&mut ctx, 0).is_err());
        assert_eq!(ctx.num_qubits(), 0);
    }
}
