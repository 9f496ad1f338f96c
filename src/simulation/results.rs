// src/simulation/results.rs
use crate::core::{Outcome, QubitId};
use std::collections::HashMap;
use std::fmt;

/// Holds the results of running a circuit.
/// Contains the `Outcome` of every qubit measured while the circuit ran.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    outcomes: HashMap<QubitId, Outcome>,
}

impl SimulationResult {
    /// Creates a new, empty result set. (Internal visibility)
    pub(crate) fn new() -> Self {
        Self { outcomes: HashMap::new() }
    }

    /// Records a measurement outcome for a qubit. (Internal visibility)
    pub(crate) fn record_outcome(&mut self, qubit: QubitId, outcome: Outcome) {
        self.outcomes.insert(qubit, outcome);
    }

    /// Gets the outcome for a specific qubit, if it was measured by the circuit.
    pub fn get_outcome(&self, qubit: &QubitId) -> Option<&Outcome> {
        self.outcomes.get(qubit)
    }

    /// Reads the outcomes of `qubits` as a basis index, first qubit most
    /// significant. `None` when any of them was not measured.
    pub fn index_of(&self, qubits: &[QubitId]) -> Option<usize> {
        qubits.iter().try_fold(0usize, |acc, q| {
            self.outcomes.get(q).map(|o| (acc << 1) | o.value() as usize)
        })
    }

    /// Returns a reference to the map containing all recorded outcomes.
    pub fn all_outcomes(&self) -> &HashMap<QubitId, Outcome> {
        &self.outcomes
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.outcomes.is_empty() {
            writeln!(f, "  No qubits were measured.")?;
        } else {
            let mut sorted_outcomes: Vec<_> = self.outcomes.iter().collect();
            sorted_outcomes.sort_by_key(|(id, _)| *id);
            writeln!(f, "  Outcomes:")?;
            for (id, outcome) in sorted_outcomes {
                writeln!(f, "    {}: {}", id, outcome)?;
            }
        }
        Ok(())
    }
}

/// Histogram of basis-state outcomes collected over repeated shots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementCounts {
    counts: Vec<usize>,
    shots: usize,
}

impl MeasurementCounts {
    /// Empty histogram over `dim` outcomes.
    pub fn new(dim: usize) -> Self {
        Self { counts: vec![0; dim], shots: 0 }
    }

    /// Records one shot. Outcomes outside the histogram are ignored.
    pub fn record(&mut self, outcome: usize) {
        if let Some(count) = self.counts.get_mut(outcome) {
            *count += 1;
            self.shots += 1;
        }
    }

    /// Count per outcome.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total recorded shots.
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Relative frequency per outcome; all zeros before any shot.
    pub fn frequencies(&self) -> Vec<f64> {
        if self.shots == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts.iter().map(|c| *c as f64 / self.shots as f64).collect()
    }

    /// The outcome observed most often (lowest index on ties).
    pub fn most_frequent(&self) -> Option<usize> {
        self.counts
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
            .filter(|_| self.shots > 0)
            .map(|(i, _)| i)
    }
}

impl fmt::Display for MeasurementCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results for n={}:", self.shots)?;
        let width = self.counts.len().max(2).next_power_of_two().trailing_zeros() as usize;
        for (outcome, freq) in self.frequencies().iter().enumerate() {
            writeln!(f, "{:0width$b}: {} times ({:.2}%)", outcome, self.counts[outcome], freq * 100.0, width = width)?;
        }
        Ok(())
    }
}
