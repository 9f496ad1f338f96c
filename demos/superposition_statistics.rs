//! Measures `H|0>` over growing sample sizes and prints the outcome counts.

use chronochat::{ChronoError, MeasurementCounts, QuantumContext};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn run_experiment(n: usize, rng: &mut StdRng) -> Result<MeasurementCounts, ChronoError> {
    let mut counts = MeasurementCounts::new(2);
    for _ in 0..n {
        // A fresh qubit per trial; a measured qubit cannot be reused.
        let mut ctx = QuantumContext::new();
        let q = ctx.zero()?;
        ctx.h(&[q])?;
        counts.record(ctx.measure(&[q], rng)?[0].value() as usize);
    }
    Ok(counts)
}

fn main() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(1);
    for n in [1, 10, 100, 1_000, 10_000, 100_000] {
        print!("{}", run_experiment(n, &mut rng)?);
    }
    Ok(())
}
