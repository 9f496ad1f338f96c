// tests/simulation_tests.rs

use chronochat::{
    ChronoError, CircuitBuilder, Gate, Matrix, MeasurementCounts, Operation, Outcome, QuantumContext, QubitId,
};
use num_complex::Complex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f64::consts::PI;

// Helper function to check the measured outcome of a qubit in the result
fn check_outcome(result: &chronochat::SimulationResult, qubit: QubitId, expected: u8) {
    match result.get_outcome(&qubit) {
        Some(Outcome::Collapsed(bit)) => assert_eq!(*bit, expected, "Mismatch for qubit {}", qubit),
        None => panic!("Qubit {} was not measured", qubit),
    }
}

#[test]
fn test_empty_circuit() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut ctx = QuantumContext::new();
    let result = ctx.run(&CircuitBuilder::new().build(), &mut rng)?;
    assert!(result.all_outcomes().is_empty(), "Empty circuit should yield empty results");
    Ok(())
}

#[test]
fn test_zero_state_measurement() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut ctx = QuantumContext::new();
    let reg = ctx.zero_with(2)?;
    let circuit = CircuitBuilder::new().measure(reg.qubits()).build();

    let result = ctx.run(&circuit, &mut rng)?;
    assert_eq!(result.all_outcomes().len(), 2);
    check_outcome(&result, reg.qubits()[0], 0);
    check_outcome(&result, reg.qubits()[1], 0);
    Ok(())
}

#[test]
fn test_phase_does_not_change_statistics() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut ctx = QuantumContext::new();
    let q = ctx.zero()?;
    let circuit = CircuitBuilder::new()
        .add_op(Operation::Gate { gate: Gate::Phase(PI / 2.0), targets: vec![q] })
        .measure(&[q])
        .build();

    let result = ctx.run(&circuit, &mut rng)?;
    check_outcome(&result, q, 0);
    Ok(())
}

#[test]
fn test_hadamard_twice_is_identity() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(5);
    let mut ctx = QuantumContext::new();
    let q = ctx.zero()?;
    let circuit = CircuitBuilder::new().x(&[q]).h(&[q]).h(&[q]).measure(&[q]).build();

    let result = ctx.run(&circuit, &mut rng)?;
    check_outcome(&result, q, 1);
    Ok(())
}

#[test]
fn test_hadamard_statistics_are_balanced() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut counts = MeasurementCounts::new(2);
    for _ in 0..10_000 {
        let mut ctx = QuantumContext::new();
        let q = ctx.zero()?;
        ctx.h(&[q])?;
        counts.record(ctx.measure(&[q], &mut rng)?[0].value() as usize);
    }
    let freq = counts.frequencies();
    assert_eq!(counts.shots(), 10_000);
    assert!((freq[0] - 0.5).abs() < 0.05, "H|0> frequency of 0 was {}", freq[0]);
    Ok(())
}

#[test]
fn test_bell_pair_measures_equal_bits() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(2)?;
        let (q1, q2) = (reg.qubits()[0], reg.qubits()[1]);
        let circuit = CircuitBuilder::new().h(&[q1]).cnot(q1, q2).measure(&[q1, q2]).build();

        let result = ctx.run(&circuit, &mut rng)?;
        assert_eq!(result.get_outcome(&q1), result.get_outcome(&q2));
    }
    Ok(())
}

#[test]
fn test_measuring_one_half_of_a_bell_pair_collapses_the_other() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(11);
    let mut ctx = QuantumContext::new();
    let reg = ctx.zero_with(2)?;
    let (q1, q2) = (reg.qubits()[0], reg.qubits()[1]);
    ctx.h(&[q1])?;
    ctx.cnot(q1, q2)?;

    let bit = ctx.measure(&[q1], &mut rng)?[0].value() as usize;
    let probs = ctx.probabilities(&[q2])?;
    assert!((probs[bit] - 1.0).abs() < 1e-9);
    // q2 is still live and can be transformed.
    ctx.x(&[q2])?;
    Ok(())
}

#[test]
fn test_same_seed_same_outcomes() -> Result<(), ChronoError> {
    let run = |seed: u64| -> Result<Vec<Outcome>, ChronoError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctx = QuantumContext::new();
        let reg = ctx.zero_with(6)?;
        ctx.h(reg.qubits())?;
        ctx.measure(reg.qubits(), &mut rng)
    };
    assert_eq!(run(17)?, run(17)?);
    Ok(())
}

#[test]
fn test_unitary_on_qubit_subset() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(8);
    let mut ctx = QuantumContext::new();
    let spectator = ctx.zero()?;
    let reg = ctx.zero_with(2)?;

    // Prepare |11> on the register only.
    let to_three = Matrix::state_preparation(&[0.0, 0.0, 0.0, 1.0])?;
    let circuit = CircuitBuilder::new()
        .unitary(to_three, reg.qubits())
        .measure(&[spectator])
        .measure(reg.qubits())
        .build();

    let result = ctx.run(&circuit, &mut rng)?;
    check_outcome(&result, spectator, 0);
    assert_eq!(result.index_of(reg.qubits()), Some(0b11));
    Ok(())
}

#[test]
fn test_circuit_gate_on_measured_qubit_fails() -> Result<(), ChronoError> {
    let mut rng = StdRng::seed_from_u64(8);
    let mut ctx = QuantumContext::new();
    let q = ctx.zero()?;
    let circuit = CircuitBuilder::new().measure(&[q]).h(&[q]).build();

    assert_eq!(ctx.run(&circuit, &mut rng), Err(ChronoError::QubitCollapsed { qubit: q }));
    Ok(())
}

#[test]
fn test_custom_unitary_from_rows() -> Result<(), ChronoError> {
    let mut ctx = QuantumContext::new();
    let q = ctx.zero()?;
    let i = Complex::i();
    let y = Matrix::from_rows(vec![vec![Complex::new(0.0, 0.0), -i], vec![i, Complex::new(0.0, 0.0)]])?;
    ctx.apply(&y, &[q])?;

    let amps = ctx.amplitudes(&[q])?;
    assert!(amps[0].norm() < 1e-12);
    assert!((amps[1] - Complex::new(1.0, 0.0)).norm() < 1e-12);
    Ok(())
}

#[test]
fn test_hadamard_on_last_qubit_of_register() -> Result<(), ChronoError> {
    let mut ctx = QuantumContext::new();
    let reg = ctx.zero_with(4)?;
    let last = reg.qubits()[3];
    ctx.h(&[last])?;

    assert!((ctx.state().norm_sqr() - 1.0).abs() < 1e-12);
    for q in &reg.qubits()[..3] {
        assert!((ctx.probabilities(&[*q])?[0] - 1.0).abs() < 1e-12, "qubit {} moved", q);
    }
    let probs = ctx.probabilities(&[last])?;
    assert!((probs[0] - 0.5).abs() < 1e-12 && (probs[1] - 0.5).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_controlled_phase_entangles_without_changing_marginals() -> Result<(), ChronoError> {
    let mut ctx = QuantumContext::new();
    let reg = ctx.zero_with(2)?;
    let (q1, q2) = (reg.qubits()[0], reg.qubits()[1]);
    ctx.h(reg.qubits())?;
    assert_eq!(ctx.amplitudes(&[q1])?.len(), 2);

    ctx.controlled(q1, q2, Gate::PauliZ)?;
    assert!((ctx.probabilities(&[q1])?[0] - 0.5).abs() < 1e-12);
    assert!(matches!(ctx.amplitudes(&[q1]), Err(ChronoError::Incoherence { .. })));
    assert!(matches!(ctx.amplitudes(&[q2]), Err(ChronoError::Incoherence { .. })));
    Ok(())
}
