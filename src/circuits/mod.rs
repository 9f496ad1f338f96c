// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`chronochat::operations::Operation`).
//!
//! A `Circuit` names qubits by `QubitId`, so it is executed against the
//! `QuantumContext` that allocated those qubits.

use crate::core::{Matrix, QubitId};
use crate::operations::{Gate, Operation};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Represents an ordered sequence of Operations applied to a set of qubits.
///
/// Analogy: Similar to `cirq.Circuit` or `qiskit.QuantumCircuit`, representing the
/// sequence of gates and measurements applied to qubits.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// The unique set of qubits involved across all operations in this circuit.
    qubits: HashSet<QubitId>,

    /// The ordered sequence of operations defining the circuit's logic.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self {
            qubits: HashSet::new(),
            operations: Vec::new(),
        }
    }

    /// Adds a single operation to the end of the circuit's sequence.
    ///
    /// The qubits involved in `op` are added to the circuit's set of known qubits.
    pub fn add_operation(&mut self, op: Operation) {
        for qubit in op.involved_qubits() {
            self.qubits.insert(qubit);
        }
        self.operations.push(op);
    }

    /// Adds multiple operations from an iterator to the end of the circuit's sequence.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// Returns a reference to the set of unique qubits involved in this circuit.
    pub fn qubits(&self) -> &HashSet<QubitId> {
        &self.qubits
    }

    /// Returns a slice containing the ordered sequence of operations in this circuit.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the total number of operations defined in the circuit.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty CircuitBuilder.
    pub fn new() -> Self {
        Self { circuit: Circuit::new() }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Adds multiple operations from an iterator to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Applies H to every target.
    pub fn h(self, targets: &[QubitId]) -> Self {
        self.add_op(Operation::Gate { gate: Gate::Hadamard, targets: targets.to_vec() })
    }

    /// Applies X to every target.
    pub fn x(self, targets: &[QubitId]) -> Self {
        self.add_op(Operation::Gate { gate: Gate::PauliX, targets: targets.to_vec() })
    }

    /// Controlled-X.
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.add_op(Operation::Controlled { control, target, gate: Gate::PauliX })
    }

    /// Applies an arbitrary unitary to the ordered targets.
    pub fn unitary(self, matrix: Matrix, targets: &[QubitId]) -> Self {
        self.add_op(Operation::Unitary { matrix, targets: targets.to_vec() })
    }

    /// Measures the targets.
    pub fn measure(self, targets: &[QubitId]) -> Self {
        self.add_op(Operation::Measure { targets: targets.to_vec() })
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "chronochat::Circuit[0 operations on 0 qubits]");
        }

        let ops = &self.operations;
        let num_ops = ops.len();

        let mut sorted_qubits: Vec<QubitId> = self.qubits.iter().cloned().collect();
        sorted_qubits.sort();
        let num_qubits = sorted_qubits.len();
        let qubit_to_row: HashMap<QubitId, usize> = sorted_qubits.iter().enumerate().map(|(i, q)| (*q, i)).collect();

        let max_label_width = sorted_qubits.iter().map(|q| q.to_string().len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate or wire segment
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        // v_connect[row][time] holds the connector drawn below this row
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre_dashes), symbol, H_WIRE.to_string().repeat(post_dashes))
            }
        }

        fn connect(v_connect: &mut [Vec<char>], rows: &[usize], t: usize) {
            if let (Some(r_min), Some(r_max)) = (rows.iter().min(), rows.iter().max()) {
                for row_vec in v_connect.iter_mut().take(*r_max).skip(*r_min) {
                    row_vec[t] = V_WIRE;
                }
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Gate { gate, targets } => {
                    if *gate == Gate::Identity {
                        continue;
                    }
                    for r in targets.iter().filter_map(|q| qubit_to_row.get(q)) {
                        op_grid[*r][t] = format_gate(gate.symbol());
                    }
                }
                Operation::Controlled { control, target, gate } => {
                    if let (Some(r_ctrl), Some(r_tgt)) = (qubit_to_row.get(control), qubit_to_row.get(target)) {
                        op_grid[*r_ctrl][t] = format_gate("@");
                        op_grid[*r_tgt][t] = format_gate(gate.symbol());
                        connect(&mut v_connect, &[*r_ctrl, *r_tgt], t);
                    }
                }
                Operation::Unitary { targets, .. } => {
                    let rows: Vec<usize> = targets.iter().filter_map(|q| qubit_to_row.get(q).copied()).collect();
                    for (i, r) in rows.iter().enumerate() {
                        op_grid[*r][t] = format_gate(&format!("U{}", i));
                    }
                    connect(&mut v_connect, &rows, t);
                }
                Operation::Measure { targets } => {
                    for r in targets.iter().filter_map(|q| qubit_to_row.get(q)) {
                        op_grid[*r][t] = format_gate("M");
                    }
                }
            }
        }

        writeln!(f, "chronochat::Circuit[{} operations on {} qubits]", num_ops, num_qubits)?;
        for r in 0..num_qubits {
            let label = format!("{}: ", sorted_qubits[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
