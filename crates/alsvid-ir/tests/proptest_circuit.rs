//! Property-based tests for circuit bookkeeping.

use alsvid_ir::{Circuit, ClbitId, QubitId, StandardGate};
use proptest::prelude::*;

fn gate_strategy(num_qubits: u32) -> impl Strategy<Value = (StandardGate, Vec<u32>)> {
    prop_oneof![
        (0..num_qubits).prop_map(|q| (StandardGate::H, vec![q])),
        (0..num_qubits, -3.0f64..3.0).prop_map(|(q, t)| (StandardGate::Rz(t), vec![q])),
        (0..num_qubits, 1..num_qubits).prop_map(move |(a, d)| {
            (StandardGate::CX, vec![a, (a + d) % num_qubits])
        }),
    ]
}

proptest! {
    /// Gates followed by a full measurement always reduce to the bare gate list.
    #[test]
    fn final_measurements_are_fully_removed(
        gates in prop::collection::vec(gate_strategy(4), 0..20)
    ) {
        let mut circuit = Circuit::with_size("prop", 4, 4);
        for (gate, qubits) in &gates {
            circuit.gate(*gate, qubits.iter().map(|&q| QubitId(q))).unwrap();
        }
        circuit.measure_all().unwrap();
        prop_assert_eq!(circuit.measured_qubits().len(), 4);

        let removed = circuit.remove_final_measurements();
        prop_assert_eq!(removed, 4);
        prop_assert_eq!(circuit.len(), gates.len());
        prop_assert_eq!(circuit.num_clbits(), 0);
        prop_assert!(circuit.instructions().iter().all(|i| !i.is_measure()));
    }

    /// Composing at an offset preserves the instruction count and shifts operands.
    #[test]
    fn compose_shifts_operands(
        gates in prop::collection::vec(gate_strategy(3), 1..10),
        offset in 0u32..5,
    ) {
        let mut part = Circuit::with_size("part", 3, 1);
        for (gate, qubits) in &gates {
            part.gate(*gate, qubits.iter().map(|&q| QubitId(q))).unwrap();
        }
        part.measure(QubitId(0), ClbitId(0)).unwrap();

        let mut whole = Circuit::with_size("whole", 3 + offset, 1 + offset);
        whole.compose(&part, offset, offset).unwrap();
        prop_assert_eq!(whole.len(), part.len());
        prop_assert_eq!(whole.measured_qubits(), vec![QubitId(offset)]);
    }
}
