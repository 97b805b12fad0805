//! Combining circuits and dividing their counts are inverse bookkeeping.

use alsvid_combine::{CombineStatus, combine_circuits, divide_result};
use alsvid_ir::Counts;
use proptest::prelude::*;

fn prepare(bits: &str) -> String {
    let n = bits.len();
    let mut src = format!("OPENQASM 3.0;\nqubit[{n}] q;\nbit[{n}] c;\n");
    // Bitstrings are most-significant first: character i is qubit n-1-i.
    for (i, b) in bits.chars().enumerate() {
        if b == '1' {
            src.push_str(&format!("x q[{}];\n", n - 1 - i));
        }
    }
    src.push_str("c = measure q;\n");
    src
}

proptest! {
    /// A deterministic combined outcome splits back into each circuit's own outcome.
    #[test]
    fn divide_recovers_each_sub_circuit(
        outcomes in prop::collection::vec("[01]{1,4}", 1..5),
        shots in 1u64..1000,
    ) {
        let programs: Vec<String> = outcomes.iter().map(|o| prepare(o)).collect();
        let outcome = combine_circuits(&programs, 64);
        prop_assert_eq!(outcome.status, CombineStatus::Success);

        // Later circuits occupy higher classical bits, so they come first.
        let combined_bits: String = outcomes.iter().rev().map(String::as_str).collect();
        let counts: Counts = [(combined_bits, shots)].into_iter().collect();

        let divided = divide_result(&counts, &outcome.qubit_counts).unwrap();
        prop_assert_eq!(divided.len(), outcomes.len());
        for (part, expected) in divided.iter().zip(&outcomes) {
            prop_assert_eq!(part.get(expected), Some(shots));
            prop_assert_eq!(part.shots(), shots);
        }
    }
}
