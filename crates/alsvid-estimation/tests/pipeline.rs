//! Preprocess, run on a deterministic basis state, postprocess.

use alsvid_estimation::{GreedyColoring, SingletonGrouping, postprocess, preprocess};
use alsvid_ir::Counts;

/// Program preparing the computational basis state with `x` on `ones`.
fn basis_state(num_qubits: u32, ones: &[u32]) -> String {
    let mut src = format!("OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[{num_qubits}] q;\n");
    for q in ones {
        src.push_str(&format!("x q[{q}];\n"));
    }
    src
}

/// Counts of a measurement circuit run on a basis state: every shot reads
/// the prepared bit of each measured qubit.
fn run(program: &str, ones: &[u32], shots: u64) -> Counts {
    let circuit = alsvid_qasm3::parse(program).unwrap();
    let bits: String = circuit
        .measured_qubits()
        .iter()
        .rev()
        .map(|q| if ones.contains(&q.0) { '1' } else { '0' })
        .collect();
    [(bits, shots)].into_iter().collect()
}

#[test]
fn test_z_observable_on_basis_state() {
    let ones = [0, 2];
    let program = basis_state(3, &ones);
    // <Z0> = -1, <Z1> = 1, <Z0 Z2> = 1, <Z1 Z2> = -1.
    let operator = "[('Z0', 0.5), ('Z1', 2.0), ('Z0 Z2', -1.5), ('Z1Z2', 0.25)]";

    let out = preprocess(&program, operator, &[], &[], &GreedyColoring).unwrap();
    assert_eq!(out.grouped_programs.len(), 1);

    let counts: Vec<Counts> = out
        .grouped_programs
        .iter()
        .map(|p| run(p, &ones, 128))
        .collect();
    let est = postprocess(&counts, &out.grouped_operators).unwrap();
    assert!((est.expval - (-0.5 + 2.0 - 1.5 - 0.25)).abs() < 1e-12);
    assert!(est.stds.abs() < 1e-12);
}

#[test]
fn test_layout_moves_terms_onto_physical_qubits() {
    // Observable qubit 0 sits on circuit qubit 1, which is flipped.
    let program = basis_state(2, &[1]);
    let out = preprocess(&program, "[('Z0', 1.0)]", &[], &[1, 0], &SingletonGrouping).unwrap();
    let counts = vec![run(&out.grouped_programs[0], &[1], 10)];
    let est = postprocess(&counts, &out.grouped_operators).unwrap();
    assert!((est.expval + 1.0).abs() < 1e-12);
}

#[test]
fn test_singleton_and_greedy_agree() {
    let ones = [1];
    let program = basis_state(2, &ones);
    let operator = r#"[["Z0", 1.0], ["Z1", 1.0], ["Z0 Z1", 3.0], ["I", 0.5]]"#;

    let estimate = |grouped: (Vec<String>, String)| {
        let counts: Vec<Counts> = grouped.0.iter().map(|p| run(p, &ones, 64)).collect();
        postprocess(&counts, &grouped.1).unwrap().expval
    };
    let greedy = preprocess(&program, operator, &[], &[], &GreedyColoring).unwrap();
    let singleton = preprocess(&program, operator, &[], &[], &SingletonGrouping).unwrap();
    assert_eq!(singleton.grouped_programs.len(), 4);

    let a = estimate((greedy.grouped_programs, greedy.grouped_operators));
    let b = estimate((singleton.grouped_programs, singleton.grouped_operators));
    assert!((a - b).abs() < 1e-12);
    assert!((a - (1.0 - 1.0 - 3.0 + 0.5)).abs() < 1e-12);
}

#[test]
fn test_programs_target_the_basis() {
    let program = basis_state(2, &[]);
    let basis: Vec<String> = ["sx", "rz", "cx"].iter().map(|s| (*s).to_string()).collect();
    let out = preprocess(&program, "[('X0 Y1', 1.0)]", &basis, &[], &GreedyColoring).unwrap();

    let circuit = alsvid_qasm3::parse(&out.grouped_programs[0]).unwrap();
    for instruction in circuit.instructions() {
        assert!(
            ["sx", "rz", "measure"].contains(&instruction.name()),
            "unexpected {}",
            instruction.name()
        );
    }
}
