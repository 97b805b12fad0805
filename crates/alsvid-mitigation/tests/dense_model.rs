//! Mitigation checked against an explicitly built Kronecker assignment matrix.

use alsvid_ir::Counts;
use alsvid_mitigation::model::assignment_matrix;
use alsvid_mitigation::{
    AssignmentModel, DeviceTopology, MeasurementError, QubitProperties, mitigate,
};
use ndarray::{Array1, Array2, linalg::kron};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const NUM_MEASURED: usize = 10;
const DEVICE_QUBITS: u32 = 16;

fn random_topology(rng: &mut StdRng) -> DeviceTopology {
    DeviceTopology {
        name: "random".into(),
        qubits: (0..DEVICE_QUBITS)
            .map(|id| QubitProperties {
                id,
                t1: None,
                t2: None,
                gate_error: None,
                mes_error: MeasurementError {
                    p0m1: rng.gen_range(0.0..0.01),
                    p1m0: rng.gen_range(0.0..0.01),
                },
            })
            .collect(),
    }
}

/// `A_{n-1} ⊗ … ⊗ A_0` for the qubits read into clbits `0..n`.
fn dense_model(topology: &DeviceTopology, measured: &[u32]) -> Array2<f64> {
    measured.iter().rev().fold(Array2::eye(1), |acc, &id| {
        let e = topology.qubit(id).unwrap().mes_error;
        kron(&acc, &assignment_matrix(e.p0m1, e.p1m0))
    })
}

fn measuring_program(measured: &[u32]) -> String {
    let mut src = format!(
        "OPENQASM 3.0;\nqubit[{DEVICE_QUBITS}] q;\nbit[{}] c;\n",
        measured.len()
    );
    for (clbit, qubit) in measured.iter().enumerate() {
        src.push_str(&format!("c[{clbit}] = measure q[{qubit}];\n"));
    }
    src
}

#[test]
fn test_random_ten_qubit_mitigation_recovers_true_counts() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let topology = random_topology(&mut rng);
    let mut qubits: Vec<u32> = (0..DEVICE_QUBITS).collect();
    qubits.shuffle(&mut rng);
    let measured = &qubits[..NUM_MEASURED];

    // True counts kept well away from zero so projection is a no-op.
    let size = 1usize << NUM_MEASURED;
    let true_counts: Array1<f64> = (0..size).map(|_| rng.gen_range(1000..5000) as f64).collect();

    // Readout as seen through the dense model, rounded to integer counts.
    let observed = dense_model(&topology, measured).dot(&true_counts);
    let counts: Counts = observed
        .iter()
        .enumerate()
        .map(|(i, &c)| (format!("{i:0NUM_MEASURED$b}"), c.round() as u64))
        .collect();

    let corrected = mitigate(&topology, &counts, &measuring_program(measured)).unwrap();
    for (i, &expected) in true_counts.iter().enumerate() {
        let key = format!("{i:0NUM_MEASURED$b}");
        let got = corrected.get(&key).unwrap_or(0) as f64;
        assert!(
            (got - expected).abs() <= 1.0,
            "{key}: expected {expected}, got {got}"
        );
    }
}

#[test]
fn test_per_qubit_contraction_matches_dense_matrix() {
    let mut rng = StdRng::seed_from_u64(7);
    let topology = random_topology(&mut rng);
    let measured = [3, 11, 0, 7];
    let model = AssignmentModel::from_topology(&topology, &measured).unwrap();

    let input: Array1<f64> = (0..16).map(|_| rng.gen_range(0.0..1.0)).collect();
    let expected = dense_model(&topology, &measured).dot(&input);
    let mut got = input.clone();
    model.apply(&mut got);

    for (a, b) in got.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}
