//! Correcting counts for readout error.

use alsvid_ir::{Circuit, Counts};
use ndarray::Array1;
use tracing::debug;

use crate::error::{MitigationError, MitigationResult};
use crate::model::AssignmentModel;
use crate::simplex::nearest_probability;
use crate::topology::DeviceTopology;

/// Largest number of measured qubits a dense distribution is built for.
pub const MAX_MEASURED_QUBITS: usize = 32;

/// Guards float noise when turning probabilities back into integer counts.
const COUNT_EPS: f64 = 1e-9;

/// Physical qubit read into each classical bit, ordered by classical bit.
pub fn measured_qubits(circuit: &Circuit) -> Vec<u32> {
    circuit.measured_qubits().into_iter().map(|q| q.0).collect()
}

/// Inverts an [`AssignmentModel`] on measured counts.
#[derive(Debug, Clone)]
pub struct ReadoutMitigator {
    model: AssignmentModel,
}

impl ReadoutMitigator {
    pub fn new(model: AssignmentModel) -> Self {
        Self { model }
    }

    /// Model for the qubits `circuit` measures.
    ///
    /// The size bound is checked before the topology is consulted.
    pub fn for_circuit(topology: &DeviceTopology, circuit: &Circuit) -> MitigationResult<Self> {
        let measured = measured_qubits(circuit);
        if measured.len() > MAX_MEASURED_QUBITS {
            return Err(MitigationError::SizeLimit {
                num_qubits: measured.len(),
                limit: MAX_MEASURED_QUBITS,
            });
        }
        if measured.is_empty() {
            return Err(MitigationError::NoMeasurements);
        }
        Ok(Self::new(AssignmentModel::from_topology(topology, &measured)?))
    }

    pub fn model(&self) -> &AssignmentModel {
        &self.model
    }

    /// Inverse model applied to the normalized counts. May be negative.
    pub fn quasi_probabilities(&self, counts: &Counts) -> MitigationResult<Array1<f64>> {
        let (mut distribution, _) = dense_distribution(counts, self.model.num_qubits())?;
        self.model.apply_inverse(&mut distribution);
        Ok(distribution)
    }

    /// Corrected counts with the same number of shots (up to truncation).
    ///
    /// Each count is `floor(p * shots)` of the nearest probability
    /// distribution; zero counts are omitted and keys are zero-padded to
    /// the number of measured qubits.
    pub fn mitigate_counts(&self, counts: &Counts) -> MitigationResult<Counts> {
        let num_qubits = self.model.num_qubits();
        let (mut distribution, shots) = dense_distribution(counts, num_qubits)?;
        self.model.apply_inverse(&mut distribution);
        let negative_mass: f64 = distribution.iter().filter(|&&p| p < 0.0).sum();
        let probabilities = nearest_probability(&distribution);
        debug!(
            num_qubits,
            shots,
            negative_mass,
            "Projected quasi-distribution onto the simplex"
        );

        let mut corrected = Counts::new();
        for (index, &p) in probabilities.iter().enumerate() {
            let count = (p * shots as f64 + COUNT_EPS).floor();
            if count >= 1.0 {
                corrected.add(format!("{index:0num_qubits$b}"), count as u64);
            }
        }
        Ok(corrected)
    }
}

/// Correct `counts` measured by `program` on a device described by `topology`.
pub fn mitigate(
    topology: &DeviceTopology,
    counts: &Counts,
    program: &str,
) -> MitigationResult<Counts> {
    let circuit = alsvid_qasm3::parse(program)?;
    let mitigator = ReadoutMitigator::for_circuit(topology, &circuit)?;
    debug!(measured_qubits = ?mitigator.model().qubits(), "Built readout model");
    mitigator.mitigate_counts(counts)
}

/// Normalized `2^n` distribution of `counts` and the total shots.
///
/// Whitespace in keys is ignored; keys that collapse to the same bits are
/// merged.
fn dense_distribution(
    counts: &Counts,
    num_qubits: usize,
) -> MitigationResult<(Array1<f64>, u64)> {
    let shots = counts
        .try_shots()
        .ok_or_else(|| MitigationError::InvalidCounts("total shots overflow u64".into()))?;
    if shots == 0 {
        return Err(MitigationError::InvalidCounts("no shots".into()));
    }

    let mut distribution = Array1::zeros(1usize << num_qubits);
    for (key, &count) in counts {
        let bits: String = key.chars().filter(|c| !c.is_whitespace()).collect();
        if bits.len() != num_qubits {
            return Err(MitigationError::InvalidCounts(format!(
                "'{key}' has {} bits for {num_qubits} measured qubits",
                bits.len()
            )));
        }
        let index = usize::from_str_radix(&bits, 2)
            .ok()
            .filter(|_| bits.bytes().all(|b| b == b'0' || b == b'1'))
            .ok_or_else(|| {
                MitigationError::InvalidCounts(format!("'{key}' is not a bitstring"))
            })?;
        distribution[index] += count as f64 / shots as f64;
    }
    Ok((distribution, shots))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUBITS: &str = "OPENQASM 3.0;\nqubit[4] q;\nbit[2] c;\nh q[0];\ncx q[0], q[1];\nc[0] = measure q[0];\nc[1] = measure q[1];\n";

    #[test]
    fn test_golden_vector() {
        let topology = DeviceTopology::uniform("sc", 4, 0.05, 0.05);
        let counts: Counts = [("00", 425), ("01", 75), ("10", 85), ("11", 415)]
            .into_iter()
            .collect();

        let corrected = mitigate(&topology, &counts, TWO_QUBITS).unwrap();
        let expected: Counts = [("00", 465), ("01", 34), ("10", 45), ("11", 454)]
            .into_iter()
            .collect();
        assert_eq!(corrected, expected);
    }

    #[test]
    fn test_identity_model_reproduces_counts() {
        let topology = DeviceTopology::uniform("sc", 4, 0.0, 0.0);
        let counts: Counts = [("00", 3), ("01", 250), ("11", 747)].into_iter().collect();
        assert_eq!(mitigate(&topology, &counts, TWO_QUBITS).unwrap(), counts);
    }

    #[test]
    fn test_size_limit_precedes_topology_lookup() {
        let n = MAX_MEASURED_QUBITS + 1;
        let program = format!("OPENQASM 3.0;\nqubit[{n}] q;\nbit[{n}] c;\nc = measure q;\n");
        let counts: Counts = [("0".repeat(n), 1)].into_iter().collect();

        let result = mitigate(&DeviceTopology::default(), &counts, &program);
        assert!(matches!(
            result,
            Err(MitigationError::SizeLimit { num_qubits: 33, limit: 32 })
        ));
    }

    #[test]
    fn test_last_measurement_of_a_clbit_wins() {
        let program = "OPENQASM 3.0;\nqubit[3] q;\nbit[2] c;\nc[1] = measure q[0];\nc[0] = measure q[1];\nc[0] = measure q[2];\n";
        let circuit = alsvid_qasm3::parse(program).unwrap();
        assert_eq!(measured_qubits(&circuit), vec![2, 0]);
    }

    #[test]
    fn test_invalid_inputs() {
        let topology = DeviceTopology::uniform("sc", 4, 0.01, 0.01);
        let counts: Counts = [("0 1", 10)].into_iter().collect();
        assert!(mitigate(&topology, &counts, TWO_QUBITS).is_ok());

        for bad in ["011", "0x", "1"] {
            let counts: Counts = [(bad, 10)].into_iter().collect();
            assert!(matches!(
                mitigate(&topology, &counts, TWO_QUBITS),
                Err(MitigationError::InvalidCounts(_))
            ));
        }
        assert!(matches!(
            mitigate(&topology, &Counts::new(), TWO_QUBITS),
            Err(MitigationError::InvalidCounts(_))
        ));
        assert!(matches!(
            mitigate(&topology, &counts_of("0"), "OPENQASM 3.0;\nqubit[1] q;\n"),
            Err(MitigationError::NoMeasurements)
        ));
        assert!(matches!(
            mitigate(&DeviceTopology::uniform("sc", 1, 0.0, 0.0), &counts_of("00"), TWO_QUBITS),
            Err(MitigationError::MissingQubit(1))
        ));
        assert!(matches!(
            mitigate(&topology, &counts_of("00"), "qubit[2] q; c = measure q;"),
            Err(MitigationError::Program(_))
        ));
    }

    #[test]
    fn test_shot_overflow_is_invalid_counts() {
        let topology = DeviceTopology::uniform("sc", 4, 0.01, 0.01);
        let counts: Counts = [("00", u64::MAX), ("01", 2)].into_iter().collect();
        assert!(matches!(
            mitigate(&topology, &counts, TWO_QUBITS),
            Err(MitigationError::InvalidCounts(_))
        ));
    }

    fn counts_of(key: &str) -> Counts {
        [(key, 10)].into_iter().collect()
    }
}
