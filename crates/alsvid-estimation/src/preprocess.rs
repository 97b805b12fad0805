//! Building one measurement circuit per group of commuting terms.

use alsvid_ir::{Circuit, ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::basis::{Rotation, apply_rotation};
use crate::error::{EstimationError, EstimationResult};
use crate::grouping::{GroupingStrategy, validate_grouping};
use crate::layout::Layout;
use crate::operator::Observable;
use crate::pauli::{Pauli, PauliString};

/// One group of qubit-wise commuting terms and the circuit that measures them.
#[derive(Debug, Clone)]
pub struct MeasurementGroup {
    /// Input circuit followed by basis rotations and measurements.
    pub circuit: Circuit,
    /// Per term, `Z`/`I` over the measured qubits; the last character is
    /// the first classical bit of the new register.
    pub diagonal_labels: Vec<String>,
    /// Per term, the dense label over all circuit qubits, highest qubit first.
    pub original_labels: Vec<String>,
    pub coefficients: Vec<f64>,
    /// Qubits read out, ascending; position `k` is stored in new clbit `k`.
    pub measured_qubits: Vec<QubitId>,
}

/// Per-group diagonal labels and coefficients handed to the aggregator.
///
/// Serializes as `[[labels per group], [coefficients per group]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedOperators(pub Vec<Vec<String>>, pub Vec<Vec<f64>>);

impl GroupedOperators {
    pub fn from_groups(groups: &[MeasurementGroup]) -> Self {
        Self(
            groups.iter().map(|g| g.diagonal_labels.clone()).collect(),
            groups.iter().map(|g| g.coefficients.clone()).collect(),
        )
    }

    pub fn num_groups(&self) -> usize {
        self.0.len()
    }

    pub fn labels(&self) -> &[Vec<String>] {
        &self.0
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.1
    }

    pub fn to_json(&self) -> EstimationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> EstimationResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Result of [`preprocess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessOutput {
    /// One QASM 3 program per group, in group order.
    pub grouped_programs: Vec<String>,
    /// [`GroupedOperators`] as JSON.
    pub grouped_operators: String,
}

/// Split `observable` into groups and build a measurement circuit for each.
///
/// Final measurements of `circuit` are removed first. Term qubit `i` acts on
/// circuit qubit `qubit_layout[i]` after the layout is completed by
/// [`Layout::complete`].
pub fn build_groups(
    mut circuit: Circuit,
    observable: &Observable,
    basis_gates: &[String],
    qubit_layout: &[u32],
    strategy: &dyn GroupingStrategy,
) -> EstimationResult<Vec<MeasurementGroup>> {
    let removed = circuit.remove_final_measurements();
    let layout = Layout::complete(qubit_layout, observable.num_qubits)?;
    let dense = observable.to_dense(&layout)?;
    let (terms, coefficients): (Vec<PauliString>, Vec<f64>) = dense.into_iter().unzip();

    let groups = strategy.group(&terms);
    validate_grouping(strategy, &terms, &groups)?;
    debug!(
        removed_measurements = removed,
        num_terms = terms.len(),
        num_groups = groups.len(),
        strategy = strategy.name(),
        "Grouped observable terms"
    );

    groups
        .iter()
        .map(|group| {
            let members: Vec<&PauliString> = group.iter().map(|&t| &terms[t]).collect();
            let mut group_circuit = circuit.clone();
            let measured = append_measurements(&mut group_circuit, &members, basis_gates)?;
            Ok(MeasurementGroup {
                circuit: group_circuit,
                diagonal_labels: members
                    .iter()
                    .map(|term| diagonal_label(term, &measured))
                    .collect(),
                original_labels: members.iter().map(|term| term.label()).collect(),
                coefficients: group.iter().map(|&t| coefficients[t]).collect(),
                measured_qubits: measured,
            })
        })
        .collect()
}

/// Parse, group and emit in one step.
///
/// An operator without terms is rejected.
pub fn preprocess(
    program: &str,
    operator: &str,
    basis_gates: &[String],
    qubit_layout: &[u32],
    strategy: &dyn GroupingStrategy,
) -> EstimationResult<PreprocessOutput> {
    let circuit = alsvid_qasm3::parse(program)?;
    let num_qubits = u32::try_from(circuit.num_qubits()).map_err(|_| {
        EstimationError::InvalidTerm {
            text: operator.to_string(),
            message: "circuit is too large".into(),
        }
    })?;
    let observable = Observable::parse(operator, num_qubits)?;
    if observable.terms.is_empty() {
        return Err(EstimationError::InvalidTerm {
            text: operator.to_string(),
            message: "operator has no terms".into(),
        });
    }

    let groups = build_groups(circuit, &observable, basis_gates, qubit_layout, strategy)?;
    let grouped_programs = groups
        .iter()
        .map(|g| alsvid_qasm3::emit(&g.circuit))
        .collect::<Result<Vec<_>, _>>()?;
    let grouped_operators = GroupedOperators::from_groups(&groups).to_json()?;
    Ok(PreprocessOutput {
        grouped_programs,
        grouped_operators,
    })
}

/// Rotate each measured qubit into the Z basis and read it into a new register.
fn append_measurements(
    circuit: &mut Circuit,
    members: &[&PauliString],
    basis_gates: &[String],
) -> EstimationResult<Vec<QubitId>> {
    let num_qubits = members.first().map_or(0, |t| t.num_qubits());
    let bases: Vec<(usize, Pauli)> = (0..num_qubits)
        .filter_map(|q| {
            members
                .iter()
                .map(|t| t.get(q))
                .find(|p| !p.is_identity())
                .map(|p| (q, p))
        })
        .collect();

    for &(q, pauli) in &bases {
        let qubit = QubitId(q as u32);
        match pauli {
            Pauli::X => apply_rotation(circuit, Rotation::H, qubit, basis_gates)?,
            Pauli::Y => {
                apply_rotation(circuit, Rotation::Sdg, qubit, basis_gates)?;
                apply_rotation(circuit, Rotation::H, qubit, basis_gates)?;
            }
            Pauli::Z | Pauli::I => {}
        }
    }

    let measured: Vec<QubitId> = if bases.is_empty() {
        vec![QubitId(0)]
    } else {
        bases.iter().map(|&(q, _)| QubitId(q as u32)).collect()
    };
    let name = circuit.unused_register_name("c");
    let register = circuit.add_creg(name, measured.len() as u32)?;
    for (k, &qubit) in measured.iter().enumerate() {
        circuit.measure(qubit, ClbitId(register.start + k as u32))?;
    }
    Ok(measured)
}

/// `Z` where `term` acts on a measured qubit, else `I`; clbit 0 rightmost.
fn diagonal_label(term: &PauliString, measured: &[QubitId]) -> String {
    measured
        .iter()
        .rev()
        .map(|q| if term.get(q.index()).is_identity() { 'I' } else { 'Z' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{GreedyColoring, SingletonGrouping};

    const BELL: &str = "OPENQASM 3.0;\nqubit[2] q;\nbit[2] c;\nh q[0];\ncx q[0], q[1];\nc = measure q;\n";

    fn ibm() -> Vec<String> {
        vec!["sx".into(), "rz".into(), "cx".into()]
    }

    #[test]
    fn test_groups_and_labels() {
        let observable = Observable::parse("[('Z0 Z1', 1.0), ('X0 X1', 0.5), ('Z1', 2.0)]", 2).unwrap();
        let circuit = alsvid_qasm3::parse(BELL).unwrap();
        let groups = build_groups(circuit, &observable, &[], &[], &GreedyColoring).unwrap();

        // XX conflicts with both other terms, so it is colored first.
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].original_labels, vec!["XX"]);
        assert_eq!(groups[0].measured_qubits, vec![QubitId(0), QubitId(1)]);
        assert_eq!(groups[1].original_labels, vec!["ZZ", "ZI"]);
        assert_eq!(groups[1].diagonal_labels, vec!["ZZ", "ZI"]);
        assert_eq!(groups[1].coefficients, vec![1.0, 2.0]);

        // The final measurement and its register are gone; the readout
        // register takes the freed name.
        let circuit = &groups[0].circuit;
        assert_eq!(circuit.creg("c").map(|r| r.size), Some(2));
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.instructions().iter().filter(|i| i.name() == "h").count(), 3);
    }

    #[test]
    fn test_readout_register_avoids_taken_names() {
        let src = "OPENQASM 3.0;\nqubit[1] c;\nbit[1] m;\nm[0] = measure c[0];\nx c[0];\n";
        let observable = Observable::parse("[('Z0', 1.0)]", 1).unwrap();
        let circuit = alsvid_qasm3::parse(src).unwrap();
        let groups = build_groups(circuit, &observable, &[], &[], &GreedyColoring).unwrap();

        let circuit = &groups[0].circuit;
        assert_eq!(circuit.creg("c0").map(|r| (r.start, r.size)), Some((1, 1)));
        assert_eq!(circuit.measured_qubits(), vec![QubitId(0), QubitId(0)]);
    }

    #[test]
    fn test_partial_support_measures_only_used_qubits() {
        let observable = Observable::parse("[('Y1', 1.0)]", 3).unwrap();
        let circuit = alsvid_qasm3::parse("OPENQASM 3.0;\nqubit[3] q;\n").unwrap();
        let groups = build_groups(circuit, &observable, &ibm(), &[2, 0, 1], &SingletonGrouping).unwrap();

        // Observable qubit 1 sits on circuit qubit 0.
        assert_eq!(groups[0].measured_qubits, vec![QubitId(0)]);
        assert_eq!(groups[0].diagonal_labels, vec!["Z"]);
        assert_eq!(groups[0].original_labels, vec!["IIY"]);
        let names: Vec<_> = groups[0].circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["rz", "rz", "sx", "rz", "measure"]);
    }

    #[test]
    fn test_identity_only_measures_qubit_zero() {
        let observable = Observable::parse("[('I', 3.0)]", 2).unwrap();
        let circuit = alsvid_qasm3::parse(BELL).unwrap();
        let groups = build_groups(circuit, &observable, &[], &[], &GreedyColoring).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].measured_qubits, vec![QubitId(0)]);
        assert_eq!(groups[0].diagonal_labels, vec!["I"]);
        assert_eq!(groups[0].original_labels, vec!["II"]);
    }

    #[test]
    fn test_preprocess_emits_programs_and_blob() {
        let out = preprocess(BELL, r#"[["Z0 Z1", 1.5], ["X0", -1]]"#, &ibm(), &[], &GreedyColoring).unwrap();
        assert_eq!(out.grouped_programs.len(), 2);

        let blob = GroupedOperators::from_json(&out.grouped_operators).unwrap();
        assert_eq!(blob.labels(), &[vec!["ZZ".to_string()], vec!["Z".to_string()]]);
        assert_eq!(blob.coefficients(), &[vec![1.5], vec![-1.0]]);
        assert!(out.grouped_operators.starts_with("[[[\"ZZ\"]"));

        let reparsed = alsvid_qasm3::parse(&out.grouped_programs[1]).unwrap();
        assert_eq!(reparsed.measured_qubits(), vec![QubitId(0)]);
    }

    #[test]
    fn test_preprocess_failures() {
        assert!(matches!(
            preprocess("qubit[1] q; nope q[0];", "[('Z0', 1.0)]", &[], &[], &GreedyColoring),
            Err(EstimationError::Program(_))
        ));
        assert!(matches!(
            preprocess(BELL, "[]", &[], &[], &GreedyColoring),
            Err(EstimationError::InvalidTerm { .. })
        ));
        assert!(matches!(
            preprocess(BELL, "[('Z0', 1.0)]", &[], &[0, 0], &GreedyColoring),
            Err(EstimationError::InvalidLayout { .. })
        ));
        assert!(matches!(
            preprocess(BELL, "[('X0', 1.0)]", &["cx".into()], &[], &GreedyColoring),
            Err(EstimationError::UnsupportedBasis { .. })
        ));
    }
}
