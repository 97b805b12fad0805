//! Batching independent circuits into one.

use alsvid_ir::Circuit;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CombineError, CombineResult};

/// Outcome category of a combine request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombineStatus {
    Success,
    /// The circuits need more qubits than allowed.
    InvalidQubitSize,
    Failure,
}

/// Result of [`combine_circuits`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineOutcome {
    pub status: CombineStatus,
    /// Combined QASM 3 program, present only on success.
    pub combined_program: Option<String>,
    /// Qubit count of each sub-circuit, last-placed circuit first.
    ///
    /// Combined bitstrings are most-significant bit first, so slicing a
    /// bitstring from the left by these widths visits the sub-circuits in
    /// this order.
    pub qubit_counts: Vec<u32>,
}

impl CombineOutcome {
    fn rejected(status: CombineStatus) -> Self {
        Self {
            status,
            combined_program: None,
            qubit_counts: vec![],
        }
    }
}

/// Combine QASM 3 programs into one circuit.
///
/// Circuit `k` is placed on the qubits and classical bits directly after
/// those of circuit `k - 1`. `max_qubits` below zero is treated as zero.
/// Failures are reported through [`CombineOutcome::status`]; no partial
/// program is ever returned.
pub fn combine_circuits<S: AsRef<str>>(programs: &[S], max_qubits: i64) -> CombineOutcome {
    match try_combine(programs, max_qubits) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Combine failed: {e}");
            CombineOutcome::rejected(CombineStatus::Failure)
        }
    }
}

fn try_combine<S: AsRef<str>>(programs: &[S], max_qubits: i64) -> CombineResult<CombineOutcome> {
    let circuits = programs
        .iter()
        .enumerate()
        .map(|(index, p)| {
            alsvid_qasm3::parse(p.as_ref()).map_err(|source| CombineError::Parse { index, source })
        })
        .collect::<CombineResult<Vec<Circuit>>>()?;

    let total_qubits: u64 = circuits.iter().map(|c| c.num_qubits() as u64).sum();
    let total_clbits: u64 = circuits.iter().map(|c| c.num_clbits() as u64).sum();
    let limit = max_qubits.max(0).unsigned_abs();
    debug!(
        num_circuits = circuits.len(),
        total_qubits, total_clbits, limit, "Sized combined circuit"
    );

    if total_qubits > limit {
        warn!("Combined circuit needs {total_qubits} qubits, limit is {limit}");
        return Ok(CombineOutcome::rejected(CombineStatus::InvalidQubitSize));
    }

    let mut combined = Circuit::with_size(
        "combined",
        to_u32(total_qubits)?,
        to_u32(total_clbits)?,
    );
    let mut qubit_counts = Vec::with_capacity(circuits.len());
    let (mut qubit_offset, mut clbit_offset) = (0u32, 0u32);
    for circuit in &circuits {
        combined.compose(circuit, qubit_offset, clbit_offset)?;
        let (q, c) = (
            to_u32(circuit.num_qubits() as u64)?,
            to_u32(circuit.num_clbits() as u64)?,
        );
        qubit_counts.push(q);
        qubit_offset += q;
        clbit_offset += c;
    }
    qubit_counts.reverse();

    let program = alsvid_qasm3::emit(&combined).map_err(CombineError::Emit)?;
    Ok(CombineOutcome {
        status: CombineStatus::Success,
        combined_program: Some(program),
        qubit_counts,
    })
}

fn to_u32(n: u64) -> CombineResult<u32> {
    u32::try_from(n).map_err(|_| CombineError::SizeOverflow(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::QubitId;

    fn ghz(n: usize) -> String {
        let mut src = format!("OPENQASM 3.0;\nqubit[{n}] q;\nbit[{n}] c;\nh q[0];\n");
        for i in 1..n {
            src.push_str(&format!("cx q[{}], q[{i}];\n", i - 1));
        }
        src.push_str("c = measure q;\n");
        src
    }

    #[test]
    fn test_combine_reports_counts_in_reverse_order() {
        let programs = [ghz(3), ghz(2), ghz(1)];
        let outcome = combine_circuits(&programs, 10);

        assert_eq!(outcome.status, CombineStatus::Success);
        assert_eq!(outcome.qubit_counts, vec![1, 2, 3]);

        let combined = alsvid_qasm3::parse(outcome.combined_program.as_deref().unwrap()).unwrap();
        assert_eq!(combined.num_qubits(), 6);
        assert_eq!(combined.num_clbits(), 6);
        // Second circuit's `h` lands on its block's first qubit.
        let hs: Vec<_> = combined
            .instructions()
            .iter()
            .filter(|i| i.name() == "h")
            .map(|i| i.qubits[0])
            .collect();
        assert_eq!(hs, vec![QubitId(0), QubitId(3), QubitId(5)]);
        assert_eq!(combined.measured_qubits(), (0..6).map(QubitId).collect::<Vec<_>>());
    }

    #[test]
    fn test_combine_over_limit() {
        let programs = [ghz(3), ghz(2), ghz(1)];
        let outcome = combine_circuits(&programs, 5);

        assert_eq!(outcome.status, CombineStatus::InvalidQubitSize);
        assert!(outcome.combined_program.is_none());
        assert!(outcome.qubit_counts.is_empty());
    }

    #[test]
    fn test_negative_limit_is_zero() {
        assert_eq!(
            combine_circuits(&[ghz(1)], -4).status,
            CombineStatus::InvalidQubitSize
        );
        assert_eq!(
            combine_circuits::<&str>(&[], -4).status,
            CombineStatus::Success
        );
    }

    #[test]
    fn test_parse_failure_returns_nothing() {
        let programs = [ghz(2), "qubit[2] q; bogus q[0];".to_string()];
        let outcome = combine_circuits(&programs, 10);

        assert_eq!(outcome.status, CombineStatus::Failure);
        assert!(outcome.combined_program.is_none());
        assert!(outcome.qubit_counts.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let outcome = combine_circuits::<String>(&[], 10);
        assert_eq!(outcome.status, CombineStatus::Success);
        assert!(outcome.qubit_counts.is_empty());

        let combined = alsvid_qasm3::parse(outcome.combined_program.as_deref().unwrap()).unwrap();
        assert_eq!(combined.num_qubits(), 0);
        assert!(combined.is_empty());
    }

    #[test]
    fn test_outcome_serializes_status_tag() {
        let outcome = CombineOutcome::rejected(CombineStatus::InvalidQubitSize);
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"INVALID_QUBIT_SIZE\""));
    }
}
