//! Synchronous request handlers.
//!
//! Each function runs one request start to finish on the calling thread and
//! returns a tagged result. [`crate::Engine`] wraps them in the worker pool.

use alsvid_combine::{CombineOutcome, CombineStatus, combine_circuits, divide_result};
use alsvid_estimation::{
    GreedyColoring, GroupingStrategy, PostprocessOutput, PreprocessOutput, postprocess,
    preprocess,
};
use alsvid_ir::Counts;
use alsvid_mitigation::DeviceTopology;
use tracing::{info, instrument, warn};

use crate::error::{EngineError, EngineResult, Operation};

/// Combine programs into one circuit; see [`combine_circuits`].
#[instrument(skip(programs), fields(num_programs = programs.len()))]
pub fn combine<S: AsRef<str>>(programs: &[S], max_qubits: i64) -> CombineOutcome {
    let outcome = combine_circuits(programs, max_qubits);
    match outcome.status {
        CombineStatus::Success => info!(qubit_counts = ?outcome.qubit_counts, "Combined circuits"),
        status => warn!(?status, "Combine rejected"),
    }
    outcome
}

/// Grouped measurement programs for `operator` using greedy coloring.
pub fn estimation_preprocess(
    program: &str,
    operator: &str,
    basis_gates: &[String],
    qubit_layout: &[u32],
) -> EngineResult<PreprocessOutput> {
    estimation_preprocess_with(program, operator, basis_gates, qubit_layout, &GreedyColoring)
}

/// [`estimation_preprocess`] with an explicit grouping strategy.
#[instrument(skip(program, operator, strategy), fields(strategy = strategy.name()))]
pub fn estimation_preprocess_with(
    program: &str,
    operator: &str,
    basis_gates: &[String],
    qubit_layout: &[u32],
    strategy: &dyn GroupingStrategy,
) -> EngineResult<PreprocessOutput> {
    let operation = Operation::EstimationPreprocess;
    let output = preprocess(program, operator, basis_gates, qubit_layout, strategy)
        .map_err(|e| rejected(EngineError::from_estimation(operation, e)))?;
    info!(
        num_groups = output.grouped_programs.len(),
        "Prepared measurement groups"
    );
    Ok(output)
}

/// Expectation value and standard deviation from per-group counts.
#[instrument(skip_all, fields(num_groups = grouped_counts.len()))]
pub fn estimation_postprocess(
    grouped_counts: &[Counts],
    grouped_operators: &str,
) -> EngineResult<PostprocessOutput> {
    let operation = Operation::EstimationPostprocess;
    let output = postprocess(grouped_counts, grouped_operators)
        .map_err(|e| rejected(EngineError::from_estimation(operation, e)))?;
    info!(expval = output.expval, stds = output.stds, "Aggregated expectation");
    Ok(output)
}

/// Readout-corrected counts.
#[instrument(skip_all, fields(device = %topology.name, shots = counts.shots()))]
pub fn mitigate(topology: &DeviceTopology, counts: &Counts, program: &str) -> EngineResult<Counts> {
    let corrected = alsvid_mitigation::mitigate(topology, counts, program)
        .map_err(|e| rejected(EngineError::from_mitigation(e)))?;
    info!(corrected_shots = corrected.shots(), "Mitigated counts");
    Ok(corrected)
}

/// Split combined counts per sub-circuit; see [`divide_result`].
#[instrument(skip(counts), fields(shots = counts.shots()))]
pub fn divide(counts: &Counts, qubit_counts: &[u32]) -> EngineResult<Vec<Counts>> {
    let divided =
        divide_result(counts, qubit_counts).map_err(|e| rejected(EngineError::from_divide(e)))?;
    info!(num_circuits = divided.len(), "Divided counts");
    Ok(divided)
}

fn rejected(err: EngineError) -> EngineError {
    warn!(kind = ?err.kind(), "Request rejected: {}", err.message());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alsvid_estimation::SingletonGrouping;

    const BELL: &str = "OPENQASM 3.0;\nqubit[2] q;\nbit[2] c;\nh q[0];\ncx q[0], q[1];\nc = measure q;\n";

    fn native() -> Vec<String> {
        vec![]
    }

    #[test]
    fn test_combine_reports_reverse_placement() {
        let programs = [
            "qubit[3] q; bit[3] c; c = measure q;",
            "qubit[2] q; bit[2] c; c = measure q;",
            "qubit[1] q; bit[1] c; c = measure q;",
        ];
        let outcome = combine(&programs, 10);
        assert_eq!(outcome.status, CombineStatus::Success);
        assert_eq!(outcome.qubit_counts, vec![1, 2, 3]);

        let outcome = combine(&programs, 5);
        assert_eq!(outcome.status, CombineStatus::InvalidQubitSize);
        assert!(outcome.combined_program.is_none());
    }

    #[test]
    fn test_preprocess_then_postprocess() {
        let pre = estimation_preprocess(BELL, r#"[("Z0Z1", 1.0), ("I", 0.5)]"#, &native(), &[])
            .unwrap();
        assert_eq!(pre.grouped_programs.len(), 1);

        let counts: Counts = [("00", 500), ("11", 500)].into_iter().collect();
        let post = estimation_postprocess(&[counts], &pre.grouped_operators).unwrap();
        assert!((post.expval - 1.5).abs() < 1e-12);
        assert!(post.stds.abs() < 1e-12);
    }

    #[test]
    fn test_singleton_strategy() {
        let operator = r#"[("Z0", 1.0), ("Z1", 1.0)]"#;
        let greedy = estimation_preprocess(BELL, operator, &native(), &[]).unwrap();
        let singleton =
            estimation_preprocess_with(BELL, operator, &native(), &[], &SingletonGrouping).unwrap();
        assert_eq!(greedy.grouped_programs.len(), 1);
        assert_eq!(singleton.grouped_programs.len(), 2);
    }

    #[test]
    fn test_error_kinds() {
        let err = estimation_preprocess("not qasm", "[]", &native(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.operation(), Operation::EstimationPreprocess);

        let err = estimation_preprocess(BELL, r#"[("X0X0", 1.0)]"#, &native(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);

        let err = estimation_preprocess(BELL, r#"[("Z0", 1.0)]"#, &native(), &[1, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);

        let err = estimation_postprocess(&[], "{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = divide(&Counts::new(), &[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert_eq!(err.operation(), Operation::Divide);
    }

    #[test]
    fn test_mitigate() {
        let topology = DeviceTopology::uniform("sc", 4, 0.05, 0.05);
        let program = "OPENQASM 3.0;\nqubit[4] q;\nbit[2] c;\nc[0] = measure q[0];\nc[1] = measure q[1];\n";
        let counts: Counts = [("00", 425), ("01", 75), ("10", 85), ("11", 415)]
            .into_iter()
            .collect();
        let corrected = mitigate(&topology, &counts, program).unwrap();
        assert_eq!(corrected.get("00"), Some(465));

        let wide = "OPENQASM 3.0;\nqubit[33] q;\nbit[33] c;\nc = measure q;\n";
        let counts: Counts = [("0".repeat(33), 1)].into_iter().collect();
        let err = mitigate(&DeviceTopology::default(), &counts, wide).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeLimit);
    }

    #[test]
    fn test_shot_overflow_is_a_parameter_error() {
        let counts: Counts = [("00", u64::MAX), ("01", 2)].into_iter().collect();
        let topology = DeviceTopology::uniform("sc", 2, 0.01, 0.01);

        let err = mitigate(&topology, &counts, BELL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);

        let err = estimation_postprocess(&[counts.clone()], r#"[[["ZZ"]],[[1.0]]]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert_eq!(err.operation(), Operation::EstimationPostprocess);

        let err = divide(&counts, &[1, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
    }
}
