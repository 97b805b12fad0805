//! Error types for readout mitigation.

use thiserror::Error;

/// Errors raised while building or applying a readout model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MitigationError {
    /// The circuit program is not valid QASM 3.
    #[error("Invalid program: {0}")]
    Program(#[from] alsvid_qasm3::ParseError),

    /// Too many measured qubits for a dense distribution.
    #[error("{num_qubits} measured qubits exceed the limit of {limit}")]
    SizeLimit { num_qubits: usize, limit: usize },

    /// The program measures nothing.
    #[error("Program has no measurements")]
    NoMeasurements,

    /// A measured qubit has no entry in the device topology.
    #[error("Qubit {0} is not in the device topology")]
    MissingQubit(u32),

    /// A readout error probability is outside `[0, 1]`.
    #[error("Qubit {qubit} has invalid readout error {name} = {value}")]
    InvalidProbability {
        qubit: u32,
        name: &'static str,
        value: f64,
    },

    /// Counts do not match the measured qubits.
    #[error("Invalid counts: {0}")]
    InvalidCounts(String),
}

/// Result type for mitigation operations.
pub type MitigationResult<T> = Result<T, MitigationError>;
