//! Error types for observable estimation.

use thiserror::Error;

/// Errors raised while preparing or evaluating an estimation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EstimationError {
    /// The circuit program is not valid QASM 3.
    #[error("Invalid program: {0}")]
    Program(#[from] alsvid_qasm3::ParseError),

    /// The operator text is not a list of `(term, coefficient)` pairs.
    #[error("Invalid operator syntax at offset {offset} near '{text}': {message}")]
    OperatorSyntax {
        offset: usize,
        text: String,
        message: String,
    },

    /// A term is well formed text but not a valid Pauli term.
    #[error("Invalid operator term '{text}': {message}")]
    InvalidTerm { text: String, message: String },

    /// The qubit layout cannot be completed to a permutation.
    #[error("Invalid qubit layout {layout:?}: {message}")]
    InvalidLayout { layout: Vec<u32>, message: String },

    /// A basis rotation has no realization in the target gate set.
    #[error("Cannot realize '{rotation}' with basis gates {basis_gates:?}")]
    UnsupportedBasis {
        rotation: &'static str,
        basis_gates: Vec<String>,
    },

    /// A grouping strategy produced an invalid partition.
    #[error("Grouping strategy '{strategy}' produced an invalid grouping: {message}")]
    InvalidGrouping {
        strategy: &'static str,
        message: String,
    },

    /// The grouped operator record could not be read or written.
    #[error("Invalid grouped operators: {0}")]
    GroupedOperators(#[from] serde_json::Error),

    /// Counts do not match the grouped operators.
    #[error("Invalid counts: {0}")]
    InvalidCounts(String),

    /// IR error while building a measurement circuit.
    #[error("Circuit error: {0}")]
    Circuit(#[from] alsvid_ir::IrError),
}

/// Result type for estimation operations.
pub type EstimationResult<T> = Result<T, EstimationError>;
