//! Error types for circuit combination and result division.

use thiserror::Error;

/// Errors raised while combining circuits or splitting their results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CombineError {
    /// A program failed to parse.
    #[error("Program {index} failed to parse: {source}")]
    Parse {
        /// Position of the program in the request.
        index: usize,
        #[source]
        source: alsvid_qasm3::ParseError,
    },

    /// The combined circuit could not be serialized.
    #[error("Failed to emit combined circuit: {0}")]
    Emit(#[source] alsvid_qasm3::ParseError),

    /// IR error while placing a circuit.
    #[error("Circuit error: {0}")]
    Circuit(#[from] alsvid_ir::IrError),

    /// Combined size does not fit the circuit index range.
    #[error("Combined circuit is too large: {0} qubits")]
    SizeOverflow(u64),

    /// No counts to divide.
    #[error("Counts are empty")]
    EmptyCounts,

    /// The counts total more shots than a `u64` holds.
    #[error("Total shots overflow u64")]
    ShotOverflow,

    /// A bitstring is not as wide as the sub-circuits together.
    #[error("Inconsistent qubits: bitstring '{bitstring}' has {got} bits, expected {expected}")]
    InconsistentQubits {
        bitstring: String,
        expected: usize,
        got: usize,
    },

    /// A bitstring contains something other than `0` and `1`.
    #[error("Invalid bitstring '{0}'")]
    InvalidBitstring(String),
}

/// Result type for combine operations.
pub type CombineResult<T> = Result<T, CombineError>;
