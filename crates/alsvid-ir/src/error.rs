//! Errors raised while building circuits.

use thiserror::Error;

use crate::qubit::{ClbitId, QubitId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    #[error("'{operation}' addresses {qubit}, which is not in the circuit")]
    QubitOutOfRange {
        qubit: QubitId,
        operation: &'static str,
    },

    #[error("'{operation}' addresses {clbit}, which is not in the circuit")]
    ClbitOutOfRange {
        clbit: ClbitId,
        operation: &'static str,
    },

    #[error("'{operation}' acts on {expected} qubits, got {got}")]
    Arity {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    /// Measurements pair each qubit with exactly one classical bit.
    #[error("Measurement binds {qubits} qubits to {clbits} classical bits")]
    MeasurePairing { qubits: usize, clbits: usize },

    #[error("'{operation}' uses {qubit} more than once")]
    RepeatedQubit {
        qubit: QubitId,
        operation: &'static str,
    },

    #[error("Register '{0}' is already declared")]
    DuplicateRegister(String),

    /// Hardware qubits (`$n`) and declared qubit registers cannot be mixed.
    #[error("Circuit cannot mix physical qubit addressing with register '{0}'")]
    MixedAddressing(String),

    #[error("Circuit size overflow: {0}")]
    SizeOverflow(String),
}

pub type IrResult<T> = Result<T, IrError>;
