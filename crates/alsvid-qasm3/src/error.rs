//! Errors raised while reading or writing QASM text.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("Lexer error at line {line} (offset {position}): {message}")]
    Lex {
        line: usize,
        position: usize,
        message: String,
    },

    #[error("Syntax error at line {line}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input: expected {0}")]
    Eof(String),

    #[error("Unsupported OPENQASM version: {0}")]
    Version(String),

    #[error("Undefined identifier: {0}")]
    Undefined(String),

    #[error("Duplicate declaration: {0}")]
    Duplicate(String),

    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    QubitArity {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    ParamArity {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("Cannot broadcast '{operation}' over operands of sizes {sizes:?}")]
    Broadcast {
        operation: String,
        sizes: Vec<usize>,
    },

    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    OutOfRange {
        register: String,
        index: usize,
        size: usize,
    },

    /// Valid `OpenQASM` 3 outside the subset this crate handles.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Gate '{0}' is defined in terms of itself")]
    RecursiveGate(String),

    /// Anything else that is malformed: bad angles, empty ranges, oversized
    /// literals.
    #[error("Invalid program: {0}")]
    Invalid(String),

    #[error("Circuit error: {0}")]
    Circuit(#[from] alsvid_ir::IrError),
}

pub type ParseResult<T> = Result<T, ParseError>;
