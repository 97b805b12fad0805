//! Request-level error taxonomy.
//!
//! Every engine crate has its own error enum; requests served through
//! [`crate::Engine`] or [`crate::ops`] collapse them into one of four kinds
//! tagged with the operation that failed.

use std::fmt;

use alsvid_combine::CombineError;
use alsvid_estimation::EstimationError;
use alsvid_mitigation::MitigationError;
use serde::Serialize;
use thiserror::Error;

/// Operation a request was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Combine,
    EstimationPreprocess,
    EstimationPostprocess,
    Mitigate,
    Divide,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Combine => "combine",
            Operation::EstimationPreprocess => "estimation_preprocess",
            Operation::EstimationPostprocess => "estimation_postprocess",
            Operation::Mitigate => "mitigate",
            Operation::Divide => "divide",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Parse,
    Parameter,
    SizeLimit,
    Failure,
}

/// A failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Circuit or operator text could not be parsed.
    #[error("{operation}: parse error: {message}")]
    Parse { operation: Operation, message: String },

    /// Input parsed but is inconsistent.
    #[error("{operation}: invalid parameter: {message}")]
    Parameter { operation: Operation, message: String },

    /// A qubit or memory bound was exceeded.
    #[error("{operation}: size limit exceeded: {message}")]
    SizeLimit { operation: Operation, message: String },

    /// Anything else, including panics inside a worker.
    #[error("{operation}: failure: {message}")]
    Failure { operation: Operation, message: String },
}

impl EngineError {
    pub fn parse(operation: Operation, message: impl Into<String>) -> Self {
        Self::Parse {
            operation,
            message: message.into(),
        }
    }

    pub fn parameter(operation: Operation, message: impl Into<String>) -> Self {
        Self::Parameter {
            operation,
            message: message.into(),
        }
    }

    pub fn size_limit(operation: Operation, message: impl Into<String>) -> Self {
        Self::SizeLimit {
            operation,
            message: message.into(),
        }
    }

    pub fn failure(operation: Operation, message: impl Into<String>) -> Self {
        Self::Failure {
            operation,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Parameter { .. } => ErrorKind::Parameter,
            Self::SizeLimit { .. } => ErrorKind::SizeLimit,
            Self::Failure { .. } => ErrorKind::Failure,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Parse { operation, .. }
            | Self::Parameter { operation, .. }
            | Self::SizeLimit { operation, .. }
            | Self::Failure { operation, .. } => *operation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Parse { message, .. }
            | Self::Parameter { message, .. }
            | Self::SizeLimit { message, .. }
            | Self::Failure { message, .. } => message,
        }
    }

    /// Serializable form, as printed by the CLI.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            operation: self.operation(),
            message: self.message().to_string(),
        }
    }

    pub(crate) fn from_estimation(operation: Operation, err: EstimationError) -> Self {
        let message = err.to_string();
        match err {
            EstimationError::Program(_)
            | EstimationError::OperatorSyntax { .. }
            | EstimationError::GroupedOperators(_) => Self::parse(operation, message),
            EstimationError::InvalidTerm { .. }
            | EstimationError::InvalidLayout { .. }
            | EstimationError::UnsupportedBasis { .. }
            | EstimationError::InvalidCounts(_) => Self::parameter(operation, message),
            _ => Self::failure(operation, message),
        }
    }

    pub(crate) fn from_mitigation(err: MitigationError) -> Self {
        let operation = Operation::Mitigate;
        let message = err.to_string();
        match err {
            MitigationError::Program(_) => Self::parse(operation, message),
            MitigationError::SizeLimit { .. } => Self::size_limit(operation, message),
            MitigationError::NoMeasurements
            | MitigationError::MissingQubit(_)
            | MitigationError::InvalidProbability { .. }
            | MitigationError::InvalidCounts(_) => Self::parameter(operation, message),
            _ => Self::failure(operation, message),
        }
    }

    pub(crate) fn from_divide(err: CombineError) -> Self {
        let operation = Operation::Divide;
        let message = err.to_string();
        match err {
            CombineError::EmptyCounts
            | CombineError::ShotOverflow
            | CombineError::InconsistentQubits { .. }
            | CombineError::InvalidBitstring(_) => Self::parameter(operation, message),
            _ => Self::failure(operation, message),
        }
    }
}

/// JSON error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub operation: Operation,
    pub message: String,
}

/// Result type for engine requests.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimation_mapping() {
        let op = Operation::EstimationPreprocess;
        let err = EngineError::from_estimation(
            op,
            EstimationError::InvalidLayout {
                layout: vec![0, 0],
                message: "duplicate".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert_eq!(err.operation(), op);

        let err = EngineError::from_estimation(
            op,
            EstimationError::InvalidGrouping {
                strategy: "greedy",
                message: "term 1 missing".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Failure);

        let err = EngineError::from_estimation(
            op,
            EstimationError::OperatorSyntax {
                offset: 0,
                text: "[".into(),
                message: "unterminated list".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_mitigation_mapping() {
        let err = EngineError::from_mitigation(MitigationError::SizeLimit {
            num_qubits: 33,
            limit: 32,
        });
        assert_eq!(err.kind(), ErrorKind::SizeLimit);
        assert!(err.message().contains("33"));

        let err = EngineError::from_mitigation(MitigationError::MissingQubit(4));
        assert_eq!(err.kind(), ErrorKind::Parameter);
    }

    #[test]
    fn test_body_serialization() {
        let err = EngineError::parameter(Operation::Divide, "Counts are empty");
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["kind"], "PARAMETER");
        assert_eq!(json["operation"], "divide");
        assert_eq!(json["message"], "Counts are empty");
        assert_eq!(err.to_string(), "divide: invalid parameter: Counts are empty");
    }
}
