//! Observable estimation for Alsvid.
//!
//! Estimating `<ψ|H|ψ>` for a Pauli sum `H` runs in two steps around the
//! hardware:
//!
//! 1. [`preprocess`] parses the operator list, groups qubit-wise commuting
//!    terms and emits one measurement circuit per group together with the
//!    [`GroupedOperators`] record.
//! 2. [`postprocess`] turns the per-group counts back into an expectation
//!    value and a standard error.
//!
//! ```rust
//! use alsvid_estimation::{GreedyColoring, postprocess, preprocess};
//! use alsvid_ir::Counts;
//!
//! let bell = "OPENQASM 3.0; qubit[2] q; h q[0]; cx q[0], q[1];";
//! let out = preprocess(bell, "[('Z0 Z1', 1.0)]", &[], &[], &GreedyColoring).unwrap();
//! assert_eq!(out.grouped_programs.len(), 1);
//!
//! let counts: Counts = [("00", 50), ("11", 50)].into_iter().collect();
//! let est = postprocess(&[counts], &out.grouped_operators).unwrap();
//! assert_eq!(est.expval, 1.0);
//! ```

pub mod aggregate;
pub mod basis;
pub mod error;
pub mod grouping;
pub mod layout;
pub mod operator;
pub mod pauli;
pub mod preprocess;

pub use aggregate::{PostprocessOutput, aggregate, postprocess};
pub use error::{EstimationError, EstimationResult};
pub use grouping::{
    GreedyColoring, GroupingStrategy, STRATEGY_NAMES, SingletonGrouping, strategy_by_name,
};
pub use layout::Layout;
pub use operator::{Observable, PauliTerm};
pub use pauli::{Pauli, PauliString};
pub use preprocess::{
    GroupedOperators, MeasurementGroup, PreprocessOutput, build_groups, preprocess,
};
