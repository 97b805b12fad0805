//! Circuit batching for Alsvid.
//!
//! [`combine_circuits`] places independent QASM 3 programs side by side on
//! one register so they run as a single job; [`divide_result`] undoes the
//! bookkeeping on the returned counts.
//!
//! ```rust
//! use alsvid_combine::{CombineStatus, combine_circuits};
//!
//! let bell = "qubit[2] q; bit[2] c; h q[0]; cx q[0], q[1]; c = measure q;";
//! let flip = "qubit q; bit c; x q; c = measure q;";
//!
//! let outcome = combine_circuits(&[bell, flip], 8);
//! assert_eq!(outcome.status, CombineStatus::Success);
//! assert_eq!(outcome.qubit_counts, vec![1, 2]);
//! ```

mod combiner;
mod divider;
mod error;

pub use combiner::{CombineOutcome, CombineStatus, combine_circuits};
pub use divider::divide_result;
pub use error::{CombineError, CombineResult};
