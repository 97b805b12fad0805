//! Readout error mitigation for Alsvid.
//!
//! Each measured qubit `q` has a 2×2 assignment matrix built from its
//! calibrated readout errors `p0m1` and `p1m0`. The device model is their
//! tensor product over the measured qubits; [`ReadoutMitigator`] applies its
//! inverse to the measured distribution and projects the result back onto
//! the probability simplex.
//!
//! ```rust
//! use alsvid_ir::Counts;
//! use alsvid_mitigation::{DeviceTopology, mitigate};
//!
//! let topology = DeviceTopology::uniform("sc", 2, 0.0, 0.0);
//! let program = "OPENQASM 3.0; qubit[2] q; bit[2] c; h q[0]; c = measure q;";
//! let counts: Counts = [("00", 48), ("01", 52)].into_iter().collect();
//!
//! // Without readout error the counts come back unchanged.
//! assert_eq!(mitigate(&topology, &counts, program).unwrap(), counts);
//! ```

pub mod error;
pub mod mitigator;
pub mod model;
pub mod simplex;
pub mod topology;

pub use error::{MitigationError, MitigationResult};
pub use mitigator::{MAX_MEASURED_QUBITS, ReadoutMitigator, measured_qubits, mitigate};
pub use model::AssignmentModel;
pub use simplex::nearest_probability;
pub use topology::{DeviceTopology, MeasurementError, QubitProperties};
