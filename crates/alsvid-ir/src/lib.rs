//! Alsvid Circuit Intermediate Representation
//!
//! This crate provides the data model shared by every Alsvid engine: flat
//! qubit and classical bit indices, named registers, standard gates with
//! bound parameters, circuits, and measurement count distributions.
//!
//! # Core Components
//!
//! - **Bits and registers**: [`QubitId`], [`ClbitId`], [`Register`]
//! - **Gates**: [`StandardGate`] for the OpenQASM standard gate set
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] validated instruction list with a builder API
//! - **Counts**: [`Counts`] histogram of measured bitstrings
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use alsvid_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.measured_qubits(), vec![QubitId(0), QubitId(1)]);
//!
//! circuit.remove_final_measurements();
//! assert_eq!(circuit.num_clbits(), 0);
//! assert_eq!(circuit.len(), 2);
//! ```

pub mod circuit;
pub mod counts;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use counts::Counts;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId, Register};
