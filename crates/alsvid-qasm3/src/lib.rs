//! `OpenQASM` 3 parser and emitter for Alsvid.
//!
//! Reads the subset of `OpenQASM` 3.0 that circuit batching and measurement
//! grouping work with, and writes circuits back out in a form that parses to
//! the identical circuit.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version declaration (optional) | `OPENQASM 3.0;` |
//! | Standard library include | `include "stdgates.inc";` |
//! | Qubit and bit declarations | `qubit[5] q;`, `bit[5] c;`, `qreg q[5];` |
//! | Hardware qubits | `x $3;` |
//! | Standard gates and aliases | `h q[0];`, `CX q[0], q[1];`, `u2(0, pi) q;` |
//! | Parameterized gates | `rx(pi/4) q[0];` |
//! | Gate definitions | `gate rot(t) a { rz(t) a; }` |
//! | Register broadcasting and ranges | `h q;`, `cx a[0:1], b;` |
//! | Measurements | `c = measure q;`, `measure q[0] -> c[0];` |
//! | Barriers and reset | `barrier q;`, `reset q[0];` |
//!
//! Classical control flow, classical declarations and assignments other than
//! `c = measure q;` fail with [`ParseError::Unsupported`].
//!
//! # Example: Round-Trip
//!
//! ```rust
//! use alsvid_qasm3::{emit, parse};
//!
//! let original = r#"
//! OPENQASM 3.0;
//! include "stdgates.inc";
//! qubit[2] q;
//! bit[2] c;
//! h q[0];
//! cx q[0], q[1];
//! c = measure q;
//! "#;
//!
//! let circuit = parse(original).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let emitted = emit(&circuit).unwrap();
//! assert!(emitted.contains("cx q[0], q[1];"));
//!
//! let reparsed = parse(&emitted).unwrap();
//! assert_eq!(circuit.instructions(), reparsed.instructions());
//! ```

mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::parse;
