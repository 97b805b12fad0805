//! Measurement-basis rotations expressed in a target gate set.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use alsvid_ir::{Circuit, QubitId, StandardGate};

use crate::error::{EstimationError, EstimationResult};

/// Single-qubit rotation needed to move a Pauli eigenbasis onto Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Hadamard, X basis to Z basis.
    H,
    /// Inverse phase gate, applied before `H` for the Y basis.
    Sdg,
}

impl Rotation {
    pub fn name(self) -> &'static str {
        match self {
            Rotation::H => "h",
            Rotation::Sdg => "sdg",
        }
    }

    /// Gates realizing this rotation (up to global phase) in `basis_gates`.
    ///
    /// Candidates are tried in a fixed order and the first whose gates are
    /// all in the basis wins. An empty basis accepts the rotation as is.
    pub fn decompose(self, basis_gates: &[String]) -> EstimationResult<Vec<StandardGate>> {
        if basis_gates.is_empty() {
            return Ok(vec![self.native()]);
        }
        self.candidates()
            .into_iter()
            .find(|gates| gates.iter().all(|g| basis_gates.iter().any(|b| b == g.name())))
            .ok_or_else(|| EstimationError::UnsupportedBasis {
                rotation: self.name(),
                basis_gates: basis_gates.to_vec(),
            })
    }

    fn native(self) -> StandardGate {
        match self {
            Rotation::H => StandardGate::H,
            Rotation::Sdg => StandardGate::Sdg,
        }
    }

    fn candidates(self) -> Vec<Vec<StandardGate>> {
        match self {
            Rotation::H => vec![
                vec![StandardGate::H],
                vec![
                    StandardGate::Rz(FRAC_PI_2),
                    StandardGate::SX,
                    StandardGate::Rz(FRAC_PI_2),
                ],
                vec![StandardGate::U(FRAC_PI_2, 0.0, PI)],
                vec![
                    StandardGate::PRX(FRAC_PI_2, FRAC_PI_2),
                    StandardGate::PRX(PI, 0.0),
                ],
            ],
            Rotation::Sdg => vec![
                vec![StandardGate::Sdg],
                vec![StandardGate::Rz(-FRAC_PI_2)],
                vec![StandardGate::P(-FRAC_PI_2)],
                vec![StandardGate::U(0.0, 0.0, -FRAC_PI_2)],
                vec![StandardGate::PRX(PI, 0.0), StandardGate::PRX(PI, -FRAC_PI_4)],
            ],
        }
    }
}

/// Append `rotation` on `qubit` using gates from `basis_gates`.
pub fn apply_rotation(
    circuit: &mut Circuit,
    rotation: Rotation,
    qubit: QubitId,
    basis_gates: &[String],
) -> EstimationResult<()> {
    for gate in rotation.decompose(basis_gates)? {
        circuit.gate(gate, [qubit])?;
    }
    Ok(())
}
