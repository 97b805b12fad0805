//! Operations placed in a circuit, with their operands.

use serde::{Deserialize, Serialize};

use crate::gate::StandardGate;
use crate::qubit::{ClbitId, QubitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Gate(StandardGate),
    /// Writes one classical bit per measured qubit, pairwise.
    Measure,
    /// Returns a qubit to |0⟩.
    Reset,
    /// Scheduling fence; no effect on the state.
    Barrier,
}

/// An operation and the bits it acts on.
///
/// Only measurements have classical operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    fn quantum(kind: InstructionKind, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind,
            qubits: qubits.into_iter().collect(),
            clbits: Vec::new(),
        }
    }

    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::quantum(InstructionKind::Gate(gate), qubits)
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    pub fn reset(qubit: QubitId) -> Self {
        Self::quantum(InstructionKind::Reset, [qubit])
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::quantum(InstructionKind::Barrier, qubits)
    }

    pub fn is_measure(&self) -> bool {
        self.kind == InstructionKind::Measure
    }

    pub fn as_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(gate) => Some(gate),
            _ => None,
        }
    }

    /// Name as written in QASM.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            InstructionKind::Gate(gate) => gate.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// The same operation with qubits moved up by `qubit_offset` and
    /// classical bits by `clbit_offset`.
    pub fn shifted(&self, qubit_offset: u32, clbit_offset: u32) -> Self {
        Self {
            kind: self.kind.clone(),
            qubits: self.qubits.iter().map(|q| QubitId(q.0 + qubit_offset)).collect(),
            clbits: self.clbits.iter().map(|c| ClbitId(c.0 + clbit_offset)).collect(),
        }
    }
}
