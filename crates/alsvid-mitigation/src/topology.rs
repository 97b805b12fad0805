//! Device calibration data.

use serde::{Deserialize, Serialize};

/// Readout error probabilities of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementError {
    /// Probability of reading 1 when the qubit is in |0⟩.
    pub p0m1: f64,
    /// Probability of reading 0 when the qubit is in |1⟩.
    pub p1m0: f64,
}

/// Calibration record of one physical qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitProperties {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_error: Option<f64>,
    pub mes_error: MeasurementError,
}

/// Per-qubit calibration of a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTopology {
    #[serde(default)]
    pub name: String,
    pub qubits: Vec<QubitProperties>,
}

impl DeviceTopology {
    /// Device of `num_qubits` qubits sharing one readout error.
    pub fn uniform(name: impl Into<String>, num_qubits: u32, p0m1: f64, p1m0: f64) -> Self {
        Self {
            name: name.into(),
            qubits: (0..num_qubits)
                .map(|id| QubitProperties {
                    id,
                    t1: None,
                    t2: None,
                    gate_error: None,
                    mes_error: MeasurementError { p0m1, p1m0 },
                })
                .collect(),
        }
    }

    /// Calibration of the qubit with the given `id`.
    pub fn qubit(&self, id: u32) -> Option<&QubitProperties> {
        self.qubits.iter().find(|q| q.id == id)
    }
}
