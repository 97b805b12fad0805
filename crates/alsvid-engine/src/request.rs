//! Request payloads accepted by the CLI.
//!
//! Field names follow the response types so a preprocess response can be
//! fed back into a postprocess request after execution.

use alsvid_ir::Counts;
use alsvid_mitigation::DeviceTopology;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineRequest {
    pub programs: Vec<String>,
    /// Falls back to `combine.max_qubits` from the configuration.
    #[serde(default)]
    pub max_qubits: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessRequest {
    pub program: String,
    pub operator: String,
    /// Falls back to `estimation.basis_gates` from the configuration.
    #[serde(default)]
    pub basis_gates: Option<Vec<String>>,
    #[serde(default)]
    pub qubit_layout: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostprocessRequest {
    pub grouped_counts: Vec<Counts>,
    pub grouped_operators: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigateRequest {
    pub device_topology: DeviceTopology,
    pub counts: Counts,
    pub program: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivideRequest {
    pub counts: Counts,
    pub qubit_counts: Vec<u32>,
}
