//! Tensor-product readout assignment model.
//!
//! The full `2^n × 2^n` assignment matrix is the Kronecker product
//! `A_{n-1} ⊗ … ⊗ A_0` of per-qubit 2×2 matrices, where `A_k` belongs to the
//! qubit read into classical bit `k` and acts on bit `k` of a distribution
//! index. It is never materialized: both the model and its inverse are
//! applied one qubit at a time.

use ndarray::{Array1, Array2, arr2};

use crate::error::{MitigationError, MitigationResult};
use crate::topology::DeviceTopology;

/// Determinants at or below this magnitude are treated as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Per-qubit assignment matrices for a list of measured qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentModel {
    qubits: Vec<u32>,
    matrices: Vec<Array2<f64>>,
}

impl AssignmentModel {
    /// Look up each measured qubit in `topology`.
    ///
    /// `measured_qubits[k]` is the physical qubit read into classical bit `k`.
    pub fn from_topology(
        topology: &DeviceTopology,
        measured_qubits: &[u32],
    ) -> MitigationResult<Self> {
        let matrices = measured_qubits
            .iter()
            .map(|&id| {
                let properties = topology.qubit(id).ok_or(MitigationError::MissingQubit(id))?;
                let e = properties.mes_error;
                for (name, value) in [("p0m1", e.p0m1), ("p1m0", e.p1m0)] {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(MitigationError::InvalidProbability {
                            qubit: id,
                            name,
                            value,
                        });
                    }
                }
                Ok(assignment_matrix(e.p0m1, e.p1m0))
            })
            .collect::<MitigationResult<Vec<_>>>()?;
        Ok(Self {
            qubits: measured_qubits.to_vec(),
            matrices,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.matrices.len()
    }

    pub fn qubits(&self) -> &[u32] {
        &self.qubits
    }

    /// Assignment matrix of classical bit `k`, indexed `[measured][prepared]`.
    pub fn matrix(&self, k: usize) -> Option<&Array2<f64>> {
        self.matrices.get(k)
    }

    /// Per-qubit inverses; singular matrices get their pseudo-inverse.
    pub fn inverse_matrices(&self) -> Vec<Array2<f64>> {
        self.matrices.iter().map(inverse_2x2).collect()
    }

    /// Map a prepared-state distribution to the expected readout distribution.
    pub fn apply(&self, distribution: &mut Array1<f64>) {
        contract(&self.matrices, distribution);
    }

    /// Undo the model on a readout distribution.
    pub fn apply_inverse(&self, distribution: &mut Array1<f64>) {
        contract(&self.inverse_matrices(), distribution);
    }
}

/// `[[1 - p0m1, p1m0], [p0m1, 1 - p1m0]]`.
pub fn assignment_matrix(p0m1: f64, p1m0: f64) -> Array2<f64> {
    arr2(&[[1.0 - p0m1, p1m0], [p0m1, 1.0 - p1m0]])
}

/// Closed-form inverse, or the Moore-Penrose pseudo-inverse when singular.
pub fn inverse_2x2(m: &Array2<f64>) -> Array2<f64> {
    let (a, b, c, d) = (m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]);
    let det = a * d - b * c;
    if det.abs() > SINGULAR_EPS {
        return arr2(&[[d, -b], [-c, a]]) / det;
    }
    // Rank one: pinv(u vᵀ) = v uᵀ / ‖u vᵀ‖²_F. Rank zero: zero.
    let norm_sq: f64 = m.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        m.t().to_owned() / norm_sq
    } else {
        Array2::zeros((2, 2))
    }
}

/// Apply `matrices[k]` to bit `k` of every index of `vector`, in place.
fn contract(matrices: &[Array2<f64>], vector: &mut Array1<f64>) {
    let len = vector.len();
    for (k, m) in matrices.iter().enumerate() {
        let mask = 1usize << k;
        for i in 0..len {
            if i & mask == 0 {
                let j = i | mask;
                let (x0, x1) = (vector[i], vector[j]);
                vector[i] = m[[0, 0]] * x0 + m[[0, 1]] * x1;
                vector[j] = m[[1, 0]] * x0 + m[[1, 1]] * x1;
            }
        }
    }
}
