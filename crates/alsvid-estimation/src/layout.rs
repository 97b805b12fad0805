//! Observable-to-circuit qubit layouts.

use rustc_hash::FxHashSet;

use crate::error::{EstimationError, EstimationResult};

/// Bijection from observable qubit `i` to physical circuit qubit `layout[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout(Vec<u32>);

impl Layout {
    /// Complete a possibly partial layout for a circuit of `num_qubits` qubits.
    ///
    /// An empty layout is the identity. A layout of the wrong length is
    /// extended with the indices up to its maximum that it does not mention,
    /// ascending. The result must be a permutation of `0..num_qubits`.
    pub fn complete(partial: &[u32], num_qubits: u32) -> EstimationResult<Self> {
        let layout: Vec<u32> = if partial.is_empty() {
            (0..num_qubits).collect()
        } else if partial.len() == num_qubits as usize {
            partial.to_vec()
        } else {
            let present: FxHashSet<u32> = partial.iter().copied().collect();
            let max = partial.iter().copied().max().unwrap_or(0);
            let missing = (0..=max).filter(|q| !present.contains(q));
            partial.iter().copied().chain(missing).collect()
        };

        let invalid = |message: String| EstimationError::InvalidLayout {
            layout: partial.to_vec(),
            message,
        };
        if layout.len() != num_qubits as usize {
            return Err(invalid(format!(
                "completes to {} entries for a {num_qubits}-qubit circuit",
                layout.len()
            )));
        }
        let mut seen = FxHashSet::default();
        for &q in &layout {
            if q >= num_qubits {
                return Err(invalid(format!("qubit {q} is outside the circuit")));
            }
            if !seen.insert(q) {
                return Err(invalid(format!("qubit {q} appears more than once")));
            }
        }
        Ok(Self(layout))
    }

    /// Physical qubit for observable qubit `qubit`.
    #[inline]
    pub fn physical(&self, qubit: u32) -> u32 {
        self.0[qubit as usize]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}
