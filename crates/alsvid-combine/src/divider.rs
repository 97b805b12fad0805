//! Splitting combined measurement results back per sub-circuit.

use alsvid_ir::Counts;
use tracing::debug;

use crate::error::{CombineError, CombineResult};

/// Split counts of a combined circuit into one distribution per sub-circuit.
///
/// `qubit_counts` is the list returned by
/// [`combine_circuits`](crate::combine_circuits), last-placed circuit first.
/// Whitespace in bitstrings is ignored. Each bitstring is cut left to right
/// by the widths in `qubit_counts`; the `i`-th piece belongs to sub-circuit
/// `len - 1 - i`. The result is in placement order, and pieces that repeat
/// within one sub-circuit have their counts summed.
pub fn divide_result(counts: &Counts, qubit_counts: &[u32]) -> CombineResult<Vec<Counts>> {
    if counts.is_empty() {
        return Err(CombineError::EmptyCounts);
    }
    counts.try_shots().ok_or(CombineError::ShotOverflow)?;
    let expected: usize = qubit_counts.iter().map(|&n| n as usize).sum();
    let mut divided = vec![Counts::new(); qubit_counts.len()];

    for (bitstring, &count) in counts {
        let bits: String = bitstring.chars().filter(|c| !c.is_whitespace()).collect();
        if !bits.chars().all(|c| c == '0' || c == '1') {
            return Err(CombineError::InvalidBitstring(bitstring.clone()));
        }
        if bits.len() != expected {
            return Err(CombineError::InconsistentQubits {
                bitstring: bitstring.clone(),
                expected,
                got: bits.len(),
            });
        }

        let mut start = 0;
        for (i, &width) in qubit_counts.iter().enumerate() {
            let end = start + width as usize;
            divided[qubit_counts.len() - 1 - i].add(&bits[start..end], count);
            start = end;
        }
    }

    debug!(
        num_circuits = divided.len(),
        num_outcomes = counts.len(),
        "Divided combined counts"
    );
    Ok(divided)
}
