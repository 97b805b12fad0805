//! Euclidean projection onto the probability simplex.

use ndarray::Array1;

/// Closest probability vector to `quasi` in the Euclidean norm.
///
/// Sort descending, find the largest `ρ` with `u_ρ > (Σ_{j≤ρ} u_j - 1) / ρ`,
/// shift everything down by that threshold and clip at zero. A vector that
/// already lies on the simplex is returned unchanged.
pub fn nearest_probability(quasi: &Array1<f64>) -> Array1<f64> {
    if quasi.is_empty() {
        return Array1::zeros(0);
    }
    let mut sorted = quasi.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (j + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }
    quasi.mapv(|x| (x - theta).max(0.0))
}
