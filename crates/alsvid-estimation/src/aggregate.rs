//! Expectation values from grouped measurement counts.

use alsvid_ir::Counts;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EstimationError, EstimationResult};
use crate::preprocess::GroupedOperators;

/// Estimated expectation value and its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostprocessOutput {
    pub expval: f64,
    pub stds: f64,
}

/// Combine per-group counts into an expectation value.
///
/// `counts[g]` must be the result of running group `g`'s circuit. For each
/// diagonal label the parity of the bits under its `Z` positions gives a
/// ±1 outcome; its mean `e` contributes `e * coefficient` to the estimate
/// and `sqrt(1 - e^2) * |coefficient|` to the spread. The summed spread is
/// divided by the square root of the shot count.
pub fn aggregate(
    counts: &[Counts],
    operators: &GroupedOperators,
) -> EstimationResult<PostprocessOutput> {
    let shots = validate(counts, operators)?;

    let mut expval = Complex64::new(0.0, 0.0);
    let mut std = Complex64::new(0.0, 0.0);
    for ((group_counts, labels), coefficients) in counts
        .iter()
        .zip(operators.labels())
        .zip(operators.coefficients())
    {
        for (label, &coefficient) in labels.iter().zip(coefficients) {
            let e = diagonal_expectation(group_counts, label, shots)?;
            let variance = (1.0 - e * e).max(0.0);
            expval += Complex64::new(e, 0.0) * coefficient;
            std += Complex64::new(variance.sqrt(), 0.0) * coefficient.abs();
        }
    }
    std /= (shots as f64).sqrt();

    debug!(
        num_groups = counts.len(),
        shots,
        expval = expval.re,
        std = std.re,
        "Aggregated expectation value"
    );
    Ok(PostprocessOutput {
        expval: expval.re,
        stds: std.re,
    })
}

/// [`aggregate`] with the grouped operators in their JSON form.
pub fn postprocess(
    counts: &[Counts],
    grouped_operators: &str,
) -> EstimationResult<PostprocessOutput> {
    let operators = GroupedOperators::from_json(grouped_operators)?;
    aggregate(counts, &operators)
}

/// Shared shot count of all groups.
fn validate(counts: &[Counts], operators: &GroupedOperators) -> EstimationResult<u64> {
    let invalid = |message: String| Err(EstimationError::InvalidCounts(message));

    if operators.labels().len() != operators.coefficients().len() {
        return invalid(format!(
            "{} label groups but {} coefficient groups",
            operators.labels().len(),
            operators.coefficients().len()
        ));
    }
    if operators.num_groups() == 0 {
        return invalid("no measurement groups".into());
    }
    if counts.len() != operators.num_groups() {
        return invalid(format!(
            "{} count sets for {} groups",
            counts.len(),
            operators.num_groups()
        ));
    }

    let total = |g: usize, group_counts: &Counts| {
        group_counts.try_shots().ok_or_else(|| {
            EstimationError::InvalidCounts(format!("group {g} total shots overflow u64"))
        })
    };
    let shots = total(0, &counts[0])?;
    for (g, (group_counts, (labels, coefficients))) in counts
        .iter()
        .zip(operators.labels().iter().zip(operators.coefficients()))
        .enumerate()
    {
        if labels.len() != coefficients.len() {
            return invalid(format!(
                "group {g} has {} labels but {} coefficients",
                labels.len(),
                coefficients.len()
            ));
        }
        let group_shots = total(g, group_counts)?;
        if group_shots == 0 {
            return invalid(format!("group {g} has no shots"));
        }
        if group_shots != shots {
            return invalid(format!(
                "group {g} has {group_shots} shots, group 0 has {shots}"
            ));
        }
    }
    Ok(shots)
}

/// Mean of the ±1 parity of `label`'s `Z` positions over `counts`, which
/// hold `shots` shots in total.
///
/// Only the first space-separated field of each bitstring is read, aligned
/// right so that the last label character meets the last bit.
fn diagonal_expectation(counts: &Counts, label: &str, shots: u64) -> EstimationResult<f64> {
    let mask: Vec<bool> = label.chars().rev().map(|c| c != 'I').collect();
    let mut total = 0i128;
    for (bitstring, &count) in counts {
        let field = bitstring.split_whitespace().next().unwrap_or("").as_bytes();
        if field.iter().any(|b| !matches!(b, b'0' | b'1')) {
            return Err(EstimationError::InvalidCounts(format!(
                "'{bitstring}' is not a bitstring"
            )));
        }
        if field.len() < mask.len() {
            return Err(EstimationError::InvalidCounts(format!(
                "'{bitstring}' is narrower than label '{label}'"
            )));
        }
        let odd = mask
            .iter()
            .enumerate()
            .filter(|&(k, &z)| z && field[field.len() - 1 - k] == b'1')
            .count()
            % 2
            == 1;
        let count = i128::from(count);
        total += if odd { -count } else { count };
    }
    Ok(total as f64 / shots as f64)
}
