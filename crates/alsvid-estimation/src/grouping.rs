//! Partitioning Pauli terms into simultaneously measurable groups.
//!
//! Terms in one group must commute qubit-wise, so a single basis change
//! diagonalizes all of them. Strategies are swappable through
//! [`GroupingStrategy`]; every partition a strategy returns is checked with
//! [`validate_grouping`] before it is used.

use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::{EstimationError, EstimationResult};
use crate::pauli::PauliString;

/// A way to partition terms into qubit-wise commuting groups.
pub trait GroupingStrategy: Send + Sync {
    /// Name used in configuration and error messages.
    fn name(&self) -> &'static str;

    /// Partition `terms` into groups of term indices.
    fn group(&self, terms: &[PauliString]) -> Vec<Vec<usize>>;
}

/// Greedy coloring of the non-commutation graph.
///
/// Two terms conflict when they do not commute qubit-wise. Terms are colored
/// in descending-degree order, ties broken by lower index, each taking the
/// smallest color none of its colored neighbours holds. Groups are returned
/// by color, with term indices ascending inside each group.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyColoring;

impl GroupingStrategy for GreedyColoring {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn group(&self, terms: &[PauliString]) -> Vec<Vec<usize>> {
        let graph = conflict_graph(terms);

        let mut order: Vec<NodeIndex> = graph.node_indices().collect();
        order.sort_by(|&a, &b| {
            let (da, db) = (graph.neighbors(a).count(), graph.neighbors(b).count());
            db.cmp(&da).then(a.index().cmp(&b.index()))
        });

        let mut colors: Vec<Option<usize>> = vec![None; terms.len()];
        let mut num_colors = 0;
        for node in order {
            let taken: Vec<usize> = graph
                .neighbors(node)
                .filter_map(|n| colors[n.index()])
                .collect();
            let color = (0..).find(|c| !taken.contains(c)).unwrap_or(num_colors);
            colors[node.index()] = Some(color);
            num_colors = num_colors.max(color + 1);
        }

        let mut groups = vec![Vec::new(); num_colors];
        for (term, color) in colors.into_iter().enumerate() {
            if let Some(color) = color {
                groups[color].push(term);
            }
        }
        groups
    }
}

/// One group per term, in term order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingletonGrouping;

impl GroupingStrategy for SingletonGrouping {
    fn name(&self) -> &'static str {
        "singleton"
    }

    fn group(&self, terms: &[PauliString]) -> Vec<Vec<usize>> {
        (0..terms.len()).map(|i| vec![i]).collect()
    }
}

/// Names accepted by [`strategy_by_name`].
pub const STRATEGY_NAMES: &[&str] = &["greedy", "singleton"];

/// Look up a built-in strategy by its configuration name.
pub fn strategy_by_name(name: &str) -> Option<Box<dyn GroupingStrategy>> {
    match name {
        "greedy" => Some(Box::new(GreedyColoring)),
        "singleton" => Some(Box::new(SingletonGrouping)),
        _ => None,
    }
}

/// Undirected graph with one node per term and an edge per conflicting pair.
fn conflict_graph(terms: &[PauliString]) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::with_capacity(terms.len(), 0);
    let nodes: Vec<NodeIndex> = (0..terms.len()).map(|i| graph.add_node(i)).collect();
    for i in 0..terms.len() {
        for j in (i + 1)..terms.len() {
            if !terms[i].commutes_qubitwise(&terms[j]) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    graph
}

/// Check that `groups` partitions `0..terms.len()` into non-empty,
/// qubit-wise commuting groups.
pub fn validate_grouping(
    strategy: &dyn GroupingStrategy,
    terms: &[PauliString],
    groups: &[Vec<usize>],
) -> EstimationResult<()> {
    let strategy = strategy.name();
    let invalid = |message: String| EstimationError::InvalidGrouping { strategy, message };

    let mut seen = vec![false; terms.len()];
    for (g, group) in groups.iter().enumerate() {
        if group.is_empty() {
            return Err(invalid(format!("group {g} is empty")));
        }
        for &term in group {
            match seen.get_mut(term) {
                None => return Err(invalid(format!("term index {term} is out of range"))),
                Some(true) => return Err(invalid(format!("term {term} is grouped twice"))),
                Some(slot) => *slot = true,
            }
        }
        for (a, &i) in group.iter().enumerate() {
            for &j in &group[a + 1..] {
                if !terms[i].commutes_qubitwise(&terms[j]) {
                    return Err(invalid(format!(
                        "terms {i} and {j} in group {g} do not commute qubit-wise"
                    )));
                }
            }
        }
    }
    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(invalid(format!("term {missing} is not grouped")));
    }
    Ok(())
}
