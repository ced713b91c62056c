/*!
# CP Analyzer

Clock-period analysis of a circuit: the delta value of a vertex is the
longest accumulated combinational delay reaching it through register-free
interconnects, and the clock period is the largest delta.

The zero-weight subgraph of a valid circuit is a DAG (W2 condition), so
delta values follow from one pass over a topological order of that
subgraph: `delta(v) = d(v) + max delta(u)` over zero-weight in-edges
`(u, v)`, or plain `d(v)` when there are none. The traversal is Kahn's
algorithm with the ready queue seeded and drained in ascending vertex key
order, which fixes the traversal order across runs.
*/

use std::collections::VecDeque;
use tracing::debug;

use crate::core::error::RetimeError;
use crate::core::types::CircuitGraph;

/// Computes the delta array, indexed by vertex key.
///
/// Accepts any circuit with non-negative weights, in particular retimed
/// circuits produced by a legal retiming.
///
/// # Errors
///
/// `RetimeError::InvalidInput` if the zero-weight subgraph contains a
/// cycle; the input violates the W2 condition, which checked construction
/// would have refused.
pub fn delta(graph: &CircuitGraph) -> Result<Vec<i64>, RetimeError> {
    let n = graph.node_count();
    let delays = graph.delays();

    let mut zero_out: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut zero_in_degree = vec![0usize; n];
    for (u, v, w) in graph.edges() {
        if w == 0 {
            zero_out[u.index()].push(v.index());
            zero_in_degree[v.index()] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&v| zero_in_degree[v] == 0).collect();
    let mut delta = delays.clone();
    let mut drained = 0usize;
    while let Some(u) = queue.pop_front() {
        drained += 1;
        for &v in &zero_out[u] {
            if delta[u] + delays[v] > delta[v] {
                delta[v] = delta[u] + delays[v];
            }
            zero_in_degree[v] -= 1;
            if zero_in_degree[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    if drained < n {
        return Err(RetimeError::invalid_input(
            "zero-weight subgraph contains a cycle; circuit violates W2",
        ));
    }
    Ok(delta)
}

/// Computes the clock period `max_v delta(v)`.
///
/// # Example
///
/// ```rust
/// use retime::core::cp::clock_period;
/// use retime::core::types::CircuitGraph;
///
/// let graph = CircuitGraph::new(
///     &[0, 3, 3, 7],
///     &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
///     &[2, 0, 0, 0, 0],
/// )
/// .unwrap();
///
/// assert_eq!(clock_period(&graph).unwrap(), 13);
/// ```
pub fn clock_period(graph: &CircuitGraph) -> Result<i64, RetimeError> {
    let period = delta(graph)?
        .into_iter()
        .max()
        .ok_or_else(|| RetimeError::invalid_input("circuit has no vertices"))?;
    debug!(period, "computed clock period");
    Ok(period)
}
