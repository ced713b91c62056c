/*!
# WD Analyzer

Computes the Leiserson–Saxe matrices over all ordered vertex pairs:

- **W(u, v)**: the minimum total register count over directed `u -> v`
  paths (`W(u, u) = 0`).
- **D(u, v)**: the maximum total propagation delay over the `u -> v` paths
  that achieve `W(u, v)` (`D(u, u) = d(u)`).

Every edge `(u, v)` carries the composite cost `(w(u, v), -d(u))`; costs
add component-wise along a path and compare lexicographically, so the
minimum `u -> v` path cost is `(W(u, v), -(D(u, v) - d(v)))`. The per-source
search is the usual lazy-deletion binary-heap loop over these pair labels.
Zero-register edges have a lexicographically negative cost component, so a
vertex's label can still improve after it has been popped; improved labels
are re-pushed and stale heap entries skipped. The W2 condition rules out
lexicographically negative cycles, which bounds the re-relaxation.

Unreachable pairs hold the [`UNREACHABLE`] sentinel in both matrices and
never enter the candidate period set.
*/

use nalgebra::DMatrix;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::debug;

use crate::core::types::{CircuitGraph, NodeId};

/// Sentinel stored in `W` and `D` for pairs with no connecting path.
pub const UNREACHABLE: i64 = i64::MAX;

/// Pair label carried by the per-source search: accumulated register count
/// and negated accumulated tail delay. Derived `Ord` is the lexicographic
/// path-cost order.
type Label = (i64, i64);

/// Dense `|V| x |V|` register-count and delay matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct WdMatrices {
    /// Minimum register counts; `UNREACHABLE` where no path exists.
    pub w: DMatrix<i64>,
    /// Maximum delays over register-minimum paths; `UNREACHABLE` where no
    /// path exists.
    pub d: DMatrix<i64>,
}

impl WdMatrices {
    /// True iff a directed path from vertex `u` to vertex `v` exists.
    pub fn is_reachable(&self, u: usize, v: usize) -> bool {
        self.w[(u, v)] != UNREACHABLE
    }

    /// Returns the sorted distinct finite values of `D`, the search
    /// domain for the minimum feasible clock period.
    pub fn candidate_periods(&self) -> Vec<i64> {
        let mut periods: Vec<i64> = self.d.iter().copied().filter(|&x| x != UNREACHABLE).collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

/// Computes the `W` and `D` matrices of a circuit.
///
/// The circuit must satisfy the W2 condition; checked construction
/// enforces it. On a zero-weight cycle the search would not terminate.
///
/// # Complexity
///
/// - **Time:** O(V * (E + V log V)) plus re-relaxation along zero-register
///   chains.
/// - **Space:** O(V^2)
///
/// # Example
///
/// ```rust
/// use retime::core::types::CircuitGraph;
/// use retime::core::wd::wd;
///
/// let graph = CircuitGraph::new(
///     &[0, 3, 3, 7],
///     &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
///     &[2, 0, 0, 0, 0],
/// )
/// .unwrap();
///
/// let matrices = wd(&graph);
/// assert_eq!(matrices.w[(0, 3)], 2);
/// // Both zero-register 1 -> 3 routes exist; D reports the slower one.
/// assert_eq!(matrices.d[(1, 3)], 13);
/// ```
pub fn wd(graph: &CircuitGraph) -> WdMatrices {
    let n = graph.node_count();
    debug!(vertices = n, "computing W and D matrices");
    let delays = graph.delays();
    let rows: Vec<Vec<Option<Label>>> = (0..n)
        .map(|source| lex_shortest_paths(graph, source, &delays))
        .collect();
    assemble(&rows, &delays)
}

/// Builds the dense matrices from per-source label rows.
pub(crate) fn assemble(rows: &[Vec<Option<Label>>], delays: &[i64]) -> WdMatrices {
    let n = delays.len();
    let mut w = DMatrix::from_element(n, n, UNREACHABLE);
    let mut d = DMatrix::from_element(n, n, UNREACHABLE);
    for (u, row) in rows.iter().enumerate() {
        for (v, label) in row.iter().enumerate() {
            if let Some((registers, neg_delay)) = label {
                w[(u, v)] = *registers;
                d[(u, v)] = delays[v] - neg_delay;
            }
        }
    }
    WdMatrices { w, d }
}

/// Single-source shortest paths under the lexicographic composite cost.
/// Returns one label per vertex key, `None` for unreachable vertices.
pub(crate) fn lex_shortest_paths(
    graph: &CircuitGraph,
    source: usize,
    delays: &[i64],
) -> Vec<Option<Label>> {
    let n = graph.node_count();
    let mut dist: Vec<Option<Label>> = vec![None; n];
    let mut heap: BinaryHeap<Reverse<(Label, usize)>> = BinaryHeap::new();

    dist[source] = Some((0, 0));
    heap.push(Reverse(((0, 0), source)));

    while let Some(Reverse((label, u))) = heap.pop() {
        if let Some(current) = dist[u] {
            if label > current {
                continue;
            }
        }
        let tail_delay = delays[u];
        for (v, w) in graph.out_edges(NodeId::from_index(u)) {
            let v = v.index();
            let next = (label.0 + w, label.1 - tail_delay);
            if dist[v].is_none() || Some(next) < dist[v] {
                dist[v] = Some(next);
                heap.push(Reverse((next, v)));
            }
        }
    }
    dist
}
