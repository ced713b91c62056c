/*!
# Circuit Graph Model

This module defines `CircuitGraph`, the directed multigraph model of a
synchronous sequential circuit. Vertices are combinational functional
elements carrying a non-negative propagation delay; edges are interconnects
carrying a non-negative register count (the edge "weight"). The struct
wraps petgraph's `StableGraph` and exposes a read-only accessor surface:
a `CircuitGraph` is immutable after construction.

Vertices are keyed by their position in the construction arrays, so
`NodeId::index()` recovers the original key and vertex iteration is always
in ascending key order.

# Examples

```rust
use retime::core::types::CircuitGraph;

// The 4-vertex example circuit: delays per vertex, (tail, head) edges,
// registers per edge.
let graph = CircuitGraph::new(
    &[0, 3, 3, 7],
    &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
    &[2, 0, 0, 0, 0],
)
.unwrap();

assert_eq!(graph.node_count(), 4);
assert_eq!(graph.edge_count(), 5);
assert_eq!(graph.delay(graph.node_id(3).unwrap()), Some(7));
```
*/

use petgraph::Directed;
use petgraph::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::StableGraph as PetGraph;
use petgraph::visit::{IntoEdgeReferences, IntoNodeReferences};
use std::collections::VecDeque;

use crate::core::error::RetimeError;

/// Wrapper for `NodeIndex` identifying a functional element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) NodeIndex);

impl NodeId {
    /// Returns the vertex key (the position in the construction arrays).
    pub fn index(&self) -> usize {
        self.0.index()
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(NodeIndex::new(index))
    }
}

/// Wrapper for `EdgeIndex` identifying an interconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) EdgeIndex);

impl EdgeId {
    /// Returns the edge key (the position in the construction arrays).
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

/// Options for checked circuit construction.
///
/// `check_zero_cycles` controls the scan for directed cycles of total
/// register count zero (the W2 condition). The scan is linear here because
/// with non-negative weights such a cycle must lie entirely inside the
/// zero-weight subgraph, but callers constructing circuits that are
/// positive-cycle-free by design (e.g. unit-weight generators) may still
/// skip it.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Scan for zero-weight cycles during construction. Default `true`.
    pub check_zero_cycles: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            check_zero_cycles: true,
        }
    }
}

/// Directed multigraph of a synchronous circuit.
///
/// Node attribute: propagation delay `d(v) >= 0`. Edge attribute: register
/// count `w(e) >= 0`. Parallel edges are kept as separate edges with their
/// own weights. Immutable after construction.
#[derive(Debug, Clone)]
pub struct CircuitGraph {
    inner: PetGraph<i64, i64, Directed>,
}

impl CircuitGraph {
    /// Builds a circuit with default options (zero-weight-cycle check on).
    ///
    /// `delays[k]` is the propagation delay of vertex `k`; `edges[k]` is a
    /// `(tail, head)` pair of vertex keys and `weights[k]` its register
    /// count.
    ///
    /// # Errors
    ///
    /// `RetimeError::InvalidInput` on length mismatch, an out-of-range
    /// endpoint, a negative delay or weight, a circuit with no registered
    /// edge, a self-loop without registers, or a zero-weight cycle.
    pub fn new(
        delays: &[i64],
        edges: &[(usize, usize)],
        weights: &[i64],
    ) -> Result<Self, RetimeError> {
        Self::with_options(delays, edges, weights, BuildOptions::default())
    }

    /// Builds a circuit with explicit options.
    pub fn with_options(
        delays: &[i64],
        edges: &[(usize, usize)],
        weights: &[i64],
        options: BuildOptions,
    ) -> Result<Self, RetimeError> {
        if delays.is_empty() {
            return Err(RetimeError::invalid_input(
                "circuit must have at least one vertex",
            ));
        }
        if edges.len() != weights.len() {
            return Err(RetimeError::invalid_input(format!(
                "{} edges but {} weights",
                edges.len(),
                weights.len()
            )));
        }
        if let Some(k) = delays.iter().position(|&d| d < 0) {
            return Err(RetimeError::invalid_input(format!(
                "negative delay {} at vertex {}",
                delays[k], k
            )));
        }
        if let Some(k) = weights.iter().position(|&w| w < 0) {
            return Err(RetimeError::invalid_input(format!(
                "negative register count {} on edge {}",
                weights[k], k
            )));
        }
        let n = delays.len();
        for (k, &(u, v)) in edges.iter().enumerate() {
            if u >= n || v >= n {
                return Err(RetimeError::invalid_input(format!(
                    "edge {} ({}, {}) references a vertex outside 0..{}",
                    k, u, v, n
                )));
            }
            if u == v && weights[k] == 0 {
                return Err(RetimeError::invalid_input(format!(
                    "self-loop without registers at vertex {}",
                    u
                )));
            }
        }
        if !weights.iter().any(|&w| w > 0) {
            return Err(RetimeError::invalid_input(
                "circuit must have at least one registered edge",
            ));
        }

        let triples: Vec<(usize, usize, i64)> = edges
            .iter()
            .zip(weights)
            .map(|(&(u, v), &w)| (u, v, w))
            .collect();
        let graph = Self::from_parts(delays.to_vec(), &triples);

        if options.check_zero_cycles && graph.has_zero_weight_cycle() {
            return Err(RetimeError::invalid_input(
                "detected a directed cycle with zero total register count",
            ));
        }
        Ok(graph)
    }

    /// Assembles a graph without validation. Used internally by the
    /// retiming applier, whose outputs may carry negative weights when the
    /// retiming is illegal.
    pub(crate) fn from_parts(delays: Vec<i64>, triples: &[(usize, usize, i64)]) -> Self {
        let mut inner = PetGraph::with_capacity(delays.len(), triples.len());
        let ids: Vec<NodeIndex> = delays.into_iter().map(|d| inner.add_node(d)).collect();
        for &(u, v, w) in triples {
            inner.add_edge(ids[u], ids[v], w);
        }
        Self { inner }
    }

    /// Returns the number of vertices.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Returns the number of edges (parallel edges counted separately).
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Returns the id of the vertex with the given key, if it exists.
    pub fn node_id(&self, key: usize) -> Option<NodeId> {
        let id = NodeId::from_index(key);
        self.inner.node_weight(id.0).map(|_| id)
    }

    /// Returns the propagation delay of a vertex.
    pub fn delay(&self, node: NodeId) -> Option<i64> {
        self.inner.node_weight(node.0).copied()
    }

    /// Returns the register count of an edge.
    pub fn weight(&self, edge: EdgeId) -> Option<i64> {
        self.inner.edge_weight(edge.0).copied()
    }

    /// Iterates over vertex ids in ascending key order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.node_indices().map(NodeId)
    }

    /// Iterates over `(id, delay)` pairs in ascending key order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, i64)> + '_ {
        self.inner
            .node_references()
            .map(|(idx, delay)| (NodeId(idx), *delay))
    }

    /// Iterates over `(tail, head, weight)` triples in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, i64)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (NodeId(e.source()), NodeId(e.target()), *e.weight()))
    }

    /// Iterates over edge ids in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.inner.edge_references().map(|e| EdgeId(e.id()))
    }

    /// Returns the `(tail, head)` endpoints of an edge.
    pub fn endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.inner
            .edge_endpoints(edge.0)
            .map(|(u, v)| (NodeId(u), NodeId(v)))
    }

    /// Iterates over outgoing edges of `node` as `(head, weight)`.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = (NodeId, i64)> + '_ {
        self.inner
            .edges_directed(node.0, Direction::Outgoing)
            .map(|e| (NodeId(e.target()), *e.weight()))
    }

    /// Iterates over incoming edges of `node` as `(tail, weight)`.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = (NodeId, i64)> + '_ {
        self.inner
            .edges_directed(node.0, Direction::Incoming)
            .map(|e| (NodeId(e.source()), *e.weight()))
    }

    /// Returns the vertex delays as a vector indexed by key.
    pub fn delays(&self) -> Vec<i64> {
        self.inner
            .node_references()
            .map(|(_, delay)| *delay)
            .collect()
    }

    /// Returns the sum of all vertex delays.
    pub fn total_delay(&self) -> i64 {
        self.inner.node_references().map(|(_, d)| *d).sum()
    }

    /// True iff the subgraph of zero-weight edges contains a directed
    /// cycle. With all weights non-negative this is exactly the violation
    /// of the W2 condition (a cycle of total weight zero).
    pub(crate) fn has_zero_weight_cycle(&self) -> bool {
        let n = self.node_count();
        let mut zero_out: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut zero_in_degree = vec![0usize; n];
        for (u, v, w) in self.edges() {
            if w == 0 {
                zero_out[u.index()].push(v.index());
                zero_in_degree[v.index()] += 1;
            }
        }
        let mut queue: VecDeque<usize> = (0..n).filter(|&v| zero_in_degree[v] == 0).collect();
        let mut drained = 0usize;
        while let Some(u) = queue.pop_front() {
            drained += 1;
            for &v in &zero_out[u] {
                zero_in_degree[v] -= 1;
                if zero_in_degree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        drained < n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlator() -> CircuitGraph {
        CircuitGraph::new(
            &[0, 3, 3, 3, 3, 7, 7, 7],
            &[
                (0, 1),
                (1, 2),
                (1, 7),
                (2, 3),
                (2, 6),
                (3, 4),
                (3, 5),
                (4, 5),
                (5, 6),
                (6, 7),
                (7, 0),
            ],
            &[1, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_construction_and_accessors() {
        let g = correlator();
        assert_eq!(g.node_count(), 8);
        assert_eq!(g.edge_count(), 11);
        assert_eq!(g.delay(g.node_id(5).unwrap()), Some(7));
        assert_eq!(g.total_delay(), 33);
        assert_eq!(g.delays(), vec![0, 3, 3, 3, 3, 7, 7, 7]);

        let keys: Vec<usize> = g.node_ids().map(|v| v.index()).collect();
        assert_eq!(keys, (0..8).collect::<Vec<_>>());

        // Edge iteration follows insertion order.
        let first: Vec<(usize, usize, i64)> = g
            .edges()
            .take(3)
            .map(|(u, v, w)| (u.index(), v.index(), w))
            .collect();
        assert_eq!(first, vec![(0, 1, 1), (1, 2, 1), (1, 7, 0)]);
    }

    #[test]
    fn test_edge_id_lookup() {
        let g = correlator();
        let ids: Vec<EdgeId> = g.edge_ids().collect();
        assert_eq!(ids.len(), 11);
        assert_eq!(g.weight(ids[2]), Some(0));
        let (u, v) = g.endpoints(ids[2]).unwrap();
        assert_eq!((u.index(), v.index()), (1, 7));
    }

    #[test]
    fn test_neighbor_iteration() {
        let g = correlator();
        let v1 = g.node_id(1).unwrap();
        let mut out: Vec<usize> = g.out_edges(v1).map(|(v, _)| v.index()).collect();
        out.sort_unstable();
        assert_eq!(out, vec![2, 7]);

        let v5 = g.node_id(5).unwrap();
        let mut tails: Vec<usize> = g.in_edges(v5).map(|(u, _)| u.index()).collect();
        tails.sort_unstable();
        assert_eq!(tails, vec![3, 4]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = CircuitGraph::new(&[1, 1], &[(0, 1)], &[1, 2]).unwrap_err();
        assert!(matches!(err, RetimeError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(CircuitGraph::new(&[1, -2], &[(0, 1)], &[1]).is_err());
        assert!(CircuitGraph::new(&[1, 2], &[(0, 1)], &[-1]).is_err());
    }

    #[test]
    fn test_out_of_range_endpoint_rejected() {
        assert!(CircuitGraph::new(&[1, 2], &[(0, 5)], &[1]).is_err());
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        assert!(CircuitGraph::new(&[1, 2], &[(0, 1)], &[0]).is_err());
    }

    #[test]
    fn test_zero_weight_self_loop_rejected() {
        let err = CircuitGraph::new(&[1, 2], &[(0, 0), (0, 1)], &[0, 1]).unwrap_err();
        assert!(matches!(err, RetimeError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_weight_cycle_detected() {
        // 0 -> 1 -> 0 with no registers on the cycle; a third registered
        // edge satisfies the some-positive-weight requirement.
        let err =
            CircuitGraph::new(&[1, 1, 1], &[(0, 1), (1, 0), (1, 2)], &[0, 0, 3]).unwrap_err();
        assert!(matches!(err, RetimeError::InvalidInput(_)));
    }

    #[test]
    fn test_unchecked_construction_skips_cycle_scan() {
        let options = BuildOptions {
            check_zero_cycles: false,
        };
        let g = CircuitGraph::with_options(
            &[1, 1, 1],
            &[(0, 1), (1, 0), (1, 2)],
            &[0, 0, 3],
            options,
        )
        .unwrap();
        assert!(g.has_zero_weight_cycle());
    }

    #[test]
    fn test_parallel_edges_kept_separate() {
        let g = CircuitGraph::new(&[1, 2], &[(0, 1), (0, 1)], &[1, 3]).unwrap();
        assert_eq!(g.edge_count(), 2);
        let mut weights: Vec<i64> = g.edges().map(|(_, _, w)| w).collect();
        weights.sort_unstable();
        assert_eq!(weights, vec![1, 3]);
    }

    #[test]
    fn test_registered_self_loop_allowed() {
        let g = CircuitGraph::new(&[4], &[(0, 0)], &[2]).unwrap();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 1);
    }
}
