/*!
# Retiming Application

A retiming assigns an integer lag `r(v)` to every vertex; applying it moves
registers across vertices, replacing each edge weight by
`w_r(u, v) = w(u, v) + r(v) - r(u)`. Vertex set and delays are unchanged,
so the retimed circuit shares its combinational structure with the input.

A retiming is *legal* when every retimed weight is non-negative.
[`apply_retiming`] deliberately does not check legality: the feasibility
oracles probe candidate retimings whose legality is established elsewhere,
and tests exercise illegal ones on purpose. Use [`is_legal`] when the
question matters.
*/

use crate::core::error::RetimeError;
use crate::core::types::CircuitGraph;

/// Applies a retiming, producing the retimed circuit `G_r`.
///
/// `retiming[k]` is the lag of vertex `k`. Only the length of the slice is
/// validated; the output of an illegal retiming carries negative weights.
///
/// # Example
///
/// ```rust
/// use retime::core::retiming::apply_retiming;
/// use retime::core::types::CircuitGraph;
///
/// let graph = CircuitGraph::new(&[2, 5], &[(0, 1)], &[1]).unwrap();
/// let identity = apply_retiming(&graph, &[0, 0]).unwrap();
/// let shifted = apply_retiming(&graph, &[0, 1]).unwrap();
///
/// assert_eq!(identity.edges().next().unwrap().2, 1);
/// assert_eq!(shifted.edges().next().unwrap().2, 2);
/// ```
pub fn apply_retiming(graph: &CircuitGraph, retiming: &[i64]) -> Result<CircuitGraph, RetimeError> {
    if retiming.len() != graph.node_count() {
        return Err(RetimeError::invalid_input(format!(
            "retiming has {} entries for {} vertices",
            retiming.len(),
            graph.node_count()
        )));
    }
    let triples: Vec<(usize, usize, i64)> = graph
        .edges()
        .map(|(u, v, w)| {
            let (u, v) = (u.index(), v.index());
            (u, v, w + retiming[v] - retiming[u])
        })
        .collect();
    Ok(CircuitGraph::from_parts(graph.delays(), &triples))
}

/// True iff every retimed edge weight would be non-negative.
pub fn is_legal(graph: &CircuitGraph, retiming: &[i64]) -> bool {
    retiming.len() == graph.node_count()
        && graph
            .edges()
            .all(|(u, v, w)| w + retiming[v.index()] - retiming[u.index()] >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CircuitGraph {
        CircuitGraph::new(
            &[0, 3, 3, 7],
            &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
            &[2, 0, 0, 0, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_zero_retiming_is_identity() {
        let g = small();
        let retimed = apply_retiming(&g, &[0; 4]).unwrap();
        let before: Vec<_> = g.edges().map(|(u, v, w)| (u, v, w)).collect();
        let after: Vec<_> = retimed.edges().map(|(u, v, w)| (u, v, w)).collect();
        assert_eq!(before, after);
        assert_eq!(g.delays(), retimed.delays());
    }

    #[test]
    fn test_weight_arithmetic() {
        let g = small();
        let retimed = apply_retiming(&g, &[0, 1, 1, 1]).unwrap();
        let weights: Vec<i64> = retimed.edges().map(|(_, _, w)| w).collect();
        // (0,1): 2+1-0=3, (1,2): 0, (1,3): 0, (2,3): 0, (3,0): 0+0-1=-1
        assert_eq!(weights, vec![3, 0, 0, 0, -1]);
    }

    #[test]
    fn test_legality() {
        let g = small();
        assert!(is_legal(&g, &[0, 0, 0, 0]));
        assert!(!is_legal(&g, &[0, 1, 1, 1]));
        // Uniform shifts never change weights.
        assert!(is_legal(&g, &[5, 5, 5, 5]));
        // Wrong length is never legal.
        assert!(!is_legal(&g, &[0, 0, 0]));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let g = small();
        assert!(apply_retiming(&g, &[0, 0]).is_err());
    }
}
