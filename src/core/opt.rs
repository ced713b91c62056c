/*!
# Optimal Retiming

The two Leiserson–Saxe clock-period minimizers and their shared
binary-search driver.

Both drivers collect the distinct finite values of the `D` matrix as the
candidate clock periods and binary-search for the smallest feasible one;
they differ in the feasibility oracle:

- **OPT1**: [`feasible_by_constraints`]: encodes legality and period
  constraints as difference inequalities, solves them as single-source
  shortest paths on a constraint graph with Bellman–Ford, and reads the
  retiming off the distance labels. A negative-weight cycle certifies
  infeasibility.
- **OPT2**: [`feas`]: the FEAS relaxation. Starting from the zero
  retiming, `|V| - 1` rounds each recompute the delta array of the current
  retimed circuit and increment the lag of every vertex whose delta
  exceeds the target.

Infeasibility of a single target period is a normal result (`None`), not
an error; only the drivers turn a completed search into a reported optimum.
*/

use tracing::debug;

use crate::core::cp::{clock_period, delta};
use crate::core::error::RetimeError;
use crate::core::retiming::apply_retiming;
use crate::core::types::CircuitGraph;
use crate::core::wd::{UNREACHABLE, WdMatrices, wd};

/// Result of a clock-period minimization.
#[derive(Debug, Clone)]
pub struct RetimingSolution {
    /// The retimed circuit `G_r`.
    pub graph: CircuitGraph,
    /// The retiming that produced it, indexed by vertex key.
    pub retiming: Vec<i64>,
    /// The minimum feasible clock period.
    pub period: i64,
}

/// Decides whether a legal retiming with clock period at most `period`
/// exists, by constraint solving. Returns the retiming, or `None` when the
/// constraint system has no solution.
///
/// The constraint graph has one vertex per circuit vertex plus a
/// super-source. Every circuit edge `(u, v)` contributes an edge `v -> u`
/// of weight `w(u, v)` (legality: `r(u) - r(v) <= w(u, v)`); every ordered
/// pair with finite `W(u, v)` and `D(u, v) > period` contributes an edge
/// `v -> u` of weight `W(u, v) - 1` (period: `r(u) - r(v) <= W(u, v) - 1`);
/// the super-source reaches every vertex with weight 0. Parallel
/// constraint edges are all kept; relaxation settles on the tightest.
pub fn feasible_by_constraints(
    graph: &CircuitGraph,
    period: i64,
    matrices: &WdMatrices,
) -> Option<Vec<i64>> {
    let n = graph.node_count();
    let source = n;

    let mut constraints: Vec<(usize, usize, i64)> =
        Vec::with_capacity(graph.edge_count() + n * n + n);
    for (u, v, w) in graph.edges() {
        constraints.push((v.index(), u.index(), w));
    }
    for u in 0..n {
        for v in 0..n {
            let w = matrices.w[(u, v)];
            if w != UNREACHABLE && matrices.d[(u, v)] > period {
                constraints.push((v, u, w - 1));
            }
        }
    }
    for v in 0..n {
        constraints.push((source, v, 0));
    }

    // Bellman-Ford from the super-source over the constraint edge list.
    let mut dist = vec![i64::MAX; n + 1];
    dist[source] = 0;
    for _ in 0..n {
        let mut updated = false;
        for &(a, b, w) in &constraints {
            if dist[a] != i64::MAX && dist[a] + w < dist[b] {
                dist[b] = dist[a] + w;
                updated = true;
            }
        }
        if !updated {
            break;
        }
    }
    for &(a, b, w) in &constraints {
        if dist[a] != i64::MAX && dist[a] + w < dist[b] {
            debug!(period, "constraint system has a negative cycle");
            return None;
        }
    }
    debug!(period, "constraint system is satisfiable");
    Some(dist[..n].to_vec())
}

/// The FEAS relaxation: decides whether a legal retiming with clock period
/// at most `period` exists, returning it or `None`.
///
/// `|V| - 1` rounds of: retime with the current lags, compute deltas,
/// increment the lag of every vertex with `delta(v) > period`. The
/// acceptance check runs on a circuit rebuilt from the final lags; the
/// lags move after the last in-loop delta computation, so the last in-loop
/// circuit is stale.
///
/// # Errors
///
/// Propagates CP failures; these indicate an input violating W2.
pub fn feas(graph: &CircuitGraph, period: i64) -> Result<Option<Vec<i64>>, RetimeError> {
    let n = graph.node_count();
    let mut retiming = vec![0i64; n];
    for _ in 1..n {
        let retimed = apply_retiming(graph, &retiming)?;
        let deltas = delta(&retimed)?;
        for (lag, d) in retiming.iter_mut().zip(&deltas) {
            if *d > period {
                *lag += 1;
            }
        }
    }
    let retimed = apply_retiming(graph, &retiming)?;
    if clock_period(&retimed)? <= period {
        debug!(period, "FEAS found a feasible retiming");
        Ok(Some(retiming))
    } else {
        debug!(period, "FEAS found no feasible retiming");
        Ok(None)
    }
}

/// Left-biased binary search over the sorted candidate periods: remembers
/// the smallest candidate the oracle accepts.
fn search_minimum_period<F>(
    candidates: &[i64],
    mut oracle: F,
) -> Result<Option<(Vec<i64>, i64)>, RetimeError>
where
    F: FnMut(i64) -> Result<Option<Vec<i64>>, RetimeError>,
{
    let mut lo = 0isize;
    let mut hi = candidates.len() as isize - 1;
    let mut best = None;
    while lo <= hi {
        let mid = ((lo + hi) / 2) as usize;
        let period = candidates[mid];
        match oracle(period)? {
            Some(retiming) => {
                best = Some((retiming, period));
                hi = mid as isize - 1;
            }
            None => {
                lo = mid as isize + 1;
            }
        }
    }
    Ok(best)
}

fn minimize<F>(graph: &CircuitGraph, candidates: &[i64], oracle: F) -> Result<RetimingSolution, RetimeError>
where
    F: FnMut(i64) -> Result<Option<Vec<i64>>, RetimeError>,
{
    if candidates.is_empty() {
        return Err(RetimeError::invalid_input(
            "circuit has no finite delay pairs to search over",
        ));
    }
    let (retiming, period) = search_minimum_period(candidates, oracle)?.ok_or_else(|| {
        // The zero retiming is legal and achieves the clock period of the
        // input circuit, which is always among the candidates.
        RetimeError::internal("no candidate clock period was feasible")
    })?;
    debug!(period, "minimum achievable clock period found");
    let retimed = apply_retiming(graph, &retiming)?;
    Ok(RetimingSolution {
        graph: retimed,
        retiming,
        period,
    })
}

/// Minimizes the clock period with the constraint-graph oracle (OPT1).
///
/// # Example
///
/// ```rust
/// use retime::core::opt::opt1;
/// use retime::core::types::CircuitGraph;
///
/// let graph = CircuitGraph::new(
///     &[0, 3, 3, 7],
///     &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
///     &[2, 0, 0, 0, 0],
/// )
/// .unwrap();
///
/// let solution = opt1(&graph).unwrap();
/// assert_eq!(solution.period, 7);
/// ```
pub fn opt1(graph: &CircuitGraph) -> Result<RetimingSolution, RetimeError> {
    debug!("computing optimal retiming with OPT1");
    let matrices = wd(graph);
    let candidates = matrices.candidate_periods();
    minimize(graph, &candidates, |period| {
        Ok(feasible_by_constraints(graph, period, &matrices))
    })
}

/// Minimizes the clock period with the FEAS oracle (OPT2).
pub fn opt2(graph: &CircuitGraph) -> Result<RetimingSolution, RetimeError> {
    debug!("computing optimal retiming with OPT2");
    let matrices = wd(graph);
    let candidates = matrices.candidate_periods();
    minimize(graph, &candidates, |period| feas(graph, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retiming::is_legal;

    fn small() -> CircuitGraph {
        CircuitGraph::new(
            &[0, 3, 3, 7],
            &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
            &[2, 0, 0, 0, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_opt1_small() {
        let g = small();
        let solution = opt1(&g).unwrap();
        assert_eq!(solution.period, 7);
        assert!(is_legal(&g, &solution.retiming));
        assert_eq!(clock_period(&solution.graph).unwrap(), 7);
    }

    #[test]
    fn test_opt2_small() {
        let g = small();
        let solution = opt2(&g).unwrap();
        assert_eq!(solution.period, 7);
        assert!(is_legal(&g, &solution.retiming));
        assert_eq!(clock_period(&solution.graph).unwrap(), 7);
    }

    #[test]
    fn test_infeasible_target_both_oracles() {
        let g = small();
        let matrices = wd(&g);
        assert_eq!(feasible_by_constraints(&g, 2, &matrices), None);
        assert_eq!(feas(&g, 2).unwrap(), None);
    }

    #[test]
    fn test_input_period_always_feasible() {
        let g = small();
        let matrices = wd(&g);
        let period = clock_period(&g).unwrap();
        assert!(feasible_by_constraints(&g, period, &matrices).is_some());
        assert!(feas(&g, period).unwrap().is_some());
    }

    #[test]
    fn test_oracle_monotonicity() {
        // Once a candidate is feasible, every larger candidate is too.
        let g = small();
        let matrices = wd(&g);
        let mut seen_feasible = false;
        for c in matrices.candidate_periods() {
            let feasible = feasible_by_constraints(&g, c, &matrices).is_some();
            assert!(!seen_feasible || feasible, "oracle not monotone at c={}", c);
            seen_feasible |= feasible;
            assert_eq!(feas(&g, c).unwrap().is_some(), feasible);
        }
        assert!(seen_feasible);
    }

    #[test]
    fn test_single_vertex_circuit() {
        let g = CircuitGraph::new(&[4], &[(0, 0)], &[2]).unwrap();
        let solution = opt1(&g).unwrap();
        assert_eq!(solution.period, 4);
        let solution = opt2(&g).unwrap();
        assert_eq!(solution.period, 4);
    }
}
