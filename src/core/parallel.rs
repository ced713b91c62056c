/*!
# Parallel WD

The per-source searches of the WD analyzer are independent, so the
all-pairs computation parallelizes by fanning sources out over a rayon
pool. Rows are collected in source order before assembly, so the matrices
are identical to the sequential [`wd`](crate::core::wd::wd) output.
*/

use rayon::prelude::*;
use tracing::debug;

use crate::core::types::CircuitGraph;
use crate::core::wd::{WdMatrices, assemble, lex_shortest_paths};

/// Computes the `W` and `D` matrices with one rayon task per source vertex.
///
/// Produces bit-identical results to the sequential analyzer; prefer it
/// for circuits with hundreds of vertices and more.
pub fn par_wd(graph: &CircuitGraph) -> WdMatrices {
    let n = graph.node_count();
    debug!(vertices = n, "computing W and D matrices in parallel");
    let delays = graph.delays();
    let rows: Vec<_> = (0..n)
        .into_par_iter()
        .map(|source| lex_shortest_paths(graph, source, &delays))
        .collect();
    assemble(&rows, &delays)
}
