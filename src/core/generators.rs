/*!
# Random Circuit Generator

Seeded generator of valid retiming instances, used by the property tests
and the benchmarks. Edges are sampled G(n, p) style; the optional
reverse-edge filter reproduces the ring topology of correlator circuits,
where every interconnect runs forward along the vertex ordering except the
single wrap-back into the host vertex.

Sampling can produce circuits that fail validation (no registered edge, a
zero-weight cycle under random weights), so the generator rejection-samples
against the checked constructor up to `max_attempts` times.
*/

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::core::error::RetimeError;
use crate::core::types::CircuitGraph;

/// Register-count sampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMode {
    /// Every edge carries exactly one register. No zero-weight cycle can
    /// exist, so generation succeeds on the first structurally valid draw.
    Positive,
    /// Register counts uniform in `[0, max_weight)`.
    Random {
        /// Exclusive upper bound; must be at least 2.
        max_weight: i64,
    },
}

/// Parameters for [`random_circuit`].
#[derive(Debug, Clone)]
pub struct RandomCircuitConfig {
    /// Number of vertices; must be at least 2.
    pub vertices: usize,
    /// Probability of each ordered vertex pair becoming an edge, in [0, 1].
    pub edge_probability: f64,
    /// Register-count sampling mode.
    pub weight_mode: WeightMode,
    /// Delays uniform in `[0, max_delay)`; must be at least 1. Vertex 0
    /// models the host interface and always gets delay 0.
    pub max_delay: i64,
    /// Keep only edges `(u, v)` with `u < v` plus the `(n-1, 0)` wrap-back,
    /// and drop `(0, n-1)`: the correlator ring topology.
    pub remove_reverse_edges: bool,
    /// RNG seed; equal seeds give equal circuits.
    pub seed: u64,
    /// Upper bound on rejection-sampling attempts.
    pub max_attempts: usize,
}

impl Default for RandomCircuitConfig {
    fn default() -> Self {
        Self {
            vertices: 10,
            edge_probability: 0.25,
            weight_mode: WeightMode::Positive,
            max_delay: 10,
            remove_reverse_edges: true,
            seed: 42,
            max_attempts: 100,
        }
    }
}

/// Generates a random valid circuit.
///
/// # Errors
///
/// `RetimeError::InvalidArgument` on out-of-range parameters or when no
/// draw passes validation within `max_attempts`.
pub fn random_circuit(config: &RandomCircuitConfig) -> Result<CircuitGraph, RetimeError> {
    let n = config.vertices;
    if n < 2 {
        return Err(RetimeError::invalid_argument(
            "random circuits need at least two vertices",
        ));
    }
    if !(0.0..=1.0).contains(&config.edge_probability) {
        return Err(RetimeError::invalid_argument(
            "edge probability must be in the range [0.0, 1.0]",
        ));
    }
    if config.max_delay < 1 {
        return Err(RetimeError::invalid_argument(
            "max_delay must be at least 1",
        ));
    }
    if let WeightMode::Random { max_weight } = config.weight_mode {
        if max_weight < 2 {
            return Err(RetimeError::invalid_argument(
                "max_weight must be at least 2 so a registered edge can be drawn",
            ));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    for attempt in 0..config.max_attempts {
        let mut edges = Vec::new();
        for u in 0..n {
            for v in 0..n {
                if u != v && rng.random_bool(config.edge_probability) {
                    edges.push((u, v));
                }
            }
        }
        if config.remove_reverse_edges {
            edges.retain(|&(u, v)| {
                (u < v && !(u == 0 && v == n - 1)) || (u == n - 1 && v == 0)
            });
        }

        let weights: Vec<i64> = match config.weight_mode {
            WeightMode::Positive => vec![1; edges.len()],
            WeightMode::Random { max_weight } => (0..edges.len())
                .map(|_| rng.random_range(0..max_weight))
                .collect(),
        };

        let mut delays: Vec<i64> = (0..n).map(|_| rng.random_range(0..config.max_delay)).collect();
        delays[0] = 0;

        match CircuitGraph::new(&delays, &edges, &weights) {
            Ok(graph) => {
                debug!(attempt, vertices = n, edges = graph.edge_count(), "random circuit generated");
                return Ok(graph);
            }
            Err(_) => continue,
        }
    }
    Err(RetimeError::invalid_argument(format!(
        "no valid circuit drawn within {} attempts",
        config.max_attempts
    )))
}
