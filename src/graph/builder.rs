use super::spatial::SpatialGrid;
use super::{CandidateSearch, GraphOptions};
use crate::connectivity::{ConnectivityEvaluator, ConnectivityOptions, PairGeometry};
use crate::particles::ParticleSet;
use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Undirected edge payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleEdge {
    pub geometry: PairGeometry,
    pub weight: f64,
}

/// Undirected adjacency graph; node `k` is particle `k`.
#[derive(Clone, Debug)]
pub struct ParticleGraph {
    graph: UnGraph<(), ParticleEdge>,
    candidate_pairs: usize,
}

impl ParticleGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of pairs handed to the connectivity test.
    pub fn candidate_pairs(&self) -> usize {
        self.candidate_pairs
    }

    /// Edges as `(i, j, edge)` with `i < j`, in insertion (ascending) order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &ParticleEdge)> + '_ {
        self.graph.edge_references().map(|e| {
            let (a, b) = (e.source().index(), e.target().index());
            (a.min(b), a.max(b), e.weight())
        })
    }

    /// Neighbours of particle `i`, ascending.
    pub fn neighbors(&self, i: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(i))
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn contains_edge(&self, i: usize, j: usize) -> bool {
        self.graph
            .find_edge(NodeIndex::new(i), NodeIndex::new(j))
            .is_some()
    }

    pub fn inner(&self) -> &UnGraph<(), ParticleEdge> {
        &self.graph
    }
}

/// Build the adjacency graph over `particles`.
pub fn build_graph(
    particles: &ParticleSet,
    connectivity: &ConnectivityOptions,
    options: &GraphOptions,
) -> ParticleGraph {
    let n = particles.len();
    let evaluator = ConnectivityEvaluator::new(particles, *connectivity);

    let grid = match options.effective_search(connectivity.particle_distance_threshold) {
        CandidateSearch::Grid => SpatialGrid::build(
            particles.iter().map(|p| &p.position),
            connectivity.particle_distance_threshold,
        ),
        CandidateSearch::Exhaustive => None,
    };
    let pairs: Vec<(usize, usize)> = match &grid {
        Some(grid) => grid.candidate_pairs(),
        None => (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect(),
    };
    debug!(
        "build_graph n={} candidates={} search={}",
        n,
        pairs.len(),
        if grid.is_some() { "grid" } else { "exhaustive" }
    );

    let mut graph: UnGraph<(), ParticleEdge> = UnGraph::with_capacity(n, pairs.len().min(8 * n));
    for _ in 0..n {
        graph.add_node(());
    }
    for &(i, j) in &pairs {
        if let Ok(geometry) = evaluator.evaluate(i, j) {
            graph.add_edge(
                NodeIndex::new(i),
                NodeIndex::new(j),
                ParticleEdge {
                    weight: geometry.weight(),
                    geometry,
                },
            );
        }
    }

    ParticleGraph {
        graph,
        candidate_pairs: pairs.len(),
    }
}
