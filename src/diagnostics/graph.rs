use crate::connectivity::ConnectivityOptions;
use crate::graph::{CandidateSearch, OrientedForest, ParticleGraph, RootSelection};
use serde::Serialize;

/// Outcome of the adjacency graph construction.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStage {
    pub elapsed_ms: f64,
    pub particles: usize,
    pub candidate_pairs: usize,
    pub edges: usize,
    pub candidate_search: CandidateSearch,
    pub thresholds: ConnectivityOptions,
}

impl GraphStage {
    pub fn new(
        graph: &ParticleGraph,
        candidate_search: CandidateSearch,
        thresholds: ConnectivityOptions,
        elapsed_ms: f64,
    ) -> Self {
        Self {
            elapsed_ms,
            particles: graph.node_count(),
            candidate_pairs: graph.candidate_pairs(),
            edges: graph.edge_count(),
            candidate_search,
            thresholds,
        }
    }
}

/// Shape of the oriented spanning forest.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestStage {
    pub elapsed_ms: f64,
    pub trees: usize,
    pub singletons: usize,
    pub largest_tree: usize,
    pub tree_edges: usize,
    pub max_depth: usize,
    pub root_selection: RootSelection,
}

impl ForestStage {
    pub fn new(forest: &OrientedForest, root_selection: RootSelection, elapsed_ms: f64) -> Self {
        let max_depth = (0..forest.node_count())
            .filter(|&n| forest.children(n).is_empty())
            .map(|n| forest.depth(n))
            .max()
            .unwrap_or(0);
        Self {
            elapsed_ms,
            trees: forest.trees().len(),
            singletons: forest.singleton_count(),
            largest_tree: forest.largest_tree(),
            tree_edges: forest.edge_count(),
            max_depth,
            root_selection,
        }
    }
}
