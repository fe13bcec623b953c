//! Particle adjacency graph and the oriented spanning forest derived from it.
//!
//! Overview
//! - [`build_graph`] evaluates candidate particle pairs with the
//!   [`ConnectivityEvaluator`](crate::connectivity::ConnectivityEvaluator)
//!   and keeps accepted pairs as weighted undirected edges. Candidate pairs
//!   come from a uniform 3D grid whose cell size equals the distance
//!   threshold, so only the 27 neighbouring cells are visited per particle.
//! - [`build_forest`] runs Kruskal over the edge set (ties broken by particle
//!   index), picks one root per connected component and orients every tree
//!   edge away from it with a breadth-first walk.
//!
//! Disconnected components are expected (mucus plugs, missed detections);
//! a particle without edges becomes a single-node tree.

mod builder;
mod forest;
pub mod spatial;

pub use builder::{build_graph, ParticleEdge, ParticleGraph};
pub use forest::{build_forest, OrientedForest, RootedTree};

use serde::{Deserialize, Serialize};

/// How candidate pairs are enumerated before the connectivity test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSearch {
    /// Bounded-radius search through a uniform grid (falls back to
    /// `Exhaustive` when the distance threshold is not a positive finite value).
    Grid,
    /// Every unordered pair, O(N²).
    Exhaustive,
}

/// Deterministic root choice for each connected component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSelection {
    /// Widest particle of the component (trachea-proximal); ties go to the
    /// lowest particle index.
    LargestScale,
    /// Lowest particle index of the component.
    LowestIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub candidate_search: CandidateSearch,
    pub root_selection: RootSelection,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            candidate_search: CandidateSearch::Grid,
            root_selection: RootSelection::LargestScale,
        }
    }
}

impl GraphOptions {
    /// Search actually used for `distance_threshold`: the grid needs a
    /// positive finite cell size.
    pub fn effective_search(&self, distance_threshold: f64) -> CandidateSearch {
        match self.candidate_search {
            CandidateSearch::Grid if distance_threshold.is_finite() && distance_threshold > 0.0 => {
                CandidateSearch::Grid
            }
            _ => CandidateSearch::Exhaustive,
        }
    }
}
