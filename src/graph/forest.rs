use super::{ParticleGraph, RootSelection};
use crate::particles::ParticleSet;
use log::debug;
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// One connected component, rooted and listed in breadth-first order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RootedTree {
    pub root: usize,
    /// Every node of the tree, root first; a parent always precedes its
    /// children.
    pub order: Vec<usize>,
}

impl RootedTree {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.order.len() == 1
    }
}

/// Spanning forest with every tree edge directed away from its root.
#[derive(Clone, Debug)]
pub struct OrientedForest {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    trees: Vec<RootedTree>,
    tree_of: Vec<usize>,
}

impl OrientedForest {
    pub fn node_count(&self) -> usize {
        self.parents.len()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents[node]
    }

    /// Children of `node`, ascending particle index.
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    pub fn trees(&self) -> &[RootedTree] {
        &self.trees
    }

    /// Index into [`OrientedForest::trees`] of the tree holding `node`.
    pub fn tree_of(&self, node: usize) -> usize {
        self.tree_of[node]
    }

    /// Directed `(parent, child)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter_map(|(child, p)| p.map(|parent| (parent, child)))
    }

    pub fn edge_count(&self) -> usize {
        self.parents.iter().filter(|p| p.is_some()).count()
    }

    pub fn singleton_count(&self) -> usize {
        self.trees.iter().filter(|t| t.is_singleton()).count()
    }

    pub fn largest_tree(&self) -> usize {
        self.trees.iter().map(RootedTree::len).max().unwrap_or(0)
    }

    /// Number of edges between `node` and its tree root.
    pub fn depth(&self, node: usize) -> usize {
        let mut depth = 0;
        let mut cur = node;
        while let Some(p) = self.parents[cur] {
            depth += 1;
            cur = p;
        }
        depth
    }
}

/// Derive the oriented spanning forest of `graph`.
///
/// Kruskal keeps an edge only when it joins two different union-find sets,
/// so the result is acyclic by construction. Equal weights are resolved by
/// the `(i, j)` particle indices, making the forest fully deterministic.
pub fn build_forest(
    graph: &ParticleGraph,
    particles: &ParticleSet,
    root_selection: RootSelection,
) -> OrientedForest {
    let n = graph.node_count();

    let mut edges: Vec<(f64, usize, usize)> =
        graph.edges().map(|(i, j, e)| (e.weight, i, j)).collect();
    edges.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut sets: UnionFind<usize> = UnionFind::new(n);
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(_, i, j) in &edges {
        if sets.union(i, j) {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
    }
    for list in &mut adjacency {
        list.sort_unstable();
    }

    // Components in order of their lowest particle index.
    let mut component_index: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for node in 0..n {
        let rep = sets.find(node);
        let idx = *component_index.entry(rep).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[idx].push(node);
    }

    let mut parents: Vec<Option<usize>> = vec![None; n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut tree_of: Vec<usize> = vec![0; n];
    let mut visited = vec![false; n];
    let mut trees = Vec::with_capacity(components.len());

    for (tree_idx, members) in components.iter().enumerate() {
        let root = select_root(members, particles, root_selection);
        let mut order = Vec::with_capacity(members.len());
        let mut queue = VecDeque::from([root]);
        visited[root] = true;
        while let Some(node) = queue.pop_front() {
            order.push(node);
            tree_of[node] = tree_idx;
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    parents[next] = Some(node);
                    children[node].push(next);
                    queue.push_back(next);
                }
            }
        }
        trees.push(RootedTree { root, order });
    }

    let forest = OrientedForest {
        parents,
        children,
        trees,
        tree_of,
    };
    debug!(
        "build_forest n={} graph_edges={} tree_edges={} trees={} singletons={} largest={}",
        n,
        graph.edge_count(),
        forest.edge_count(),
        forest.trees.len(),
        forest.singleton_count(),
        forest.largest_tree()
    );
    forest
}

fn select_root(members: &[usize], particles: &ParticleSet, selection: RootSelection) -> usize {
    match selection {
        RootSelection::LowestIndex => members[0],
        RootSelection::LargestScale => {
            let mut best = members[0];
            for &m in &members[1..] {
                if particles.scale(m) > particles.scale(best) {
                    best = m;
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityOptions;
    use crate::graph::{build_graph, GraphOptions};
    use crate::particles::Particle;

    fn forest_for(set: &ParticleSet, selection: RootSelection) -> OrientedForest {
        let graph = build_graph(set, &ConnectivityOptions::default(), &GraphOptions::default());
        build_forest(&graph, set, selection)
    }

    fn assert_acyclic(forest: &OrientedForest) {
        let n = forest.node_count();
        for node in 0..n {
            // Walking up must reach a root in fewer than n steps.
            let mut cur = node;
            let mut steps = 0;
            while let Some(p) = forest.parent(cur) {
                cur = p;
                steps += 1;
                assert!(steps < n, "cycle detected starting from {node}");
            }
            assert_eq!(forest.trees()[forest.tree_of(node)].root, cur);
        }
    }

    #[test]
    fn chain_becomes_single_rooted_tree() {
        let set: ParticleSet = (0..8)
            .map(|k| Particle::new([0.0, 0.0, k as f64], 4.0 - 0.1 * k as f64, [0.0, 0.0, 1.0]))
            .collect();
        let forest = forest_for(&set, RootSelection::LargestScale);
        assert_eq!(forest.trees().len(), 1);
        assert_eq!(forest.trees()[0].root, 0);
        assert_eq!(forest.edge_count(), 7);
        // the MST of a straight chain keeps only unit-distance links
        for k in 1..8 {
            assert_eq!(forest.parent(k), Some(k - 1));
        }
        assert_eq!(forest.depth(7), 7);
        assert_acyclic(&forest);
    }

    #[test]
    fn root_selection_changes_orientation() {
        let set: ParticleSet = (0..5)
            .map(|k| Particle::new([0.0, 0.0, k as f64], 1.0 + 0.1 * k as f64, [0.0, 0.0, 1.0]))
            .collect();
        let widest = forest_for(&set, RootSelection::LargestScale);
        assert_eq!(widest.trees()[0].root, 4);
        assert_eq!(widest.parent(3), Some(4));
        let lowest = forest_for(&set, RootSelection::LowestIndex);
        assert_eq!(lowest.trees()[0].root, 0);
        assert_eq!(lowest.parent(3), Some(2));
    }

    #[test]
    fn isolated_particles_become_singleton_trees() {
        let set: ParticleSet = (0..4)
            .map(|k| Particle::new([k as f64 * 10.0, 0.0, 0.0], 1.0, [1.0, 0.0, 0.0]))
            .collect();
        let forest = forest_for(&set, RootSelection::LargestScale);
        assert_eq!(forest.trees().len(), 4);
        assert_eq!(forest.singleton_count(), 4);
        assert_eq!(forest.edge_count(), 0);
        let roots: Vec<usize> = forest.trees().iter().map(|t| t.root).collect();
        assert_eq!(roots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn dense_cluster_yields_spanning_tree() {
        // A tight blob produces many cycles in the graph; the forest must not.
        let set: ParticleSet = (0..30)
            .map(|k| {
                let t = k as f64;
                Particle::new(
                    [(t * 0.9).sin() * 0.8, (t * 0.5).cos() * 0.8, t * 0.05],
                    2.0,
                    [0.3, 0.3, 1.0],
                )
            })
            .collect();
        let graph = build_graph(
            &set,
            &ConnectivityOptions {
                particle_angle_threshold_deg: 90.0,
                ..Default::default()
            },
            &GraphOptions::default(),
        );
        assert!(graph.edge_count() > set.len(), "expected a cyclic graph");
        let forest = build_forest(&graph, &set, RootSelection::LowestIndex);
        assert_eq!(forest.edge_count() + forest.trees().len(), set.len());
        for (parent, child) in forest.edges() {
            assert!(graph.contains_edge(parent, child));
        }
        assert_acyclic(&forest);
    }

    #[test]
    fn two_chains_give_two_trees() {
        let mut particles: Vec<Particle> = (0..4)
            .map(|k| Particle::new([0.0, 0.0, k as f64], 2.0, [0.0, 0.0, 1.0]))
            .collect();
        particles.extend(
            (0..3).map(|k| Particle::new([20.0, 0.0, k as f64], 3.0, [0.0, 0.0, 1.0])),
        );
        let set = ParticleSet::new(particles);
        let forest = forest_for(&set, RootSelection::LargestScale);
        assert_eq!(forest.trees().len(), 2);
        assert_eq!(forest.trees()[0].order.len(), 4);
        assert_eq!(forest.trees()[1].root, 4);
        assert_eq!(forest.tree_of(6), 1);
    }
}
