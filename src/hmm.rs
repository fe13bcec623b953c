//! Greedy top-down HMM labeling over the oriented forest.
//!
//! States are the undefined (reject) type and the eleven airway generations.
//! Each tree is visited in breadth-first order so every parent is labeled
//! before its children. A root takes the label maximising its emission
//! score; any other node maximises `emission × transition(parent → label)`
//! where the transition is evaluated on the scale difference (child − parent)
//! and the folded angle between the two minor eigenvectors. A node left
//! undefined passes its nearest labeled ancestor's label on to its children,
//! so an undefined run never resets the branch to root scoring. Decisions
//! are final; nothing is revisited once a node is labeled.

use crate::angle::angle_between_dirless_deg;
use crate::graph::OrientedForest;
use crate::model::ProbabilityModel;
use crate::particles::ParticleSet;
use crate::types::{states, ChestType, LabelScores, STATE_COUNT};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Score of the undefined state at every node. With the default of 0 a
    /// node is only left undefined when every generation scores 0.
    pub reject_likelihood: f64,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            reject_likelihood: 0.0,
        }
    }
}

/// Labels chosen for every particle, indexed like the input set.
#[derive(Clone, Debug, PartialEq)]
pub struct Labeling {
    pub labels: Vec<ChestType>,
    /// Winning score per particle (unnormalised).
    pub scores: Vec<f64>,
}

impl Labeling {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of particles per state, indexed by [`ChestType::state_index`].
    pub fn counts(&self) -> [usize; STATE_COUNT] {
        let mut counts = [0usize; STATE_COUNT];
        for label in &self.labels {
            if let Some(s) = label.state_index() {
                counts[s] += 1;
            }
        }
        counts
    }

    pub fn count_of(&self, label: ChestType) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    pub fn undefined_count(&self) -> usize {
        self.count_of(ChestType::UNDEFINED)
    }
}

/// Label every particle of `particles` following the trees of `forest`.
pub fn infer_labels(
    forest: &OrientedForest,
    particles: &ParticleSet,
    model: &ProbabilityModel,
    options: &InferenceOptions,
) -> Labeling {
    let n = particles.len();
    let mut labels = vec![ChestType::UNDEFINED; n];
    let mut scores = vec![0.0; n];
    // Label each node hands down to its children: its own label, or the
    // nearest labeled ancestor's when it was left undefined.
    let mut context = vec![ChestType::UNDEFINED; n];

    for tree in forest.trees() {
        for &node in &tree.order {
            let emission = model.emission_scores(particles.get(node));
            let conditioning = forest
                .parent(node)
                .map(|p| (p, context[p]))
                .filter(|&(_, label)| label != ChestType::UNDEFINED);
            let mut combined = match conditioning {
                Some((p, label)) => transition_scores(particles, model, &emission, p, label, node),
                None => emission,
            };
            combined.set(ChestType::UNDEFINED, options.reject_likelihood);
            let (label, score) = combined.argmax();
            labels[node] = label;
            scores[node] = score;
            context[node] = match (label, conditioning) {
                (ChestType::UNDEFINED, Some((_, inherited))) => inherited,
                _ => label,
            };
        }
    }

    let labeling = Labeling { labels, scores };
    debug!(
        "infer_labels trees={} particles={} undefined={}",
        forest.trees().len(),
        n,
        labeling.undefined_count()
    );
    labeling
}

/// Emission scores weighted by the transition from `parent_label`, observed
/// on the edge between `parent` and `node`.
///
/// A degenerate eigenvector leaves the branch angle undefined; such a node
/// keeps its emission-only scores, exactly like a root.
fn transition_scores(
    particles: &ParticleSet,
    model: &ProbabilityModel,
    emission: &LabelScores,
    parent: usize,
    parent_label: ChestType,
    node: usize,
) -> LabelScores {
    let Some(angle) = angle_between_dirless_deg(particles.hevec2(parent), particles.hevec2(node))
    else {
        return *emission;
    };
    let scale_diff = particles.scale(node) - particles.scale(parent);
    let mut out = LabelScores::zeros();
    for label in states().filter(|l| l.is_generation()) {
        let t = model.transition_likelihood(parent_label, label, scale_diff, angle);
        out.set(label, emission.get(label) * t);
    }
    out
}
