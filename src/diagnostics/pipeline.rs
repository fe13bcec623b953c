use crate::diagnostics::{ForestStage, GraphStage, InferenceStage, ModelStage, TimingBreakdown};
use crate::hmm::Labeling;
use serde::Serialize;

/// Result produced by
/// [`AirwayLabeler::process_with_diagnostics`](crate::AirwayLabeler::process_with_diagnostics).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelingReport {
    #[serde(skip)]
    pub labeling: Labeling,
    pub trace: PipelineTrace,
}

/// End-to-end trace of one labeling run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub graph: GraphStage,
    pub forest: ForestStage,
    pub model: ModelStage,
    pub inference: InferenceStage,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub particles: usize,
    /// Particles carrying a reference `ChestType` in the input dataset.
    pub with_reference_labels: bool,
}

impl PipelineTrace {
    /// Human-readable summary used by the command-line tools.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Graph: particles={} candidates={} edges={} ({:.3} ms)",
                self.graph.particles,
                self.graph.candidate_pairs,
                self.graph.edges,
                self.graph.elapsed_ms
            ),
            format!(
                "Forest: trees={} singletons={} largest={} max_depth={} ({:.3} ms)",
                self.forest.trees,
                self.forest.singletons,
                self.forest.largest_tree,
                self.forest.max_depth,
                self.forest.elapsed_ms
            ),
            format!(
                "Model: atlases={} atlas_particles={} emission={} transition_p={} transition_stats={}",
                self.model.atlases,
                self.model.atlas_particles,
                self.model.emission_entries,
                self.model.transition_probabilities,
                self.model.transition_stats
            ),
            format!(
                "Inference: labeled={} undefined={} ({:.3} ms)",
                self.inference.labeled, self.inference.undefined, self.inference.elapsed_ms
            ),
        ];
        for entry in &self.inference.label_counts {
            lines.push(format!("  {}: {}", entry.name, entry.count));
        }
        lines.push(format!("Total: {:.3} ms", self.timings.total_ms));
        lines.join("\n")
    }
}
