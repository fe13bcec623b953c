//! Labeler pipeline orchestrating graph construction, forest orientation and
//! HMM inference.
//!
//! Typical usage:
//! ```no_run
//! use airway_labeler::{AirwayLabeler, LabelerParams};
//! use airway_labeler::particles::ParticleSet;
//!
//! # fn example(particles: ParticleSet) -> airway_labeler::Result<()> {
//! let labeler = AirwayLabeler::new(LabelerParams::default())?;
//! let model = labeler.model_builder().build();
//! let labeling = labeler.process(&particles, &model);
//! println!("undefined: {}", labeling.undefined_count());
//! # Ok(())
//! # }
//! ```

// Stages
// - Graph: candidate pairs from the spatial grid, connectivity test per pair.
// - Forest: Kruskal spanning forest, one root per component, BFS orientation.
// - Inference: greedy top-down labeling against the probability model.
// - Reporting: stage records and timings for the diagnostics variant.

use super::params::LabelerParams;
use crate::diagnostics::{
    elapsed_ms, ForestStage, GraphStage, InferenceStage, InputDescriptor, LabelingReport,
    LabelingStage, ModelStage, PipelineTrace, TimingBreakdown,
};
use crate::error::Result;
use crate::graph::{build_forest, build_graph, OrientedForest, ParticleGraph};
use crate::hmm::{infer_labels, Labeling};
use crate::model::{ProbabilityModel, ProbabilityModelBuilder};
use crate::particles::ParticleSet;
use crate::types::ChestType;
use log::info;
use std::time::Instant;

/// Airway generation labeler with fixed parameters.
pub struct AirwayLabeler {
    params: LabelerParams,
}

impl AirwayLabeler {
    /// Create a labeler; invalid parameters are rejected up front.
    pub fn new(params: LabelerParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &LabelerParams {
        &self.params
    }

    /// Model builder preconfigured with this labeler's model options.
    pub fn model_builder(&self) -> ProbabilityModelBuilder {
        ProbabilityModel::builder(self.params.model)
    }

    pub fn build_graph(&self, particles: &ParticleSet) -> ParticleGraph {
        build_graph(particles, &self.params.connectivity, &self.params.graph)
    }

    pub fn build_forest(&self, graph: &ParticleGraph, particles: &ParticleSet) -> OrientedForest {
        build_forest(graph, particles, self.params.graph.root_selection)
    }

    /// Label `particles`; the result is indexed like the input.
    pub fn process(&self, particles: &ParticleSet, model: &ProbabilityModel) -> Labeling {
        let graph = self.build_graph(particles);
        let forest = self.build_forest(&graph, particles);
        infer_labels(&forest, particles, model, &self.params.inference)
    }

    /// Run the full pipeline and capture per-stage diagnostics.
    pub fn process_with_diagnostics(
        &self,
        particles: &ParticleSet,
        model: &ProbabilityModel,
    ) -> LabelingReport {
        let total_start = Instant::now();

        let graph_start = Instant::now();
        let graph = self.build_graph(particles);
        let graph_ms = elapsed_ms(graph_start);

        let forest_start = Instant::now();
        let forest = self.build_forest(&graph, particles);
        let forest_ms = elapsed_ms(forest_start);

        let inference_start = Instant::now();
        let labeling = infer_labels(&forest, particles, model, &self.params.inference);
        let inference_ms = elapsed_ms(inference_start);

        let mut timings = TimingBreakdown::with_total(elapsed_ms(total_start));
        timings.record(LabelingStage::Graph, graph_ms);
        timings.record(LabelingStage::Forest, forest_ms);
        timings.record(LabelingStage::Inference, inference_ms);

        let connectivity = self.params.connectivity;
        let search = self
            .params
            .graph
            .effective_search(connectivity.particle_distance_threshold);
        let trace = PipelineTrace {
            input: InputDescriptor {
                particles: particles.len(),
                with_reference_labels: particles
                    .iter()
                    .any(|p| p.chest_type != ChestType::UNDEFINED),
            },
            timings,
            graph: GraphStage::new(&graph, search, connectivity, graph_ms),
            forest: ForestStage::new(&forest, self.params.graph.root_selection, forest_ms),
            model: ModelStage::from_model(model),
            inference: InferenceStage::new(&labeling, inference_ms),
        };
        info!(
            "labeled {} particles in {} trees ({} undefined) in {:.3} ms",
            particles.len(),
            trace.forest.trees,
            trace.inference.undefined,
            trace.timings.total_ms
        );
        LabelingReport { labeling, trace }
    }
}
