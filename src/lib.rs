#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod labeler;
pub mod model;
pub mod particles;
pub mod types;

// Stage internals and tool glue – public, but expect changes.
pub mod angle;
pub mod config;
pub mod connectivity;
pub mod evaluation;
pub mod graph;
pub mod hmm;
pub mod io;
pub mod synthetic;

// --- High-level re-exports -------------------------------------------------

// Main entry points: labeler + results.
pub use crate::error::{LabelError, Result};
pub use crate::hmm::Labeling;
pub use crate::labeler::{AirwayLabeler, LabelerParams};
pub use crate::model::ProbabilityModel;
pub use crate::types::ChestType;

// High-level diagnostics returned by the labeler.
pub use crate::diagnostics::{LabelingReport, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use airway_labeler::prelude::*;
///
/// # fn main() -> airway_labeler::Result<()> {
/// let dataset = load_dataset(std::path::Path::new("particles.json"))?;
/// let particles = ParticleSet::from_dataset(&dataset)?;
/// let labeler = AirwayLabeler::new(LabelerParams::default())?;
/// let model = labeler.model_builder().build();
/// let report = labeler.process_with_diagnostics(&particles, &model);
/// println!("{}", report.trace.summary());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::model::Atlas;
    pub use crate::particles::io::load_dataset;
    pub use crate::particles::{Particle, ParticleSet};
    pub use crate::{AirwayLabeler, ChestType, LabelerParams, Labeling, ProbabilityModel};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::graph::{build_forest, build_graph, OrientedForest, ParticleGraph};
    pub use crate::hmm::{infer_labels, InferenceOptions};

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        ForestStage, GraphStage, InferenceStage, InputDescriptor, LabelCount, LabelingStage,
        ModelStage, StageTiming, TimingBreakdown,
    };
}
