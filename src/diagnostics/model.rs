use crate::io::ParameterFileReport;
use crate::model::{ProbabilityModel, TransitionMode};
use serde::Serialize;

/// What the probability model was built from.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStage {
    pub atlases: usize,
    pub atlas_particles: usize,
    pub emission_entries: usize,
    pub transition_probabilities: usize,
    pub transition_stats: usize,
    pub transition_mode: TransitionMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameter_files: Vec<ParameterFileReport>,
}

impl ModelStage {
    pub fn from_model(model: &ProbabilityModel) -> Self {
        Self {
            atlases: model.atlas_count(),
            atlas_particles: model.atlas_particle_count(),
            emission_entries: model.emission_stats().len(),
            transition_probabilities: model.transitions().probability_count(),
            transition_stats: model.transitions().stats_count(),
            transition_mode: model.options().transition_mode,
            parameter_files: model.parameter_files().to_vec(),
        }
    }
}
