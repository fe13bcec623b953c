use super::emission::EmissionTable;
use super::kde::{Atlas, KdeOptions, KernelDensityEstimator};
use super::transition::{TransitionMode, TransitionTable};
use crate::io::ParameterFileReport;
use crate::particles::Particle;
use crate::types::{ChestType, LabelScores};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Knobs of the probability model.
///
/// - `kde`: kernel density estimation settings.
/// - `transition_mode`: how transition entries are turned into likelihoods.
/// - `unseen_transition`: likelihood of a label pair with no stored entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub kde: KdeOptions,
    pub transition_mode: TransitionMode,
    pub unseen_transition: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            kde: KdeOptions::default(),
            transition_mode: TransitionMode::Combined,
            unseen_transition: 0.0,
        }
    }
}

/// Immutable emission/transition model used during inference.
pub struct ProbabilityModel {
    emission_stats: EmissionTable,
    transitions: TransitionTable,
    kde: KernelDensityEstimator,
    options: ModelOptions,
    parameter_files: Vec<ParameterFileReport>,
}

impl ProbabilityModel {
    pub fn builder(options: ModelOptions) -> ProbabilityModelBuilder {
        ProbabilityModelBuilder {
            options,
            emission_stats: EmissionTable::new(),
            transitions: TransitionTable::new(),
            atlases: Vec::new(),
            parameter_files: Vec::new(),
        }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn emission_stats(&self) -> &EmissionTable {
        &self.emission_stats
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// How each loaded parameter file was parsed.
    pub fn parameter_files(&self) -> &[ParameterFileReport] {
        &self.parameter_files
    }

    pub fn atlas_count(&self) -> usize {
        self.kde.atlas_count()
    }

    pub fn atlas_particle_count(&self) -> usize {
        self.kde.atlas_particle_count()
    }

    /// Emission scores of every state for `particle`.
    ///
    /// Without atlases every generation scores 1.0, leaving the decision to
    /// the transition terms. The reject state always scores 0 here.
    pub fn emission_scores(&self, particle: &Particle) -> LabelScores {
        if self.kde.atlas_count() == 0 {
            LabelScores::uniform(1.0)
        } else {
            self.kde.estimate(particle)
        }
    }

    pub fn emission_likelihood(&self, particle: &Particle, label: ChestType) -> f64 {
        self.emission_scores(particle).get(label)
    }

    /// Transition likelihood for a parent labeled `from` and a child labeled
    /// `to`, observed with `scale_diff` (child − parent) and branch angle.
    ///
    /// Uniform (1.0) when the model holds no transition information at all,
    /// so an atlas-only model labels every node from its emission.
    pub fn transition_likelihood(
        &self,
        from: ChestType,
        to: ChestType,
        scale_diff: f64,
        angle_deg: f64,
    ) -> f64 {
        if !self.has_transitions() {
            return 1.0;
        }
        self.transitions
            .likelihood(self.options.transition_mode, from, to, scale_diff, angle_deg)
            .unwrap_or(self.options.unseen_transition)
    }

    pub fn has_transitions(&self) -> bool {
        self.transitions.probability_count() > 0 || self.transitions.stats_count() > 0
    }
}

/// Populates a [`ProbabilityModel`] before it is frozen.
pub struct ProbabilityModelBuilder {
    options: ModelOptions,
    emission_stats: EmissionTable,
    transitions: TransitionTable,
    atlases: Vec<Atlas>,
    parameter_files: Vec<ParameterFileReport>,
}

impl ProbabilityModelBuilder {
    /// Overlay emission statistics; later calls override earlier entries.
    pub fn emission_stats(mut self, table: &EmissionTable) -> Self {
        self.emission_stats.merge(table);
        self
    }

    /// Overlay transition probabilities and/or statistics.
    pub fn transitions(mut self, table: &TransitionTable) -> Self {
        self.transitions.merge(table);
        self
    }

    pub fn atlas(mut self, atlas: Atlas) -> Self {
        self.atlases.push(atlas);
        self
    }

    pub fn atlases(mut self, atlases: impl IntoIterator<Item = Atlas>) -> Self {
        self.atlases.extend(atlases);
        self
    }

    pub fn parameter_file(mut self, report: ParameterFileReport) -> Self {
        self.parameter_files.push(report);
        self
    }

    pub fn build(self) -> ProbabilityModel {
        if self.atlases.is_empty() {
            warn!("no atlases supplied; emission likelihoods are uniform");
        }
        if self.transitions.probability_count() == 0 && self.transitions.stats_count() == 0 {
            warn!("no transition information supplied; transition likelihoods are uniform");
        }
        self.transitions.log_row_sums();
        let kde =
            KernelDensityEstimator::new(self.atlases, &self.options.kde, &self.emission_stats);
        debug!(
            "ProbabilityModel atlases={} atlas_particles={} emission_entries={} transition_probs={} transition_stats={}",
            kde.atlas_count(),
            kde.atlas_particle_count(),
            self.emission_stats.len(),
            self.transitions.probability_count(),
            self.transitions.stats_count()
        );
        ProbabilityModel {
            emission_stats: self.emission_stats,
            transitions: self.transitions,
            kde,
            options: self.options,
            parameter_files: self.parameter_files,
        }
    }
}
