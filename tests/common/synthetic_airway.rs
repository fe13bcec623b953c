use airway_labeler::evaluation::ConfusionMatrix;
use airway_labeler::model::Atlas;
use airway_labeler::particles::ParticleSet;
use airway_labeler::synthetic::{
    chain_transitions, synthetic_airway, translated, SyntheticTreeConfig,
};
use airway_labeler::{AirwayLabeler, ChestType, ProbabilityModel};
use std::path::PathBuf;

/// Four-generation tree: trachea scale 8, ×0.8 per generation, 35° branches,
/// 8 mm segments sampled every 1 mm.
pub fn reference_tree() -> ParticleSet {
    synthetic_airway(&SyntheticTreeConfig::default())
}

pub fn reference_labels(particles: &ParticleSet) -> Vec<ChestType> {
    particles.iter().map(|p| p.chest_type).collect()
}

/// Model whose only atlas is `reference` shifted by `offset`, with
/// P(g→g)=0.9 and P(g→g+1)=0.1.
pub fn shifted_atlas_model(
    labeler: &AirwayLabeler,
    reference: &ParticleSet,
    offset: [f64; 3],
) -> ProbabilityModel {
    labeler
        .model_builder()
        .atlas(Atlas::new(translated(reference, offset)))
        .transitions(&chain_transitions(0.9))
        .build()
}

pub fn accuracy(reference: &[ChestType], predicted: &[ChestType]) -> f64 {
    ConfusionMatrix::from_labels(reference, predicted)
        .expect("label counts match")
        .accuracy()
        .unwrap_or(0.0)
}

/// Fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("airway_labeler_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
