mod common;

use airway_labeler::config::labeler::load_config;
use airway_labeler::diagnostics::ModelStage;
use airway_labeler::io::{ParseStatus, Truncation};
use airway_labeler::model::TransitionMode;
use airway_labeler::particles::io::write_json_file;
use airway_labeler::synthetic::unlabeled;
use airway_labeler::{AirwayLabeler, ChestType, LabelError};
use common::synthetic_airway::{reference_tree, scratch_dir};
use std::fs;
use std::path::Path;

fn gen(g: usize) -> ChestType {
    ChestType::generation(g).unwrap()
}

fn transition_grid() -> String {
    (0..11)
        .map(|f| {
            (0..11)
                .map(|t| match (f, t) {
                    (10, 10) => "1".to_string(),
                    _ if t == f => "0.75".to_string(),
                    _ if t == f + 1 => "0.25".to_string(),
                    _ => "0".to_string(),
                })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_parameter_files(dir: &Path) {
    let emission = "name,scaleDiffMean,scaleDiffStd,distanceMean,distanceStd,angleMean,angleStd,sampleCount\n\
                    AIRWAYGENERATION0,0.0,0.6,0.0,2.0,0.0,15.0,500\n\
                    AIRWAYGENERATION1,0.0,0.5,0.0,2.0,0.0,15.0,400\n\
                    AIRWAYGENERATION2,0.0,0.4,0.0,2.0,0.0,15.0,300\n\
                    AIRWAYGENERATIONX,0.0,0.4,0.0,2.0,0.0,15.0,300\n\
                    AIRWAYGENERATION3,0.0,0.3,0.0,2.0,0.0,15.0,200\n";
    fs::write(dir.join("emission.csv"), emission).unwrap();
    fs::write(dir.join("transitions.csv"), transition_grid()).unwrap();
    let stats = "from,to,scaleDiffMean,scaleDiffStd,angleMean,angleStd,sampleCount\n\
                 AIRWAYGENERATION0,AIRWAYGENERATION1,-1.6,0.4,35,10,120\n\
                 AIRWAYGENERATION1,AIRWAYGENERATION2,-1.3,0.4,35,10,4\n";
    fs::write(dir.join("transition_stats.csv"), stats).unwrap();
}

fn write_config(dir: &Path, transition_mode: &str) -> std::path::PathBuf {
    let config = format!(
        r#"{{
            "input_path": "input.json",
            "atlases": ["atlas.json"],
            "parameter_files": {{
                "emission_stats": "emission.csv",
                "transition_probabilities": "transitions.csv",
                "transition_stats": "transition_stats.csv"
            }},
            "params": {{ "model": {{ "transition_mode": "{transition_mode}" }} }},
            "output": {{ "labeled_dataset": "out/labeled.json" }}
        }}"#
    );
    let path = dir.join("run.json");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn configured_files_populate_the_model() {
    common::init_logging();
    let dir = scratch_dir("model_files");
    write_parameter_files(&dir);
    let reference = reference_tree();
    write_json_file(&dir.join("atlas.json"), &reference.to_dataset()).unwrap();
    write_json_file(&dir.join("input.json"), &unlabeled(&reference).to_dataset()).unwrap();

    let config = load_config(&write_config(&dir, "direct")).unwrap();
    let labeler = AirwayLabeler::new(config.params).unwrap();
    let model = config.load_model(labeler.model_builder()).unwrap();

    // Emission parsing stops at the unknown name on line 5.
    assert_eq!(model.emission_stats().len(), 3);
    assert!(model.emission_stats().get(gen(3)).is_none());

    // Direct mode reproduces the grid values regardless of observations.
    assert_eq!(model.options().transition_mode, TransitionMode::Direct);
    assert_eq!(model.transition_likelihood(gen(2), gen(2), 5.0, 80.0), 0.75);
    assert_eq!(model.transition_likelihood(gen(2), gen(3), 0.0, 0.0), 0.25);
    assert_eq!(model.transition_likelihood(gen(2), gen(7), 0.0, 0.0), 0.0);
    assert_eq!(model.transition_likelihood(gen(10), gen(10), 0.0, 0.0), 1.0);

    // Low-support statistics are skipped.
    assert!(model.transitions().stats(gen(0), gen(1)).is_some());
    assert!(model.transitions().stats(gen(1), gen(2)).is_none());

    let stage = ModelStage::from_model(&model);
    assert_eq!(stage.atlases, 1);
    assert_eq!(stage.atlas_particles, reference.len());
    assert_eq!(stage.transition_probabilities, 121);
    assert_eq!(stage.transition_stats, 1);
    let kinds: Vec<&str> = stage.parameter_files.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec!["emission_stats", "transition_probabilities", "transition_stats"]
    );
    assert_eq!(
        stage.parameter_files[0].status,
        ParseStatus::Truncated(Truncation::UnknownType {
            line: 5,
            name: "AIRWAYGENERATIONX".to_string()
        })
    );
    assert!(stage.parameter_files[1].status.is_complete());
    assert_eq!(stage.parameter_files[2].skipped, 1);

    let particles = airway_labeler::particles::ParticleSet::from_dataset(
        &airway_labeler::particles::io::load_dataset(&config.input_path).unwrap(),
    )
    .unwrap();
    let labeling = labeler.process(&particles, &model);
    assert_eq!(labeling.labels[0], gen(0));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn unlabeled_atlas_is_rejected() {
    let dir = scratch_dir("model_files_atlas");
    write_parameter_files(&dir);
    let mut atlas = unlabeled(&reference_tree()).to_dataset();
    atlas.fields.remove("ChestType");
    write_json_file(&dir.join("atlas.json"), &atlas).unwrap();

    let config = load_config(&write_config(&dir, "combined")).unwrap();
    let labeler = AirwayLabeler::new(config.params).unwrap();
    let err = config.load_model(labeler.model_builder()).err().unwrap();
    assert!(
        matches!(err, LabelError::MissingAtlasLabels { index: 0, .. }),
        "unexpected error: {err}"
    );
    fs::remove_dir_all(&dir).ok();
}
