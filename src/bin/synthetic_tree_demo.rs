use airway_labeler::config::synthetic::{load_config, SyntheticDemoConfig};
use airway_labeler::evaluation::ConfusionMatrix;
use airway_labeler::model::Atlas;
use airway_labeler::particles::io::write_json_file;
use airway_labeler::synthetic::{chain_transitions, synthetic_airway, translated, unlabeled};
use airway_labeler::{AirwayLabeler, LabelError};
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), LabelError> {
    let config = match env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => SyntheticDemoConfig::default(),
    };

    let reference = synthetic_airway(&config.tree);
    let atlas = translated(&reference, config.atlas_offset);
    let particles = unlabeled(&reference);
    println!(
        "Synthetic tree: {} generations, {} particles",
        config.tree.generations,
        particles.len()
    );

    let labeler = AirwayLabeler::new(config.params)?;
    let model = labeler
        .model_builder()
        .atlas(Atlas::new(atlas))
        .transitions(&chain_transitions(config.stay_probability))
        .build();
    let report = labeler.process_with_diagnostics(&particles, &model);
    println!("{}", report.trace.summary());

    let truth: Vec<_> = reference.iter().map(|p| p.chest_type).collect();
    let matrix = ConfusionMatrix::from_labels(&truth, &report.labeling.labels)?;
    print!("{}", matrix.render_text());
    if let Some(acc) = matrix.accuracy() {
        println!("Accuracy: {acc:.4}");
    }

    if let Some(path) = &config.json_report {
        write_json_file(path, &report)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}
