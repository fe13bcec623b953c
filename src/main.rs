use airway_labeler::config::labeler as labeler_config;
use airway_labeler::evaluation::ConfusionMatrix;
use airway_labeler::particles::io::{attach_labels, load_dataset, write_json_file};
use airway_labeler::particles::ParticleSet;
use airway_labeler::{AirwayLabeler, ChestType, LabelError};
use log::warn;
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
    let program = env::args()
        .next()
        .unwrap_or_else(|| "airway-labeler".to_string());
    let config = labeler_config::parse_cli(&program)?;

    let dataset = load_dataset(&config.input_path)?;
    let particles = ParticleSet::from_dataset(&dataset)?;

    let labeler = AirwayLabeler::new(config.params)?;
    let model = config.load_model(labeler.model_builder())?;
    let report = labeler.process_with_diagnostics(&particles, &model);

    let labeled = attach_labels(&dataset, &report.labeling.labels)?;
    write_json_file(&config.output.labeled_dataset, &labeled)?;
    println!(
        "Labeled dataset written to {}",
        config.output.labeled_dataset.display()
    );

    println!("{}", report.trace.summary());

    if let Some(path) = &config.output.json_report {
        write_json_file(path, &report)?;
        println!("JSON report written to {}", path.display());
    }

    if config.output.dice {
        let reference = dataset.chest_types();
        print_dice(
            &config.input_path,
            reference.as_deref(),
            &report.labeling.labels,
        )?;
    }
    Ok(())
}

fn print_dice(
    input: &Path,
    reference: Option<&[ChestType]>,
    predicted: &[ChestType],
) -> Result<(), LabelError> {
    let Some(reference) = reference else {
        warn!("{} carries no ChestType labels; skipping Dice", input.display());
        return Ok(());
    };
    let matrix = ConfusionMatrix::from_labels(reference, predicted)?;
    print!("{}", matrix.render_text());
    if let Some(acc) = matrix.accuracy() {
        println!("Accuracy: {acc:.4}");
    }
    Ok(())
}
