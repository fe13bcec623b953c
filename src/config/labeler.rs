use super::{load_json, resolve};
use crate::error::{LabelError, Result};
use crate::io::{load_emission_stats, load_transition_probabilities, load_transition_stats};
use crate::model::{Atlas, ProbabilityModel, ProbabilityModelBuilder};
use crate::particles::io::load_dataset;
use crate::LabelerParams;
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParameterFiles {
    pub emission_stats: Option<PathBuf>,
    pub transition_probabilities: Option<PathBuf>,
    pub transition_stats: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Labeled particle dataset.
    pub labeled_dataset: PathBuf,
    /// Optional JSON diagnostics report.
    #[serde(default)]
    pub json_report: Option<PathBuf>,
    /// Print per-label Dice and the confusion matrix against the input's
    /// own `ChestType` labels.
    #[serde(default)]
    pub dice: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    pub output: OutputConfig,
    #[serde(default)]
    pub atlases: Vec<PathBuf>,
    #[serde(default)]
    pub parameter_files: ParameterFiles,
    #[serde(default)]
    pub params: LabelerParams,
}

impl RuntimeConfig {
    fn resolve_paths(&mut self, base: &Path) {
        resolve(base, &mut self.input_path);
        resolve(base, &mut self.output.labeled_dataset);
        if let Some(p) = self.output.json_report.as_mut() {
            resolve(base, p);
        }
        for p in &mut self.atlases {
            resolve(base, p);
        }
        let files = &mut self.parameter_files;
        for p in [
            &mut files.emission_stats,
            &mut files.transition_probabilities,
            &mut files.transition_stats,
        ]
        .into_iter()
        .flatten()
        {
            resolve(base, p);
        }
    }

    /// Populate `builder` from the configured atlases and parameter files.
    ///
    /// Unreadable files and unlabeled atlases are fatal; truncated parameter
    /// files keep their leading rows and are recorded on the model.
    pub fn load_model(&self, mut builder: ProbabilityModelBuilder) -> Result<ProbabilityModel> {
        let files = &self.parameter_files;
        if let Some(path) = &files.emission_stats {
            let outcome = load_emission_stats(path)?;
            builder = builder
                .emission_stats(&outcome.value)
                .parameter_file(outcome.report("emission_stats"));
        }
        if let Some(path) = &files.transition_probabilities {
            let outcome = load_transition_probabilities(path)?;
            builder = builder
                .transitions(&outcome.value)
                .parameter_file(outcome.report("transition_probabilities"));
        }
        if let Some(path) = &files.transition_stats {
            let outcome = load_transition_stats(path)?;
            builder = builder
                .transitions(&outcome.value)
                .parameter_file(outcome.report("transition_stats"));
        }
        for (index, path) in self.atlases.iter().enumerate() {
            let dataset = load_dataset(path)?;
            let atlas = Atlas::from_dataset(index, &dataset)?;
            info!("atlas {} {}: {} particles", index, path.display(), atlas.len());
            builder = builder.atlas(atlas);
        }
        Ok(builder.build())
    }
}

/// Load a runtime config, resolving relative paths against its directory.
pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let mut config: RuntimeConfig = load_json(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    config.params.validate()?;
    Ok(config)
}

/// Parse the command line `<program> <config.json>`.
pub fn parse_cli(program: &str) -> Result<RuntimeConfig> {
    let mut args = std::env::args().skip(1);
    match (args.next(), args.next()) {
        (Some(path), None) => load_config(Path::new(&path)),
        _ => Err(LabelError::config(format!("usage: {program} <config.json>"))),
    }
}
