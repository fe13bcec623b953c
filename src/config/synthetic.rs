use super::{load_json, resolve};
use crate::error::{LabelError, Result};
use crate::synthetic::SyntheticTreeConfig;
use crate::LabelerParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration of `synthetic_tree_demo`. Every field is optional.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyntheticDemoConfig {
    pub tree: SyntheticTreeConfig,
    /// Translation applied to the tree before it is used as the atlas.
    pub atlas_offset: [f64; 3],
    /// Probability of keeping the parent's generation along a branch.
    pub stay_probability: f64,
    pub params: LabelerParams,
    pub json_report: Option<PathBuf>,
}

impl Default for SyntheticDemoConfig {
    fn default() -> Self {
        Self {
            tree: SyntheticTreeConfig::default(),
            atlas_offset: [0.25, 0.1, 0.0],
            stay_probability: 0.9,
            params: LabelerParams::default(),
            json_report: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<SyntheticDemoConfig> {
    let mut config: SyntheticDemoConfig = load_json(path)?;
    if let Some(report) = config.json_report.as_mut() {
        resolve(path.parent().unwrap_or_else(|| Path::new(".")), report);
    }
    config.tree.validate()?;
    if !(0.0..=1.0).contains(&config.stay_probability) {
        return Err(LabelError::config(format!(
            "stay_probability must lie in [0, 1], got {}",
            config.stay_probability
        )));
    }
    config.params.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, body: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("demo.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn zero_spacing_fails_loading() {
        let dir = std::env::temp_dir().join("airway_labeler_synthetic_spacing");
        let path = write(&dir, r#"{ "tree": { "spacing": 0.0 } }"#);
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("spacing"), "{err}");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn report_path_follows_config_dir() {
        let dir = std::env::temp_dir().join("airway_labeler_synthetic_report");
        let path = write(
            &dir,
            r#"{ "tree": { "generations": 3 }, "json_report": "out/report.json" }"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.tree.generations, 3);
        assert_eq!(config.json_report, Some(dir.join("out/report.json")));
        assert_eq!(config.stay_probability, 0.9);
        fs::remove_dir_all(&dir).ok();
    }
}
