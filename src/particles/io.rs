//! I/O helpers for particle datasets and JSON reports.
//!
//! - `load_dataset`: read a JSON point set with its field arrays.
//! - `write_json_file`: pretty-print a serializable value to disk.
//! - `attach_labels`: produce the output dataset with `ChestType` overwritten.
use super::{FieldArray, ParticleDataset, CHEST_TYPE_FIELD};
use crate::error::{LabelError, Result};
use crate::types::ChestType;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a particle dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<ParticleDataset> {
    let contents = fs::read_to_string(path).map_err(|e| LabelError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| LabelError::json(path, e))
}

/// Copy `dataset`, replacing its `ChestType` array with `labels`.
pub fn attach_labels(dataset: &ParticleDataset, labels: &[ChestType]) -> Result<ParticleDataset> {
    if labels.len() != dataset.len() {
        return Err(LabelError::LabelCount {
            expected: dataset.len(),
            found: labels.len(),
        });
    }
    let mut out = dataset.clone();
    out.set_field(
        CHEST_TYPE_FIELD,
        FieldArray::scalars(labels.iter().map(|l| f64::from(l.0)).collect()),
    );
    Ok(out)
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| LabelError::json(path, e))?;
    fs::write(path, json).map_err(|e| LabelError::io(path, e))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| LabelError::io(parent, e))?;
        }
    }
    Ok(())
}
