//! JSON configuration files of the command-line tools.
//!
//! - [`labeler`] – the `airway-labeler` run: inputs, parameter files,
//!   labeler parameters and outputs.
//! - [`synthetic`] – shape of the tree generated by `synthetic_tree_demo`.
//!
//! Relative paths inside a config file are resolved against the directory
//! holding that file.

pub mod labeler;
pub mod synthetic;

use crate::error::{LabelError, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read and deserialize a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| LabelError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| LabelError::json(path, e))
}

pub(crate) fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
